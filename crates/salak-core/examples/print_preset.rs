use salak_core::presets::{names, resolve_preset};
use std::env;

fn main() {
    salak_core::init_tracing();

    let Some(name) = env::args().nth(1) else {
        eprintln!("usage: print_preset <preset>");
        eprintln!("presets: {}", names().collect::<Vec<_>>().join(", "));
        return;
    };

    match resolve_preset(&name) {
        Ok(config) => match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to serialize {name}: {e}"),
        },
        Err(e) => eprintln!("{e}"),
    }
}
