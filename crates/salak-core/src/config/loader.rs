//! Layer definition discovery and loading

use super::layer::{ConfigLayer, LayerDefinition};
use super::registry::LayerRegistry;
use crate::error::SalakError;
use crate::result::{Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use regex::Regex;
use std::path::{Component, Path};
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

/// File formats a layer definition can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFormat {
    /// `.json`
    Json,
    /// `.jsonc`, `.json5` - comments and trailing commas
    Json5,
    /// `.yaml`, `.yml`
    Yaml,
    /// `.toml`
    Toml,
    /// `.js`, `.cjs` - a `module.exports = { ... };` object literal
    CommonJs,
}

impl LayerFormat {
    /// Extensions recognized as layer definitions
    pub const EXTENSIONS: &'static [&'static str] =
        &["json", "jsonc", "json5", "yaml", "yml", "toml", "js", "cjs"];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(LayerFormat::Json),
            "jsonc" | "json5" => Some(LayerFormat::Json5),
            "yaml" | "yml" => Some(LayerFormat::Yaml),
            "toml" => Some(LayerFormat::Toml),
            "js" | "cjs" => Some(LayerFormat::CommonJs),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayerFormat::Json => "JSON",
            LayerFormat::Json5 => "JSONC",
            LayerFormat::Yaml => "YAML",
            LayerFormat::Toml => "TOML",
            LayerFormat::CommonJs => "CommonJS",
        }
    }

    /// Parse a definition document in this format
    fn parse(&self, origin: &Path, content: &str) -> Result<LayerDefinition> {
        let parse_err = |e: &dyn std::fmt::Display| SalakError::parse_error(origin, self.name(), e);
        match self {
            LayerFormat::Json => serde_json::from_str(content).map_err(|e| parse_err(&e)),
            LayerFormat::Json5 => json5::from_str(content).map_err(|e| parse_err(&e)),
            LayerFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_err(&e)),
            LayerFormat::Toml => toml::from_str(content).map_err(|e| parse_err(&e)),
            LayerFormat::CommonJs => {
                let literal = commonjs_object_literal(content)
                    .ok_or_else(|| parse_err(&"missing `module.exports = { ... }` assignment"))?;
                json5::from_str(literal).map_err(|e| parse_err(&e))
            }
        }
    }
}

static EXPORTS_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmodule\.exports\s*=\s*").unwrap());

/// Slice out the object literal assigned to `module.exports`
///
/// Assignments mentioned in comments or strings are skipped. The literal ends
/// at its matching closing brace; anything after it is ignored.
fn commonjs_object_literal(content: &str) -> Option<&str> {
    let code = code_mask(content);
    EXPORTS_ASSIGNMENT
        .find_iter(content)
        .filter(|assignment| code[assignment.start()])
        .find_map(|assignment| balanced_object(content, &code, assignment.end()))
}

/// `true` for every byte outside comments and string literals
fn code_mask(content: &str) -> Vec<bool> {
    let bytes = content.as_bytes();
    let mut mask = vec![false; bytes.len()];
    let mut i = 0;

    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1).copied()) {
            (b'/', Some(b'/')) => {
                i = content[i..].find('\n').map_or(bytes.len(), |n| i + n);
            }
            (b'/', Some(b'*')) => {
                i = content[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |n| i + 2 + n + 2);
            }
            (quote @ (b'"' | b'\'' | b'`'), _) => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i += 1;
            }
            _ => {
                mask[i] = true;
                i += 1;
            }
        }
    }

    mask
}

/// The `{ ... }` literal starting at `start`, braces matched in code only
fn balanced_object<'a>(content: &'a str, code: &[bool], start: usize) -> Option<&'a str> {
    if content.as_bytes().get(start) != Some(&b'{') || !code[start] {
        return None;
    }

    let mut depth = 0usize;
    for (offset, byte) in content.as_bytes()[start..].iter().enumerate() {
        let pos = start + offset;
        if !code[pos] {
            continue;
        }
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..=pos]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Loader settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderOptions {
    /// Prefix for names derived from file paths (`salak` + `es6.js` → `salak/es6`)
    pub namespace: Option<String>,

    /// Drop definition-file extensions from `extends` entries
    /// (`salak/es6.js` → `salak/es6`)
    pub strip_extensions: bool,

    /// Skip files that fail to parse when loading a directory
    pub skip_invalid: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            namespace: None,
            strip_extensions: true,
            skip_invalid: false,
        }
    }
}

impl LoaderOptions {
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }
}

/// Loads layer definitions from files and strings
#[derive(Debug, Clone, Default)]
pub struct LayerLoader {
    options: LoaderOptions,
}

impl LayerLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Parse one definition document
    ///
    /// `name` is used unless the document sets its own `name`.
    pub fn parse_str(&self, name: &str, content: &str, format: LayerFormat) -> Result<ConfigLayer> {
        let definition = format.parse(Path::new(name), content)?;
        Ok(self.finish(definition.into_layer(name)))
    }

    /// Load a single definition file
    ///
    /// The layer is named after the file stem, under the namespace if one is
    /// set; an `index` file takes the bare namespace.
    pub fn load_file(&self, path: &Path) -> Result<ConfigLayer> {
        let relative = path.file_name().map(Path::new).unwrap_or(path);
        self.load_relative(path, relative)
    }

    /// Load every definition file below `dir`
    ///
    /// Files are visited in path order. Names are derived from the path
    /// relative to `dir` (`react/jsx.json` → `<namespace>/react/jsx`).
    /// Files with unrecognized extensions are ignored.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<ConfigLayer>> {
        let mut layers = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                SalakError::io_error(path, source)
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || LayerFormat::from_path(path).is_none() {
                continue;
            }

            let relative = path.strip_prefix(dir).unwrap_or(path);
            let loaded = self.load_relative(path, relative);
            let loaded = if self.options.skip_invalid {
                loaded.recoverable()?
            } else {
                Some(loaded?)
            };
            if let Some(layer) = loaded {
                layers.push(layer);
            }
        }

        debug!("Loaded {} layers from {}", layers.len(), dir.display());
        Ok(layers)
    }

    /// Load a directory straight into a registry
    pub fn load_registry(&self, dir: &Path) -> Result<LayerRegistry> {
        let mut registry = LayerRegistry::new();
        registry.extend(self.load_dir(dir)?)?;
        Ok(registry)
    }

    fn load_relative(&self, path: &Path, relative: &Path) -> Result<ConfigLayer> {
        let format = LayerFormat::from_path(path)
            .ok_or_else(|| SalakError::UnsupportedFormat { path: path.to_path_buf() })?;
        let content = fs::read_to_string(path).map_err(|e| SalakError::io_error(path, e))?;

        let name = self.layer_name(relative);
        debug!("Loading layer '{}' from {}", name, path.display());

        let definition = format.parse(path, &content)?;
        Ok(self.finish(definition.into_layer(name)))
    }

    /// Name for a definition at `relative` (path below the load root)
    fn layer_name(&self, relative: &Path) -> String {
        let mut segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if let Some(file) = segments.pop() {
            let stem = Path::new(&file)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(file);
            if stem != "index" || (segments.is_empty() && self.options.namespace.is_none()) {
                segments.push(stem);
            }
        }

        if let Some(namespace) = &self.options.namespace {
            segments.insert(0, namespace.clone());
        }
        segments.join("/")
    }

    fn finish(&self, mut layer: ConfigLayer) -> ConfigLayer {
        if self.options.strip_extensions {
            for parent in &mut layer.extends {
                *parent = strip_definition_extension(parent).to_string();
            }
        }
        layer
    }
}

/// `salak/es6.js` → `salak/es6`; names without a definition extension are kept
fn strip_definition_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && LayerFormat::EXTENSIONS.contains(&ext) => stem,
        _ => name,
    }
}
