//! Result type alias for salak operations

use crate::error::SalakError;

/// Standard Result type for salak operations
pub type Result<T> = std::result::Result<T, SalakError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Convert an error to `None` if it is recoverable
    fn recoverable(self) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn recoverable(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!("Skipping layer definition: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
