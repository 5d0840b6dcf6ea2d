//! Structured error types for epgview.
//!
//! The layout engine itself never fails; errors only surface while decoding
//! host input (records, options, JavaScript values).

/// All errors that can occur at the epgview boundary.
#[derive(Debug, thiserror::Error)]
pub enum EpgError {
    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A date string or timestamp that cannot be read.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Rejected configuration value.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Conversion failure between JavaScript and Rust values.
    #[error("Binding error: {0}")]
    Binding(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EpgError>;

impl From<String> for EpgError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for EpgError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for EpgError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self::Binding(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<EpgError> for wasm_bindgen::JsValue {
    fn from(e: EpgError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
