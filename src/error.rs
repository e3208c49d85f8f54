use thiserror::Error;

/// Failures that abort a whole conversion call.
///
/// Items that fail validation are not errors; they are skipped and counted
/// in [`crate::generator::Conversion::skipped_items`].
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to parse JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Malformed input document: {0}")]
    MalformedInput(String),

    #[error("Collection node '{name}' is neither a folder nor a request")]
    UnrecognizedNode { name: String },

    #[error("Unsupported reference: {0}")]
    UnsupportedReference(String),

    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("Cyclic schema reference: {0}")]
    CyclicSchema(String),
}
