//! Error types for the fallible edges of the editor: import, export and config.

use thiserror::Error;

/// Failures reported to callers. State transitions themselves never fail.
#[derive(Error, Debug)]
pub enum EditorError {
	/// The payload is not valid JSON, or lacks a required node/link field.
	#[error("malformed node-link document: {0}")]
	MalformedImport(#[from] serde_json::Error),
	/// The JSON parsed, but its top-level shape is not a node-link document.
	#[error("invalid node-link document: {0}")]
	InvalidShape(String),
	/// Encoding an export payload failed.
	#[error("export error: {0}")]
	Export(String),
	/// The configuration document could not be parsed.
	#[error("configuration error: {0}")]
	Config(#[from] toml::de::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, EditorError>;
