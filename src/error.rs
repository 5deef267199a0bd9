use std::path::Path;
use thiserror::Error;

/// Error types for the watch-and-sort engine
///
/// Nothing in this enum is fatal to the process. The worst outcome of any of
/// them is "not currently watching", which clears on the next settings change.
/// - `ConfigInvalid`: settings rejected, engine stays stopped
/// - `WatchStartFailure`: the watch or destination directory is unusable
/// - `FileOpFailure`: a single file could not be relocated and is abandoned
#[derive(Error, Debug)]
pub enum SorterError {
	#[error("Invalid configuration: {field} - {reason}")]
	ConfigInvalid { field: String, reason: String },

	#[error("Failed to start watching {path}: {cause}")]
	WatchStartFailure { path: String, cause: String },

	#[error("File operation failed: {operation} on {path} - {cause}")]
	FileOpFailure {
		operation: String,
		path: String,
		cause: String,
	},

	#[error("Settings file not found: {path}")]
	SettingsNotFound { path: String },

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Notify error: {0}")]
	Notify(#[from] notify::Error),

	#[error("JSON serialization error: {0}")]
	Json(#[from] serde_json::Error),
}

impl SorterError {
	/// Check if this error stems from the supplied settings rather than the filesystem
	pub fn is_configuration_error(&self) -> bool {
		matches!(
			self,
			SorterError::ConfigInvalid { .. } | SorterError::SettingsNotFound { .. }
		)
	}

	/// Errors in this subsystem never take the process down
	pub fn is_fatal(&self) -> bool {
		false
	}

	/// Get error category for logging
	pub fn category(&self) -> &'static str {
		match self {
			SorterError::ConfigInvalid { .. } => "configuration",
			SorterError::WatchStartFailure { .. } => "watch_start",
			SorterError::FileOpFailure { .. } => "file_operation",
			SorterError::SettingsNotFound { .. } => "configuration",
			SorterError::Io(_) => "io",
			SorterError::Notify(_) => "notify",
			SorterError::Json(_) => "serialization",
		}
	}

	pub fn config_invalid(field: &str, reason: &str) -> Self {
		SorterError::ConfigInvalid {
			field: field.to_string(),
			reason: reason.to_string(),
		}
	}

	pub fn watch_start_failure(path: &Path, cause: impl std::fmt::Display) -> Self {
		SorterError::WatchStartFailure {
			path: path.display().to_string(),
			cause: cause.to_string(),
		}
	}

	pub fn file_op_failure(operation: &str, path: &Path, cause: impl std::fmt::Display) -> Self {
		SorterError::FileOpFailure {
			operation: operation.to_string(),
			path: path.display().to_string(),
			cause: cause.to_string(),
		}
	}
}

pub type Result<T> = std::result::Result<T, SorterError>;
