//! Watch/destination settings snapshot

use crate::error::{Result, SorterError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where to watch and where to sort into
///
/// Treated as an immutable value: a changed configuration produces a new
/// `Settings` which replaces the old one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
	#[serde(alias = "watchPath")]
	pub watch_path: PathBuf,
	#[serde(alias = "destinationPath")]
	pub destination_path: PathBuf,
}

impl Settings {
	pub fn new(watch_path: impl Into<PathBuf>, destination_path: impl Into<PathBuf>) -> Self {
		Self {
			watch_path: watch_path.into(),
			destination_path: destination_path.into(),
		}
	}

	/// Both paths must be present and not just whitespace
	pub fn validate(&self) -> Result<()> {
		if is_blank(&self.watch_path) {
			return Err(SorterError::config_invalid("watch_path", "must not be empty"));
		}
		if is_blank(&self.destination_path) {
			return Err(SorterError::config_invalid(
				"destination_path",
				"must not be empty",
			));
		}
		Ok(())
	}

	/// Whether `other` points at the same watch and destination directories
	///
	/// Paths are compared case-insensitively and ignore trailing separators, so
	/// re-delivered settings with cosmetic differences do not count as a change.
	pub fn same_paths(&self, other: &Settings) -> bool {
		paths_equal_ignore_case(&self.watch_path, &other.watch_path)
			&& paths_equal_ignore_case(&self.destination_path, &other.destination_path)
	}
}

impl std::fmt::Display for Settings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"watch={} destination={}",
			self.watch_path.display(),
			self.destination_path.display()
		)
	}
}

fn is_blank(path: &Path) -> bool {
	path.as_os_str().to_string_lossy().trim().is_empty()
}

fn comparable(path: &Path) -> String {
	let lowered = path.to_string_lossy().to_lowercase();
	#[cfg(windows)]
	let lowered = lowered.replace('/', "\\");
	let trimmed = lowered.trim_end_matches(['/', '\\']);
	if trimmed.is_empty() {
		lowered
	} else {
		trimmed.to_string()
	}
}

/// Case-insensitive path comparison
pub fn paths_equal_ignore_case(a: &Path, b: &Path) -> bool {
	comparable(a) == comparable(b)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_validate() {
		assert!(Settings::new("/in", "/out").validate().is_ok());

		let missing_watch = Settings::new("", "/out").validate().unwrap_err();
		assert!(missing_watch.to_string().contains("watch_path"));

		let blank_dest = Settings::new("/in", "   ").validate().unwrap_err();
		assert!(blank_dest.is_configuration_error());
		assert!(blank_dest.to_string().contains("destination_path"));

		assert!(Settings::default().validate().is_err());
	}

	#[test]
	fn test_same_paths_ignores_case() {
		let current = Settings::new("/Users/Me/Downloads", "/Users/Me/Sorted");
		let redelivered = Settings::new("/users/me/downloads", "/USERS/ME/SORTED/");
		assert!(current.same_paths(&redelivered));
		assert!(current.same_paths(&current.clone()));
	}

	#[test]
	fn test_same_paths_detects_changes() {
		let current = Settings::new("/in", "/out");
		assert!(!current.same_paths(&Settings::new("/in2", "/out")));
		assert!(!current.same_paths(&Settings::new("/in", "/elsewhere")));
	}

	#[test]
	fn test_root_paths_compare() {
		assert!(paths_equal_ignore_case(Path::new("/"), Path::new("/")));
		assert!(!paths_equal_ignore_case(Path::new("/"), Path::new("/in")));
	}

	#[test]
	fn test_json_field_names() {
		let settings = Settings::new("/in", "/out");
		let json = serde_json::to_string(&settings).unwrap();
		assert!(json.contains("\"WatchPath\""));
		assert!(json.contains("\"DestinationPath\""));

		let partial: Settings = serde_json::from_str(r#"{"WatchPath":"/in"}"#).unwrap();
		assert_eq!(partial.watch_path, PathBuf::from("/in"));
		assert_eq!(partial.destination_path, PathBuf::new());
	}
}
