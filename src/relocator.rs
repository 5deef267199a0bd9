//! Moves one file into `<destination>/<category>/<file name>`
//!
//! Same-named files already at the destination are overwritten. A source that
//! disappeared before we got to it is not an error.

use crate::classifier::{Category, CategoryTable};
use crate::error::{Result, SorterError};
use crate::events::RelocationRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of a relocation attempt that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Relocation {
	Moved(RelocationRecord),
	/// The source no longer exists
	SourceMissing,
	/// The source is not a regular file (e.g. a directory)
	NotAFile,
}

impl Relocation {
	pub fn destination(&self) -> Option<&Path> {
		match self {
			Relocation::Moved(record) => Some(&record.destination),
			_ => None,
		}
	}
}

/// Move `file_path` into the `category` folder under `destination_root`
pub fn relocate(
	file_path: &Path, destination_root: &Path, category: Category,
) -> Result<Relocation> {
	let metadata = match fs::metadata(file_path) {
		Ok(metadata) => metadata,
		Err(e) if e.kind() == io::ErrorKind::NotFound => {
			debug!(path = %file_path.display(), "source vanished before relocation");
			return Ok(Relocation::SourceMissing);
		}
		Err(e) => return Err(SorterError::file_op_failure("stat", file_path, e)),
	};

	if !metadata.is_file() {
		debug!(path = %file_path.display(), "skipping non-file entry");
		return Ok(Relocation::NotAFile);
	}

	let file_name = file_path.file_name().ok_or_else(|| {
		SorterError::file_op_failure("move", file_path, "path has no file name")
	})?;

	let category_dir = destination_root.join(category.folder_name());
	fs::create_dir_all(&category_dir)
		.map_err(|e| SorterError::file_op_failure("create_dir", &category_dir, e))?;

	let destination = category_dir.join(file_name);
	if destination == file_path {
		return Ok(Relocation::NotAFile);
	}

	match move_file(file_path, &destination) {
		Ok(()) => {}
		Err(e) if e.kind() == io::ErrorKind::NotFound && !file_path.exists() => {
			debug!(path = %file_path.display(), "source vanished during relocation");
			return Ok(Relocation::SourceMissing);
		}
		Err(e) => return Err(SorterError::file_op_failure("move", file_path, e)),
	}

	info!(
		source = %file_path.display(),
		destination = %destination.display(),
		category = %category,
		"Moved file"
	);

	let record = RelocationRecord::new(file_path.to_path_buf(), destination, category);
	if let Ok(json) = record.to_json() {
		debug!("Relocation JSON: {}", json);
	}

	Ok(Relocation::Moved(record))
}

/// Classify `file_path` with `table` and relocate it under `destination_root`
pub fn sort_file(
	file_path: &Path, destination_root: &Path, table: &CategoryTable,
) -> Result<Relocation> {
	let category = table.classify_path(file_path);
	relocate(file_path, destination_root, category)
}

/// Rename with overwrite, falling back to copy + delete across filesystems
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
	match fs::rename(source, destination) {
		Ok(()) => Ok(()),
		Err(e) if is_cross_device(&e) => {
			debug!(
				source = %source.display(),
				destination = %destination.display(),
				"rename crosses filesystems, copying instead"
			);
			fs::copy(source, destination)?;
			fs::remove_file(source)
		}
		Err(e) => Err(e),
	}
}

fn is_cross_device(error: &io::Error) -> bool {
	error.kind() == io::ErrorKind::CrossesDevices
}

/// Regular files directly inside `dir`, sorted by path
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();
	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
			files.push(entry.path());
		}
	}
	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_relocate_moves_into_category_folder() {
		let temp_dir = TempDir::new().unwrap();
		let source = temp_dir.path().join("photo.jpg");
		let destination_root = temp_dir.path().join("out");
		fs::write(&source, "pixels").unwrap();

		let outcome = relocate(&source, &destination_root, Category::Images).unwrap();

		let expected = destination_root.join("Images").join("photo.jpg");
		assert_eq!(outcome.destination(), Some(expected.as_path()));
		assert!(!source.exists());
		assert_eq!(fs::read_to_string(&expected).unwrap(), "pixels");
	}

	#[test]
	fn test_relocate_overwrites_existing() {
		let temp_dir = TempDir::new().unwrap();
		let destination_root = temp_dir.path().join("out");
		let existing = destination_root.join("Text Documents").join("notes.txt");
		fs::create_dir_all(existing.parent().unwrap()).unwrap();
		fs::write(&existing, "old").unwrap();

		let source = temp_dir.path().join("notes.txt");
		fs::write(&source, "new").unwrap();

		let outcome = relocate(&source, &destination_root, Category::TextDocuments).unwrap();

		assert!(matches!(outcome, Relocation::Moved(_)));
		assert_eq!(fs::read_to_string(&existing).unwrap(), "new");
		assert!(!source.exists());
	}

	#[test]
	fn test_relocate_missing_source_is_noop() {
		let temp_dir = TempDir::new().unwrap();
		let source = temp_dir.path().join("gone.pdf");
		let destination_root = temp_dir.path().join("out");

		let outcome = relocate(&source, &destination_root, Category::TextDocuments).unwrap();

		assert_eq!(outcome, Relocation::SourceMissing);
		assert!(!destination_root.exists());
	}

	#[test]
	fn test_relocate_skips_directories() {
		let temp_dir = TempDir::new().unwrap();
		let source = temp_dir.path().join("folder.jpg");
		fs::create_dir(&source).unwrap();

		let outcome = relocate(&source, &temp_dir.path().join("out"), Category::Images).unwrap();

		assert_eq!(outcome, Relocation::NotAFile);
		assert!(source.is_dir());
	}

	#[test]
	fn test_relocate_reports_unusable_destination() {
		let temp_dir = TempDir::new().unwrap();
		let source = temp_dir.path().join("song.mp3");
		fs::write(&source, "audio").unwrap();

		// A regular file where the destination root should be
		let blocker = temp_dir.path().join("out");
		fs::write(&blocker, "not a directory").unwrap();

		let error = relocate(&source, &blocker, Category::Audio).unwrap_err();

		assert_eq!(error.category(), "file_operation");
		assert!(error.to_string().contains("Audio"));
		assert!(source.exists());
	}

	#[test]
	fn test_sort_file_uses_table() {
		let temp_dir = TempDir::new().unwrap();
		let source = temp_dir.path().join("report.xyz");
		let destination_root = temp_dir.path().join("out");
		fs::write(&source, "data").unwrap();

		sort_file(&source, &destination_root, &CategoryTable::default()).unwrap();

		assert!(destination_root.join("Others").join("report.xyz").exists());
	}

	#[test]
	fn test_list_files_ignores_directories() {
		let temp_dir = TempDir::new().unwrap();
		fs::write(temp_dir.path().join("b.txt"), "b").unwrap();
		fs::write(temp_dir.path().join("a.jpg"), "a").unwrap();
		fs::create_dir(temp_dir.path().join("nested")).unwrap();

		let files = list_files(temp_dir.path()).unwrap();

		assert_eq!(
			files,
			vec![temp_dir.path().join("a.jpg"), temp_dir.path().join("b.txt")]
		);
	}

	#[test]
	fn test_cross_device_detection() {
		assert!(is_cross_device(&io::Error::from(io::ErrorKind::CrossesDevices)));
		assert!(!is_cross_device(&io::Error::from(io::ErrorKind::NotFound)));
		#[cfg(target_os = "linux")]
		assert!(is_cross_device(&io::Error::from_raw_os_error(18)));
	}
}
