//! Extension based classification
//!
//! Maps a file extension to the category folder it is sorted into. The mapping
//! itself is plain data held in a [`CategoryTable`]; classification is a pure
//! lookup that falls back to [`Category::Others`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static DEFAULT_TABLE: LazyLock<CategoryTable> = LazyLock::new(CategoryTable::default);

/// Category a file is routed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
	Images,
	TextDocuments,
	Spreadsheets,
	Audio,
	Videos,
	Executables,
	Code,
	Shortcuts,
	Presentations,
	/// Catch-all for anything the table does not know
	Others,
}

impl Category {
	pub const ALL: [Category; 10] = [
		Category::Images,
		Category::TextDocuments,
		Category::Spreadsheets,
		Category::Audio,
		Category::Videos,
		Category::Executables,
		Category::Code,
		Category::Shortcuts,
		Category::Presentations,
		Category::Others,
	];

	/// Name of the folder created under the destination root
	pub fn folder_name(&self) -> &'static str {
		match self {
			Category::Images => "Images",
			Category::TextDocuments => "Text Documents",
			Category::Spreadsheets => "Spreadsheets",
			Category::Audio => "Audio",
			Category::Videos => "Videos",
			Category::Executables => "Executables",
			Category::Code => "Code",
			Category::Shortcuts => "Shortcuts",
			Category::Presentations => "Presentations",
			Category::Others => "Others",
		}
	}
}

impl std::fmt::Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.folder_name())
	}
}

/// Lower-cased extension to category lookup table
#[derive(Debug, Clone)]
pub struct CategoryTable {
	extension_map: HashMap<String, Category>,
}

impl CategoryTable {
	/// An empty table, classifying everything as [`Category::Others`]
	pub fn empty() -> Self {
		Self { extension_map: HashMap::new() }
	}

	/// Add or replace a mapping. A leading dot and letter case are ignored.
	pub fn insert(&mut self, extension: &str, category: Category) {
		self.extension_map
			.insert(normalize_extension(extension), category);
	}

	fn insert_all(&mut self, extensions: &[&str], category: Category) {
		for extension in extensions {
			self.insert(extension, category);
		}
	}

	/// Classify an extension. Case-insensitive, with or without the leading dot.
	pub fn classify(&self, extension: &str) -> Category {
		self.extension_map
			.get(&normalize_extension(extension))
			.copied()
			.unwrap_or(Category::Others)
	}

	/// Classify a path by its extension; paths without one are [`Category::Others`]
	pub fn classify_path(&self, path: &Path) -> Category {
		self.classify(&extension_of(path))
	}

	pub fn len(&self) -> usize {
		self.extension_map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.extension_map.is_empty()
	}
}

impl Default for CategoryTable {
	fn default() -> Self {
		let mut table = Self::empty();
		table.insert_all(
			&["jpg", "png", "gif", "svg", "jpeg", "bmp", "ico", "webp"],
			Category::Images,
		);
		table.insert_all(&["doc", "docx", "pdf", "txt"], Category::TextDocuments);
		table.insert_all(&["xlsx", "xls", "xlsb", "xlsm"], Category::Spreadsheets);
		table.insert_all(
			&["mp3", "wav", "ogg", "aac", "alac", "flac", "m4a"],
			Category::Audio,
		);
		table.insert_all(&["mp4", "mov", "webm"], Category::Videos);
		table.insert_all(&["exe", "dll", "bat"], Category::Executables);
		table.insert_all(
			&[
				"js", "html", "cs", "cpp", "c", "py", "sql", "xaml", "xml", "css", "lua",
			],
			Category::Code,
		);
		table.insert_all(&["lnk"], Category::Shortcuts);
		table.insert_all(&["pptx"], Category::Presentations);
		table
	}
}

/// Classify using the default table
pub fn classify(extension: &str) -> Category {
	DEFAULT_TABLE.classify(extension)
}

/// Lower-cased extension of `path` without the dot, or an empty string
pub fn extension_of(path: &Path) -> String {
	path.extension()
		.map(|ext| ext.to_string_lossy().to_lowercase())
		.unwrap_or_default()
}

fn normalize_extension(extension: &str) -> String {
	extension.trim_start_matches('.').to_lowercase()
}
