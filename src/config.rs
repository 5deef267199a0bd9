//! Configuration sources
//!
//! The engine only needs the current [`Settings`] and a way to hear about
//! changes. [`StaticSource`] keeps them in memory; [`FileSettingsSource`]
//! backs them with a JSON file that is reloaded whenever it changes on disk.

use crate::error::{Result, SorterError};
use crate::settings::Settings;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Environment variable overriding the directory holding the settings file
pub const CONFIG_DIR_ENV: &str = "FILE_SORTER_CONFIG_DIR";

const APP_DIR_NAME: &str = "FileSorter";
const SETTINGS_FILE_NAME: &str = "appsettings.json";

/// Supplies settings and notifies about replacements
pub trait ConfigurationSource: Send + Sync {
	fn current(&self) -> Settings;

	/// Receiver that observes every new settings value
	fn subscribe(&self) -> watch::Receiver<Settings>;
}

/// In-memory settings, replaced through [`StaticSource::update`]
#[derive(Debug)]
pub struct StaticSource {
	tx: watch::Sender<Settings>,
}

impl StaticSource {
	pub fn new(settings: Settings) -> Self {
		let (tx, _) = watch::channel(settings);
		Self { tx }
	}

	pub fn update(&self, settings: Settings) {
		self.tx.send_replace(settings);
	}
}

impl ConfigurationSource for StaticSource {
	fn current(&self) -> Settings {
		self.tx.borrow().clone()
	}

	fn subscribe(&self) -> watch::Receiver<Settings> {
		self.tx.subscribe()
	}
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
	#[serde(
		rename = "FileSort",
		alias = "fileSort",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	file_sort: Option<Settings>,
}

/// JSON settings file: `{ "FileSort": { "WatchPath": ..., "DestinationPath": ... } }`
#[derive(Debug, Clone)]
pub struct SettingsFileStore {
	config_path: PathBuf,
}

impl SettingsFileStore {
	/// Store at the default location, seeded with defaults if it does not exist
	pub fn open() -> Result<Self> {
		Self::at(default_config_dir().join(SETTINGS_FILE_NAME))
	}

	/// Store at `config_path`, seeded with defaults if it does not exist
	pub fn at(config_path: impl Into<PathBuf>) -> Result<Self> {
		let store = Self { config_path: config_path.into() };

		if let Some(parent) = store.config_path.parent() {
			if !parent.as_os_str().is_empty() {
				std::fs::create_dir_all(parent)?;
			}
		}

		if !store.config_path.exists() {
			let defaults = default_settings();
			info!(
				path = %store.config_path.display(),
				settings = %defaults,
				"Writing default settings file"
			);
			store.save(&defaults)?;
		}

		Ok(store)
	}

	pub fn config_path(&self) -> &Path {
		&self.config_path
	}

	/// Read the settings; a missing `FileSort` section yields empty settings
	pub fn load(&self) -> Result<Settings> {
		if !self.config_path.exists() {
			return Err(SorterError::SettingsNotFound {
				path: self.config_path.display().to_string(),
			});
		}

		let json = std::fs::read_to_string(&self.config_path)?;
		let document: SettingsDocument = serde_json::from_str(&json)?;
		Ok(document.file_sort.unwrap_or_default())
	}

	pub fn save(&self, settings: &Settings) -> Result<()> {
		let document = SettingsDocument { file_sort: Some(settings.clone()) };
		let json = serde_json::to_string_pretty(&document)?;
		std::fs::write(&self.config_path, json)?;
		Ok(())
	}
}

/// Settings backed by a [`SettingsFileStore`], reloaded when the file changes
///
/// A reload that fails (e.g. the file is mid-write) is logged and the previous
/// settings stay in effect.
pub struct FileSettingsSource {
	store: SettingsFileStore,
	tx: watch::Sender<Settings>,
	// Held only to keep the observation alive
	_watcher: Mutex<RecommendedWatcher>,
}

impl std::fmt::Debug for FileSettingsSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FileSettingsSource")
			.field("store", &self.store)
			.field("current", &*self.tx.borrow())
			.finish()
	}
}

impl FileSettingsSource {
	pub fn new(store: SettingsFileStore) -> Result<Self> {
		let initial = store.load()?;
		let (tx, _) = watch::channel(initial);

		let watch_dir = store
			.config_path()
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.map(Path::to_path_buf)
			.unwrap_or_else(|| PathBuf::from("."));

		let callback_store = store.clone();
		let callback_tx = tx.clone();
		let mut watcher = RecommendedWatcher::new(
			move |res: notify::Result<Event>| match res {
				Ok(event) => {
					if touches_file(&event, callback_store.config_path()) {
						Self::reload(&callback_store, &callback_tx);
					}
				}
				Err(e) => warn!("Settings watch error: {}", e),
			},
			Config::default(),
		)?;
		watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

		debug!(path = %store.config_path().display(), "Watching settings file");

		Ok(Self { store, tx, _watcher: Mutex::new(watcher) })
	}

	pub fn store(&self) -> &SettingsFileStore {
		&self.store
	}

	fn reload(store: &SettingsFileStore, tx: &watch::Sender<Settings>) {
		match store.load() {
			Ok(settings) => {
				let changed = tx.send_if_modified(|current| {
					if *current == settings {
						false
					} else {
						*current = settings.clone();
						true
					}
				});
				if changed {
					info!(settings = %settings, "Settings updated");
				}
			}
			Err(e) => {
				warn!(
					path = %store.config_path().display(),
					error = %e,
					"Failed to reload settings, keeping previous values"
				);
			}
		}
	}
}

impl ConfigurationSource for FileSettingsSource {
	fn current(&self) -> Settings {
		self.tx.borrow().clone()
	}

	fn subscribe(&self) -> watch::Receiver<Settings> {
		self.tx.subscribe()
	}
}

fn touches_file(event: &Event, file: &Path) -> bool {
	event
		.paths
		.iter()
		.any(|p| p == file || p.file_name() == file.file_name())
}

/// Directory holding `FileSorter/appsettings.json`
pub fn default_config_dir() -> PathBuf {
	if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
		return PathBuf::from(dir);
	}

	dirs::config_dir()
		.unwrap_or_else(std::env::temp_dir)
		.join(APP_DIR_NAME)
}

/// `~/Downloads` sorted into `~/Sorted`
pub fn default_settings() -> Settings {
	let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
	Settings::new(home.join("Downloads"), home.join("Sorted"))
}
