//! Common test utilities for the file-sorter library

#![allow(dead_code)]

use file_sorter::{DebouncePolicy, Engine, EngineConfig, Settings};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Debounce short enough for tests driven by real filesystem events
pub const TEST_DELAY: Duration = Duration::from_millis(300);

/// Create a temporary directory for testing
pub fn setup_temp_dir() -> TempDir {
	TempDir::new().expect("Failed to create temp directory")
}

/// Canonical root of a temp dir, so paths match what the OS reports in events
pub fn root_of(temp_dir: &TempDir) -> PathBuf {
	temp_dir
		.path()
		.canonicalize()
		.expect("Failed to canonicalize temp directory")
}

/// `<root>/in` watched, sorted into `<root>/out`
pub fn in_out_settings(root: &Path) -> Settings {
	Settings::new(root.join("in"), root.join("out"))
}

/// Create a test file with content
pub fn create_test_file(path: &Path, content: &str) -> std::io::Result<()> {
	std::fs::write(path, content)
}

/// Engine using the same short delay for every extension
pub fn fast_engine() -> Engine {
	Engine::new(EngineConfig {
		policy: DebouncePolicy::uniform(TEST_DELAY),
		..Default::default()
	})
}

/// Engine with short regular delay and a long `.tmp` delay
pub fn fast_engine_with_tmp_delay(tmp_delay: Duration) -> Engine {
	Engine::new(EngineConfig {
		policy: DebouncePolicy { tmp_delay, default_delay: TEST_DELAY },
		..Default::default()
	})
}

/// Wait for a short duration to allow file system events to propagate
pub async fn wait_for_events() {
	tokio::time::sleep(Duration::from_millis(100)).await;
}

/// Poll until `path` exists or `timeout` elapses
pub async fn wait_for_path(path: &Path, timeout: Duration) -> bool {
	let start = std::time::Instant::now();
	while start.elapsed() < timeout {
		if path.exists() {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(50)).await;
	}
	path.exists()
}
