//! Orchestrates the watch session across configuration changes
//!
//! [`Engine::restart`] is the only way the active session is replaced. It runs
//! under one async mutex, so restarts never interleave, and the outgoing
//! session's timers are cancelled before anything about the new settings is
//! touched.

use crate::classifier::CategoryTable;
use crate::config::ConfigurationSource;
use crate::debounce::{DebouncePolicy, DebounceScheduler, SortAction};
use crate::error::{Result, SorterError};
use crate::relocator::{list_files, sort_file, Relocation};
use crate::session::WatchSession;
use crate::settings::Settings;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
	/// No active session
	Stopped,
	/// Validating settings, preparing directories and sweeping existing files
	Starting,
	/// Session live
	Watching,
}

/// Tunables handed to the engine at construction
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
	pub policy: DebouncePolicy,
	pub table: CategoryTable,
}

/// Files handled by an initial sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
	pub moved: usize,
	pub skipped: usize,
	pub failed: usize,
}

struct EngineInner {
	settings: Option<Settings>,
	session: Option<WatchSession>,
}

pub struct Engine {
	policy: DebouncePolicy,
	table: Arc<CategoryTable>,
	inner: Mutex<EngineInner>,
	state_tx: watch::Sender<EngineState>,
}

impl std::fmt::Debug for Engine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Engine")
			.field("policy", &self.policy)
			.field("state", &self.state())
			.finish()
	}
}

impl Default for Engine {
	fn default() -> Self {
		Self::new(EngineConfig::default())
	}
}

impl Engine {
	pub fn new(config: EngineConfig) -> Self {
		let (state_tx, _) = watch::channel(EngineState::Stopped);
		Self {
			policy: config.policy,
			table: Arc::new(config.table),
			inner: Mutex::new(EngineInner { settings: None, session: None }),
			state_tx,
		}
	}

	pub fn state(&self) -> EngineState {
		*self.state_tx.borrow()
	}

	/// Observe state transitions
	pub fn subscribe_state(&self) -> watch::Receiver<EngineState> {
		self.state_tx.subscribe()
	}

	/// Settings of the last restart, valid or not
	pub async fn settings(&self) -> Option<Settings> {
		self.inner.lock().await.settings.clone()
	}

	/// Path of the live session, if any
	pub async fn watched_path(&self) -> Option<std::path::PathBuf> {
		let inner = self.inner.lock().await;
		inner
			.session
			.as_ref()
			.filter(|session| session.is_active())
			.map(|session| session.path().to_path_buf())
	}

	fn set_state(&self, state: EngineState) {
		self.state_tx.send_replace(state);
	}

	/// Tear down the current session and start over with `settings`
	pub async fn restart(&self, settings: Settings) -> Result<()> {
		let mut inner = self.inner.lock().await;
		self.restart_locked(&mut inner, settings).await
	}

	/// Restart only if the watch or destination path actually changed
	///
	/// Returns whether a restart took place.
	pub async fn apply(&self, settings: Settings) -> Result<bool> {
		let mut inner = self.inner.lock().await;
		if let Some(current) = &inner.settings {
			if current.same_paths(&settings) {
				debug!(settings = %settings, "Settings unchanged, keeping current watcher");
				return Ok(false);
			}
		}

		info!(settings = %settings, "Restarting watcher due to path changes");
		self.restart_locked(&mut inner, settings).await?;
		Ok(true)
	}

	/// Stop the active session, if any
	pub async fn shutdown(&self) {
		let mut inner = self.inner.lock().await;
		if let Some(mut session) = inner.session.take() {
			session.stop();
		}
		self.set_state(EngineState::Stopped);
		info!("Engine stopped");
	}

	/// Follow `source` until `shutdown` resolves
	pub async fn run<S, F>(&self, source: &S, shutdown: F)
	where
		S: ConfigurationSource + ?Sized,
		F: Future<Output = ()>,
	{
		let mut updates = source.subscribe();
		let initial = updates.borrow_and_update().clone();
		// Failures are logged by restart; the engine waits for the next change
		let _ = self.restart(initial).await;

		tokio::pin!(shutdown);
		let mut source_open = true;
		loop {
			tokio::select! {
				_ = &mut shutdown => break,
				changed = updates.changed(), if source_open => {
					if changed.is_err() {
						warn!("Configuration source closed, keeping current watcher");
						source_open = false;
						continue;
					}
					let settings = updates.borrow_and_update().clone();
					let _ = self.apply(settings).await;
				}
			}
		}

		self.shutdown().await;
	}

	async fn restart_locked(&self, inner: &mut EngineInner, settings: Settings) -> Result<()> {
		if let Some(mut session) = inner.session.take() {
			session.stop();
		}
		inner.settings = Some(settings.clone());
		self.set_state(EngineState::Starting);

		match self.start_session(&settings).await {
			Ok(session) => {
				inner.session = Some(session);
				self.set_state(EngineState::Watching);
				Ok(())
			}
			Err(e) => {
				if e.is_configuration_error() {
					warn!(settings = %settings, error = %e, "Invalid settings, watcher not started");
				} else {
					error!(settings = %settings, error = %e, "Failed to start watcher");
				}
				self.set_state(EngineState::Stopped);
				Err(e)
			}
		}
	}

	async fn start_session(&self, settings: &Settings) -> Result<WatchSession> {
		settings.validate()?;

		for dir in [&settings.watch_path, &settings.destination_path] {
			tokio::fs::create_dir_all(dir)
				.await
				.map_err(|e| SorterError::watch_start_failure(dir, e))?;
		}

		let summary = self.sweep(settings).await?;
		info!(
			path = %settings.watch_path.display(),
			moved = summary.moved,
			skipped = summary.skipped,
			failed = summary.failed,
			"Initial sweep finished"
		);

		let action = SortAction::new(settings.destination_path.clone(), Arc::clone(&self.table));
		let scheduler = DebounceScheduler::new(self.policy.clone(), Arc::new(action));
		WatchSession::start(&settings.watch_path, scheduler)
	}

	async fn sweep(&self, settings: &Settings) -> Result<SweepSummary> {
		let watch_path = settings.watch_path.clone();
		let destination = settings.destination_path.clone();
		let table = Arc::clone(&self.table);

		tokio::task::spawn_blocking(move || sweep_directory(&watch_path, &destination, &table))
			.await
			.map_err(|e| SorterError::watch_start_failure(&settings.watch_path, e))?
	}
}

/// Sort every file already sitting in `watch_path`
pub fn sweep_directory(
	watch_path: &Path, destination: &Path, table: &CategoryTable,
) -> Result<SweepSummary> {
	let files =
		list_files(watch_path).map_err(|e| SorterError::watch_start_failure(watch_path, e))?;

	let mut summary = SweepSummary::default();
	for file in files {
		match sort_file(&file, destination, table) {
			Ok(Relocation::Moved(_)) => summary.moved += 1,
			Ok(_) => summary.skipped += 1,
			Err(e) => {
				error!(path = %file.display(), error = %e, "File move failed");
				summary.failed += 1;
			}
		}
	}
	Ok(summary)
}
