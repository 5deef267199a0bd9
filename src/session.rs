use crate::debounce::DebounceScheduler;
use crate::error::{Result, SorterError};
use crate::events::arrival_paths;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc as tokio_mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// One live, non-recursive observation of one directory
///
/// Arrivals are forwarded to the session's [`DebounceScheduler`]. Stopping the
/// session detaches the observation and cancels every pending timer; a stopped
/// session is never restarted, a new one is created instead.
pub struct WatchSession {
	path: PathBuf,
	watcher: Option<RecommendedWatcher>,
	forwarder: Option<JoinHandle<()>>,
	scheduler: DebounceScheduler,
}

impl std::fmt::Debug for WatchSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WatchSession")
			.field("path", &self.path)
			.field("active", &self.is_active())
			.field("scheduler", &self.scheduler)
			.finish()
	}
}

impl WatchSession {
	/// Begin watching `path`, creating it if it does not exist
	///
	/// Must be called from within a tokio runtime.
	pub fn start(path: &Path, scheduler: DebounceScheduler) -> Result<Self> {
		std::fs::create_dir_all(path).map_err(|e| SorterError::watch_start_failure(path, e))?;

		let (event_tx, event_rx) = tokio_mpsc::unbounded_channel::<Event>();

		let mut watcher = RecommendedWatcher::new(
			move |res: notify::Result<Event>| match res {
				Ok(event) => {
					// Receiver is gone once the session stops
					let _ = event_tx.send(event);
				}
				Err(e) => {
					error!("Notify error: {}", e);
				}
			},
			Config::default(),
		)
		.map_err(|e| SorterError::watch_start_failure(path, e))?;

		watcher
			.watch(path, RecursiveMode::NonRecursive)
			.map_err(|e| SorterError::watch_start_failure(path, e))?;

		let forwarder = tokio::spawn(Self::forward_arrivals(
			path.to_path_buf(),
			event_rx,
			scheduler.clone(),
		));

		info!(path = %path.display(), "Watching directory");

		Ok(Self {
			path: path.to_path_buf(),
			watcher: Some(watcher),
			forwarder: Some(forwarder),
			scheduler,
		})
	}

	async fn forward_arrivals(
		root: PathBuf, mut event_rx: tokio_mpsc::UnboundedReceiver<Event>,
		scheduler: DebounceScheduler,
	) {
		while let Some(event) = event_rx.recv().await {
			debug!("Received notify event: {:?}", event);

			for path in arrival_paths(&event) {
				if path == root {
					continue;
				}
				scheduler.schedule(path);
			}
		}
		debug!(path = %root.display(), "arrival forwarding ended");
	}

	/// Detach the observation and cancel all pending timers. Idempotent.
	pub fn stop(&mut self) {
		let cancelled = self.scheduler.cancel_all();

		let watcher = self.watcher.take();
		let forwarder = self.forwarder.take();
		if watcher.is_none() && forwarder.is_none() {
			return;
		}

		drop(watcher);
		if let Some(forwarder) = forwarder {
			forwarder.abort();
		}

		info!(
			path = %self.path.display(),
			cancelled_moves = cancelled,
			"Stopped watching directory"
		);
	}

	pub fn is_active(&self) -> bool {
		self.watcher.is_some()
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn scheduler(&self) -> &DebounceScheduler {
		&self.scheduler
	}
}

impl Drop for WatchSession {
	fn drop(&mut self) {
		self.stop();
	}
}
