//! Per-file debounce timers
//!
//! Each arrival gets a timer keyed by its path. When the timer elapses the file
//! is handed to a [`MoveHandler`]. Timers belong to one watch session and are
//! all cancelled together when that session stops.

use crate::classifier::{extension_of, CategoryTable};
use crate::error::{Result, SorterError};
use crate::relocator::{sort_file, Relocation};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// How long a file must sit before it is considered stable
#[derive(Debug, Clone, PartialEq)]
pub struct DebouncePolicy {
	/// Wait for `.tmp` files, which usually sit behind a browser "save as" dialog
	pub tmp_delay: Duration,
	/// Wait for every other file
	pub default_delay: Duration,
}

impl Default for DebouncePolicy {
	fn default() -> Self {
		Self {
			tmp_delay: Duration::from_secs(600),
			default_delay: Duration::from_secs(5),
		}
	}
}

impl DebouncePolicy {
	/// Same delay for every extension
	pub fn uniform(delay: Duration) -> Self {
		Self { tmp_delay: delay, default_delay: delay }
	}

	pub fn delay_for(&self, extension: &str) -> Duration {
		if extension.trim_start_matches('.').eq_ignore_ascii_case("tmp") {
			self.tmp_delay
		} else {
			self.default_delay
		}
	}
}

/// A file waiting out its debounce interval
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMove {
	pub file_path: PathBuf,
	pub extension: String,
	pub scheduled_at: DateTime<Utc>,
}

impl PendingMove {
	pub fn new(file_path: PathBuf) -> Self {
		Self {
			extension: extension_of(&file_path),
			file_path,
			scheduled_at: Utc::now(),
		}
	}
}

/// Action run once a pending file is judged stable
pub trait MoveHandler: Send + Sync {
	fn handle(
		&self, pending: PendingMove,
	) -> Pin<Box<dyn Future<Output = Result<Relocation>> + Send + '_>>;
}

/// Classifies and relocates into a destination fixed at construction time
///
/// Built from the settings active when the session started, so a later
/// configuration change can never redirect a file that is already scheduled.
#[derive(Debug, Clone)]
pub struct SortAction {
	destination_root: PathBuf,
	table: Arc<CategoryTable>,
}

impl SortAction {
	pub fn new(destination_root: PathBuf, table: Arc<CategoryTable>) -> Self {
		Self { destination_root, table }
	}

	pub fn destination_root(&self) -> &Path {
		&self.destination_root
	}
}

impl MoveHandler for SortAction {
	fn handle(
		&self, pending: PendingMove,
	) -> Pin<Box<dyn Future<Output = Result<Relocation>> + Send + '_>> {
		let destination_root = self.destination_root.clone();
		let table = Arc::clone(&self.table);
		Box::pin(async move {
			let file_path = pending.file_path;
			let path_for_error = file_path.clone();
			tokio::task::spawn_blocking(move || sort_file(&file_path, &destination_root, &table))
				.await
				.map_err(|e| SorterError::file_op_failure("relocate", &path_for_error, e))?
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	Waiting,
	Relocating,
}

struct PendingEntry {
	generation: u64,
	phase: Phase,
	// Another arrival came in while relocating; wait again once it finishes
	rearm: bool,
	task: JoinHandle<()>,
}

#[derive(Default)]
struct SchedulerState {
	pending: HashMap<PathBuf, PendingEntry>,
	next_generation: u64,
	closed: bool,
}

struct SchedulerInner {
	policy: DebouncePolicy,
	handler: Arc<dyn MoveHandler>,
	state: Mutex<SchedulerState>,
}

/// `now + delay`, clamped for delays too large to represent
fn deadline_after(delay: Duration) -> Instant {
	let now = Instant::now();
	now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

impl SchedulerInner {
	fn lock(&self) -> MutexGuard<'_, SchedulerState> {
		// A panic while holding the lock leaves the map consistent
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Spawn a fresh timer for `file_path`, replacing any entry for it
	fn arm(self: &Arc<Self>, state: &mut SchedulerState, runtime: &Handle, file_path: PathBuf) {
		let pending = PendingMove::new(file_path);
		let delay = self.policy.delay_for(&pending.extension);
		let deadline = deadline_after(delay);

		let generation = state.next_generation;
		state.next_generation += 1;

		debug!(
			path = %pending.file_path.display(),
			delay = ?delay,
			"scheduled pending move"
		);

		let path = pending.file_path.clone();
		let inner = Arc::clone(self);
		let task = runtime.spawn(async move {
			tokio::time::sleep_until(deadline).await;

			if !inner.begin(&pending.file_path, generation) {
				return;
			}
			let _guard = FinishGuard {
				inner: Arc::clone(&inner),
				path: pending.file_path.clone(),
				generation,
			};

			let file_path = pending.file_path.clone();
			if let Err(e) = inner.handler.handle(pending).await {
				error!(
					path = %file_path.display(),
					error = %e,
					"File move failed"
				);
			}
		});

		state.pending.insert(
			path,
			PendingEntry { generation, phase: Phase::Waiting, rearm: false, task },
		);
	}

	/// Promote a waiting entry to relocating; false if it was replaced or cancelled
	fn begin(&self, path: &Path, generation: u64) -> bool {
		let mut state = self.lock();
		if state.closed {
			return false;
		}
		match state.pending.get_mut(path) {
			Some(entry) if entry.generation == generation && entry.phase == Phase::Waiting => {
				entry.phase = Phase::Relocating;
				true
			}
			_ => false,
		}
	}

	fn finish(self: &Arc<Self>, path: &Path, generation: u64) {
		let mut state = self.lock();
		let rearm = match state.pending.get(path) {
			Some(entry) if entry.generation == generation => entry.rearm,
			_ => return,
		};
		state.pending.remove(path);

		if !rearm || state.closed {
			return;
		}
		match Handle::try_current() {
			Ok(runtime) => {
				debug!(path = %path.display(), "arrival during relocation, waiting again");
				self.arm(&mut state, &runtime, path.to_path_buf());
			}
			Err(_) => debug!(path = %path.display(), "runtime gone, dropping re-armed move"),
		}
	}
}

/// Removes the pending entry however the relocation ends
struct FinishGuard {
	inner: Arc<SchedulerInner>,
	path: PathBuf,
	generation: u64,
}

impl Drop for FinishGuard {
	fn drop(&mut self) {
		self.inner.finish(&self.path, self.generation);
	}
}

/// Cancellable per-path timers feeding a [`MoveHandler`]
///
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct DebounceScheduler {
	inner: Arc<SchedulerInner>,
}

impl std::fmt::Debug for DebounceScheduler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DebounceScheduler")
			.field("policy", &self.inner.policy)
			.field("pending", &self.pending_count())
			.finish()
	}
}

impl DebounceScheduler {
	pub fn new(policy: DebouncePolicy, handler: Arc<dyn MoveHandler>) -> Self {
		Self {
			inner: Arc::new(SchedulerInner {
				policy,
				handler,
				state: Mutex::new(SchedulerState::default()),
			}),
		}
	}

	pub fn policy(&self) -> &DebouncePolicy {
		&self.inner.policy
	}

	/// Start (or restart) the timer for `file_path`
	///
	/// Returns false when the scheduler is cancelled or the file is already
	/// being relocated. A second arrival for a file that is still waiting
	/// restarts its timer; one that lands during the relocation never runs
	/// alongside it, but gets a fresh timer once the relocation finishes.
	pub fn schedule(&self, file_path: PathBuf) -> bool {
		let runtime = Handle::current();
		let mut state = self.inner.lock();
		if state.closed {
			debug!(path = %file_path.display(), "scheduler closed, ignoring arrival");
			return false;
		}

		if let Some(existing) = state.pending.get_mut(&file_path) {
			match existing.phase {
				Phase::Relocating => {
					debug!(
						path = %file_path.display(),
						"relocation already running, re-checking once it finishes"
					);
					existing.rearm = true;
					return false;
				}
				Phase::Waiting => {
					debug!(path = %file_path.display(), "restarting debounce timer");
					existing.task.abort();
				}
			}
		}

		self.inner.arm(&mut state, &runtime, file_path);
		true
	}

	/// Abort every timer and refuse further scheduling
	///
	/// Returns the number of timers that were still pending.
	pub fn cancel_all(&self) -> usize {
		let mut state = self.inner.lock();
		state.closed = true;
		let entries: Vec<PendingEntry> = state.pending.drain().map(|(_, entry)| entry).collect();
		drop(state);

		let cancelled = entries.len();
		for entry in entries {
			entry.task.abort();
		}

		if cancelled > 0 {
			info!(cancelled, "Cancelled pending moves");
		}
		cancelled
	}

	pub fn is_closed(&self) -> bool {
		self.inner.lock().closed
	}

	pub fn pending_count(&self) -> usize {
		self.inner.lock().pending.len()
	}

	pub fn is_pending(&self, file_path: &Path) -> bool {
		self.inner.lock().pending.contains_key(file_path)
	}
}
