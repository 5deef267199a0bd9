pub mod classifier;
pub mod config;
pub mod debounce;
mod engine;
mod error;
mod events;
pub mod logging;
pub mod relocator;
mod session;
mod settings;

pub use classifier::{classify, Category, CategoryTable};
pub use config::{ConfigurationSource, FileSettingsSource, SettingsFileStore, StaticSource};
pub use debounce::{DebouncePolicy, DebounceScheduler, MoveHandler, PendingMove, SortAction};
pub use engine::{sweep_directory, Engine, EngineConfig, EngineState, SweepSummary};
pub use error::{Result, SorterError};
pub use events::{arrival_paths, EventType, RelocationRecord};
pub use relocator::{relocate, sort_file, Relocation};
pub use session::WatchSession;
pub use settings::{paths_equal_ignore_case, Settings};
