use crate::classifier::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EventType {
	Create,
	Write,
	Remove,
	RenameFrom, // Old name in rename operation
	RenameTo,   // New name in rename operation
	RenameBoth, // Both names delivered in one event
	Rename,     // Generic rename (when direction unclear)
	Other(String),
}

impl From<notify::EventKind> for EventType {
	fn from(kind: notify::EventKind) -> Self {
		match kind {
			notify::EventKind::Create(_) => EventType::Create,
			notify::EventKind::Modify(modify_kind) => match modify_kind {
				notify::event::ModifyKind::Name(name_kind) => match name_kind {
					notify::event::RenameMode::From => EventType::RenameFrom,
					notify::event::RenameMode::To => EventType::RenameTo,
					notify::event::RenameMode::Both => EventType::RenameBoth,
					_ => EventType::Rename,
				},
				_ => EventType::Write,
			},
			notify::EventKind::Remove(_) => EventType::Remove,
			notify::EventKind::Access(_) => EventType::Other("Access".to_string()),
			notify::EventKind::Other => EventType::Other("Unknown".to_string()),
			_ => EventType::Other(format!("{kind:?}")),
		}
	}
}

impl EventType {
	/// Whether this event means a file showed up in the watched directory
	pub fn is_arrival(&self) -> bool {
		matches!(
			self,
			EventType::Create | EventType::RenameTo | EventType::RenameBoth
		)
	}
}

/// Paths that arrived in the watched directory according to `event`
///
/// A `RenameBoth` event carries `[from, to]`; only the destination counts.
pub fn arrival_paths(event: &notify::Event) -> Vec<PathBuf> {
	let event_type = EventType::from(event.kind);
	if !event_type.is_arrival() {
		return Vec::new();
	}

	match event_type {
		EventType::RenameBoth => event.paths.last().cloned().into_iter().collect(),
		_ => event.paths.clone(),
	}
}

/// Structured description of one completed relocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelocationRecord {
	pub id: Uuid,
	pub source: PathBuf,
	pub destination: PathBuf,
	pub category: Category,
	pub timestamp: DateTime<Utc>,
}

impl RelocationRecord {
	pub fn new(source: PathBuf, destination: PathBuf, category: Category) -> Self {
		Self {
			id: Uuid::new_v4(),
			source,
			destination,
			category,
			timestamp: Utc::now(),
		}
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}
}
