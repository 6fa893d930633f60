//! # Layout History Core
//!
//! State management behind the layout editor: the module/connection model,
//! bounded undo/redo history, debounced autosave and the storage seam.
//!
//! - [`model`] - Modules, connections and snapshots
//! - [`document`] - Stored layout records and schema versioning
//! - [`history`] - Linear undo/redo history
//! - [`scheduler`] - Cancellable debounced tasks
//! - [`store`] - Storage trait and in-memory store
//! - [`editor`] - The editing session tying it all together

pub mod document;
pub mod editor;
pub mod history;
pub mod model;
pub mod scheduler;
pub mod store;

pub use document::{LayoutDocument, LayoutUpdate, NewLayout, SCHEMA_VERSION};
pub use editor::{Collaborators, LayoutEditor, SaveIdentity, UNTITLED_LAYOUT};
pub use history::{History, HistoryEntry, MAX_HISTORY_ENTRIES};
pub use model::{Connection, ConnectionType, EquipmentCost, LayoutSnapshot, Module, ModuleUpdate};
pub use scheduler::Debouncer;
pub use store::{LayoutStore, MemoryLayoutStore};
