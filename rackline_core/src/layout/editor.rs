//! # Layout Editor
//!
//! In-memory editing session for one layout: module and connection
//! mutations, bounded undo/redo, change detection against the last save,
//! and debounced autosave to a [`LayoutStore`].
//!
//! ## State Machine
//!
//! ```text
//! Idle --mutation(changed)--> Recorded --undo--> Restored (not recorded)
//!                                 ^                   |
//!                                 +----mutation-------+  (redo branch dropped)
//! ```
//!
//! Every recorded mutation with unsaved changes (re)starts the autosave
//! quiet period. A write that fails leaves `has_changes` set; the next
//! mutation or an explicit [`LayoutEditor::save_changes`] retries.
//!
//! ## Example
//!
//! ```rust
//! use rackline_core::layout::{Connection, ConnectionType, LayoutEditor, Module};
//!
//! let editor = LayoutEditor::detached().unwrap();
//! let ups = Module::new("ups");
//! let rack = Module::new("rack");
//! let link = Connection::new(&ups.id, &rack.id, ConnectionType::Power, 30.0);
//!
//! editor.add_module(ups.clone()).unwrap();
//! editor.add_module(rack).unwrap();
//! editor.add_connection(link).unwrap();
//! editor.remove_module(&ups.id).unwrap();
//!
//! assert_eq!(editor.modules().len(), 1);
//! assert!(editor.connections().is_empty());
//!
//! editor.undo().unwrap();
//! assert_eq!(editor.connections().len(), 1);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::{CalcError, CalcResult};
use crate::layout::document::{LayoutUpdate, NewLayout};
use crate::layout::history::{History, HistoryEntry};
use crate::layout::model::{Connection, LayoutSnapshot, Module, ModuleUpdate};
use crate::layout::scheduler::Debouncer;
use crate::layout::store::{LayoutStore, MemoryLayoutStore};
use crate::monitoring::{Monitor, OperationLog, OperationStatus, TracingMonitor};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::settings::{AutosaveSettings, EngineSettings};

/// Name given to a layout created by [`LayoutEditor::open`].
pub const UNTITLED_LAYOUT: &str = "Untitled layout";

/// Layout and user a session saves as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveIdentity {
    pub layout_id: String,
    pub user_id: String,
}

impl SaveIdentity {
    pub fn new(layout_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        SaveIdentity {
            layout_id: layout_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// External services an editor talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn LayoutStore>,
    pub notifier: Arc<dyn Notifier>,
    pub monitor: Arc<dyn Monitor>,
}

impl Collaborators {
    /// `store` plus tracing-backed notifier and monitor
    pub fn new(store: Arc<dyn LayoutStore>) -> Self {
        Collaborators {
            store,
            notifier: Arc::new(TracingNotifier),
            monitor: Arc::new(TracingMonitor),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_monitor(mut self, monitor: Arc<dyn Monitor>) -> Self {
        self.monitor = monitor;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveTrigger {
    Autosave,
    Manual,
}

impl SaveTrigger {
    fn action(self) -> &'static str {
        match self {
            SaveTrigger::Autosave => "autosave",
            SaveTrigger::Manual => "save",
        }
    }
}

struct EditorState {
    snapshot: LayoutSnapshot,
    fingerprint: String,
    selected_module_id: Option<String>,
    has_changes: bool,
    last_saved: String,
    history: History,
}

impl EditorState {
    /// Refresh change tracking after `snapshot` was modified and record a
    /// history entry. Returns whether an entry was recorded.
    fn commit(&mut self, monitor: &dyn Monitor) -> CalcResult<bool> {
        let mut entry = HistoryEntry::new(
            self.snapshot.clone(),
            self.selected_module_id.clone(),
            false,
        )?;
        self.fingerprint = entry.fingerprint().to_string();
        self.has_changes = self.fingerprint != self.last_saved;
        entry.has_changes = self.has_changes;

        match self.history.record(entry.clone()) {
            Ok(recorded) => Ok(recorded),
            Err(error) => {
                self.recover_history(entry, &error, monitor);
                Ok(true)
            }
        }
    }

    /// Snapshot with each module's `selected` flag set from the selection.
    fn view(&self) -> LayoutSnapshot {
        let mut view = self.snapshot.clone();
        for module in &mut view.modules {
            module.selected = self.selected_module_id.as_deref() == Some(module.id.as_str());
        }
        view
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.fingerprint = entry.fingerprint().to_string();
        self.has_changes = self.fingerprint != self.last_saved;
        self.snapshot = entry.snapshot;
        self.selected_module_id = entry.selected_module_id;
    }

    fn current_entry(&self) -> CalcResult<HistoryEntry> {
        HistoryEntry::new(
            self.snapshot.clone(),
            self.selected_module_id.clone(),
            self.has_changes,
        )
    }

    fn recover_history(&mut self, entry: HistoryEntry, error: &CalcError, monitor: &dyn Monitor) {
        tracing::warn!(%error, "history corrupted; resetting to current state");
        monitor.log_operation(
            OperationLog::new("layout", "history", OperationStatus::Warning).with_error(error),
        );
        self.history.reset(entry);
    }
}

struct Session {
    state: Mutex<EditorState>,
    identity: Option<SaveIdentity>,
    collaborators: Collaborators,
}

impl Session {
    /// Write the current state if it has unsaved changes.
    async fn persist(&self, trigger: SaveTrigger) -> CalcResult<bool> {
        let identity = match &self.identity {
            Some(identity) => identity,
            None => {
                let error = CalcError::persistence(
                    trigger.action(),
                    "layout id and acting user are required to save",
                );
                self.report_failure(trigger, &error);
                return Err(error);
            }
        };

        let (update, fingerprint) = {
            let state = self.state.lock();
            if !state.has_changes {
                return Ok(false);
            }
            (
                LayoutUpdate::from_snapshot(state.snapshot.clone()),
                state.fingerprint.clone(),
            )
        };

        let result = self
            .collaborators
            .store
            .update_layout(&identity.layout_id, update, &identity.user_id)
            .await
            .map_err(|error| match error {
                CalcError::Persistence { .. } => error,
                other => CalcError::persistence(trigger.action(), other.to_string()),
            });

        match result {
            Ok(()) => {
                {
                    let mut state = self.state.lock();
                    state.last_saved = fingerprint;
                    state.has_changes = state.fingerprint != state.last_saved;
                }
                tracing::info!(
                    layout_id = %identity.layout_id,
                    action = trigger.action(),
                    "layout saved"
                );
                self.collaborators.monitor.log_operation(OperationLog::new(
                    "layout",
                    trigger.action(),
                    OperationStatus::Success,
                ));
                if trigger == SaveTrigger::Manual {
                    self.collaborators.notifier.notify(Notification::success(
                        "Layout saved",
                        "All changes have been saved.",
                    ));
                }
                Ok(true)
            }
            Err(error) => {
                self.report_failure(trigger, &error);
                Err(error)
            }
        }
    }

    fn report_failure(&self, trigger: SaveTrigger, error: &CalcError) {
        tracing::warn!(action = trigger.action(), %error, "layout save failed");
        self.collaborators.monitor.log_operation(
            OperationLog::new("layout", trigger.action(), OperationStatus::Failure)
                .with_error(error),
        );
        let title = match trigger {
            SaveTrigger::Autosave => "Autosave failed",
            SaveTrigger::Manual => "Save failed",
        };
        self.collaborators
            .notifier
            .notify(Notification::destructive(title, error.to_string()));
    }
}

/// Editing session for one layout.
pub struct LayoutEditor {
    session: Arc<Session>,
    autosave: AutosaveSettings,
    debouncer: Debouncer,
}

impl LayoutEditor {
    /// Start a session from `initial`, treated as already saved.
    pub fn new(
        initial: LayoutSnapshot,
        identity: Option<SaveIdentity>,
        collaborators: Collaborators,
        settings: &EngineSettings,
    ) -> CalcResult<Self> {
        let mut initial = initial;
        let selected_module_id = take_selection_flags(&mut initial.modules);
        let entry = HistoryEntry::new(initial.clone(), selected_module_id.clone(), false)?;
        let fingerprint = entry.fingerprint().to_string();
        let state = EditorState {
            snapshot: initial,
            last_saved: fingerprint.clone(),
            fingerprint,
            selected_module_id,
            has_changes: false,
            history: History::new(entry, settings.history.max_entries),
        };

        Ok(LayoutEditor {
            session: Arc::new(Session {
                state: Mutex::new(state),
                identity,
                collaborators,
            }),
            autosave: settings.autosave.clone(),
            debouncer: Debouncer::new(settings.autosave.debounce()),
        })
    }

    /// Empty session with no save identity, backed by an in-memory store.
    pub fn detached() -> CalcResult<Self> {
        LayoutEditor::new(
            LayoutSnapshot::default(),
            None,
            Collaborators::new(Arc::new(MemoryLayoutStore::new())),
            &EngineSettings::default(),
        )
    }

    /// Load `layout_id` from the store.
    ///
    /// When the store has no such layout, an empty one owned by `user_id`
    /// is created and the session saves to the new id instead.
    ///
    /// # Returns
    ///
    /// * `Err(CalcError::VersionMismatch)` - If the stored schema is incompatible
    /// * `Err(_)` - Any error from the store
    pub async fn open(
        layout_id: impl Into<String>,
        user_id: impl Into<String>,
        collaborators: Collaborators,
        settings: &EngineSettings,
    ) -> CalcResult<Self> {
        let mut identity = SaveIdentity::new(layout_id, user_id);
        let store = &collaborators.store;
        let initial = match store.get_layout(&identity.layout_id).await? {
            Some(document) => {
                document.check_schema_version()?;
                document.snapshot()
            }
            None => {
                let created = store
                    .create_layout(NewLayout::empty(UNTITLED_LAYOUT, identity.user_id.clone()))
                    .await?;
                tracing::info!(
                    requested = %identity.layout_id,
                    layout_id = %created,
                    "layout not found; created an empty one"
                );
                identity.layout_id = created;
                LayoutSnapshot::default()
            }
        };
        LayoutEditor::new(initial, Some(identity), collaborators, settings)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add a module. Rejects a duplicate id. A module flagged `selected`
    /// becomes the selection.
    pub fn add_module(&self, mut module: Module) -> CalcResult<()> {
        self.mutate(|state| {
            if state.snapshot.contains_module(&module.id) {
                return Err(CalcError::invalid_input(
                    "module.id",
                    module.id.clone(),
                    "A module with this id already exists",
                ));
            }
            if std::mem::take(&mut module.selected) {
                state.selected_module_id = Some(module.id.clone());
            }
            state.snapshot.modules.push(module);
            Ok(())
        })
    }

    /// Remove a module together with every connection that references it.
    pub fn remove_module(&self, id: &str) -> CalcResult<()> {
        self.mutate(|state| {
            if !state.snapshot.contains_module(id) {
                return Err(CalcError::not_found("module", id));
            }
            state.snapshot.modules.retain(|m| m.id != id);
            state.snapshot.connections.retain(|c| !c.touches(id));
            if state.selected_module_id.as_deref() == Some(id) {
                state.selected_module_id = None;
            }
            Ok(())
        })
    }

    /// Merge `update` into the module with the same id. `selected` moves
    /// the selection rather than being stored on the module.
    pub fn update_module(&self, update: ModuleUpdate) -> CalcResult<()> {
        self.mutate(|state| {
            let module = state
                .snapshot
                .modules
                .iter_mut()
                .find(|m| m.id == update.id)
                .ok_or_else(|| CalcError::not_found("module", update.id.clone()))?;
            update.apply_to(module);
            module.selected = false;

            match update.selected {
                Some(true) => state.selected_module_id = Some(update.id.clone()),
                Some(false) if state.selected_module_id.as_deref() == Some(update.id.as_str()) => {
                    state.selected_module_id = None;
                }
                _ => {}
            }
            Ok(())
        })
    }

    /// Add a connection between two existing modules.
    pub fn add_connection(&self, connection: Connection) -> CalcResult<()> {
        self.mutate(|state| {
            if state.snapshot.connections.iter().any(|c| c.id == connection.id) {
                return Err(CalcError::invalid_input(
                    "connection.id",
                    connection.id.clone(),
                    "A connection with this id already exists",
                ));
            }
            for (field, endpoint) in [
                ("connection.sourceModuleId", &connection.source_module_id),
                ("connection.targetModuleId", &connection.target_module_id),
            ] {
                if !state.snapshot.contains_module(endpoint) {
                    return Err(CalcError::invalid_input(
                        field,
                        endpoint.clone(),
                        "Connection endpoint is not in the layout",
                    ));
                }
            }
            state.snapshot.connections.push(connection);
            Ok(())
        })
    }

    pub fn remove_connection(&self, id: &str) -> CalcResult<()> {
        self.mutate(|state| {
            if !state.snapshot.connections.iter().any(|c| c.id == id) {
                return Err(CalcError::not_found("connection", id));
            }
            state.snapshot.connections.retain(|c| c.id != id);
            Ok(())
        })
    }

    /// Remove all modules and connections.
    pub fn clear_all(&self) -> CalcResult<()> {
        self.mutate(|state| {
            state.snapshot.modules.clear();
            state.snapshot.connections.clear();
            state.selected_module_id = None;
            Ok(())
        })
    }

    /// Change the selection. Not recorded in history.
    pub fn select_module(&self, id: Option<&str>) -> CalcResult<()> {
        let mut state = self.session.state.lock();
        if let Some(id) = id {
            if !state.snapshot.contains_module(id) {
                return Err(CalcError::not_found("module", id));
            }
        }
        state.selected_module_id = id.map(str::to_string);
        Ok(())
    }

    fn mutate<F>(&self, apply: F) -> CalcResult<()>
    where
        F: FnOnce(&mut EditorState) -> CalcResult<()>,
    {
        let schedule = {
            let mut state = self.session.state.lock();
            apply(&mut *state)?;
            let recorded = state.commit(self.session.collaborators.monitor.as_ref())?;
            recorded && state.has_changes
        };
        if schedule {
            self.schedule_autosave();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------

    /// Step back one entry. Returns `false` at the oldest entry.
    pub fn undo(&self) -> CalcResult<bool> {
        self.step(|history| history.undo())
    }

    /// Step forward one entry. Returns `false` at the newest entry.
    pub fn redo(&self) -> CalcResult<bool> {
        self.step(|history| history.redo())
    }

    pub fn can_undo(&self) -> bool {
        self.session.state.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.state.lock().history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.session.state.lock().history.len()
    }

    fn step<F>(&self, walk: F) -> CalcResult<bool>
    where
        F: FnOnce(&mut History) -> CalcResult<Option<&HistoryEntry>>,
    {
        let schedule = {
            let mut state = self.session.state.lock();
            let target = walk(&mut state.history).map(|entry| entry.cloned());
            match target {
                Ok(Some(entry)) => {
                    state.restore(entry);
                    state.has_changes
                }
                Ok(None) => return Ok(false),
                Err(error) => {
                    let entry = state.current_entry()?;
                    let monitor = self.session.collaborators.monitor.as_ref();
                    state.recover_history(entry, &error, monitor);
                    return Ok(false);
                }
            }
        };
        if schedule {
            self.schedule_autosave();
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Persist now, bypassing the debounce.
    ///
    /// Returns `Ok(false)` when there was nothing to save. Waits for an
    /// in-flight autosave to finish first.
    pub async fn save_changes(&self) -> CalcResult<bool> {
        self.debouncer.cancel();
        let gate = self.debouncer.gate();
        let _exclusive = gate.lock().await;
        self.session.persist(SaveTrigger::Manual).await
    }

    /// Cancel a pending autosave. Unsaved changes stay flagged.
    pub fn dispose(&self) {
        if self.debouncer.cancel() {
            tracing::debug!("pending autosave cancelled");
        }
    }

    pub fn is_autosave_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn schedule_autosave(&self) {
        if !self.autosave.enabled || self.session.identity.is_none() {
            return;
        }
        let session = self.session.clone();
        self.debouncer.schedule(async move {
            // Failures are reported by `persist`.
            let _ = session.persist(SaveTrigger::Autosave).await;
        });
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current modules and connections, with `selected` flags filled in.
    pub fn snapshot(&self) -> LayoutSnapshot {
        self.session.state.lock().view()
    }

    pub fn modules(&self) -> Vec<Module> {
        self.session.state.lock().view().modules
    }

    pub fn connections(&self) -> Vec<Connection> {
        self.session.state.lock().snapshot.connections.clone()
    }

    pub fn selected_module_id(&self) -> Option<String> {
        self.session.state.lock().selected_module_id.clone()
    }

    /// Current state differs from the last successful save
    pub fn has_changes(&self) -> bool {
        self.session.state.lock().has_changes
    }

    pub fn identity(&self) -> Option<&SaveIdentity> {
        self.session.identity.as_ref()
    }
}

/// Clear every `selected` flag, returning the first flagged module's id.
fn take_selection_flags(modules: &mut [Module]) -> Option<String> {
    let mut selected = None;
    for module in modules {
        if std::mem::take(&mut module.selected) && selected.is_none() {
            selected = Some(module.id.clone());
        }
    }
    selected
}

impl Drop for LayoutEditor {
    fn drop(&mut self) {
        self.dispose();
    }
}
