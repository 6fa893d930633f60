//! Layout edit scripts.
//!
//! A script is a JSON array of steps applied to a fresh layout in an
//! in-memory store:
//!
//! ```json
//! [
//!   { "op": "addModule", "id": "ups-1", "type": "ups" },
//!   { "op": "addModule", "id": "rack-1", "type": "rack", "position": [2.0, 0.0, 0.0] },
//!   { "op": "addConnection", "source": "ups-1", "target": "rack-1", "type": "power", "capacity": 30.0 },
//!   { "op": "wait", "ms": 2500 },
//!   { "op": "undo" }
//! ]
//! ```
//!
//! Pending changes are saved explicitly once the last step has run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rackline_core::layout::model::{EquipmentCost, Vec3};
use rackline_core::layout::{
    Collaborators, Connection, ConnectionType, LayoutEditor, LayoutStore, MemoryLayoutStore,
    Module, ModuleUpdate, NewLayout,
};
use rackline_core::EngineSettings;

const SCRIPT_USER: &str = "cli";

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Step {
    AddModule {
        #[serde(rename = "type")]
        module_type: String,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        position: Option<Vec3>,
    },
    RemoveModule {
        id: String,
    },
    UpdateModule(ModuleUpdate),
    AddConnection {
        #[serde(default)]
        id: Option<String>,
        source: String,
        target: String,
        #[serde(rename = "type")]
        connection_type: ConnectionType,
        capacity: f64,
    },
    RemoveConnection {
        id: String,
    },
    Select {
        #[serde(default)]
        id: Option<String>,
    },
    ClearAll,
    Undo,
    Redo,
    Save,
    /// Let virtual time pass so autosave can fire
    Wait {
        ms: u64,
    },
}

/// What a replayed script left behind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOutcome {
    pub layout_id: String,
    pub steps: usize,
    pub modules: Vec<Module>,
    pub connections: Vec<Connection>,
    pub history_entries: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub stored_modules: usize,
    pub stored_connections: usize,
    pub equipment_cost: EquipmentCost,
}

fn apply(editor: &LayoutEditor, step: &Step) -> rackline_core::CalcResult<()> {
    match step {
        Step::AddModule {
            module_type,
            id,
            position,
        } => {
            let mut module = Module::new(module_type.clone());
            if let Some(id) = id {
                module = module.with_id(id.clone());
            }
            if let Some(position) = position {
                module = module.at(*position);
            }
            editor.add_module(module)
        }
        Step::RemoveModule { id } => editor.remove_module(id),
        Step::UpdateModule(update) => editor.update_module(update.clone()),
        Step::AddConnection {
            id,
            source,
            target,
            connection_type,
            capacity,
        } => {
            let mut connection = Connection::new(source, target, *connection_type, *capacity);
            if let Some(id) = id {
                connection = connection.with_id(id.clone());
            }
            editor.add_connection(connection)
        }
        Step::RemoveConnection { id } => editor.remove_connection(id),
        Step::Select { id } => editor.select_module(id.as_deref()),
        Step::ClearAll => editor.clear_all(),
        Step::Undo => editor.undo().map(|_| ()),
        Step::Redo => editor.redo().map(|_| ()),
        Step::Save | Step::Wait { .. } => Ok(()),
    }
}

/// Replay `steps` against a new in-memory layout.
pub async fn replay(steps: &[Step], settings: &EngineSettings) -> Result<LayoutOutcome> {
    let store = Arc::new(MemoryLayoutStore::new());
    let layout_id = store
        .create_layout(NewLayout::empty("cli layout", SCRIPT_USER))
        .await?;
    let editor = LayoutEditor::open(
        layout_id.clone(),
        SCRIPT_USER,
        Collaborators::new(store.clone()),
        settings,
    )
    .await?;

    for (index, step) in steps.iter().enumerate() {
        match step {
            Step::Save => {
                editor.save_changes().await?;
            }
            Step::Wait { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
            _ => apply(&editor, step)
                .with_context(|| format!("step {} ({:?}) failed", index + 1, step))?,
        }
    }
    editor.save_changes().await?;

    let stored = store
        .get_layout(&layout_id)
        .await?
        .context("layout disappeared from the store")?;
    let snapshot = editor.snapshot();

    Ok(LayoutOutcome {
        layout_id,
        steps: steps.len(),
        equipment_cost: snapshot.equipment_cost(),
        modules: snapshot.modules,
        connections: snapshot.connections,
        history_entries: editor.history_len(),
        can_undo: editor.can_undo(),
        can_redo: editor.can_redo(),
        stored_modules: stored.modules.len(),
        stored_connections: stored.connections.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<Step> {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_cascade_script() {
        let steps = parse(
            r#"[
                {"op": "addModule", "id": "A", "type": "ups"},
                {"op": "addModule", "id": "B", "type": "rack"},
                {"op": "addConnection", "source": "A", "target": "B", "type": "power", "capacity": 30.0},
                {"op": "removeModule", "id": "A"}
            ]"#,
        );
        let outcome = replay(&steps, &EngineSettings::default()).await.unwrap();

        assert_eq!(outcome.modules.len(), 1);
        assert!(outcome.connections.is_empty());
        assert_eq!(outcome.stored_modules, 1);
        assert_eq!(outcome.history_entries, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_undo_and_update() {
        let steps = parse(
            r##"[
                {"op": "addModule", "id": "A", "type": "rack"},
                {"op": "updateModule", "id": "A", "color": "#00ff00"},
                {"op": "wait", "ms": 3000},
                {"op": "undo"}
            ]"##,
        );
        let outcome = replay(&steps, &EngineSettings::default()).await.unwrap();
        assert_eq!(outcome.modules[0].color, "#808080");
        assert!(outcome.can_redo);
        assert!((outcome.equipment_cost.capex - 4_500.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_reports_failing_step() {
        let steps = parse(r#"[{"op": "removeModule", "id": "ghost"}]"#);
        let err = replay(&steps, &EngineSettings::default()).await.unwrap_err();
        assert!(err.to_string().contains("step 1"));
    }
}
