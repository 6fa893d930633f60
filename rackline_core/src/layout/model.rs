//! # Layout Model
//!
//! Placed modules, the connections between them, and the snapshot that ties
//! them together. A [`LayoutSnapshot`] is the unit of undo/redo history and
//! of autosave.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "modules": [
//!     { "id": "rack-a", "position": [0.0, 0.0, 0.0], "rotation": [0.0, 0.0, 0.0],
//!       "scale": [1.0, 1.0, 1.0], "color": "#4a5568", "type": "rack", "selected": false }
//!   ],
//!   "connections": [
//!     { "id": "c-1", "sourceModuleId": "ups-1", "targetModuleId": "rack-a",
//!       "type": "power", "capacity": 30.0 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canonical::to_canonical_string;
use crate::constants::equipment_price;
use crate::errors::{CalcError, CalcResult};

/// x, y, z triple
pub type Vec3 = [f64; 3];

pub const DEFAULT_MODULE_COLOR: &str = "#808080";

/// A placed piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: String,
    /// Equipment type, e.g. "rack", "ups", "crac"
    #[serde(rename = "type")]
    pub module_type: String,
    /// Mirrors the editor selection in views; the editor's
    /// `selected_module_id` is authoritative.
    #[serde(default)]
    pub selected: bool,
}

impl Module {
    /// New module at the origin with a fresh UUID and identity transform.
    ///
    /// ```rust
    /// use rackline_core::layout::Module;
    ///
    /// let rack = Module::new("rack").at([2.0, 0.0, 4.0]);
    /// assert_eq!(rack.scale, [1.0, 1.0, 1.0]);
    /// assert_eq!(rack.position[2], 4.0);
    /// ```
    pub fn new(module_type: impl Into<String>) -> Self {
        Module {
            id: Uuid::new_v4().to_string(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            color: DEFAULT_MODULE_COLOR.to_string(),
            module_type: module_type.into(),
            selected: false,
        }
    }

    /// Override the id (builder pattern)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the position (builder pattern)
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

/// Partial module edit, merged by id. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl ModuleUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        ModuleUpdate {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Merge the set fields into `module`.
    pub fn apply_to(&self, module: &mut Module) {
        if let Some(position) = self.position {
            module.position = position;
        }
        if let Some(rotation) = self.rotation {
            module.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            module.scale = scale;
        }
        if let Some(color) = &self.color {
            module.color = color.clone();
        }
        if let Some(module_type) = &self.module_type {
            module.module_type = module_type.clone();
        }
        if let Some(selected) = self.selected {
            module.selected = selected;
        }
    }
}

/// What a connection carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Power,
    Network,
    Cooling,
}

impl ConnectionType {
    pub const ALL: [ConnectionType; 3] = [
        ConnectionType::Power,
        ConnectionType::Network,
        ConnectionType::Cooling,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionType::Power => "Power",
            ConnectionType::Network => "Network",
            ConnectionType::Cooling => "Cooling",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "power" | "electrical" => Ok(ConnectionType::Power),
            "network" | "data" => Ok(ConnectionType::Network),
            "cooling" | "chilled water" => Ok(ConnectionType::Cooling),
            _ => Err(CalcError::invalid_input(
                "connection_type",
                s,
                "Expected power, network or cooling",
            )),
        }
    }
}

/// Link between two modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source_module_id: String,
    pub target_module_id: String,
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    /// Rated capacity in the unit of the connection type (kW, Gbps, kW thermal)
    pub capacity: f64,
}

impl Connection {
    pub fn new(
        source_module_id: impl Into<String>,
        target_module_id: impl Into<String>,
        connection_type: ConnectionType,
        capacity: f64,
    ) -> Self {
        Connection {
            id: Uuid::new_v4().to_string(),
            source_module_id: source_module_id.into(),
            target_module_id: target_module_id.into(),
            connection_type,
            capacity,
        }
    }

    /// Override the id (builder pattern)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// True if either endpoint is `module_id`
    pub fn touches(&self, module_id: &str) -> bool {
        self.source_module_id == module_id || self.target_module_id == module_id
    }
}

/// Modules plus connections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl LayoutSnapshot {
    pub fn new(modules: Vec<Module>, connections: Vec<Connection>) -> Self {
        LayoutSnapshot {
            modules,
            connections,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.connections.is_empty()
    }

    /// Canonical JSON used for change detection.
    pub fn fingerprint(&self) -> CalcResult<String> {
        to_canonical_string(self)
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn contains_module(&self, id: &str) -> bool {
        self.module(id).is_some()
    }

    /// Connections with `module_id` as source or target
    pub fn connections_of<'a>(
        &'a self,
        module_id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.touches(module_id))
    }

    /// Total rated capacity of connections of one type
    pub fn connected_capacity(&self, connection_type: ConnectionType) -> f64 {
        self.connections
            .iter()
            .filter(|c| c.connection_type == connection_type)
            .map(|c| c.capacity)
            .sum()
    }

    /// Budget equipment cost of every priced module in the layout.
    pub fn equipment_cost(&self) -> EquipmentCost {
        let mut cost = EquipmentCost::default();
        for module in &self.modules {
            match equipment_price(&module.module_type) {
                Some(price) => {
                    cost.capex += price.unit_cost;
                    cost.annual_maintenance += price.annual_maintenance;
                }
                None => cost.unpriced.push(module.module_type.clone()),
            }
        }
        cost.unpriced.sort();
        cost.unpriced.dedup();
        cost
    }
}

/// Budget cost summary for a layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentCost {
    pub capex: f64,
    pub annual_maintenance: f64,
    /// Module types with no price entry
    pub unpriced: Vec<String>,
}
