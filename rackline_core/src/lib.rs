//! # rackline_core - Data-Center Design Calculation Engine
//!
//! `rackline_core` is the computational heart of Rackline, a modular
//! data-center layout designer. It provides power, cooling and economic sizing
//! calculations plus the undo/redo and autosave core behind the layout
//! editor. All inputs and outputs are JSON-serializable with camelCase field
//! names, matching what the web UI sends.
//!
//! ## Design Philosophy
//!
//! - **Pure calculators**: `calculate(&params)` functions with no hidden state
//! - **Explicit caches**: each calculator instance owns its cache
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Injected collaborators**: storage, notifications and monitoring are traits
//!
//! ## Quick Start
//!
//! ```rust
//! use rackline_core::calculations::service::{CalculationService, DesignInputs};
//!
//! let service = CalculationService::default();
//! let summary = service.calculate_all(&DesignInputs::default()).unwrap();
//!
//! let json = serde_json::to_string_pretty(&summary).unwrap();
//! assert!(json.contains("faultCurrent"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Power, cooling and economic calculators, caches, service
//! - [`validation`] - Input validation with errors and warnings
//! - [`constants`] - Engineering constants, defaults and equipment pricing
//! - [`units`] - Type-safe unit wrappers
//! - [`layout`] - Module/connection model, history and autosave
//! - [`monitoring`] - Operation logs and performance metrics
//! - [`notify`] - User-facing notifications
//! - [`settings`] - Engine tunables
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod canonical;
pub mod constants;
pub mod errors;
pub mod layout;
pub mod monitoring;
pub mod notify;
pub mod settings;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use calculations::service::{CalculationService, DesignInputs, DesignSummary};
pub use errors::{CalcError, CalcResult};
pub use layout::{LayoutEditor, LayoutSnapshot};
pub use settings::EngineSettings;
