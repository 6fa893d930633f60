//! # Engineering Constants
//!
//! Physical constants, validation thresholds and default tables used by the
//! sizing calculators.
//!
//! ## Constant Groups
//!
//! | Module      | Contents                                          |
//! |-------------|---------------------------------------------------|
//! | `ieee`      | Fault-current and arc-flash factors               |
//! | `cable`     | Conductor resistivities and run-length limits     |
//! | `electrical`| Standard voltages, current/PF warning levels      |
//! | `ashrae`    | Recommended thermal envelope, rack density levels |
//! | `cooling`   | Sensible-heat and chilled-water rules of thumb    |
//! | `psychro`   | Magnus-formula coefficients                       |
//! | `economic`  | Discount/inflation rates, horizon, energy split   |
//!
//! The values are simple engineering approximations and the calculators
//! apply them as-is.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

// ============================================================================
// Electrical
// ============================================================================

/// Fault-current and arc-flash factors (IEEE 1584 simplified).
pub mod ieee {
    /// Source voltage factor applied to nominal voltage for fault current
    pub const VOLTAGE_FACTOR: f64 = 1.05;
    /// Divisor converting cable resistance to three-phase impedance (√3)
    pub const IMPEDANCE_FACTOR: f64 = 1.732;
    /// Incident-energy coefficient
    pub const INCIDENT_ENERGY_FACTOR: f64 = 1.5;
    /// Arcing time factor
    pub const TIME_FACTOR: f64 = 2.0;
    /// Working distance in mm
    pub const DISTANCE_FACTOR: f64 = 610.0;
    /// Short-circuit current multiplier over fault current
    pub const SHORT_CIRCUIT_FACTOR: f64 = 1.25;
    /// Feeder sizing multiplier for continuous loads (NEC 125%)
    pub const FEEDER_SIZING_FACTOR: f64 = 1.25;
    /// Target power factor ceiling after correction
    pub const MAX_CORRECTED_POWER_FACTOR: f64 = 0.95;
    /// Capacitor bank correction gain
    pub const POWER_FACTOR_CORRECTION_GAIN: f64 = 1.2;
    /// Estimated THD for non-linear (switch-mode) loads
    pub const THD_NONLINEAR: f64 = 0.15;
    /// Estimated THD for linear loads
    pub const THD_LINEAR: f64 = 0.05;
}

/// Conductor properties.
pub mod cable {
    /// Copper resistivity (Ω·m at 20 °C)
    pub const COPPER_RESISTIVITY: f64 = 1.724e-8;
    /// Aluminum resistivity (Ω·m at 20 °C)
    pub const ALUMINUM_RESISTIVITY: f64 = 2.82e-8;
    /// Runs longer than this (m) get a voltage-drop warning
    pub const LONG_RUN_M: f64 = 100.0;
    /// Maximum conductor operating temperature (°C, XLPE/THHN)
    pub const MAX_CONDUCTOR_TEMP_C: f64 = 90.0;
}

/// Electrical validation thresholds.
pub mod electrical {
    /// Common low-voltage distribution levels (V)
    pub const STANDARD_VOLTAGES: [f64; 10] =
        [120.0, 208.0, 230.0, 240.0, 277.0, 400.0, 415.0, 480.0, 600.0, 690.0];
    /// Currents above this (A) get a warning
    pub const HIGH_CURRENT_A: f64 = 3000.0;
    /// Power factors below this get a warning
    pub const LOW_POWER_FACTOR: f64 = 0.85;
    /// Breaker trip times (s) for the two-stage coordination table
    pub const BRANCH_TRIP_TIME_S: f64 = 0.1;
    pub const MAIN_TRIP_TIME_S: f64 = 0.3;
    /// Breaker rating multipliers over fault current
    pub const BRANCH_RATING_FACTOR: f64 = 1.25;
    pub const MAIN_RATING_FACTOR: f64 = 1.5;
}

// ============================================================================
// Thermal
// ============================================================================

/// ASHRAE TC 9.9 thermal guidelines.
pub mod ashrae {
    /// Recommended supply air range (°C)
    pub const RECOMMENDED_SUPPLY_MIN_C: f64 = 18.0;
    pub const RECOMMENDED_SUPPLY_MAX_C: f64 = 27.0;
    /// Relative humidity band (%)
    pub const HUMIDITY_MIN_PCT: f64 = 20.0;
    pub const HUMIDITY_MAX_PCT: f64 = 80.0;
    /// Rack density (kW/rack) above which containment is expected
    pub const HIGH_RACK_DENSITY_KW: f64 = 20.0;
    /// Rack density (kW/rack) above which air cooling is impractical (DLC)
    pub const LIQUID_COOLING_RACK_DENSITY_KW: f64 = 50.0;
}

/// Cooling sizing rules of thumb.
pub mod cooling {
    /// Capacity safety margin over IT load
    pub const SAFETY_MARGIN: f64 = 1.2;
    /// Sensible-heat constant for air (BTU/h per CFM·°F)
    pub const AIR_SENSIBLE_HEAT_FACTOR: f64 = 1.08;
    /// Water heat constant (BTU/h per GPM·°F at 10 °F ΔT basis)
    pub const WATER_HEAT_FACTOR: f64 = 500.0;
    /// Density of water (lb/gal)
    pub const WATER_DENSITY_LB_PER_GAL: f64 = 8.34;
    /// Heat rejection over IT load (compressor work included)
    pub const HEAT_REJECTION_FACTOR: f64 = 1.3;
}

/// Magnus-formula coefficients for psychrometrics.
pub mod psychro {
    /// Dew point coefficients (Magnus, over water)
    pub const MAGNUS_A: f64 = 17.27;
    pub const MAGNUS_B: f64 = 237.3;
    /// Saturation vapour pressure coefficients (Bolton)
    pub const SATURATION_HPA: f64 = 6.112;
    pub const SATURATION_A: f64 = 17.67;
    pub const SATURATION_B: f64 = 243.5;
    /// Water vapour gas-constant factor (g/m³ per hPa/K)
    pub const ABSOLUTE_HUMIDITY_FACTOR: f64 = 2.1674;
    /// Specific heat of dry air (kJ/kg·K)
    pub const CP_AIR: f64 = 1.006;
    /// Specific heat of water vapour (kJ/kg·K)
    pub const CP_VAPOUR: f64 = 1.86;
    /// Latent heat of vaporisation at 0 °C (kJ/kg)
    pub const LATENT_HEAT: f64 = 2501.0;
}

// ============================================================================
// Economic
// ============================================================================

/// Financial assumptions.
pub mod economic {
    /// Discount rate for NPV
    pub const DISCOUNT_RATE: f64 = 0.08;
    /// Annual cost escalation for TCO
    pub const INFLATION_RATE: f64 = 0.02;
    /// Evaluation horizon in years
    pub const HORIZON_YEARS: u32 = 10;
    /// Longest horizon accepted; longer settings are clamped
    pub const MAX_HORIZON_YEARS: u32 = 50;
    /// Share of operating hours billed at the peak rate
    pub const PEAK_SHARE: f64 = 0.6;
    /// Share of operating hours billed at the off-peak rate
    pub const OFF_PEAK_SHARE: f64 = 0.4;
    /// Baseline cost markup assumed for the counterfactual design
    pub const BASELINE_COST_MARKUP: f64 = 1.3;
    /// Hours in a (non-leap) year
    pub const HOURS_PER_YEAR: f64 = 8760.0;
    /// IRR solver settings
    pub const IRR_INITIAL_GUESS: f64 = 0.1;
    pub const IRR_TOLERANCE: f64 = 1e-4;
    pub const IRR_MAX_ITERATIONS: u32 = 100;
}

// ============================================================================
// Default Parameter Sets
// ============================================================================

/// Default calculator inputs for a new design.
pub mod defaults {
    pub const VOLTAGE_V: f64 = 400.0;
    pub const CURRENT_A: f64 = 100.0;
    pub const POWER_FACTOR: f64 = 0.9;
    pub const CABLE_RUN_M: f64 = 30.0;
    pub const CABLE_TEMP_C: f64 = 30.0;

    pub const IT_LOAD_KW: f64 = 100.0;
    pub const SUPPLY_TEMP_C: f64 = 20.0;
    pub const RETURN_TEMP_C: f64 = 32.0;
    pub const AMBIENT_TEMP_C: f64 = 25.0;
    pub const RELATIVE_HUMIDITY_PCT: f64 = 45.0;
    pub const TARGET_HUMIDITY_PCT: f64 = 50.0;
    pub const RACK_DENSITY_KW: f64 = 10.0;
    pub const ROOM_LENGTH_M: f64 = 12.0;
    pub const ROOM_WIDTH_M: f64 = 3.0;
    pub const ROOM_HEIGHT_M: f64 = 3.0;

    pub const POWER_COST: f64 = 120_000.0;
    pub const COOLING_COST: f64 = 48_000.0;
    pub const MAINTENANCE_COST: f64 = 20_000.0;
    pub const INITIAL_INVESTMENT: f64 = 500_000.0;
    pub const OPERATIONAL_HOURS: f64 = 8760.0;
    pub const PEAK_RATE: f64 = 0.15;
    pub const OFF_PEAK_RATE: f64 = 0.08;
    /// kg CO₂ per unit of energy spend
    pub const CARBON_EMISSION_FACTOR: f64 = 0.4;
}

/// Budget price for a piece of equipment that can be placed in a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquipmentPrice {
    /// Purchase and installation cost (USD)
    pub unit_cost: f64,
    /// Yearly maintenance cost (USD)
    pub annual_maintenance: f64,
}

/// Budget pricing keyed by module type, as placed by the layout editor.
pub static EQUIPMENT_PRICING: Lazy<BTreeMap<&'static str, EquipmentPrice>> = Lazy::new(|| {
    BTreeMap::from([
        ("rack", EquipmentPrice { unit_cost: 4_500.0, annual_maintenance: 150.0 }),
        ("ups", EquipmentPrice { unit_cost: 60_000.0, annual_maintenance: 3_500.0 }),
        ("pdu", EquipmentPrice { unit_cost: 8_000.0, annual_maintenance: 400.0 }),
        ("crac", EquipmentPrice { unit_cost: 45_000.0, annual_maintenance: 2_800.0 }),
        ("chiller", EquipmentPrice { unit_cost: 120_000.0, annual_maintenance: 7_500.0 }),
        ("generator", EquipmentPrice { unit_cost: 150_000.0, annual_maintenance: 6_000.0 }),
        ("battery", EquipmentPrice { unit_cost: 35_000.0, annual_maintenance: 1_200.0 }),
        ("cdu", EquipmentPrice { unit_cost: 55_000.0, annual_maintenance: 3_000.0 }),
    ])
});

/// Look up the budget price for a module type (case-insensitive).
pub fn equipment_price(module_type: &str) -> Option<EquipmentPrice> {
    EQUIPMENT_PRICING
        .get(module_type.to_ascii_lowercase().as_str())
        .copied()
}
