//! Plain-text result reports.

use rackline_core::calculations::{
    CalculationOutput, CoolingResult, EconomicResult, PowerResult,
};

use crate::script::LayoutOutcome;

const RULE: &str = "═══════════════════════════════════════";

fn header(title: &str) {
    println!("{RULE}");
    println!("  {title}");
    println!("{RULE}");
}

fn warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("Warnings:");
    for warning in warnings {
        println!("  ⚠ {warning}");
    }
}

pub fn print_power(result: &PowerResult) {
    header("POWER DISTRIBUTION");
    println!("  Fault current:        {:.3e} A", result.fault_current);
    println!("  Short-circuit current:{:.3e} A", result.short_circuit_current);
    println!("  Arc flash energy:     {:.3e}", result.arc_flash_energy);
    println!("  Voltage drop:         {:.2} %", result.voltage_drop * 100.0);
    println!("  Corrected PF:         {:.2}", result.corrected_power_factor);
    println!("  THD:                  {:.0} %", result.harmonic_distortion * 100.0);
    println!("  Feeder size:          {:.0} A", result.required_feeder_size);
    println!();
    println!("Breakers:");
    for (stage, breaker) in result.breakers.iter().enumerate() {
        println!(
            "  {}. {:.3e} A, trip {:.1} s{}",
            stage + 1,
            breaker.rating,
            breaker.trip_time,
            if breaker.coordination { "" } else { " (not coordinated)" }
        );
    }
    warnings(&result.warnings);
    println!();
}

pub fn print_cooling(result: &CoolingResult) {
    header("COOLING");
    println!("  Required capacity:  {:.1} kW", result.required_capacity);
    println!("  Airflow:            {:.0} CFM", result.airflow);
    println!("  Chilled water:      {:.1} GPM", result.chilled_water_flow);
    println!("  Heat rejection:     {:.1} kW", result.heat_rejection);
    println!();
    println!("Psychrometrics:");
    println!("  Dew point:          {:.1} °C", result.psychrometrics.dew_point);
    println!("  Absolute humidity:  {:.2} g/m³", result.psychrometrics.absolute_humidity);
    println!("  Enthalpy:           {:.1}", result.psychrometrics.enthalpy);
    println!();
    let mark = |ok: bool| if ok { "✓" } else { "✗" };
    println!(
        "Redundancy ({:.1} kW units): N {}  N+1 {}  2N {}",
        result.redundancy.unit_capacity,
        mark(result.redundancy.n),
        mark(result.redundancy.n_plus_one),
        mark(result.redundancy.two_n)
    );
    warnings(&result.warnings);
    println!();
}

pub fn print_economic(result: &EconomicResult) {
    header("ECONOMICS");
    println!("  TCO:                {:.0}", result.tco);
    println!("  PUE:                {:.2}", result.pue);
    println!("  Annual energy cost: {:.2}", result.annual_energy_cost);
    println!("  Carbon footprint:   {:.1} kg CO₂", result.carbon_footprint);
    println!();
    println!("Return on investment:");
    println!("  Annual savings:     {:.0}", result.roi.annual_savings);
    println!("  Payback:            {:.1} years", result.roi.payback_period);
    println!("  NPV:                {:.0}", result.roi.npv);
    println!(
        "  IRR:                {:.2} %{}",
        result.roi.irr * 100.0,
        if result.roi.irr_converged { "" } else { " (estimate, not converged)" }
    );
    warnings(&result.warnings);
    println!();
}

pub fn print_output(output: &CalculationOutput) {
    match output {
        CalculationOutput::Power(result) => print_power(result),
        CalculationOutput::Cooling(result) => print_cooling(result),
        CalculationOutput::Economic(result) => print_economic(result),
    }
}

pub fn print_layout(outcome: &LayoutOutcome) {
    header("LAYOUT");
    println!("  Layout id:    {}", outcome.layout_id);
    println!("  Steps run:    {}", outcome.steps);
    println!(
        "  Modules:      {} ({} stored)",
        outcome.modules.len(),
        outcome.stored_modules
    );
    println!(
        "  Connections:  {} ({} stored)",
        outcome.connections.len(),
        outcome.stored_connections
    );
    println!(
        "  History:      {} entries, undo {}, redo {}",
        outcome.history_entries,
        if outcome.can_undo { "yes" } else { "no" },
        if outcome.can_redo { "yes" } else { "no" }
    );
    println!();
    println!("Equipment budget:");
    println!("  Capex:        {:.0}", outcome.equipment_cost.capex);
    println!("  Maintenance:  {:.0} / year", outcome.equipment_cost.annual_maintenance);
    if !outcome.equipment_cost.unpriced.is_empty() {
        println!("  Unpriced:     {}", outcome.equipment_cost.unpriced.join(", "));
    }
    println!();
}
