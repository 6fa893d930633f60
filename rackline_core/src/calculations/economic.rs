//! # Economic Calculation
//!
//! Total cost of ownership, PUE, energy cost, carbon footprint and return on
//! investment for a design over a fixed horizon (10 years by default).
//!
//! ## Cash-Flow Model
//!
//! ```text
//! annual   = power + cooling + maintenance
//! TCO      = capex + Σ(y=1..H) annual·(1+i)^y
//! savings  = annual·1.3 − annual
//! NPV(r)   = −capex + Σ(y=1..H) savings/(1+r)^y
//! IRR      = r such that NPV(r) = 0   (Newton–Raphson)
//! ```
//!
//! Savings are measured against a counterfactual design that costs 30 % more
//! to run than this one.
//!
//! ## Example
//!
//! ```rust
//! use rackline_core::calculations::economic::{calculate, EconomicParams};
//!
//! let result = calculate(&EconomicParams::default()).unwrap();
//! assert!(result.pue >= 1.0);
//! assert!(result.roi.npv.is_finite());
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, economic};
use crate::errors::{CalcError, CalcResult};
use crate::validation::{validate_economic, ValidationReport};

/// Tariff split (currency per kWh)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyRates {
    pub peak: f64,
    pub off_peak: f64,
}

/// Input parameters for the economic model.
///
/// ## JSON Example
///
/// ```json
/// {
///   "powerCost": 120000.0,
///   "coolingCost": 48000.0,
///   "maintenanceCost": 20000.0,
///   "initialInvestment": 500000.0,
///   "operationalHours": 8760.0,
///   "energyRates": { "peak": 0.15, "offPeak": 0.08 },
///   "carbonEmissionFactor": 0.4
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicParams {
    /// Annual IT power cost
    pub power_cost: f64,

    /// Annual cooling cost
    pub cooling_cost: f64,

    /// Annual maintenance cost
    pub maintenance_cost: f64,

    /// Up-front capital expenditure
    pub initial_investment: f64,

    /// Operating hours per year (0..=8760)
    pub operational_hours: f64,

    /// Peak / off-peak tariff
    pub energy_rates: EnergyRates,

    /// Emissions per unit of energy spend
    pub carbon_emission_factor: f64,
}

impl Default for EconomicParams {
    fn default() -> Self {
        EconomicParams {
            power_cost: defaults::POWER_COST,
            cooling_cost: defaults::COOLING_COST,
            maintenance_cost: defaults::MAINTENANCE_COST,
            initial_investment: defaults::INITIAL_INVESTMENT,
            operational_hours: defaults::OPERATIONAL_HOURS,
            energy_rates: EnergyRates {
                peak: defaults::PEAK_RATE,
                off_peak: defaults::OFF_PEAK_RATE,
            },
            carbon_emission_factor: defaults::CARBON_EMISSION_FACTOR,
        }
    }
}

impl EconomicParams {
    /// Validate input parameters.
    pub fn validate(&self) -> ValidationReport {
        validate_economic(self)
    }

    /// Recurring cost per year
    pub fn annual_cost(&self) -> f64 {
        self.power_cost + self.cooling_cost + self.maintenance_cost
    }
}

/// Financial assumptions for discounting and escalation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EconomicRates {
    /// Discount rate for NPV
    pub discount_rate: f64,
    /// Annual escalation of recurring costs
    pub inflation_rate: f64,
    /// Evaluation horizon (years)
    pub horizon_years: u32,
}

impl EconomicRates {
    /// Copy with the horizon clamped to `1..=MAX_HORIZON_YEARS`.
    pub fn bounded(self) -> Self {
        EconomicRates {
            horizon_years: self.horizon_years.clamp(1, economic::MAX_HORIZON_YEARS),
            ..self
        }
    }
}

impl Default for EconomicRates {
    fn default() -> Self {
        EconomicRates {
            discount_rate: economic::DISCOUNT_RATE,
            inflation_rate: economic::INFLATION_RATE,
            horizon_years: economic::HORIZON_YEARS,
        }
    }
}

/// Return-on-investment metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiMetrics {
    /// Yearly savings against the counterfactual design
    pub annual_savings: f64,
    /// Years to recover the initial investment
    pub payback_period: f64,
    /// Net present value at the discount rate
    pub npv: f64,
    /// Internal rate of return estimate
    pub irr: f64,
    /// False when the IRR solver ran out of iterations or hit a flat slope
    pub irr_converged: bool,
}

/// Cost totals over the horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub capex: f64,
    pub opex: f64,
    pub maintenance: f64,
    pub energy: f64,
}

/// Results from the economic model.
///
/// ## JSON Example
///
/// ```json
/// {
///   "tco": 2599720.4,
///   "pue": 1.4,
///   "annualEnergyCost": 1068.72,
///   "carbonFootprint": 427.49,
///   "roi": {
///     "annualSavings": 56400.0,
///     "paybackPeriod": 8.87,
///     "npv": -121552.7,
///     "irr": 0.0226,
///     "irrConverged": true
///   },
///   "costBreakdown": { "capex": 500000.0, "opex": 10687.2, "maintenance": 200000.0, "energy": 10687.2 },
///   "warnings": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicResult {
    /// Total cost of ownership over the horizon
    pub tco: f64,

    /// Power usage effectiveness
    pub pue: f64,

    /// Yearly energy spend from the tariff split
    pub annual_energy_cost: f64,

    /// Emissions attributable to the energy spend
    pub carbon_footprint: f64,

    /// Return-on-investment metrics
    pub roi: RoiMetrics,

    /// Cost totals over the horizon
    pub cost_breakdown: CostBreakdown,

    /// Non-blocking validation findings
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Calculate with the default rates (8 % discount, 2 % inflation, 10 years).
pub fn calculate(params: &EconomicParams) -> CalcResult<EconomicResult> {
    calculate_with_rates(params, &EconomicRates::default())
}

/// Calculate with explicit discount/inflation rates and horizon.
///
/// # Returns
///
/// * `Ok(EconomicResult)` - Calculation results
/// * `Err(CalcError::Validation)` - If inputs are invalid
/// * `Err(CalcError::CalculationFailed)` - If PUE or payback is undefined
///   (zero power cost or zero savings)
pub fn calculate_with_rates(
    params: &EconomicParams,
    rates: &EconomicRates,
) -> CalcResult<EconomicResult> {
    let mut warnings = params.validate().into_result()?;

    if params.power_cost <= 0.0 {
        return Err(CalcError::calculation_failed(
            "economic",
            "PUE is undefined when power cost is zero",
        ));
    }

    let horizon = rates.bounded().horizon_years;
    if horizon != rates.horizon_years {
        warnings.push(format!(
            "Horizon of {} years clamped to {} years",
            rates.horizon_years, horizon
        ));
    }
    let annual_cost = params.annual_cost();

    let tco =
        params.initial_investment + escalated_total(annual_cost, rates.inflation_rate, horizon);
    let pue = (params.power_cost + params.cooling_cost) / params.power_cost;

    let annual_energy_cost = annual_energy_cost(params);
    let carbon_footprint = annual_energy_cost * params.carbon_emission_factor;

    let annual_savings = annual_cost * economic::BASELINE_COST_MARKUP - annual_cost;
    if annual_savings <= 0.0 {
        return Err(CalcError::calculation_failed(
            "economic",
            "Payback period is undefined when annual savings are zero",
        ));
    }
    let payback_period = params.initial_investment / annual_savings;
    let npv = npv(
        params.initial_investment,
        annual_savings,
        rates.discount_rate,
        horizon,
    );
    let irr = irr(params.initial_investment, annual_savings, horizon);

    let years = f64::from(horizon);
    let cost_breakdown = CostBreakdown {
        capex: params.initial_investment,
        opex: annual_energy_cost * years,
        maintenance: params.maintenance_cost * years,
        energy: annual_energy_cost * years,
    };

    Ok(EconomicResult {
        tco,
        pue,
        annual_energy_cost,
        carbon_footprint,
        roi: RoiMetrics {
            annual_savings,
            payback_period,
            npv,
            irr: irr.rate,
            irr_converged: irr.converged,
        },
        cost_breakdown,
        warnings,
    })
}

/// Energy spend with 60 % of hours at peak and 40 % at off-peak rates.
pub fn annual_energy_cost(params: &EconomicParams) -> f64 {
    economic::PEAK_SHARE * params.operational_hours * params.energy_rates.peak
        + economic::OFF_PEAK_SHARE * params.operational_hours * params.energy_rates.off_peak
}

/// Sum of `annual` escalated at `inflation` for years 1..=horizon.
fn escalated_total(annual: f64, inflation: f64, horizon: u32) -> f64 {
    (1..=horizon)
        .map(|year| annual * (1.0 + inflation).powi(year as i32))
        .sum()
}

/// Net present value of a level annual cash flow.
pub fn npv(investment: f64, annual_cash_flow: f64, rate: f64, horizon: u32) -> f64 {
    -investment
        + (1..=horizon)
            .map(|year| annual_cash_flow / (1.0 + rate).powi(year as i32))
            .sum::<f64>()
}

/// d(NPV)/d(rate)
fn npv_derivative(annual_cash_flow: f64, rate: f64, horizon: u32) -> f64 {
    (1..=horizon)
        .map(|year| {
            let t = f64::from(year);
            -t * annual_cash_flow / (1.0 + rate).powi(year as i32 + 1)
        })
        .sum()
}

/// Outcome of the IRR root-find
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrEstimate {
    /// Best estimate of the rate
    pub rate: f64,
    /// Whether |NPV(rate)| fell below tolerance
    pub converged: bool,
    /// Newton steps taken
    pub iterations: u32,
}

/// Internal rate of return by Newton–Raphson on the NPV function.
///
/// Starts at 10 % and stops when |NPV| < 1e-4, after 100 iterations, or when
/// the slope vanishes or the rate leaves the domain (rate ≤ −100 %). In the
/// last three cases the last finite estimate is returned with
/// `converged == false`.
///
/// Without a positive investment there is no rate of return: the initial
/// guess comes back unconverged after zero iterations.
pub fn irr(investment: f64, annual_cash_flow: f64, horizon: u32) -> IrrEstimate {
    let mut rate = economic::IRR_INITIAL_GUESS;
    if investment <= 0.0 {
        return IrrEstimate {
            rate,
            converged: false,
            iterations: 0,
        };
    }

    for iteration in 0..economic::IRR_MAX_ITERATIONS {
        let value = npv(investment, annual_cash_flow, rate, horizon);
        if value.abs() < economic::IRR_TOLERANCE {
            return IrrEstimate {
                rate,
                converged: true,
                iterations: iteration,
            };
        }

        let slope = npv_derivative(annual_cash_flow, rate, horizon);
        if slope == 0.0 || !slope.is_finite() {
            return IrrEstimate {
                rate,
                converged: false,
                iterations: iteration,
            };
        }

        let next = rate - value / slope;
        if !next.is_finite() || next <= -1.0 {
            return IrrEstimate {
                rate,
                converged: false,
                iterations: iteration + 1,
            };
        }
        rate = next;
    }

    IrrEstimate {
        rate,
        converged: false,
        iterations: economic::IRR_MAX_ITERATIONS,
    }
}
