//! Airflow and load calculator: `Q = C · airflow · Δ` solved for one unknown,
//! with the C factor corrected for air density at a reference state.

use pf_core::UnitSystem;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conditions::Conditions;
use crate::error::{EngineError, EngineResult, finite};

const MIN_DIVISOR: f64 = 1e-12;
const DEFAULT_REFERENCE_HUM_RATIO: f64 = 0.01;

/// Which load equation is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadKind {
    /// Δ is a dry-bulb difference.
    Sensible,
    /// Δ is a humidity-ratio difference.
    Latent,
    /// Δ is an enthalpy difference.
    Total,
}

/// The unknown in the load equation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveFor {
    Load,
    Airflow,
    Delta,
}

/// Density-corrected C factor and the air density it was derived from.
///
/// IP: C = 60ρ·cp, 60ρ·hfg or 60ρ (BTU/hr per cfm per unit Δ).
/// SI: C = ρ·cp, ρ·hfg or 1000ρ (W per m³/s per unit Δ).
pub fn c_factor(kind: LoadKind, dry_bulb: f64, humidity_ratio: f64, conditions: &Conditions) -> EngineResult<(f64, f64)> {
    let psy = conditions.psychrometrics();
    psy.check_temperature(dry_bulb, "reference dry-bulb temperature")?;
    let rho = 1.0 / psy.specific_volume(dry_bulb, humidity_ratio, conditions.pressure())?;
    let c = match (conditions.units(), kind) {
        (UnitSystem::Ip, LoadKind::Sensible) => 60.0 * rho * 0.244,
        (UnitSystem::Ip, LoadKind::Latent) => 60.0 * rho * 1061.0,
        (UnitSystem::Ip, LoadKind::Total) => 60.0 * rho,
        (UnitSystem::Si, LoadKind::Sensible) => rho * 1006.0,
        (UnitSystem::Si, LoadKind::Latent) => rho * 2_501_000.0,
        (UnitSystem::Si, LoadKind::Total) => rho * 1000.0,
    };
    Ok((c, rho))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirflowInput {
    pub solve_for: SolveFor,
    pub load_kind: LoadKind,
    #[serde(default)]
    pub load: Option<f64>,
    #[serde(default)]
    pub airflow: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
    /// Reference dry bulb for density; 70 °F / 21 °C when absent.
    #[serde(default)]
    pub reference_dry_bulb: Option<f64>,
    /// Reference humidity ratio for density; 0.01 when absent.
    #[serde(default)]
    pub reference_hum_ratio: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AirflowResult {
    pub solve_for: SolveFor,
    pub load_kind: LoadKind,
    pub load: f64,
    pub airflow: f64,
    pub delta: f64,
    pub c_factor: f64,
    pub air_density: f64,
    pub formula: String,
}

fn required(field: &str, value: Option<f64>) -> EngineResult<f64> {
    let v = value.ok_or_else(|| EngineError::invalid(field, "is required for this calculation"))?;
    finite(field, v)
}

impl AirflowInput {
    /// Checks that the two known quantities are present and in range.
    pub fn validate(&self) -> EngineResult<()> {
        match self.solve_for {
            SolveFor::Load => {
                let airflow = required("airflow", self.airflow)?;
                required("delta", self.delta)?;
                if airflow < 0.0 {
                    return Err(EngineError::invalid("airflow", "must be non-negative"));
                }
            }
            SolveFor::Airflow => {
                required("load", self.load)?;
                let delta = required("delta", self.delta)?;
                if delta.abs() < MIN_DIVISOR {
                    return Err(EngineError::invalid("delta", "must be non-zero when solving for airflow"));
                }
            }
            SolveFor::Delta => {
                required("load", self.load)?;
                let airflow = required("airflow", self.airflow)?;
                if airflow <= 0.0 {
                    return Err(EngineError::invalid("airflow", "must be positive when solving for delta"));
                }
            }
        }
        if let Some(t) = self.reference_dry_bulb {
            finite("reference_dry_bulb", t)?;
        }
        if let Some(w) = self.reference_hum_ratio {
            if !w.is_finite() || w < 0.0 {
                return Err(EngineError::invalid("reference_hum_ratio", format!("{w} must be non-negative")));
            }
        }
        Ok(())
    }
}

/// Solves the load equation for the unknown named by `input.solve_for`.
pub fn solve_load_equation(conditions: &Conditions, input: &AirflowInput) -> EngineResult<AirflowResult> {
    input.validate()?;
    let units = conditions.units();
    let reference_dry_bulb = input.reference_dry_bulb.unwrap_or(match units {
        UnitSystem::Ip => 70.0,
        UnitSystem::Si => 21.0,
    });
    let reference_w = input.reference_hum_ratio.unwrap_or(DEFAULT_REFERENCE_HUM_RATIO);
    let (c, rho) = c_factor(input.load_kind, reference_dry_bulb, reference_w, conditions)?;

    let (load, airflow, delta) = match input.solve_for {
        SolveFor::Load => {
            let (airflow, delta) = (required("airflow", input.airflow)?, required("delta", input.delta)?);
            (c * airflow * delta, airflow, delta)
        }
        SolveFor::Airflow => {
            let (load, delta) = (required("load", input.load)?, required("delta", input.delta)?);
            let product = c * delta;
            if product.abs() < MIN_DIVISOR {
                return Err(EngineError::invalid("delta", "C × delta is too close to zero"));
            }
            (load, load / product, delta)
        }
        SolveFor::Delta => {
            let (load, airflow) = (required("load", input.load)?, required("airflow", input.airflow)?);
            let product = c * airflow;
            if product.abs() < MIN_DIVISOR {
                return Err(EngineError::invalid("airflow", "C × airflow is too close to zero"));
            }
            (load, airflow, load / product)
        }
    };
    debug!(solve_for = ?input.solve_for, load_kind = ?input.load_kind, c, load, airflow, delta, "load equation solved");

    Ok(AirflowResult {
        solve_for: input.solve_for,
        load_kind: input.load_kind,
        load,
        airflow,
        delta,
        c_factor: c,
        air_density: rho,
        formula: formula(input.load_kind, input.solve_for, units, c, load, airflow, delta),
    })
}

fn formula(kind: LoadKind, solve_for: SolveFor, units: UnitSystem, c: f64, load: f64, airflow: f64, delta: f64) -> String {
    let ip = units == UnitSystem::Ip;
    let (q_name, delta_name, delta_unit) = match kind {
        LoadKind::Sensible => ("Qs", "ΔT", units.temperature_unit()),
        LoadKind::Latent => ("Ql", "ΔW", if ip { "lb/lb" } else { "kg/kg" }),
        LoadKind::Total => ("Qt", "Δh", units.enthalpy_unit()),
    };
    let q_unit = units.load_unit();
    let flow_unit = units.airflow_unit();
    let (c, q, v, d) = (significant(c, 4), grouped(load), grouped(airflow), significant(delta, 4));

    match solve_for {
        SolveFor::Load => format!("{q_name} = {c} × {v} {flow_unit} × {d} {delta_unit} = {q} {q_unit}"),
        SolveFor::Airflow => format!("{flow_unit} = {q} {q_unit} / ({c} × {d} {delta_unit}) = {v} {flow_unit}"),
        SolveFor::Delta => format!("{delta_name} = {q} {q_unit} / ({c} × {v} {flow_unit}) = {d} {delta_unit}"),
    }
}

/// `v` to `digits` significant figures, trailing zeros dropped.
fn significant(v: f64, digits: i32) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let decimals = (digits - 1 - v.abs().log10().floor() as i32).max(0) as usize;
    let s = format!("{v:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        s
    }
}

/// Two decimals with thousands separators.
fn grouped(v: f64) -> String {
    let s = format!("{:.2}", v.abs());
    let (int, frac) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    let mut out = String::with_capacity(s.len() + int.len() / 3 + 1);
    if v < 0.0 && s != "0.00" {
        out.push('-');
    }
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('.');
    out.push_str(frac);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(solve_for: SolveFor, load: Option<f64>, airflow: Option<f64>, delta: Option<f64>) -> AirflowInput {
        AirflowInput {
            solve_for,
            load_kind: LoadKind::Sensible,
            load,
            airflow,
            delta,
            reference_dry_bulb: None,
            reference_hum_ratio: None,
        }
    }

    #[test]
    fn sea_level_sensible_factor_is_near_1_08() {
        let c = Conditions::sea_level(UnitSystem::Ip);
        let (cs, rho) = c_factor(LoadKind::Sensible, 70.0, 0.01, &c).unwrap();
        assert!((cs - 1.08).abs() < 0.02, "cs = {cs}");
        assert!((rho - 0.0737).abs() < 0.0005, "rho = {rho}");
        let (ct, _) = c_factor(LoadKind::Total, 70.0, 0.01, &c).unwrap();
        assert!((ct - 4.42).abs() < 0.01, "ct = {ct}");
    }

    #[test]
    fn altitude_lowers_c_factor() {
        let sea = Conditions::sea_level(UnitSystem::Ip);
        let denver = Conditions::from_altitude(UnitSystem::Ip, 5000.0).unwrap();
        let (c0, _) = c_factor(LoadKind::Sensible, 70.0, 0.01, &sea).unwrap();
        let (c1, _) = c_factor(LoadKind::Sensible, 70.0, 0.01, &denver).unwrap();
        assert!(c1 < c0);
        assert!((c1 / c0 - 12.228 / 14.696).abs() < 1e-3);
    }

    #[test]
    fn three_unknowns_are_consistent() {
        let c = Conditions::sea_level(UnitSystem::Ip);
        let q = solve_load_equation(&c, &input(SolveFor::Load, None, Some(2000.0), Some(20.0))).unwrap();
        let v = solve_load_equation(&c, &input(SolveFor::Airflow, Some(q.load), None, Some(20.0))).unwrap();
        let d = solve_load_equation(&c, &input(SolveFor::Delta, Some(q.load), Some(2000.0), None)).unwrap();
        assert!((v.airflow - 2000.0).abs() < 1e-9);
        assert!((d.delta - 20.0).abs() < 1e-12);
        assert!(q.formula.starts_with("Qs = "), "{}", q.formula);
        assert!(q.formula.contains("2,000.00 CFM"), "{}", q.formula);
    }

    #[test]
    fn missing_and_degenerate_inputs_are_rejected() {
        let c = Conditions::sea_level(UnitSystem::Si);
        let err = solve_load_equation(&c, &input(SolveFor::Load, None, None, Some(5.0))).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "airflow"));
        assert!(solve_load_equation(&c, &input(SolveFor::Load, None, Some(-1.0), Some(5.0))).is_err());
        assert!(solve_load_equation(&c, &input(SolveFor::Airflow, Some(500.0), None, Some(0.0))).is_err());
        assert!(solve_load_equation(&c, &input(SolveFor::Delta, Some(500.0), Some(0.0), None)).is_err());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(significant(1.0832, 4), "1.083");
        assert_eq!(significant(4.5, 4), "4.5");
        assert_eq!(significant(4760.2, 4), "4760");
        assert_eq!(grouped(1234567.891), "1,234,567.89");
        assert_eq!(grouped(-950.0), "-950.00");
        assert_eq!(grouped(0.004), "0.00");
    }
}
