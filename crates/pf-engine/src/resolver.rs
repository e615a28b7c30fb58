//! State resolver: any supported property pair to a full [`AirState`].
//!
//! Every pair is first reduced to (dry bulb, humidity ratio); all remaining
//! properties are then computed from that canonical pair. Pairs with a direct
//! adapter relation are reduced in closed form, the rest by a bracketed root
//! solve over the valid temperature or humidity-ratio range.

use pf_props::Psychrometrics;
use pf_props::saturation::ln_sat_vapor_pressure;
use pf_solver::find_root;
use tracing::{debug, trace};

use crate::conditions::Conditions;
use crate::error::{EngineError, EngineResult, finite, unit_fraction};
use crate::state::{AirState, InputPair, Property};

/// Reduction of one normalized pair to (dry bulb, humidity ratio).
type Strategy = fn(&Psychrometrics, f64, f64, f64) -> EngineResult<(f64, f64)>;

/// Resolves a full state from two property values given in either order.
pub fn resolve(conditions: &Conditions, a: (Property, f64), b: (Property, f64)) -> EngineResult<AirState> {
    let pair = InputPair::new(a.0, b.0)?;
    let values = if pair.first() == a.0 { [a.1, b.1] } else { [b.1, a.1] };
    let strategy = strategy(pair)?;

    validate(conditions, pair.first(), values[0])?;
    validate(conditions, pair.second(), values[1])?;

    debug!(%pair, first = values[0], second = values[1], units = %conditions.units(), "resolving state");
    let psy = conditions.psychrometrics();
    let (dry_bulb, humidity_ratio) = strategy(&psy, values[0], values[1], conditions.pressure())?;
    from_canonical(conditions, dry_bulb, humidity_ratio, pair, values)
}

/// Canonical resolution from dry bulb and humidity ratio.
pub fn resolve_dry_bulb_hum_ratio(conditions: &Conditions, dry_bulb: f64, humidity_ratio: f64) -> EngineResult<AirState> {
    resolve(
        conditions,
        (Property::DryBulb, dry_bulb),
        (Property::HumidityRatio, humidity_ratio),
    )
}

/// Saturated state (RH = 1) at `dry_bulb`.
pub fn resolve_saturated(conditions: &Conditions, dry_bulb: f64) -> EngineResult<AirState> {
    resolve(
        conditions,
        (Property::DryBulb, dry_bulb),
        (Property::RelativeHumidity, 1.0),
    )
}

fn strategy(pair: InputPair) -> EngineResult<Strategy> {
    use Property::*;
    match (pair.first(), pair.second()) {
        (DryBulb, RelativeHumidity) => Ok(dry_bulb_rel_hum),
        (DryBulb, WetBulb) => Ok(dry_bulb_wet_bulb),
        (DryBulb, DewPoint) => Ok(dry_bulb_dew_point),
        (DryBulb, HumidityRatio) => Ok(dry_bulb_hum_ratio),
        (DryBulb, Enthalpy) => Ok(dry_bulb_enthalpy),
        (WetBulb, RelativeHumidity) => Ok(wet_bulb_rel_hum),
        (DewPoint, RelativeHumidity) => Ok(dew_point_rel_hum),
        (first, second) => Err(EngineError::UnsupportedPair { first, second }),
    }
}

fn validate(conditions: &Conditions, property: Property, value: f64) -> EngineResult<()> {
    let field = property.field_name();
    finite(field, value)?;
    match property {
        p if p.is_temperature() => {
            let (lo, hi) = conditions.units().temperature_domain();
            if value < lo || value > hi {
                return Err(EngineError::invalid(
                    field,
                    format!(
                        "{value} is outside {lo}..{hi} {}",
                        conditions.units().temperature_unit()
                    ),
                ));
            }
        }
        Property::RelativeHumidity => {
            unit_fraction(field, value)?;
        }
        Property::HumidityRatio if value < 0.0 => {
            return Err(EngineError::invalid(field, format!("{value} must be non-negative")));
        }
        _ => {}
    }
    Ok(())
}

fn dry_bulb_rel_hum(psy: &Psychrometrics, tdb: f64, rh: f64, p: f64) -> EngineResult<(f64, f64)> {
    Ok((tdb, psy.hum_ratio_from_rel_hum(tdb, rh, p)?))
}

fn dry_bulb_wet_bulb(psy: &Psychrometrics, tdb: f64, twb: f64, p: f64) -> EngineResult<(f64, f64)> {
    if twb > tdb {
        return Err(EngineError::invalid(
            "wet_bulb",
            format!("{twb} exceeds the dry bulb {tdb}"),
        ));
    }
    Ok((tdb, psy.hum_ratio_from_wet_bulb(tdb, twb, p)?))
}

fn dry_bulb_dew_point(psy: &Psychrometrics, tdb: f64, tdp: f64, p: f64) -> EngineResult<(f64, f64)> {
    if tdp > tdb {
        return Err(EngineError::invalid(
            "dew_point",
            format!("{tdp} exceeds the dry bulb {tdb}"),
        ));
    }
    Ok((tdb, psy.hum_ratio_from_dew_point(tdp, p)?))
}

fn dry_bulb_hum_ratio(_: &Psychrometrics, tdb: f64, w: f64, _: f64) -> EngineResult<(f64, f64)> {
    Ok((tdb, w))
}

/// Humidity ratio bracketed between dry air and saturation at `tdb`.
fn dry_bulb_enthalpy(psy: &Psychrometrics, tdb: f64, h: f64, p: f64) -> EngineResult<(f64, f64)> {
    let w_sat = psy.sat_hum_ratio(tdb, p)?;
    let root = find_root(
        |w| -> EngineResult<f64> { Ok(psy.enthalpy(tdb, w)? - h) },
        0.0,
        w_sat,
        psy.root_config(),
    )
    .map_err(|e| {
        EngineError::resolution(format!(
            "enthalpy {h} is not reachable between dry air and saturation at dry bulb {tdb}: {e}"
        ))
    })?;
    trace!(humidity_ratio = root.x, iterations = root.iterations, "Tdb+h solved");
    Ok((tdb, root.x))
}

/// Dry bulb bracketed between the wet bulb and the resolver ceiling.
fn wet_bulb_rel_hum(psy: &Psychrometrics, twb: f64, rh: f64, p: f64) -> EngineResult<(f64, f64)> {
    if rh <= 0.0 {
        return Err(EngineError::invalid(
            "relative_humidity",
            "must be positive when paired with wet bulb",
        ));
    }
    if rh >= 1.0 {
        return Ok((twb, psy.hum_ratio_from_wet_bulb(twb, twb, p)?));
    }
    let t_max = psy.units().resolver_dry_bulb_max();
    if twb >= t_max {
        return Err(EngineError::invalid(
            "wet_bulb",
            format!("{twb} is at or above the resolver ceiling {t_max}"),
        ));
    }

    let root = find_root(
        |tdb| -> EngineResult<f64> {
            let w = psy.hum_ratio_from_wet_bulb(tdb, twb, p)?;
            Ok(psy.rel_hum_from_hum_ratio(tdb, w, p)? - rh)
        },
        twb,
        t_max,
        psy.root_config(),
    )
    .map_err(|e| match e {
        EngineError::Resolution { what } => EngineError::resolution(format!(
            "no dry bulb gives RH {rh} at wet bulb {twb}: {what}"
        )),
        other => other,
    })?;
    trace!(dry_bulb = root.x, iterations = root.iterations, "Twb+RH solved");
    Ok((root.x, psy.hum_ratio_from_wet_bulb(root.x, twb, p)?))
}

/// Dry bulb where `Pws(Tdb) = Pws(Tdp) / RH`, solved on log pressure.
fn dew_point_rel_hum(psy: &Psychrometrics, tdp: f64, rh: f64, p: f64) -> EngineResult<(f64, f64)> {
    if rh <= 0.0 {
        return Err(EngineError::invalid(
            "relative_humidity",
            "must be positive when paired with dew point",
        ));
    }
    let w = psy.hum_ratio_from_dew_point(tdp, p)?;
    if rh >= 1.0 {
        return Ok((tdp, w));
    }
    let t_max = psy.units().resolver_dry_bulb_max();
    if tdp >= t_max {
        return Err(EngineError::invalid(
            "dew_point",
            format!("{tdp} is at or above the resolver ceiling {t_max}"),
        ));
    }

    let units = psy.units();
    let target = ln_sat_vapor_pressure(units, tdp)? - rh.ln();
    let root = find_root(
        |tdb| -> EngineResult<f64> { Ok(ln_sat_vapor_pressure(units, tdb)? - target) },
        tdp,
        t_max,
        psy.root_config(),
    )
    .map_err(|e| match e {
        EngineError::Resolution { what } => EngineError::resolution(format!(
            "no dry bulb gives RH {rh} at dew point {tdp}: {what}"
        )),
        other => other,
    })?;
    trace!(dry_bulb = root.x, iterations = root.iterations, "Tdp+RH solved");
    Ok((root.x, w))
}

fn from_canonical(
    conditions: &Conditions,
    dry_bulb: f64,
    humidity_ratio: f64,
    input_pair: InputPair,
    input_values: [f64; 2],
) -> EngineResult<AirState> {
    let psy = conditions.psychrometrics();
    let p = conditions.pressure();
    psy.check_temperature(dry_bulb, "dry_bulb")?;
    if !humidity_ratio.is_finite() || humidity_ratio < 0.0 {
        return Err(EngineError::invalid(
            "humidity_ratio",
            format!("{humidity_ratio} must be non-negative"),
        ));
    }

    Ok(AirState {
        dry_bulb,
        wet_bulb: psy.wet_bulb_from_hum_ratio(dry_bulb, humidity_ratio, p)?,
        dew_point: psy.dew_point_from_hum_ratio(dry_bulb, humidity_ratio, p)?,
        relative_humidity: psy.rel_hum_from_hum_ratio(dry_bulb, humidity_ratio, p)?,
        humidity_ratio,
        humidity_ratio_display: conditions.units().humidity_ratio_display(humidity_ratio),
        enthalpy: psy.enthalpy(dry_bulb, humidity_ratio)?,
        specific_volume: psy.specific_volume(dry_bulb, humidity_ratio, p)?,
        vapor_pressure: psy.vapor_pressure_from_hum_ratio(humidity_ratio, p)?,
        saturation_pressure: psy.sat_vapor_pressure(dry_bulb)?,
        degree_of_saturation: psy.degree_of_saturation(dry_bulb, humidity_ratio, p)?,
        conditions: *conditions,
        input_pair,
        input_values,
    })
}
