//! Chart coordinates and process path sampling.

use pf_core::{UnitSystem, lerp};
use serde::Serialize;

use crate::error::EngineResult;
use crate::state::AirState;

/// Segments along a straight process line.
pub const STRAIGHT_SEGMENTS: usize = 12;
/// Segments along a constant wet-bulb curve.
pub const WET_BULB_SEGMENTS: usize = 20;
/// Segments along a constant-enthalpy sweep.
pub const ENTHALPY_SEGMENTS: usize = 16;

/// A (dry-bulb, humidity-ratio) coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub dry_bulb: f64,
    pub humidity_ratio: f64,
}

impl ChartPoint {
    pub fn new(dry_bulb: f64, humidity_ratio: f64) -> Self {
        Self {
            dry_bulb,
            humidity_ratio,
        }
    }

    /// Point a fraction `t` of the way toward `other` on both axes.
    pub fn toward(self, other: ChartPoint, t: f64) -> ChartPoint {
        ChartPoint::new(
            lerp(self.dry_bulb, other.dry_bulb, t),
            lerp(self.humidity_ratio, other.humidity_ratio, t),
        )
    }
}

/// Path vertex with the humidity ratio also in display units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PathPoint {
    pub dry_bulb: f64,
    pub humidity_ratio: f64,
    pub humidity_ratio_display: f64,
}

impl PathPoint {
    pub fn new(units: UnitSystem, p: ChartPoint) -> Self {
        Self {
            dry_bulb: p.dry_bulb,
            humidity_ratio: p.humidity_ratio,
            humidity_ratio_display: units.humidity_ratio_display(p.humidity_ratio),
        }
    }

    pub fn chart_point(&self) -> ChartPoint {
        ChartPoint::new(self.dry_bulb, self.humidity_ratio)
    }
}

/// Straight line with `segments + 1` vertices, endpoints exactly `from` and `to`.
pub fn straight(units: UnitSystem, from: ChartPoint, to: ChartPoint, segments: usize) -> Vec<PathPoint> {
    let n = segments.max(1);
    (0..=n)
        .map(|i| {
            let p = match i {
                0 => from,
                i if i == n => to,
                i => from.toward(to, i as f64 / n as f64),
            };
            PathPoint::new(units, p)
        })
        .collect()
}

/// Straight line between two resolved states.
pub fn straight_between(start: &AirState, end: &AirState, segments: usize) -> Vec<PathPoint> {
    straight(start.units(), start.chart_point(), end.chart_point(), segments)
}

/// Curve sampled at interior fractions by `sample`; the first and last vertex
/// are pinned to the resolved start and end states.
pub fn sampled<F>(start: &AirState, end: &AirState, segments: usize, mut sample: F) -> EngineResult<Vec<PathPoint>>
where
    F: FnMut(f64) -> EngineResult<ChartPoint>,
{
    let units = start.units();
    let n = segments.max(1);
    let mut points = Vec::with_capacity(n + 1);
    points.push(PathPoint::new(units, start.chart_point()));
    for i in 1..n {
        points.push(PathPoint::new(units, sample(i as f64 / n as f64)?));
    }
    points.push(PathPoint::new(units, end.chart_point()));
    Ok(points)
}

/// Constant wet-bulb curve from `start` to `end`.
pub fn constant_wet_bulb(start: &AirState, end: &AirState, wet_bulb: f64, segments: usize) -> EngineResult<Vec<PathPoint>> {
    let psy = start.conditions().psychrometrics();
    let p = start.pressure();
    sampled(start, end, segments, |t| {
        let tdb = lerp(start.dry_bulb(), end.dry_bulb(), t).max(wet_bulb);
        Ok(ChartPoint::new(tdb, psy.hum_ratio_from_wet_bulb(tdb, wet_bulb, p)?))
    })
}

/// Constant-enthalpy sweep in humidity ratio from `start` to `end`.
pub fn constant_enthalpy(start: &AirState, end: &AirState, enthalpy: f64, segments: usize) -> EngineResult<Vec<PathPoint>> {
    let psy = start.conditions().psychrometrics();
    sampled(start, end, segments, |t| {
        let w = lerp(start.humidity_ratio(), end.humidity_ratio(), t);
        Ok(ChartPoint::new(psy.dry_bulb_from_enthalpy(enthalpy, w)?, w))
    })
}
