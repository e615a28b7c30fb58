// pf-core/src/units.rs

use core::fmt;
use core::str::FromStr;

use uom::si::f64::{
    Length as UomLength, Pressure as UomPressure,
    TemperatureInterval as UomTemperatureInterval,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

use thiserror::Error;

// Boundary quantity types (SI storage, f64)
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type TempInterval = UomTemperatureInterval;
pub type Temperature = UomThermodynamicTemperature;

/// Grains of water per pound.
pub const GRAINS_PER_LB: f64 = 7000.0;

/// Unit system a psychrometric computation runs in.
///
/// Every formula is evaluated natively in the selected system; values never
/// cross between systems inside the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum UnitSystem {
    /// Inch-pound: °F, psia, lb/lb, BTU/lb, ft³/lb.
    #[default]
    Ip,
    /// Metric: °C, Pa, kg/kg, kJ/kg, m³/kg.
    Si,
}

/// Dry-bulb window of the psychrometric chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartRange {
    pub dry_bulb_min: f64,
    pub dry_bulb_max: f64,
}

impl UnitSystem {
    /// Standard sea-level barometric pressure (psia or Pa).
    pub fn sea_level_pressure(self) -> f64 {
        match self {
            Self::Ip => 14.696,
            Self::Si => 101_325.0,
        }
    }

    /// Factor from humidity ratio to display units (gr/lb or g/kg).
    pub fn humidity_display_factor(self) -> f64 {
        match self {
            Self::Ip => GRAINS_PER_LB,
            Self::Si => 1000.0,
        }
    }

    /// Humidity ratio converted to display units.
    #[inline]
    pub fn humidity_ratio_display(self, w: f64) -> f64 {
        w * self.humidity_display_factor()
    }

    /// Chart dry-bulb window, also the search floor for ADP intersections.
    pub fn chart_range(self) -> ChartRange {
        match self {
            Self::Ip => ChartRange {
                dry_bulb_min: 20.0,
                dry_bulb_max: 120.0,
            },
            Self::Si => ChartRange {
                dry_bulb_min: -10.0,
                dry_bulb_max: 55.0,
            },
        }
    }

    /// Upper dry-bulb bound used when a resolver brackets the dry-bulb.
    pub fn resolver_dry_bulb_max(self) -> f64 {
        match self {
            Self::Ip => 200.0,
            Self::Si => 90.0,
        }
    }

    /// Temperature range over which the property correlations are valid.
    pub fn temperature_domain(self) -> (f64, f64) {
        match self {
            Self::Ip => (-148.0, 392.0),
            Self::Si => (-100.0, 200.0),
        }
    }

    pub fn temperature_unit(self) -> &'static str {
        match self {
            Self::Ip => "°F",
            Self::Si => "°C",
        }
    }

    pub fn pressure_unit(self) -> &'static str {
        match self {
            Self::Ip => "psia",
            Self::Si => "Pa",
        }
    }

    pub fn enthalpy_unit(self) -> &'static str {
        match self {
            Self::Ip => "BTU/lb",
            Self::Si => "kJ/kg",
        }
    }

    pub fn airflow_unit(self) -> &'static str {
        match self {
            Self::Ip => "CFM",
            Self::Si => "m³/s",
        }
    }

    pub fn load_unit(self) -> &'static str {
        match self {
            Self::Ip => "BTU/hr",
            Self::Si => "W",
        }
    }

    /// Pressure expressed in this system's native unit.
    pub fn pressure_value(self, p: Pressure) -> f64 {
        use uom::si::pressure::{pascal, pound_force_per_square_inch};
        match self {
            Self::Ip => p.get::<pound_force_per_square_inch>(),
            Self::Si => p.get::<pascal>(),
        }
    }

    /// Native pressure value lifted into a typed quantity.
    pub fn pressure_quantity(self, v: f64) -> Pressure {
        use uom::si::pressure::{pascal, pound_force_per_square_inch};
        match self {
            Self::Ip => Pressure::new::<pound_force_per_square_inch>(v),
            Self::Si => Pressure::new::<pascal>(v),
        }
    }

    /// Temperature expressed in this system's native scale.
    pub fn temperature_value(self, t: Temperature) -> f64 {
        use uom::si::thermodynamic_temperature::{degree_celsius, degree_fahrenheit};
        match self {
            Self::Ip => t.get::<degree_fahrenheit>(),
            Self::Si => t.get::<degree_celsius>(),
        }
    }

    pub fn temperature_quantity(self, v: f64) -> Temperature {
        use uom::si::thermodynamic_temperature::{degree_celsius, degree_fahrenheit};
        match self {
            Self::Ip => Temperature::new::<degree_fahrenheit>(v),
            Self::Si => Temperature::new::<degree_celsius>(v),
        }
    }

    /// Temperature difference expressed in this system's native degree.
    pub fn interval_value(self, dt: TempInterval) -> f64 {
        use uom::si::temperature_interval::{degree_celsius, degree_fahrenheit};
        match self {
            Self::Ip => dt.get::<degree_fahrenheit>(),
            Self::Si => dt.get::<degree_celsius>(),
        }
    }

    /// Altitude expressed in feet (IP) or meters (SI).
    pub fn altitude_value(self, z: Length) -> f64 {
        use uom::si::length::{foot, meter};
        match self {
            Self::Ip => z.get::<foot>(),
            Self::Si => z.get::<meter>(),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip => f.write_str("IP"),
            Self::Si => f.write_str("SI"),
        }
    }
}

/// A unit-system name other than IP or SI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown unit system '{0}' (expected IP or SI)")]
pub struct ParseUnitSystemError(pub String);

impl FromStr for UnitSystem {
    type Err = ParseUnitSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IP" => Ok(Self::Ip),
            "SI" => Ok(Self::Si),
            _ => Err(ParseUnitSystemError(s.to_string())),
        }
    }
}

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn psia(v: f64) -> Pressure {
    use uom::si::pressure::pound_force_per_square_inch;
    Pressure::new::<pound_force_per_square_inch>(v)
}

#[inline]
pub fn deg_f(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_fahrenheit;
    Temperature::new::<degree_fahrenheit>(v)
}

#[inline]
pub fn deg_c(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn ft(v: f64) -> Length {
    use uom::si::length::foot;
    Length::new::<foot>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tolerances, nearly_equal};

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _q = psia(14.696);
        let _t = deg_f(75.0);
        let _c = deg_c(24.0);
        let _z = ft(5280.0);
        let _l = m(1609.0);
    }

    #[test]
    fn sea_level_pressures_agree_across_systems() {
        let ip = UnitSystem::Ip.pressure_quantity(UnitSystem::Ip.sea_level_pressure());
        let si = UnitSystem::Si.pressure_value(ip);
        assert!(nearly_equal(si, 101_325.0, Tolerances { abs: 1.0, rel: 1e-4 }));
    }

    #[test]
    fn temperature_round_trip() {
        let t = UnitSystem::Ip.temperature_quantity(212.0);
        let c = UnitSystem::Si.temperature_value(t);
        assert!(nearly_equal(c, 100.0, Tolerances::default()));
    }

    #[test]
    fn display_factors() {
        assert_eq!(UnitSystem::Ip.humidity_ratio_display(0.01), 70.0);
        assert_eq!(UnitSystem::Si.humidity_ratio_display(0.01), 10.0);
    }

    #[test]
    fn parse_unit_system() {
        assert_eq!("ip".parse::<UnitSystem>().unwrap(), UnitSystem::Ip);
        assert_eq!("SI".parse::<UnitSystem>().unwrap(), UnitSystem::Si);
        assert_eq!(
            "metric".parse::<UnitSystem>().unwrap_err(),
            ParseUnitSystemError("metric".to_string())
        );
        assert!(
            ParseUnitSystemError("metric".into())
                .to_string()
                .contains("'metric'")
        );
    }
}
