//! Air state value type and the property identifiers used to resolve it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pf_core::UnitSystem;
use serde::{Deserialize, Serialize};

use crate::conditions::Conditions;
use crate::error::{EngineError, EngineResult};
use crate::path::ChartPoint;

/// Independent psychrometric property usable as a resolver input.
///
/// Declaration order is the normalization order of an [`InputPair`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    DryBulb,
    WetBulb,
    DewPoint,
    RelativeHumidity,
    HumidityRatio,
    Enthalpy,
}

impl Property {
    pub const ALL: [Property; 6] = [
        Property::DryBulb,
        Property::WetBulb,
        Property::DewPoint,
        Property::RelativeHumidity,
        Property::HumidityRatio,
        Property::Enthalpy,
    ];

    /// Short chart symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Property::DryBulb => "Tdb",
            Property::WetBulb => "Twb",
            Property::DewPoint => "Tdp",
            Property::RelativeHumidity => "RH",
            Property::HumidityRatio => "W",
            Property::Enthalpy => "h",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            Property::DryBulb => "dry_bulb",
            Property::WetBulb => "wet_bulb",
            Property::DewPoint => "dew_point",
            Property::RelativeHumidity => "relative_humidity",
            Property::HumidityRatio => "humidity_ratio",
            Property::Enthalpy => "enthalpy",
        }
    }

    pub fn is_temperature(self) -> bool {
        matches!(self, Property::DryBulb | Property::WetBulb | Property::DewPoint)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Property {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .into_iter()
            .find(|p| p.symbol().eq_ignore_ascii_case(s) || p.field_name() == s)
            .ok_or_else(|| EngineError::invalid("property", format!("unknown property '{s}'")))
    }
}

/// Order-normalized pair of distinct properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct InputPair {
    first: Property,
    second: Property,
}

impl InputPair {
    /// Sorts the two properties; rejects a property paired with itself.
    pub fn new(a: Property, b: Property) -> EngineResult<Self> {
        if a == b {
            return Err(EngineError::invalid(
                a.field_name(),
                "the two input properties must differ",
            ));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    pub fn first(&self) -> Property {
        self.first
    }

    pub fn second(&self) -> Property {
        self.second
    }
}

impl fmt::Display for InputPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.first, self.second)
    }
}

/// Two property values identifying a state, as written in a request.
///
/// Serializes as a map, e.g. `{ dry_bulb: 75.0, relative_humidity: 0.5 }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSpec(BTreeMap<Property, f64>);

impl StateSpec {
    pub fn new(a: (Property, f64), b: (Property, f64)) -> Self {
        Self(BTreeMap::from([a, b]))
    }

    /// The two entries, or an error naming how many were given.
    pub fn entries(&self) -> EngineResult<[(Property, f64); 2]> {
        let mut it = self.0.iter().map(|(p, v)| (*p, *v));
        match (it.next(), it.next(), it.next()) {
            (Some(a), Some(b), None) => Ok([a, b]),
            _ => Err(EngineError::invalid(
                "state",
                format!("exactly two properties are required, got {}", self.0.len()),
            )),
        }
    }

    pub fn resolve(&self, conditions: &Conditions) -> EngineResult<AirState> {
        let [a, b] = self.entries()?;
        crate::resolver::resolve(conditions, a, b)
    }
}

/// Fully resolved moist-air state.
///
/// All properties are mutually consistent at the stored pressure and unit
/// system. Values are produced only by the resolver and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AirState {
    pub(crate) dry_bulb: f64,
    pub(crate) wet_bulb: f64,
    pub(crate) dew_point: f64,
    pub(crate) relative_humidity: f64,
    pub(crate) humidity_ratio: f64,
    pub(crate) humidity_ratio_display: f64,
    pub(crate) enthalpy: f64,
    pub(crate) specific_volume: f64,
    pub(crate) vapor_pressure: f64,
    pub(crate) saturation_pressure: f64,
    pub(crate) degree_of_saturation: f64,
    #[serde(flatten)]
    pub(crate) conditions: Conditions,
    pub(crate) input_pair: InputPair,
    pub(crate) input_values: [f64; 2],
}

impl AirState {
    pub fn dry_bulb(&self) -> f64 {
        self.dry_bulb
    }

    pub fn wet_bulb(&self) -> f64 {
        self.wet_bulb
    }

    pub fn dew_point(&self) -> f64 {
        self.dew_point
    }

    /// Relative humidity as a fraction.
    pub fn relative_humidity(&self) -> f64 {
        self.relative_humidity
    }

    pub fn humidity_ratio(&self) -> f64 {
        self.humidity_ratio
    }

    /// Humidity ratio in gr/lb (IP) or g/kg (SI).
    pub fn humidity_ratio_display(&self) -> f64 {
        self.humidity_ratio_display
    }

    pub fn enthalpy(&self) -> f64 {
        self.enthalpy
    }

    pub fn specific_volume(&self) -> f64 {
        self.specific_volume
    }

    pub fn vapor_pressure(&self) -> f64 {
        self.vapor_pressure
    }

    pub fn saturation_pressure(&self) -> f64 {
        self.saturation_pressure
    }

    pub fn degree_of_saturation(&self) -> f64 {
        self.degree_of_saturation
    }

    pub fn units(&self) -> UnitSystem {
        self.conditions.units()
    }

    pub fn pressure(&self) -> f64 {
        self.conditions.pressure()
    }

    pub fn input_pair(&self) -> InputPair {
        self.input_pair
    }

    /// Input values in the normalized order of [`Self::input_pair`].
    pub fn input_values(&self) -> [f64; 2] {
        self.input_values
    }

    /// Conditions this state was resolved under.
    pub fn conditions(&self) -> Conditions {
        self.conditions
    }

    /// Dry-air density, 1/v.
    pub fn density(&self) -> f64 {
        1.0 / self.specific_volume
    }

    pub fn chart_point(&self) -> ChartPoint {
        ChartPoint::new(self.dry_bulb, self.humidity_ratio)
    }

    /// Value of one of the input-capable properties.
    pub fn get(&self, property: Property) -> f64 {
        match property {
            Property::DryBulb => self.dry_bulb,
            Property::WetBulb => self.wet_bulb,
            Property::DewPoint => self.dew_point,
            Property::RelativeHumidity => self.relative_humidity,
            Property::HumidityRatio => self.humidity_ratio,
            Property::Enthalpy => self.enthalpy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_order_insensitive() {
        let a = InputPair::new(Property::RelativeHumidity, Property::DryBulb).unwrap();
        let b = InputPair::new(Property::DryBulb, Property::RelativeHumidity).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.first(), Property::DryBulb);
        assert!(InputPair::new(Property::Enthalpy, Property::Enthalpy).is_err());
    }

    #[test]
    fn property_parses_symbols_and_names() {
        assert_eq!("Tdb".parse::<Property>().unwrap(), Property::DryBulb);
        assert_eq!("rh".parse::<Property>().unwrap(), Property::RelativeHumidity);
        assert_eq!("humidity_ratio".parse::<Property>().unwrap(), Property::HumidityRatio);
        assert!("grains".parse::<Property>().is_err());
    }

    #[test]
    fn state_spec_requires_two_entries() {
        let spec = StateSpec::new((Property::DryBulb, 70.0), (Property::DryBulb, 75.0));
        assert!(spec.entries().is_err());

        let spec: StateSpec =
            serde_json::from_str(r#"{"relative_humidity": 0.5, "dry_bulb": 75.0}"#).unwrap();
        let [a, b] = spec.entries().unwrap();
        assert_eq!(a, (Property::DryBulb, 75.0));
        assert_eq!(b, (Property::RelativeHumidity, 0.5));
    }
}
