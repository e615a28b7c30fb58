//! IP and SI adapters must describe the same air.
//!
//! Enthalpy datums differ between the systems, so only datum-free properties
//! are compared, with conversions done through uom.

use pf_core::units::{deg_f, psia};
use pf_core::{Tolerances, UnitSystem, nearly_equal};
use pf_props::Psychrometrics;
use proptest::prelude::*;
use uom::si::f64::{Mass, Volume};
use uom::si::mass::pound;
use uom::si::volume::cubic_foot;

const CASES: [(f64, f64); 4] = [(80.0, 0.5), (40.0, 0.8), (100.0, 0.2), (20.0, 0.7)];

#[test]
fn ip_and_si_agree_on_datum_free_properties() {
    let ip = Psychrometrics::new(UnitSystem::Ip);
    let si = Psychrometrics::new(UnitSystem::Si);
    let p_ip = 14.696;
    let p_si = UnitSystem::Si.pressure_value(psia(p_ip));

    for (t_f, rh) in CASES {
        let t_c = UnitSystem::Si.temperature_value(deg_f(t_f));

        let w_ip = ip.hum_ratio_from_rel_hum(t_f, rh, p_ip).unwrap();
        let w_si = si.hum_ratio_from_rel_hum(t_c, rh, p_si).unwrap();
        assert!((w_ip - w_si).abs() < 1e-6, "{t_f}°F: {w_ip} vs {w_si}");

        let twb_ip = ip.wet_bulb_from_hum_ratio(t_f, w_ip, p_ip).unwrap();
        let twb_si = si.wet_bulb_from_hum_ratio(t_c, w_si, p_si).unwrap();
        let twb_ip_c = UnitSystem::Si.temperature_value(deg_f(twb_ip));
        assert!((twb_ip_c - twb_si).abs() < 0.02, "{t_f}°F: {twb_ip_c} vs {twb_si}");

        let tdp_ip = ip.dew_point_from_hum_ratio(t_f, w_ip, p_ip).unwrap();
        let tdp_si = si.dew_point_from_hum_ratio(t_c, w_si, p_si).unwrap();
        let tdp_ip_c = UnitSystem::Si.temperature_value(deg_f(tdp_ip));
        assert!((tdp_ip_c - tdp_si).abs() < 1e-3);

        let v_ip = ip.specific_volume(t_f, w_ip, p_ip).unwrap();
        let v_si = si.specific_volume(t_c, w_si, p_si).unwrap();
        let v_ip_si = (Volume::new::<cubic_foot>(v_ip) / Mass::new::<pound>(1.0)).value;
        assert!(nearly_equal(v_ip_si, v_si, Tolerances { abs: 0.0, rel: 1e-4 }));
    }
}

proptest! {
    #[test]
    fn dew_point_round_trip(t_dp in -40.0f64..45.0, spread in 0.0f64..30.0) {
        let psy = Psychrometrics::new(UnitSystem::Si);
        let p = 101_325.0;
        let w = psy.hum_ratio_from_dew_point(t_dp, p).unwrap();
        let back = psy.dew_point_from_hum_ratio(t_dp + spread, w, p).unwrap();
        prop_assert!((back - t_dp).abs() < 1e-6, "{} vs {}", back, t_dp);
    }

    #[test]
    fn wet_bulb_round_trip(t_db in 35.0f64..110.0, rh in 0.05f64..0.95) {
        let psy = Psychrometrics::new(UnitSystem::Ip);
        let p = 14.696;
        let w = psy.hum_ratio_from_rel_hum(t_db, rh, p).unwrap();
        let twb = psy.wet_bulb_from_hum_ratio(t_db, w, p).unwrap();
        prop_assert!(twb <= t_db);
        let back = psy.hum_ratio_from_wet_bulb(t_db, twb, p).unwrap();
        let tol = Tolerances { abs: 1e-8, rel: 1e-6 };
        prop_assert!(nearly_equal(back, w, tol));
    }

    #[test]
    fn relative_humidity_round_trip(t_db in -20.0f64..50.0, rh in 0.01f64..=1.0) {
        let psy = Psychrometrics::new(UnitSystem::Si);
        let p = 90_000.0;
        let w = psy.hum_ratio_from_rel_hum(t_db, rh, p).unwrap();
        let back = psy.rel_hum_from_hum_ratio(t_db, w, p).unwrap();
        let tol = Tolerances { abs: 1e-6, rel: 1e-9 };
        prop_assert!(nearly_equal(back, rh, tol));
    }
}
