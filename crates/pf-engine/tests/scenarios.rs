//! Reference scenarios run end to end through the request boundary.

use pf_core::{Tolerances, UnitSystem, nearly_equal};
use pf_engine::process::{CoolingDehumParams, CoolingMode, MixingParams, MixingStream, StreamFlow};
use pf_engine::process::{SensibleMode, SensibleParams};
use pf_engine::{
    ChartPoint, Conditions, ConditionsSpec, EngineError, Operation, ProcessKind, ProcessParams, Property,
    Request, Response, StateSpec, execute, find_adp,
};

fn tol(abs: f64) -> Tolerances {
    Tolerances { abs, rel: 0.0 }
}

fn process(start: StateSpec, process: ProcessParams) -> pf_engine::ProcessResult {
    let request = Request {
        conditions: ConditionsSpec::sea_level(UnitSystem::Ip),
        operation: Operation::Process { start, process },
    };
    match execute(&request).unwrap() {
        Response::Process(result) => result,
        other => panic!("unexpected response {other:?}"),
    }
}

fn tdb_rh(tdb: f64, rh: f64) -> StateSpec {
    StateSpec::new((Property::DryBulb, tdb), (Property::RelativeHumidity, rh))
}

#[test]
fn sensible_heating_holds_humidity_ratio() {
    let result = process(
        tdb_rh(55.0, 0.9),
        ProcessParams::Sensible(SensibleParams {
            mode: SensibleMode::TargetDryBulb(75.0),
            reheat: false,
        }),
    );
    assert_eq!(result.kind, ProcessKind::SensibleHeating);
    assert_eq!(result.end.humidity_ratio(), result.start.humidity_ratio());
    assert!(nearly_equal(result.number("delta_t").unwrap(), 20.0, tol(1e-12)));
    assert!(result.end.relative_humidity() < result.start.relative_humidity());
    assert!(result.warnings.is_empty());
}

#[test]
fn cooling_forward_reference_coil() {
    let result = process(
        tdb_rh(80.0, 0.5),
        ProcessParams::CoolingDehumidification(CoolingDehumParams {
            mode: CoolingMode::Forward {
                adp_dry_bulb: 45.0,
                bypass_factor: 0.15,
            },
        }),
    );
    assert_eq!(result.kind, ProcessKind::CoolingDehumidification);
    assert!(nearly_equal(result.end.dry_bulb(), 50.25, tol(1e-9)));
    assert!(nearly_equal(result.number("contact_factor").unwrap(), 0.85, tol(1e-12)));
    let path = &result.path;
    assert_eq!(path.first().unwrap().chart_point(), result.start.chart_point());
    assert_eq!(path.last().unwrap().chart_point(), result.end.chart_point());
}

#[test]
fn purely_sensible_line_has_no_adp() {
    let conditions = Conditions::sea_level(UnitSystem::Ip);
    let err = find_adp(
        &conditions,
        ChartPoint::new(80.0, 0.0109),
        ChartPoint::new(60.0, 0.0109),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::NoIntersection { .. }));
}

#[test]
fn equal_mass_mix_is_near_linear_midpoint() {
    let result = process(
        tdb_rh(75.0, 0.5),
        ProcessParams::AdiabaticMixing(MixingParams {
            start_flow: StreamFlow::Mass(1.0),
            streams: vec![MixingStream {
                state: tdb_rh(95.0, 0.4),
                flow: StreamFlow::Mass(1.0),
            }],
        }),
    );
    assert_eq!(result.kind, ProcessKind::AdiabaticMixing);
    // Exactly 85 only when vapor heat capacity is ignored.
    assert!(nearly_equal(result.end.dry_bulb(), 85.0, tol(0.1)));
    let w_mid = 0.5 * (result.start.humidity_ratio() + result.state("stream_2").unwrap().humidity_ratio());
    assert!(nearly_equal(result.end.humidity_ratio(), w_mid, tol(1e-15)));
}

#[test]
fn si_and_altitude_requests() {
    let request = Request {
        conditions: ConditionsSpec {
            units: UnitSystem::Si,
            pressure: None,
            altitude: Some(1600.0),
        },
        operation: Operation::ResolveState {
            state: StateSpec::new((Property::DryBulb, 25.0), (Property::WetBulb, 18.0)),
        },
    };
    let Response::State(state) = execute(&request).unwrap() else {
        panic!("expected a state");
    };
    assert!(state.pressure() < 101_325.0 && state.pressure() > 80_000.0);
    assert!(nearly_equal(state.wet_bulb(), 18.0, tol(1e-6)));

    let sea = Conditions::sea_level(UnitSystem::Si);
    let at_sea = pf_engine::resolve(&sea, (Property::DryBulb, 25.0), (Property::WetBulb, 18.0)).unwrap();
    // Lower pressure holds more water per unit dry air at the same wet bulb.
    assert!(state.humidity_ratio() > at_sea.humidity_ratio());
}
