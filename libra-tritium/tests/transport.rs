use approx::assert_relative_eq;
use libra_solve::ode::Method;
use libra_tritium::{
    Model, ModelConfig,
    model::{Irradiation, TransportError},
};
use uom::si::{
    f64::{Length, Ratio, Time},
    frequency::hertz,
    length::centimeter,
    ratio::ratio,
    time::{hour, second},
};

fn hours(value: f64) -> Time {
    Time::new::<hour>(value)
}

fn irradiation(start: f64, stop: f64) -> Irradiation {
    Irradiation::new(hours(start), hours(stop)).unwrap()
}

fn config() -> ModelConfig {
    ModelConfig::new(
        Length::new::<centimeter>(5.0),
        Length::new::<centimeter>(10.0),
        Ratio::new::<ratio>(0.1),
    )
    .with_samples_per_interval(200)
}

/// Loss rate per unit concentration, m³/s.
fn loss_coefficient(model: &Model) -> f64 {
    let balance = model.balance();
    balance.k_wall().value * model.wall_area().value + balance.k_top().value * model.top_area().value
}

/// Concentration for a single irradiation `[start, stop]` starting from zero.
fn analytic(model: &Model, t: f64, start: f64, stop: f64) -> f64 {
    let source = model.production_rate().get::<hertz>();
    let steady = source / loss_coefficient(model);
    let tau = model.volume().value / loss_coefficient(model);

    if t <= start {
        0.0
    } else if t <= stop {
        steady * (1.0 - (-(t - start) / tau).exp())
    } else {
        let at_stop = steady * (1.0 - (-(stop - start) / tau).exp());
        at_stop * (-(t - stop) / tau).exp()
    }
}

#[test]
fn trajectory_is_continuous_across_source_switches() {
    let mut model = Model::new(config().with_irradiation(irradiation(6.0, 30.0))).unwrap();
    model.run(hours(72.0)).unwrap();

    let start = hours(6.0).get::<second>();
    let stop = hours(30.0).get::<second>();
    let peak = analytic(&model, stop, start, stop);

    for (t, c) in model.times().iter().zip(model.concentrations()) {
        let expected = analytic(&model, t.get::<second>(), start, stop);
        assert_relative_eq!(c.value, expected, epsilon = 1e-6 * peak, max_relative = 1e-6);
    }
}

#[test]
fn stored_times_are_strictly_increasing() {
    let mut model = Model::new(
        config()
            .with_irradiation(irradiation(1.0, 13.0))
            .with_irradiation(irradiation(25.0, 37.0)),
    )
    .unwrap();
    model.run(hours(48.0)).unwrap();

    // Five intervals sharing four boundary samples.
    assert_eq!(model.times().len(), 5 * 200 - 4);
    assert!(model.times().windows(2).all(|pair| pair[0] < pair[1]));
    assert_relative_eq!(model.times().last().unwrap().get::<hour>(), 48.0, max_relative = 1e-12);
}

#[test]
fn trajectory_ends_at_the_final_time() {
    let mut model = Model::new(
        config()
            .with_irradiation(irradiation(0.0, 2.0))
            .with_irradiation(irradiation(100.0, 200.0)),
    )
    .unwrap();
    model.run(hours(10.0)).unwrap();

    // One irradiation and the idle gap up to 10 h.
    assert_eq!(model.times().len(), 2 * 200 - 1);
    assert_eq!(*model.times().last().unwrap(), hours(10.0));
    assert!(model.times().iter().all(|t| *t <= hours(10.0)));

    let mut model = Model::new(config().with_irradiation(irradiation(0.0, 10.0))).unwrap();
    model.run(hours(4.0)).unwrap();

    assert_eq!(model.times().len(), 200);
    assert_eq!(*model.times().last().unwrap(), hours(4.0));
    let source = model.production_rate().get::<hertz>();
    let c = model.concentrations().last().unwrap().value;
    assert!(c > 0.0 && c * loss_coefficient(&model) < source);
}

#[test]
fn approaches_steady_state_under_constant_irradiation() {
    let mut model = Model::new(config().with_irradiation(irradiation(0.0, 1000.0))).unwrap();
    model.run(hours(1000.0)).unwrap();

    let steady = model.production_rate().get::<hertz>() / loss_coefficient(&model);
    let last = model.concentrations().last().unwrap().value;

    assert_relative_eq!(last, steady, max_relative = 1e-6);
}

#[test]
fn released_tritium_closes_the_mass_balance() {
    let mut model = Model::new(config().with_irradiation(irradiation(0.0, 12.0))).unwrap();
    model.run(hours(96.0)).unwrap();

    let top = model.integrated_release_top();
    let wall = model.integrated_release_wall();

    for release in [&top, &wall] {
        assert_eq!(release.len(), model.times().len());
        assert_eq!(release[0], 0.0);
        assert!(release.windows(2).all(|pair| pair[1] >= pair[0]));
    }

    let produced = model.production_rate().get::<hertz>() * hours(12.0).get::<second>();
    let inventory = model.concentrations().last().unwrap().value * model.volume().value;
    let released = top.last().unwrap() + wall.last().unwrap();

    assert_relative_eq!(inventory + released, produced, max_relative = 1e-4);
}

#[test]
fn rerun_after_reset_is_identical() {
    let mut model = Model::new(
        config()
            .with_irradiation(irradiation(2.0, 14.0))
            .with_method(Method::Dop853 {
                abs_tol: 1e-6,
                rel_tol: 1e-10,
            }),
    )
    .unwrap();

    model.run(hours(24.0)).unwrap();
    let times = model.times().to_vec();
    let concentrations = model.concentrations().to_vec();

    model.reset();
    assert!(model.times().is_empty());
    assert!(model.concentrations().is_empty());
    model.reset();

    model.run(hours(24.0)).unwrap();
    assert_eq!(model.times(), times.as_slice());
    assert_eq!(model.concentrations(), concentrations.as_slice());
}

#[test]
fn fixed_step_method_matches_adaptive_one() {
    let schedule = [irradiation(0.0, 12.0)];

    let mut adaptive = Model::new(config().with_irradiations(schedule.to_vec())).unwrap();
    adaptive.run(hours(24.0)).unwrap();

    let mut fixed = Model::new(
        config()
            .with_irradiations(schedule.to_vec())
            .with_method(Method::Rk4),
    )
    .unwrap();
    fixed.run(hours(24.0)).unwrap();

    assert_eq!(fixed.times().len(), adaptive.times().len());
    for (a, b) in adaptive.concentrations().iter().zip(fixed.concentrations()) {
        assert_relative_eq!(a.value, b.value, max_relative = 1e-8, epsilon = 1.0);
    }
}

#[test]
fn invalid_final_time_is_rejected() {
    let mut model = Model::new(config()).unwrap();

    assert!(matches!(
        model.run(hours(f64::NAN)),
        Err(TransportError::InvalidFinalTime { .. })
    ));
}

#[cfg(feature = "serde")]
#[test]
fn config_round_trips_through_json() {
    let config = config()
        .with_irradiation(irradiation(0.0, 12.0))
        .with_method(Method::Rk4);

    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["samples_per_interval"], 200);
    assert_eq!(json["method"]["kind"], "rk4");
    // Quantities serialise in SI units.
    assert_relative_eq!(json["irradiations"][0]["stop"].as_f64().unwrap(), 43_200.0);

    let back: ModelConfig = serde_json::from_value(json).unwrap();
    assert_eq!(back, config);
}
