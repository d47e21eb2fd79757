use ferm_core::{Programme, RampPoint, Step};
use proptest::prelude::*;
use rstest::rstest;

fn two_step() -> Programme {
    let mut p = Programme::from_steps(
        vec![Step::new(10.0, 20.0, 1.0), Step::new(20.0, 20.0, 1.0)],
        60,
    )
    .expect("non-empty");
    p.assign_start_times(0);
    p
}

#[rstest]
#[case(0, 10.0)]
#[case(30, 15.0)]
#[case(60, 20.0)]
#[case(90, 20.0)]
#[case(120, 20.0)]
fn two_step_ramp_targets(#[case] now: i64, #[case] expected: f32) {
    let t = two_step()
        .desired_temperature(now)
        .temperature()
        .expect("inside programme");
    assert!((t - expected).abs() < 1e-6, "t={now}: got {t}");
}

#[test]
fn after_last_step_reports_complete() {
    let p = two_step();
    assert_eq!(p.desired_temperature(121), RampPoint::Complete);
    assert_eq!(p.desired_temperature(10_000), RampPoint::Complete);
    assert_eq!(RampPoint::Complete.temperature(), None);
}

#[test]
fn before_first_step_holds_start_temperature() {
    let mut p = Programme::from_steps(vec![Step::new(12.0, 18.0, 2.0)], 3600).unwrap();
    p.assign_start_times(1_000);
    assert_eq!(p.desired_temperature(999), RampPoint::PreRamp(12.0));
}

#[test]
fn shared_boundary_belongs_to_earlier_step() {
    let mut p = Programme::from_steps(
        vec![Step::new(10.0, 14.0, 1.0), Step::new(18.0, 18.0, 1.0)],
        60,
    )
    .unwrap();
    p.assign_start_times(0);
    assert_eq!(p.desired_temperature(60), RampPoint::Ramp { step: 0, temp: 14.0 });
    assert_eq!(p.desired_temperature(61), RampPoint::Ramp { step: 1, temp: 18.0 });
}

#[test]
fn zero_length_step_yields_end_temperature() {
    let mut p = Programme::from_steps(
        vec![Step::new(10.0, 22.0, 0.0), Step::new(22.0, 22.0, 1.0)],
        60,
    )
    .unwrap();
    p.assign_start_times(500);
    assert_eq!(p.desired_temperature(500), RampPoint::Ramp { step: 0, temp: 22.0 });
}

#[test]
fn assign_start_times_is_idempotent() {
    let mut p = two_step();
    let first: Vec<_> = p.steps().iter().map(|s| s.start_time).collect();
    p.assign_start_times(0);
    let second: Vec<_> = p.steps().iter().map(|s| s.start_time).collect();
    assert_eq!(first, second);
    assert_eq!(p.start_time(), Some(0));
    assert_eq!(p.end_time(), Some(120));
    assert_eq!(p.total_seconds(), 120);
}

#[test]
fn empty_step_list_is_rejected() {
    assert!(Programme::from_steps(Vec::new(), 60).is_err());
}

prop_compose! {
    fn steps_strategy()(
        raw in prop::collection::vec((-5.0f32..40.0, -5.0f32..40.0, 0.0f32..200.0), 1..20)
    ) -> Vec<Step> {
        raw.into_iter().map(|(a, b, d)| Step::new(a, b, d)).collect()
    }
}

proptest! {
    #[test]
    fn start_times_accumulate_durations(
        steps in steps_strategy(),
        base in 0i64..2_000_000_000,
        unit in 1u32..7200,
    ) {
        let mut p = Programme::from_steps(steps, unit).unwrap();
        p.assign_start_times(base);
        let s = p.steps();
        prop_assert_eq!(s[0].start_time, Some(base));
        for i in 1..s.len() {
            let prev = s[i - 1].start_time.unwrap();
            let len = ferm_core::util::step_seconds(s[i - 1].duration, unit);
            prop_assert_eq!(s[i].start_time, Some(prev + len));
        }
    }

    #[test]
    fn step_edges_and_midpoint(
        a in -5.0f32..40.0,
        b in -5.0f32..40.0,
        half in 1i64..10_000,
        base in 0i64..2_000_000_000,
    ) {
        // 2*half seconds long with unit_seconds = 1
        let mut p = Programme::from_steps(vec![Step::new(a, b, (2 * half) as f32)], 1).unwrap();
        p.assign_start_times(base);
        let at = |t| p.desired_temperature(t).temperature().unwrap();
        prop_assert!((at(base) - a).abs() < 1e-4);
        prop_assert!((at(base + 2 * half) - b).abs() < 1e-4);
        prop_assert!((at(base + half) - (a + b) / 2.0).abs() < 1e-3);
        prop_assert_eq!(p.desired_temperature(base + 2 * half + 1), RampPoint::Complete);
    }

    #[test]
    fn target_stays_between_step_temperatures(
        steps in steps_strategy(),
        offset in 0i64..1_000_000,
    ) {
        let mut p = Programme::from_steps(steps, 60).unwrap();
        p.assign_start_times(0);
        if let RampPoint::Ramp { step, temp } = p.desired_temperature(offset) {
            let s = &p.steps()[step];
            let lo = s.start_temp.min(s.end_temp) - 1e-3;
            let hi = s.start_temp.max(s.end_temp) + 1e-3;
            prop_assert!(temp >= lo && temp <= hi);
        }
    }
}
