#![no_main]
use ferm_core::{Programme, RampPoint};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (&str, u16, i32, u32)| {
    let (text, unit, base, probe) = input;
    let Ok(mut p) = Programme::parse("fuzz", text, u32::from(unit)) else {
        return;
    };
    assert!(!p.steps().is_empty());
    let base = i64::from(base);
    p.assign_start_times(base);

    let end = p.end_time().unwrap_or(base);
    assert!(end >= base);
    if let RampPoint::Ramp { temp, .. } = p.desired_temperature(base + i64::from(probe)) {
        assert!(temp.is_finite());
    }
    if end < i64::MAX {
        assert_eq!(p.desired_temperature(end + 1), RampPoint::Complete);
    }
});
