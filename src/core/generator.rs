//! Synthetic reading generation.

use chrono::{DateTime, Utc};

use super::random::RandomSource;
use super::SimulationSettings;
use crate::models::{Reading, VitalParameter, VitalRange, VitalRangeTable};

/// Produces a plausible reading for `base`'s patient at `timestamp`.
///
/// Non-vital fields are copied from `base`. Each vital is drawn on its own:
/// inside its range with `in_range_probability`, otherwise an excursion of
/// up to `excursion` above the max or below the min, with equal odds.
pub fn generate(
    base: &Reading,
    timestamp: DateTime<Utc>,
    ranges: &VitalRangeTable,
    settings: &SimulationSettings,
    rng: &mut dyn RandomSource,
) -> Reading {
    let mut reading = base.clone();
    reading.set_recorded_at(timestamp);

    for parameter in VitalParameter::ALL {
        let value = sample(ranges.range(parameter), settings, rng);
        *reading.raw_mut(parameter) = format!("{value:.1}");
    }

    reading
}

fn sample(range: VitalRange, settings: &SimulationSettings, rng: &mut dyn RandomSource) -> f64 {
    if rng.unit() < settings.in_range_probability {
        return range.min + rng.unit() * (range.max - range.min);
    }
    if rng.unit() < 0.5 {
        range.max + rng.unit() * settings.excursion
    } else {
        range.min - rng.unit() * settings.excursion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::{RngSource, ScriptedSource};
    use chrono::TimeZone;

    fn base() -> Reading {
        Reading {
            patient_id: "P3".into(),
            day: "1".into(),
            recorded_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            age: "47".into(),
            gender: "F".into(),
            respiratory_rate: "16".into(),
            heart_rate: "80".into(),
            bp_systolic: "115".into(),
            bp_diastolic: "75".into(),
            temperature: "36.9".into(),
            spo2: "98".into(),
        }
    }

    #[test]
    fn copies_identity_and_moves_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 2, 8, 15, 0).unwrap();
        let mut rng = RngSource::seeded(1);
        let reading = generate(
            &base(),
            at,
            &VitalRangeTable::default(),
            &SimulationSettings::default(),
            &mut rng,
        );
        assert_eq!(reading.patient_id, "P3");
        assert_eq!(reading.age, "47");
        assert_eq!(reading.gender, "F");
        assert_eq!(reading.recorded_at, at);
        assert_eq!(reading.day, "2");
    }

    #[test]
    fn values_have_one_decimal_place() {
        let mut rng = RngSource::seeded(2);
        let reading = generate(
            &base(),
            base().recorded_at,
            &VitalRangeTable::default(),
            &SimulationSettings::default(),
            &mut rng,
        );
        for parameter in VitalParameter::ALL {
            let raw = reading.raw(parameter);
            let (_, decimals) = raw.split_once('.').expect("decimal point");
            assert_eq!(decimals.len(), 1, "{parameter}: {raw}");
        }
    }

    #[test]
    fn scripted_draws_select_each_branch() {
        let range = VitalRange::new(12.0, 20.0);
        let settings = SimulationSettings::default();

        let mut in_range = ScriptedSource::new(vec![0.5, 0.25]);
        assert_eq!(sample(range, &settings, &mut in_range), 14.0);

        let mut above = ScriptedSource::new(vec![0.9, 0.2, 0.5]);
        assert_eq!(sample(range, &settings, &mut above), 22.5);

        let mut below = ScriptedSource::new(vec![0.9, 0.7, 0.5]);
        assert_eq!(sample(range, &settings, &mut below), 9.5);
    }

    #[test]
    fn draws_follow_expected_distribution() {
        let range = VitalRange::new(55.0, 110.0);
        let settings = SimulationSettings::default();
        let mut rng = RngSource::seeded(0x5eed);
        let n = 100_000;
        let (mut inside, mut above, mut below) = (0usize, 0usize, 0usize);

        for _ in 0..n {
            let v = sample(range, &settings, &mut rng);
            if range.contains(v) {
                inside += 1;
            } else if v > range.max {
                assert!(v <= range.max + settings.excursion);
                above += 1;
            } else {
                assert!(v >= range.min - settings.excursion);
                below += 1;
            }
        }

        let frac = |k: usize| k as f64 / n as f64;
        assert!((frac(inside) - 0.85).abs() < 0.01, "inside {}", frac(inside));
        assert!((frac(above) - 0.075).abs() < 0.01, "above {}", frac(above));
        assert!((frac(below) - 0.075).abs() < 0.01, "below {}", frac(below));
    }
}
