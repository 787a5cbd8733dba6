//! Range checks over a single reading.

use tracing::warn;

use crate::models::{Anomaly, Reading, VitalParameter, VitalRangeTable};

/// Flags every parameter of `reading` that lies strictly outside its range.
///
/// Anomalies come back in [`VitalParameter::ALL`] order. Values that do not
/// parse are logged and skipped.
pub fn scan(reading: &Reading, ranges: &VitalRangeTable) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for parameter in VitalParameter::ALL {
        let Some(value) = reading.value(parameter) else {
            warn!(
                patient_id = %reading.patient_id,
                "Invalid value for {}: {:?}",
                parameter,
                reading.raw(parameter)
            );
            continue;
        };

        let range = ranges.range(parameter);
        if !range.contains(value) {
            anomalies.push(Anomaly {
                patient_id: reading.patient_id.clone(),
                parameter,
                value,
                normal_range: range,
                timestamp: reading.recorded_at,
            });
        }
    }

    anomalies
}
