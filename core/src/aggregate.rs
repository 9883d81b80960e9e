use crate::feature::{ConfidenceClass, Feature};

/// Bucket for features without a satellite label.
pub const UNKNOWN_SATELLITE: &str = "Desconocido";

/// Detections per confidence class. Unrecognized codes are not tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfidenceCounts {
    pub h: usize,
    pub n: usize,
    pub l: usize,
}

impl ConfidenceCounts {
    pub fn get(&self, class: ConfidenceClass) -> usize {
        match class {
            ConfidenceClass::High => self.h,
            ConfidenceClass::Nominal => self.n,
            ConfidenceClass::Low => self.l,
        }
    }

    fn increment(&mut self, class: ConfidenceClass) {
        match class {
            ConfidenceClass::High => self.h += 1,
            ConfidenceClass::Nominal => self.n += 1,
            ConfidenceClass::Low => self.l += 1,
        }
    }

    pub fn tracked(&self) -> usize {
        self.h + self.n + self.l
    }
}

/// Detections per satellite label, in the order each label was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SatelliteCounts(Vec<(String, usize)>);

impl SatelliteCounts {
    fn increment(&mut self, label: &str) {
        match self.0.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, count)) => *count += 1,
            None => self.0.push((label.to_string(), 1)),
        }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.0
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Statistics derived from one loaded feature collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub counts: ConfidenceCounts,
    pub satellite_counts: SatelliteCounts,
    pub frp_sum: f64,
    /// Mean FRP rounded to one decimal; `None` when there are no features.
    pub frp_average: Option<f64>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Rounds to one decimal place, ties away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Single pass over the features. Missing FRP counts as zero and missing satellites are
/// bucketed under [`UNKNOWN_SATELLITE`].
pub fn aggregate(features: &[Feature]) -> Summary {
    let mut summary = Summary::default();

    for feature in features {
        summary.total += 1;
        if let Some(class) = feature.confidence() {
            summary.counts.increment(class);
        }
        let satellite = feature.satellite();
        summary
            .satellite_counts
            .increment(satellite.as_deref().unwrap_or(UNKNOWN_SATELLITE));
        summary.frp_sum += feature.frp().unwrap_or(0.0);
    }

    if summary.total > 0 {
        summary.frp_average = Some(round1(summary.frp_sum / summary.total as f64));
    }

    summary
}
