use crate::derived::Derived;
use crate::resample::RESOLUTION;
use crate::types::AlignedPair;

/// Time delta of `target` against `reference`: `target[i] - reference[i]`.
///
/// Positive values mean the target driver needed more time to reach that
/// distance, i.e. is slower. Inputs that cannot be subtracted point by point
/// (length mismatch, non-finite values) yield a zero-filled curve of
/// [`RESOLUTION`] points instead of an error.
pub fn time_delta(reference: &[f64], target: &[f64]) -> Derived<Vec<f64>> {
    if reference.len() != RESOLUTION || target.len() != RESOLUTION {
        return zero_filled(format!(
            "time channels have {} and {} points, expected {}",
            reference.len(),
            target.len(),
            RESOLUTION
        ));
    }
    if reference.iter().chain(target).any(|v| !v.is_finite()) {
        return zero_filled("time channels contain non-finite values".to_string());
    }

    Derived::Computed(
        reference
            .iter()
            .zip(target)
            .map(|(r, t)| t - r)
            .collect(),
    )
}

impl AlignedPair {
    /// Delta of the second driver against the first.
    pub fn delta(&self) -> Derived<Vec<f64>> {
        time_delta(&self.first.time, &self.second.time)
    }
}

fn zero_filled(reason: String) -> Derived<Vec<f64>> {
    Derived::degraded(vec![0.0; RESOLUTION], reason)
}
