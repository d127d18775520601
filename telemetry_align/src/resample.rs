use thiserror::Error;

use crate::types::{AlignedPair, Channel, ResampledChannels, TelemetrySample};

/// Number of points on the shared distance axis. Every resampled channel has
/// exactly this many values.
pub const RESOLUTION: usize = 500;

/// Which of the two compared series an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResampleError {
    #[error("{side:?} series has {count} usable telemetry samples, at least 2 are required")]
    InsufficientSamples { side: Side, count: usize },
}

/// A lap's samples sorted by distance, split into one column per channel.
///
/// Built only from at least two samples with a finite distance, so every
/// lookup has a non-degenerate interpolation domain.
pub struct DistanceTrace {
    distance: Vec<f64>,
    columns: [Vec<f64>; 6],
}

impl DistanceTrace {
    /// Sort samples by distance and extract the channel columns.
    ///
    /// Samples whose distance is not finite are dropped. Ties keep their
    /// original order.
    ///
    /// # Returns
    /// `None` if fewer than 2 usable samples remain
    pub fn from_samples(samples: &[TelemetrySample]) -> Option<Self> {
        let mut sorted: Vec<&TelemetrySample> =
            samples.iter().filter(|s| s.distance.is_finite()).collect();

        // Need at least 2 points for a meaningful interpolation
        if sorted.len() < 2 {
            return None;
        }

        // Stable sort, so duplicate distances stay in recording order
        sorted.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let distance = sorted.iter().map(|s| s.distance).collect();
        let columns = Channel::ALL.map(|c| sorted.iter().map(|s| c.read(s)).collect());
        Some(Self { distance, columns })
    }

    /// Largest distance covered by the trace.
    pub fn max_distance(&self) -> f64 {
        // sorted and non-empty by construction
        self.distance[self.distance.len() - 1]
    }

    /// Value of `channel` at distance `at`, linearly interpolated and clamped
    /// to the boundary samples outside the covered range.
    pub fn value_at(&self, channel: Channel, at: f64) -> f64 {
        interpolate(&self.distance, &self.columns[channel as usize], at)
    }

    /// Sample every channel at each point of `axis`.
    pub fn resample(&self, axis: &[f64]) -> ResampledChannels {
        ResampledChannels::from_columns(
            Channel::ALL.map(|c| axis.iter().map(|&d| self.value_at(c, d)).collect()),
        )
    }
}

/// `n` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise-linear interpolation of `(xs, ys)` at `at`.
///
/// `xs` must be sorted ascending. Queries left of `xs[0]` return `ys[0]`,
/// queries right of the last point return the last value. Empty or
/// mismatched inputs give NaN.
pub(crate) fn interpolate(xs: &[f64], ys: &[f64], at: f64) -> f64 {
    if xs.is_empty() || ys.len() != xs.len() || at.is_nan() {
        return f64::NAN;
    }
    let last = xs.len() - 1;
    if at <= xs[0] {
        return ys[0];
    }
    if at >= xs[last] {
        return ys[last];
    }

    // xs[lo] <= at < xs[hi], so the span is never zero
    let hi = xs.partition_point(|&x| x <= at);
    let lo = hi - 1;
    let t = (at - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] + t * (ys[hi] - ys[lo])
}

/// Align two fastest-lap series on a common distance axis.
///
/// The axis has [`RESOLUTION`] points from 0 to the shorter lap's maximum
/// distance, so neither series is extrapolated.
pub fn align(
    first: &[TelemetrySample],
    second: &[TelemetrySample],
) -> Result<AlignedPair, ResampleError> {
    let a = trace_for(first, Side::First)?;
    let b = trace_for(second, Side::Second)?;

    let max_distance = a.max_distance().min(b.max_distance());
    let distance = linspace(0.0, max_distance, RESOLUTION);

    Ok(AlignedPair {
        first: a.resample(&distance),
        second: b.resample(&distance),
        distance,
    })
}

fn trace_for(samples: &[TelemetrySample], side: Side) -> Result<DistanceTrace, ResampleError> {
    DistanceTrace::from_samples(samples).ok_or_else(|| ResampleError::InsufficientSamples {
        side,
        count: samples.iter().filter(|s| s.distance.is_finite()).count(),
    })
}
