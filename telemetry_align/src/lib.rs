//! Distance alignment of fastest-lap telemetry for head-to-head driver
//! comparison, plus the derived delta curve and tyre stint summaries.

pub mod delta;
pub mod derived;
pub mod lap_time;
pub mod resample;
pub mod stints;
pub mod types;

pub use delta::time_delta;
pub use derived::Derived;
pub use lap_time::format_lap_time;
pub use resample::{align, DistanceTrace, ResampleError, Side, RESOLUTION};
pub use stints::{aggregate_stints, UNKNOWN_COMPOUND};
pub use types::{
    AlignedPair, Channel, LapRecord, ResampledChannels, StintRecord, TelemetrySample,
};
