use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// One telemetry sample from a driver's lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TelemetrySample {
    /// Distance along lap in meters
    pub distance: f64,
    /// Speed in km/h
    pub speed: f64,
    /// Throttle pedal position, 0..=100
    pub throttle: f64,
    /// Brake application, 0..=1. Boolean brake flags are accepted on input.
    #[serde(deserialize_with = "brake_level")]
    pub brake: f64,
    pub x: f64,
    pub y: f64,
    /// Elapsed time since the start of the lap, floating seconds on the wire
    #[serde(with = "seconds")]
    pub time: Duration,
}

/// The channels produced for every driver by the resampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Speed,
    Throttle,
    Brake,
    X,
    Y,
    Time,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Speed,
        Channel::Throttle,
        Channel::Brake,
        Channel::X,
        Channel::Y,
        Channel::Time,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Speed => "Speed",
            Channel::Throttle => "Throttle",
            Channel::Brake => "Brake",
            Channel::X => "X",
            Channel::Y => "Y",
            Channel::Time => "Time",
        }
    }

    /// Read this channel from a sample. Time is read as floating seconds.
    pub fn read(self, sample: &TelemetrySample) -> f64 {
        match self {
            Channel::Speed => sample.speed,
            Channel::Throttle => sample.throttle,
            Channel::Brake => sample.brake,
            Channel::X => sample.x,
            Channel::Y => sample.y,
            Channel::Time => sample.time.as_secs_f64(),
        }
    }
}

/// All channels of one driver, sampled on the shared distance axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResampledChannels {
    pub speed: Vec<f64>,
    pub throttle: Vec<f64>,
    pub brake: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub time: Vec<f64>,
}

impl ResampledChannels {
    pub(crate) fn from_columns(columns: [Vec<f64>; 6]) -> Self {
        let [speed, throttle, brake, x, y, time] = columns;
        Self { speed, throttle, brake, x, y, time }
    }

    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Speed => &self.speed,
            Channel::Throttle => &self.throttle,
            Channel::Brake => &self.brake,
            Channel::X => &self.x,
            Channel::Y => &self.y,
            Channel::Time => &self.time,
        }
    }
}

/// Two drivers' channels on one shared distance axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub distance: Vec<f64>,
    pub first: ResampledChannels,
    pub second: ResampledChannels,
}

/// Lap metadata as recorded for a session.
///
/// Everything but the driver is read leniently: a value of the wrong shape
/// is recorded as missing instead of failing the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LapRecord {
    pub driver: String,
    #[serde(default, deserialize_with = "loose::count")]
    pub lap_number: Option<u32>,
    #[serde(default, with = "optional_seconds")]
    pub lap_time: Option<Duration>,
    #[serde(default, deserialize_with = "loose::count")]
    pub stint: Option<u32>,
    #[serde(default, deserialize_with = "loose::text")]
    pub compound: Option<String>,
}

/// Summary of one tyre stint. Field names follow the pit wall frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StintRecord {
    pub driver: String,
    pub stint: u32,
    pub compound: String,
    pub start_lap: u32,
    pub end_lap: u32,
    /// Laps in the stint. Not the tyre's age counter.
    pub tyre_life: u32,
}

fn brake_level<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Brake {
        Flag(bool),
        Level(f64),
    }

    Ok(match Brake::deserialize(de)? {
        Brake::Flag(true) => 1.0,
        Brake::Flag(false) => 0.0,
        Brake::Level(level) => level,
    })
}

mod seconds {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(de)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

mod optional_seconds {
    use std::time::Duration;

    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => ser.serialize_some(&d.as_secs_f64()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Duration>, D::Error> {
        Ok(super::loose::number(de)?.and_then(|secs| Duration::try_from_secs_f64(secs).ok()))
    }
}

mod loose {
    use serde::{de::IgnoredAny, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(u64),
        Float(f64),
        Other(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Text(String),
        Other(IgnoredAny),
    }

    pub fn number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
        Ok(match Number::deserialize(de)? {
            Number::Int(n) => Some(n as f64),
            Number::Float(f) if f.is_finite() => Some(f),
            _ => None,
        })
    }

    /// Non-negative integer, also when exported as an integral float (`2.0`).
    pub fn count<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u32>, D::Error> {
        Ok(match Number::deserialize(de)? {
            Number::Int(n) => u32::try_from(n).ok(),
            Number::Float(f) if f.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&f) => {
                Some(f as u32)
            }
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        Ok(match Text::deserialize(de)? {
            Text::Text(s) => Some(s),
            Text::Other(_) => None,
        })
    }
}
