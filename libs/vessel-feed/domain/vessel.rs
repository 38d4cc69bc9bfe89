//! Vessel position fixes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One vessel position as it arrives on the feed
///
/// The server abbreviates the coordinates; everything else keeps its name.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VesselFixFrame {
    #[serde(deserialize_with = "mmsi_string")]
    pub mmsi: String,
    pub lat: f64,
    pub lon: f64,
    /// Course over ground
    pub cog: f64,
    /// Speed over ground
    pub sog: f64,
    pub heading: f64,
}

/// Latest known position of a vessel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselFix {
    /// Maritime Mobile Service Identity of the ship
    pub mmsi: String,
    pub latitude: f64,
    pub longitude: f64,
    pub heading: f64,
    pub cog: f64,
    pub sog: f64,
}

impl From<VesselFixFrame> for VesselFix {
    fn from(frame: VesselFixFrame) -> Self {
        let VesselFixFrame {
            mmsi,
            lat,
            lon,
            cog,
            sog,
            heading,
        } = frame;

        Self {
            mmsi,
            latitude: lat,
            longitude: lon,
            heading,
            cog,
            sog,
        }
    }
}

/// The fleet as of the last frame received
///
/// Every frame replaces the whole set of fixes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetSnapshot {
    pub fixes: Vec<VesselFix>,
    /// `None` until the first frame arrives
    pub received_at: Option<DateTime<Utc>>,
}

impl FleetSnapshot {
    pub fn from_frames(frames: Vec<VesselFixFrame>, received_at: DateTime<Utc>) -> Self {
        Self {
            fixes: frames.into_iter().map(VesselFix::from).collect(),
            received_at: Some(received_at),
        }
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn find(&self, mmsi: &str) -> Option<&VesselFix> {
        self.fixes.iter().find(|fix| fix.mmsi == mmsi)
    }
}

/// Some feeds send the MMSI as a number
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMmsi {
    Text(String),
    Number(u64),
}

fn mmsi_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawMmsi::deserialize(deserializer)? {
        RawMmsi::Text(text) => text,
        RawMmsi::Number(number) => number.to_string(),
    })
}
