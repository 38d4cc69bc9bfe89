//! Domain Layer
//!
//! Vessel fixes as the server sends them and as consumers read them, plus the
//! viewport the consumer reports back. No I/O lives here.

pub mod vessel;
pub mod viewport;

pub use vessel::{FleetSnapshot, VesselFix, VesselFixFrame};
pub use viewport::{Bounds, ViewportRequest, MAX_ZOOM, MIN_ZOOM};
