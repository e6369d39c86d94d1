pub mod config;
pub mod control;
pub mod decode;
pub mod endpoints;
pub mod types;

pub use config::ClientConfig;
pub use control::{button_label, status_label, ControlCommand, DeviceIntents};
pub use decode::{decode_snapshot, decode_snapshot_bytes, DecodeError};
pub use endpoints::*;
pub use types::{CommandEndpoint, Device, Intent, Override, SensorSnapshot, NO_TRANSITION};
