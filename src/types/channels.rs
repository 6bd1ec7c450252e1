//! Channel schemas
//!
//! Two distinct schemas flow through the pipeline and must not be conflated:
//!
//! - the **raw schema**: twelve physical machine channels, one CSV file each,
//!   merged per run by the run loader;
//! - the **encoder schema**: twenty canonical display channels, read
//!   positionally from the merged run table by the encoder.

/// Name of the distinguished angle channel (degrees after loading).
pub const ANGLE_CHANNEL: &str = "BendDieBendingAngle";

/// Name of the time column in merged run tables.
pub const TIME_COLUMN: &str = "Time";

/// Number of raw physical channels per run.
pub const RAW_CHANNEL_COUNT: usize = 12;

/// Number of canonical encoder channels.
pub const ENCODER_CHANNEL_COUNT: usize = 20;

/// One raw physical channel and the file it is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChannel {
    /// Column name in the merged run table
    pub name: &'static str,
    /// File name suffix after `<folder>_`, without extension
    pub file_suffix: &'static str,
    /// Stored in radians on disk and converted to degrees on load
    pub radians: bool,
}

impl RawChannel {
    const fn new(name: &'static str, file_suffix: &'static str) -> Self {
        Self { name, file_suffix, radians: false }
    }

    /// File name of this channel inside a run folder.
    pub fn file_name(&self, folder: &str) -> String {
        format!("{folder}_{}.csv", self.file_suffix)
    }
}

/// Raw channels in merged-table column order.
pub const RAW_CHANNELS: [RawChannel; RAW_CHANNEL_COUNT] = [
    RawChannel {
        name: ANGLE_CHANNEL,
        file_suffix: "bend-die_bending-angle_rad",
        radians: true,
    },
    RawChannel::new("BendDieLateralMovement", "bend-die_lateral-movement"),
    RawChannel::new("ColletAxialForce", "collet_axial-force"),
    RawChannel::new("ColletAxialMovement", "collet_axial-movement"),
    RawChannel::new("MandrelAxialForce", "mandrel_axial-force"),
    RawChannel::new("MandrelAxialMovement", "mandrel_axial-movement"),
    RawChannel::new("PressureDieAxialForce", "pressure-die_axial-force"),
    RawChannel::new("PressureDieAxialMovement", "pressure-die_axial-movement"),
    RawChannel::new("PressureDieLateralForce", "pressure-die_lateral-force"),
    RawChannel::new("WiperDieAxialForce", "wiper-die_axial-force"),
    RawChannel::new("WiperDieLateralForce", "wiper-die_lateral-force"),
    RawChannel::new("WiperDieLateralMovement", "wiper-die_lateral-movement"),
];

/// Canonical encoder channel names, in encoder index order.
pub const ENCODER_CHANNEL_NAMES: [&str; ENCODER_CHANNEL_COUNT] = [
    "bendDieLatT", "bendDieRotT", "bendDieVerT", "bendDieLatM", "bendDieRotA", "bendDieVerM",
    "colletAxT", "colletRotT", "colletAxMov", "colletRotMov",
    "mandrelAxLoad", "mandrelAxMov",
    "pressAxT", "pressLatT", "pressLeftAxT", "pressAxMov", "pressLatMov", "pressLeftAxMov",
    "clampLatT", "clampLatMov",
];
