//! Default constants.
//!
//! Values of the historical at2024 processing scripts. Grouped by stage.

// ============================================================================
// Dataset layout
// ============================================================================

/// Parameter table holding one metadata row per run, keyed by `No.`.
pub const PARAMETER_FILE: &str = "Parameter_Simulation_01.csv";

/// Index column of the parameter table.
pub const PARAMETER_INDEX_COLUMN: &str = "No.";

/// Run folder prefix; folders are `<prefix><id:02>`.
pub const FOLDER_PREFIX: &str = "SIM_V12-";

/// Field delimiter of every input table.
pub const INPUT_DELIMITER: u8 = b';';

/// First run id of the dataset.
pub const RUN_START: u32 = 1;

/// Last run id of the dataset.
pub const RUN_END: u32 = 162;

// ============================================================================
// Encoder
// ============================================================================

/// Quantization step; values land in roughly `[-quant/2, quant/2]`.
pub const DEFAULT_QUANT: i64 = 100;

/// Number of encoded display channels.
pub const NUM_CHANNELS: usize = crate::types::ENCODER_CHANNEL_COUNT;
