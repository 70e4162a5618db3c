// src/config/constants.rs
//! Engine-wide configuration constants

/// Acquisition constants
pub mod signal {
    /// Channel count of the band this engine was first deployed with
    pub const DEFAULT_CHANNEL_COUNT: usize = 8;
    pub const DEFAULT_SAMPLING_RATE_HZ: u32 = 500;
    pub const MAX_CHANNEL_COUNT: usize = 128;
}

/// Feature extraction constants
pub mod features {
    pub const DEFAULT_WELCH_SEGMENT_LEN: usize = 256;
    pub const DEFAULT_STFT_SEGMENT_LEN: usize = 256;
    pub const DEFAULT_SNR_NOISE_SAMPLES: usize = 100;
    pub const DEFAULT_CWT_MAX_SCALE: usize = 127;
    pub const DEFAULT_ZERO_CROSSING_THRESHOLD: f32 = 0.0;
}

/// Dataset storage constants
pub mod storage {
    pub const DEFAULT_ROOT: &str = "assets/band";
    pub const DEFAULT_DATA_FILE: &str = "emg_raw_data";
    pub const DEFAULT_METADATA_FILE: &str = "metadata";
    pub const DATA_EXTENSION: &str = "json";
    pub const METADATA_EXTENSION: &str = "toml";
}

/// File system paths
pub mod paths {
    pub const SYSTEM_CONFIG_PATH: &str = "/etc/emg-signal/config.toml";
    pub const USER_CONFIG_DIR: &str = ".config/emg-signal";
    pub const LOCAL_CONFIG_FILE: &str = "emg-signal.toml";
    pub const ENV_PREFIX: &str = "EMG_SIGNAL";
    pub const ENV_SEPARATOR: &str = "__";
}
