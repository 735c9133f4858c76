//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field carries a serde default so partial files load cleanly.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// Ranking weights.
    #[serde(default)]
    pub ranking: RankingSettings,
}

/// Path configuration for output and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for index reports.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_folder() -> String {
    "index_output".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for the run log.
    #[serde(default)]
    pub level: LogLevel,

    /// Show timestamps in run log lines.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            show_timestamps: true,
        }
    }
}

/// Analysis configuration shared by the processing steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Analysis frame size in samples.
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,

    /// Hop between analysis frames in samples.
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,

    /// High-pass cutoff for rumble removal (Hz).
    #[serde(default = "default_denoise_highpass_hz")]
    pub denoise_highpass_hz: f64,

    /// Noise gate threshold relative to the noise floor (dB).
    #[serde(default = "default_denoise_gate_db")]
    pub denoise_gate_db: f64,

    /// Low edge of the speech emphasis band (Hz).
    #[serde(default = "default_enhance_low_hz")]
    pub enhance_low_hz: f64,

    /// High edge of the speech emphasis band (Hz).
    #[serde(default = "default_enhance_high_hz")]
    pub enhance_high_hz: f64,

    /// Wet/dry mix for the emphasis band in [0, 1].
    #[serde(default = "default_enhance_mix")]
    pub enhance_mix: f64,

    /// Peak level to normalize toward in [0, 1].
    #[serde(default = "default_enhance_target_peak")]
    pub enhance_target_peak: f64,

    /// Minimum confidence for a class to appear in the label list.
    #[serde(default = "default_classify_label_floor")]
    pub classify_label_floor: f64,
}

fn default_frame_size() -> usize {
    2048
}

fn default_hop_size() -> usize {
    512
}

fn default_denoise_highpass_hz() -> f64 {
    80.0
}

fn default_denoise_gate_db() -> f64 {
    6.0
}

fn default_enhance_low_hz() -> f64 {
    300.0
}

fn default_enhance_high_hz() -> f64 {
    3400.0
}

fn default_enhance_mix() -> f64 {
    0.5
}

fn default_enhance_target_peak() -> f64 {
    0.9
}

fn default_classify_label_floor() -> f64 {
    0.15
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            hop_size: default_hop_size(),
            denoise_highpass_hz: default_denoise_highpass_hz(),
            denoise_gate_db: default_denoise_gate_db(),
            enhance_low_hz: default_enhance_low_hz(),
            enhance_high_hz: default_enhance_high_hz(),
            enhance_mix: default_enhance_mix(),
            enhance_target_peak: default_enhance_target_peak(),
            classify_label_floor: default_classify_label_floor(),
        }
    }
}

/// Weights for the terminal score fusion.
///
/// Weights are renormalized over the signals actually present, so they
/// express relative importance rather than absolute contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSettings {
    /// Weight of the classification confidence component.
    #[serde(default = "default_weight_classification")]
    pub weight_classification: f64,

    /// Weight of the sentiment strength component.
    #[serde(default = "default_weight_sentiment")]
    pub weight_sentiment: f64,

    /// Weight of the denoise/enhance quality component.
    #[serde(default = "default_weight_quality")]
    pub weight_quality: f64,

    /// Weight of the audio identity component.
    #[serde(default = "default_weight_identity")]
    pub weight_identity: f64,
}

fn default_weight_classification() -> f64 {
    0.4
}

fn default_weight_sentiment() -> f64 {
    0.2
}

fn default_weight_quality() -> f64 {
    0.2
}

fn default_weight_identity() -> f64 {
    0.2
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            weight_classification: default_weight_classification(),
            weight_sentiment: default_weight_sentiment(),
            weight_quality: default_weight_quality(),
            weight_identity: default_weight_identity(),
        }
    }
}
