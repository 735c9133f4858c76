//! Sound classification labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of sound classes the classifier can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundClass {
    /// Spoken voice.
    Speech,
    /// Broadband musical content.
    Music,
    /// Narrowband stationary tone.
    Tone,
    /// Broadband noise.
    Noise,
    /// Near-silence.
    Silence,
}

impl SoundClass {
    /// All classes in a stable order.
    pub fn all() -> &'static [SoundClass] {
        &[
            SoundClass::Speech,
            SoundClass::Music,
            SoundClass::Tone,
            SoundClass::Noise,
            SoundClass::Silence,
        ]
    }

    /// Lowercase name used in reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundClass::Speech => "speech",
            SoundClass::Music => "music",
            SoundClass::Tone => "tone",
            SoundClass::Noise => "noise",
            SoundClass::Silence => "silence",
        }
    }
}

impl fmt::Display for SoundClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A class assignment with its confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Assigned class.
    pub class: SoundClass,
    /// Confidence in [0, 1].
    pub confidence: f64,
}

impl Label {
    /// Create a label, clamping confidence to [0, 1].
    pub fn new(class: SoundClass, confidence: f64) -> Self {
        Self {
            class,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}
