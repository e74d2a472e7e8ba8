// Model catalog: which sensor feeds each model and how its outputs are named

use serde::{Deserialize, Serialize};

/// Sensor front-end selected by the active model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    PdmMicrophone,
    Accelerometer,
    Radar,
}

/// The pre-trained classifier this firmware runs. Exactly one is active,
/// chosen from the device configuration at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    Cough,
    Alarm,
    BabyCry,
    DirectionOfArrival,
    FallDetection,
    Gesture,
}

const COUGH_SYMBOLS: &[&str] = &["unlabelled", "cough"];
const ALARM_SYMBOLS: &[&str] = &["unlabelled", "alarm"];
const BABYCRY_SYMBOLS: &[&str] = &["unlabelled", "babycry"];
const DOA_SYMBOLS: &[&str] = &[
    "unlabelled", "N", "S", "W", "E", "NE", "SW", "NW", "SE",
];
const FALL_SYMBOLS: &[&str] = &["unlabelled", "fall"];
const GESTURE_SYMBOLS: &[&str] = &[
    "unlabelled",
    "push",
    "swipe-left",
    "swipe-right",
    "swipe-up",
    "swipe-down",
];

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::Cough,
        ModelKind::Alarm,
        ModelKind::BabyCry,
        ModelKind::DirectionOfArrival,
        ModelKind::FallDetection,
        ModelKind::Gesture,
    ];

    /// Which sensor path feeds this model.
    pub fn sensor(self) -> SensorKind {
        match self {
            ModelKind::Cough | ModelKind::Alarm | ModelKind::BabyCry => {
                SensorKind::PdmMicrophone
            }
            ModelKind::DirectionOfArrival => SensorKind::PdmMicrophone,
            ModelKind::FallDetection => SensorKind::Accelerometer,
            ModelKind::Gesture => SensorKind::Radar,
        }
    }

    /// Class index to label table. Index 0 is always the negative class.
    pub fn symbols(self) -> &'static [&'static str] {
        match self {
            ModelKind::Cough => COUGH_SYMBOLS,
            ModelKind::Alarm => ALARM_SYMBOLS,
            ModelKind::BabyCry => BABYCRY_SYMBOLS,
            ModelKind::DirectionOfArrival => DOA_SYMBOLS,
            ModelKind::FallDetection => FALL_SYMBOLS,
            ModelKind::Gesture => GESTURE_SYMBOLS,
        }
    }

    /// Label for a class index, falling back to the negative class for
    /// indices the model does not define.
    pub fn label_for(self, index: usize) -> &'static str {
        let symbols = self.symbols();
        symbols.get(index).copied().unwrap_or(symbols[0])
    }

    pub fn class_count(self) -> usize {
        self.symbols().len()
    }

    /// Single-letter prefix used in the telemetry version string.
    pub fn version_prefix(self) -> char {
        match self {
            ModelKind::Cough => 'C',
            ModelKind::Alarm => 'A',
            ModelKind::BabyCry | ModelKind::Gesture => 'B',
            ModelKind::DirectionOfArrival => 'D',
            ModelKind::FallDetection => 'F',
        }
    }

    /// Software gain applied to normalized audio samples before inference.
    pub fn digital_boost(self) -> f32 {
        match self {
            ModelKind::Cough => 10.0,
            _ => 1.0,
        }
    }

    /// Analog PDM channel gain in dB. Only meaningful for audio models.
    pub fn pdm_gain_db(self) -> i32 {
        match self {
            ModelKind::Alarm => 23,
            _ => 5,
        }
    }

    /// Number of feature values consumed per enqueue call.
    pub fn inputs_per_step(self) -> usize {
        match self {
            ModelKind::Cough | ModelKind::Alarm | ModelKind::BabyCry => 1,
            ModelKind::DirectionOfArrival => 4,
            ModelKind::FallDetection => 3,
            ModelKind::Gesture => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Cough => "cough",
            ModelKind::Alarm => "alarm",
            ModelKind::BabyCry => "baby-cry",
            ModelKind::DirectionOfArrival => "direction-of-arrival",
            ModelKind::FallDetection => "fall-detection",
            ModelKind::Gesture => "gesture",
        }
    }

    /// Parse the configuration spelling of a model name.
    pub fn from_config_str(s: &str) -> Option<ModelKind> {
        ModelKind::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
    }
}
