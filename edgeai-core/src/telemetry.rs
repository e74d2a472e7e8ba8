// Telemetry message schema published to the cloud

use serde::{Deserialize, Serialize};

/// One telemetry report. Serialized with serde_json and published at
/// QoS 1, non-retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryMessage {
    pub version: String,
    pub random: i32,
    pub class_id: u8,
    pub class: String,
    pub event_detected: bool,
}

impl TelemetryMessage {
    /// Build a report from the latest detection. `event_detected` is
    /// derived, never set by callers: class 0 is the negative class.
    pub fn new(version: &str, random: i32, class_id: u8, class: &str) -> Self {
        Self {
            version: version.to_string(),
            random,
            class_id,
            class: class.to_string(),
            event_detected: class_id > 0,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn event_flag_is_derived_from_class_id() {
        assert!(!TelemetryMessage::new("A-1.1.0", 42, 0, "unlabelled").event_detected);
        assert!(TelemetryMessage::new("A-1.1.0", 42, 1, "alarm").event_detected);
    }

    #[test]
    fn json_has_exactly_the_declared_keys() {
        let msg = TelemetryMessage::new("B-1.1.0", 7, 2, "S");
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["class", "class_id", "event_detected", "random", "version"]
        );

        assert!(object["version"].is_string());
        assert!(object["random"].is_i64());
        assert!(object["class_id"].is_u64());
        assert!(object["class"].is_string());
        assert!(object["event_detected"].is_boolean());
    }

    #[test]
    fn round_trips_through_serde() {
        let msg = TelemetryMessage::new("F-1.1.0", 99, 1, "fall");
        let back: TelemetryMessage =
            serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(back, msg);
    }
}
