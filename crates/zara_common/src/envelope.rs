//! The action/result envelope.
//!
//! Callers ask the router for a logical action and get back one uniform
//! `ActionResult` no matter which concrete method served it. Callers branch
//! on `success` and `method_used`, never on which library ran underneath.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capability::ResourceKind;

/// Logical I/O actions the router knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Listen,
    Speak,
    Visual,
    Gesture,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Listen,
        ActionKind::Speak,
        ActionKind::Visual,
        ActionKind::Gesture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Listen => "listen",
            ActionKind::Speak => "speak",
            ActionKind::Visual => "visual",
            ActionKind::Gesture => "gesture",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority tier of a method: dedicated peripheral beats a generic OS device,
/// which beats software simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodTier {
    Peripheral,
    GenericDevice,
    Simulation,
}

/// Concrete methods, one or more per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Microphone,
    ArduinoSerial,
    Speakers,
    ArduinoLed,
    Camera,
    ArduinoServo,
    ArduinoSensor,
    Simulation,
}

impl MethodKind {
    /// The resource a method needs, or `None` for simulation, which is the
    /// universal fallback and never probed.
    pub fn backing_resource(&self) -> Option<ResourceKind> {
        match self {
            MethodKind::Microphone => Some(ResourceKind::Microphone),
            MethodKind::Speakers => Some(ResourceKind::Speakers),
            MethodKind::Camera => Some(ResourceKind::Camera),
            MethodKind::ArduinoSerial
            | MethodKind::ArduinoLed
            | MethodKind::ArduinoServo
            | MethodKind::ArduinoSensor => Some(ResourceKind::Arduino),
            MethodKind::Simulation => None,
        }
    }

    pub fn tier(&self) -> MethodTier {
        match self {
            MethodKind::ArduinoSerial
            | MethodKind::ArduinoLed
            | MethodKind::ArduinoServo
            | MethodKind::ArduinoSensor => MethodTier::Peripheral,
            MethodKind::Microphone | MethodKind::Speakers | MethodKind::Camera => {
                MethodTier::GenericDevice
            }
            MethodKind::Simulation => MethodTier::Simulation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Microphone => "microphone",
            MethodKind::ArduinoSerial => "arduino_serial",
            MethodKind::Speakers => "speakers",
            MethodKind::ArduinoLed => "arduino_led",
            MethodKind::Camera => "camera",
            MethodKind::ArduinoServo => "arduino_servo",
            MethodKind::ArduinoSensor => "arduino_sensor",
            MethodKind::Simulation => "simulation",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for one logical action, carrying the per-action parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum ActionRequest {
    /// Capture one utterance. `timeout_secs` overrides the configured
    /// listen window.
    Listen { timeout_secs: Option<u64> },
    /// Say something out loud (or the best available approximation).
    Speak { message: String },
    /// Show a named expression (celebrate, thinking, listening) or capture
    /// visual state.
    Visual { expression: String },
    /// Recognize one gesture.
    Gesture,
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::Listen { .. } => ActionKind::Listen,
            ActionRequest::Speak { .. } => ActionKind::Speak,
            ActionRequest::Visual { .. } => ActionKind::Visual,
            ActionRequest::Gesture => ActionKind::Gesture,
        }
    }
}

/// Opaque payload carried by a result. Variants cover what the executors
/// actually produce; callers that don't care can ignore it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ActionData {
    Text(String),
    Gesture(String),
    LedPattern(Vec<u8>),
    /// Captured frame, reported by size only.
    FrameBytes(u64),
    None,
}

/// Uniform per-invocation result. Immutable; created fresh per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub method_used: MethodKind,
    pub message: String,
    pub data: ActionData,
}

impl ActionResult {
    pub fn ok(method: MethodKind, message: impl Into<String>, data: ActionData) -> Self {
        Self {
            success: true,
            method_used: method,
            message: message.into(),
            data,
        }
    }

    /// Failure envelope. Guarantees a non-empty message so a failure cause is
    /// never silently dropped.
    pub fn failed(method: MethodKind, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = "unspecified executor failure".to_string();
        }
        Self {
            success: false,
            method_used: method,
            message,
            data: ActionData::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_non_simulation_method_has_a_backing_resource() {
        let methods = [
            MethodKind::Microphone,
            MethodKind::ArduinoSerial,
            MethodKind::Speakers,
            MethodKind::ArduinoLed,
            MethodKind::Camera,
            MethodKind::ArduinoServo,
            MethodKind::ArduinoSensor,
        ];
        for m in methods {
            assert!(m.backing_resource().is_some(), "{m} has no resource");
            assert_ne!(m.tier(), MethodTier::Simulation);
        }
        assert!(MethodKind::Simulation.backing_resource().is_none());
        assert_eq!(MethodKind::Simulation.tier(), MethodTier::Simulation);
    }

    #[test]
    fn arduino_methods_are_peripheral_tier() {
        assert_eq!(MethodKind::ArduinoServo.tier(), MethodTier::Peripheral);
        assert_eq!(MethodKind::Microphone.tier(), MethodTier::GenericDevice);
        assert!(MethodTier::Peripheral < MethodTier::GenericDevice);
        assert!(MethodTier::GenericDevice < MethodTier::Simulation);
    }

    #[test]
    fn failed_envelope_never_has_empty_message() {
        let result = ActionResult::failed(MethodKind::Microphone, "");
        assert!(!result.success);
        assert!(!result.message.is_empty());
        assert_eq!(result.data, ActionData::None);
    }

    #[test]
    fn result_serializes_with_snake_case_method() {
        let result = ActionResult::ok(
            MethodKind::ArduinoServo,
            "servo feedback complete",
            ActionData::Gesture("celebrate".into()),
        );
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("arduino_servo"));
        assert!(json.contains("celebrate"));
    }
}
