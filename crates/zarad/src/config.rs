//! Configuration management for zarad.
//!
//! Loads settings from /etc/zara/config.toml or uses defaults. Resource
//! identifiers (serial ports, camera nodes) live here rather than being
//! hard-coded at the call sites.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use zara_common::{ActionKind, MethodKind};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/zara/config.toml";

/// Hardware probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Serial ports to try for the Arduino peripheral, in order
    #[serde(default = "default_serial_ports")]
    pub serial_ports: Vec<String>,

    /// Serial baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Per-port probe timeout in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Camera device nodes to check, in order
    #[serde(default = "default_camera_devices")]
    pub camera_devices: Vec<String>,

    /// Default microphone listen window in seconds
    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_secs: u64,

    /// External speech-to-text command; receives a WAV path as last argument
    #[serde(default = "default_transcriber_command")]
    pub transcriber_command: String,

    /// External text-to-speech command; receives the text as last argument
    #[serde(default = "default_tts_command")]
    pub tts_command: String,

    /// External gesture classifier command; receives a frame path as last
    /// argument. Empty means no classifier is installed.
    #[serde(default)]
    pub gesture_classifier_command: String,
}

fn default_serial_ports() -> Vec<String> {
    vec![
        "/dev/ttyUSB0".to_string(),
        "/dev/ttyACM0".to_string(),
        "/dev/ttyUSB1".to_string(),
    ]
}

fn default_baud_rate() -> u32 {
    57600
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_camera_devices() -> Vec<String> {
    vec!["/dev/video0".to_string(), "/dev/video1".to_string()]
}

fn default_listen_timeout() -> u64 {
    5
}

fn default_transcriber_command() -> String {
    "whisper-cli".to_string()
}

fn default_tts_command() -> String {
    "espeak-ng".to_string()
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            serial_ports: default_serial_ports(),
            baud_rate: default_baud_rate(),
            probe_timeout_ms: default_probe_timeout_ms(),
            camera_devices: default_camera_devices(),
            listen_timeout_secs: default_listen_timeout(),
            transcriber_command: default_transcriber_command(),
            tts_command: default_tts_command(),
            gesture_classifier_command: String::new(),
        }
    }
}

/// Simulation fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Canned transcripts returned by the simulated listener
    #[serde(default = "default_transcripts")]
    pub transcripts: Vec<String>,

    /// Gesture pool for the simulated recognizer
    #[serde(default = "default_gestures")]
    pub gestures: Vec<String>,
}

fn default_transcripts() -> Vec<String> {
    vec![
        "hello zara".to_string(),
        "what can you do".to_string(),
        "tell me something interesting".to_string(),
    ]
}

fn default_gestures() -> Vec<String> {
    vec![
        "wave".to_string(),
        "thumbs_up".to_string(),
        "peace".to_string(),
        "ok".to_string(),
        "point".to_string(),
    ]
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            transcripts: default_transcripts(),
            gestures: default_gestures(),
        }
    }
}

/// LLM completion client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Completion endpoint base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model name passed to the endpoint
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.2:1b".to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Top-level daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZaraConfig {
    #[serde(default)]
    pub hardware: HardwareConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    /// Per-action method priority override. Keys are action names
    /// ("listen", "speak", "visual", "gesture"); values are ordered method
    /// lists. Actions not listed keep the built-in order.
    #[serde(default)]
    pub priorities: HashMap<String, Vec<MethodKind>>,
}

impl ZaraConfig {
    /// Load from the standard path, falling back to defaults when the file
    /// is absent or unreadable.
    pub fn load() -> Self {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Invalid config at {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Priority override for one action, if configured.
    pub fn priority_override(&self, action: ActionKind) -> Option<&[MethodKind]> {
        self.priorities.get(action.as_str()).map(|v| v.as_slice())
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        Ok(())
    }
}
