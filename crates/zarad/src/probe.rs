//! Hardware capability probing.
//!
//! One sweep at startup: each resource gets a minimal non-destructive
//! handshake with a bounded timeout. A failed probe records why and moves
//! on; one dead resource never aborts the sweep. Successfully opened
//! handles stay cached here and are lent to executors, never given away.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait};
use tokio::sync::Mutex;
use tokio_serial::SerialPortBuilderExt;
use tracing::{info, warn};

use zara_common::{CapabilityStatus, CapabilityTable, ResourceKind};

use crate::config::HardwareConfig;

/// Handles cached by the probe. Owned exclusively here; executors borrow a
/// peripheral through its mutex, which also serializes concurrent use of
/// the same device.
#[derive(Clone, Default)]
pub struct DeviceHandles {
    /// Open Arduino serial stream, if the probe found one.
    pub serial: Option<Arc<Mutex<tokio_serial::SerialStream>>>,
    /// Port the serial stream was opened on.
    pub serial_port: Option<String>,
    /// Camera device node that answered the probe.
    pub camera_device: Option<String>,
    /// Default input device name reported by the audio host.
    pub microphone_name: Option<String>,
    /// Default output device name reported by the audio host.
    pub speaker_name: Option<String>,
    /// Serializes camera access (one frame grab at a time).
    pub camera_lock: Arc<Mutex<()>>,
    /// Serializes audio output (never two clips on one device).
    pub speaker_lock: Arc<Mutex<()>>,
    /// Serializes microphone capture.
    pub microphone_lock: Arc<Mutex<()>>,
}

/// Probe every resource kind once and build the capability table.
pub async fn probe_all(config: &HardwareConfig) -> (CapabilityTable, DeviceHandles) {
    let mut table = CapabilityTable::all_unavailable();
    let mut handles = DeviceHandles::default();

    let (arduino_status, serial) = probe_arduino(config).await;
    if let Some((stream, port)) = serial {
        handles.serial = Some(Arc::new(Mutex::new(stream)));
        handles.serial_port = Some(port);
    }
    table.set(ResourceKind::Arduino, arduino_status);

    let timeout = Duration::from_millis(config.probe_timeout_ms);

    let (camera_status, camera_device) = probe_camera(config).await;
    handles.camera_device = camera_device;
    table.set(ResourceKind::Camera, camera_status);

    let (mic_status, mic_name) = probe_microphone(timeout).await;
    handles.microphone_name = mic_name;
    table.set(ResourceKind::Microphone, mic_status);

    let (speaker_status, speaker_name) = probe_speakers(timeout).await;
    handles.speaker_name = speaker_name;
    table.set(ResourceKind::Speakers, speaker_status);

    info!(
        "Capability probe complete: {}/{} resources available",
        table.available_count(),
        ResourceKind::ALL.len()
    );

    (table, handles)
}

/// Try each configured serial port in order; keep the first that opens.
async fn probe_arduino(
    config: &HardwareConfig,
) -> (CapabilityStatus, Option<(tokio_serial::SerialStream, String)>) {
    let timeout = Duration::from_millis(config.probe_timeout_ms);

    for port in &config.serial_ports {
        if !Path::new(port).exists() {
            continue;
        }

        info!("Attempting Arduino connection on {}", port);
        let attempt = tokio::time::timeout(timeout, async {
            tokio_serial::new(port.as_str(), config.baud_rate).open_native_async()
        })
        .await;

        match attempt {
            Ok(Ok(stream)) => {
                info!("Arduino connected on {}", port);
                return (
                    CapabilityStatus::connected(port.clone()),
                    Some((stream, port.clone())),
                );
            }
            Ok(Err(e)) => {
                warn!("Serial open failed on {}: {}", port, e);
            }
            Err(_) => {
                warn!("Serial probe timed out on {}", port);
            }
        }
    }

    (
        CapabilityStatus::not_found("no serial port answered"),
        None,
    )
}

/// Check configured video nodes; confirm with v4l2-ctl when it is installed.
async fn probe_camera(config: &HardwareConfig) -> (CapabilityStatus, Option<String>) {
    let existing: Vec<&String> = config
        .camera_devices
        .iter()
        .filter(|d| Path::new(d.as_str()).exists())
        .collect();

    if existing.is_empty() {
        return (CapabilityStatus::not_found("no video device nodes"), None);
    }

    if !command_exists("v4l2-ctl").await {
        return (
            CapabilityStatus::library_missing("v4l2-ctl not installed"),
            None,
        );
    }

    let timeout = Duration::from_millis(config.probe_timeout_ms);
    for device in existing {
        let run = tokio::process::Command::new("v4l2-ctl")
            .args(["--device", device.as_str(), "--info"])
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout, run).await {
            Ok(Ok(o)) if o.status.success() => {
                info!("Camera detected on {}", device);
                return (
                    CapabilityStatus::connected(device.clone()),
                    Some(device.clone()),
                );
            }
            Ok(Ok(_)) => warn!("Camera {} did not answer --info", device),
            Ok(Err(e)) => warn!("v4l2-ctl failed for {}: {}", device, e),
            Err(_) => warn!("Camera handshake timed out on {}", device),
        }
    }

    (
        CapabilityStatus::not_found("video nodes present but unresponsive"),
        None,
    )
}

/// Default input device lookup via the audio host. Runs on the blocking
/// pool; cpal enumeration can stall on broken audio stacks.
async fn probe_microphone(timeout: Duration) -> (CapabilityStatus, Option<String>) {
    let lookup = tokio::task::spawn_blocking(|| {
        let host = cpal::default_host();
        host.default_input_device()
            .map(|d| d.name().unwrap_or_else(|_| "unknown input".to_string()))
    });

    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(Some(name))) => {
            info!("Microphone detected: {}", name);
            (CapabilityStatus::connected(name.clone()), Some(name))
        }
        Ok(Ok(None)) => (CapabilityStatus::not_found("no default input device"), None),
        Ok(Err(e)) => (
            CapabilityStatus::library_missing(format!("audio host unavailable: {e}")),
            None,
        ),
        Err(_) => (
            CapabilityStatus::library_missing("audio host handshake timed out"),
            None,
        ),
    }
}

/// Default output device lookup, bounded like the input lookup.
async fn probe_speakers(timeout: Duration) -> (CapabilityStatus, Option<String>) {
    let lookup = tokio::task::spawn_blocking(|| {
        let host = cpal::default_host();
        host.default_output_device()
            .map(|d| d.name().unwrap_or_else(|_| "unknown output".to_string()))
    });

    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(Some(name))) => {
            info!("Audio output detected: {}", name);
            (CapabilityStatus::connected(name.clone()), Some(name))
        }
        Ok(Ok(None)) => (
            CapabilityStatus::not_found("no default output device"),
            None,
        ),
        Ok(Err(e)) => (
            CapabilityStatus::library_missing(format!("audio host unavailable: {e}")),
            None,
        ),
        Err(_) => (
            CapabilityStatus::library_missing("audio host handshake timed out"),
            None,
        ),
    }
}

/// `which`-style existence check for an external tool.
pub async fn command_exists(name: &str) -> bool {
    tokio::process::Command::new("which")
        .arg(name)
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}
