//! Gesture executors: camera frame + external classifier, or the Arduino
//! sensor channel.

use std::time::Duration;

use tokio::process::Command;
use tracing::info;

use zara_common::{ActionData, ZaraError};

use crate::config::ZaraConfig;
use crate::probe::DeviceHandles;

use super::ExecOutput;

/// Ceiling on external classification.
const CLASSIFY_DEADLINE: Duration = Duration::from_secs(15);

/// Capture a frame and hand it to the configured classifier command. The
/// envelope never fabricates hardware results: with no classifier
/// configured this is an executor failure, not a fake gesture.
pub async fn via_camera(
    handles: &DeviceHandles,
    config: &ZaraConfig,
) -> Result<ExecOutput, ZaraError> {
    let classifier = config.hardware.gesture_classifier_command.trim();
    if classifier.is_empty() {
        return Err(ZaraError::ExecutionFailed(
            "no gesture classifier configured".to_string(),
        ));
    }

    let frame = super::visual::capture_frame(handles).await?;
    let run = Command::new(classifier).arg(&frame).output();

    let output = tokio::time::timeout(CLASSIFY_DEADLINE, run)
        .await
        .map_err(|_| ZaraError::ExecutionFailed("classifier deadline exceeded".to_string()));
    let _ = tokio::fs::remove_file(&frame).await;

    let output = output?
        .map_err(|e| ZaraError::ExecutionFailed(format!("classifier '{classifier}': {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ZaraError::ExecutionFailed(format!(
            "classifier exited with {}: {}",
            output.status, stderr
        )));
    }

    let gesture = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if gesture.is_empty() {
        return Err(ZaraError::ExecutionFailed(
            "classifier produced no label".to_string(),
        ));
    }

    info!("Gesture recognized via camera: {}", gesture);
    Ok((
        "gesture recognized via camera".to_string(),
        ActionData::Gesture(gesture),
    ))
}

/// Ask the Arduino's sensors for a gesture reading.
pub async fn via_arduino_sensor(
    handles: &DeviceHandles,
    config: &ZaraConfig,
) -> Result<ExecOutput, ZaraError> {
    let window = Duration::from_secs(config.hardware.listen_timeout_secs);

    // Hold the lock across the whole request/reply exchange so another
    // action cannot steal the sensor's answer.
    let mut stream = super::lock_serial(handles).await?;
    super::write_command(&mut stream, "READ GESTURE").await?;
    let reply = super::read_line(&mut stream, window).await?;
    drop(stream);

    let gesture = reply
        .strip_prefix("GESTURE ")
        .unwrap_or(reply.as_str())
        .trim()
        .to_string();
    if gesture.is_empty() {
        return Err(ZaraError::ExecutionFailed(
            "sensor returned no gesture".to_string(),
        ));
    }

    info!("Gesture detected via Arduino sensor: {}", gesture);
    Ok((
        "gesture detected via sensor".to_string(),
        ActionData::Gesture(gesture),
    ))
}
