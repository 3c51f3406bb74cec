//! Visual executors: frame capture via the camera, or servo expressions on
//! the Arduino.

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;
use tracing::info;

use zara_common::{ActionData, ZaraError};

use crate::probe::DeviceHandles;

use super::ExecOutput;

/// Servo pin driven for expressions.
const SERVO_PIN: u8 = 9;

/// Ceiling on a single frame grab.
const CAPTURE_DEADLINE: Duration = Duration::from_secs(10);

/// Capture one frame as visual state.
pub async fn via_camera(
    expression: &str,
    handles: &DeviceHandles,
) -> Result<ExecOutput, ZaraError> {
    let frame = capture_frame(handles).await?;
    let bytes = tokio::fs::metadata(&frame)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    let _ = tokio::fs::remove_file(&frame).await;

    if bytes == 0 {
        return Err(ZaraError::ExecutionFailed("empty frame".to_string()));
    }

    info!("Captured frame for '{}' ({} bytes)", expression, bytes);
    Ok((
        format!("frame captured for '{expression}'"),
        ActionData::FrameBytes(bytes),
    ))
}

/// Play a named expression on the servo.
pub async fn via_arduino_servo(
    expression: &str,
    handles: &DeviceHandles,
) -> Result<ExecOutput, ZaraError> {
    let steps = expression_steps(expression);
    info!("Servo expression '{}' ({} steps)", expression, steps.len());

    let mut stream = super::lock_serial(handles).await?;
    for &(angle, pause) in steps {
        super::write_command(&mut stream, &format!("SERVO {SERVO_PIN} {angle}")).await?;
        tokio::time::sleep(pause).await;
    }

    Ok((
        format!("servo expression '{expression}' complete"),
        ActionData::Text(expression.to_string()),
    ))
}

/// Grab a single frame to a scratch file via v4l2-ctl. Caller owns cleanup.
pub(crate) async fn capture_frame(handles: &DeviceHandles) -> Result<PathBuf, ZaraError> {
    let device = handles
        .camera_device
        .as_ref()
        .ok_or_else(|| ZaraError::ResourceUnavailable("camera device handle".to_string()))?;

    // One frame grab at a time.
    let _guard = handles.camera_lock.lock().await;

    let frame = std::env::temp_dir().join(format!("zara-frame-{}.raw", uuid::Uuid::new_v4()));
    let stream_to = format!("--stream-to={}", frame.display());
    let run = Command::new("v4l2-ctl")
        .args([
            "--device",
            device.as_str(),
            "--stream-mmap",
            "--stream-count=1",
            stream_to.as_str(),
        ])
        .output();

    let output = tokio::time::timeout(CAPTURE_DEADLINE, run)
        .await
        .map_err(|_| ZaraError::ExecutionFailed("frame capture deadline exceeded".to_string()))?
        .map_err(|e| ZaraError::ExecutionFailed(format!("v4l2-ctl: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ZaraError::ExecutionFailed(format!(
            "frame capture failed: {stderr}"
        )));
    }

    Ok(frame)
}

/// Expression choreography: (angle, pause) per step.
fn expression_steps(expression: &str) -> &'static [(u8, Duration)] {
    const HALF_SEC: Duration = Duration::from_millis(500);
    const BEAT: Duration = Duration::from_millis(700);
    const HOLD: Duration = Duration::from_secs(1);

    match expression {
        "celebrate" => &[
            (0, HALF_SEC),
            (180, HALF_SEC),
            (0, HALF_SEC),
            (180, HALF_SEC),
            (90, HALF_SEC),
        ],
        "thinking" => &[(45, BEAT), (135, BEAT), (90, BEAT)],
        "listening" => &[(120, HOLD), (90, HALF_SEC)],
        // Unknown expressions settle at neutral.
        _ => &[(90, HALF_SEC)],
    }
}
