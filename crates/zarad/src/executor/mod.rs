//! Action executors - one implementation per (action, method) pair.
//!
//! Each executor wraps exactly one third-party interaction and reports back
//! through `Result<(message, data), ZaraError>`; the router turns that into
//! the envelope. Executors never panic and their side effects (audio, servo
//! motion, frame grabs) stay confined here.

pub mod gesture;
pub mod listen;
pub mod simulation;
pub mod speak;
pub mod visual;

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::MutexGuard;
use tokio_serial::SerialStream;
use tracing::debug;

use zara_common::{ActionData, ActionRequest, MethodKind, ZaraError};

use crate::config::ZaraConfig;
use crate::probe::DeviceHandles;
use crate::speech::Transcriber;

/// Executor output before enveloping: a human-readable note plus the payload.
pub type ExecOutput = (String, ActionData);

/// Route one request to the executor for the selected method.
pub async fn dispatch(
    method: MethodKind,
    req: &ActionRequest,
    handles: &DeviceHandles,
    config: &ZaraConfig,
    transcriber: &dyn Transcriber,
) -> Result<ExecOutput, ZaraError> {
    match (req, method) {
        (ActionRequest::Listen { timeout_secs }, MethodKind::Microphone) => {
            listen::via_microphone(*timeout_secs, handles, config, transcriber).await
        }
        (ActionRequest::Listen { timeout_secs }, MethodKind::ArduinoSerial) => {
            listen::via_arduino_serial(*timeout_secs, handles, config).await
        }
        (ActionRequest::Listen { .. }, MethodKind::Simulation) => {
            simulation::listen(config).await
        }

        (ActionRequest::Speak { message }, MethodKind::Speakers) => {
            speak::via_speakers(message, handles, config).await
        }
        (ActionRequest::Speak { message }, MethodKind::ArduinoLed) => {
            speak::via_arduino_led(message, handles).await
        }
        (ActionRequest::Speak { message }, MethodKind::Simulation) => {
            simulation::speak(message).await
        }

        (ActionRequest::Visual { expression }, MethodKind::Camera) => {
            visual::via_camera(expression, handles).await
        }
        (ActionRequest::Visual { expression }, MethodKind::ArduinoServo) => {
            visual::via_arduino_servo(expression, handles).await
        }
        (ActionRequest::Visual { expression }, MethodKind::Simulation) => {
            simulation::visual(expression).await
        }

        (ActionRequest::Gesture, MethodKind::Camera) => {
            gesture::via_camera(handles, config).await
        }
        (ActionRequest::Gesture, MethodKind::ArduinoSensor) => {
            gesture::via_arduino_sensor(handles, config).await
        }
        (ActionRequest::Gesture, MethodKind::Simulation) => simulation::gesture(config).await,

        (req, method) => Err(ZaraError::Internal(format!(
            "method {} cannot serve action {}",
            method,
            req.kind()
        ))),
    }
}

/// Take the Arduino lock for the duration of one serial transaction.
///
/// Callers hold the returned guard across every write and read belonging to
/// one action, so a concurrent action on the same peripheral can never
/// interleave into the middle of a command/response exchange.
pub(crate) async fn lock_serial(
    handles: &DeviceHandles,
) -> Result<MutexGuard<'_, SerialStream>, ZaraError> {
    let serial = handles
        .serial
        .as_ref()
        .ok_or_else(|| ZaraError::ResourceUnavailable("arduino serial handle".to_string()))?;
    Ok(serial.lock().await)
}

/// Write one newline-framed command to an already-locked serial stream.
pub(crate) async fn write_command(
    stream: &mut SerialStream,
    line: &str,
) -> Result<(), ZaraError> {
    debug!("serial >> {}", line);
    stream
        .write_all(format!("{line}\n").as_bytes())
        .await
        .map_err(|e| ZaraError::Serial(format!("write failed: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| ZaraError::Serial(format!("flush failed: {e}")))?;
    Ok(())
}

/// Read one newline-terminated line from an already-locked serial stream,
/// bounded by a deadline.
pub(crate) async fn read_line(
    stream: &mut SerialStream,
    timeout: Duration,
) -> Result<String, ZaraError> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    let read = tokio::time::timeout(timeout, async {
        loop {
            let n = stream
                .read(&mut byte)
                .await
                .map_err(|e| ZaraError::Serial(format!("read failed: {e}")))?;
            if n == 0 {
                return Err(ZaraError::Serial("serial stream closed".to_string()));
            }
            if byte[0] == b'\n' {
                return Ok(());
            }
            line.push(byte[0]);
        }
    })
    .await;

    match read {
        Ok(Ok(())) => Ok(String::from_utf8_lossy(&line).trim().to_string()),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ZaraError::ExecutionFailed("timeout".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::CommandTranscriber;

    #[tokio::test]
    async fn mismatched_pair_is_rejected_not_panicked() {
        let handles = DeviceHandles::default();
        let config = ZaraConfig::default();
        let transcriber = CommandTranscriber::new("true");
        let err = dispatch(
            MethodKind::Speakers,
            &ActionRequest::Gesture,
            &handles,
            &config,
            &transcriber,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ZaraError::Internal(_)));
    }

    #[tokio::test]
    async fn locking_serial_fails_cleanly_without_a_handle() {
        let handles = DeviceHandles::default();
        let err = lock_serial(&handles).await.unwrap_err();
        assert!(matches!(err, ZaraError::ResourceUnavailable(_)));
    }
}
