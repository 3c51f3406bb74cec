//! Speak executors: audio output via an external TTS tool, or the Arduino
//! LED pattern fallback.

use std::time::Duration;

use tokio::process::Command;
use tracing::info;

use zara_common::{ActionData, ZaraError};

use crate::config::ZaraConfig;
use crate::probe::DeviceHandles;

use super::ExecOutput;

/// Pause between LED states while a pattern plays out.
const LED_STEP: Duration = Duration::from_millis(300);

/// Hard ceiling on TTS synthesis/playback time.
const TTS_DEADLINE: Duration = Duration::from_secs(30);

/// Speak through the system audio device using the configured TTS command.
pub async fn via_speakers(
    message: &str,
    handles: &DeviceHandles,
    config: &ZaraConfig,
) -> Result<ExecOutput, ZaraError> {
    // One clip at a time on the output device.
    let _guard = handles.speaker_lock.lock().await;

    info!("Speaking via audio output: {:?}", message);
    let run = Command::new(&config.hardware.tts_command)
        .arg(message)
        .output();

    let output = tokio::time::timeout(TTS_DEADLINE, run)
        .await
        .map_err(|_| ZaraError::ExecutionFailed("tts deadline exceeded".to_string()))?
        .map_err(|e| {
            ZaraError::ExecutionFailed(format!(
                "tts command '{}': {}",
                config.hardware.tts_command, e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ZaraError::ExecutionFailed(format!(
            "tts exited with {}: {}",
            output.status, stderr
        )));
    }

    Ok((
        "audio output complete".to_string(),
        ActionData::Text(message.to_string()),
    ))
}

/// Blink the message out on the Arduino LED when no audio path exists.
pub async fn via_arduino_led(
    message: &str,
    handles: &DeviceHandles,
) -> Result<ExecOutput, ZaraError> {
    let pattern = message_to_led_pattern(message);
    info!("Displaying message via Arduino LED ({} steps)", pattern.len());

    let mut stream = super::lock_serial(handles).await?;
    for &state in &pattern {
        super::write_command(&mut stream, &format!("LED {state}")).await?;
        tokio::time::sleep(LED_STEP).await;
    }
    super::write_command(&mut stream, "LED 0").await?;

    Ok((
        "led pattern displayed".to_string(),
        ActionData::LedPattern(pattern),
    ))
}

/// Word count sets the blink count, capped at ten. An empty message has
/// nothing to say, so it produces no blinks at all.
fn message_to_led_pattern(message: &str) -> Vec<u8> {
    let blinks = message.split_whitespace().count().min(10);
    let mut pattern = Vec::with_capacity(blinks * 2);
    for _ in 0..blinks {
        pattern.push(1);
        pattern.push(0);
    }
    pattern
}
