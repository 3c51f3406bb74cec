//! Listen executors: microphone capture and Arduino serial input.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use zara_common::{ActionData, ZaraError};

use crate::config::ZaraConfig;
use crate::probe::DeviceHandles;
use crate::speech::Transcriber;

use super::ExecOutput;

/// 16 kHz mono, the rate speech models expect.
const SAMPLE_RATE: u32 = 16_000;
const CHANNELS: u16 = 1;

/// Capture one utterance from the default microphone and transcribe it.
pub async fn via_microphone(
    timeout_secs: Option<u64>,
    handles: &DeviceHandles,
    config: &ZaraConfig,
    transcriber: &dyn Transcriber,
) -> Result<ExecOutput, ZaraError> {
    let window = Duration::from_secs(timeout_secs.unwrap_or(config.hardware.listen_timeout_secs));

    // One capture at a time on the device.
    let _guard = handles.microphone_lock.lock().await;

    info!("Listening via microphone for {:?}", window);
    let samples = tokio::task::spawn_blocking(move || record_pcm(window))
        .await
        .map_err(|e| ZaraError::ExecutionFailed(format!("capture task: {e}")))??;

    if samples.iter().all(|&s| s == 0) {
        return Err(ZaraError::ExecutionFailed(
            "captured only silence".to_string(),
        ));
    }

    let wav = tempfile::Builder::new()
        .prefix("zara-listen-")
        .suffix(".wav")
        .tempfile()
        .map_err(ZaraError::Io)?;
    write_wav(wav.path(), &samples)?;

    let text = transcriber.transcribe(wav.path()).await?;
    Ok((
        "voice input captured".to_string(),
        ActionData::Text(text),
    ))
}

/// Read one line of operator input from the Arduino serial channel.
pub async fn via_arduino_serial(
    timeout_secs: Option<u64>,
    handles: &DeviceHandles,
    config: &ZaraConfig,
) -> Result<ExecOutput, ZaraError> {
    let window = Duration::from_secs(timeout_secs.unwrap_or(config.hardware.listen_timeout_secs));

    info!("Listening via Arduino serial for {:?}", window);
    let mut stream = super::lock_serial(handles).await?;
    let line = super::read_line(&mut stream, window).await?;
    if line.is_empty() {
        return Err(ZaraError::ExecutionFailed(
            "empty serial input".to_string(),
        ));
    }

    Ok((
        "serial input received".to_string(),
        ActionData::Text(line),
    ))
}

/// Blocking cpal capture for a fixed window. Runs on the blocking pool.
fn record_pcm(window: Duration) -> Result<Vec<i16>, ZaraError> {
    let device = cpal::default_host()
        .default_input_device()
        .ok_or_else(|| ZaraError::ResourceUnavailable("no input device".to_string()))?;

    let stream_config = cpal::StreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let samples: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = samples.clone();

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _: &_| {
                if let Ok(mut buf) = sink.lock() {
                    buf.extend(data.iter().map(|&s| (s * i16::MAX as f32) as i16));
                }
            },
            |e| tracing::warn!("audio stream error: {e}"),
            None,
        )
        .map_err(|e| ZaraError::ExecutionFailed(format!("input stream: {e}")))?;

    stream
        .play()
        .map_err(|e| ZaraError::ExecutionFailed(format!("stream start: {e}")))?;
    std::thread::sleep(window);
    drop(stream);

    let captured = samples
        .lock()
        .map_err(|_| ZaraError::Internal("sample buffer poisoned".to_string()))?
        .clone();
    Ok(captured)
}

fn write_wav(path: &std::path::Path, samples: &[i16]) -> Result<(), ZaraError> {
    let spec = WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| ZaraError::ExecutionFailed(format!("wav create: {e}")))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| ZaraError::ExecutionFailed(format!("wav write: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| ZaraError::ExecutionFailed(format!("wav finalize: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_wav_produces_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.wav");
        let samples = vec![0_i16, 1200, -1200, i16::MAX / 2];
        write_wav(&path, &samples).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.len(), samples.len() as u32);
    }

    #[tokio::test]
    async fn serial_listen_without_handle_reports_unavailable() {
        let handles = DeviceHandles::default();
        let config = ZaraConfig::default();
        let err = via_arduino_serial(Some(1), &handles, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ZaraError::ResourceUnavailable(_)));
    }
}
