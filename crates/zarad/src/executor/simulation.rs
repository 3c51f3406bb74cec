//! Simulation executors - the universal fallback.
//!
//! Always succeed, never touch a peripheral. Canned data comes from the
//! simulation pools in config so tests and demos can steer it.

use rand::seq::SliceRandom;
use tracing::info;

use zara_common::{ActionData, ZaraError};

use crate::config::ZaraConfig;

use super::ExecOutput;

pub async fn listen(config: &ZaraConfig) -> Result<ExecOutput, ZaraError> {
    let transcript = config
        .simulation
        .transcripts
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| "hello zara".to_string());

    info!("[simulation] listen -> {:?}", transcript);
    Ok((
        "simulated input (no capture device)".to_string(),
        ActionData::Text(transcript),
    ))
}

pub async fn speak(message: &str) -> Result<ExecOutput, ZaraError> {
    info!("[simulation] speak -> {:?}", message);
    Ok((
        "simulated output (no audio device)".to_string(),
        ActionData::Text(message.to_string()),
    ))
}

pub async fn visual(expression: &str) -> Result<ExecOutput, ZaraError> {
    info!("[simulation] visual -> {:?}", expression);
    Ok((
        "simulated visual feedback".to_string(),
        ActionData::Text(expression.to_string()),
    ))
}

pub async fn gesture(config: &ZaraConfig) -> Result<ExecOutput, ZaraError> {
    let gesture = config
        .simulation
        .gestures
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| "wave".to_string());

    info!("[simulation] gesture -> {:?}", gesture);
    Ok((
        "simulated gesture".to_string(),
        ActionData::Gesture(gesture),
    ))
}
