//! Fallback routing tests.
//!
//! Deterministic, hardware-free: every scenario runs against an injected
//! capability table, so they pass on machines with no microphone, camera,
//! or serial port attached.

use std::sync::Arc;

use async_trait::async_trait;
use std::path::Path;

use zara_common::{
    ActionData, ActionKind, ActionRequest, CapabilityStatus, CapabilityTable, MethodKind,
    ResourceKind, ZaraError,
};
use zarad::config::ZaraConfig;
use zarad::probe::DeviceHandles;
use zarad::router::ZaraRouter;
use zarad::selector;
use zarad::speech::Transcriber;

// ============================================================================
// Helpers
// ============================================================================

struct FakeTranscriber;

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, _wav: &Path) -> Result<String, ZaraError> {
        Ok("transcript".to_string())
    }
}

fn router_with(available: &[ResourceKind]) -> ZaraRouter {
    let mut table = CapabilityTable::all_unavailable();
    for &kind in available {
        table.set(kind, CapabilityStatus::connected("test"));
    }
    ZaraRouter::with_probed(ZaraConfig::default(), table, DeviceHandles::default())
        .with_transcriber(Arc::new(FakeTranscriber))
}

// ============================================================================
// Selector invariants
// ============================================================================

/// A resource the probe marked unavailable must never be selected, for any
/// action and any capability combination.
#[test]
fn selector_respects_unavailability_everywhere() {
    let config = ZaraConfig::default();
    for mask in 0u32..16 {
        let mut table = CapabilityTable::all_unavailable();
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            if mask & (1 << i) != 0 {
                table.set(*kind, CapabilityStatus::connected("test"));
            }
        }
        for action in ActionKind::ALL {
            let method = selector::select(action, &table, &config).unwrap();
            if let Some(resource) = method.backing_resource() {
                assert!(table.is_available(resource));
            }
        }
    }
}

/// There is at least one viable method for every action even with nothing
/// attached: simulation.
#[test]
fn simulation_survives_total_hardware_loss() {
    let config = ZaraConfig::default();
    let table = CapabilityTable::all_unavailable();
    for action in ActionKind::ALL {
        assert_eq!(
            selector::select(action, &table, &config).unwrap(),
            MethodKind::Simulation
        );
    }
}

// ============================================================================
// End-to-end envelope behavior
// ============================================================================

/// Spec scenario: everything unavailable, speak routes to simulation with
/// the message echoed back and no peripheral side effect.
#[tokio::test]
async fn speak_falls_back_to_simulation_and_echoes() {
    let router = router_with(&[]);
    let result = router
        .execute(ActionRequest::Speak {
            message: "hello".to_string(),
        })
        .await;

    assert!(result.success);
    assert_eq!(result.method_used, MethodKind::Simulation);
    assert_eq!(result.data, ActionData::Text("hello".to_string()));
}

/// Spec scenario: arduino down, microphone up - listen selects the
/// microphone (the executor itself needs real hardware, so this stops at
/// selection).
#[tokio::test]
async fn listen_prefers_microphone_over_dead_arduino() {
    let router = router_with(&[ResourceKind::Microphone]);
    let table = router.capabilities().await;
    let method =
        selector::select(ActionKind::Listen, &table, &ZaraConfig::default()).unwrap();
    assert_eq!(method, MethodKind::Microphone);
}

/// An executor failure becomes a failure envelope with a non-empty message;
/// execute never panics and never returns an error.
#[tokio::test]
async fn executor_failures_become_envelopes() {
    // Arduino marked available but no serial handle cached: the led
    // executor fails on first write.
    let router = router_with(&[ResourceKind::Arduino]);
    let result = router
        .execute(ActionRequest::Speak {
            message: "hello".to_string(),
        })
        .await;

    assert!(!result.success);
    assert_eq!(result.method_used, MethodKind::ArduinoLed);
    assert!(!result.message.is_empty());
}

/// Repeated simulated listens agree on method and success; the transcript
/// may differ between calls.
#[tokio::test]
async fn simulated_listen_is_stable_in_shape() {
    let router = router_with(&[]);
    let mut methods = Vec::new();
    for _ in 0..5 {
        let result = router
            .execute(ActionRequest::Listen { timeout_secs: None })
            .await;
        assert!(result.success);
        methods.push(result.method_used);
    }
    assert!(methods.iter().all(|&m| m == MethodKind::Simulation));
}

// ============================================================================
// Simulated failure / restore
// ============================================================================

#[tokio::test]
async fn failure_injection_reroutes_then_restores() {
    let router = router_with(&[ResourceKind::Camera]);

    // Camera backs gesture recognition first...
    let table = router.capabilities().await;
    assert_eq!(
        selector::select(ActionKind::Gesture, &table, &ZaraConfig::default()).unwrap(),
        MethodKind::Camera
    );

    // ...until it "fails"...
    router.mark_unavailable(ResourceKind::Camera).await;
    let result = router.execute(ActionRequest::Gesture).await;
    assert!(result.success);
    assert_eq!(result.method_used, MethodKind::Simulation);

    // ...and comes back.
    router.restore(ResourceKind::Camera).await;
    let table = router.capabilities().await;
    assert_eq!(
        selector::select(ActionKind::Gesture, &table, &ZaraConfig::default()).unwrap(),
        MethodKind::Camera
    );
}

// ============================================================================
// Serial transaction isolation
// ============================================================================

/// Two concurrent actions on the Arduino must not interleave on the wire: a
/// command/response exchange holds the peripheral for its whole duration, so
/// the sensor's answer can never be consumed by a concurrently listening
/// action.
#[cfg(unix)]
#[tokio::test]
async fn concurrent_serial_actions_keep_their_replies() {
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_serial::SerialStream;

    let (ours, mut peer) = SerialStream::pair().unwrap();

    let mut table = CapabilityTable::all_unavailable();
    table.set(ResourceKind::Arduino, CapabilityStatus::connected("pty"));
    let mut handles = DeviceHandles::default();
    handles.serial = Some(Arc::new(tokio::sync::Mutex::new(ours)));
    handles.serial_port = Some("pty".to_string());
    let router = Arc::new(
        ZaraRouter::with_probed(ZaraConfig::default(), table, handles)
            .with_transcriber(Arc::new(FakeTranscriber)),
    );

    // Firmware stand-in: answer the gesture query after a beat, then send an
    // unrelated line of operator input.
    let firmware = tokio::spawn(async move {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let n = peer.read(&mut byte).await.unwrap();
            assert!(n > 0, "command channel closed early");
            if byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
        }
        assert_eq!(String::from_utf8_lossy(&line).trim(), "READ GESTURE");

        tokio::time::sleep(Duration::from_millis(200)).await;
        peer.write_all(b"GESTURE wave\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        peer.write_all(b"hello from serial\n").await.unwrap();
    });

    // Gesture goes first and is mid-exchange when listen arrives.
    let gesture_task = {
        let router = router.clone();
        tokio::spawn(async move { router.execute(ActionRequest::Gesture).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let listen_task = {
        let router = router.clone();
        tokio::spawn(async move {
            router
                .execute(ActionRequest::Listen {
                    timeout_secs: Some(3),
                })
                .await
        })
    };

    let gesture = gesture_task.await.unwrap();
    let listen = listen_task.await.unwrap();
    firmware.await.unwrap();

    assert!(gesture.success, "gesture failed: {}", gesture.message);
    assert_eq!(gesture.method_used, MethodKind::ArduinoSensor);
    assert_eq!(gesture.data, ActionData::Gesture("wave".to_string()));

    assert!(listen.success, "listen failed: {}", listen.message);
    assert_eq!(listen.method_used, MethodKind::ArduinoSerial);
    assert_eq!(listen.data, ActionData::Text("hello from serial".to_string()));
}

// ============================================================================
// Self test and report
// ============================================================================

#[tokio::test]
async fn self_test_reports_all_four_actions() {
    let router = router_with(&[]);
    let results = router.self_test().await;
    let kinds: Vec<ActionKind> = results.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, ActionKind::ALL.to_vec());
}

#[tokio::test]
async fn status_report_tracks_injected_failures() {
    let router = router_with(&[ResourceKind::Microphone]);
    let report = router.status_report().await;
    assert!(report.contains("listen: microphone"));

    router.mark_unavailable(ResourceKind::Microphone).await;
    let report = router.status_report().await;
    assert!(report.contains("listen: simulation"));
}
