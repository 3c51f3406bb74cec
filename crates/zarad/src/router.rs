//! The I/O router: capability table in, uniform envelopes out.
//!
//! Request flow per invocation: cancellation check, method selection against
//! the current capability table, executor dispatch, envelope. Probe and
//! executor failures surface only through `ActionResult`; nothing raises
//! past this boundary, so a missing peripheral can never crash a caller.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use zara_common::{
    ActionKind, ActionRequest, ActionResult, CapabilityTable, MethodKind, ResourceKind,
};

use crate::config::ZaraConfig;
use crate::executor;
use crate::probe::{self, DeviceHandles};
use crate::report;
use crate::selector;
use crate::speech::{CommandTranscriber, Transcriber};

pub struct ZaraRouter {
    config: ZaraConfig,
    table: RwLock<CapabilityTable>,
    handles: DeviceHandles,
    transcriber: Arc<dyn Transcriber>,
    cancel: CancellationToken,
}

impl ZaraRouter {
    /// Probe the hardware once and build a router over the result.
    pub async fn initialize(config: ZaraConfig) -> Self {
        let (table, handles) = probe::probe_all(&config.hardware).await;
        report::log_summary(&table);
        Self::with_probed(config, table, handles)
    }

    /// Build a router over an explicit capability table and handles. This is
    /// the injection point for tests: any combination of capabilities can be
    /// supplied without process-wide state.
    pub fn with_probed(config: ZaraConfig, table: CapabilityTable, handles: DeviceHandles) -> Self {
        let transcriber = Arc::new(CommandTranscriber::new(
            config.hardware.transcriber_command.clone(),
        ));
        Self {
            config,
            table: RwLock::new(table),
            handles,
            transcriber,
            cancel: CancellationToken::new(),
        }
    }

    /// Swap the speech-to-text seam (tests inject fakes here).
    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = transcriber;
        self
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Execute one logical action. Never panics, never returns an error:
    /// every outcome is an envelope.
    pub async fn execute(&self, req: ActionRequest) -> ActionResult {
        let invocation = uuid::Uuid::new_v4();
        let action = req.kind();

        let method = {
            let table = self.table.read().await;
            match selector::select(action, &table, &self.config) {
                Ok(method) => method,
                Err(e) => {
                    // Unreachable with sane priorities; guarded anyway.
                    warn!("[{}] selector exhausted for {}: {}", invocation, action, e);
                    return ActionResult::failed(MethodKind::Simulation, e.to_string());
                }
            }
        };

        // Best-effort cancellation point between select and execute; a
        // blocking library call already in flight cannot be interrupted.
        if self.cancel.is_cancelled() {
            return ActionResult::failed(method, "cancelled");
        }

        info!("[{}] {} via {}", invocation, action, method);
        match executor::dispatch(
            method,
            &req,
            &self.handles,
            &self.config,
            self.transcriber.as_ref(),
        )
        .await
        {
            Ok((message, data)) => ActionResult::ok(method, message, data),
            Err(e) => {
                warn!("[{}] {} via {} failed: {}", invocation, action, method, e);
                ActionResult::failed(method, e.to_string())
            }
        }
    }

    /// Speak without blocking the caller. The returned handle can be awaited
    /// for the envelope or aborted; no fire-and-forget threads.
    pub fn speak_in_background(self: &Arc<Self>, message: String) -> JoinHandle<ActionResult> {
        let router = Arc::clone(self);
        tokio::spawn(async move { router.execute(ActionRequest::Speak { message }).await })
    }

    /// Simulate a device failure for one resource.
    pub async fn mark_unavailable(&self, kind: ResourceKind) {
        info!("Marking {} unavailable", kind);
        self.table.write().await.mark_unavailable(kind);
    }

    /// Undo a simulated failure.
    pub async fn restore(&self, kind: ResourceKind) {
        info!("Restoring {}", kind);
        self.table.write().await.restore(kind);
    }

    /// Snapshot of the current capability table.
    pub async fn capabilities(&self) -> CapabilityTable {
        self.table.read().await.clone()
    }

    /// Rendered status report: per-resource availability plus the method
    /// currently serving each action.
    pub async fn status_report(&self) -> String {
        let table = self.table.read().await;
        report::render(&table, &self.config)
    }

    /// Exercise every action once and report which method served it.
    pub async fn self_test(&self) -> Vec<(ActionKind, ActionResult)> {
        let requests = [
            ActionRequest::Listen {
                timeout_secs: Some(3),
            },
            ActionRequest::Speak {
                message: "hardware test message".to_string(),
            },
            ActionRequest::Visual {
                expression: "celebrate".to_string(),
            },
            ActionRequest::Gesture,
        ];

        let mut results = Vec::with_capacity(requests.len());
        for req in requests {
            let kind = req.kind();
            let result = self.execute(req).await;
            info!(
                "self-test {}: {} via {} ({})",
                kind,
                if result.success { "ok" } else { "failed" },
                result.method_used,
                result.message
            );
            results.push((kind, result));
        }
        results
    }

    /// Cancel in-flight work and release cached handles.
    pub fn shutdown(&self) {
        info!("Router shutting down");
        self.cancel.cancel();
    }
}
