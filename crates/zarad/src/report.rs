//! Hardware status report.
//!
//! One summary at probe time via tracing, plus a rendered string for the
//! CLI: per-resource availability and the method currently recommended for
//! each action.

use tracing::info;

use zara_common::{ActionKind, CapabilityTable, MethodKind, ResourceKind};

use crate::config::ZaraConfig;
use crate::selector;

/// Log a one-line-per-resource summary.
pub fn log_summary(table: &CapabilityTable) {
    for (kind, status) in table.iter() {
        info!(
            "{}: {} ({}) - {}",
            kind,
            if status.available { "available" } else { "unavailable" },
            status.detail,
            status.description
        );
    }
}

/// Render the full report for human consumption.
pub fn render(table: &CapabilityTable, config: &ZaraConfig) -> String {
    let mut out = String::new();
    out.push_str("Hardware status\n");
    out.push_str(&format!("  probed at: {}\n", table.probed_at.to_rfc3339()));

    for kind in ResourceKind::ALL {
        let (mark, detail, description) = match table.get(kind) {
            Some(s) if s.available => ("ok", s.detail.to_string(), s.description.clone()),
            Some(s) => ("--", s.detail.to_string(), s.description.clone()),
            None => ("--", "missing".to_string(), String::new()),
        };
        out.push_str(&format!("  [{mark}] {kind}: {detail}"));
        if !description.is_empty() {
            out.push_str(&format!(" ({description})"));
        }
        out.push('\n');
    }

    out.push_str("Recommended methods\n");
    for action in ActionKind::ALL {
        let method = selector::select(action, table, config)
            .map(|m| m.to_string())
            .unwrap_or_else(|_| "none".to_string());
        out.push_str(&format!("  {action}: {method}\n"));
    }

    out
}
