//! Capability table - which physical resources the startup probe found.
//!
//! One entry per resource kind, created once at process start and mutated
//! only by the explicit mark-unavailable/restore operations. Device handles
//! are deliberately not stored here; the probe layer owns those.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Physical resources the probe knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Arduino,
    Camera,
    Microphone,
    Speakers,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Arduino,
        ResourceKind::Camera,
        ResourceKind::Microphone,
        ResourceKind::Speakers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Arduino => "arduino",
            ResourceKind::Camera => "camera",
            ResourceKind::Microphone => "microphone",
            ResourceKind::Speakers => "speakers",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a resource is (or is not) usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityDetail {
    /// Probe handshake succeeded.
    Connected,
    /// Probe ran but found no device.
    NotFound,
    /// The backing library/tool is missing (no audio host, no v4l2-ctl).
    LibraryMissing,
    /// Was available earlier; an explicit mark-unavailable flipped it off.
    Disconnected,
}

impl fmt::Display for CapabilityDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CapabilityDetail::Connected => "connected",
            CapabilityDetail::NotFound => "not_found",
            CapabilityDetail::LibraryMissing => "library_missing",
            CapabilityDetail::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Probe verdict for a single resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityStatus {
    pub available: bool,
    pub detail: CapabilityDetail,
    /// Human-readable probe note (port name, device path, failure cause).
    pub description: String,
}

impl CapabilityStatus {
    pub fn connected(description: impl Into<String>) -> Self {
        Self {
            available: true,
            detail: CapabilityDetail::Connected,
            description: description.into(),
        }
    }

    pub fn not_found(description: impl Into<String>) -> Self {
        Self {
            available: false,
            detail: CapabilityDetail::NotFound,
            description: description.into(),
        }
    }

    pub fn library_missing(description: impl Into<String>) -> Self {
        Self {
            available: false,
            detail: CapabilityDetail::LibraryMissing,
            description: description.into(),
        }
    }
}

/// The full probe result: at most one status per resource kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityTable {
    pub probed_at: DateTime<Utc>,
    entries: BTreeMap<ResourceKind, CapabilityStatus>,
}

impl CapabilityTable {
    /// Empty table where every resource starts out not-found.
    pub fn all_unavailable() -> Self {
        let mut entries = BTreeMap::new();
        for kind in ResourceKind::ALL {
            entries.insert(kind, CapabilityStatus::not_found("not probed"));
        }
        Self {
            probed_at: Utc::now(),
            entries,
        }
    }

    /// Insert or replace a resource's status. Enforces the one-entry-per-kind
    /// invariant by construction.
    pub fn set(&mut self, kind: ResourceKind, status: CapabilityStatus) {
        self.entries.insert(kind, status);
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&CapabilityStatus> {
        self.entries.get(&kind)
    }

    /// A missing entry counts as unavailable.
    pub fn is_available(&self, kind: ResourceKind) -> bool {
        self.entries.get(&kind).map(|s| s.available).unwrap_or(false)
    }

    /// Simulate a device failure: flip the resource off, remember why.
    pub fn mark_unavailable(&mut self, kind: ResourceKind) {
        let status = self
            .entries
            .entry(kind)
            .or_insert_with(|| CapabilityStatus::not_found("not probed"));
        status.available = false;
        status.detail = CapabilityDetail::Disconnected;
    }

    /// Undo a simulated failure. Only a `Disconnected` entry comes back;
    /// a resource the probe never found cannot be talked into existence.
    pub fn restore(&mut self, kind: ResourceKind) {
        if let Some(status) = self.entries.get_mut(&kind) {
            if status.detail == CapabilityDetail::Disconnected {
                status.available = true;
                status.detail = CapabilityDetail::Connected;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &CapabilityStatus)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn available_count(&self) -> usize {
        self.entries.values().filter(|s| s.available).count()
    }
}
