//! Type-safe enums shared by the builder, the reconciler and the CLI
//!
//! Unit kinds, unit manager actions and the observable lifecycle states are
//! proper Rust enums instead of strings, so every match is exhaustive.

use strum::{Display, EnumString};

/// Kind of unit produced for a job. The lowercase name doubles as the file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UnitKind {
    Service,
    Timer,
}

impl UnitKind {
    /// Full unit file name for a job, e.g. `chef-client.timer`
    pub fn unit_name(self, job_name: &str) -> String {
        format!("{}.{}", job_name, self)
    }
}

/// Request sent to the unit manager for a single unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UnitAction {
    /// Write the unit content (no-op when identical)
    Create,
    /// Persist activation across reboots
    Enable,
    /// Activate now
    Start,
    /// Stop, disable and delete the unit
    Remove,
}

impl UnitAction {
    /// Whether the action needs unit content to operate on
    pub const fn needs_content(self) -> bool {
        matches!(self, Self::Create)
    }
}

/// Lifecycle state of a job's timer as observed through the unit manager.
///
/// ```text
/// Absent ──apply──▶ InstalledEnabledRunning
///   ▲                        │
///   └────────remove──────────┘
/// ```
///
/// `InstalledDisabled` and `InstalledEnabledStopped` only appear when
/// something outside this tool changed the units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum UnitState {
    Absent,
    InstalledDisabled,
    InstalledEnabledStopped,
    InstalledEnabledRunning,
}

impl UnitState {
    /// Derive the state from the three facts a unit manager can report
    pub const fn from_flags(installed: bool, enabled: bool, active: bool) -> Self {
        match (installed, enabled, active) {
            (false, _, _) => Self::Absent,
            (true, false, _) => Self::InstalledDisabled,
            (true, true, false) => Self::InstalledEnabledStopped,
            (true, true, true) => Self::InstalledEnabledRunning,
        }
    }
}
