//! Seams between the reconciler and the machine.
//!
//! The reconciler never talks to systemd or the filesystem directly; it goes
//! through these two traits. Production code uses [`crate::systemd`] and
//! [`crate::provision`]; tests substitute in-memory fakes.

use std::path::Path;

use crate::error::Result;
use crate::types::{UnitAction, UnitState};

/// Something that owns a set of named units (systemd in production).
///
/// Every action must be idempotent: creating identical content, enabling an
/// enabled unit or starting an active one changes nothing.
pub trait UnitManager {
    /// Apply `actions` to `unit` in order, stopping at the first failure.
    ///
    /// `content` is required when `actions` contains [`UnitAction::Create`].
    /// [`UnitAction::Remove`] on a unit that does not exist returns
    /// [`crate::error::TimerError::UnitNotFound`].
    fn run(&mut self, unit: &str, content: Option<&str>, actions: &[UnitAction]) -> Result<()>;

    /// Observed lifecycle state of `unit`
    fn state(&self, unit: &str) -> Result<UnitState>;
}

/// Directory that must exist before the job first runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryRequest<'a> {
    pub path: &'a Path,
    /// User name that should own the directory
    pub owner: &'a str,
    /// Permission bits, e.g. `0o640`
    pub mode: u32,
    /// Create missing parents as well
    pub recursive: bool,
}

/// Creates directories with a given owner and mode
pub trait DirectoryProvisioner {
    /// Make sure the directory exists. Idempotent.
    ///
    /// Failures are reported as [`crate::error::TimerError::DirectoryCreation`].
    fn ensure_directory(&self, request: &DirectoryRequest<'_>) -> Result<()>;
}
