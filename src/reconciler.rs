//! Reconciler: moves a job's units to the desired state.
//!
//! `apply` targets [`UnitState::InstalledEnabledRunning`], `remove` targets
//! [`UnitState::Absent`]. Both are safe to repeat: every step is idempotent, so
//! a failed call is retried by calling it again. Nothing is rolled back.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::builder::{self, UnitPair};
use crate::config_file::{validate_job_name, JobSpec};
use crate::error::{Result, TimerError};
use crate::manager::{DirectoryProvisioner, DirectoryRequest, UnitManager};
use crate::types::{UnitAction, UnitKind, UnitState};
use crate::version::TOOL_VERSION;

/// Log directory mode: read/write for owner and group only.
///
/// There is no search bit, so a non-root owner cannot create the log file
/// here. The client runs as root, which ignores the mode. Adding `x` would
/// also let the group traverse into the logs.
pub const LOG_DIRECTORY_MODE: u32 = 0o640;

const SERVICE_ACTIONS: &[UnitAction] = &[UnitAction::Create];
const TIMER_ACTIONS: &[UnitAction] = &[UnitAction::Create, UnitAction::Enable, UnitAction::Start];

pub struct Reconciler<M, D> {
    /// Held only for the duration of a single unit request
    manager: Mutex<M>,
    provisioner: D,
    tool_version: String,
}

impl<M: UnitManager, D: DirectoryProvisioner> Reconciler<M, D> {
    pub fn new(manager: M, provisioner: D) -> Self {
        Self {
            manager: Mutex::new(manager),
            provisioner,
            tool_version: TOOL_VERSION.to_string(),
        }
    }

    /// Generate units as if produced by `version` (license flag gate)
    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = version.into();
        self
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    /// Build the units `apply` would install, without touching anything
    pub fn render(&self, spec: &JobSpec) -> Result<UnitPair> {
        builder::build(spec, &self.tool_version)
    }

    /// Install, enable and start the job's timer.
    ///
    /// Validation happens first; an invalid spec never reaches the filesystem
    /// or the unit manager.
    pub fn apply(&self, spec: &JobSpec) -> Result<()> {
        let units = self.render(spec)?;
        info!(job = %spec.job_name, "applying periodic job");

        self.provisioner.ensure_directory(&DirectoryRequest {
            path: spec.log_directory.as_path(),
            owner: &spec.user,
            mode: LOG_DIRECTORY_MODE,
            recursive: true,
        })?;

        self.lock()?.run(
            units.service.name(),
            Some(&units.service.render()),
            SERVICE_ACTIONS,
        )?;

        self.lock()?.run(
            units.timer.name(),
            Some(&units.timer.render()),
            TIMER_ACTIONS,
        )?;

        info!(job = %spec.job_name, "periodic job installed");
        Ok(())
    }

    /// Remove both units. A unit that is already gone counts as removed.
    pub fn remove(&self, job_name: &str) -> Result<()> {
        validate_job_name(job_name)?;
        info!(job = %job_name, "removing periodic job");

        for kind in [UnitKind::Service, UnitKind::Timer] {
            let unit = kind.unit_name(job_name);
            match self.lock()?.run(&unit, None, &[UnitAction::Remove]) {
                Ok(()) => {}
                Err(TimerError::UnitNotFound(_)) => debug!(unit = %unit, "unit already absent"),
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Current state of the job, as reported for its timer
    pub fn state(&self, job_name: &str) -> Result<UnitState> {
        validate_job_name(job_name)?;
        self.lock()?.state(&UnitKind::Timer.unit_name(job_name))
    }

    /// Consume the reconciler and hand back the unit manager
    pub fn into_parts(self) -> Result<(M, D)> {
        let manager = self
            .manager
            .into_inner()
            .map_err(|_| TimerError::state("unit manager lock poisoned"))?;
        Ok((manager, self.provisioner))
    }

    fn lock(&self) -> Result<MutexGuard<'_, M>> {
        self.manager
            .lock()
            .map_err(|_| TimerError::state("unit manager lock poisoned"))
    }
}
