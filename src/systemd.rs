//! systemd-backed [`UnitManager`].
//!
//! Unit files are written into a unit directory (`/etc/systemd/system` by
//! default) and `systemctl` is driven through the typed command runner.
//! Content is only written, and the daemon only reloaded, when the file
//! actually changes.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::command_runner::run_command_safe;
use crate::command_traits::is_dry_run;
use crate::commands::systemctl::{SystemctlArgs, SystemctlVerb};
use crate::error::{Result, TimerError};
use crate::manager::UnitManager;
use crate::types::{UnitAction, UnitState};

/// Where administrator-owned units live
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";

/// Mode of written unit files
const UNIT_FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone)]
pub struct SystemdUnitManager {
    unit_dir: PathBuf,
}

impl Default for SystemdUnitManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_DIR)
    }
}

impl SystemdUnitManager {
    pub fn new(unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            unit_dir: unit_dir.into(),
        }
    }

    pub fn unit_path(&self, unit: &str) -> PathBuf {
        self.unit_dir.join(unit)
    }

    /// Write `content` if it differs from what is on disk. Returns whether
    /// anything changed.
    fn create(&self, unit: &str, content: &str) -> Result<bool> {
        let path = self.unit_path(unit);

        match fs::read_to_string(&path) {
            Ok(existing) if existing == content => {
                debug!(unit, "unit content unchanged");
                return Ok(false);
            }
            Ok(_) => info!(unit, "updating unit"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => info!(unit, "creating unit"),
            Err(e) => return Err(mutation_error(unit, UnitAction::Create, e)),
        }

        if is_dry_run() {
            info!("[dry-run] would write {}", path.display());
            return Ok(true);
        }

        write_atomically(&path, content).map_err(|e| mutation_error(unit, UnitAction::Create, e))?;
        self.systemctl(&SystemctlArgs::daemon_reload(), unit, UnitAction::Create)?;
        Ok(true)
    }

    fn remove(&self, unit: &str) -> Result<()> {
        let path = self.unit_path(unit);
        if !path.exists() {
            return Err(TimerError::UnitNotFound(unit.to_string()));
        }

        info!(unit, "removing unit");
        self.systemctl(
            &SystemctlArgs::unit(SystemctlVerb::DisableNow, unit),
            unit,
            UnitAction::Remove,
        )?;

        if is_dry_run() {
            info!("[dry-run] would delete {}", path.display());
            return Ok(());
        }

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(mutation_error(unit, UnitAction::Remove, e)),
        }
        self.systemctl(&SystemctlArgs::daemon_reload(), unit, UnitAction::Remove)
    }

    /// Run a mutating `systemctl` call, mapping any failure onto `unit`/`action`
    fn systemctl(&self, args: &SystemctlArgs, unit: &str, action: UnitAction) -> Result<()> {
        let output = run_command_safe(args).map_err(|e| mutation_error(unit, action, e))?;
        output
            .ensure_success(&format!("systemctl {}", args.verb))
            .map_err(|e| mutation_error(unit, action, e))
    }

    /// Run a `systemctl` query; a non-zero exit is a "no", not an error
    fn query(&self, verb: SystemctlVerb, unit: &str) -> Result<bool> {
        let output = run_command_safe(&SystemctlArgs::unit(verb, unit))
            .map_err(|e| TimerError::state(format!("systemctl {} {}: {:#}", verb, unit, e)))?;
        Ok(output.success)
    }
}

impl UnitManager for SystemdUnitManager {
    fn run(&mut self, unit: &str, content: Option<&str>, actions: &[UnitAction]) -> Result<()> {
        // Checked up front so a request missing its content changes nothing
        let content = match (content, actions.iter().find(|a| a.needs_content())) {
            (None, Some(&action)) => {
                return Err(TimerError::unit_mutation(unit, action, "no content supplied"));
            }
            (content, _) => content.unwrap_or_default(),
        };

        for &action in actions {
            match action {
                UnitAction::Create => {
                    self.create(unit, content)?;
                }
                UnitAction::Enable => self.systemctl(
                    &SystemctlArgs::unit(SystemctlVerb::Enable, unit),
                    unit,
                    action,
                )?,
                UnitAction::Start => self.systemctl(
                    &SystemctlArgs::unit(SystemctlVerb::Start, unit),
                    unit,
                    action,
                )?,
                UnitAction::Remove => self.remove(unit)?,
            }
        }
        Ok(())
    }

    fn state(&self, unit: &str) -> Result<UnitState> {
        if !self.unit_path(unit).exists() {
            return Ok(UnitState::Absent);
        }
        let enabled = self.query(SystemctlVerb::IsEnabled, unit)?;
        let active = self.query(SystemctlVerb::IsActive, unit)?;
        Ok(UnitState::from_flags(true, enabled, active))
    }
}

fn mutation_error(unit: &str, action: UnitAction, err: impl std::fmt::Display) -> TimerError {
    TimerError::unit_mutation(unit, action, format!("{:#}", err))
}

/// Write next to the target then rename, so systemd never sees a half-written unit
fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "unit path has no file name"))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    fs::write(&tmp, content)?;
    fs::set_permissions(&tmp, fs::Permissions::from_mode(UNIT_FILE_MODE))?;
    fs::rename(&tmp, path)
}
