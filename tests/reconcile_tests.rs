// Integration tests for the reconciler
//
// A stateful in-memory unit manager stands in for systemd so the full
// apply/remove lifecycle can be observed through `UnitState`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

use client_timer::{
    DirectoryProvisioner, DirectoryRequest, JobSpec, Reconciler, Result, TimerError, UnitAction,
    UnitManager, UnitState,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FakeUnit {
    content: String,
    enabled: bool,
    active: bool,
}

/// Behaves like systemd for the actions the reconciler uses
#[derive(Debug, Default)]
struct MemoryManager {
    units: BTreeMap<String, FakeUnit>,
    /// Number of times unit content actually changed
    writes: usize,
    /// Units for which `remove` fails with a non-"not found" error
    protected: Vec<String>,
}

impl UnitManager for MemoryManager {
    fn run(&mut self, unit: &str, content: Option<&str>, actions: &[UnitAction]) -> Result<()> {
        for &action in actions {
            match action {
                UnitAction::Create => {
                    let content = content
                        .ok_or_else(|| TimerError::unit_mutation(unit, action, "no content"))?;
                    let entry = self.units.entry(unit.to_string()).or_default();
                    if entry.content != content {
                        entry.content = content.to_string();
                        self.writes += 1;
                    }
                }
                UnitAction::Enable | UnitAction::Start => {
                    let entry = self.units.get_mut(unit).ok_or_else(|| {
                        TimerError::unit_mutation(unit, action, "unit not loaded")
                    })?;
                    if action == UnitAction::Enable {
                        entry.enabled = true;
                    } else {
                        entry.active = true;
                    }
                }
                UnitAction::Remove => {
                    if self.protected.iter().any(|p| p == unit) {
                        return Err(TimerError::unit_mutation(unit, action, "permission denied"));
                    }
                    if self.units.remove(unit).is_none() {
                        return Err(TimerError::UnitNotFound(unit.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    fn state(&self, unit: &str) -> Result<UnitState> {
        Ok(match self.units.get(unit) {
            Some(u) => UnitState::from_flags(true, u.enabled, u.active),
            None => UnitState::Absent,
        })
    }
}

#[derive(Debug, Default)]
struct MemoryDirs {
    dirs: RefCell<Vec<(PathBuf, String, u32)>>,
}

impl DirectoryProvisioner for MemoryDirs {
    fn ensure_directory(&self, request: &DirectoryRequest<'_>) -> Result<()> {
        let mut dirs = self.dirs.borrow_mut();
        if !dirs.iter().any(|(p, _, _)| p == request.path) {
            dirs.push((
                request.path.to_path_buf(),
                request.owner.to_string(),
                request.mode,
            ));
        }
        Ok(())
    }
}

fn reconciler() -> Reconciler<MemoryManager, MemoryDirs> {
    Reconciler::new(MemoryManager::default(), MemoryDirs::default())
}

fn nightly() -> JobSpec {
    JobSpec {
        job_name: "nightly".to_string(),
        interval: "1h".to_string(),
        splay: 60,
        run_on_battery: false,
        accept_chef_license: false,
        ..JobSpec::default()
    }
}

#[test]
fn test_apply_reaches_running_state() {
    let r = reconciler();
    assert_eq!(r.state("nightly").unwrap(), UnitState::Absent);

    r.apply(&nightly()).unwrap();
    assert_eq!(r.state("nightly").unwrap(), UnitState::InstalledEnabledRunning);

    let (manager, dirs) = r.into_parts().unwrap();
    let service = &manager.units["nightly.service"];
    assert!(service.content.contains("SuccessExitStatus = 3"));
    assert!(service.content.contains("ConditionACPower = true"));
    // The service is only created; the timer activates it
    assert!(!service.enabled);
    assert!(!service.active);

    let timer = &manager.units["nightly.timer"];
    assert!(timer.content.contains("RandomizedDelaySec = 60"));
    assert!(timer.content.contains("OnUnitActiveSec = 1h"));

    assert_eq!(
        dirs.dirs.borrow().as_slice(),
        [(PathBuf::from("/var/log/chef"), "root".to_string(), 0o640)]
    );
}

#[test]
fn test_apply_is_idempotent() {
    let r = reconciler();
    r.apply(&nightly()).unwrap();
    r.apply(&nightly()).unwrap();

    assert_eq!(r.state("nightly").unwrap(), UnitState::InstalledEnabledRunning);
    let (manager, dirs) = r.into_parts().unwrap();
    assert_eq!(manager.writes, 2, "second apply must not rewrite units");
    assert_eq!(manager.units.len(), 2);
    assert_eq!(dirs.dirs.borrow().len(), 1);
}

#[test]
fn test_changed_spec_rewrites_units() {
    let r = reconciler();
    r.apply(&nightly()).unwrap();

    let mut changed = nightly();
    changed.interval = "2h".to_string();
    r.apply(&changed).unwrap();

    let (manager, _) = r.into_parts().unwrap();
    assert_eq!(manager.writes, 3);
    assert!(manager.units["nightly.timer"].content.contains("OnUnitActiveSec = 2h"));
}

#[test]
fn test_apply_recovers_from_partial_state() {
    // Someone stopped and disabled the timer by hand
    let mut manager = MemoryManager::default();
    manager.units.insert(
        "nightly.timer".to_string(),
        FakeUnit {
            content: "stale".to_string(),
            enabled: false,
            active: false,
        },
    );
    let r = Reconciler::new(manager, MemoryDirs::default());
    assert_eq!(r.state("nightly").unwrap(), UnitState::InstalledDisabled);

    r.apply(&nightly()).unwrap();
    assert_eq!(r.state("nightly").unwrap(), UnitState::InstalledEnabledRunning);
}

#[test]
fn test_remove_never_installed_succeeds() {
    let r = reconciler();
    r.remove("nightly").unwrap();
    assert_eq!(r.state("nightly").unwrap(), UnitState::Absent);
}

#[test]
fn test_remove_after_apply() {
    let r = reconciler();
    r.apply(&nightly()).unwrap();
    r.remove("nightly").unwrap();
    r.remove("nightly").unwrap();

    assert_eq!(r.state("nightly").unwrap(), UnitState::Absent);
    let (manager, _) = r.into_parts().unwrap();
    assert!(manager.units.is_empty());
}

#[test]
fn test_remove_surfaces_permission_errors() {
    let manager = MemoryManager {
        protected: vec!["nightly.timer".to_string()],
        ..MemoryManager::default()
    };
    let r = Reconciler::new(manager, MemoryDirs::default());
    r.apply(&nightly()).unwrap();

    let err = r.remove("nightly").unwrap_err();
    assert!(matches!(err, TimerError::UnitMutation { ref unit, .. } if unit == "nightly.timer"));

    // The service went first and stays removed
    let (manager, _) = r.into_parts().unwrap();
    assert!(!manager.units.contains_key("nightly.service"));
}

#[test]
fn test_jobs_are_independent() {
    let r = reconciler();
    r.apply(&nightly()).unwrap();
    r.apply(&JobSpec::default()).unwrap();
    r.remove("nightly").unwrap();

    assert_eq!(r.state("nightly").unwrap(), UnitState::Absent);
    assert_eq!(
        r.state("chef-client").unwrap(),
        UnitState::InstalledEnabledRunning
    );
}
