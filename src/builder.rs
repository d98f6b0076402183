//! Unit content builder.
//!
//! Pure functions from a [`JobSpec`] to the `.service` / `.timer` pair. No I/O
//! happens here; the only failure path is spec validation.

use crate::config_file::JobSpec;
use crate::error::Result;
use crate::types::UnitKind;
use crate::unit::{Section, UnitDefinition};
use crate::version::license_flag_supported;

/// Units the service waits for
const SERVICE_AFTER: &str = "network.target auditd.service";
/// Client exit code for "ran, nothing to do"
const SUCCESS_EXIT_STATUS: i64 = 3;
const SERVICE_WANTED_BY: &str = "multi-user.target";
const TIMER_WANTED_BY: &str = "timers.target";

/// The two units generated for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPair {
    pub service: UnitDefinition,
    pub timer: UnitDefinition,
}

/// Validate `spec` and build both units.
///
/// `tool_version` is the version of the program generating the units; it
/// decides whether the license flag can be passed.
pub fn build(spec: &JobSpec, tool_version: &str) -> Result<UnitPair> {
    spec.validate()?;
    Ok(UnitPair {
        service: service_unit(spec, tool_version),
        timer: timer_unit(spec),
    })
}

/// Command line for `ExecStart`.
///
/// `<binary> [daemon options...] -L <log_directory>/<log_file_name> [--chef-license accept]`
pub fn build_command(spec: &JobSpec, tool_version: &str) -> String {
    // An absolute file name must not replace the directory in `join`
    let log_path = spec
        .log_directory
        .join(spec.log_file_name.trim_start_matches('/'));

    let mut parts: Vec<String> = vec![spec.chef_binary_path.display().to_string()];
    parts.extend(
        spec.daemon_options
            .iter()
            .filter(|opt| !opt.trim().is_empty())
            .cloned(),
    );
    parts.push("-L".to_string());
    parts.push(log_path.display().to_string());

    if spec.accept_chef_license && license_flag_supported(tool_version) {
        parts.push("--chef-license".to_string());
        parts.push("accept".to_string());
    }

    parts.join(" ")
}

fn service_unit(spec: &JobSpec, tool_version: &str) -> UnitDefinition {
    let mut service = Section::new("Service")
        .entry("Type", "oneshot")
        .entry("ExecStart", build_command(spec, tool_version))
        .entry("SuccessExitStatus", SUCCESS_EXIT_STATUS);

    // Absent means "no condition"; never emit `false`
    if !spec.run_on_battery {
        service.push("ConditionACPower", true);
    }

    UnitDefinition::new(UnitKind::Service, &spec.job_name)
        .with_section(
            Section::new("Unit")
                .entry("Description", spec.description.as_str())
                .entry("After", SERVICE_AFTER),
        )
        .with_section(service)
        .with_section(Section::new("Install").entry("WantedBy", SERVICE_WANTED_BY))
}

fn timer_unit(spec: &JobSpec) -> UnitDefinition {
    UnitDefinition::new(UnitKind::Timer, &spec.job_name)
        .with_section(Section::new("Unit").entry("Description", spec.description.as_str()))
        .with_section(
            Section::new("Timer")
                .entry("OnBootSec", spec.delay_after_boot.as_str())
                .entry("OnUnitActiveSec", spec.interval.as_str())
                .entry("RandomizedDelaySec", spec.splay),
        )
        .with_section(Section::new("Install").entry("WantedBy", TIMER_WANTED_BY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitValue;
    use std::path::PathBuf;

    const NEW_CLIENT: &str = "18.0.0";
    const OLD_CLIENT: &str = "14.1.0";

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
    fn test_default_command() {
        assert_eq!(
            build_command(&JobSpec::default(), NEW_CLIENT),
            "/opt/chef/bin/chef-client -L /var/log/chef/client.log"
        );
    }

    #[test]
    fn test_daemon_options_before_log_flag() {
        let spec = JobSpec {
            daemon_options: vec!["--foo".to_string(), "bar".to_string()],
            ..JobSpec::default()
        };
        assert_eq!(
            build_command(&spec, NEW_CLIENT),
            "/opt/chef/bin/chef-client --foo bar -L /var/log/chef/client.log"
        );
    }

    #[test]
    fn test_license_flag_gate() {
        let spec = JobSpec {
            accept_chef_license: true,
            ..JobSpec::default()
        };
        assert!(build_command(&spec, NEW_CLIENT).ends_with("--chef-license accept"));
        assert!(build_command(&spec, "14.12.9").ends_with("--chef-license accept"));
        assert!(!build_command(&spec, OLD_CLIENT).contains("--chef-license"));

        let spec = JobSpec::default();
        assert!(!build_command(&spec, NEW_CLIENT).contains("--chef-license"));
    }

    #[test]
    fn test_custom_log_location() {
        let spec = JobSpec {
            log_directory: PathBuf::from("/srv/logs/"),
            log_file_name: "run.log".to_string(),
            chef_binary_path: PathBuf::from("/usr/bin/chef-client"),
            ..JobSpec::default()
        };
        assert_eq!(
            build_command(&spec, NEW_CLIENT),
            "/usr/bin/chef-client -L /srv/logs/run.log"
        );
    }

    #[test]
    fn test_absolute_log_file_name_stays_in_log_directory() {
        let spec = JobSpec {
            log_file_name: "/client.log".to_string(),
            ..JobSpec::default()
        };
        assert_eq!(
            build_command(&spec, NEW_CLIENT),
            "/opt/chef/bin/chef-client -L /var/log/chef/client.log"
        );
    }

    #[test]
    fn test_large_splay_is_not_truncated() {
        let spec = JobSpec {
            splay: 5_000_000_000,
            ..JobSpec::default()
        };
        let units = build(&spec, NEW_CLIENT).unwrap();
        assert_eq!(
            units.timer.get("Timer", "RandomizedDelaySec"),
            Some(&UnitValue::Int(5_000_000_000))
        );
        assert!(units.timer.render().contains("RandomizedDelaySec = 5000000000\n"));
    }

    #[test]
    fn test_nightly_units() {
        let units = build(&nightly(), NEW_CLIENT).unwrap();

        assert_eq!(units.service.name(), "nightly.service");
        assert_eq!(units.timer.name(), "nightly.timer");
        assert_eq!(
            units.service.get("Service", "SuccessExitStatus"),
            Some(&UnitValue::Int(3))
        );
        assert_eq!(
            units.service.get("Service", "ConditionACPower"),
            Some(&UnitValue::Bool(true))
        );
        assert_eq!(
            units.timer.get("Timer", "RandomizedDelaySec"),
            Some(&UnitValue::Int(60))
        );
        assert_eq!(
            units.timer.get("Timer", "OnUnitActiveSec"),
            Some(&UnitValue::from("1h"))
        );
    }

    #[test]
    fn test_battery_condition_absent_when_allowed() {
        let units = build(&JobSpec::default(), NEW_CLIENT).unwrap();
        assert!(units.service.get("Service", "ConditionACPower").is_none());
        assert!(!units.service.render().contains("ConditionACPower"));
    }

    #[test]
    fn test_rendered_service() {
        let units = build(&nightly(), NEW_CLIENT).unwrap();
        let expected = "\
[Unit]
Description = Chef Infra Client periodic execution
After = network.target auditd.service

[Service]
Type = oneshot
ExecStart = /opt/chef/bin/chef-client -L /var/log/chef/client.log
SuccessExitStatus = 3
ConditionACPower = true

[Install]
WantedBy = multi-user.target
";
        assert_eq!(units.service.render(), expected);
    }

    #[test]
    fn test_rendered_timer() {
        let units = build(&nightly(), NEW_CLIENT).unwrap();
        let expected = "\
[Unit]
Description = Chef Infra Client periodic execution

[Timer]
OnBootSec = 1min
OnUnitActiveSec = 1h
RandomizedDelaySec = 60

[Install]
WantedBy = timers.target
";
        assert_eq!(units.timer.render(), expected);
    }

    #[test]
    fn test_invalid_spec_rejected() {
        let spec = JobSpec {
            splay: 0,
            ..JobSpec::default()
        };
        assert!(build(&spec, NEW_CLIENT).unwrap_err().is_validation());
    }
}
