//! Job configuration: defaults, loading/saving and validation.
//!
//! A [`JobSpec`] is read from a JSON file where every field is optional and
//! falls back to the defaults below. `validate` must pass before anything is
//! written to disk or sent to systemd.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, TimerError};
use crate::types::UnitKind;

pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_JOB_NAME: &str = "chef-client";
pub const DEFAULT_DELAY_AFTER_BOOT: &str = "1min";
pub const DEFAULT_INTERVAL: &str = "30min";
pub const DEFAULT_SPLAY: i64 = 300;
pub const DEFAULT_DESCRIPTION: &str = "Chef Infra Client periodic execution";
pub const DEFAULT_LOG_DIRECTORY: &str = "/var/log/chef";
pub const DEFAULT_LOG_FILE_NAME: &str = "client.log";
pub const DEFAULT_CHEF_BINARY_PATH: &str = "/opt/chef/bin/chef-client";

/// Longest unit name systemd accepts, suffix included
const MAX_UNIT_NAME_LEN: usize = 255;

/// Suffixes systemd uses to tell unit types apart. A job name ending in one of
/// these would break the `<job>.service` / `<job>.timer` pairing.
const RESERVED_SUFFIXES: &[&str] = &[
    ".service", ".timer", ".socket", ".target", ".mount", ".automount", ".swap", ".path",
    ".slice", ".scope", ".device",
];

/// Everything needed to generate and install one periodic job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSpec {
    /// Owner of the log directory
    pub user: String,
    /// Base name shared by the `.service` and `.timer` units
    pub job_name: String,
    /// `OnBootSec`
    pub delay_after_boot: String,
    /// `OnUnitActiveSec`
    pub interval: String,
    pub accept_chef_license: bool,
    /// `RandomizedDelaySec`, in seconds. Numeric strings are accepted.
    #[serde(deserialize_with = "deserialize_splay")]
    pub splay: i64,
    pub description: String,
    /// When false the service gets `ConditionACPower = true`
    pub run_on_battery: bool,
    pub log_directory: PathBuf,
    pub log_file_name: String,
    pub chef_binary_path: PathBuf,
    /// Extra client arguments, inserted before the logging flag
    pub daemon_options: Vec<String>,
}

impl Default for JobSpec {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            job_name: DEFAULT_JOB_NAME.to_string(),
            delay_after_boot: DEFAULT_DELAY_AFTER_BOOT.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            accept_chef_license: false,
            splay: DEFAULT_SPLAY,
            description: DEFAULT_DESCRIPTION.to_string(),
            run_on_battery: true,
            log_directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            chef_binary_path: PathBuf::from(DEFAULT_CHEF_BINARY_PATH),
            daemon_options: Vec::new(),
        }
    }
}

/// `splay` may arrive as `300` or `"300"`
fn deserialize_splay<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Str(s) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("splay must be an integer, got {:?}", s))
        }),
    }
}

impl JobSpec {
    /// Spec for `job_name` with every other field at its default
    pub fn named(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            ..Self::default()
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize job configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let spec: Self =
            serde_json::from_str(&content).context("Failed to parse job configuration JSON")?;

        Ok(spec)
    }

    /// Validate the job, returning the first violated constraint
    pub fn validate(&self) -> Result<()> {
        validate_job_name(&self.job_name)?;

        if self.splay <= 0 {
            return Err(TimerError::validation(format!(
                "splay should be a positive number, got {}",
                self.splay
            )));
        }

        if self.user.trim().is_empty() {
            return Err(TimerError::validation("user must be specified"));
        }

        // Every value below ends up on a single `Key = Value` line
        let single_line = [
            ("delay_after_boot", self.delay_after_boot.as_str()),
            ("interval", self.interval.as_str()),
            ("description", self.description.as_str()),
            ("log_file_name", self.log_file_name.as_str()),
        ];
        for (field, value) in single_line {
            if value.trim().is_empty() {
                return Err(TimerError::validation(format!("{} must be specified", field)));
            }
            reject_control_chars(field, value)?;
        }

        // The file always lands inside `log_directory`
        let file_name = Path::new(self.log_file_name.trim_start_matches('/'));
        if file_name.as_os_str().is_empty()
            || file_name.components().any(|c| matches!(c, Component::ParentDir))
        {
            return Err(TimerError::validation(format!(
                "log_file_name {:?} must name a file inside log_directory",
                self.log_file_name
            )));
        }

        reject_control_chars("log_directory", &self.log_directory.to_string_lossy())?;
        reject_control_chars("chef_binary_path", &self.chef_binary_path.to_string_lossy())?;
        if self.chef_binary_path.as_os_str().is_empty() {
            return Err(TimerError::validation("chef_binary_path must be specified"));
        }
        if self.log_directory.as_os_str().is_empty() {
            return Err(TimerError::validation("log_directory must be specified"));
        }

        for option in &self.daemon_options {
            reject_control_chars("daemon_options", option)?;
        }

        Ok(())
    }

    /// `<job_name>.service` / `<job_name>.timer`
    pub fn unit_name(&self, kind: UnitKind) -> String {
        kind.unit_name(&self.job_name)
    }
}

/// Check that `job_name` can be used as the shared base of the unit pair.
///
/// Allowed characters follow systemd's unit naming rules minus `@`, which
/// would turn the unit into a template.
pub fn validate_job_name(job_name: &str) -> Result<()> {
    if job_name.is_empty() {
        return Err(TimerError::validation("job_name must be specified"));
    }

    if let Some(bad) = job_name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(*c, ':' | '-' | '_' | '.' | '\\')))
    {
        return Err(TimerError::validation(format!(
            "job_name {:?} contains invalid character {:?}",
            job_name, bad
        )));
    }

    if job_name.starts_with('.') {
        return Err(TimerError::validation(format!(
            "job_name {:?} must not start with '.'",
            job_name
        )));
    }

    if let Some(suffix) = RESERVED_SUFFIXES.iter().find(|s| job_name.ends_with(*s)) {
        return Err(TimerError::validation(format!(
            "job_name {:?} must not end with the unit suffix {}",
            job_name, suffix
        )));
    }

    // ".service" is the longest suffix we append
    if job_name.len() + ".service".len() > MAX_UNIT_NAME_LEN {
        return Err(TimerError::validation(format!(
            "job_name is too long ({} characters)",
            job_name.len()
        )));
    }

    Ok(())
}

fn reject_control_chars(field: &str, value: &str) -> Result<()> {
    if value.chars().any(char::is_control) {
        return Err(TimerError::validation(format!(
            "{} must not contain control characters",
            field
        )));
    }
    Ok(())
}
