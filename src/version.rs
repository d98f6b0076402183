//! Version gate for the license acceptance flag
//!
//! `--chef-license accept` is only understood by clients at or above
//! [`LICENSE_FLAG_MIN_VERSION`]. Older binaries abort on unknown flags, so the
//! builder asks [`license_flag_supported`] before emitting it.

use std::cmp::Ordering;

/// First client release that recognises `--chef-license`
pub const LICENSE_FLAG_MIN_VERSION: &str = "14.12.9";

/// Version of this tool. Released in lockstep with the client it schedules.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compare two semver version strings numerically (e.g. "14.2.0" vs "14.12.9").
///
/// Missing or non-numeric components count as 0 and a leading `v` is ignored.
/// A pre-release sorts below its release ("15.0.1-rc.1" < "15.0.1"); two
/// pre-releases of the same version compare equal. Build metadata is ignored.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| -> (u64, u64, u64, bool) {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);
        let s = s.split('+').next().unwrap_or(s);
        let (core, is_release) = match s.split_once('-') {
            Some((core, _)) => (core, false),
            None => (s, true),
        };
        let mut parts = core.split('.');
        let mut next = || {
            parts
                .next()
                .and_then(|p| {
                    let numeric: String = p.chars().take_while(|c| c.is_ascii_digit()).collect();
                    numeric.parse().ok()
                })
                .unwrap_or(0)
        };
        let major = next();
        let minor = next();
        let patch = next();
        (major, minor, patch, is_release)
    };
    parse(a).cmp(&parse(b))
}

/// True when a client of `tool_version` accepts the license flag
pub fn license_flag_supported(tool_version: &str) -> bool {
    compare_versions(tool_version, LICENSE_FLAG_MIN_VERSION) != Ordering::Less
}
