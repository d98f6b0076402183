//! Type-safe command argument contracts.
//!
//! External programs (`systemctl`) are never invoked with hand-built string
//! vectors. Each invocation is a struct implementing [`CommandArgs`], so flag
//! names live in exactly one place and the compiler checks every call site.
//!
//! The module also owns the process-wide dry-run switch: in dry-run mode the
//! runner logs mutating commands instead of executing them, while read-only
//! queries still run so the preview reflects the real system.

use std::sync::atomic::{AtomicBool, Ordering};

static DRY_RUN: AtomicBool = AtomicBool::new(false);

/// Log mutating commands instead of running them
pub fn enable_dry_run() {
    DRY_RUN.store(true, Ordering::SeqCst);
}

pub fn disable_dry_run() {
    DRY_RUN.store(false, Ordering::SeqCst);
}

pub fn is_dry_run() -> bool {
    DRY_RUN.load(Ordering::SeqCst)
}

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: executable name, resolved through `PATH`.
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `is_mutating()`: whether running the command changes system state.
///
/// # Example
///
/// ```ignore
/// use client_timer::commands::systemctl::{SystemctlArgs, SystemctlVerb};
///
/// let args = SystemctlArgs::unit(SystemctlVerb::Enable, "chef-client.timer");
/// assert_eq!(args.to_cli_args(), ["enable", "chef-client.timer"]);
/// ```
pub trait CommandArgs {
    /// Program to execute (e.g. "systemctl").
    fn program(&self) -> &'static str;

    /// Convert struct fields to CLI arguments.
    fn to_cli_args(&self) -> Vec<String>;

    /// Mutating commands are skipped in dry-run mode.
    fn is_mutating(&self) -> bool {
        true
    }
}
