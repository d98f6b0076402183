//! Type-safe argument modules.
//!
//! Each struct here implements `CommandArgs` and maps Rust fields to the exact
//! CLI flags of the program it drives.

pub mod systemctl;
