//! Structured unit definitions and their INI rendering.
//!
//! A [`UnitDefinition`] is an ordered list of sections, each an ordered list of
//! `(key, value)` entries. Keys may repeat inside a section, as systemd allows
//! for multi-valued settings. Insertion order is kept so the rendered text is
//! byte-for-byte deterministic.

use std::fmt;

use crate::types::UnitKind;

/// A single value in a unit file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{}", n),
            Self::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
        }
    }
}

impl From<&str> for UnitValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for UnitValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for UnitValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for UnitValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// `[Name]` block of a unit file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, UnitValue)>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry, keeping any earlier entry with the same key
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<UnitValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<UnitValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&UnitValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Every value stored under `key`, in insertion order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a UnitValue> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// A complete unit owned by this tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDefinition {
    name: String,
    sections: Vec<Section>,
}

impl UnitDefinition {
    /// Empty unit for `job_name`; the file name is derived from `kind`
    pub fn new(kind: UnitKind, job_name: &str) -> Self {
        Self {
            name: kind.unit_name(job_name),
            sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Unit file name, e.g. `chef-client.service`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Shorthand for `section(section)?.get(key)`
    pub fn get(&self, section: &str, key: &str) -> Option<&UnitValue> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Render as INI text: `[Section]` headers, `Key = Value` lines, one blank
    /// line between sections, trailing newline.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UnitDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "{} = {}", key, value)?;
            }
        }
        Ok(())
    }
}
