use tracing::debug;

use crate::data::*;

/// Longest accepted macro name or target.
pub const MAX_NAME_LEN: usize = 80;

/// Letters, digits, `_`, `$` and `.`.
pub fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'$' | b'.')
}

fn is_ident(s: &str) -> bool {
    (1..=MAX_NAME_LEN).contains(&s.len()) && s.bytes().all(is_ident_byte)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroEntry {
    pub name: String,
    /// Function the macro body is passed to as arguments, if any.
    pub target: Option<String>,
}

/// Active macro names, in registration order.
///
/// Built once from the command line and only read while scanning.
#[derive(Debug, Default, Clone)]
pub struct MacroTable {
    entries: Vec<MacroEntry>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `name` / `name:target` declarations.
    pub fn from_specs<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for spec in specs {
            table.register_spec(spec.as_ref())?;
        }
        Ok(table)
    }

    /// Registers a `name` or `name:target` declaration. No spaces are
    /// allowed around the colon.
    pub fn register_spec(&mut self, spec: &str) -> Result<()> {
        match spec.split_once(':') {
            Some((name, target)) => self.register(name, Some(target)),
            None => self.register(spec, None),
        }
    }

    pub fn register(&mut self, name: &str, target: Option<&str>) -> Result<()> {
        if !is_ident(name) || target.is_some_and(|t| !is_ident(t)) {
            let arg = match target {
                Some(t) => format!("{}:{}", name, t),
                None => name.to_string(),
            };
            return Err(JsDevError::Config { arg });
        }

        debug!(macro_name = name, call = ?target, "registered macro");
        self.entries.push(MacroEntry {
            name: name.to_string(),
            target: target.map(str::to_string),
        });
        Ok(())
    }

    /// Returns the first entry named exactly `candidate`.
    pub fn lookup(&self, candidate: &str) -> Option<&MacroEntry> {
        self.entries.iter().find(|entry| entry.name == candidate)
    }
}
