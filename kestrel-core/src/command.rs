//! Command table and command-line dispatch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::commands::TYPABLE_COMMANDS;
use crate::error::CommandError;
use crate::shellwords;
use crate::window::Window;

pub type CommandFn = Arc<dyn Fn(&Window, &[String]) -> Result<(), CommandError> + Send + Sync>;

#[derive(Clone)]
pub struct CommandEntry {
    pub fun: CommandFn,
    pub doc: &'static str,
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry").field("doc", &self.doc).finish_non_exhaustive()
    }
}

/// Commands by name. Aliases are separate entries sharing a function.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: BTreeMap<String, CommandEntry>,
}

impl CommandTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every typable command under its name and aliases.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        for cmd in TYPABLE_COMMANDS {
            let fun: CommandFn = Arc::new(cmd.fun);
            for name in std::iter::once(&cmd.name).chain(cmd.aliases) {
                table.commands.insert(
                    (*name).to_string(),
                    CommandEntry {
                        fun: Arc::clone(&fun),
                        doc: cmd.doc,
                    },
                );
            }
        }
        table
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        doc: &'static str,
        fun: impl Fn(&Window, &[String]) -> Result<(), CommandError> + Send + Sync + 'static,
    ) {
        self.commands.insert(
            name.into(),
            CommandEntry {
                fun: Arc::new(fun),
                doc,
            },
        );
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    /// All names, aliases included, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Names with their docs, aliases included, in order.
    pub fn docs(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.commands.iter().map(|(n, e)| (n.as_str(), e.doc))
    }

    /// Split `line` into words and run the named command with the rest as
    /// arguments. Blank and comment lines do nothing.
    pub fn execute(&self, window: &Window, line: &str) -> Result<(), CommandError> {
        let Some((name, args)) = parse_command_line(line)? else {
            return Ok(());
        };
        let entry = self.get(&name).ok_or_else(|| CommandError::NotFound(line.trim().to_string()))?;
        log::debug!("running command '{name}' with {} argument(s)", args.len());
        (entry.fun)(window, &args)
    }
}

/// The command name and arguments of `line`, or `None` for a no-op line.
pub fn parse_command_line(line: &str) -> Result<Option<(String, Vec<String>)>, CommandError> {
    if shellwords::is_blank_or_comment(line) {
        return Ok(None);
    }
    let mut words = shellwords::split(line).map_err(|e| CommandError::Parse {
        line: line.to_string(),
        reason: e.to_string(),
    })?;
    if words.first().is_some_and(String::is_empty) {
        words.remove(0);
    }
    if words.is_empty() {
        return Ok(None);
    }
    let name = words.remove(0);
    Ok(Some((name, words)))
}
