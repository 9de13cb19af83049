//! Raw binding text and its resolution into executable bindings.
//!
//! The action side of a raw binding is either a builtin reference
//! (`builtin:<name> [args..]`, `b:<name> [args..]`) or a command line
//! (`cmd:<line>`, `c:<line>`, `command:<line>`, or unprefixed text).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{BindingError, KeyParseError};
use crate::input::{parse_sequence, KeySequence};
use crate::shellwords;

/// Message of the deliberate fatal stop.
pub const ABORT_MESSAGE: &str = "builtin 'panic' called";

/// Runs a command line on behalf of a binding.
pub type CommandRunner = Arc<dyn Fn(&str) + Send + Sync>;

type ActionFn = Arc<dyn Fn(&[String]) + Send + Sync>;

/// What a binding does when it fires.
#[derive(Clone)]
pub enum Action {
    Run(ActionFn),
    /// Deliberate abnormal termination, for diagnostics only.
    Abort,
}

impl Action {
    pub fn new(f: impl Fn(&[String]) + Send + Sync + 'static) -> Self {
        Self::Run(Arc::new(f))
    }

    /// Invoke the action.
    ///
    /// # Panics
    ///
    /// Panics for [`Action::Abort`]; that is its only purpose.
    pub fn invoke(&self, args: &[String]) {
        match self {
            Self::Run(f) => f(args),
            Self::Abort => panic!("{ABORT_MESSAGE}"),
        }
    }

    /// This action with `bound` placed in front of every call's arguments.
    #[must_use]
    pub fn with_args(self, bound: Vec<String>) -> Self {
        if bound.is_empty() {
            return self;
        }
        match self {
            Self::Run(f) => Self::new(move |args: &[String]| {
                let mut all = bound.clone();
                all.extend_from_slice(args);
                f(&all);
            }),
            Self::Abort => Self::Abort,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run(_) => f.write_str("Action::Run(..)"),
            Self::Abort => f.write_str("Action::Abort"),
        }
    }
}

/// A named builtin action.
#[derive(Debug, Clone)]
pub struct Builtin {
    pub action: Action,
    pub description: &'static str,
}

impl Builtin {
    pub fn new(description: &'static str, f: impl Fn(&[String]) + Send + Sync + 'static) -> Self {
        Self {
            action: Action::new(f),
            description,
        }
    }
}

pub type BuiltinTable = BTreeMap<String, Builtin>;

/// A binding as written by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBinding {
    pub from: String,
    pub to: String,
}

impl RawBinding {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A resolved binding.
#[derive(Debug, Clone)]
pub struct Binding {
    pub from: KeySequence,
    pub name: String,
    pub description: String,
    pub action: Action,
}

impl Binding {
    pub fn new(from: KeySequence, name: impl Into<String>, description: impl Into<String>, action: Action) -> Self {
        Self {
            from,
            name: name.into(),
            description: description.into(),
            action,
        }
    }
}

const BUILTIN_PREFIXES: &[&str] = &["builtin:", "b:"];
const COMMAND_PREFIXES: &[&str] = &["cmd:", "c:", "command:"];

fn strip_any<'a>(text: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| text.strip_prefix(p))
}

/// Replace an existing raw binding with the same `from` text in place, or
/// append a new one.
pub fn rebind(raws: &mut Vec<RawBinding>, raw: RawBinding) {
    match raws.iter_mut().find(|r| r.from == raw.from) {
        Some(existing) => *existing = raw,
        None => raws.push(raw),
    }
}

fn resolve_action(
    raw: &RawBinding,
    builtins: &BuiltinTable,
    runner: &CommandRunner,
) -> Result<(String, String, Action), BindingError> {
    let to = raw.to.trim();
    if let Some(spec) = strip_any(to, BUILTIN_PREFIXES) {
        let mut words = shellwords::split(spec).map_err(|e| BindingError::Malformed {
            from: raw.from.clone(),
            to: raw.to.clone(),
            reason: e.to_string(),
        })?;
        if words.is_empty() {
            return Err(BindingError::EmptyAction { from: raw.from.clone() });
        }
        let name = words.remove(0);
        let builtin = builtins.get(&name).ok_or_else(|| BindingError::UnknownBuiltin {
            from: raw.from.clone(),
            builtin: name.clone(),
        })?;
        return Ok((name, builtin.description.to_string(), builtin.action.clone().with_args(words)));
    }

    let line = strip_any(to, COMMAND_PREFIXES).unwrap_or(to).trim();
    if line.is_empty() {
        return Err(BindingError::EmptyAction { from: raw.from.clone() });
    }
    let line = line.to_string();
    let runner = Arc::clone(runner);
    let action = Action::new({
        let line = line.clone();
        move |args: &[String]| {
            if args.is_empty() {
                runner(&line);
            } else {
                runner(&format!("{line} {}", shellwords::join(args)));
            }
        }
    });
    Ok((line, "command".to_string(), action))
}

/// Resolve raw bindings against the builtin table.
///
/// A later raw binding with the same `from` text replaces an earlier one.
/// Every failure is collected; a bad binding never blocks the others.
pub fn parse_raw_bindings(
    raws: &[RawBinding],
    builtins: &BuiltinTable,
    runner: &CommandRunner,
) -> (Vec<Binding>, Vec<BindingError>) {
    let mut effective = Vec::with_capacity(raws.len());
    for raw in raws {
        rebind(&mut effective, raw.clone());
    }

    let mut bindings = Vec::with_capacity(effective.len());
    let mut errors = Vec::new();
    for raw in &effective {
        let from = match parse_sequence(&raw.from) {
            Ok(from) if from.is_empty() => {
                errors.push(BindingError::Keys {
                    from: raw.from.clone(),
                    source: KeyParseError(raw.from.clone()),
                });
                continue;
            }
            Ok(from) => from,
            Err(source) => {
                errors.push(BindingError::Keys {
                    from: raw.from.clone(),
                    source,
                });
                continue;
            }
        };
        match resolve_action(raw, builtins, runner) {
            Ok((name, description, action)) => bindings.push(Binding::new(from, name, description, action)),
            Err(err) => errors.push(err),
        }
    }
    (bindings, errors)
}
