//! The line loop behind `ksh`.
//!
//! Every input line is key-sequence text fed to one window. Lines starting
//! with `?` list completions instead; `?<n>` accepts the n-th entry of the
//! last listing.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use kestrel_core::completion::{Candidate, CompletionBuffer, CompletionListener};
use kestrel_core::{parse_sequence, Session, Window};
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::config::ShellConfig;
use crate::surface::{Output, TerminalSurface};

pub struct Shell {
    session: Arc<Session>,
    window: Arc<Window>,
    surface: Arc<TerminalSurface>,
    out: Output,
    runtime: Handle,
    listed: Mutex<Vec<Candidate>>,
}

impl Shell {
    /// Build the session and its window, then run the startup commands.
    #[must_use]
    pub fn new(config: &ShellConfig, out: Output, runtime: Handle) -> Self {
        let session = Session::new(config.session_config());
        session.set_raw_bindings(config.raw_bindings());
        let surface = TerminalSurface::new(Arc::clone(&out));
        let window = Window::new(&session, surface.clone());

        for line in &config.startup {
            log::debug!("startup command: {line}");
            window.run_command(line);
        }

        let shell = Self {
            session,
            window,
            surface,
            out,
            runtime,
            listed: Mutex::new(Vec::new()),
        };
        shell.record_visits();
        shell
    }

    #[must_use]
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Feed every line of `input` until it ends or a quit is requested.
    pub fn run(&self, input: impl BufRead) -> Result<()> {
        self.print_state()?;
        for line in input.lines() {
            self.handle_line(&line?)?;
            if self.surface.quit_requested() {
                log::info!("quit requested");
                break;
            }
        }
        Ok(())
    }

    pub fn handle_line(&self, line: &str) -> Result<()> {
        if let Some(rest) = line.strip_prefix('?') {
            match rest.trim() {
                "" => self.list_completions()?,
                index => self.accept_listed(index)?,
            }
        } else {
            match parse_sequence(line) {
                Ok(keys) => {
                    let consumed = self.window.handle_keys(&keys);
                    log::debug!("'{line}' consumed: {consumed}");
                }
                Err(err) => writeln!(self.out.lock(), "{err}")?,
            }
            self.record_visits();
        }
        self.print_state()
    }

    fn list_completions(&self) -> Result<()> {
        let task = {
            let _guard = self.runtime.enter();
            self.window.start_completion(Arc::new(LogListener))
        };
        self.runtime.block_on(task)?;

        let candidates = self.window.completions();
        let mut out = self.out.lock();
        for (i, candidate) in candidates.iter().enumerate() {
            writeln!(out, "{i:>3}  {}", candidate.description.replace('\t', "  "))?;
        }
        if candidates.is_empty() {
            writeln!(out, "(no completions)")?;
        }
        drop(out);
        *self.listed.lock() = candidates;
        Ok(())
    }

    fn accept_listed(&self, index: &str) -> Result<()> {
        let candidate = index.parse::<usize>().ok().and_then(|i| self.listed.lock().get(i).cloned());
        let accepted = candidate.is_some_and(|c| self.window.accept(&c));
        if !accepted {
            writeln!(self.out.lock(), "no completion '{index}' for this state")?;
        }
        self.record_visits();
        Ok(())
    }

    fn record_visits(&self) {
        for uri in self.surface.take_opened() {
            self.session.record_visit(&uri, "");
        }
    }

    fn print_state(&self) -> Result<()> {
        let state = self.window.state();
        let mut line = format!("[{}]", state.name());
        let base = state.base().to_string();
        if !base.is_empty() {
            line.push(' ');
            line.push_str(&base);
        }
        if let Some(status) = state.status() {
            line.push_str(" | ");
            line.push_str(&status.to_string());
        }
        writeln!(self.out.lock(), "{line}")?;
        Ok(())
    }
}

struct LogListener;

impl CompletionListener for LogListener {
    fn first(&self, has_results: bool) {
        log::debug!("completion started, results: {has_results}");
    }

    fn update(&self, buffer: &CompletionBuffer, done: bool) {
        log::trace!("{} completions, done: {done}", buffer.len());
    }
}
