//! User-facing diagnostics.
//!
//! `INFO:` lines and command output go to stdout, `WARN:` and `ERROR:` lines
//! to stderr. Internal debug logging goes through `tracing` instead.

use std::fmt::Display;
use std::io::{IsTerminal, Write};
use std::sync::Mutex;

/// Text written by a captured reporter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

enum Sink {
    Terminal,
    Captured {
        buffers: Mutex<Captured>,
        terminal: bool,
    },
}

pub struct Reporter {
    sink: Sink,
}

impl Reporter {
    /// Report to the process's stdout/stderr.
    pub fn terminal() -> Self {
        Self {
            sink: Sink::Terminal,
        }
    }

    /// Buffer everything in memory, presenting as a non-terminal.
    pub fn captured() -> Self {
        Self::captured_with_terminal(false)
    }

    /// Buffer everything in memory, pretending stdin/stdout are (or aren't) a TTY.
    pub fn captured_with_terminal(terminal: bool) -> Self {
        Self {
            sink: Sink::Captured {
                buffers: Mutex::new(Captured::default()),
                terminal,
            },
        }
    }

    /// Whether the user can answer prompts.
    pub fn is_terminal(&self) -> bool {
        match &self.sink {
            Sink::Terminal => std::io::stdin().is_terminal() && std::io::stdout().is_terminal(),
            Sink::Captured { terminal, .. } => *terminal,
        }
    }

    pub fn info(&self, msg: impl Display) {
        self.write_out(&format!("INFO: {}\n", msg));
    }

    pub fn warn(&self, msg: impl Display) {
        self.write_err(&format!("WARN: {}\n", msg));
    }

    pub fn error(&self, msg: impl Display) {
        self.write_err(&format!("ERROR: {}\n", msg));
    }

    /// Write command output verbatim, no newline appended.
    pub fn print(&self, text: &str) {
        self.write_out(text);
    }

    /// Everything written so far. Empty for a terminal reporter.
    pub fn output(&self) -> Captured {
        match &self.sink {
            Sink::Terminal => Captured::default(),
            Sink::Captured { buffers, .. } => buffers
                .lock()
                .map(|b| b.clone())
                .unwrap_or_default(),
        }
    }

    fn write_out(&self, text: &str) {
        match &self.sink {
            Sink::Terminal => {
                let mut out = std::io::stdout().lock();
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            Sink::Captured { buffers, .. } => {
                if let Ok(mut b) = buffers.lock() {
                    b.stdout.push_str(text);
                }
            }
        }
    }

    fn write_err(&self, text: &str) {
        match &self.sink {
            Sink::Terminal => {
                let _ = std::io::stderr().lock().write_all(text.as_bytes());
            }
            Sink::Captured { buffers, .. } => {
                if let Ok(mut b) = buffers.lock() {
                    b.stderr.push_str(text);
                }
            }
        }
    }
}
