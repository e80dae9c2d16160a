// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal output for streamed answers.

use std::io::Write;

use aiqus_core::{AiqusError, ChatHandler, Fragment, SessionRecord};
use colored::Colorize;

/// Writes fragments to `out` as they arrive and errors to `err`.
pub struct TerminalPrinter {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    printed: bool,
    failed: bool,
}

impl TerminalPrinter {
    /// Printer bound to stdout and stderr.
    pub fn stdio() -> Self {
        Self::new(Box::new(std::io::stdout()), Box::new(std::io::stderr()))
    }

    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            err,
            printed: false,
            failed: false,
        }
    }

    /// True once an error was reported.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Terminates a partially printed line, if any.
    fn end_line(&mut self) {
        if self.printed {
            writeln!(self.out).ok();
            self.out.flush().ok();
            self.printed = false;
        }
    }
}

impl ChatHandler for TerminalPrinter {
    fn on_fragment(&mut self, fragment: Fragment) {
        write!(self.out, "{}", fragment.text).ok();
        self.out.flush().ok();
        self.printed = true;
    }

    fn on_finish(&mut self, _session: SessionRecord) {
        self.end_line();
    }

    fn on_error(&mut self, error: AiqusError) {
        self.end_line();
        self.failed = true;
        writeln!(self.err, "{}: {error}", "error".red()).ok();
    }
}
