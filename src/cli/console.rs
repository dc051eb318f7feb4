// src/cli/console.rs

use colored::Colorize;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Where the parser writes help, early-exit messages and failures.
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    colorize: bool,
}

impl Console {
    /// Standard output and standard error, coloured when the terminal allows it.
    pub fn standard() -> Self {
        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            colorize: colored::control::SHOULD_COLORIZE.should_colorize(),
        }
    }

    /// Custom writers. Output is never coloured.
    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Box::new(out),
            err: Box::new(err),
            colorize: false,
        }
    }

    pub fn colorize(&self) -> bool {
        self.colorize
    }

    pub(crate) fn print(&mut self, text: &str) {
        write_line(&mut self.out, text);
    }

    pub(crate) fn print_error(&mut self, text: &str) {
        write_line(&mut self.err, text);
    }

    /// Writes the generic failure line: a highlighted prefix followed by the error chain.
    pub(crate) fn print_failure(&mut self, error: &anyhow::Error) {
        let prefix = if self.colorize {
            t!("cli.error.prefix").red().bold().to_string()
        } else {
            t!("cli.error.prefix").to_string()
        };
        write_line(&mut self.err, &format!("\n{}: {:#}", prefix, error));
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("colorize", &self.colorize)
            .finish_non_exhaustive()
    }
}

fn write_line(writer: &mut Box<dyn Write + Send>, text: &str) {
    let result = if text.ends_with('\n') {
        writer.write_all(text.as_bytes())
    } else {
        writeln!(writer, "{}", text)
    };
    if let Err(e) = result.and_then(|_| writer.flush()) {
        log::warn!("Failed to write to the console: {}", e);
    }
}

/// An in-memory writer that can be handed to [`Console::new`] and read back later.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents().is_empty()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::other("capture buffer lock poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
