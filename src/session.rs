use std::fmt::Display;
use std::io::Write;

use num_rational::BigRational;

use crate::config::Settings;
use crate::format;

/// What a line reader hands back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Eof,
    Interrupted,
}

/// Source of input lines. Dropping it releases whatever it holds open.
pub trait LineReader {
    type Error;
    fn read_line(&mut self) -> Result<Input, Self::Error>;
}

pub trait Evaluator {
    type Error: Display;
    fn evaluate(&mut self, line: &str) -> Result<BigRational, Self::Error>;
}

pub struct Session<E, O, W> {
    settings: Settings,
    evaluator: E,
    out: O,
    err: W,
}

impl<E: Evaluator, O: Write, W: Write> Session<E, O, W> {
    pub fn new(settings: Settings, evaluator: E, out: O, err: W) -> Self {
        Self {
            settings,
            evaluator,
            out,
            err,
        }
    }

    /// Evaluates lines from `reader` until it reports end of input or an
    /// interrupt. Errors from a single line are printed and skipped; only
    /// reader and stream failures end the session early. `reader` is dropped
    /// before this returns, whichever way it returns.
    pub fn run<R>(&mut self, mut reader: R) -> color_eyre::Result<()>
    where
        R: LineReader,
        R::Error: std::error::Error + Send + Sync + 'static,
    {
        loop {
            let line = match reader.read_line()? {
                Input::Line(line) => line,
                Input::Eof | Input::Interrupted => break,
            };
            if line.trim().is_empty() {
                continue;
            }

            let value = match self.evaluator.evaluate(&line) {
                Ok(value) => value,
                Err(e) => {
                    writeln!(self.err, "Error: {e}")?;
                    continue;
                }
            };

            match format::render(&value, self.settings.mode, self.settings.precision) {
                Ok(text) => writeln!(self.out, "{text}")?,
                Err(e) => writeln!(self.err, "Error: {e}")?,
            }
        }
        Ok(())
    }
}
