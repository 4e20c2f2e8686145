use std::io::{self, Write};

use clap::Parser;

use crate::config::{Mode, Settings};
use crate::editor::Terminal;
use crate::expr::Calculator;
use crate::session::{LineReader, Session};

mod config;
mod div;
mod editor;
mod expr;
mod format;
mod session;

/// Interactive calculator over exact rational numbers.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Options {
    /// Bits of precision used in decimal float results
    #[arg(long, default_value_t = 64)]
    precision: u32,

    /// Type of literal used as result: decimal, hex, binary or octal
    #[arg(long, default_value = "decimal")]
    mode: String,
}

/// Resolves the settings, then opens the reader and runs a session over it.
/// A bad mode fails before `open` is called.
fn start<R, O, W>(
    options: &Options,
    open: impl FnOnce() -> color_eyre::Result<R>,
    out: O,
    err: W,
) -> color_eyre::Result<()>
where
    R: LineReader,
    R::Error: std::error::Error + Send + Sync + 'static,
    O: Write,
    W: Write,
{
    let mode: Mode = options.mode.parse()?;
    let settings = Settings {
        mode,
        precision: options.precision,
    };

    let reader = open()?;
    Session::new(settings, Calculator::new(), out, err).run(reader)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let options = Options::parse();
    start(
        &options,
        || Ok(Terminal::open(editor::history_path())?),
        io::stdout(),
        io::stderr(),
    )
}
