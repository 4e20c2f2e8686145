use std::env;
use std::io;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::session::{Input, LineReader};

pub const PROMPT: &str = "mc> ";

const HISTORY_FILE: &str = ".mathcat_history";

/// Interactive line editor whose history is written back on drop.
pub struct Terminal {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl Terminal {
    pub fn open(history: Option<PathBuf>) -> rustyline::Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &history {
            match editor.load_history(path) {
                Ok(()) => {}
                // first run
                Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(Self { editor, history })
    }
}

impl LineReader for Terminal {
    type Error = ReadlineError;

    fn read_line(&mut self) -> rustyline::Result<Input> {
        match self.editor.readline(PROMPT) {
            Ok(line) => {
                self.editor.add_history_entry(line.as_str())?;
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(e) => Err(e),
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Some(path) = &self.history {
            if let Err(e) = self.editor.save_history(path) {
                eprintln!("Error: could not save history to {}: {e}", path.display());
            }
        }
    }
}

/// `~/.mathcat_history`, or `None` when no home directory is set.
pub fn history_path() -> Option<PathBuf> {
    let home = if cfg!(windows) {
        let drive = env::var("HOMEDRIVE").unwrap_or_default();
        let path = env::var("HOMEPATH").unwrap_or_default();
        match format!("{drive}{path}") {
            home if home.is_empty() => env::var("USERPROFILE").ok()?,
            home => home,
        }
    } else {
        env::var("HOME").ok()?
    };
    if home.is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(HISTORY_FILE))
}
