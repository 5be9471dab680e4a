//! # Photo Executable
//!
//! Terminal tool for reviewing the images recorded while driving. Images can be stepped through,
//! deleted into the temp directory, or restored from it, and the distribution of steering angles
//! over the remaining images can be shown.
//!
//! The executable takes no arguments, configuration is read from `params/photo_exec.toml`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod dist;
mod library;
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{Result, eyre::WrapErr};
use log::{info, warn};
use rustyline::{error::ReadlineError, DefaultEditor};

// Internal
use library::PhotoLibrary;
use params::PhotoExecParams;
use util::{
    host,
    label::parse_angle,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "photo $ ";
const HISTORY_FILE: &str = "history.txt";

const HELP: &str = "\
Commands:
  n, d      next image
  p, a      previous image
  del       delete the current image (moved to temp)
  r         restore all deleted images
  ls        list images
  dist      show the steering angle distribution
  help      show this message
  q         quit";

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Next,
    Prev,
    Delete,
    Restore,
    List,
    Dist,
    Help,
    Quit
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "n" | "d" | "next" => Some(Command::Next),
            "p" | "a" | "prev" => Some(Command::Prev),
            "del" | "delete" => Some(Command::Delete),
            "r" | "restore" => Some(Command::Restore),
            "ls" => Some(Command::List),
            "dist" => Some(Command::Dist),
            "h" | "help" | "?" => Some(Command::Help),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None
        }
    }
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let session = Session::new(
        "photo_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Debug output would clutter the prompt
    logger_init(LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("RC Car Photo Manager\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let mut params: PhotoExecParams = util::params::load("photo_exec.toml")
        .wrap_err("Could not load photo_exec params")?;

    let root = host::get_sw_root()
        .wrap_err("Could not find the software root")?;
    params.data_dir = root.join(&params.data_dir);
    params.temp_dir = root.join(&params.temp_dir);
    params.processed_dir = root.join(&params.processed_dir);

    // ---- OPEN LIBRARY ----

    let mut lib = PhotoLibrary::open(&params)
        .wrap_err("Failed to open the photo library")?;

    info!("{} images in {:?}", lib.files().len(), params.data_dir);

    // ---- REPL ----

    let history_path = session.session_root.join(HISTORY_FILE);
    let mut rl = DefaultEditor::new()
        .wrap_err("Failed to initialise the line editor")?;

    println!("{}", HELP);
    show_current(&lib);

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("Unhandled line editor error: {}", e);
                break
            }
        };

        if line.trim().is_empty() {
            continue
        }
        if let Err(e) = rl.add_history_entry(line.as_str()) {
            warn!("Could not add {:?} to the history: {}", line.trim(), e);
        }

        let cmd = match Command::parse(&line) {
            Some(c) => c,
            None => {
                println!("Unknown command {:?}, type `help` for the list", line.trim());
                continue
            }
        };

        match cmd {
            Command::Next => {
                if lib.next() {
                    show_current(&lib);
                }
                else {
                    println!("Already at the last image");
                }
            },
            Command::Prev => {
                if lib.prev() {
                    show_current(&lib);
                }
                else {
                    println!("Already at the first image");
                }
            },
            Command::Delete => {
                let name = match lib.current() {
                    Some(n) => n.to_string(),
                    None => {
                        println!("No image to delete");
                        continue
                    }
                };

                if !confirm(&mut rl, &format!("Delete {}? [y/N] ", name)) {
                    println!("Not deleted");
                    continue
                }

                match lib.delete_current() {
                    Ok(_) => show_current(&lib),
                    Err(e) => warn!("{}", e)
                }
            },
            Command::Restore => match lib.restore_all() {
                Ok(n) => {
                    println!("Restored {} files", n);
                    show_current(&lib);
                },
                Err(e) => {
                    warn!("{}", e);
                    show_current(&lib);
                }
            },
            Command::List => {
                for (i, name) in lib.files().iter().enumerate() {
                    let marker = if i == lib.index() { '>' } else { ' ' };
                    println!("{} {:>4} {}", marker, i + 1, name);
                }
            },
            Command::Dist => println!("{}", lib.distribution()),
            Command::Help => println!("{}", HELP),
            Command::Quit => break
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        warn!("Could not save history to {:?}: {}", history_path, e);
    }

    info!("Exiting");

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn show_current(lib: &PhotoLibrary) {
    match (lib.current(), lib.current_path()) {
        (Some(name), Some(path)) => println!(
            "[{}/{}] {} (angle {}) {}",
            lib.index() + 1,
            lib.files().len(),
            name,
            parse_angle(name),
            path.display()
        ),
        _ => println!("No images")
    }
}

/// Ask a yes/no question, anything but `y` is a no.
fn confirm(rl: &mut DefaultEditor, question: &str) -> bool {
    match rl.readline(question) {
        Ok(answer) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(_) => false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::parse("n"), Some(Command::Next));
        assert_eq!(Command::parse(" D "), Some(Command::Next));
        assert_eq!(Command::parse("a"), Some(Command::Prev));
        assert_eq!(Command::parse("del"), Some(Command::Delete));
        assert_eq!(Command::parse("r"), Some(Command::Restore));
        assert_eq!(Command::parse("dist"), Some(Command::Dist));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("rm -rf"), None);
        assert_eq!(Command::parse(""), None);
    }
}
