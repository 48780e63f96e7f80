// SPDX-License-Identifier: MIT
//
// meda — a small terminal text editor with live syntax coloring.
//
// This is the binary that wires the crates together:
//
//   meda-term   → raw mode, input parsing, framebuffer and diff renderer
//   meda-theme  → style tags and the themes that color them
//   meda-editor → buffer, viewport, highlighting, overlays, the Editor
//
// Startup:
//
//   args → Config (config.toml) → fern log file → Terminal::enter
//        → Editor::new(TermSurface, DiskStore) → open FILE → run(TermKeys)
//        → Terminal::leave → report any error on stderr

mod logging;

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, bail};
use meda_editor::config::Config;
use meda_editor::editor::{Editor, EditorOptions};
use meda_editor::files::DiskStore;
use meda_editor::keys::TermKeys;
use meda_editor::surface::TermSurface;
use meda_term::terminal::Terminal;
use meda_theme::Theme;

const USAGE: &str = "\
usage: meda [OPTIONS] [FILE]

options:
  -c, --config PATH   read settings from PATH instead of the default config.toml
  -h, --help          print this help
  -V, --version       print the version

keys:
  Ctrl-O  open a file    Ctrl-X  quit    Ctrl-A / Esc  close a dialog";

// ─── Arguments ──────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Edit,
    Help,
    Version,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    action: Action,
    config: Option<PathBuf>,
    file: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Self {
            action: Action::Edit,
            config: None,
            file: None,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.action = Action::Help,
                "-V" | "--version" => parsed.action = Action::Version,
                "-c" | "--config" => {
                    let Some(path) = args.next() else {
                        bail!("{arg} needs a path");
                    };
                    parsed.config = Some(path.into());
                }
                flag if flag.starts_with('-') && flag.len() > 1 => bail!("unknown option {flag}"),
                _ if parsed.file.is_some() => bail!("only one file can be opened"),
                _ => parsed.file = Some(arg.into()),
            }
        }
        Ok(parsed)
    }
}

// ─── Run ────────────────────────────────────────────────────────────────────

fn run(args: Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(path) = config.log_file() {
        let level = logging::effective_level(config.log_level());
        if let Err(e) = logging::init(&path, level) {
            eprintln!("meda: logging disabled: {e:#}");
        }
    }

    let theme = Theme::by_name(&config.view.theme).unwrap_or_else(|| {
        log::warn!("unknown theme {:?}, using terminal", config.view.theme);
        Theme::terminal()
    });

    let mut terminal = Terminal::new();
    let size = terminal.size();
    let surface = TermSurface::new(io::stdout(), size.rows, size.cols, theme);
    let mut editor = Editor::new(surface, DiskStore, EditorOptions::from(&config));
    if let Some(file) = args.file {
        editor.open(file);
    }

    terminal.enter().context("cannot set up the terminal")?;
    let result = editor.run(&mut TermKeys::new());
    let restored = terminal.leave();
    combine_exit(result, restored)
}

/// Merge the editor's outcome with the terminal restore. When both fail,
/// the editor's error is kept and the restore failure is attached to it.
fn combine_exit(result: io::Result<()>, restored: io::Result<()>) -> anyhow::Result<()> {
    match (result, restored) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(leave)) => Err(leave).context("cannot restore the terminal"),
        (Err(e), Ok(())) => Err(e).context("editor stopped"),
        (Err(e), Err(leave)) => Err(e)
            .context("editor stopped")
            .context(format!("cannot restore the terminal: {leave}")),
    }
}

fn main() {
    let args = match Args::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("meda: {e}\n\n{USAGE}");
            process::exit(2);
        }
    };

    match args.action {
        Action::Help => println!("{USAGE}"),
        Action::Version => println!("meda {}", env!("CARGO_PKG_VERSION")),
        Action::Edit => {
            if let Err(e) = run(args) {
                log::error!("{e:#}");
                eprintln!("meda: {e:#}");
                process::exit(1);
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
