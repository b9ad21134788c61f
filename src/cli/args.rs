//! Defines the command-line arguments for the Aoi CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;

use crate::engine::{Emit, RunOptions};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "aoi",
    version,
    about = "Parse an Aoi expression and print its abstract syntax tree."
)]
pub struct AoiArgs {
    /// The program text, e.g. '(let ((x 5)) (+ x 1))'.
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub source: Option<String>,

    /// Read the program from a file instead (`-` reads standard input).
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// How to print each tree.
    #[arg(long, value_enum, default_value_t = Emit::Canonical)]
    pub emit: Emit,

    /// Accept several whitespace-separated top-level expressions.
    #[arg(long)]
    pub all: bool,

    /// Print the tree builder's event trace to stderr.
    #[arg(long)]
    pub trace: bool,

    /// Print node count and depth of each tree.
    #[arg(long)]
    pub stats: bool,

    /// When to use colours.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

impl AoiArgs {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            emit: self.emit,
            all: self.all,
            trace: self.trace,
            stats: self.stats,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Colour choice for a stream; `Auto` only colours a terminal.
    pub fn choice_for(self, is_terminal: bool) -> ColorChoice {
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto if is_terminal => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
        }
    }

    pub fn stderr_choice(self) -> ColorChoice {
        self.choice_for(std::io::stderr().is_terminal())
    }

    pub fn stdout_choice(self) -> ColorChoice {
        self.choice_for(std::io::stdout().is_terminal())
    }
}
