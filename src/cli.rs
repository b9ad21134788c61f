//! The Aoi Command-Line Interface.
//!
//! This module is the main entry point for the `aoi` binary and orchestrates
//! the core library functions.

use std::process;

use clap::Parser;

use crate::{
    engine::{ExecutionPipeline, RunOutput},
    errors::{print_error, AoiError, SourceContext},
};

pub mod args;
pub mod output;

use args::{AoiArgs, ColorMode};

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = AoiArgs::parse();
    install_report_hook(args.color);

    let source = load_source(&args).unwrap_or_else(|e| exit_with(e));
    let result = ExecutionPipeline::execute(&source, &args.run_options())
        .unwrap_or_else(|e| exit_with(e));

    if let Err(e) = emit(&result, args.color) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn load_source(args: &AoiArgs) -> Result<SourceContext, AoiError> {
    match (&args.source, &args.file) {
        (_, Some(path)) => ExecutionPipeline::read_file(path),
        (Some(text), None) => Ok(SourceContext::inline(text.as_str())),
        // clap rejects a missing source before we get here
        (None, None) => Ok(SourceContext::inline("")),
    }
}

fn emit(result: &RunOutput, color: ColorMode) -> std::io::Result<()> {
    if !result.events.is_empty() {
        output::print_trace(&result.events, color.stderr_choice())?;
    }
    output::print_rendered(&result.rendered)?;
    if !result.stats.is_empty() {
        output::print_stats(&result.stats, color.stdout_choice())?;
    }
    Ok(())
}

fn exit_with(error: AoiError) -> ! {
    print_error(error);
    process::exit(1);
}

/// Makes `miette` honour `--color`.
fn install_report_hook(color: ColorMode) {
    let force = match color {
        ColorMode::Auto => return,
        ColorMode::Always => true,
        ColorMode::Never => false,
    };
    let _ = miette::set_hook(Box::new(move |_| {
        Box::new(miette::MietteHandlerOpts::new().color(force).build())
    }));
}
