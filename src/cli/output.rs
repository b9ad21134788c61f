//! Handles all user-facing output for the CLI.
//!
//! Results go to stdout, one line per tree. The builder trace and statistics
//! are coloured with `termcolor`; errors are left to `miette`.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::engine::TreeStats;
use crate::syntax::{BuildEvent, EventKind};

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints the builder event trace to stderr, indented by rule nesting.
pub fn print_trace(events: &[BuildEvent], choice: ColorChoice) -> io::Result<()> {
    let mut stderr = StandardStream::stderr(choice);
    write_trace(&mut stderr, events)
}

/// Prints each rendered tree on its own line.
pub fn print_rendered(lines: &[String]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for line in lines {
        writeln!(handle, "{line}")?;
    }
    Ok(())
}

pub fn print_stats(stats: &[TreeStats], choice: ColorChoice) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(choice);
    for (index, stat) in stats.iter().enumerate() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(stdout, "tree {}:", index + 1)?;
        stdout.reset()?;
        writeln!(stdout, " {} nodes, depth {}", stat.nodes, stat.depth)?;
    }
    Ok(())
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_trace<W: WriteColor>(out: &mut W, events: &[BuildEvent]) -> io::Result<()> {
    let mut depth = 0usize;
    for event in events {
        if event.kind == EventKind::Complete {
            depth = depth.saturating_sub(1);
        }

        let color = match event.kind {
            EventKind::Enter => Color::Blue,
            EventKind::Complete => Color::Yellow,
        };
        write!(out, "{}", "  ".repeat(depth))?;
        out.set_color(ColorSpec::new().set_fg(Some(color)))?;
        write!(out, "{event}")?;
        out.reset()?;
        writeln!(out)?;

        if event.kind == EventKind::Enter {
            depth += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceContext;
    use crate::syntax::{parse_traced, Entry};
    use termcolor::NoColor;

    #[test]
    fn test_trace_is_indented_by_nesting() {
        let source = SourceContext::inline("(* 2 3)");
        let traced = parse_traced(&source, Entry::Single).unwrap();

        let mut out = NoColor::new(Vec::new());
        write_trace(&mut out, &traced.events).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("enter program"));
        assert!(lines.last().unwrap().starts_with("match program"));
        assert!(lines.iter().any(|l| l.starts_with("    match number `2`")));
    }
}
