//! Syntax module for the Aoi language
//!
//! The pipeline is strictly grammar → tree builder:
//!
//! - [`grammar`] declares what valid input looks like and nothing else.
//! - [`builder`] reacts to rule events and assembles the AST on an explicit
//!   accumulator.
//! - [`parser`] runs the grammar and replays its successful match into the
//!   builder.

pub mod builder;
pub mod grammar;
pub mod parser;

pub use builder::{BuildEvent, EventKind};
pub use grammar::Entry;
pub use parser::{
    parse, parse_entry, parse_program, parse_source, parse_traced, Traced, MAX_NESTING,
};
