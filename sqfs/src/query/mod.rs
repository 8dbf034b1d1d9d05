//! Query language front-end.
//!
//! # Syntax Overview
//!
//! `SELECT <fields> FROM <paths> [WHERE <conditions>]`
//!
//! - **Command**: `SELECT` (case-insensitive)
//! - **Fields**: known names, `*`, or `"quoted"` names, separated by spaces or commas
//! - **Paths**: one or more directories, `~/` expands to the home directory
//! - **Conditions**: `field <op> value` with `=`, `!=`, `<`, `<=`, `>`, `>=`, `LIKE`
//!
//! Only the first condition filters; later ones are parsed and reported.

mod cursor;
mod parser;

pub use cursor::Cursor;
pub use parser::{parse_query, Command, CompareOp, Condition, Field, Query, SourcePath};
