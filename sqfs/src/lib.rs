//! sqfs: query filesystem entries with a small SQL-like language.
//!
//! `SELECT <fields> FROM <paths> [WHERE <condition>]` is parsed into a
//! [`Query`], executed by an [`Engine`] against directory listings, and
//! projected into an aligned [`Table`].

pub mod config;
pub mod display;
pub mod entry;
pub mod error;
pub mod eval;
pub mod field;
pub mod path;
pub mod query;

pub use config::Config;
pub use display::{sources_line, to_json, Table};
pub use entry::{EntryKind, EntryMetadata, EntrySource, FieldValue, FsSource};
pub use error::{Error, Result};
pub use eval::{Engine, Predicate, QueryResult};
pub use field::{FieldKind, ValueClass, WILDCARD_FIELDS};
pub use path::PathResolver;
pub use query::{parse_query, Command, CompareOp, Condition, Field, Query, SourcePath};
