//! Query execution: resolve sources, list entries, apply the condition.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SubsecRound};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::entry::{EntryMetadata, EntrySource, FieldValue, FsSource};
use crate::field::{FieldKind, ValueClass};
use crate::path::PathResolver;
use crate::query::{CompareOp, Condition, Query};
use crate::{Config, Error, Result};

/// Entries selected by a query, ready for projection.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Resolved FROM directories, in declaration order.
    pub sources: Vec<PathBuf>,
    /// Projected columns with `*` expanded.
    pub columns: Vec<FieldKind>,
    /// Matching entries, per source in listing order.
    pub entries: Vec<EntryMetadata>,
}

/// Runs queries against an [`EntrySource`].
pub struct Engine<S: EntrySource = FsSource> {
    source: S,
    resolver: PathResolver,
    config: Config,
}

impl Engine<FsSource> {
    /// Engine over the local filesystem and the current user's home.
    pub fn local(config: Config) -> Self {
        Self::new(FsSource::new(), PathResolver::from_env(), config)
    }
}

impl<S: EntrySource> Engine<S> {
    pub fn new(source: S, resolver: PathResolver, config: Config) -> Self {
        Self {
            source,
            resolver,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute a parsed query.
    ///
    /// Only the first condition filters. Any failure aborts the whole
    /// query; there are no partial results.
    pub fn execute(&self, query: &Query) -> Result<QueryResult> {
        let columns = query.columns()?;
        let predicate = query
            .active_condition()
            .map(|c| Predicate::compile(c, &self.config.date_format))
            .transpose()?;

        let ignored = query.ignored_conditions();
        if !ignored.is_empty() {
            warn!(ignored = ignored.len(), "only the first WHERE condition is applied");
        }

        let sources = query
            .paths
            .iter()
            .map(|p| self.resolver.resolve(p))
            .collect::<Result<Vec<_>>>()?;

        let mut entries = Vec::new();
        let mut total = 0usize;
        for dir in &sources {
            let names = self.source.list(dir)?;
            debug!(dir = %dir.display(), entries = names.len(), "listed directory");
            for name in names {
                let entry = self.source.metadata(dir, &name)?;
                total += 1;
                if predicate.as_ref().map_or(true, |p| p.matches(&entry)) {
                    entries.push(entry);
                }
            }
        }

        info!(
            sources = sources.len(),
            total,
            matched = entries.len(),
            "query complete"
        );
        Ok(QueryResult {
            sources,
            columns,
            entries,
        })
    }
}

/// A condition checked and compiled against its field.
#[derive(Debug, Clone)]
pub struct Predicate {
    field: FieldKind,
    test: Test,
    date_format: String,
}

#[derive(Debug, Clone)]
enum Test {
    Equal(String),
    NotEqual(String),
    Like(Regex),
    Number(Bound, u64),
    Date(Bound, NaiveDateTime),
}

/// The ordered operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Bound {
    fn holds<T: PartialOrd>(self, left: T, right: T) -> bool {
        match self {
            Bound::Lt => left < right,
            Bound::Lte => left <= right,
            Bound::Gt => left > right,
            Bound::Gte => left >= right,
        }
    }
}

impl Predicate {
    /// Compile a condition. `date_format` is the rendering used for
    /// textual comparison of date fields.
    ///
    /// Fails with [`Error::UnknownField`] for names that are not entry
    /// attributes and [`Error::ComparisonUnsupported`] for ordered
    /// comparison on a text field.
    pub fn compile(condition: &Condition, date_format: &str) -> Result<Self> {
        let field = FieldKind::from_name(&condition.field)
            .ok_or_else(|| Error::UnknownField(condition.field.clone()))?;
        let value = &condition.value;

        let test = match condition.op {
            CompareOp::Eq => Test::Equal(value.clone()),
            CompareOp::NotEq => Test::NotEqual(value.clone()),
            // `%` matches any run; other regex metacharacters pass through as-is
            CompareOp::Like => Test::Like(Regex::new(&format!("^{}$", value.replace('%', "(.*)")))?),
            CompareOp::Lt => ordered_test(field, Bound::Lt, condition)?,
            CompareOp::Lte => ordered_test(field, Bound::Lte, condition)?,
            CompareOp::Gt => ordered_test(field, Bound::Gt, condition)?,
            CompareOp::Gte => ordered_test(field, Bound::Gte, condition)?,
        };

        debug!(field = %field, op = %condition.op, value = %value, "compiled predicate");
        Ok(Self {
            field,
            test,
            date_format: date_format.to_string(),
        })
    }

    pub fn matches(&self, entry: &EntryMetadata) -> bool {
        match &self.test {
            Test::Equal(expected) => self.text(entry) == *expected,
            Test::NotEqual(expected) => self.text(entry) != *expected,
            Test::Like(re) => re.is_match(&self.text(entry)),
            Test::Number(bound, right) => match entry.value(self.field) {
                FieldValue::Number(left) => bound.holds(left, *right),
                _ => false,
            },
            // Literals carry whole seconds, so entry times are compared at that precision
            Test::Date(bound, right) => match entry.value(self.field) {
                FieldValue::Date(left) => bound.holds(left.naive_local().trunc_subsecs(0), *right),
                _ => false,
            },
        }
    }

    fn text(&self, entry: &EntryMetadata) -> String {
        entry.render(self.field, &self.date_format)
    }
}

fn invalid_value(field: FieldKind, value: &str) -> Error {
    Error::InvalidValue {
        field: field.name().to_string(),
        value: value.to_string(),
    }
}

/// Number or date test for an ordered operator; text fields have no ordering.
fn ordered_test(field: FieldKind, bound: Bound, condition: &Condition) -> Result<Test> {
    let value = &condition.value;
    match field.value_class() {
        ValueClass::Text => Err(Error::ComparisonUnsupported {
            field: field.name().to_string(),
            op: condition.op,
        }),
        ValueClass::Number => {
            let n = value.trim().parse().map_err(|_| invalid_value(field, value))?;
            Ok(Test::Number(bound, n))
        }
        ValueClass::Date => {
            let date = parse_date(value).ok_or_else(|| invalid_value(field, value))?;
            Ok(Test::Date(bound, date))
        }
    }
}

/// Parse a date literal in local time.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM`,
/// `YYYY-MM-DD` (midnight) and RFC 3339 with an explicit offset.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}
