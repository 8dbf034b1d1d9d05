//! Recursive-descent parser for `SELECT <fields> FROM <paths> [WHERE <conditions>]`.

use std::fmt;

use super::cursor::{
    is_condition_separator, is_field_terminator, is_path_terminator, is_quote, is_whitespace,
    Cursor,
};
use crate::field::{self, FieldKind, WILDCARD, WILDCARD_FIELDS};
use crate::{Error, Result};

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub command: Command,
    /// Projected fields, in declaration order (may include `*`)
    pub fields: Vec<Field>,
    /// FROM sources, unresolved
    pub paths: Vec<SourcePath>,
    /// WHERE conditions; only the first one filters
    pub conditions: Vec<Condition>,
}

/// Query command. `SELECT` is the only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select,
}

/// One entry of the SELECT list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// A known field name, `*`, or a free-form quoted name.
    pub name: String,
}

/// One FROM source as written in the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath {
    pub raw: String,
}

/// A single `field <op> value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub op: CompareOp,
    pub value: String,
}

/// Comparison operators for conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=` equals
    Eq,
    /// `!=` not equals
    NotEq,
    /// `LIKE` anchored `%` wildcard match
    Like,
    /// `<` less than
    Lt,
    /// `<=` less or equal
    Lte,
    /// `>` greater than
    Gt,
    /// `>=` greater or equal
    Gte,
}

impl CompareOp {
    /// Parse an operator token. `LIKE` is case-insensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "=" => CompareOp::Eq,
            "!=" => CompareOp::NotEq,
            "<" => CompareOp::Lt,
            "<=" => CompareOp::Lte,
            ">" => CompareOp::Gt,
            ">=" => CompareOp::Gte,
            t if t.eq_ignore_ascii_case("LIKE") => CompareOp::Like,
            _ => return None,
        };
        Some(op)
    }
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }

    /// The known field this name refers to, if any.
    pub fn kind(&self) -> Option<FieldKind> {
        FieldKind::from_name(&self.name)
    }
}

impl SourcePath {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

impl Query {
    /// The condition that filters entries. Later conditions are parsed
    /// but not applied.
    pub fn active_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }

    /// Declared conditions that do not take part in filtering.
    pub fn ignored_conditions(&self) -> &[Condition] {
        self.conditions.get(1..).unwrap_or_default()
    }

    /// Projected columns with `*` expanded.
    ///
    /// Fails with [`Error::UnknownField`] for quoted names that are not
    /// real entry attributes.
    pub fn columns(&self) -> Result<Vec<FieldKind>> {
        let mut columns = Vec::new();
        for field in &self.fields {
            if field.is_wildcard() {
                columns.extend(WILDCARD_FIELDS);
            } else {
                let kind = field
                    .kind()
                    .ok_or_else(|| Error::UnknownField(field.name.clone()))?;
                columns.push(kind);
            }
        }
        Ok(columns)
    }
}

/// Parse a query string.
pub fn parse_query(input: &str) -> Result<Query> {
    Parser::new(input).parse()
}

struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(message, self.cursor.position())
    }

    fn parse(mut self) -> Result<Query> {
        self.cursor.skip_whitespace();
        if self.cursor.at_end() {
            return Err(Error::EmptyInput);
        }

        let query = self.parse_select()?;

        self.cursor.skip_whitespace();
        if !self.cursor.at_end() {
            return Err(self.error(format!(
                "unexpected trailing input \"{}\"",
                self.cursor.rest()
            )));
        }
        Ok(query)
    }

    fn parse_select(&mut self) -> Result<Query> {
        let command = self.parse_command()?;
        let fields = self.parse_fields()?;
        let paths = self.parse_paths()?;
        let conditions = self.parse_conditions()?;
        Ok(Query {
            command,
            fields,
            paths,
            conditions,
        })
    }

    fn parse_command(&mut self) -> Result<Command> {
        let start = self.cursor.position();
        let name = self.cursor.consume_while(|c| !is_whitespace(c));
        if name.eq_ignore_ascii_case("SELECT") {
            Ok(Command::Select)
        } else {
            Err(Error::parse(
                format!("unknown command \"{}\"", name.to_uppercase()),
                start,
            ))
        }
    }

    fn parse_fields(&mut self) -> Result<Vec<Field>> {
        let mut fields = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.at_end() || self.cursor.starts_with_keyword("FROM") {
                break;
            }
            if let Some(field) = self.parse_field()? {
                fields.push(field);
            }
        }
        // At end of input the missing FROM is the better diagnostic
        if fields.is_empty() && !self.cursor.at_end() {
            return Err(self.error("no fields selected"));
        }
        Ok(fields)
    }

    /// Parse one SELECT list item. A bare comma yields `None`.
    fn parse_field(&mut self) -> Result<Option<Field>> {
        let start = self.cursor.position();
        match self.cursor.peek() {
            Some('"') => {
                self.cursor.advance();
                let name = self.cursor.consume_while(|c| c != '"');
                if self.cursor.advance() != Some('"') {
                    return Err(Error::parse("unterminated quoted field name", start));
                }
                if name.is_empty() {
                    return Err(Error::parse("empty quoted field name", start));
                }
                Ok(Some(Field::new(name)))
            }
            Some('*') => {
                self.cursor.advance();
                Ok(Some(Field::new(WILDCARD)))
            }
            Some(',') => {
                self.cursor.advance();
                Ok(None)
            }
            Some(_) => {
                let name = self.cursor.consume_while(|c| !is_field_terminator(c));
                if !field::is_known_name(name) {
                    return Err(Error::parse(format!("unknown field name \"{}\"", name), start));
                }
                Ok(Some(Field::new(name)))
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_paths(&mut self) -> Result<Vec<SourcePath>> {
        if !self.cursor.eat_keyword("FROM") {
            return Err(self.error("missing FROM clause"));
        }

        let mut paths = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.peek() == Some(',') {
                self.cursor.advance();
                continue;
            }
            if self.cursor.at_end()
                || self.cursor.starts_with_keyword("WHERE")
                || self.cursor.starts_with_keyword("ON")
            {
                break;
            }
            let raw = self.cursor.consume_while(|c| !is_path_terminator(c));
            paths.push(SourcePath::new(raw));
        }

        if paths.is_empty() {
            return Err(self.error("missing source path after FROM"));
        }
        Ok(paths)
    }

    fn parse_conditions(&mut self) -> Result<Vec<Condition>> {
        self.cursor.skip_whitespace();
        if self.cursor.at_end() {
            return Ok(Vec::new());
        }
        if !self.cursor.eat_keyword("WHERE") {
            return Err(self.error(format!(
                "expected WHERE, found \"{}\"",
                self.cursor.peek_token()
            )));
        }

        self.cursor.skip_whitespace();
        if self.cursor.at_end() {
            return Err(self.error("missing condition after WHERE"));
        }

        let mut conditions = Vec::new();
        while !self.cursor.at_end() {
            conditions.push(self.parse_condition()?);
            self.cursor.skip_whitespace();
        }
        Ok(conditions)
    }

    fn parse_condition(&mut self) -> Result<Condition> {
        let field = self.cursor.consume_while(|c| !is_condition_separator(c));
        if field.is_empty() {
            return Err(self.error("expected field name"));
        }
        if FieldKind::from_name(field).is_none() {
            return Err(Error::UnknownField(field.to_string()));
        }

        // The operator is a whitespace-delimited run, validated as a whole
        self.cursor.skip_whitespace();
        let op_start = self.cursor.position();
        let token = self.cursor.consume_while(|c| !is_whitespace(c));
        if token.is_empty() {
            return Err(self.error(format!("missing operator after \"{}\"", field)));
        }
        let op = CompareOp::from_token(token)
            .ok_or_else(|| Error::parse(format!("unknown operator \"{}\"", token), op_start))?;

        self.cursor.skip_whitespace();
        let value = self.parse_value()?;

        Ok(Condition {
            field: field.to_string(),
            op,
            value,
        })
    }

    /// A quoted literal (no escapes) or a bare token up to whitespace.
    fn parse_value(&mut self) -> Result<String> {
        let start = self.cursor.position();
        match self.cursor.peek() {
            None => Err(self.error("missing value")),
            Some(quote) if is_quote(quote) => {
                self.cursor.advance();
                let value = self.cursor.consume_while(|c| c != quote);
                if self.cursor.advance() != Some(quote) {
                    return Err(Error::parse("unterminated quoted value", start));
                }
                Ok(value.to_string())
            }
            Some(_) => Ok(self.cursor.consume_while(|c| !is_whitespace(c)).to_string()),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Like => write!(f, "LIKE"),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Select => write!(f, "SELECT"),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if field::is_known_name(&self.name) {
            f.write_str(&self.name)
        } else {
            write!(f, "\"{}\"", self.name)
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.field, self.op)?;
        if !self.value.contains('\'') {
            write!(f, "'{}'", self.value)
        } else if !self.value.contains('"') {
            write!(f, "\"{}\"", self.value)
        } else {
            // Both quotes only occur in a bare token, which has no whitespace
            f.write_str(&self.value)
        }
    }
}

impl fmt::Display for Query {
    /// Normalized query text; parses back to an equal query.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self.fields.iter().map(|x| x.to_string()).collect();
        let paths: Vec<&str> = self.paths.iter().map(|p| p.raw.as_str()).collect();
        write!(
            f,
            "{} {} FROM {}",
            self.command,
            fields.join(", "),
            paths.join(", ")
        )?;
        if !self.conditions.is_empty() {
            let conditions: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
            write!(f, " WHERE {}", conditions.join(" "))?;
        }
        Ok(())
    }
}
