//! Projection of query results into aligned text or JSON.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::entry::{EntryMetadata, FieldValue};
use crate::field::FieldKind;
use crate::Config;

/// An aligned table: one header line and one line per entry.
///
/// Each column is `max(min_width, 1 + widest value)` characters wide and
/// every cell, header included, is right-padded to it. Cells are joined
/// with a single space.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<FieldKind>,
    widths: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[FieldKind], entries: &[EntryMetadata], config: &Config) -> Self {
        let rows: Vec<Vec<String>> = entries
            .iter()
            .map(|entry| {
                columns
                    .iter()
                    .map(|&field| entry.render(field, &config.date_format))
                    .collect()
            })
            .collect();

        let widths = (0..columns.len())
            .map(|i| {
                rows.iter()
                    .map(|row| row[i].chars().count() + 1)
                    .fold(config.min_column_width, usize::max)
            })
            .collect();

        Self {
            columns: columns.to_vec(),
            widths,
            rows,
        }
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    pub fn header(&self) -> String {
        let labels: Vec<&str> = self.columns.iter().map(|c| c.label()).collect();
        self.line(&labels)
    }

    /// Formatted entry lines, in entry order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|row| self.line(row))
    }

    /// Header and rows, each newline-terminated.
    pub fn render(&self) -> String {
        let mut out = self.header();
        out.push('\n');
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    fn line<S: AsRef<str>>(&self, cells: &[S]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&self.widths)
            .map(|(cell, &width)| format!("{:<width$}", cell.as_ref(), width = width))
            .collect();
        padded.join(" ")
    }
}

/// Informational line naming the resolved source directories.
pub fn sources_line(sources: &[PathBuf]) -> String {
    let dirs: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
    format!("Getting files from folders {}", dirs.join(", "))
}

/// Projected rows as a JSON array of objects keyed by field name.
///
/// Sizes and link counts are numbers; everything else is its display text.
pub fn to_json(columns: &[FieldKind], entries: &[EntryMetadata], config: &Config) -> Value {
    let rows = entries
        .iter()
        .map(|entry| {
            let mut row = Map::new();
            for &field in columns {
                let value = match entry.value(field) {
                    FieldValue::Number(n) => Value::from(n),
                    _ => Value::from(entry.render(field, &config.date_format)),
                };
                row.insert(field.name().to_string(), value);
            }
            Value::Object(row)
        })
        .collect();
    Value::Array(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use chrono::{Local, TimeZone};
    use std::path::Path;

    fn entry(name: &str, size: u64) -> EntryMetadata {
        let at = Local.with_ymd_and_hms(2024, 2, 29, 8, 30, 0).unwrap();
        EntryMetadata {
            name: name.to_string(),
            path: Path::new("/data").join(name),
            extension: crate::entry::extension_of(name).to_string(),
            created_at: at,
            modified_at: at,
            owner: "alice".to_string(),
            group: "staff".to_string(),
            size,
            kind: EntryKind::File,
            permission: "-rw-r--r--".to_string(),
            links: 1,
        }
    }

    #[test]
    fn test_minimum_width() {
        let table = Table::new(
            &[FieldKind::Name, FieldKind::FileSize],
            &[entry("a.sh", 12)],
            &Config::default(),
        );
        assert_eq!(table.widths(), &[10, 10]);
        assert_eq!(table.header(), "Name       Size      ");
        let lines: Vec<String> = table.lines().collect();
        assert_eq!(lines, vec!["a.sh       12        "]);
    }

    #[test]
    fn test_width_grows_with_widest_value() {
        let table = Table::new(
            &[FieldKind::Name, FieldKind::Extension],
            &[entry("a_rather_long_name.txt", 1), entry("b", 2)],
            &Config::default(),
        );
        assert_eq!(table.widths(), &[23, 10]);
        for line in table.lines() {
            assert_eq!(line.chars().count(), 23 + 1 + 10);
        }
        assert_eq!(table.header().chars().count(), 23 + 1 + 10);
    }

    #[test]
    fn test_width_counts_characters() {
        let table = Table::new(&[FieldKind::Name], &[entry("ééééééééééé", 1)], &Config::default());
        assert_eq!(table.widths(), &[12]);
    }

    #[test]
    fn test_configured_min_width() {
        let config = Config {
            min_column_width: 4,
            ..Config::default()
        };
        let table = Table::new(&[FieldKind::FileSize], &[entry("x", 7)], &config);
        assert_eq!(table.widths(), &[4]);
        assert_eq!(table.render(), "Size\n7   \n");
    }

    #[test]
    fn test_wildcard_header_labels() {
        let table = Table::new(&crate::field::WILDCARD_FIELDS, &[], &Config::default());
        let header = table.header();
        let labels: Vec<&str> = header.split_whitespace().collect();
        assert_eq!(
            labels,
            vec!["Path", "Last", "Mod", "Created", "Owner", "Group", "Name", "Ext.", "Size"]
        );
    }

    #[test]
    fn test_rows_keep_entry_order() {
        let table = Table::new(
            &[FieldKind::Name],
            &[entry("z", 1), entry("a", 1), entry("m", 1)],
            &Config::default(),
        );
        let names: Vec<String> = table.lines().map(|l| l.trim_end().to_string()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_empty_result_renders_header_only() {
        let table = Table::new(&[FieldKind::Name], &[], &Config::default());
        assert_eq!(table.render(), "Name      \n");
    }

    #[test]
    fn test_date_rendering() {
        let table = Table::new(&[FieldKind::LastMod], &[entry("x", 1)], &Config::default());
        let lines: Vec<String> = table.lines().collect();
        assert_eq!(lines[0], "2024-02-29 08:30:00 ");
        assert_eq!(table.widths(), &[20]);
    }

    #[test]
    fn test_sources_line() {
        let line = sources_line(&[PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(line, "Getting files from folders /a, /b");
    }

    #[test]
    fn test_json_rows() {
        let json = to_json(
            &[FieldKind::Name, FieldKind::FileSize, FieldKind::Type],
            &[entry("a.sh", 12)],
            &Config::default(),
        );
        assert_eq!(
            json,
            serde_json::json!([{ "name": "a.sh", "filesize": 12, "type": "file" }])
        );
        let keys: Vec<&String> = json[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "filesize", "type"]);
    }
}
