//! Field vocabulary: the entry attributes a query can project or filter on.

use std::fmt;

/// A known entry attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Permission,
    Links,
    Owner,
    Group,
    FileSize,
    LastMod,
    CreateDt,
    Name,
    Extension,
    Path,
    Type,
}

/// How a field's values compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    Text,
    Number,
    Date,
}

/// Name that expands to [`WILDCARD_FIELDS`] at projection time.
pub const WILDCARD: &str = "*";

/// Projection order for `*`.
///
/// `permission`, `links` and `type` are filterable but never part of the
/// wildcard expansion.
pub const WILDCARD_FIELDS: [FieldKind; 8] = [
    FieldKind::Path,
    FieldKind::LastMod,
    FieldKind::CreateDt,
    FieldKind::Owner,
    FieldKind::Group,
    FieldKind::Name,
    FieldKind::Extension,
    FieldKind::FileSize,
];

impl FieldKind {
    pub const ALL: [FieldKind; 11] = [
        FieldKind::Permission,
        FieldKind::Links,
        FieldKind::Owner,
        FieldKind::Group,
        FieldKind::FileSize,
        FieldKind::LastMod,
        FieldKind::CreateDt,
        FieldKind::Name,
        FieldKind::Extension,
        FieldKind::Path,
        FieldKind::Type,
    ];

    /// Look up a field by its query name (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Name used in queries.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Permission => "permission",
            FieldKind::Links => "links",
            FieldKind::Owner => "owner",
            FieldKind::Group => "group",
            FieldKind::FileSize => "filesize",
            FieldKind::LastMod => "lastmod",
            FieldKind::CreateDt => "createdt",
            FieldKind::Name => "name",
            FieldKind::Extension => "extension",
            FieldKind::Path => "path",
            FieldKind::Type => "type",
        }
    }

    /// Column header.
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Permission => "Perm.",
            FieldKind::Links => "Links",
            FieldKind::Owner => "Owner",
            FieldKind::Group => "Group",
            FieldKind::FileSize => "Size",
            FieldKind::LastMod => "Last Mod",
            FieldKind::CreateDt => "Created",
            FieldKind::Name => "Name",
            FieldKind::Extension => "Ext.",
            FieldKind::Path => "Path",
            FieldKind::Type => "Type",
        }
    }

    pub fn value_class(self) -> ValueClass {
        match self {
            FieldKind::FileSize | FieldKind::Links => ValueClass::Number,
            FieldKind::LastMod | FieldKind::CreateDt => ValueClass::Date,
            _ => ValueClass::Text,
        }
    }

    /// Whether `<`, `<=`, `>` and `>=` are defined for this field.
    pub fn is_orderable(self) -> bool {
        self.value_class() != ValueClass::Text
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a bare (unquoted) field name is accepted by the parser.
pub fn is_known_name(name: &str) -> bool {
    name == WILDCARD || FieldKind::from_name(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for field in FieldKind::ALL {
            assert_eq!(FieldKind::from_name(field.name()), Some(field));
        }
        assert_eq!(FieldKind::from_name("size"), None);
        assert_eq!(FieldKind::from_name("Name"), None);
    }

    #[test]
    fn test_wildcard_excludes_filter_only_fields() {
        assert!(!WILDCARD_FIELDS.contains(&FieldKind::Permission));
        assert!(!WILDCARD_FIELDS.contains(&FieldKind::Links));
        assert!(!WILDCARD_FIELDS.contains(&FieldKind::Type));
        assert_eq!(WILDCARD_FIELDS[0], FieldKind::Path);
        assert_eq!(WILDCARD_FIELDS[7], FieldKind::FileSize);
    }

    #[test]
    fn test_orderable() {
        assert!(FieldKind::FileSize.is_orderable());
        assert!(FieldKind::LastMod.is_orderable());
        assert!(FieldKind::CreateDt.is_orderable());
        assert!(!FieldKind::Owner.is_orderable());
        assert!(!FieldKind::Name.is_orderable());
    }

    #[test]
    fn test_labels() {
        assert_eq!(FieldKind::LastMod.label(), "Last Mod");
        assert_eq!(FieldKind::CreateDt.label(), "Created");
        assert_eq!(FieldKind::Extension.label(), "Ext.");
    }

    #[test]
    fn test_known_names() {
        assert!(is_known_name("*"));
        assert!(is_known_name("createdt"));
        assert!(!is_known_name("color"));
    }
}
