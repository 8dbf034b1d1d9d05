//! Character-level scanning over the raw query text.
//!
//! The cursor is the only thing that touches the query string directly.
//! It moves strictly left to right, one code point at a time.

/// Read position over a query string. `position` is a byte offset that
/// always sits on a char boundary, with `0 <= position <= size`.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    /// Current byte offset, used for diagnostics.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.position >= self.text.len()
    }

    /// Unconsumed input.
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    /// Next character without consuming it; `None` when out of input.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume and return the next character.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Literal match at the current position. Does not consume.
    pub fn starts_with(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    /// Case-insensitive keyword match at the current position. The keyword
    /// must not run on into further name characters (`FROMAGE` is not `FROM`).
    pub fn starts_with_keyword(&self, keyword: &str) -> bool {
        let rest = self.rest();
        let Some(head) = rest.get(..keyword.len()) else {
            return false;
        };
        head.eq_ignore_ascii_case(keyword)
            && !rest[keyword.len()..].chars().next().is_some_and(is_tag_char)
    }

    /// Consume `keyword` if it is next. Returns whether it was consumed.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.starts_with_keyword(keyword) {
            self.position += keyword.len();
            true
        } else {
            false
        }
    }

    /// Consume characters while `pred` holds, returning the consumed run
    /// (possibly empty).
    pub fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.position += c.len_utf8();
        }
        &self.text[start..self.position]
    }

    pub fn skip_whitespace(&mut self) {
        self.consume_while(is_whitespace);
    }

    /// The whitespace-delimited token at the current position, without
    /// consuming it. Used for error messages.
    pub fn peek_token(&self) -> &'a str {
        let rest = self.rest();
        let end = rest.find(is_whitespace).unwrap_or(rest.len());
        &rest[..end]
    }
}

// Lexical predicates

#[inline]
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Characters that can continue a keyword or identifier.
#[inline]
pub fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[inline]
pub fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Ends a bare field name in the SELECT list.
#[inline]
pub fn is_field_terminator(c: char) -> bool {
    c == '"' || c == ',' || is_whitespace(c)
}

/// Ends a source path in the FROM list.
#[inline]
pub fn is_path_terminator(c: char) -> bool {
    c == ',' || is_whitespace(c)
}

/// Ends the field name of a WHERE condition.
#[inline]
pub fn is_condition_separator(c: char) -> bool {
    matches!(c, '=' | '!' | '<' | '>') || is_whitespace(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_advance() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.advance(), Some('b'));
        assert!(cursor.at_end());
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.position(), cursor.size());
    }

    #[test]
    fn test_advance_multibyte() {
        let mut cursor = Cursor::new("é/x");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.rest(), "/x");
    }

    #[test]
    fn test_consume_while() {
        let mut cursor = Cursor::new("name, path");
        assert_eq!(cursor.consume_while(|c| !is_field_terminator(c)), "name");
        assert_eq!(cursor.consume_while(|c| !is_field_terminator(c)), "");
        assert_eq!(cursor.peek(), Some(','));
    }

    #[test]
    fn test_starts_with_does_not_consume() {
        let cursor = Cursor::new("FROM /tmp");
        assert!(cursor.starts_with("FROM"));
        assert!(!cursor.starts_with("from"));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_keyword_boundary() {
        assert!(Cursor::new("FROM /tmp").starts_with_keyword("FROM"));
        assert!(Cursor::new("from /tmp").starts_with_keyword("FROM"));
        assert!(Cursor::new("FROM").starts_with_keyword("FROM"));
        assert!(Cursor::new("FROM/tmp").starts_with_keyword("FROM"));
        assert!(!Cursor::new("FROMAGE").starts_with_keyword("FROM"));
        assert!(!Cursor::new("FRO").starts_with_keyword("FROM"));
    }

    #[test]
    fn test_peek_token() {
        let mut cursor = Cursor::new("  ON x");
        cursor.skip_whitespace();
        assert_eq!(cursor.peek_token(), "ON");
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_predicates() {
        assert!(is_whitespace('\t'));
        assert!(!is_whitespace('x'));
        assert!(is_quote('\''));
        assert!(is_condition_separator('!'));
        assert!(!is_condition_separator('_'));
        assert!(is_path_terminator(','));
        assert!(!is_path_terminator('/'));
    }
}
