//! Column identifier validation.
//!
//! Predicate columns and insert/update column names end up verbatim in the
//! rendered SQL, so they are checked once when a clause is assembled:
//!
//! - unquoted segments must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - quoted segments (`"Like This"`) may hold anything but NUL, with `""` as an escaped quote
//! - segments are joined by `.` (`schema.table.column`)

use crate::error::{QeError, QeResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Bare(String),
    Quoted(String),
}

/// A validated SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    segments: Vec<Segment>,
}

impl Ident {
    /// Parse and validate an identifier.
    pub fn parse(input: &str) -> QeResult<Self> {
        if input.is_empty() {
            return Err(QeError::validation("identifier cannot be empty"));
        }
        if input.contains('\0') {
            return Err(QeError::validation("identifier cannot contain NUL"));
        }

        let mut segments = Vec::new();
        let mut rest = input;
        loop {
            let (segment, tail) = if let Some(quoted) = rest.strip_prefix('"') {
                parse_quoted(quoted, input)?
            } else {
                parse_bare(rest, input)?
            };
            segments.push(segment);

            if tail.is_empty() {
                break;
            }
            rest = tail.strip_prefix('.').ok_or_else(|| {
                QeError::validation(format!("expected '.' between parts of '{input}'"))
            })?;
            if rest.is_empty() {
                return Err(QeError::validation(format!("trailing '.' in '{input}'")));
            }
        }

        Ok(Self { segments })
    }

    /// Render the identifier as it appears in SQL.
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

fn parse_bare<'a>(s: &'a str, whole: &str) -> QeResult<(Segment, &'a str)> {
    let end = s.find('.').unwrap_or(s.len());
    let name = &s[..end];
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        Some(c) => {
            return Err(QeError::validation(format!(
                "invalid start character '{c}' in '{whole}'"
            )));
        }
        None => return Err(QeError::validation(format!("empty segment in '{whole}'"))),
    }
    if let Some(bad) = chars.find(|c| !(*c == '_' || *c == '$' || c.is_ascii_alphanumeric())) {
        return Err(QeError::validation(format!(
            "invalid character '{bad}' in '{whole}'"
        )));
    }
    Ok((Segment::Bare(name.to_string()), &s[end..]))
}

fn parse_quoted<'a>(s: &'a str, whole: &str) -> QeResult<(Segment, &'a str)> {
    let mut name = String::new();
    let mut iter = s.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        if c != '"' {
            name.push(c);
            continue;
        }
        if matches!(iter.peek(), Some((_, '"'))) {
            iter.next();
            name.push('"');
            continue;
        }
        if name.is_empty() {
            return Err(QeError::validation(format!("empty quoted segment in '{whole}'")));
        }
        return Ok((Segment::Quoted(name), &s[i + 1..]));
    }
    Err(QeError::validation(format!("unclosed quote in '{whole}'")))
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Bare(s) => f.write_str(s)?,
                Segment::Quoted(s) => write!(f, "\"{}\"", s.replace('"', "\"\""))?,
            }
        }
        Ok(())
    }
}
