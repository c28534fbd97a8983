//! Hostname-pattern templates
//!
//! A template is a format string mixing literal path characters with `%`
//! specifiers that select pieces of a dot-separated hostname, e.g.
//! `/var/www/%0/htdocs` or `/srv/%-1/%1`. Templates are validated when
//! parsed; a [`Template`] value that exists is always well-formed.
//!
//! Specifier syntax: `% ['-'] digit ['+'] ['.' ['-'] digit ['+']]`. The
//! first digit selects a hostname label (1-based, `0` for the whole name),
//! `-` counts from the end, `+` extends the selection to the end. The
//! optional `.digit` applies the same rule to characters within the
//! selected label. There is no escape sequence for a literal `%`.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

mod interpolate;

pub use interpolate::PathOverflow;

/// Interpolated paths are capped at this many bytes; templates whose
/// expansion would exceed it fail for that request.
pub const MAX_PATH_LEN: usize = 512;

/// Error raised while parsing a malformed template string.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("syntax error in format string: expected digit at byte {offset}")]
pub struct TemplateSyntaxError {
    /// Byte offset of the character that should have been a digit.
    pub offset: usize,
}

/// One index inside a specifier, either the label or the character part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Index {
    /// Count from the end of the hostname (or label) instead of the start.
    pub(crate) from_end: bool,
    /// Open range: extend the selection to the end.
    pub(crate) open: bool,
    /// Single-digit 1-based position; `0` selects the whole unit.
    pub(crate) value: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Specifier {
        primary: Index,
        secondary: Option<Index>,
    },
}

/// A validated hostname-pattern template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse and validate a template string.
    ///
    /// Any `%` not followed by `['-'] digit` (in either the primary or the
    /// secondary position) is a syntax error, and the whole template is
    /// rejected. Index reachability is not checked here; an index that a
    /// given hostname cannot satisfy becomes a `_` placeholder at
    /// interpolation time.
    pub fn parse(raw: &str) -> Result<Self, TemplateSyntaxError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let primary = parse_index(&mut chars, raw.len())?;
            let secondary = if matches!(chars.peek(), Some((_, '.'))) {
                chars.next();
                Some(parse_index(&mut chars, raw.len())?)
            } else {
                None
            };
            segments.push(Segment::Specifier { primary, secondary });
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The template source string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Check a template string without keeping the parsed form.
pub fn validate(raw: &str) -> Result<(), TemplateSyntaxError> {
    Template::parse(raw).map(|_| ())
}

fn parse_index(
    chars: &mut Peekable<CharIndices<'_>>,
    end: usize,
) -> Result<Index, TemplateSyntaxError> {
    let mut from_end = false;
    if matches!(chars.peek(), Some((_, '-'))) {
        chars.next();
        from_end = true;
    }
    let value = match chars.next() {
        Some((_, d)) if d.is_ascii_digit() => d as u8 - b'0',
        Some((offset, _)) => return Err(TemplateSyntaxError { offset }),
        None => return Err(TemplateSyntaxError { offset: end }),
    };
    let mut open = false;
    if matches!(chars.peek(), Some((_, '+'))) {
        chars.next();
        open = true;
    }
    Ok(Index {
        from_end,
        open,
        value,
    })
}
