//! Length normalization for attribute values
//!
//! Some CAD exporters write lengths with a space between the number and the
//! unit literal (`"0.35 px"`). CSS and SVG require the unit to follow the
//! number directly, so such values are collapsed to `"0.35px"`.
//!
//! Only a value that is exactly one length is touched. Anything else,
//! including malformed numbers and compound values, passes through verbatim.

use std::borrow::Cow;
use std::fmt;

use logos::Logos;

/// Absolute length units recognized by the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Cm,
    Mm,
    Q,
    In,
    Pc,
    Pt,
    Px,
}

impl Unit {
    /// Every recognized unit
    pub const ALL: [Unit; 7] = [
        Unit::Cm,
        Unit::Mm,
        Unit::Q,
        Unit::In,
        Unit::Pc,
        Unit::Pt,
        Unit::Px,
    ];

    /// The unit literal as written in CSS
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::Q => "Q",
            Unit::In => "in",
            Unit::Pc => "pc",
            Unit::Pt => "pt",
            Unit::Px => "px",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens of a single length value. Whitespace between tokens is skipped,
/// everything else that isn't a number or a unit is a lexer error.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"\s+")]
enum LengthToken {
    // CSS <number>: optional sign, integer or digits after a dot, optional
    // exponent. The alternatives must not share an optional prefix, the
    // lexer does not backtrack out of one.
    #[regex(r"[+-]?([0-9]+|[0-9]*\.[0-9]+)([Ee][+-]?[0-9]+)?")]
    Number,

    #[token("cm", |_| Unit::Cm)]
    #[token("mm", |_| Unit::Mm)]
    #[token("Q", |_| Unit::Q)]
    #[token("in", |_| Unit::In)]
    #[token("pc", |_| Unit::Pc)]
    #[token("pt", |_| Unit::Pt)]
    #[token("px", |_| Unit::Px)]
    Unit(Unit),
}

/// Unicode `White_Space`, the same set as `\s` in the skip pattern of [`LengthToken`]
fn is_space(c: char) -> bool {
    c.is_whitespace()
}

/// Return the unit if `value` is exactly one number followed by a unit
///
/// Surrounding whitespace and whitespace between number and unit are allowed.
pub fn length_unit(value: &str) -> Option<Unit> {
    let mut lexer = LengthToken::lexer(value);
    match (lexer.next(), lexer.next(), lexer.next()) {
        (Some(Ok(LengthToken::Number)), Some(Ok(LengthToken::Unit(unit))), None) => Some(unit),
        _ => None,
    }
}

/// Whether `value` is exactly one length with a recognized unit
pub fn is_length(value: &str) -> bool {
    length_unit(value).is_some()
}

/// Remove all whitespace from a length value
///
/// Returns the input unchanged (borrowed) unless the whole string is a
/// single length, or when it already contains no whitespace.
pub fn normalize(value: &str) -> Cow<'_, str> {
    if !value.contains(is_space) || !is_length(value) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(value.chars().filter(|&c| !is_space(c)).collect())
}
