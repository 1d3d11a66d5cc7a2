//! Sanitizing of `style` attribute values
//!
//! `fill-rule` is an SVG presentation attribute, not a CSS property. Some
//! consumers reject a document that lists it inside `style`, so the
//! declaration is dropped.

use std::borrow::Cow;

/// Style properties removed by default
pub const DEFAULT_REMOVED_PROPERTIES: &[&str] = &["fill-rule"];

/// Remove `fill-rule` declarations from a style value
pub fn sanitize(value: &str) -> Cow<'_, str> {
    sanitize_with(value, DEFAULT_REMOVED_PROPERTIES)
}

/// Remove declarations starting with any of `removed` from a style value
///
/// The value is split on `;`. A declaration is dropped when its trimmed text
/// is empty or starts with one of the removed property names (case-sensitive).
/// Kept declarations are written back untrimmed, joined by `;` and followed
/// by a single trailing `;`. When nothing is kept the result is empty.
pub fn sanitize_with<'a, S: AsRef<str>>(value: &'a str, removed: &[S]) -> Cow<'a, str> {
    let kept: Vec<&str> = value
        .split(';')
        .filter(|decl| {
            let trimmed = decl.trim();
            !trimmed.is_empty() && !removed.iter().any(|p| trimmed.starts_with(p.as_ref()))
        })
        .collect();

    let mut result = kept.join(";");
    if !kept.is_empty() {
        result.push(';');
    }

    if result == value {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(result)
    }
}
