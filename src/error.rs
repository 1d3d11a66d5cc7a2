//! Error types for reading, parsing and writing documents

use std::io;
use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors that can occur while fixing up a document
///
/// Attribute values never produce errors; they pass through unchanged when
/// they can't be rewritten.
#[derive(Error, Debug)]
pub enum FixupError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("element <{name}> is never closed")]
    UnclosedElement { name: String, position: usize },

    #[error("document has no root element")]
    NoRootElement,

    #[error("junk after document element at byte {position}")]
    MultipleRoots { position: usize },

    #[error("text outside of the root element at byte {position}")]
    TextOutsideRoot { position: usize },

    #[error("failed to serialize document: {0}")]
    Serialize(#[source] io::Error),
}

impl FixupError {
    /// Byte span in the source document, if the error has a location
    pub fn span(&self) -> Option<Span> {
        match self {
            FixupError::Xml { position, .. }
            | FixupError::UnclosedElement { position, .. }
            | FixupError::MultipleRoots { position }
            | FixupError::TextOutsideRoot { position } => Some(*position..*position + 1),
            _ => None,
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// Errors without a location in `source` are formatted with `Display`.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span() else {
            return self.to_string();
        };
        // ariadne counts characters, not bytes
        let span = char_offset(source, span.start)..char_offset(source, span.end);

        let message = self.to_string();
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => message,
        }
    }
}

/// Number of characters starting before byte `position`, clamped to the end
fn char_offset(source: &str, position: usize) -> usize {
    source
        .char_indices()
        .take_while(|(i, _)| *i < position)
        .count()
}
