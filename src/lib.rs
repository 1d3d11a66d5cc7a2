//! Shaper SVG fixup - corrects SVG files exported by FreeCAD 0.18
//!
//! Two defects in the export are repaired so the file is accepted by
//! consumers that validate strictly:
//!
//! - length attributes written with a space between number and unit
//!   (`"0.35 px"`) are collapsed to `"0.35px"`
//! - the `fill-rule` declaration, which is not a CSS property, is removed
//!   from `style` attributes
//!
//! Everything else in the document is written back as it was parsed.
//!
//! # Example
//!
//! ```rust
//! use shaper_svg_fixup::{fixup_svg, FixupConfig};
//!
//! let source = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="0.35 px"/></svg>"#;
//! let (svg, report) = fixup_svg(source, &FixupConfig::default()).unwrap();
//! assert!(svg.contains(r#"width="0.35px""#));
//! assert_eq!(report.lengths_normalized, 1);
//! ```

pub mod document;
pub mod error;
pub mod fixup;
pub mod length;
pub mod style;

pub use document::{Attribute, Document, Element, Node, SVG_NAMESPACE};
pub use error::FixupError;
pub use fixup::{fixup, fixup_element, fixup_svg, fixup_with, FixupConfig, FixupReport};
pub use length::{is_length, normalize, Unit};
pub use style::{sanitize, sanitize_with};
