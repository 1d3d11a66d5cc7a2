//! Tree walk applying the attribute corrections to a whole document

use log::{debug, info};

use crate::document::{Document, Element};
use crate::error::FixupError;
use crate::length;
use crate::style::{self, DEFAULT_REMOVED_PROPERTIES};

/// Which corrections the fixup pass applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixupConfig {
    /// Collapse whitespace in length values of non-`style` attributes
    pub normalize_lengths: bool,
    /// Drop removed properties from `style` attributes
    pub sanitize_styles: bool,
    /// Style properties dropped from `style` attributes
    pub removed_style_properties: Vec<String>,
}

impl Default for FixupConfig {
    fn default() -> Self {
        Self {
            normalize_lengths: true,
            sanitize_styles: true,
            removed_style_properties: DEFAULT_REMOVED_PROPERTIES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl FixupConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable length normalization
    pub fn with_normalize_lengths(mut self, enabled: bool) -> Self {
        self.normalize_lengths = enabled;
        self
    }

    /// Enable or disable style sanitizing
    pub fn with_sanitize_styles(mut self, enabled: bool) -> Self {
        self.sanitize_styles = enabled;
        self
    }

    /// Also drop `property` from `style` attributes
    pub fn with_removed_style_property(mut self, property: impl Into<String>) -> Self {
        let property = property.into();
        if !self.removed_style_properties.contains(&property) {
            self.removed_style_properties.push(property);
        }
        self
    }

    /// Stop dropping `property` from `style` attributes
    pub fn without_removed_style_property(mut self, property: &str) -> Self {
        self.removed_style_properties.retain(|p| p != property);
        self
    }

    /// Compute the corrected value of one attribute
    ///
    /// `style` goes through the style sanitizer, every other attribute through
    /// the length normalizer. Returns `None` when the value stays the same.
    pub fn rewrite(&self, name: &str, value: &str) -> Option<String> {
        let rewritten = if name == "style" {
            if !self.sanitize_styles {
                return None;
            }
            style::sanitize_with(value, self.removed_style_properties.as_slice())
        } else {
            if !self.normalize_lengths {
                return None;
            }
            length::normalize(value)
        };

        (rewritten != value).then(|| rewritten.into_owned())
    }
}

/// Counts of what a fixup pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixupReport {
    /// Elements visited
    pub elements: usize,
    pub lengths_normalized: usize,
    pub styles_sanitized: usize,
}

impl FixupReport {
    /// Total number of rewritten attributes
    pub fn changed(&self) -> usize {
        self.lengths_normalized + self.styles_sanitized
    }
}

/// Apply the default corrections to every element of `document`
pub fn fixup(document: &mut Document) {
    fixup_with(document, &FixupConfig::default());
}

/// Apply the configured corrections to every element, in document order
pub fn fixup_with(document: &mut Document, config: &FixupConfig) -> FixupReport {
    let mut report = FixupReport::default();
    document.visit_elements_mut(|element| {
        report.elements += 1;
        fixup_element_counted(element, config, &mut report);
    });
    info!(
        "fixup: {} elements, {} lengths normalized, {} styles sanitized",
        report.elements, report.lengths_normalized, report.styles_sanitized
    );
    report
}

/// Apply the configured corrections to one element's attributes
///
/// Returns the number of attributes whose value changed. Attribute keys and
/// their order are left alone.
pub fn fixup_element(element: &mut Element, config: &FixupConfig) -> usize {
    let mut report = FixupReport::default();
    fixup_element_counted(element, config, &mut report);
    report.changed()
}

fn fixup_element_counted(element: &mut Element, config: &FixupConfig, report: &mut FixupReport) {
    // Compute all replacements against a snapshot, then write them back
    let replacements: Vec<(usize, String)> = element
        .attributes
        .iter()
        .enumerate()
        .filter(|(_, attr)| !attr.is_namespace_declaration())
        .filter_map(|(i, attr)| config.rewrite(&attr.name, &attr.value).map(|v| (i, v)))
        .collect();

    for (i, value) in replacements {
        let attr = &mut element.attributes[i];
        debug!(
            "<{}> {}: {:?} -> {:?}",
            element.name, attr.name, attr.value, value
        );
        if attr.name == "style" {
            report.styles_sanitized += 1;
        } else {
            report.lengths_normalized += 1;
        }
        attr.value = value;
    }
}

/// Parse `source`, apply the corrections and serialize the result
pub fn fixup_svg(source: &str, config: &FixupConfig) -> Result<(String, FixupReport), FixupError> {
    let mut document = Document::parse(source)?;
    let report = fixup_with(&mut document, config);
    let output = document.to_xml()?;
    Ok((output, report))
}
