//! Allow-list HTML sanitizer.
//!
//! Disallowed elements are removed but their text is kept, except for `script`
//! and `style` whose content is dropped as well. Attributes outside the per-tag
//! and global allow-lists are removed, and `style` attributes are reduced to the
//! allowed CSS properties.

use ammonia::Builder;
use lightningcss::declaration::DeclarationBlock;
use lightningcss::properties::Property;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions};
use lightningcss::traits::ToCss;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

pub const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "b", "i", "u", "em", "strong", "a", "h1", "h2", "h3", "h4", "h5", "h6", "ul",
    "ol", "li", "blockquote", "pre", "code", "hr", "div", "span", "table", "thead", "tbody",
    "tr", "th", "td",
];

pub const ALLOWED_TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title"]),
    ("img", &["src", "alt", "title"]),
];

/// Attributes allowed on every element
pub const ALLOWED_GENERIC_ATTRIBUTES: &[&str] = &["class", "style"];

pub const ALLOWED_CSS_PROPERTIES: &[&str] = &[
    "text-align",
    "margin-left",
    "margin-right",
    "font-size",
    "font-family",
];

#[derive(Debug, thiserror::Error)]
pub enum SanitizationError {
    #[error("sanitized output is empty")]
    EmptyOutput,
}

pub struct HtmlSanitizer {
    builder: Builder<'static>,
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlSanitizer {
    pub fn new() -> Self {
        let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = ALLOWED_TAG_ATTRIBUTES
            .iter()
            .map(|(tag, attributes)| (*tag, attributes.iter().copied().collect()))
            .collect();

        let mut builder = Builder::default();
        builder
            .tags(ALLOWED_TAGS.iter().copied().collect())
            .tag_attributes(tag_attributes)
            .generic_attributes(ALLOWED_GENERIC_ATTRIBUTES.iter().copied().collect())
            .link_rel(None)
            .attribute_filter(|_element, attribute, value| {
                if attribute == "style" {
                    filter_style(value).map(Cow::Owned)
                } else {
                    Some(Cow::Borrowed(value))
                }
            });

        Self { builder }
    }

    /// Reduce `html` to the allowed subset.
    ///
    /// The HTML5 parser recovers from any input, so this never fails; an empty
    /// return value is for the caller to judge.
    pub fn sanitize(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

/// Keep only allowed CSS declarations. `None` drops the attribute entirely.
///
/// The declaration list is tokenized by a real CSS parser, so quoted values and
/// escapes never split a declaration. Survivors are re-serialized, not copied.
fn filter_style(value: &str) -> Option<String> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let mut block = DeclarationBlock::parse_string(value, options).ok()?;
    block.declarations.retain(is_allowed_declaration);
    block.important_declarations.retain(is_allowed_declaration);

    if block.declarations.is_empty() && block.important_declarations.is_empty() {
        return None;
    }
    block.to_css_string(PrinterOptions::default()).ok()
}

/// Allowed property with a value the parser fully understood. Untyped values
/// (functions, expressions, variables) are dropped.
fn is_allowed_declaration(property: &Property) -> bool {
    !matches!(property, Property::Unparsed(_) | Property::Custom(_))
        && ALLOWED_CSS_PROPERTIES.contains(&property.property_id().name())
}
