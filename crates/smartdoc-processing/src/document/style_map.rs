//! Declarative mapping from document styles to HTML elements.
//!
//! The default map, in its textual form:
//!
//! ```text
//! p[style-name='Heading 1'] => h1
//! p[style-name='Heading 2'] => h2
//! p[style-name='Heading 3'] => h3
//! p[style-name='Heading 4'] => h4
//! p[style-name='Heading 5'] => h5
//! p[style-name='Heading 6'] => h6
//! b => strong
//! i => em
//! u => u
//! strike => s
//! ```

use std::fmt;

/// Which document construct a mapping applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleMatcher {
    /// Paragraph whose style name equals this value (ASCII case-insensitive)
    Paragraph { style_name: &'static str },
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleMapping {
    pub matcher: StyleMatcher,
    pub tag: &'static str,
}

const fn paragraph(style_name: &'static str, tag: &'static str) -> StyleMapping {
    StyleMapping {
        matcher: StyleMatcher::Paragraph { style_name },
        tag,
    }
}

const fn run(matcher: StyleMatcher, tag: &'static str) -> StyleMapping {
    StyleMapping { matcher, tag }
}

pub const DEFAULT_STYLE_MAP: &[StyleMapping] = &[
    paragraph("Heading 1", "h1"),
    paragraph("Heading 2", "h2"),
    paragraph("Heading 3", "h3"),
    paragraph("Heading 4", "h4"),
    paragraph("Heading 5", "h5"),
    paragraph("Heading 6", "h6"),
    run(StyleMatcher::Bold, "strong"),
    run(StyleMatcher::Italic, "em"),
    run(StyleMatcher::Underline, "u"),
    run(StyleMatcher::Strikethrough, "s"),
];

/// An immutable style map. Cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct StyleMap {
    mappings: &'static [StyleMapping],
}

impl Default for StyleMap {
    fn default() -> Self {
        Self::new(DEFAULT_STYLE_MAP)
    }
}

impl StyleMap {
    pub const fn new(mappings: &'static [StyleMapping]) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &'static [StyleMapping] {
        self.mappings
    }

    /// Element for a paragraph with the given style name, if the map names one.
    pub fn paragraph_tag(&self, style_name: &str) -> Option<&'static str> {
        self.mappings.iter().find_map(|m| match m.matcher {
            StyleMatcher::Paragraph { style_name: name } if name.eq_ignore_ascii_case(style_name) => {
                Some(m.tag)
            }
            _ => None,
        })
    }

    /// Element for a run-level toggle (bold, italic, ...).
    pub fn run_tag(&self, matcher: StyleMatcher) -> Option<&'static str> {
        self.mappings
            .iter()
            .find(|m| m.matcher == matcher)
            .map(|m| m.tag)
    }
}

impl fmt::Display for StyleMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selector = match self.matcher {
            StyleMatcher::Paragraph { style_name } => {
                return write!(f, "p[style-name='{}'] => {}", style_name, self.tag)
            }
            StyleMatcher::Bold => "b",
            StyleMatcher::Italic => "i",
            StyleMatcher::Underline => "u",
            StyleMatcher::Strikethrough => "strike",
        };
        write!(f, "{} => {}", selector, self.tag)
    }
}

impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mapping) in self.mappings.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", mapping)?;
        }
        Ok(())
    }
}
