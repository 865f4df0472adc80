//! DOCX to HTML structural conversion.
//!
//! Reads `word/document.xml` (plus `word/styles.xml` for style names and
//! `word/_rels/document.xml.rels` for hyperlink targets) and walks the
//! paragraph/run structure, emitting one HTML element per non-empty paragraph.
//!
//! Only unreadable or corrupt input is an error. Anything the converter does not
//! understand (an unknown style, an embedded image) is skipped and reported as a
//! diagnostic message instead.

use crate::document::style_map::{StyleMap, StyleMatcher};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use smartdoc_core::{AppError, ConversionResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";

/// Upper bound for a single decompressed XML part.
const MAX_PART_SIZE: u64 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid .docx archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("document part {0} is missing")]
    MissingPart(&'static str),

    #[error("document part {part} is too large ({size} bytes)")]
    PartTooLarge { part: &'static str, size: u64 },

    #[error("malformed XML in {part}: {source}")]
    Xml {
        part: &'static str,
        #[source]
        source: quick_xml::Error,
    },

    #[error("document produced no content")]
    EmptyDocument,
}

impl ConversionError {
    /// True when the file itself vanished, e.g. reaped between lookup and read.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, ConversionError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        if err.is_missing_file() {
            return AppError::NotFound("File not found on server".to_string());
        }
        let message = match &err {
            ConversionError::EmptyDocument => "empty result",
            ConversionError::Io(_) => "document could not be read",
            _ => "document is not a valid .docx file",
        };
        AppError::conversion(message, err)
    }
}

/// Convert the document at `path`.
pub fn convert(path: &Path, style_map: &StyleMap) -> Result<ConversionResult, ConversionError> {
    let file = File::open(path)?;
    convert_reader(BufReader::new(file), style_map)
}

/// Convert a document from any seekable reader.
pub fn convert_reader<R: Read + Seek>(
    reader: R,
    style_map: &StyleMap,
) -> Result<ConversionResult, ConversionError> {
    let mut archive = ZipArchive::new(reader)?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or(ConversionError::MissingPart(DOCUMENT_PART))?;
    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_styles(&xml)?,
        None => StyleSheet::default(),
    };
    let relationships = match read_part(&mut archive, RELATIONSHIPS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };

    let mut walker = BodyWalker::new(style_map, &styles, &relationships);
    walker.walk(&document_xml)?;
    Ok(walker.finish())
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &'static str,
) -> Result<Option<String>, ConversionError> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if part.size() > MAX_PART_SIZE {
        return Err(ConversionError::PartTooLarge {
            part: name,
            size: part.size(),
        });
    }

    let mut content = String::with_capacity(part.size() as usize);
    part.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Extract an unescaped attribute value by key from an element
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(Result::ok)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// A toggle property (`<w:b/>`, `<w:i w:val="0"/>`) is on unless `w:val` turns it off.
fn toggle_is_on(e: &BytesStart) -> bool {
    match get_attr(e, b"w:val") {
        Some(v) => !matches!(v.as_str(), "0" | "false" | "off" | "none"),
        None => true,
    }
}

/// Style ids to display names, plus the document's default styles.
#[derive(Debug, Default)]
struct StyleSheet {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
    default_character: Option<String>,
}

impl StyleSheet {
    fn name(&self, style_id: &str) -> Option<&str> {
        self.names.get(style_id).map(String::as_str)
    }
}

fn parse_styles(xml: &str) -> Result<StyleSheet, ConversionError> {
    let mut sheet = StyleSheet::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut current_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:style" => {
                current_id = get_attr(&e, b"w:styleId");
                if let Some(id) = &current_id {
                    if get_attr(&e, b"w:default").as_deref() == Some("1") {
                        match get_attr(&e, b"w:type").as_deref() {
                            Some("paragraph") => sheet.default_paragraph = Some(id.clone()),
                            Some("character") => sheet.default_character = Some(id.clone()),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:name" => {
                if let (Some(id), Some(name)) = (&current_id, get_attr(&e, b"w:val")) {
                    sheet.names.insert(id.clone(), name);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:style" => current_id = None,
            Ok(Event::Eof) => break,
            Err(source) => {
                return Err(ConversionError::Xml {
                    part: STYLES_PART,
                    source,
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet)
}

/// External relationship ids (`rId7`) to their targets.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, ConversionError> {
    let mut relationships = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let external = get_attr(&e, b"TargetMode").as_deref() == Some("External");
                if let (true, Some(id), Some(target)) =
                    (external, get_attr(&e, b"Id"), get_attr(&e, b"Target"))
                {
                    relationships.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(source) => {
                return Err(ConversionError::Xml {
                    part: RELATIONSHIPS_PART,
                    source,
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

#[derive(Debug, Default)]
struct Paragraph {
    style_id: Option<String>,
    content: String,
}

#[derive(Debug, Default)]
struct Run {
    style_id: Option<String>,
    bold: bool,
    italic: bool,
    underline: bool,
    strike: bool,
    content: String,
}

#[derive(Debug, Default)]
struct Hyperlink {
    href: Option<String>,
    content: String,
}

struct BodyWalker<'a> {
    style_map: &'a StyleMap,
    styles: &'a StyleSheet,
    relationships: &'a HashMap<String, String>,
    html: String,
    messages: Vec<String>,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    hyperlink: Option<Hyperlink>,
    in_paragraph_props: bool,
    in_run_props: bool,
    in_text: bool,
    /// Depth inside a subtree whose events are ignored; 0 when walking normally.
    skip_depth: usize,
}

impl<'a> BodyWalker<'a> {
    fn new(
        style_map: &'a StyleMap,
        styles: &'a StyleSheet,
        relationships: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            style_map,
            styles,
            relationships,
            html: String::new(),
            messages: Vec::new(),
            paragraph: None,
            run: None,
            hyperlink: None,
            in_paragraph_props: false,
            in_run_props: false,
            in_text: false,
            skip_depth: 0,
        }
    }

    fn walk(&mut self, xml: &str) -> Result<(), ConversionError> {
        let mut reader = Reader::from_str(xml);
        // w:t with xml:space="preserve" relies on untrimmed text
        reader.trim_text(false);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(_)) if self.skip_depth > 0 => self.skip_depth += 1,
                Ok(Event::End(_)) if self.skip_depth > 0 => self.skip_depth -= 1,
                Ok(_) if self.skip_depth > 0 => {}
                Ok(Event::Start(e)) => self.handle_start(&e),
                Ok(Event::Empty(e)) => self.handle_empty(&e),
                Ok(Event::Text(e)) => {
                    if self.in_text {
                        let text = e.unescape().map_err(|source| ConversionError::Xml {
                            part: DOCUMENT_PART,
                            source,
                        })?;
                        if let Some(run) = self.run.as_mut() {
                            run.content.push_str(&escape(text.as_ref()));
                        }
                    }
                }
                Ok(Event::End(e)) => self.handle_end(e.name().as_ref()),
                Err(source) => {
                    return Err(ConversionError::Xml {
                        part: DOCUMENT_PART,
                        source,
                    })
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn handle_start(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:p" => self.paragraph = Some(Paragraph::default()),
            b"w:pPr" => self.in_paragraph_props = true,
            b"w:r" => self.run = Some(Run::default()),
            b"w:rPr" if self.run.is_some() => self.in_run_props = true,
            b"w:t" if self.run.is_some() => self.in_text = true,
            b"w:hyperlink" => {
                let href = get_attr(e, b"r:id")
                    .and_then(|id| self.relationships.get(&id).cloned())
                    .or_else(|| get_attr(e, b"w:anchor").map(|anchor| format!("#{}", anchor)));
                self.hyperlink = Some(Hyperlink {
                    href,
                    content: String::new(),
                });
            }
            b"w:tbl" => self.html.push_str("<table>"),
            b"w:tr" => self.html.push_str("<tr>"),
            b"w:tc" => self.html.push_str("<td>"),
            // Embedded content, text boxes included, is skipped as a whole.
            b"w:drawing" | b"w:pict" | b"w:object" => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                self.push_message(format!("Unsupported element omitted from preview: {}", name));
                self.skip_depth = 1;
            }
            // Only the fallback of an alternate-content block is walked.
            b"mc:Choice" => self.skip_depth = 1,
            // Toggles and styles may also be written as start/end pairs.
            _ => self.handle_property(e),
        }
    }

    fn handle_empty(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:br" if self.run.is_some() => {
                let break_type = get_attr(e, b"w:type");
                if matches!(break_type.as_deref(), None | Some("textWrapping")) {
                    self.push_run_text("<br />");
                }
            }
            b"w:tab" if self.run.is_some() && !self.in_run_props => self.push_run_text("\t"),
            b"w:tc" => self.html.push_str("<td></td>"),
            b"w:drawing" | b"w:pict" | b"w:object" => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                self.push_message(format!("Unsupported element omitted from preview: {}", name));
            }
            _ => self.handle_property(e),
        }
    }

    fn handle_property(&mut self, e: &BytesStart) {
        if self.in_paragraph_props && e.name().as_ref() == b"w:pStyle" {
            if let Some(paragraph) = self.paragraph.as_mut() {
                paragraph.style_id = get_attr(e, b"w:val");
            }
            return;
        }

        if !self.in_run_props {
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };
        match e.name().as_ref() {
            b"w:b" => run.bold = toggle_is_on(e),
            b"w:i" => run.italic = toggle_is_on(e),
            b"w:u" => run.underline = toggle_is_on(e),
            b"w:strike" | b"w:dstrike" => run.strike = toggle_is_on(e),
            b"w:rStyle" => run.style_id = get_attr(e, b"w:val"),
            _ => {}
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"w:pPr" => self.in_paragraph_props = false,
            b"w:rPr" => self.in_run_props = false,
            b"w:t" => self.in_text = false,
            b"w:r" => self.finish_run(),
            b"w:hyperlink" => self.finish_hyperlink(),
            b"w:p" => self.finish_paragraph(),
            b"w:tc" => self.html.push_str("</td>"),
            b"w:tr" => self.html.push_str("</tr>"),
            b"w:tbl" => self.html.push_str("</table>"),
            _ => {}
        }
    }

    fn push_run_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.content.push_str(text);
        }
    }

    fn push_message(&mut self, message: String) {
        if !self.messages.contains(&message) {
            self.messages.push(message);
        }
    }

    fn finish_run(&mut self) {
        self.in_run_props = false;
        self.in_text = false;
        let Some(run) = self.run.take() else {
            return;
        };

        if let Some(style_id) = run.style_id.as_deref() {
            if self.styles.default_character.as_deref() != Some(style_id) {
                let name = self.styles.name(style_id).unwrap_or(style_id).to_string();
                self.push_message(format!(
                    "Unrecognised run style: '{}' (Style ID: {})",
                    name, style_id
                ));
            }
        }

        if run.content.is_empty() {
            return;
        }

        // Innermost first, so bold ends up outermost.
        let mut html = run.content;
        for (enabled, matcher) in [
            (run.strike, StyleMatcher::Strikethrough),
            (run.underline, StyleMatcher::Underline),
            (run.italic, StyleMatcher::Italic),
            (run.bold, StyleMatcher::Bold),
        ] {
            if !enabled {
                continue;
            }
            if let Some(tag) = self.style_map.run_tag(matcher) {
                html = format!("<{tag}>{html}</{tag}>");
            }
        }

        if let Some(hyperlink) = self.hyperlink.as_mut() {
            hyperlink.content.push_str(&html);
        } else if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.content.push_str(&html);
        }
    }

    fn finish_hyperlink(&mut self) {
        let Some(hyperlink) = self.hyperlink.take() else {
            return;
        };
        if hyperlink.content.is_empty() {
            return;
        }
        let html = match hyperlink.href {
            Some(href) => format!("<a href=\"{}\">{}</a>", escape(href.as_str()), hyperlink.content),
            None => hyperlink.content,
        };
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.content.push_str(&html);
        }
    }

    fn finish_paragraph(&mut self) {
        self.in_paragraph_props = false;
        let Some(paragraph) = self.paragraph.take() else {
            return;
        };
        if paragraph.content.is_empty() {
            return;
        }

        let tag = self.paragraph_tag(paragraph.style_id.as_deref());
        self.html
            .push_str(&format!("<{tag}>{}</{tag}>", paragraph.content));
    }

    fn paragraph_tag(&mut self, style_id: Option<&str>) -> &'static str {
        let Some(style_id) = style_id else {
            return "p";
        };
        let style_name = self.styles.name(style_id).unwrap_or(style_id).to_string();
        if let Some(tag) = self.style_map.paragraph_tag(&style_name) {
            return tag;
        }
        if self.styles.default_paragraph.as_deref() != Some(style_id) {
            self.push_message(format!(
                "Unrecognised paragraph style: '{}' (Style ID: {})",
                style_name, style_id
            ));
        }
        "p"
    }

    fn finish(self) -> ConversionResult {
        ConversionResult {
            html: self.html,
            messages: self.messages,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
  <w:style w:type="paragraph" w:styleId="BodyText"><w:name w:val="Body Text"/></w:style>
  <w:style w:type="character" w:default="1" w:styleId="DefaultParagraphFont"><w:name w:val="Default Paragraph Font"/></w:style>
  <w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/></w:style>
</w:styles>"#;

    /// Build an in-memory .docx with the given `w:body` content.
    pub(crate) fn build_docx(body: &str) -> Vec<u8> {
        build_docx_with_rels(body, None)
    }

    pub(crate) fn build_docx_with_rels(body: &str, rels: Option<&str>) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}</w:body></w:document>"#,
            body
        );

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<?xml version=\"1.0\"?><Types/>").unwrap();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        zip.start_file(STYLES_PART, options).unwrap();
        zip.write_all(STYLES_XML.as_bytes()).unwrap();
        if let Some(rels) = rels {
            zip.start_file(RELATIONSHIPS_PART, options).unwrap();
            zip.write_all(rels.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn convert_body(body: &str) -> ConversionResult {
        convert_reader(Cursor::new(build_docx(body)), &StyleMap::default()).unwrap()
    }

    #[test]
    fn test_heading_and_plain_paragraph() {
        let result = convert_body(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>
               <w:p><w:r><w:t>Body text</w:t></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<h1>Title</h1><p>Body text</p>");
        assert!(result.messages.is_empty());
    }

    #[test]
    fn test_run_formatting_maps_to_elements() {
        let result = convert_body(
            r#"<w:p>
                 <w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r>
                 <w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve"> italic </w:t></w:r>
                 <w:r><w:rPr><w:u w:val="single"/></w:rPr><w:t>under</w:t></w:r>
                 <w:r><w:rPr><w:strike/></w:rPr><w:t>gone</w:t></w:r>
               </w:p>"#,
        );
        assert_eq!(
            result.html,
            "<p><strong>bold</strong><em> italic </em><u>under</u><s>gone</s></p>"
        );
    }

    #[test]
    fn test_combined_toggles_nest_bold_outermost() {
        let result = convert_body(
            r#"<w:p><w:r><w:rPr><w:b/><w:i/></w:rPr><w:t>both</w:t></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<p><strong><em>both</em></strong></p>");
    }

    #[test]
    fn test_toggles_switched_off_by_val() {
        let result = convert_body(
            r#"<w:p><w:r><w:rPr><w:b w:val="0"/><w:i w:val="false"/><w:u w:val="none"/></w:rPr><w:t>plain</w:t></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<p>plain</p>");
    }

    #[test]
    fn test_empty_paragraphs_are_dropped() {
        let result = convert_body(
            r#"<w:p/><w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr></w:p>
               <w:p><w:r><w:t></w:t></w:r></w:p><w:p><w:r><w:t>kept</w:t></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<p>kept</p>");
    }

    #[test]
    fn test_zero_paragraphs_yield_empty_html() {
        let result = convert_body(r#"<w:sectPr/>"#);
        assert_eq!(result.html, "");
        assert!(result.messages.is_empty());
    }

    #[test]
    fn test_text_is_escaped() {
        let result = convert_body(
            r#"<w:p><w:r><w:t>&lt;script&gt;alert(1)&lt;/script&gt; &amp; more</w:t></w:r></w:p>"#,
        );
        assert_eq!(
            result.html,
            "<p>&lt;script&gt;alert(1)&lt;/script&gt; &amp; more</p>"
        );
    }

    #[test]
    fn test_unknown_paragraph_style_reports_message() {
        let result = convert_body(
            r#"<w:p><w:pPr><w:pStyle w:val="BodyText"/></w:pPr><w:r><w:t>one</w:t></w:r></w:p>
               <w:p><w:pPr><w:pStyle w:val="BodyText"/></w:pPr><w:r><w:t>two</w:t></w:r></w:p>
               <w:p><w:pPr><w:pStyle w:val="Normal"/></w:pPr><w:r><w:t>three</w:t></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<p>one</p><p>two</p><p>three</p>");
        assert_eq!(
            result.messages,
            vec!["Unrecognised paragraph style: 'Body Text' (Style ID: BodyText)".to_string()]
        );
    }

    #[test]
    fn test_breaks_and_tabs() {
        let result = convert_body(
            r#"<w:p><w:r><w:t>a</w:t><w:br/><w:t>b</w:t><w:tab/><w:t>c</w:t><w:br w:type="page"/></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<p>a<br />b\tc</p>");
    }

    #[test]
    fn test_external_hyperlink() {
        let rels = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;
        let body = r#"<w:p><w:hyperlink r:id="rId5"><w:r><w:rPr><w:rStyle w:val="Hyperlink"/></w:rPr><w:t>site</w:t></w:r></w:hyperlink></w:p>"#;
        let bytes = build_docx_with_rels(body, Some(rels));
        let result = convert_reader(Cursor::new(bytes), &StyleMap::default()).unwrap();
        assert_eq!(
            result.html,
            "<p><a href=\"https://example.com/?a=1&amp;b=2\">site</a></p>"
        );
        assert_eq!(
            result.messages,
            vec!["Unrecognised run style: 'Hyperlink' (Style ID: Hyperlink)".to_string()]
        );
    }

    #[test]
    fn test_tables_are_emitted() {
        let result = convert_body(
            r#"<w:tbl><w:tblPr/><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl>"#,
        );
        assert_eq!(
            result.html,
            "<table><tr><td><p>cell</p></td><td></td></tr></table>"
        );
    }

    #[test]
    fn test_drawing_reports_message() {
        let result = convert_body(
            r#"<w:p><w:r><w:drawing><wp:inline/></w:drawing></w:r><w:r><w:t>caption</w:t></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<p>caption</p>");
        assert_eq!(
            result.messages,
            vec!["Unsupported element omitted from preview: w:drawing".to_string()]
        );
    }

    #[test]
    fn test_text_box_is_omitted_without_losing_surrounding_runs() {
        let result = convert_body(
            r#"<w:p><w:r><w:t xml:space="preserve">before </w:t></w:r><w:r><w:pict><v:shape><v:textbox><w:txbxContent><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:txbxContent></v:textbox></v:shape></w:pict></w:r><w:r><w:t>after</w:t></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<p>before after</p>");
        assert_eq!(
            result.messages,
            vec!["Unsupported element omitted from preview: w:pict".to_string()]
        );
    }

    #[test]
    fn test_alternate_content_walks_fallback_only() {
        let result = convert_body(
            r#"<w:p><w:r><w:t>intro</w:t></w:r><w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><wp:anchor><a:graphic><a:graphicData><wps:wsp><wps:txbx><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent></wps:txbx></wps:wsp></a:graphicData></a:graphic></wp:anchor></w:drawing></mc:Choice><mc:Fallback><w:pict><v:shape><v:textbox><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent></v:textbox></v:shape></w:pict></mc:Fallback></mc:AlternateContent></w:r></w:p>
               <w:p><w:r><w:t>next</w:t></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<p>intro</p><p>next</p>");
        assert_eq!(
            result.messages,
            vec!["Unsupported element omitted from preview: w:pict".to_string()]
        );
    }

    #[test]
    fn test_table_inside_text_box_emits_nothing() {
        let result = convert_body(
            r#"<w:p><w:r><w:t>x</w:t></w:r><w:r><w:drawing><wps:txbx><w:txbxContent><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc><w:tc/></w:tr></w:tbl></w:txbxContent></wps:txbx></w:drawing></w:r></w:p>"#,
        );
        assert_eq!(result.html, "<p>x</p>");
        assert_eq!(
            result.messages,
            vec!["Unsupported element omitted from preview: w:drawing".to_string()]
        );
    }

    #[test]
    fn test_not_a_zip_is_invalid_archive() {
        let result = convert_reader(Cursor::new(b"plain text".to_vec()), &StyleMap::default());
        assert!(matches!(result, Err(ConversionError::InvalidArchive(_))));
    }

    #[test]
    fn test_zip_without_document_part() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("hello.txt", FileOptions::default()).unwrap();
        zip.write_all(b"hi").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let result = convert_reader(Cursor::new(bytes), &StyleMap::default());
        assert!(matches!(
            result,
            Err(ConversionError::MissingPart(DOCUMENT_PART))
        ));
    }

    #[test]
    fn test_malformed_document_xml() {
        let result = convert_reader(
            Cursor::new(build_docx("<w:p><w:r><w:t>unclosed</w:r></w:p>")),
            &StyleMap::default(),
        );
        assert!(matches!(result, Err(ConversionError::Xml { .. })));
    }

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err = convert(Path::new("/nonexistent/dir/file.docx"), &StyleMap::default())
            .unwrap_err();
        assert!(err.is_missing_file());
        assert!(matches!(AppError::from(err), AppError::NotFound(_)));
    }

    #[test]
    fn test_empty_document_maps_to_conversion_error() {
        let err = AppError::from(ConversionError::EmptyDocument);
        assert!(matches!(err, AppError::Conversion { .. }));
    }
}
