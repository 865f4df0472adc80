//! Test fixtures: in-memory .docx documents.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/></w:style>
</w:styles>"#;

/// A .docx whose `w:body` is `body`.
pub fn docx_with_body(body: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(b"<?xml version=\"1.0\"?><Types/>").unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.start_file("word/styles.xml", options).unwrap();
    zip.write_all(STYLES_XML.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// "Title" as Heading 1 followed by a plain "Body text" paragraph.
pub fn heading_and_body_docx() -> Vec<u8> {
    docx_with_body(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>
           <w:p><w:r><w:t>Body text</w:t></w:r></w:p>"#,
    )
}

/// A valid document with no paragraphs at all.
pub fn empty_docx() -> Vec<u8> {
    docx_with_body("<w:sectPr/>")
}

/// Starts with the ZIP signature but is not a readable archive.
pub fn corrupt_docx() -> Vec<u8> {
    let mut data = b"PK\x03\x04".to_vec();
    data.extend_from_slice(&[0u8; 64]);
    data
}
