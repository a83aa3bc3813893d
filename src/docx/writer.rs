//! Minimal WordprocessingML package writer.

use std::borrow::Cow;
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::model::{Document, Paragraph};

use super::options::DocxOptions;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const MIME_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const MIME_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const MIME_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const MIME_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

type XmlWriter = Writer<Vec<u8>>;

/// Writes a [`Document`] as a `.docx` package.
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    options: DocxOptions,
}

impl DocxWriter {
    /// Create a writer with the given options.
    pub fn new(options: DocxOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &DocxOptions {
        &self.options
    }

    /// Write the document to a file.
    pub fn write_to_path(&self, document: &Document, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes(document)?;
        std::fs::write(path.as_ref(), bytes)?;
        log::info!(
            "Wrote {} paragraphs to {}",
            document.paragraph_count(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Serialize the document to an in-memory `.docx` package.
    pub fn to_bytes(&self, document: &Document) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts = [
            ("[Content_Types].xml", content_types_xml()?),
            ("_rels/.rels", package_rels_xml()?),
            ("docProps/core.xml", core_xml(document)?),
            ("word/_rels/document.xml.rels", document_rels_xml()?),
            ("word/styles.xml", self.styles_xml()?),
            ("word/document.xml", self.document_xml(document)?),
        ];

        for (name, data) in parts {
            zip.start_file(name, options)?;
            zip.write_all(&data)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Build `word/document.xml`.
    pub fn document_xml(&self, document: &Document) -> Result<Vec<u8>> {
        let mut w = new_writer()?;
        w.write_event(Event::Start(
            BytesStart::new("w:document").with_attributes([("xmlns:w", NS_W)]),
        ))?;
        w.write_event(Event::Start(BytesStart::new("w:body")))?;

        let mut previous_page = None;
        for paragraph in &document.paragraphs {
            let page_break = self.options.page_breaks
                && previous_page.is_some_and(|page| page != paragraph.page);
            self.write_paragraph(&mut w, paragraph, page_break)?;
            previous_page = Some(paragraph.page);
        }

        w.write_event(Event::Empty(BytesStart::new("w:sectPr")))?;
        w.write_event(Event::End(BytesEnd::new("w:body")))?;
        w.write_event(Event::End(BytesEnd::new("w:document")))?;
        Ok(w.into_inner())
    }

    fn write_paragraph(
        &self,
        w: &mut XmlWriter,
        paragraph: &Paragraph,
        page_break: bool,
    ) -> Result<()> {
        let rtl = paragraph.is_rtl();

        w.write_event(Event::Start(BytesStart::new("w:p")))?;
        w.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        if page_break {
            w.write_event(Event::Empty(BytesStart::new("w:pageBreakBefore")))?;
        }
        if rtl {
            w.write_event(Event::Empty(BytesStart::new("w:bidi")))?;
            w.write_event(Event::Empty(
                BytesStart::new("w:jc").with_attributes([("w:val", "right")]),
            ))?;
        }
        w.write_event(Event::End(BytesEnd::new("w:pPr")))?;

        let lines = paragraph.line_texts();
        if self.options.keep_line_breaks {
            for (i, line) in lines.iter().enumerate() {
                self.write_run(w, line, rtl, i > 0)?;
            }
        } else {
            self.write_run(w, &lines.join(" "), rtl, false)?;
        }

        w.write_event(Event::End(BytesEnd::new("w:p")))?;
        Ok(())
    }

    fn write_run(&self, w: &mut XmlWriter, text: &str, rtl: bool, line_break: bool) -> Result<()> {
        w.write_event(Event::Start(BytesStart::new("w:r")))?;
        if rtl {
            w.write_event(Event::Start(BytesStart::new("w:rPr")))?;
            w.write_event(Event::Empty(BytesStart::new("w:rtl")))?;
            w.write_event(Event::End(BytesEnd::new("w:rPr")))?;
        }
        if line_break {
            w.write_event(Event::Empty(BytesStart::new("w:br")))?;
        }
        w.write_event(Event::Start(
            BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
        ))?;
        w.write_event(Event::Text(BytesText::new(&xml_chars(text))))?;
        w.write_event(Event::End(BytesEnd::new("w:t")))?;
        w.write_event(Event::End(BytesEnd::new("w:r")))?;
        Ok(())
    }

    /// Build `word/styles.xml` with the default run font and size.
    fn styles_xml(&self) -> Result<Vec<u8>> {
        let size = self.options.half_points().to_string();
        let font = self.options.font.as_str();
        let cs_font = self.options.cs_font();

        let mut w = new_writer()?;
        w.write_event(Event::Start(
            BytesStart::new("w:styles").with_attributes([("xmlns:w", NS_W)]),
        ))?;
        w.write_event(Event::Start(BytesStart::new("w:docDefaults")))?;
        w.write_event(Event::Start(BytesStart::new("w:rPrDefault")))?;
        w.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        w.write_event(Event::Empty(BytesStart::new("w:rFonts").with_attributes([
            ("w:ascii", font),
            ("w:hAnsi", font),
            ("w:cs", cs_font),
        ])))?;
        w.write_event(Event::Empty(
            BytesStart::new("w:sz").with_attributes([("w:val", size.as_str())]),
        ))?;
        w.write_event(Event::Empty(
            BytesStart::new("w:szCs").with_attributes([("w:val", size.as_str())]),
        ))?;
        w.write_event(Event::End(BytesEnd::new("w:rPr")))?;
        w.write_event(Event::End(BytesEnd::new("w:rPrDefault")))?;
        w.write_event(Event::End(BytesEnd::new("w:docDefaults")))?;

        w.write_event(Event::Start(BytesStart::new("w:style").with_attributes([
            ("w:type", "paragraph"),
            ("w:default", "1"),
            ("w:styleId", "Normal"),
        ])))?;
        w.write_event(Event::Empty(
            BytesStart::new("w:name").with_attributes([("w:val", "Normal")]),
        ))?;
        w.write_event(Event::End(BytesEnd::new("w:style")))?;
        w.write_event(Event::End(BytesEnd::new("w:styles")))?;
        Ok(w.into_inner())
    }
}

fn new_writer() -> Result<XmlWriter> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(w)
}

fn content_types_xml() -> Result<Vec<u8>> {
    let mut w = new_writer()?;
    w.write_event(Event::Start(
        BytesStart::new("Types").with_attributes([("xmlns", NS_CONTENT_TYPES)]),
    ))?;
    for (extension, mime) in [("rels", MIME_RELS), ("xml", "application/xml")] {
        w.write_event(Event::Empty(BytesStart::new("Default").with_attributes([
            ("Extension", extension),
            ("ContentType", mime),
        ])))?;
    }
    for (part, mime) in [
        ("/word/document.xml", MIME_DOCUMENT),
        ("/word/styles.xml", MIME_STYLES),
        ("/docProps/core.xml", MIME_CORE),
    ] {
        w.write_event(Event::Empty(BytesStart::new("Override").with_attributes([
            ("PartName", part),
            ("ContentType", mime),
        ])))?;
    }
    w.write_event(Event::End(BytesEnd::new("Types")))?;
    Ok(w.into_inner())
}

fn relationships_xml(relationships: &[(&str, &str, &str)]) -> Result<Vec<u8>> {
    let mut w = new_writer()?;
    w.write_event(Event::Start(
        BytesStart::new("Relationships").with_attributes([("xmlns", NS_PKG_RELS)]),
    ))?;
    for &(id, kind, target) in relationships {
        w.write_event(Event::Empty(BytesStart::new("Relationship").with_attributes([
            ("Id", id),
            ("Type", kind),
            ("Target", target),
        ])))?;
    }
    w.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(w.into_inner())
}

fn package_rels_xml() -> Result<Vec<u8>> {
    relationships_xml(&[
        ("rId1", REL_OFFICE_DOCUMENT, "word/document.xml"),
        ("rId2", REL_CORE_PROPERTIES, "docProps/core.xml"),
    ])
}

fn document_rels_xml() -> Result<Vec<u8>> {
    relationships_xml(&[("rId1", REL_STYLES, "styles.xml")])
}

fn core_xml(document: &Document) -> Result<Vec<u8>> {
    let metadata = &document.metadata;
    let created = metadata
        .created
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    let language = metadata.language.primary().code().to_string();

    let mut w = new_writer()?;
    w.write_event(Event::Start(BytesStart::new("cp:coreProperties").with_attributes([
        (
            "xmlns:cp",
            "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
        ),
        ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
        ("xmlns:dcterms", "http://purl.org/dc/terms/"),
        ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ])))?;

    if let Some(title) = &metadata.title {
        text_element(&mut w, BytesStart::new("dc:title"), title)?;
    }
    text_element(&mut w, BytesStart::new("dc:language"), &language)?;
    text_element(&mut w, BytesStart::new("dc:creator"), "kurdocx")?;
    text_element(
        &mut w,
        BytesStart::new("dcterms:created").with_attributes([("xsi:type", "dcterms:W3CDTF")]),
        &created,
    )?;

    w.write_event(Event::End(BytesEnd::new("cp:coreProperties")))?;
    Ok(w.into_inner())
}

fn text_element(w: &mut XmlWriter, start: BytesStart<'_>, text: &str) -> Result<()> {
    let end = start.to_end().into_owned();
    w.write_event(Event::Start(start))?;
    w.write_event(Event::Text(BytesText::new(&xml_chars(text))))?;
    w.write_event(Event::End(end))?;
    Ok(())
}

/// Drop characters outside the XML 1.0 `Char` production.
///
/// quick-xml escapes markup but passes C0 controls through, and Word
/// refuses to open a part that contains them.
fn xml_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{FFFE}' | '\u{FFFF}' => false,
        c => c >= '\u{20}',
    }
}
