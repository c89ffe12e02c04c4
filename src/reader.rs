//! Docx document reader: turns an uploaded `.docx` byte buffer into the
//! ordered `RawParagraph` sequence the extraction core consumes.
//!
//! A `.docx` is a zip container; we stream `word/document.xml` with quick-xml
//! and keep exactly the shape the core needs per paragraph: run texts with
//! their bold flags, the paragraph style name, and a direct list level when
//! the document carries numbering metadata. Style ids are mapped to display
//! names via `word/styles.xml` when that part exists.
//!
//! All failure here is a typed `ParseError`; the extraction core never sees
//! a malformed container.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, instrument};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::domain::{RawParagraph, Run};

#[derive(Debug, Error)]
pub enum ParseError {
  #[error("invalid docx container: {0}")]
  Container(#[from] ZipError),
  #[error("missing required part: {0}")]
  MissingPart(&'static str),
  #[error("malformed document xml: {0}")]
  Xml(#[from] quick_xml::Error),
  #[error("unreadable part: {0}")]
  Io(#[from] std::io::Error),
}

/// Read all paragraphs of a `.docx` byte buffer, in document order.
#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn read_docx(bytes: &[u8]) -> Result<Vec<RawParagraph>, ParseError> {
  let mut archive = ZipArchive::new(Cursor::new(bytes))?;

  let document = match read_part(&mut archive, "word/document.xml") {
    Ok(xml) => xml,
    Err(ParseError::Container(ZipError::FileNotFound)) => {
      return Err(ParseError::MissingPart("word/document.xml"));
    }
    Err(e) => return Err(e),
  };

  // Styles are optional; without them style ids pass through as-is.
  let styles = match read_part(&mut archive, "word/styles.xml") {
    Ok(xml) => parse_styles(&xml)?,
    Err(ParseError::Container(ZipError::FileNotFound)) => HashMap::new(),
    Err(e) => return Err(e),
  };

  let paragraphs = parse_document(&document, &styles)?;
  debug!(target: "quizzz_backend", paragraphs = paragraphs.len(), "docx read");
  Ok(paragraphs)
}

fn read_part<R: Read + std::io::Seek>(
  archive: &mut ZipArchive<R>,
  name: &str,
) -> Result<String, ParseError> {
  let mut part = archive.by_name(name)?;
  let mut xml = String::new();
  part.read_to_string(&mut xml)?;
  Ok(xml)
}

/// `w:styleId` -> display name (`w:name/@w:val`) from `word/styles.xml`.
fn parse_styles(xml: &str) -> Result<HashMap<String, String>, ParseError> {
  let mut reader = Reader::from_str(xml);
  let mut map = HashMap::new();
  let mut current_id: Option<String> = None;

  loop {
    match reader.read_event()? {
      Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
        b"w:style" => current_id = attr_value(&e, b"w:styleId")?,
        b"w:name" => {
          if let (Some(id), Some(name)) = (current_id.clone(), attr_value(&e, b"w:val")?) {
            map.insert(id, name);
          }
        }
        _ => {}
      },
      Event::End(e) if e.name().as_ref() == b"w:style" => current_id = None,
      Event::Eof => break,
      _ => {}
    }
  }

  Ok(map)
}

#[derive(Default)]
struct ParagraphBuilder {
  style_id: Option<String>,
  list_level: Option<usize>,
  runs: Vec<Run>,
}

impl ParagraphBuilder {
  fn finish(self, styles: &HashMap<String, String>) -> RawParagraph {
    let style_name = self
      .style_id
      .map(|id| styles.get(&id).cloned().unwrap_or(id))
      .unwrap_or_default();
    RawParagraph {
      text: self.runs.iter().map(|r| r.text.as_str()).collect(),
      style_name,
      list_level: self.list_level,
      runs: self.runs,
    }
  }
}

fn parse_document(
  xml: &str,
  styles: &HashMap<String, String>,
) -> Result<Vec<RawParagraph>, ParseError> {
  let mut reader = Reader::from_str(xml);
  let mut paragraphs = Vec::new();

  let mut paragraph: Option<ParagraphBuilder> = None;
  let mut run: Option<Run> = None;
  // w:pPr carries paragraph-mark formatting in a nested w:rPr; flags keep
  // that from being read as run boldness.
  let mut in_ppr = false;
  let mut in_rpr = false;
  let mut in_text = false;
  // Only body-level paragraphs count; table-cell paragraphs are skipped.
  let mut table_depth = 0usize;

  loop {
    let event = reader.read_event()?;
    let empty = matches!(event, Event::Empty(_));
    match &event {
      Event::Start(e) | Event::Empty(e) => {
        match e.name().as_ref() {
          b"w:tbl" if !empty => table_depth += 1,
          b"w:p" if !empty && table_depth == 0 => paragraph = Some(ParagraphBuilder::default()),
          b"w:p" if table_depth == 0 => paragraphs.push(ParagraphBuilder::default().finish(styles)),
          b"w:pPr" if !empty => in_ppr = true,
          b"w:pStyle" if in_ppr => {
            if let Some(p) = paragraph.as_mut() {
              p.style_id = attr_value(e, b"w:val")?;
            }
          }
          b"w:ilvl" if in_ppr => {
            if let Some(p) = paragraph.as_mut() {
              p.list_level = attr_value(e, b"w:val")?.and_then(|v| v.parse().ok());
            }
          }
          b"w:r" if !empty && !in_ppr && paragraph.is_some() => {
            run = Some(Run { text: String::new(), bold: false });
          }
          b"w:rPr" if !empty => in_rpr = true,
          b"w:b" if in_rpr && !in_ppr => {
            if let Some(r) = run.as_mut() {
              r.bold = match attr_value(e, b"w:val")?.as_deref() {
                Some("0") | Some("false") | Some("none") => false,
                _ => true,
              };
            }
          }
          b"w:t" if !empty => in_text = true,
          _ => {}
        }
      }
      Event::Text(t) => {
        if in_text {
          if let Some(r) = run.as_mut() {
            r.text.push_str(&t.unescape()?);
          }
        }
      }
      Event::End(e) => match e.name().as_ref() {
        b"w:p" => {
          if let Some(p) = paragraph.take() {
            paragraphs.push(p.finish(styles));
          }
        }
        b"w:tbl" => table_depth = table_depth.saturating_sub(1),
        b"w:pPr" => in_ppr = false,
        b"w:rPr" => in_rpr = false,
        b"w:r" => {
          if let (Some(p), Some(r)) = (paragraph.as_mut(), run.take()) {
            p.runs.push(r);
          }
        }
        b"w:t" => in_text = false,
        _ => {}
      },
      Event::Eof => break,
      _ => {}
    }
  }

  Ok(paragraphs)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, ParseError> {
  for attr in e.attributes().flatten() {
    if attr.key.as_ref() == key {
      return Ok(Some(attr.unescape_value()?.into_owned()));
    }
  }
  Ok(None)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;
  use zip::write::SimpleFileOptions;
  use zip::ZipWriter;

  const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/></w:style>
  <w:style w:type="paragraph" w:styleId="ListNumber2"><w:name w:val="List Number 2"/></w:style>
</w:styles>"#;

  fn docx_bytes(document_xml: &str, with_styles: bool) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opt = SimpleFileOptions::default();
    zip.start_file("word/document.xml", opt).unwrap();
    zip.write_all(document_xml.as_bytes()).unwrap();
    if with_styles {
      zip.start_file("word/styles.xml", opt).unwrap();
      zip.write_all(STYLES_XML.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
  }

  fn wrap_body(body: &str) -> String {
    format!(
      r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{}</w:body></w:document>"#,
      body
    )
  }

  #[test]
  fn reads_styles_runs_and_list_levels() {
    let body = concat!(
      r#"<w:p><w:pPr><w:pStyle w:val="ListNumber"/></w:pPr>"#,
      r#"<w:r><w:t>What is 2+2?</w:t></w:r></w:p>"#,
      r#"<w:p><w:pPr><w:pStyle w:val="ListNumber2"/></w:pPr>"#,
      r#"<w:r><w:rPr><w:b/></w:rPr><w:t>4</w:t></w:r></w:p>"#,
      r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="1"/><w:numId w:val="3"/></w:numPr></w:pPr>"#,
      r#"<w:r><w:t>5</w:t></w:r></w:p>"#,
    );
    let paragraphs = read_docx(&docx_bytes(&wrap_body(body), true)).unwrap();

    assert_eq!(paragraphs.len(), 3);
    assert_eq!(paragraphs[0].style_name, "List Number");
    assert_eq!(paragraphs[0].text, "What is 2+2?");
    assert_eq!(paragraphs[0].list_level, None);

    assert_eq!(paragraphs[1].style_name, "List Number 2");
    assert!(paragraphs[1].runs[0].bold);

    assert_eq!(paragraphs[2].list_level, Some(1));
    assert_eq!(paragraphs[2].text, "5");
  }

  #[test]
  fn bold_val_zero_negates() {
    let body = concat!(
      r#"<w:p><w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>not bold</w:t></w:r>"#,
      r#"<w:r><w:rPr><w:b w:val="true"/></w:rPr><w:t> bold</w:t></w:r></w:p>"#,
    );
    let paragraphs = read_docx(&docx_bytes(&wrap_body(body), true)).unwrap();
    assert_eq!(paragraphs[0].text, "not bold bold");
    assert!(!paragraphs[0].runs[0].bold);
    assert!(paragraphs[0].runs[1].bold);
  }

  #[test]
  fn multiple_runs_concatenate_and_entities_unescape() {
    let body = r#"<w:p><w:r><w:t>salt </w:t></w:r><w:r><w:t>&amp; pepper</w:t></w:r></w:p>"#;
    let paragraphs = read_docx(&docx_bytes(&wrap_body(body), true)).unwrap();
    assert_eq!(paragraphs[0].text, "salt & pepper");
    assert_eq!(paragraphs[0].runs.len(), 2);
  }

  #[test]
  fn missing_styles_part_passes_style_ids_through() {
    let body = r#"<w:p><w:pPr><w:pStyle w:val="ListNumber"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#;
    let paragraphs = read_docx(&docx_bytes(&wrap_body(body), false)).unwrap();
    assert_eq!(paragraphs[0].style_name, "ListNumber");
  }

  #[test]
  fn paragraph_mark_formatting_is_not_run_boldness() {
    // w:rPr nested inside w:pPr styles the paragraph mark, not any run.
    let body = concat!(
      r#"<w:p><w:pPr><w:rPr><w:b/></w:rPr></w:pPr>"#,
      r#"<w:r><w:t>plain</w:t></w:r></w:p>"#,
    );
    let paragraphs = read_docx(&docx_bytes(&wrap_body(body), true)).unwrap();
    assert!(!paragraphs[0].runs[0].bold);
  }

  #[test]
  fn table_cell_paragraphs_are_skipped() {
    let body = concat!(
      r#"<w:p><w:r><w:t>1. Before the table?</w:t></w:r></w:p>"#,
      r#"<w:tbl><w:tr><w:tc>"#,
      r#"<w:p><w:r><w:t>scoring rubric cell</w:t></w:r></w:p>"#,
      r#"</w:tc></w:tr></w:tbl>"#,
      r#"<w:p><w:r><w:t>a) after</w:t></w:r></w:p>"#,
    );
    let paragraphs = read_docx(&docx_bytes(&wrap_body(body), true)).unwrap();
    let texts: Vec<_> = paragraphs.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["1. Before the table?", "a) after"]);
  }

  #[test]
  fn not_a_zip_is_a_container_error() {
    let err = read_docx(b"this is not a zip archive").unwrap_err();
    assert!(matches!(err, ParseError::Container(_)));
  }

  #[test]
  fn zip_without_document_part_is_missing_part() {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/other.xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"<x/>").unwrap();
    let bytes = zip.finish().unwrap().into_inner();
    let err = read_docx(&bytes).unwrap_err();
    assert!(matches!(err, ParseError::MissingPart("word/document.xml")));
  }
}
