//! Document-parsing tools. `.docx` and `.xlsx` are both zip archives of
//! XML parts, so both are read with `zip` + `quick-xml` rather than a
//! dedicated office-document crate.

use std::io::Read as _;

use corridor_core::Result;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde_json::{json, Value};
use zip::ZipArchive;

fn local_name(tag: &[u8]) -> &[u8] {
    match tag.iter().position(|&b| b == b':') {
        Some(i) => &tag[i + 1..],
        None => tag,
    }
}

fn is_tag(tag: &[u8], name: &str) -> bool {
    local_name(tag) == name.as_bytes()
}

struct DocxBody {
    paragraphs: Vec<String>,
    sections: Vec<(u32, String)>,
    tables: Vec<Vec<Vec<String>>>,
}

fn parse_document_xml(xml: &[u8], include_tables: bool) -> std::result::Result<DocxBody, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut sections = Vec::new();
    let mut tables = Vec::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) if is_tag(e.name().as_ref(), "p") => {
                let (text, heading_level) = read_paragraph(&mut reader)?;
                let trimmed = text.trim().to_string();
                if !trimmed.is_empty() {
                    paragraphs.push(trimmed.clone());
                    if let Some(level) = heading_level {
                        sections.push((level, trimmed));
                    }
                }
            }
            Event::Start(e) if include_tables && is_tag(e.name().as_ref(), "tbl") => {
                tables.push(read_table(&mut reader)?);
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(DocxBody { paragraphs, sections, tables })
}

/// Reads one `<w:p>` element (the reader is positioned just after its
/// `Start`), returning its concatenated run text and heading level, if any.
fn read_paragraph(reader: &mut Reader<&[u8]>) -> std::result::Result<(String, Option<u32>), quick_xml::Error> {
    let mut text = String::new();
    let mut heading_level = None;
    let mut in_text_run = false;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) if is_tag(e.name().as_ref(), "t") => in_text_run = true,
            Event::Text(t) if in_text_run => text.push_str(&t.unescape()?),
            Event::End(e) if is_tag(e.name().as_ref(), "t") => in_text_run = false,
            Event::Start(e) if is_tag(e.name().as_ref(), "pStyle") => {
                if let Some(level) = heading_level_from_attrs(&e) {
                    heading_level = Some(level);
                }
            }
            Event::Empty(e) if is_tag(e.name().as_ref(), "pStyle") => {
                if let Some(level) = heading_level_from_attrs(&e) {
                    heading_level = Some(level);
                }
            }
            Event::End(e) if is_tag(e.name().as_ref(), "p") => break,
            _ => {}
        }
        buf.clear();
    }
    Ok((text, heading_level))
}

fn heading_level_from_attrs(e: &quick_xml::events::BytesStart) -> Option<u32> {
    for attr in e.attributes().flatten() {
        let key = local_name(attr.key.as_ref());
        if key == b"val" {
            let val = String::from_utf8_lossy(&attr.value).to_lowercase();
            if let Some(rest) = val.strip_prefix("heading") {
                let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
                return Some(digits.parse().unwrap_or(1));
            }
        }
    }
    None
}

/// Reads one `<w:tbl>` element, returning its rows of cell text.
fn read_table(reader: &mut Reader<&[u8]>) -> std::result::Result<Vec<Vec<String>>, quick_xml::Error> {
    let mut rows = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) if is_tag(e.name().as_ref(), "tr") => {
                rows.push(read_row(reader)?);
            }
            Event::End(e) if is_tag(e.name().as_ref(), "tbl") => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

fn read_row(reader: &mut Reader<&[u8]>) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut cells = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) if is_tag(e.name().as_ref(), "tc") => {
                cells.push(read_cell(reader)?);
            }
            Event::End(e) if is_tag(e.name().as_ref(), "tr") => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(cells)
}

fn read_cell(reader: &mut Reader<&[u8]>) -> std::result::Result<String, quick_xml::Error> {
    let mut text = String::new();
    let mut in_text_run = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) if is_tag(e.name().as_ref(), "t") => in_text_run = true,
            Event::Text(t) if in_text_run => text.push_str(&t.unescape()?),
            Event::End(e) if is_tag(e.name().as_ref(), "t") => in_text_run = false,
            Event::End(e) if is_tag(e.name().as_ref(), "tc") => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text.trim().to_string())
}

pub fn docx_parse(arguments: &Value) -> Result<Value> {
    let path = arguments["path"].as_str().unwrap_or("").to_string();
    let include_tables = arguments["include_tables"].as_bool().unwrap_or(true);
    let max_paragraphs = arguments["max_paragraphs"].as_u64().unwrap_or(2000) as usize;

    match read_docx_part(&path, "word/document.xml").and_then(|xml| {
        parse_document_xml(&xml, include_tables).map_err(std::io::Error::other)
    }) {
        Ok(body) => Ok(json!({
            "path": path,
            "paragraphs": body.paragraphs.into_iter().take(max_paragraphs).collect::<Vec<_>>(),
            "sections": body.sections.into_iter().map(|(level, title)| json!({"level": level, "title": title})).collect::<Vec<_>>(),
            "tables": body.tables.into_iter().map(|rows| json!({"rows": rows})).collect::<Vec<_>>(),
        })),
        Err(e) => Ok(json!({
            "path": path,
            "paragraphs": [],
            "sections": [],
            "tables": [],
            "error": format!("docx parse failed: {e}"),
        })),
    }
}

fn read_docx_part(path: &str, part: &str) -> std::io::Result<Vec<u8>> {
    let file = std::fs::File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(std::io::Error::other)?;
    let mut entry = archive.by_name(part).map_err(std::io::Error::other)?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

fn read_shared_strings(archive: &mut ZipArchive<std::fs::File>) -> Vec<String> {
    let mut buf = Vec::new();
    let Ok(mut entry) = archive.by_name("xl/sharedStrings.xml") else {
        return Vec::new();
    };
    if entry.read_to_end(&mut buf).is_err() {
        return Vec::new();
    }
    drop(entry);

    let mut reader = Reader::from_reader(buf.as_slice());
    reader.config_mut().trim_text(false);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_text_run = false;
    let mut xbuf = Vec::new();
    loop {
        match reader.read_event_into(&mut xbuf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) if is_tag(e.name().as_ref(), "si") => {
                in_si = true;
                current.clear();
            }
            Ok(Event::End(e)) if is_tag(e.name().as_ref(), "si") => {
                in_si = false;
                strings.push(current.clone());
            }
            Ok(Event::Start(e)) if in_si && is_tag(e.name().as_ref(), "t") => in_text_run = true,
            Ok(Event::End(e)) if is_tag(e.name().as_ref(), "t") => in_text_run = false,
            Ok(Event::Text(t)) if in_text_run => {
                if let Ok(s) = t.unescape() {
                    current.push_str(&s);
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
        xbuf.clear();
    }
    strings
}

fn read_sheet_rows(xml: &[u8], shared_strings: &[String], max_rows: usize) -> std::result::Result<Vec<Vec<String>>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell_is_shared = false;
    let mut in_value = false;
    let mut cell_text = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) if is_tag(e.name().as_ref(), "row") => row.clear(),
            Event::End(e) if is_tag(e.name().as_ref(), "row") => {
                if !row.is_empty() {
                    rows.push(std::mem::take(&mut row));
                    if rows.len() >= max_rows {
                        break;
                    }
                }
            }
            Event::Start(e) if is_tag(e.name().as_ref(), "c") => {
                cell_is_shared = e
                    .attributes()
                    .flatten()
                    .any(|a| local_name(a.key.as_ref()) == b"t" && a.value.as_ref() == b"s");
                cell_text.clear();
            }
            Event::Start(e) if is_tag(e.name().as_ref(), "v") => in_value = true,
            Event::Text(t) if in_value => cell_text.push_str(&t.unescape()?),
            Event::End(e) if is_tag(e.name().as_ref(), "v") => in_value = false,
            Event::End(e) if is_tag(e.name().as_ref(), "c") => {
                let resolved = if cell_is_shared {
                    cell_text
                        .parse::<usize>()
                        .ok()
                        .and_then(|idx| shared_strings.get(idx).cloned())
                        .unwrap_or_else(|| cell_text.clone())
                } else {
                    cell_text.clone()
                };
                row.push(resolved);
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

pub fn xlsx_parse(arguments: &Value) -> Result<Value> {
    let path = arguments["path"].as_str().unwrap_or("").to_string();
    let sheet_index = arguments["sheet_index"].as_u64().unwrap_or(0);
    let header = arguments["header"].as_bool().unwrap_or(true);
    let max_rows = arguments["max_rows"].as_u64().unwrap_or(1000) as usize;

    let result = (|| -> std::io::Result<(Vec<Vec<String>>, Option<Vec<String>>)> {
        let file = std::fs::File::open(&path)?;
        let mut archive = ZipArchive::new(file).map_err(std::io::Error::other)?;
        let shared_strings = read_shared_strings(&mut archive);

        let sheet_part = format!("xl/worksheets/sheet{}.xml", sheet_index + 1);
        let mut entry = archive.by_name(&sheet_part).map_err(std::io::Error::other)?;
        let mut xml = Vec::new();
        entry.read_to_end(&mut xml)?;
        drop(entry);

        let mut rows = read_sheet_rows(&xml, &shared_strings, max_rows).map_err(std::io::Error::other)?;
        let header_row = if header && !rows.is_empty() { Some(rows.remove(0)) } else { None };
        Ok((rows, header_row))
    })();

    match result {
        Ok((rows, header_row)) => Ok(json!({
            "path": path,
            "sheet_index": sheet_index,
            "rows": rows,
            "header": header_row,
        })),
        Err(e) => Ok(json!({
            "path": path,
            "sheet_index": sheet_index,
            "rows": [],
            "header": Value::Null,
            "error": format!("xlsx parse failed: {e}"),
        })),
    }
}

pub fn pdf_parse(arguments: &Value) -> Result<Value> {
    let path = arguments["path"].as_str().unwrap_or("").to_string();
    Ok(json!({
        "path": path,
        "pages": Value::Null,
        "text_preview": Value::Null,
        "error": "pdf parsing not implemented",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use zip::write::SimpleFileOptions;

    fn write_zip(entries: &[(&str, &str)]) -> tempfile::TempPath {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        file.into_temp_path()
    }

    const DOCUMENT_XML: &str = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Introduction</w:t></w:r></w:p>
    <w:p><w:r><w:t>Plain paragraph text.</w:t></w:r></w:p>
    <w:tbl>
      <w:tr><w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p></w:tc></w:tr>
    </w:tbl>
  </w:body>
</w:document>"#;

    #[test]
    fn docx_parse_extracts_paragraphs_sections_and_tables() {
        let path = write_zip(&[("word/document.xml", DOCUMENT_XML)]);
        let out = docx_parse(&json!({"path": path.to_str().unwrap()})).unwrap();
        assert_eq!(out["paragraphs"].as_array().unwrap().len(), 2);
        assert_eq!(out["sections"][0]["level"], 1);
        assert_eq!(out["sections"][0]["title"], "Introduction");
        assert_eq!(out["tables"][0]["rows"][0][0], "A1");
        assert!(out["error"].is_null());
    }

    #[test]
    fn docx_parse_reports_error_for_missing_file() {
        let out = docx_parse(&json!({"path": "/nonexistent/report.docx"})).unwrap();
        assert!(out["error"].is_string());
        assert_eq!(out["paragraphs"].as_array().unwrap().len(), 0);
    }

    const SHEET_XML: &str = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
    <row r="2"><c r="A2"><v>12</v></c><c r="B2"><v>34</v></c></row>
  </sheetData>
</worksheet>"#;

    const SHARED_STRINGS_XML: &str = r#"<?xml version="1.0"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2">
  <si><t>name</t></si>
  <si><t>value</t></si>
</sst>"#;

    #[test]
    fn xlsx_parse_resolves_shared_strings_and_splits_header() {
        let path = write_zip(&[
            ("xl/worksheets/sheet1.xml", SHEET_XML),
            ("xl/sharedStrings.xml", SHARED_STRINGS_XML),
        ]);
        let out = xlsx_parse(&json!({"path": path.to_str().unwrap()})).unwrap();
        assert_eq!(out["header"], json!(["name", "value"]));
        assert_eq!(out["rows"], json!([["12", "34"]]));
        assert!(out["error"].is_null());
    }

    #[test]
    fn xlsx_parse_reports_error_for_missing_sheet() {
        let path = write_zip(&[("xl/worksheets/sheet1.xml", SHEET_XML)]);
        let out = xlsx_parse(&json!({"path": path.to_str().unwrap(), "sheet_index": 5})).unwrap();
        assert!(out["error"].is_string());
    }
}
