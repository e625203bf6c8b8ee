//! Word and PowerPoint extraction

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Paragraphs first, then every table as `[Table N]` with ` | `-joined cells
pub(super) fn extract_docx(data: &[u8]) -> Result<String, String> {
    use docx_rs::DocumentChild;

    let docx = docx_rs::read_docx(data).map_err(|e| e.to_string())?;

    let mut parts = Vec::new();
    let mut tables = Vec::new();

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                let text = paragraph_text(p);
                if !text.trim().is_empty() {
                    parts.push(text);
                }
            }
            DocumentChild::Table(t) => tables.push(table_rows(t)),
            _ => {}
        }
    }

    for (i, rows) in tables.iter().enumerate() {
        if !rows.is_empty() {
            parts.push(format!("\n[Table {}]\n{}\n", i + 1, rows.join("\n")));
        }
    }

    Ok(parts.join("\n\n"))
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    use docx_rs::{ParagraphChild, RunChild};

    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}

#[allow(irrefutable_let_patterns)]
fn table_rows(table: &docx_rs::Table) -> Vec<String> {
    use docx_rs::{TableCellContent, TableChild, TableRowChild};

    let mut rows = Vec::new();
    for row_child in &table.rows {
        let TableChild::TableRow(row) = row_child else { continue };

        let mut cells = Vec::new();
        for cell_child in &row.cells {
            let TableRowChild::TableCell(cell) = cell_child else { continue };

            let text = cell
                .children
                .iter()
                .filter_map(|content| match content {
                    TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n");
            cells.push(text.trim().to_string());
        }
        rows.push(cells.join(" | "));
    }
    rows
}

/// Slides as `[Slide N]` blocks separated by `---` rules
pub(super) fn extract_pptx(data: &[u8]) -> Result<String, String> {
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(|e| e.to_string())?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| numbered_part(name, "ppt/slides/slide").map(|n| (n, name.to_string())))
        .collect();
    slides.sort_by_key(|(n, _)| *n);

    let mut blocks = Vec::with_capacity(slides.len());

    for (position, (_, slide_name)) in slides.iter().enumerate() {
        let xml = read_part(&mut archive, slide_name)?;
        let mut lines = vec![format!("[Slide {}]", position + 1)];

        for item in parse_shapes(&xml) {
            match item {
                SlideItem::Shape { text, .. } => {
                    if !text.trim().is_empty() {
                        lines.push(text);
                    }
                }
                SlideItem::Table(rows) => {
                    if !rows.is_empty() {
                        lines.push(format!("\n[Table]\n{}", rows.join("\n")));
                    }
                }
            }
        }

        if let Some(notes) = slide_notes(&mut archive, slide_name)? {
            if !notes.trim().is_empty() {
                lines.push(format!("\n[Notes]\n{}", notes));
            }
        }

        blocks.push(lines.join("\n"));
    }

    Ok(blocks.join("\n\n---\n\n"))
}

/// `ppt/slides/slide12.xml` -> 12
fn numbered_part(name: &str, prefix: &str) -> Option<u32> {
    name.strip_prefix(prefix)?.strip_suffix(".xml")?.parse().ok()
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String, String> {
    let mut file = archive.by_name(name).map_err(|e| format!("{}: {}", name, e))?;
    let mut xml = String::new();
    file.read_to_string(&mut xml).map_err(|e| format!("{}: {}", name, e))?;
    Ok(xml)
}

/// Speaker notes: body placeholder of the notes slide linked from the slide's rels
fn slide_notes(archive: &mut ZipArchive<Cursor<&[u8]>>, slide_name: &str) -> Result<Option<String>, String> {
    let Some(file_name) = slide_name.rsplit('/').next() else {
        return Ok(None);
    };
    let rels_name = format!("ppt/slides/_rels/{}.rels", file_name);
    if archive.index_for_name(&rels_name).is_none() {
        return Ok(None);
    }

    let rels = read_part(archive, &rels_name)?;
    let Some(target) = notes_target(&rels) else {
        return Ok(None);
    };
    if archive.index_for_name(&target).is_none() {
        tracing::debug!("Notes part {} referenced by {} is missing", target, slide_name);
        return Ok(None);
    }

    let xml = read_part(archive, &target)?;
    let notes = parse_shapes(&xml).into_iter().find_map(|item| match item {
        SlideItem::Shape { text, is_body: true } => Some(text),
        _ => None,
    });
    Ok(notes)
}

/// Resolve the notesSlide relationship target to an archive path
fn notes_target(rels: &str) -> Option<String> {
    let mut reader = Reader::from_str(rels);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                let rel_type = attribute(&e, b"Type")?;
                if rel_type.ends_with("/notesSlide") {
                    let target = attribute(&e, b"Target")?;
                    return Some(resolve_target(&target));
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// `../notesSlides/notesSlide1.xml` relative to `ppt/slides/`
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = vec!["ppt", "slides"];
    for segment in target.split('/') {
        match segment {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

#[derive(Debug, PartialEq)]
enum SlideItem {
    /// Text of one shape, paragraphs joined by newlines
    Shape { text: String, is_body: bool },
    /// Table rows, cells joined by ` | `
    Table(Vec<String>),
}

/// Walk a slide (or notes slide) part and collect shape text and tables in
/// document order.
fn parse_shapes(xml: &str) -> Vec<SlideItem> {
    let mut reader = Reader::from_str(xml);

    let mut items = Vec::new();

    let mut shape: Option<(Vec<String>, bool)> = None;
    let mut table: Option<Vec<String>> = None;
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<Vec<String>> = None;
    let mut paragraph: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sp" => shape = Some((Vec::new(), false)),
                b"ph" => mark_body(&mut shape, &e),
                b"tbl" => table = Some(Vec::new()),
                b"tr" => row = Some(Vec::new()),
                b"tc" => cell = Some(Vec::new()),
                b"p" => paragraph = Some(String::new()),
                b"t" => in_text = paragraph.is_some(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"ph" => mark_body(&mut shape, &e),
                b"p" => push_paragraph(String::new(), &mut cell, &mut shape),
                b"br" => {
                    if let Some(p) = paragraph.as_mut() {
                        p.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    if let (Some(p), Ok(text)) = (paragraph.as_mut(), e.unescape()) {
                        p.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(p) = paragraph.take() {
                        push_paragraph(p, &mut cell, &mut shape);
                    }
                }
                b"tc" => {
                    if let (Some(c), Some(r)) = (cell.take(), row.as_mut()) {
                        r.push(c.join("\n").trim().to_string());
                    }
                }
                b"tr" => {
                    if let (Some(r), Some(t)) = (row.take(), table.as_mut()) {
                        t.push(r.join(" | "));
                    }
                }
                b"tbl" => {
                    if let Some(t) = table.take() {
                        items.push(SlideItem::Table(t));
                    }
                }
                b"sp" => {
                    if let Some((paragraphs, is_body)) = shape.take() {
                        items.push(SlideItem::Shape {
                            text: paragraphs.join("\n"),
                            is_body,
                        });
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!("Malformed slide XML at byte {}: {}", reader.buffer_position(), e);
                break;
            }
            _ => {}
        }
    }

    items
}

fn push_paragraph(text: String, cell: &mut Option<Vec<String>>, shape: &mut Option<(Vec<String>, bool)>) {
    if let Some(c) = cell.as_mut() {
        c.push(text);
    } else if let Some((paragraphs, _)) = shape.as_mut() {
        paragraphs.push(text);
    }
}

fn mark_body(shape: &mut Option<(Vec<String>, bool)>, placeholder: &BytesStart<'_>) {
    if let Some((_, is_body)) = shape.as_mut() {
        if attribute(placeholder, b"type").as_deref() == Some("body") {
            *is_body = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

    fn text_shape(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!("<p:sp><p:nvSpPr><p:nvPr/></p:nvSpPr><p:txBody>{}</p:txBody></p:sp>", body)
    }

    fn table_frame(rows: &[&[&str]]) -> String {
        let rows: String = rows
            .iter()
            .map(|cells| {
                let cells: String = cells
                    .iter()
                    .map(|c| format!("<a:tc><a:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></a:txBody></a:tc>", c))
                    .collect();
                format!("<a:tr>{}</a:tr>", cells)
            })
            .collect();
        format!(
            "<p:graphicFrame><a:graphic><a:graphicData><a:tbl>{}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>",
            rows
        )
    }

    fn slide(shapes: &str) -> String {
        format!(r#"<?xml version="1.0"?><p:sld {NS}><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"#)
    }

    fn notes_slide(text: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><p:notes {NS}><p:cSld><p:spTree><p:sp><p:nvSpPr><p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr></p:sp><p:sp><p:nvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#
        )
    }

    fn build_pptx(parts: &[(&str, String)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_pptx_slides_tables_and_notes() {
        let rels = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide" Target="../notesSlides/notesSlide1.xml"/></Relationships>"#;

        let data = build_pptx(&[
            // Stored out of order on purpose
            ("ppt/slides/slide10.xml", slide(&text_shape(&["Closing"]))),
            (
                "ppt/slides/slide1.xml",
                slide(&format!(
                    "{}{}",
                    text_shape(&["Quarterly Review", "Revenue &amp; growth"]),
                    table_frame(&[&["Region", "Sales"], &["North", " 42 "]])
                )),
            ),
            ("ppt/slides/_rels/slide1.xml.rels", rels.to_string()),
            ("ppt/notesSlides/notesSlide1.xml", notes_slide("Mention the new office")),
            ("ppt/slides/slide2.xml", slide("")),
        ]);

        let text = extract_pptx(&data).unwrap();

        assert_eq!(
            text,
            "[Slide 1]\nQuarterly Review\nRevenue & growth\n\n[Table]\nRegion | Sales\nNorth | 42\n\n[Notes]\nMention the new office\
             \n\n---\n\n[Slide 2]\
             \n\n---\n\n[Slide 3]\nClosing"
        );
    }

    #[test]
    fn test_pptx_not_a_zip() {
        assert!(extract_pptx(b"not a zip archive").is_err());
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("../notesSlides/notesSlide3.xml"), "ppt/notesSlides/notesSlide3.xml");
        assert_eq!(resolve_target("/ppt/notesSlides/x.xml"), "ppt/notesSlides/x.xml");
        assert_eq!(numbered_part("ppt/slides/slide12.xml", "ppt/slides/slide"), Some(12));
        assert_eq!(numbered_part("ppt/slides/_rels/slide1.xml.rels", "ppt/slides/slide"), None);
    }

    #[test]
    fn test_docx_paragraphs_then_tables() {
        use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

        let table = Table::new(vec![
            TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Name"))),
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Role"))),
            ]),
            TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Ada"))),
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(" Engineer "))),
            ]),
        ]);

        let mut buffer = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Project memo")))
            .add_paragraph(Paragraph::new())
            .add_table(table)
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Second ")).add_run(Run::new().add_text("paragraph")))
            .build()
            .pack(&mut buffer)
            .unwrap();

        let text = extract_docx(buffer.get_ref()).unwrap();

        assert_eq!(
            text,
            "Project memo\n\nSecond paragraph\n\n\n[Table 1]\nName | Role\nAda | Engineer\n"
        );
    }
}
