//! PPTX slide parsing into the document tree.

use crate::scope::{local_name, Marker, TextScope};
use certgen_core::{Error, Paragraph, Result, Shape, Slide, TextFrame, TextRun};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// Get the ordered list of slide part names for a presentation.
///
/// Order comes from `<p:sldIdLst>` in `presentation.xml`. Packages that
/// lack the list fall back to the numbering of the slide relationships.
pub fn slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels_content = read_file_from_archive(archive, PRESENTATION_RELS_PART)?;
    let rels = slide_relationships(&rels_content)?;
    if rels.is_empty() {
        return Err(Error::TemplateError("Presentation has no slides".to_string()));
    }

    let presentation = read_file_from_archive(archive, PRESENTATION_PART)?;
    let listed = listed_slide_ids(&presentation)?;

    let mut order = Vec::with_capacity(rels.len());
    for rel_id in &listed {
        match rels.iter().find(|rel| &rel.id == rel_id) {
            Some(rel) => order.push(rel.part_name.clone()),
            None => log::warn!("Slide id {} has no relationship, skipping", rel_id),
        }
    }

    if order.is_empty() {
        log::debug!("No slide id list, ordering slides by relationship number");
        let mut slides: Vec<(String, Option<usize>)> = rels
            .into_iter()
            .map(|rel| {
                let n = extract_slide_number(&rel.part_name).or_else(|| extract_slide_number(&rel.id));
                (rel.part_name, n)
            })
            .collect();
        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });
        order = slides.into_iter().map(|(path, _)| path).collect();
    }

    Ok(order)
}

/// A slide relationship from `presentation.xml.rels`.
#[derive(Debug)]
struct SlideRel {
    id: String,
    part_name: String,
}

fn slide_relationships(rels_content: &str) -> Result<Vec<SlideRel>> {
    let mut slides = Vec::new();
    let mut reader = Reader::from_str(rels_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                if rel_type.ends_with("/slide") {
                    let part_name = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
                    slides.push(SlideRel { id, part_name });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Relationship ids of `<p:sldId>` entries, in presentation order.
fn listed_slide_ids(presentation: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(presentation);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // `id` is the numeric slide id; the prefixed `r:id` is the relationship.
                for attr in e.attributes().flatten() {
                    let key = attr.key.as_ref();
                    if key != b"id" && local_name(key) == b"id" {
                        ids.push(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Parse one slide's XML into shapes, paragraphs and runs.
pub fn parse_slide(xml_content: &str, number: usize, part_name: &str) -> Result<Slide> {
    let mut slide = Slide::new(number, part_name);
    let mut reader = Reader::from_str(xml_content);
    // Run text is significant, including leading and trailing spaces.
    reader.trim_text(false);

    let mut scope = TextScope::default();
    let mut shape: Option<Shape> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let marker = scope.open(e.name().as_ref());
                if let Some(ref mut shape) = shape {
                    if marker == Marker::Other && local_name(e.name().as_ref()) == b"cNvPr" {
                        capture_shape_name(shape, e);
                    }
                }
                apply_marker(marker, &mut shape, &mut slide);
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let opened = scope.open(name.as_ref());
                if let Some(ref mut shape) = shape {
                    if opened == Marker::Other && local_name(name.as_ref()) == b"cNvPr" {
                        capture_shape_name(shape, e);
                    }
                }
                apply_marker(opened, &mut shape, &mut slide);
                let closed = scope.close(name.as_ref());
                apply_marker(closed, &mut shape, &mut slide);
            }
            Ok(Event::Text(ref e)) if scope.in_text() => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::XmlError(format!("Bad text in {}: {}", part_name, err)))?;
                push_run_text(&mut shape, &text);
            }
            Ok(Event::CData(ref e)) if scope.in_text() => {
                push_run_text(&mut shape, &String::from_utf8_lossy(e));
            }
            Ok(Event::End(ref e)) => {
                let marker = scope.close(e.name().as_ref());
                apply_marker(marker, &mut shape, &mut slide);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing {}: {}",
                    part_name, e
                )));
            }
            _ => {}
        }
    }

    Ok(slide)
}

fn apply_marker(marker: Marker, shape: &mut Option<Shape>, slide: &mut Slide) {
    match marker {
        Marker::ShapeStart => *shape = Some(Shape::default()),
        Marker::ShapeEnd => {
            if let Some(done) = shape.take() {
                slide.shapes.push(done);
            }
        }
        Marker::BodyStart => {
            if let Some(shape) = shape {
                shape.text_frame = Some(TextFrame::default());
            }
        }
        Marker::ParagraphStart => {
            if let Some(frame) = shape.as_mut().and_then(|s| s.text_frame.as_mut()) {
                frame.paragraphs.push(Paragraph::default());
            }
        }
        Marker::RunStart => {
            if let Some(paragraph) = current_paragraph(shape) {
                paragraph.runs.push(TextRun::default());
            }
        }
        _ => {}
    }
}

fn current_paragraph(shape: &mut Option<Shape>) -> Option<&mut Paragraph> {
    shape
        .as_mut()
        .and_then(|s| s.text_frame.as_mut())
        .and_then(|frame| frame.paragraphs.last_mut())
}

fn push_run_text(shape: &mut Option<Shape>, text: &str) {
    if let Some(run) = current_paragraph(shape).and_then(|p| p.runs.last_mut()) {
        run.text.push_str(text);
    }
}

fn capture_shape_name(shape: &mut Shape, e: &quick_xml::events::BytesStart<'_>) {
    if shape.name.is_some() {
        return;
    }
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"name" {
            shape.name = Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
}

/// Read a file from the ZIP archive.
pub(crate) fn read_file_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
      <p:txBody><a:bodyPr/>
        <a:p><a:r><a:rPr lang="en-US" b="1"/><a:t>Awarded to </a:t></a:r><a:r><a:t>{{name}}</a:t></a:r></a:p>
        <a:p><a:fld id="{1}" type="slidenum"><a:t>1</a:t></a:fld></a:p>
        <a:p><a:r><a:t>Tom &amp; Jerry</a:t></a:r><a:br/><a:r><a:t/></a:r></a:p>
      </p:txBody>
    </p:sp>
    <p:pic><p:nvPicPr><p:cNvPr id="3" name="Logo"/></p:nvPicPr></p:pic>
    <p:sp><p:nvSpPr><p:cNvPr id="4" name="Frame"/></p:nvSpPr></p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

    #[test]
    fn test_parse_slide_tree() {
        let slide = parse_slide(SLIDE, 1, "ppt/slides/slide1.xml").unwrap();
        assert_eq!(slide.number, 1);
        assert_eq!(slide.shapes.len(), 2);

        let title = &slide.shapes[0];
        assert_eq!(title.name.as_deref(), Some("Title 1"));
        let frame = title.text_frame.as_ref().unwrap();
        assert_eq!(frame.paragraphs.len(), 3);
        assert_eq!(frame.paragraphs[0].text(), "Awarded to {{name}}");
        assert_eq!(frame.paragraphs[0].runs[0].text, "Awarded to ");
        assert!(frame.paragraphs[1].runs.is_empty());
        assert_eq!(frame.paragraphs[2].runs[0].text, "Tom & Jerry");
        assert_eq!(frame.paragraphs[2].runs[1].text, "");

        let plain = &slide.shapes[1];
        assert_eq!(plain.name.as_deref(), Some("Frame"));
        assert!(plain.text_frame.is_none());
    }

    #[test]
    fn test_listed_slide_ids() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>
            <p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/>
        </p:sldIdLst></p:presentation>"#;
        assert_eq!(listed_slide_ids(xml).unwrap(), vec!["rId3", "rId2"]);
    }

    #[test]
    fn test_slide_relationships() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
            <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
            <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="/ppt/slides/slide2.xml"/>
        </Relationships>"#;
        let rels = slide_relationships(xml).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].id, "rId2");
        assert_eq!(rels[0].part_name, "ppt/slides/slide1.xml");
        assert_eq!(rels[1].part_name, "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }
}
