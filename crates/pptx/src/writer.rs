//! Writes edited run text back into slide XML.
//!
//! The slide is re-streamed event by event. Only the character data of
//! `<a:t>` elements that belong to runs is replaced; run properties,
//! paragraph properties and every other element pass through as read.

use crate::scope::{Marker, TextScope};
use certgen_core::{Error, Result, Slide};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

/// Rewrite a slide's XML so its runs carry the text held in `slide`.
///
/// `slide` must have been parsed from the same XML: its runs are matched
/// to the XML runs by position.
pub fn rewrite_slide(xml_content: &str, slide: &Slide) -> Result<Vec<u8>> {
    let part_name = slide.part_name.as_str();
    let mut runs = slide.runs().map(|r| r.text.as_str());

    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml_content.len()));

    let mut scope = TextScope::default();
    // Text of the run being written, until its `<a:t>` is reached.
    let mut current: Option<&str> = None;
    // Text waiting to be written inside the open `<a:t>`.
    let mut pending: Option<&str> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error reading {}: {}", part_name, e)))?;

        match event {
            Event::Start(ref e) => {
                match scope.open(e.name().as_ref()) {
                    Marker::RunStart => current = Some(next_run(&mut runs, part_name)?),
                    Marker::TextStart => pending = current.take(),
                    _ => {}
                }
                write(&mut writer, &event, part_name)?;
            }
            Event::Empty(ref e) => {
                let name = e.name();
                match scope.open(name.as_ref()) {
                    Marker::RunStart => {
                        let text = next_run(&mut runs, part_name)?;
                        if !text.is_empty() {
                            log::debug!("Run without <a:t> in {} cannot take text {:?}", part_name, text);
                        }
                        write(&mut writer, &event, part_name)?;
                    }
                    Marker::TextStart => {
                        let text = current.take().unwrap_or_default();
                        if text.is_empty() {
                            write(&mut writer, &event, part_name)?;
                        } else {
                            write(&mut writer, &Event::Start(e.clone()), part_name)?;
                            write(&mut writer, &Event::Text(BytesText::new(text)), part_name)?;
                            write(&mut writer, &Event::End(e.to_end()), part_name)?;
                        }
                    }
                    _ => write(&mut writer, &event, part_name)?,
                }
                scope.close(name.as_ref());
            }
            Event::Text(_) | Event::CData(_) if scope.in_text() => {
                if let Some(text) = pending.take() {
                    write(&mut writer, &Event::Text(BytesText::new(text)), part_name)?;
                }
            }
            Event::End(ref e) => {
                match scope.close(e.name().as_ref()) {
                    Marker::TextEnd => {
                        if let Some(text) = pending.take().filter(|t| !t.is_empty()) {
                            write(&mut writer, &Event::Text(BytesText::new(text)), part_name)?;
                        }
                    }
                    Marker::RunEnd => current = None,
                    _ => {}
                }
                write(&mut writer, &event, part_name)?;
            }
            Event::Eof => break,
            _ => write(&mut writer, &event, part_name)?,
        }
    }

    if runs.next().is_some() {
        return Err(Error::TemplateMismatch(format!(
            "{} has more runs in the document than in the template",
            part_name
        )));
    }

    Ok(writer.into_inner())
}

fn next_run<'a>(runs: &mut impl Iterator<Item = &'a str>, part_name: &str) -> Result<&'a str> {
    runs.next().ok_or_else(|| {
        Error::TemplateMismatch(format!(
            "{} has more runs in the template than in the document",
            part_name
        ))
    })
}

fn write(writer: &mut Writer<Vec<u8>>, event: &Event<'_>, part_name: &str) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("Error writing {}: {}", part_name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_slide;

    const PART: &str = "ppt/slides/slide1.xml";

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Name"/></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" sz="4000" b="1"/><a:t>{{name}}</a:t></a:r><a:r><a:t xml:space="preserve"> scored </a:t></a:r><a:r><a:t/></a:r></a:p><a:p><a:fld id="x" type="slidenum"><a:t>1</a:t></a:fld></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

    fn rewrite_with(edit: impl FnOnce(&mut Slide)) -> (String, Slide) {
        let mut slide = parse_slide(SLIDE, 1, PART).unwrap();
        edit(&mut slide);
        let bytes = rewrite_slide(SLIDE, &slide).unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        let reparsed = parse_slide(&xml, 1, PART).unwrap();
        (xml, reparsed)
    }

    fn runs_of(slide: &Slide) -> Vec<String> {
        slide.runs().map(|r| r.text.clone()).collect()
    }

    #[test]
    fn test_unchanged_slide_round_trips_exactly() {
        let (xml, _) = rewrite_with(|_| {});
        assert_eq!(xml, SLIDE);
    }

    #[test]
    fn test_edited_text_keeps_formatting() {
        let (xml, reparsed) = rewrite_with(|slide| {
            let texts = ["Ada & Co", " scored ", "97"];
            for (run, text) in slide.shapes[0]
                .text_frame
                .as_mut()
                .unwrap()
                .paragraphs[0]
                .runs
                .iter_mut()
                .zip(texts)
            {
                run.text = text.to_string();
            }
        });

        assert_eq!(runs_of(&reparsed), vec!["Ada & Co", " scored ", "97"]);
        assert!(xml.contains(r#"<a:rPr lang="en-US" sz="4000" b="1"/><a:t>Ada &amp; Co</a:t>"#));
        assert!(xml.contains(r#"<a:t>97</a:t>"#));
        // Field text is not a run and stays as written.
        assert!(xml.contains(r#"<a:fld id="x" type="slidenum"><a:t>1</a:t></a:fld>"#));
    }

    #[test]
    fn test_extra_runs_are_a_mismatch() {
        let mut slide = parse_slide(SLIDE, 1, PART).unwrap();
        slide.shapes[0].text_frame.as_mut().unwrap().paragraphs[0]
            .runs
            .push(certgen_core::TextRun::new("extra"));
        let err = rewrite_slide(SLIDE, &slide).unwrap_err();
        assert!(matches!(err, Error::TemplateMismatch(_)));
    }

    #[test]
    fn test_missing_runs_are_a_mismatch() {
        let mut slide = parse_slide(SLIDE, 1, PART).unwrap();
        slide.shapes[0].text_frame.as_mut().unwrap().paragraphs[0].runs.pop();
        let err = rewrite_slide(SLIDE, &slide).unwrap_err();
        assert!(matches!(err, Error::TemplateMismatch(_)));
    }
}
