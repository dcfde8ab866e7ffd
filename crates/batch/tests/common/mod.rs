//! Shared fixtures: a minimal PPTX template and a scripted converter.

#![allow(dead_code)]

use certgen_batch::FormatConverter;
use std::cell::RefCell;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/></Types>"#;

const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#;

const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/></Relationships>"#;

/// Write a one-slide certificate template whose runs are `runs`.
pub fn write_template(path: &Path, runs: &[&str]) {
    let runs_xml: String = runs
        .iter()
        .map(|t| format!(r#"<a:r><a:rPr lang="en-US" sz="3600"/><a:t>{}</a:t></a:r>"#, t))
        .collect();
    let slide = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Recipient"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p>{}</a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
        runs_xml
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("ppt/presentation.xml", PRESENTATION.to_string()),
        ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS.to_string()),
        ("ppt/slides/slide1.xml", slide),
    ];
    for (name, content) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    fs::write(path, zip.finish().unwrap().into_inner()).unwrap();
}

/// Converter double: writes the target unless told to fail for a source.
#[derive(Default)]
pub struct FakeConverter {
    fail_when_contains: Option<String>,
    pub calls: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl FakeConverter {
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Fail for every source whose file name contains `needle`.
    pub fn failing_for(needle: &str) -> Self {
        Self {
            fail_when_contains: Some(needle.to_string()),
            ..Self::default()
        }
    }
}

impl FormatConverter for FakeConverter {
    fn convert(&self, source: &Path, target: &Path) -> bool {
        self.calls
            .borrow_mut()
            .push((source.to_path_buf(), target.to_path_buf()));
        if !source.is_file() {
            return false;
        }
        let file_name = source.file_name().unwrap().to_string_lossy().to_string();
        if let Some(needle) = &self.fail_when_contains {
            if file_name.contains(needle.as_str()) {
                return false;
            }
        }
        fs::write(target, b"%PDF-1.4\n").is_ok()
    }
}

/// Files in `dir` with the given extension, sorted by name.
pub fn files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(ext))
        .collect();
    files.sort();
    files
}
