//! A PPTX template held in memory.

use crate::parser::{parse_slide, read_file_from_archive, slide_order};
use crate::writer::rewrite_slide;
use certgen_core::{Deck, Error, Result};
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A loaded PPTX template.
///
/// Keeps the original archive bytes so that a populated copy can be written
/// with every part the [`Deck`] does not model (layouts, masters, media,
/// themes) carried over byte for byte.
#[derive(Debug, Clone)]
pub struct PptxTemplate {
    bytes: Vec<u8>,
    slide_parts: Vec<String>,
}

impl PptxTemplate {
    /// Open a template from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        log::debug!("Loaded template {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(bytes)
    }

    /// Load a template from the bytes of a .pptx file.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let slide_parts = {
            let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice()))
                .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;
            slide_order(&mut archive)?
        };
        Ok(Self { bytes, slide_parts })
    }

    /// Slide part names in presentation order.
    pub fn slide_parts(&self) -> &[String] {
        &self.slide_parts
    }

    /// Parse the template into a fresh, independent document tree.
    pub fn deck(&self) -> Result<Deck> {
        let mut archive = self.archive()?;
        let mut deck = Deck::new();
        for (idx, part_name) in self.slide_parts.iter().enumerate() {
            let content = read_file_from_archive(&mut archive, part_name)?;
            deck.add_slide(parse_slide(&content, idx + 1, part_name)?);
        }
        Ok(deck)
    }

    /// Produce the bytes of a .pptx with the deck's run text written in.
    pub fn render(&self, deck: &Deck) -> Result<Vec<u8>> {
        let mut archive = self.archive()?;
        let mut zip = ZipWriter::new(Cursor::new(Vec::with_capacity(self.bytes.len())));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for idx in 0..archive.len() {
            let mut file = archive
                .by_index(idx)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", idx, e)))?;
            let name = file.name().to_string();

            if !self.slide_parts.contains(&name) {
                zip.raw_copy_file(file)
                    .map_err(|e| Error::ZipError(format!("Failed to copy '{}': {}", name, e)))?;
                continue;
            }

            let slide = deck
                .slides
                .iter()
                .find(|s| s.part_name == name)
                .ok_or_else(|| Error::TemplateMismatch(format!("No slide for part {}", name)))?;

            let mut content = String::new();
            file.read_to_string(&mut content)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            let rewritten = rewrite_slide(&content, slide)?;

            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(&rewritten)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }

    /// Write a populated copy of the template to `path`.
    pub fn save(&self, deck: &Deck, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.render(deck)?;
        fs::write(path, bytes)?;
        log::debug!("Saved {}", path.display());
        Ok(())
    }

    fn archive(&self) -> Result<ZipArchive<Cursor<&[u8]>>> {
        ZipArchive::new(Cursor::new(self.bytes.as_slice()))
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))
    }
}
