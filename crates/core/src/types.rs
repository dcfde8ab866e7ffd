//! Document tree for a slide deck template.
//!
//! Mirrors the layout of a presentation: slides hold shapes, shapes may
//! hold a text frame, text frames hold paragraphs, paragraphs hold runs.
//! Only run text is editable; everything else about a run's formatting
//! stays in the template file and is carried through on save.

use serde::{Deserialize, Serialize};

/// An entire slide deck loaded from a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create an empty deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slide to the deck.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Iterate over every text run in document order.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.paragraphs().flat_map(|p| p.runs.iter())
    }

    /// Iterate over every paragraph of every text-bearing shape.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.slides
            .iter()
            .flat_map(|s| s.shapes.iter())
            .filter_map(|shape| shape.text_frame.as_ref())
            .flat_map(|frame| frame.paragraphs.iter())
    }

    /// Iterate mutably over every text run in document order.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut TextRun> {
        self.slides
            .iter_mut()
            .flat_map(|s| s.shapes.iter_mut())
            .filter_map(|shape| shape.text_frame.as_mut())
            .flat_map(|frame| frame.paragraphs.iter_mut())
            .flat_map(|p| p.runs.iter_mut())
    }
}

/// A single slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Name of the archive part this slide was read from (e.g. `ppt/slides/slide1.xml`).
    pub part_name: String,

    /// Shapes in document order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create a new slide with the given number and part name.
    pub fn new(number: usize, part_name: impl Into<String>) -> Self {
        Self {
            number,
            part_name: part_name.into(),
            shapes: Vec::new(),
        }
    }

    /// Iterate over every text run on this slide.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.shapes
            .iter()
            .filter_map(|shape| shape.text_frame.as_ref())
            .flat_map(|frame| frame.paragraphs.iter())
            .flat_map(|p| p.runs.iter())
    }
}

/// A shape on a slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Shape name from its non-visual properties, if any.
    pub name: Option<String>,

    /// Text frame, present only for text-bearing shapes.
    pub text_frame: Option<TextFrame>,
}

/// The text body of a shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

/// A paragraph within a text frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    /// Create a paragraph from run texts.
    pub fn from_runs<I, S>(runs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            runs: runs.into_iter().map(TextRun::new).collect(),
        }
    }

    /// The paragraph's text with all runs joined.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
}

impl TextRun {
    /// Create a run with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
