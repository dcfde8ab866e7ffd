//! Tracks where the XML cursor sits relative to shape text.
//!
//! The parser and the writer both walk slide XML with this tracker, so
//! they agree on which `<a:r>` elements count as runs: only those in a
//! paragraph of a `<p:txBody>` that belongs to a `<p:sp>` shape. Table
//! cells and field elements (`<a:fld>`) are not runs.

/// What an element boundary means for shape text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    ShapeStart,
    ShapeEnd,
    BodyStart,
    BodyEnd,
    ParagraphStart,
    ParagraphEnd,
    RunStart,
    RunEnd,
    TextStart,
    TextEnd,
    Other,
}

#[derive(Debug, Default)]
pub(crate) struct TextScope {
    in_shape: bool,
    in_body: bool,
    in_paragraph: bool,
    in_run: bool,
    in_text: bool,
}

impl TextScope {
    /// Record an opening tag.
    pub(crate) fn open(&mut self, name: &[u8]) -> Marker {
        match local_name(name) {
            b"sp" if !self.in_shape => {
                self.in_shape = true;
                Marker::ShapeStart
            }
            b"txBody" if self.in_shape && !self.in_body => {
                self.in_body = true;
                Marker::BodyStart
            }
            b"p" if self.in_body && !self.in_paragraph => {
                self.in_paragraph = true;
                Marker::ParagraphStart
            }
            b"r" if self.in_paragraph && !self.in_run => {
                self.in_run = true;
                Marker::RunStart
            }
            b"t" if self.in_run && !self.in_text => {
                self.in_text = true;
                Marker::TextStart
            }
            _ => Marker::Other,
        }
    }

    /// Record a closing tag.
    pub(crate) fn close(&mut self, name: &[u8]) -> Marker {
        match local_name(name) {
            b"t" if self.in_text => {
                self.in_text = false;
                Marker::TextEnd
            }
            b"r" if self.in_run && !self.in_text => {
                self.in_run = false;
                Marker::RunEnd
            }
            b"p" if self.in_paragraph && !self.in_run => {
                self.in_paragraph = false;
                Marker::ParagraphEnd
            }
            b"txBody" if self.in_body && !self.in_paragraph => {
                self.in_body = false;
                Marker::BodyEnd
            }
            b"sp" if self.in_shape && !self.in_body => {
                self.in_shape = false;
                Marker::ShapeEnd
            }
            _ => Marker::Other,
        }
    }

    /// Whether the cursor is inside a run's `<a:t>`.
    pub(crate) fn in_text(&self) -> bool {
        self.in_text
    }
}

/// Extract the local name from a potentially namespaced XML name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
