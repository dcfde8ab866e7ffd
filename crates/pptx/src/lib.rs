//! PPTX (Office Open XML) template backend for certificate generation.
//!
//! Reads a .pptx archive into a [`certgen_core::Deck`] and writes an
//! edited deck back out, carrying every part the deck does not model
//! through untouched.

mod scope;

pub mod parser;
pub mod template;
pub mod writer;

pub use template::PptxTemplate;
