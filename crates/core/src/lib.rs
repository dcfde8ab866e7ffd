//! Core document tree, data rows, and placeholder substitution
//! for certificate generation.

pub mod data;
pub mod error;
pub mod placeholder;
pub mod substitute;
pub mod types;

pub use data::{DataSet, Row, NAME_COLUMN};
pub use error::{Error, Result};
pub use placeholder::ReplacementMap;
pub use substitute::{SubstitutionStats, Substituter};
pub use types::{Deck, Paragraph, Shape, Slide, TextFrame, TextRun};
