//! Batch certificate generation: reads the data source, fills one template
//! copy per row, converts each copy to PDF and cleans up after itself.

pub mod converter;
pub mod naming;
pub mod orchestrator;
pub mod source;

pub use converter::{FormatConverter, OfficeConverter};
pub use orchestrator::{BatchConfig, BatchReport, BatchRunner, RowOutcome, RowStatus};
pub use source::read_data_source;
