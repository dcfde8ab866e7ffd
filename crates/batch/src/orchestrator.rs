//! The batch loop: one certificate per data row.

use crate::converter::FormatConverter;
use crate::naming;
use crate::source::read_data_source;
use certgen_core::{DataSet, Error, ReplacementMap, Result, Row, Substituter};
use certgen_pptx::PptxTemplate;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// The three paths a batch runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Slide-deck template with `{{column}}` tokens.
    pub template: PathBuf,
    /// CSV/TSV file with a header row and a `name` column.
    pub data_source: PathBuf,
    /// Directory receiving the converted files. Created if missing.
    pub output_dir: PathBuf,
}

impl BatchConfig {
    pub fn new(
        template: impl Into<PathBuf>,
        data_source: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            template: template.into(),
            data_source: data_source.into(),
            output_dir: output_dir.into(),
        }
    }
}

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    /// Converted; the intermediate document was removed.
    Converted { output: PathBuf },
    /// Conversion failed; the intermediate document was kept for inspection.
    ConversionFailed { intermediate: PathBuf },
    /// The row could not be processed up to conversion.
    Failed { error: String },
}

/// Outcome of one row, with enough context to find it in the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowOutcome {
    /// Line of the row in the data source.
    pub line: usize,
    /// The row's `name` value, if it had one.
    pub name: Option<String>,
    #[serde(flatten)]
    pub status: RowStatus,
}

/// Per-row outcomes of a batch, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub rows: Vec<RowOutcome>,
}

impl BatchReport {
    /// Rows whose converted file was written.
    pub fn converted(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.status, RowStatus::Converted { .. }))
            .count()
    }

    /// Rows that did not end with a converted file.
    pub fn failed(&self) -> usize {
        self.rows.len() - self.converted()
    }

    /// True when every row was converted.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// One-line summary for logs and dialogs.
    pub fn summary(&self) -> String {
        format!(
            "{} of {} certificate(s) generated, {} failed",
            self.converted(),
            self.rows.len(),
            self.failed()
        )
    }
}

/// Runs a batch with a given converter.
pub struct BatchRunner<C> {
    config: BatchConfig,
    converter: C,
    substituter: Substituter,
}

impl<C: FormatConverter> BatchRunner<C> {
    pub fn new(config: BatchConfig, converter: C) -> Self {
        Self {
            config,
            converter,
            substituter: Substituter::new(),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Reject empty paths. An empty output directory would otherwise
    /// resolve to the working directory.
    fn check_paths(&self) -> Result<()> {
        let paths = [
            ("template", &self.config.template),
            ("data source", &self.config.data_source),
            ("output directory", &self.config.output_dir),
        ];
        for (what, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(Error::MissingPath(what));
            }
        }
        Ok(())
    }

    /// Generate one certificate per data row.
    ///
    /// Fails as a whole only when a path is unset, or when the output
    /// directory, the data source or the template cannot be used. A failing row is logged and recorded in
    /// the report, and the batch moves on to the next row.
    pub fn run(&self) -> Result<BatchReport> {
        self.check_paths()?;
        fs::create_dir_all(&self.config.output_dir)?;

        let data = read_data_source(&self.config.data_source)?;
        log::info!(
            "Loaded {} row(s) with columns [{}] from {}",
            data.len(),
            data.columns.join(", "),
            self.config.data_source.display()
        );

        let template = PptxTemplate::open(&self.config.template)?;

        let mut report = BatchReport::default();
        for row in &data.rows {
            let status = match self.process_row(&template, &data, row) {
                Ok(status) => status,
                Err(e) => {
                    log::error!("Row on line {} failed: {}", row.line, e);
                    RowStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.rows.push(RowOutcome {
                line: row.line,
                name: data.name_of(row).ok().map(str::to_string),
                status,
            });
        }

        log::info!("{}", report.summary());
        Ok(report)
    }

    fn process_row(&self, template: &PptxTemplate, data: &DataSet, row: &Row) -> Result<RowStatus> {
        let replacements = ReplacementMap::for_row(data, row)?;
        let name = data.name_of(row)?;

        let mut deck = template.deck()?;
        let stats = self.substituter.apply(&mut deck, &replacements);
        log::debug!(
            "Row on line {}: {} replacement(s) in {} run(s)",
            row.line,
            stats.replacements,
            stats.runs_changed
        );
        for token in self.substituter.split_tokens(&deck, &replacements) {
            log::warn!(
                "{} is split across text runs in the template and was not replaced",
                token
            );
        }
        for token in self.substituter.unresolved_tokens(&deck) {
            log::warn!("{} has no matching column and was left as is", token);
        }

        let timestamp = naming::timestamp(&Local::now());
        let paths = naming::output_paths(&self.config.output_dir, name, row.line, &timestamp);

        template.save(&deck, &paths.intermediate)?;
        log::info!("Generated PPTX: {}", paths.intermediate.display());

        if self.converter.convert(&paths.intermediate, &paths.converted) {
            fs::remove_file(&paths.intermediate)?;
            log::info!("Deleted PPTX: {}", paths.intermediate.display());
            Ok(RowStatus::Converted {
                output: paths.converted,
            })
        } else {
            log::warn!(
                "Kept PPTX: {} due to conversion failure",
                paths.intermediate.display()
            );
            Ok(RowStatus::ConversionFailed {
                intermediate: paths.intermediate,
            })
        }
    }
}
