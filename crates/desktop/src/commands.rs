//! Tauri commands behind the certificate form.

use certgen_batch::{BatchConfig, BatchRunner, OfficeConverter};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::{DialogExt, FilePath, MessageDialogKind};

/// The form's current selections.
#[derive(Debug, Default)]
pub struct FormState {
    selection: Mutex<Selection>,
}

#[derive(Debug, Default, Clone)]
struct Selection {
    template: Option<PathBuf>,
    data_source: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl Selection {
    /// Snapshot into a batch configuration. Unset paths stay empty and
    /// the batch rejects them before touching the filesystem.
    fn to_config(&self) -> BatchConfig {
        BatchConfig::new(
            self.template.clone().unwrap_or_default(),
            self.data_source.clone().unwrap_or_default(),
            self.output_dir.clone().unwrap_or_default(),
        )
    }
}

/// Which selection a picker updates.
#[derive(Debug, Clone, Copy)]
enum Field {
    Template,
    DataSource,
    OutputDir,
}

impl FormState {
    /// Store a picked path and return what the label should show.
    fn select(&self, field: Field, picked: Option<PathBuf>) -> Result<Option<String>, String> {
        let mut selection = self.selection.lock().map_err(|e| e.to_string())?;
        let slot = match field {
            Field::Template => &mut selection.template,
            Field::DataSource => &mut selection.data_source,
            Field::OutputDir => &mut selection.output_dir,
        };
        // A cancelled dialog keeps the previous choice.
        if picked.is_some() {
            *slot = picked;
        }
        Ok(slot.as_ref().map(|p| p.display().to_string()))
    }

    fn config(&self) -> Result<BatchConfig, String> {
        let selection = self.selection.lock().map_err(|e| e.to_string())?;
        Ok(selection.to_config())
    }
}

/// Result of a generate action, mirrored in the modal dialog.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResult {
    /// True when every row produced a PDF.
    pub success: bool,
    /// Summary shown to the user.
    pub message: String,
}

fn into_path(picked: Option<FilePath>) -> Result<Option<PathBuf>, String> {
    picked
        .map(|p| p.into_path())
        .transpose()
        .map_err(|e| format!("Invalid selection: {}", e))
}

/// Choose the slide-deck template.
#[tauri::command]
pub async fn pick_template(
    app: AppHandle,
    state: State<'_, FormState>,
) -> Result<Option<String>, String> {
    let picked = app
        .dialog()
        .file()
        .set_title("Select Template")
        .add_filter("PowerPoint", &["pptx"])
        .blocking_pick_file();
    state.select(Field::Template, into_path(picked)?)
}

/// Choose the data source.
#[tauri::command]
pub async fn pick_data_source(
    app: AppHandle,
    state: State<'_, FormState>,
) -> Result<Option<String>, String> {
    let picked = app
        .dialog()
        .file()
        .set_title("Select Data File")
        .add_filter("CSV", &["csv", "tsv"])
        .blocking_pick_file();
    state.select(Field::DataSource, into_path(picked)?)
}

/// Choose the output folder.
#[tauri::command]
pub async fn pick_output_dir(
    app: AppHandle,
    state: State<'_, FormState>,
) -> Result<Option<String>, String> {
    let picked = app
        .dialog()
        .file()
        .set_title("Select Output Folder")
        .blocking_pick_folder();
    state.select(Field::OutputDir, into_path(picked)?)
}

/// Run the batch on the current selections and report once.
#[tauri::command]
pub async fn generate_certificates(
    app: AppHandle,
    state: State<'_, FormState>,
) -> Result<GenerateResult, String> {
    let config = state.config()?;
    log::info!("Generating certificates with {:?}", config);

    let outcome = tauri::async_runtime::spawn_blocking(move || {
        BatchRunner::new(config, OfficeConverter::new()).run()
    })
    .await
    .map_err(|e| format!("Batch task failed: {}", e))?;

    let (success, kind, title, message) = match outcome {
        Ok(report) if report.is_success() => (
            true,
            MessageDialogKind::Info,
            "Success",
            format!("PDFs generated successfully!\n{}", report.summary()),
        ),
        Ok(report) => (
            false,
            MessageDialogKind::Warning,
            "Finished with errors",
            report.summary(),
        ),
        Err(e) => (
            false,
            MessageDialogKind::Error,
            "Error",
            format!("An error occurred: {}", e),
        ),
    };

    app.dialog()
        .message(message.clone())
        .kind(kind)
        .title(title)
        .blocking_show();

    Ok(GenerateResult { success, message })
}
