//! Document conversion through an external office application.

use certgen_core::{Error, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// LibreOffice export filter for presentations to PDF.
pub const PDF_FILTER: &str = "pdf:impress_pdf_Export";

/// Default office binary, looked up on `PATH`.
pub const DEFAULT_OFFICE_PROGRAM: &str = "soffice";

/// Converts one document into another format.
///
/// Returns `true` only when `target` was written. Implementations log the
/// cause of a failure; callers only act on the outcome.
pub trait FormatConverter {
    fn convert(&self, source: &Path, target: &Path) -> bool;
}

impl<T: FormatConverter + ?Sized> FormatConverter for &T {
    fn convert(&self, source: &Path, target: &Path) -> bool {
        (**self).convert(source, target)
    }
}

/// Converts presentations to PDF with a headless LibreOffice process.
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    program: PathBuf,
    profile_dir: Option<PathBuf>,
}

impl Default for OfficeConverter {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_OFFICE_PROGRAM),
            profile_dir: None,
        }
    }
}

impl OfficeConverter {
    /// Create a converter that runs `soffice` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific office binary.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Run with a private user profile, so conversion works while another
    /// LibreOffice instance is open.
    pub fn with_profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_dir = Some(dir.into());
        self
    }

    /// Convert `source` to PDF at `target`, reporting why it failed.
    pub fn try_convert(&self, source: &Path, target: &Path) -> Result<()> {
        if !source.is_file() {
            return Err(Error::SourceNotFound(source.to_path_buf()));
        }

        let out_dir = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = source
            .file_stem()
            .ok_or_else(|| Error::ConversionFailed(format!("{} has no file name", source.display())))?;
        let mut produced_name = stem.to_os_string();
        produced_name.push(".pdf");
        let produced = out_dir.join(produced_name);

        let mut command = Command::new(&self.program);
        if let Some(profile) = &self.profile_dir {
            command.arg(format!("-env:UserInstallation={}", file_url(profile)));
        }
        command
            .arg("--headless")
            .arg("--norestore")
            .arg("--convert-to")
            .arg(PDF_FILTER)
            .arg("--outdir")
            .arg(&out_dir)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Anything already at these paths belongs to someone else.
        let produced_existed = produced.exists();
        let target_existed = target.exists();

        let result = self.run_office(command, source, &produced, target);
        if result.is_err() {
            if !produced_existed {
                remove_partial_output(&produced);
            }
            if !target_existed && produced != target {
                remove_partial_output(target);
            }
        }
        result
    }

    /// Run the office process and move its output into place.
    fn run_office(
        &self,
        mut command: Command,
        source: &Path,
        produced: &Path,
        target: &Path,
    ) -> Result<()> {
        log::debug!("Running {:?}", command);
        let child = command.spawn().map_err(|e| Error::LaunchFailed {
            program: self.program.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut process = OfficeProcess { child };

        // Localized builds do not always write UTF-8 diagnostics.
        let mut stderr = Vec::new();
        if let Some(mut pipe) = process.child.stderr.take() {
            pipe.read_to_end(&mut stderr)?;
        }
        let stderr = String::from_utf8_lossy(&stderr);
        let status = process.child.wait()?;

        if !status.success() {
            return Err(Error::ConversionFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                status,
                stderr.trim()
            )));
        }
        if !produced.is_file() {
            return Err(Error::ConversionFailed(format!(
                "{} produced no output for {}",
                self.program.display(),
                source.display()
            )));
        }
        if produced != target {
            fs::rename(produced, target)?;
        }

        Ok(())
    }
}

/// Remove a file left behind by a failed conversion.
fn remove_partial_output(path: &Path) {
    if path.exists() {
        match fs::remove_file(path) {
            Ok(()) => log::debug!("Removed partial output {}", path.display()),
            Err(e) => log::warn!("Failed to remove partial output {}: {}", path.display(), e),
        }
    }
}

impl FormatConverter for OfficeConverter {
    fn convert(&self, source: &Path, target: &Path) -> bool {
        match self.try_convert(source, target) {
            Ok(()) => {
                log::info!("Converted {} to {}", source.display(), target.display());
                true
            }
            Err(e) => {
                log::error!("Failed to convert {} to PDF: {}", source.display(), e);
                false
            }
        }
    }
}

/// Owns the office process for the length of one conversion.
///
/// Dropping it kills and reaps the process if it is still running, so no
/// exit path out of `try_convert` leaves it behind.
struct OfficeProcess {
    child: Child,
}

impl Drop for OfficeProcess {
    fn drop(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        log::warn!("Terminating office process {}", self.child.id());
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// `file://` URL for a local directory, as LibreOffice expects for profiles.
fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}
