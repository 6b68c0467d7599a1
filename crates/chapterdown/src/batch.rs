//! Batch conversion of a directory of chapters.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::service::ChapterService;
use crate::ConversionError;

/// Errors that stop a batch before any file is converted
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory '{}' not found", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("No {extension} files found in directory '{}'", path.display())]
    NoInputFiles { path: PathBuf, extension: String },

    #[error("Cannot access directory '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Markdown files written
    pub written: Vec<PathBuf>,
    /// Files that failed, with the reason
    pub failures: Vec<ConversionError>,
}

impl BatchReport {
    /// Number of files converted
    pub fn converted(&self) -> usize {
        self.written.len()
    }

    /// Number of input files attempted
    pub fn total(&self) -> usize {
        self.written.len() + self.failures.len()
    }

    /// Check if every input converted
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// List the files in `dir` (not recursive) with the given extension, sorted by name
pub fn discover_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, BatchError> {
    let io_error = |source| BatchError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            inputs.push(path);
        }
    }

    inputs.sort();
    Ok(inputs)
}

/// Convert every chapter in `input_dir`, writing Markdown files into `output_dir`.
///
/// A failing file is logged and recorded in the report; the remaining files are
/// still converted.
pub fn convert_directory(
    service: &ChapterService,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchReport, BatchError> {
    let options = service.options();

    if !input_dir.is_dir() {
        return Err(BatchError::DirectoryNotFound(input_dir.to_path_buf()));
    }

    fs::create_dir_all(output_dir).map_err(|source| BatchError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let inputs = discover_inputs(input_dir, &options.source_extension)?;
    if inputs.is_empty() {
        return Err(BatchError::NoInputFiles {
            path: input_dir.to_path_buf(),
            extension: options.source_extension.to_uppercase(),
        });
    }

    log::info!(
        "Found {} {} files to process...",
        inputs.len(),
        options.source_extension.to_uppercase()
    );

    let mut report = BatchReport::default();
    for input in &inputs {
        let Some(stem) = input.file_stem() else {
            log::warn!("Skipping {}: no file stem", input.display());
            continue;
        };
        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(&options.target_extension);
        let output = output_dir.join(file_name);

        match service.convert_file(input, &output) {
            Ok(_) => {
                log::info!(
                    "Conversion completed: {} → {}",
                    input.display(),
                    output.display()
                );
                report.written.push(output);
            }
            Err(e) => {
                let name = input.file_name().unwrap_or_default().to_string_lossy();
                log::error!("Error converting {}: {}", name, e);
                report.failures.push(e);
            }
        }
    }

    log::info!(
        "Conversion completed: {}/{} files processed",
        report.converted(),
        report.total()
    );

    Ok(report)
}
