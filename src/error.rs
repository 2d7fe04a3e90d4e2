use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ExportError {
    /// The output directory is missing and could not or may not be created.
    DirectoryUnavailable {
        path: PathBuf,
        source: Option<io::Error>,
    },
    /// Writing a single file failed.
    WriteFailure { path: PathBuf, source: io::Error },
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// No registered exporter handles the object for this destination.
    NoExporter { path: PathBuf },
    /// Objects and destination paths were not paired up.
    MismatchedBatch { objects: usize, paths: usize },
    /// The directory selection was cancelled, nothing was exported.
    UserCancelled,
}

impl ExportError {
    pub(crate) fn write_failure(path: &Path, source: io::Error) -> Self {
        ExportError::WriteFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The file or directory the error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ExportError::DirectoryUnavailable { path, .. }
            | ExportError::WriteFailure { path, .. }
            | ExportError::Serialization { path, .. }
            | ExportError::NoExporter { path } => Some(path),
            ExportError::MismatchedBatch { .. } | ExportError::UserCancelled => None,
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportError::DirectoryUnavailable { source, .. } => {
                source.as_ref().map(|e| e as &(dyn Error + 'static))
            }
            ExportError::WriteFailure { source, .. } => Some(source),
            ExportError::Serialization { source, .. } => Some(source),
            ExportError::NoExporter { .. }
            | ExportError::MismatchedBatch { .. }
            | ExportError::UserCancelled => None,
        }
    }
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::DirectoryUnavailable { path, source: None } => {
                write!(f, "Directory {} does not exist", path.display())
            }
            ExportError::DirectoryUnavailable {
                path,
                source: Some(error),
            } => write!(f, "Failed to make directory {}: {error}", path.display()),
            ExportError::WriteFailure { path, source } => write!(
                f,
                "Couldn't write to file '{}'. Maybe file is read-only? ({source})",
                path.display()
            ),
            ExportError::Serialization { path, source } => {
                write!(f, "JSON error for {}: {source}", path.display())
            }
            ExportError::NoExporter { path } => {
                write!(f, "No exporter found for {}", path.display())
            }
            ExportError::MismatchedBatch { objects, paths } => write!(
                f,
                "Got {objects} objects to export but {paths} destination paths"
            ),
            ExportError::UserCancelled => write!(f, "User cancelled the directory selection"),
        }
    }
}

/// Outcome of a best-effort export run.
///
/// Per-file failures do not stop a run, they are collected here.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Files written, in write order
    pub written: Vec<PathBuf>,
    pub failures: Vec<ExportError>,
    /// An exporter asked to stop the remaining batch
    pub cancelled: bool,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub fn merge(&mut self, other: ExportReport) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
        self.cancelled |= other.cancelled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_and_source() {
        let err = ExportError::write_failure(
            Path::new("out/Wall.json"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            err.to_string(),
            "Couldn't write to file 'out/Wall.json'. Maybe file is read-only? (denied)"
        );
        assert!(err.source().is_some());
        assert_eq!(err.path(), Some(Path::new("out/Wall.json")));

        let missing = ExportError::DirectoryUnavailable {
            path: PathBuf::from("out"),
            source: None,
        };
        assert_eq!(missing.to_string(), "Directory out does not exist");
        assert!(missing.source().is_none());
        assert_eq!(ExportError::UserCancelled.path(), None);
    }

    #[test]
    fn test_report_merge() {
        let mut report = ExportReport {
            written: vec![PathBuf::from("a.png")],
            ..ExportReport::default()
        };
        assert!(report.is_success());
        report.merge(ExportReport {
            written: vec![PathBuf::from("b.json")],
            failures: vec![ExportError::NoExporter {
                path: PathBuf::from("c.xyz"),
            }],
            cancelled: false,
        });
        assert_eq!(
            report.written,
            vec![PathBuf::from("a.png"), PathBuf::from("b.json")]
        );
        assert!(!report.is_success());
    }
}
