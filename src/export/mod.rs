//! Exporting objects to files through a registry of format exporters.
//!
//! For every destination path an exporter is picked by the path's extension:
//! an exporter qualifies when it supports the object and lists the extension
//! (compared ASCII case-insensitively) or the wildcard `*`. When several
//! qualify the first one wins, unless one of them carries the name the object
//! prefers.

pub mod texture;

use crate::error::{ExportError, ExportReport};
use crate::filesystem::{FileSystem, RealFileSystem};
use image::DynamicImage;
use log::{debug, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub use texture::{LightmapTexture, TextureExporter};

/// Something that can be handed to an [`Exporter`].
pub trait Exportable {
    fn name(&self) -> &str;

    /// Name of the exporter to use when several match the destination.
    fn preferred_exporter(&self) -> Option<&str> {
        None
    }

    /// Objects from packages that forbid exporting return `false`.
    fn allows_export(&self) -> bool {
        true
    }

    /// Pixel data for objects that are textures.
    fn texture(&self) -> Option<&DynamicImage> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Exported,
    /// Stop the remaining batch, this object was not written
    CancelBatch,
}

pub trait Exporter {
    fn name(&self) -> &str;

    /// File extensions without the dot, `*` matches any extension.
    fn format_extensions(&self) -> &[&str];

    fn supports(&self, object: &dyn Exportable) -> bool;

    fn export(
        &self,
        object: &dyn Exportable,
        path: &Path,
        fs: &dyn FileSystem,
    ) -> io::Result<ExportStatus>;

    /// Called once before the first object of a batch goes to this exporter.
    fn begin_batch(&self) {}

    /// Called once at the end of a batch this exporter took part in.
    fn end_batch(&self) {}

    fn handles_extension(&self, extension: &str) -> bool {
        self.format_extensions()
            .iter()
            .any(|candidate| *candidate == "*" || candidate.eq_ignore_ascii_case(extension))
    }
}

#[derive(Default)]
pub struct ExporterRegistry {
    exporters: Vec<Box<dyn Exporter>>,
}

impl ExporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the exporters this crate ships.
    pub fn with_default_exporters() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TextureExporter));
        registry
    }

    pub fn register(&mut self, exporter: Box<dyn Exporter>) {
        self.exporters.push(exporter);
    }

    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }

    /// Index of the exporter to use for writing `object` to `path`.
    pub fn find_exporter(&self, object: &dyn Exportable, path: &Path) -> Option<usize> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();
        let valid: Vec<usize> = self
            .exporters
            .iter()
            .enumerate()
            .filter(|(_, exporter)| {
                exporter.supports(object) && exporter.handles_extension(&extension)
            })
            .map(|(index, _)| index)
            .collect();

        let first = *valid.first()?;
        let preferred = object.preferred_exporter().and_then(|preferred| {
            valid
                .iter()
                .copied()
                .find(|index| self.exporters[*index].name() == preferred)
        });
        Some(preferred.unwrap_or(first))
    }
}

/// Export objects to the paired destination paths on the real file system.
pub fn export_objects(
    objects: &[Option<&dyn Exportable>],
    dest_paths: &[PathBuf],
    registry: &ExporterRegistry,
) -> Result<ExportReport, ExportError> {
    export_objects_fs(objects, dest_paths, registry, &RealFileSystem)
}

/// Export objects to the paired destination paths.
///
/// Only a length mismatch between `objects` and `dest_paths` is an error.
/// Anything going wrong for a single object is logged, recorded in the
/// report and the batch moves on.
#[instrument(skip_all, fields(count = objects.len()))]
pub fn export_objects_fs(
    objects: &[Option<&dyn Exportable>],
    dest_paths: &[PathBuf],
    registry: &ExporterRegistry,
    fs: &dyn FileSystem,
) -> Result<ExportReport, ExportError> {
    if objects.len() != dest_paths.len() {
        return Err(ExportError::MismatchedBatch {
            objects: objects.len(),
            paths: dest_paths.len(),
        });
    }
    info!("Exporting {} objects", objects.len());

    let mut report = ExportReport::default();
    let mut used_exporters: Vec<usize> = Vec::new();

    for (index, (object, path)) in objects.iter().zip(dest_paths).enumerate() {
        debug!("Exporting ({} of {})", index + 1, objects.len());
        let Some(object) = object else {
            continue;
        };
        if !object.allows_export() {
            debug!("Export of {} is not allowed, skipping", object.name());
            continue;
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs.create_dir_all(parent) {
                let err = ExportError::DirectoryUnavailable {
                    path: parent.to_path_buf(),
                    source: Some(e),
                };
                warn!("{err}");
                report.failures.push(err);
                continue;
            }
        }
        if fs.is_read_only(path) {
            let err = ExportError::write_failure(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "file is read-only"),
            );
            warn!("{err}");
            report.failures.push(err);
            continue;
        }

        let Some(exporter_index) = registry.find_exporter(*object, path) else {
            let err = ExportError::NoExporter {
                path: path.to_path_buf(),
            };
            warn!("{err}");
            report.failures.push(err);
            continue;
        };
        let exporter = &registry.exporters[exporter_index];
        if !used_exporters.contains(&exporter_index) {
            exporter.begin_batch();
            used_exporters.push(exporter_index);
        }

        debug!(
            "Exporting {} to {} with {}",
            object.name(),
            path.display(),
            exporter.name()
        );
        match exporter.export(*object, path, fs) {
            Ok(ExportStatus::Exported) => report.written.push(path.to_path_buf()),
            Ok(ExportStatus::CancelBatch) => {
                info!("Export batch cancelled by {}", exporter.name());
                report.cancelled = true;
                break;
            }
            Err(e) => {
                let err = ExportError::write_failure(path, e);
                warn!("{err}");
                report.failures.push(err);
            }
        }
    }

    for exporter_index in used_exporters {
        registry.exporters[exporter_index].end_batch();
    }

    info!(
        "✓ {} objects exported, {} failed",
        report.written.len(),
        report.failures.len()
    );
    Ok(report)
}
