//! The "Export Lightmap" command for a whole world.
//!
//! Textures go to `<dir>/<WorldName>/<TextureName>.png`, the actor metadata
//! files end up next to them.

use crate::error::{ExportError, ExportReport};
use crate::export::{Exportable, ExporterRegistry, export_objects_fs};
use crate::filesystem::{FileSystem, RealFileSystem};
use crate::lightmap::metadata::export_lightmap_metadata_fs;
use crate::options::ExportOptions;
use crate::scene::World;
use crate::util::{MAX_FILE_NAME_BYTES, file_stem};
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const EXPORT_DIRECTORY_PROMPT: &str = "Select Directory to Export Lightmap";

const LIGHTMAP_EXTENSION: &str = "png";
const WORLD_DIRECTORY_FALLBACK: &str = "World";

/// Asks where to export to, `None` when the user cancels.
pub trait DirectoryPrompt {
    fn select_directory(&self, title: &str, default_path: Option<&Path>) -> Option<PathBuf>;
}

/// A prompt that always answers with the same directory.
pub struct FixedDirectory(pub PathBuf);

impl DirectoryPrompt for FixedDirectory {
    fn select_directory(&self, _title: &str, _default_path: Option<&Path>) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Export the lightmaps of `world` into a directory chosen by `prompt`
pub fn export_world_lightmaps(
    world: &World,
    prompt: &dyn DirectoryPrompt,
    exporters: &ExporterRegistry,
    options: &ExportOptions,
) -> Result<ExportReport, ExportError> {
    export_world_lightmaps_fs(world, prompt, exporters, options, &RealFileSystem)
}

/// Export the lightmaps of `world` into `dir`
pub fn export_world_lightmaps_to<P: AsRef<Path>>(
    world: &World,
    dir: &P,
    exporters: &ExporterRegistry,
    options: &ExportOptions,
) -> Result<ExportReport, ExportError> {
    let prompt = FixedDirectory(dir.as_ref().to_path_buf());
    export_world_lightmaps_fs(world, &prompt, exporters, options, &RealFileSystem)
}

#[instrument(skip_all, fields(world = %world.name))]
pub fn export_world_lightmaps_fs(
    world: &World,
    prompt: &dyn DirectoryPrompt,
    exporters: &ExporterRegistry,
    options: &ExportOptions,
    fs: &dyn FileSystem,
) -> Result<ExportReport, ExportError> {
    info!("=== Starting lightmap export for world {} ===", world.name);

    let Some(selected_dir) =
        prompt.select_directory(EXPORT_DIRECTORY_PROMPT, options.get_default_directory())
    else {
        warn!("User cancelled the directory selection.");
        return Err(ExportError::UserCancelled);
    };
    let world_dir_name = file_stem(&world.name, MAX_FILE_NAME_BYTES)
        .unwrap_or_else(|| WORLD_DIRECTORY_FALLBACK.to_string());
    if world_dir_name != world.name {
        info!(
            "World name {:?} is not a valid directory name, using {}",
            world.name, world_dir_name
        );
    }
    let export_dir = selected_dir.join(world_dir_name);
    info!("Target directory: {}", export_dir.display());

    let (textures, texture_paths) = lightmap_export_list(world, &export_dir);
    info!("Writing {} lightmap textures...", textures.len());
    let mut report = export_objects_fs(&textures, &texture_paths, exporters, fs)?;

    info!("Writing lightmap metadata...");
    let metadata_report =
        export_lightmap_metadata_fs(&world.actors, &world.build_data, &export_dir, options, fs)?;
    report.merge(metadata_report);

    info!(
        "=== Lightmap export finished: {} files written, {} failures ===",
        report.written.len(),
        report.failures.len()
    );
    Ok(report)
}

/// Textures paired with their destinations, one entry per destination path.
fn lightmap_export_list<'a>(
    world: &'a World,
    export_dir: &Path,
) -> (Vec<Option<&'a dyn Exportable>>, Vec<PathBuf>) {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut objects: Vec<Option<&'a dyn Exportable>> = Vec::new();
    let mut paths = Vec::new();
    let max_stem_bytes = MAX_FILE_NAME_BYTES - LIGHTMAP_EXTENSION.len() - 1;
    for (index, texture) in world.lightmap_textures.iter().enumerate() {
        let stem =
            file_stem(&texture.name, max_stem_bytes).unwrap_or_else(|| format!("Lightmap_{index}"));
        let path = export_dir.join(format!("{stem}.{LIGHTMAP_EXTENSION}"));
        if seen.insert(path.clone()) {
            objects.push(Some(texture));
            paths.push(path);
        }
    }
    (objects, paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::texture::LightmapTexture;
    use crate::filesystem::MemoryFileSystem;
    use crate::guid::Guid;
    use crate::lightmap::{LightmapBuildData, LightmapEncoding};
    use crate::scene::{Actor, Component, MeshLodInfo, StaticMeshComponent};
    use image::{DynamicImage, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use testresult::TestResult;

    struct CancellingPrompt;

    impl DirectoryPrompt for CancellingPrompt {
        fn select_directory(&self, _title: &str, _default_path: Option<&Path>) -> Option<PathBuf> {
            None
        }
    }

    struct RecordingPrompt {
        asked: RefCell<Vec<(String, Option<PathBuf>)>>,
    }

    impl DirectoryPrompt for RecordingPrompt {
        fn select_directory(&self, title: &str, default_path: Option<&Path>) -> Option<PathBuf> {
            self.asked
                .borrow_mut()
                .push((title.to_string(), default_path.map(Path::to_path_buf)));
            default_path.map(Path::to_path_buf)
        }
    }

    fn texture(name: &str) -> LightmapTexture {
        LightmapTexture::new(name, DynamicImage::ImageRgba8(RgbaImage::new(2, 2)))
    }

    fn world() -> World {
        let id = Guid::new(1, 2, 3, 4);
        let mut world = World::new("Level01");
        world.build_data.insert(
            id,
            LightmapBuildData {
                hq_texture: "Lightmap_0".to_string(),
                lq_texture: "Lightmap_1".to_string(),
                encoding: LightmapEncoding::default(),
            },
        );
        let body = Component::static_mesh(
            "Body",
            StaticMeshComponent {
                lod_data: vec![MeshLodInfo {
                    map_build_data_id: id,
                }],
                mesh_lightmap_resolution: 64,
                overridden_lightmap_resolution: None,
            },
        );
        let wall = Actor::new("Wall_01", Guid::new(0, 0, 0, 0xABCD)).with_component(body);
        world.actors.push(Some(wall));
        world.lightmap_textures = vec![
            texture("Lightmap_0"),
            texture("Lightmap_1"),
            texture("Lightmap_0"),
        ];
        world
    }

    #[test]
    fn test_export_world() -> TestResult {
        let fs = MemoryFileSystem::new();

        let report = export_world_lightmaps_fs(
            &world(),
            &FixedDirectory(PathBuf::from("exports")),
            &ExporterRegistry::with_default_exporters(),
            &ExportOptions::default(),
            &fs,
        )?;

        assert!(report.is_success());
        assert_eq!(
            report.written,
            vec![
                PathBuf::from("exports/Level01/Lightmap_0.png"),
                PathBuf::from("exports/Level01/Lightmap_1.png"),
                PathBuf::from("exports/Level01/Wall_01.json"),
            ]
        );
        assert_eq!(fs.list_files().len(), 3);
        Ok(())
    }

    #[test]
    fn test_cancelled_prompt_touches_nothing() {
        let fs = MemoryFileSystem::new();

        let result = export_world_lightmaps_fs(
            &world(),
            &CancellingPrompt,
            &ExporterRegistry::with_default_exporters(),
            &ExportOptions::default(),
            &fs,
        );

        assert!(matches!(result, Err(ExportError::UserCancelled)));
        assert!(fs.list_files().is_empty());
        assert!(!fs.exists(Path::new("Level01")));
    }

    #[test]
    fn test_prompt_gets_title_and_default_directory() -> TestResult {
        let fs = MemoryFileSystem::new();
        let prompt = RecordingPrompt {
            asked: RefCell::new(vec![]),
        };
        let options = ExportOptions::new().default_directory("last");

        export_world_lightmaps_fs(
            &world(),
            &prompt,
            &ExporterRegistry::with_default_exporters(),
            &options,
            &fs,
        )?;

        assert_eq!(
            *prompt.asked.borrow(),
            vec![(
                EXPORT_DIRECTORY_PROMPT.to_string(),
                Some(PathBuf::from("last"))
            )]
        );
        assert!(fs.exists(Path::new("last/Level01/Wall_01.json")));
        Ok(())
    }

    #[test]
    fn test_world_without_textures_still_exports_metadata() -> TestResult {
        let fs = MemoryFileSystem::new();
        let mut world = world();
        world.lightmap_textures.clear();

        let report = export_world_lightmaps_fs(
            &world,
            &FixedDirectory(PathBuf::from("exports")),
            &ExporterRegistry::new(),
            &ExportOptions::default(),
            &fs,
        )?;

        assert_eq!(
            report.written,
            vec![PathBuf::from("exports/Level01/Wall_01.json")]
        );
        Ok(())
    }

    #[test]
    fn test_textures_without_exporter_are_reported() -> TestResult {
        let fs = MemoryFileSystem::new();

        let report = export_world_lightmaps_fs(
            &world(),
            &FixedDirectory(PathBuf::from("exports")),
            &ExporterRegistry::new(),
            &ExportOptions::default(),
            &fs,
        )?;

        assert_eq!(report.failures.len(), 2);
        assert_eq!(
            report.written,
            vec![PathBuf::from("exports/Level01/Wall_01.json")]
        );
        Ok(())
    }

    #[test]
    fn test_names_cannot_leave_the_selected_directory() -> TestResult {
        let fs = MemoryFileSystem::new();
        let mut world = world();
        world.name = "/abs/elsewhere".to_string();
        world.lightmap_textures = vec![texture("../../escaped"), texture("..")];

        let report = export_world_lightmaps_fs(
            &world,
            &FixedDirectory(PathBuf::from("exports")),
            &ExporterRegistry::with_default_exporters(),
            &ExportOptions::default(),
            &fs,
        )?;

        assert!(report.is_success());
        assert_eq!(
            report.written,
            vec![
                PathBuf::from("exports/abselsewhere/....escaped.png"),
                PathBuf::from("exports/abselsewhere/Lightmap_1.png"),
                PathBuf::from("exports/abselsewhere/Wall_01.json"),
            ]
        );
        for file in fs.list_files() {
            assert!(file.starts_with("exports/abselsewhere/"), "{file}");
        }
        Ok(())
    }

    #[test]
    fn test_unusable_world_name_falls_back() -> TestResult {
        let fs = MemoryFileSystem::new();
        let mut world = world();
        world.name = "..".to_string();

        let report = export_world_lightmaps_fs(
            &world,
            &FixedDirectory(PathBuf::from("exports")),
            &ExporterRegistry::with_default_exporters(),
            &ExportOptions::default(),
            &fs,
        )?;

        assert!(report.is_success());
        assert!(fs.exists(Path::new("exports/World/Wall_01.json")));
        assert!(!fs.exists(Path::new("Wall_01.json")));
        Ok(())
    }
}
