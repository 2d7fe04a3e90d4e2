//! Per-actor lightmap metadata export.
//!
//! Every actor with at least one static mesh component whose LOD 0 build data
//! resolves in the registry gets one JSON file in the output directory. Actors
//! are visited in scene order and components in actor order, so repeated
//! exports of the same scene produce identical files.

use super::BuildDataRegistry;
use super::json::{ActorLightmapJson, ComponentLightmapJson, to_json_bytes};
use crate::error::{ExportError, ExportReport};
use crate::filesystem::{FileSystem, RealFileSystem};
use crate::options::{ActorFileNaming, ExportOptions};
use crate::scene::{Actor, Component};
use crate::util::{MAX_FILE_NAME_BYTES, file_stem};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::Path;
use tracing::instrument;

const METADATA_SUFFIX: &str = ".json";
/// `_` plus the 32 digit guid
const GUID_SUFFIX_BYTES: usize = 33;

/// Export lightmap metadata of all actors to `output_dir`
pub fn export_lightmap_metadata<P: AsRef<Path>>(
    actors: &[Option<Actor>],
    registry: &dyn BuildDataRegistry,
    output_dir: &P,
    options: &ExportOptions,
) -> Result<ExportReport, ExportError> {
    export_lightmap_metadata_fs(actors, registry, output_dir, options, &RealFileSystem)
}

/// Export lightmap metadata of all actors to `output_dir` using the provided file system
///
/// Failing to write one actor's file is recorded in the returned report and
/// does not stop the export. Only an unusable output directory is an error.
#[instrument(skip_all, fields(dir = %output_dir.as_ref().display(), actors = actors.len()))]
pub fn export_lightmap_metadata_fs<P: AsRef<Path>>(
    actors: &[Option<Actor>],
    registry: &dyn BuildDataRegistry,
    output_dir: &P,
    options: &ExportOptions,
    fs: &dyn FileSystem,
) -> Result<ExportReport, ExportError> {
    let output_dir = output_dir.as_ref();
    ensure_output_dir(output_dir, options, fs)?;

    info!("Writing lightmap metadata for {} actors...", actors.len());
    let mut report = ExportReport::default();
    let mut file_names: HashSet<String> = HashSet::new();
    let mut file_names_lower: HashSet<String> = HashSet::new();

    for actor in actors.iter().flatten() {
        let Some(document) = actor_lightmap_json(actor, registry) else {
            debug!("Actor {} has no lightmapped components", actor.name);
            continue;
        };

        let file_name = actor_file_name(actor, options.get_actor_file_naming());
        if !file_names.insert(file_name.clone()) {
            warn!(
                "Actor name {} is not unique, {} gets overwritten",
                actor.name, file_name
            );
        } else if !file_names_lower.insert(file_name.to_lowercase()) {
            warn!(
                "{} may overwrite an earlier file on case-insensitive file systems",
                file_name
            );
        }
        let path = output_dir.join(&file_name);

        let json = match to_json_bytes(&document) {
            Ok(json) => json,
            Err(source) => {
                let err = ExportError::Serialization { path, source };
                warn!("{err}");
                report.failures.push(err);
                continue;
            }
        };
        match fs.write_file(&path, &json) {
            Ok(()) => {
                debug!(
                    "Wrote {} with {} components",
                    path.display(),
                    document.components.len()
                );
                report.written.push(path);
            }
            Err(e) => {
                let err = ExportError::write_failure(&path, e);
                warn!("{err}");
                report.failures.push(err);
            }
        }
    }

    info!(
        "✓ {} lightmap metadata files written, {} failed",
        report.written.len(),
        report.failures.len()
    );
    Ok(report)
}

fn ensure_output_dir(
    output_dir: &Path,
    options: &ExportOptions,
    fs: &dyn FileSystem,
) -> Result<(), ExportError> {
    if fs.is_dir(output_dir) {
        return Ok(());
    }
    if !options.should_create_missing_directories() {
        return Err(ExportError::DirectoryUnavailable {
            path: output_dir.to_path_buf(),
            source: None,
        });
    }
    info!("Creating output directory {}", output_dir.display());
    fs.create_dir_all(output_dir)
        .map_err(|e| ExportError::DirectoryUnavailable {
            path: output_dir.to_path_buf(),
            source: Some(e),
        })
}

/// The metadata document for one actor, `None` when no component qualifies.
pub fn actor_lightmap_json(
    actor: &Actor,
    registry: &dyn BuildDataRegistry,
) -> Option<ActorLightmapJson> {
    let components: Vec<ComponentLightmapJson> = actor
        .components
        .iter()
        .flatten()
        .filter_map(|component| component_lightmap_json(component, registry))
        .collect();
    if components.is_empty() {
        return None;
    }
    Some(ActorLightmapJson {
        actor_name: actor.name.clone(),
        actor_guid: actor.guid.to_string(),
        components,
    })
}

/// Lightmap entry of a single component.
///
/// Only mesh renderers with LOD data are considered. A build-data id missing
/// from the registry is common (unbuilt or movable meshes) and yields `None`.
pub fn component_lightmap_json(
    component: &Component,
    registry: &dyn BuildDataRegistry,
) -> Option<ComponentLightmapJson> {
    if !component.is_mesh_renderer() {
        return None;
    }
    let lod = component.lod_data().first()?;
    let build_data = registry.lookup(&lod.map_build_data_id)?;
    Some(ComponentLightmapJson::from_build_data(
        &component.name,
        &lod.map_build_data_id,
        component.static_lightmap_resolution(),
        build_data,
    ))
}

fn actor_file_name(actor: &Actor, naming: ActorFileNaming) -> String {
    let max_bytes = match naming {
        ActorFileNaming::DisplayName => MAX_FILE_NAME_BYTES - METADATA_SUFFIX.len(),
        ActorFileNaming::DisplayNameWithGuid => {
            MAX_FILE_NAME_BYTES - METADATA_SUFFIX.len() - GUID_SUFFIX_BYTES
        }
    };
    let Some(name) = file_stem(&actor.name, max_bytes) else {
        info!(
            "Actor name {:?} is not usable as a file name, using its guid",
            actor.name
        );
        return format!("{}{}", actor.guid, METADATA_SUFFIX);
    };
    if name != actor.name {
        info!(
            "Actor name {} contained invalid characters or was too long, sanitized to {}",
            actor.name, name
        );
    }
    match naming {
        ActorFileNaming::DisplayName => format!("{name}{METADATA_SUFFIX}"),
        ActorFileNaming::DisplayNameWithGuid => format!("{name}_{}{METADATA_SUFFIX}", actor.guid),
    }
}
