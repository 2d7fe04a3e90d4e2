//! World description files.
//!
//! A world can be described in a JSON file so it can be exported without an
//! editor running. Texture pixel data lives in image files next to it:
//!
//! ```json
//! {
//!   "name": "Level01",
//!   "actors": [
//!     {
//!       "name": "Wall_01",
//!       "guid": "0000000000000000000000000000ABCD",
//!       "components": [
//!         { "name": "Root", "type": "scene" },
//!         {
//!           "name": "Body",
//!           "type": "static_mesh",
//!           "mesh_lightmap_resolution": 256,
//!           "lod_data": [{ "map_build_data_id": "00001111000022220000333300004444" }]
//!         }
//!       ]
//!     }
//!   ],
//!   "build_data": [
//!     {
//!       "id": "00001111000022220000333300004444",
//!       "hq_texture": "Lightmap_HQ",
//!       "lq_texture": "Lightmap_LQ",
//!       "coordinate_scale": [1.0, 1.0],
//!       "coordinate_bias": [0.0, 0.0],
//!       "scale_vectors": [[0, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1]],
//!       "add_vectors": [[0, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1]]
//!     }
//!   ],
//!   "textures": [{ "name": "Lightmap_HQ", "file": "textures/Lightmap_HQ.png" }]
//! }
//! ```

use super::{Actor, World};
use crate::export::texture::LightmapTexture;
use crate::filesystem::{FileSystem, RealFileSystem};
use crate::guid::Guid;
use crate::lightmap::{LightmapBuildData, MapBuildDataRegistry};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldJson {
    pub name: String,
    #[serde(default)]
    pub actors: Vec<Option<Actor>>,
    #[serde(default)]
    pub build_data: Vec<BuildDataJson>,
    #[serde(default)]
    pub textures: Vec<TextureJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildDataJson {
    pub id: Guid,
    #[serde(flatten)]
    pub data: LightmapBuildData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureJson {
    pub name: String,
    /// Image file, relative to the description file
    pub file: String,
}

pub fn read_world<P: AsRef<Path>>(description_path: &P) -> io::Result<World> {
    read_world_fs(description_path, &RealFileSystem)
}

#[instrument(skip_all, fields(path = %description_path.as_ref().display()))]
pub fn read_world_fs<P: AsRef<Path>>(
    description_path: &P,
    fs: &dyn FileSystem,
) -> io::Result<World> {
    let path = description_path.as_ref();
    let data = fs.read_file(path)?;
    let world_json: WorldJson = serde_json::from_slice(&data).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to parse/read json {}: {}", path.display(), e),
        )
    })?;
    let base_dir = path.parent().unwrap_or(Path::new(""));
    world_from_json(world_json, base_dir, fs)
}

fn world_from_json(
    world_json: WorldJson,
    base_dir: &Path,
    fs: &dyn FileSystem,
) -> io::Result<World> {
    let WorldJson {
        name,
        actors,
        build_data,
        textures,
    } = world_json;

    let mut registry = MapBuildDataRegistry::new();
    for BuildDataJson { id, data } in build_data {
        if registry.insert(id, data).is_some() {
            warn!(
                "Build data {} is listed more than once, the last one wins",
                id
            );
        }
    }

    let lightmap_textures = textures
        .iter()
        .map(|texture| read_texture(texture, base_dir, fs))
        .collect::<io::Result<Vec<_>>>()?;

    info!(
        "Read world {} with {} actors, {} build data entries and {} textures",
        name,
        actors.len(),
        registry.len(),
        lightmap_textures.len()
    );
    Ok(World {
        name,
        actors,
        build_data: registry,
        lightmap_textures,
    })
}

fn read_texture(
    texture: &TextureJson,
    base_dir: &Path,
    fs: &dyn FileSystem,
) -> io::Result<LightmapTexture> {
    let path = base_dir.join(&texture.file);
    debug!("Reading texture {} from {}", texture.name, path.display());
    let data = fs.read_file(&path)?;
    let image = image::load_from_memory(&data).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to decode image {}: {}", path.display(), e),
        )
    })?;
    Ok(LightmapTexture::new(texture.name.clone(), image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFileSystem;
    use crate::lightmap::BuildDataRegistry;
    use crate::math::Vec4;
    use crate::scene::ComponentKind;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    const WORLD: &str = r#"{
        "name": "Level01",
        "actors": [
            {
                "name": "Wall_01",
                "guid": "0000000000000000000000000000ABCD",
                "components": [
                    { "name": "Root", "type": "scene" },
                    null,
                    {
                        "name": "Body",
                        "type": "static_mesh",
                        "mesh_lightmap_resolution": 256,
                        "lod_data": [{ "map_build_data_id": "00001111000022220000333300004444" }]
                    }
                ]
            },
            null
        ],
        "build_data": [
            {
                "id": "00001111000022220000333300004444",
                "hq_texture": "Lightmap_HQ",
                "lq_texture": "Lightmap_LQ",
                "coordinate_scale": [1.0, 1.0],
                "coordinate_bias": [0.0, 0.0],
                "scale_vectors": [[0, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1]],
                "add_vectors": [[0, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1]]
            }
        ],
        "textures": [{ "name": "Lightmap_HQ", "file": "textures/Lightmap_HQ.png" }]
    }"#;

    fn write_png(fs: &MemoryFileSystem, path: &Path) -> TestResult {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(8, 4));
        let mut buffer = io::Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        fs.create_dir_all(path.parent().ok_or("no parent")?)?;
        fs.write_file(path, buffer.get_ref())?;
        Ok(())
    }

    #[test]
    fn test_read_world() -> TestResult {
        let fs = MemoryFileSystem::new();
        fs.create_dir_all(Path::new("worlds"))?;
        fs.write_file(Path::new("worlds/level01.json"), WORLD.as_bytes())?;
        write_png(&fs, Path::new("worlds/textures/Lightmap_HQ.png"))?;

        let world = read_world_fs(&"worlds/level01.json", &fs)?;

        assert_eq!(world.name, "Level01");
        assert_eq!(world.actors.len(), 2);
        let wall = world.actors[0].as_ref().ok_or("missing actor")?;
        assert_eq!(wall.guid, Guid::new(0, 0, 0, 0xABCD));
        assert_eq!(wall.components.len(), 3);
        assert!(wall.components[1].is_none());
        let body = wall.components[2].as_ref().ok_or("missing component")?;
        assert!(matches!(body.kind, ComponentKind::StaticMesh(_)));
        assert_eq!(body.static_lightmap_resolution(), 256);

        let data = world
            .build_data
            .lookup(&Guid::new(0x1111, 0x2222, 0x3333, 0x4444))
            .ok_or("missing build data")?;
        assert_eq!(data.hq_texture, "Lightmap_HQ");
        assert_eq!(data.encoding.add_vectors[3], Vec4::new(0.0, 0.0, 0.0, 1.0));

        assert_eq!(world.lightmap_textures.len(), 1);
        assert_eq!(world.lightmap_textures[0].name, "Lightmap_HQ");
        assert_eq!(world.lightmap_textures[0].image.width(), 8);
        Ok(())
    }

    #[test]
    fn test_missing_texture_file() {
        let fs = MemoryFileSystem::new();
        fs.write_file(Path::new("level01.json"), WORLD.as_bytes())
            .unwrap();
        let err = read_world_fs(&"level01.json", &fs).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_json() {
        let fs = MemoryFileSystem::new();
        fs.write_file(Path::new("broken.json"), b"{ \"name\": ").unwrap();
        let err = read_world_fs(&"broken.json", &fs).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("broken.json"));
    }
}
