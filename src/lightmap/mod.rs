//! Baked lightmap data and the per-actor metadata export.
//!
//! A [`MapBuildDataRegistry`] maps the build-data id stored on a mesh LOD to
//! the [`LightmapBuildData`] produced by the lighting build. The metadata
//! export in [`metadata`] walks a scene and writes the encoding parameters
//! of every resolvable component as JSON.

pub mod json;
pub mod metadata;

use crate::guid::Guid;
use crate::math::{Vec2, Vec4};
#[cfg(test)]
use fake::Dummy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of scale/add vector pairs, two per quality channel.
pub const NUM_STORED_LIGHTMAP_COEF: usize = 4;

/// Coefficients used to decode lightmap texels into lighting intensity.
///
/// Indices 0 and 1 of the scale/add vectors belong to the high quality
/// lightmap, indices 2 and 3 to the low quality one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(test, derive(Dummy))]
pub struct LightmapEncoding {
    pub coordinate_scale: Vec2,
    pub coordinate_bias: Vec2,
    pub scale_vectors: [Vec4; NUM_STORED_LIGHTMAP_COEF],
    pub add_vectors: [Vec4; NUM_STORED_LIGHTMAP_COEF],
}

impl Default for LightmapEncoding {
    fn default() -> Self {
        Self {
            coordinate_scale: Vec2::ONE,
            coordinate_bias: Vec2::ZERO,
            scale_vectors: [Vec4::default(); NUM_STORED_LIGHTMAP_COEF],
            add_vectors: [Vec4::default(); NUM_STORED_LIGHTMAP_COEF],
        }
    }
}

impl LightmapEncoding {
    pub fn hq_scale(&self) -> [Vec4; 2] {
        [self.scale_vectors[0], self.scale_vectors[1]]
    }

    pub fn hq_add(&self) -> [Vec4; 2] {
        [self.add_vectors[0], self.add_vectors[1]]
    }

    pub fn lq_scale(&self) -> [Vec4; 2] {
        [self.scale_vectors[2], self.scale_vectors[3]]
    }

    pub fn lq_add(&self) -> [Vec4; 2] {
        [self.add_vectors[2], self.add_vectors[3]]
    }
}

/// Lighting build result for one mesh LOD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(test, derive(Dummy))]
pub struct LightmapBuildData {
    /// Name of the high quality lightmap texture
    pub hq_texture: String,
    /// Name of the low quality lightmap texture
    pub lq_texture: String,
    #[serde(flatten)]
    pub encoding: LightmapEncoding,
}

/// Lookup from build-data id to baked lighting.
pub trait BuildDataRegistry {
    fn lookup(&self, id: &Guid) -> Option<&LightmapBuildData>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapBuildDataRegistry {
    mesh_build_data: HashMap<Guid, LightmapBuildData>,
}

impl MapBuildDataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers build data, returning what was previously stored for `id`.
    pub fn insert(&mut self, id: Guid, data: LightmapBuildData) -> Option<LightmapBuildData> {
        self.mesh_build_data.insert(id, data)
    }

    pub fn len(&self) -> usize {
        self.mesh_build_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh_build_data.is_empty()
    }
}

impl BuildDataRegistry for MapBuildDataRegistry {
    fn lookup(&self, id: &Guid) -> Option<&LightmapBuildData> {
        self.mesh_build_data.get(id)
    }
}

impl FromIterator<(Guid, LightmapBuildData)> for MapBuildDataRegistry {
    fn from_iter<T: IntoIterator<Item = (Guid, LightmapBuildData)>>(iter: T) -> Self {
        Self {
            mesh_build_data: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_channel_split() {
        let mut encoding = LightmapEncoding::default();
        for i in 0..NUM_STORED_LIGHTMAP_COEF {
            encoding.scale_vectors[i] = Vec4::new(i as f32, 0.0, 0.0, 0.0);
            encoding.add_vectors[i] = Vec4::new(0.0, i as f32, 0.0, 0.0);
        }
        assert_eq!(encoding.hq_scale()[1].x, 1.0);
        assert_eq!(encoding.lq_scale()[0].x, 2.0);
        assert_eq!(encoding.hq_add()[0].y, 0.0);
        assert_eq!(encoding.lq_add()[1].y, 3.0);
    }

    #[test]
    fn test_registry_lookup() {
        let id = Guid::new(1, 2, 3, 4);
        let data: LightmapBuildData = Faker.fake();
        let registry: MapBuildDataRegistry = [(id, data.clone())].into_iter().collect();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(&id), Some(&data));
        assert_eq!(registry.lookup(&Guid::new(4, 3, 2, 1)), None);
    }
}
