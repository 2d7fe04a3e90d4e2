//! Read-only scene graph: worlds own actors, actors own components.
//!
//! Actor and component lists keep empty slots (`None`) the way a level keeps
//! references to destroyed actors; traversals are expected to skip them.

pub mod description;

use crate::export::texture::LightmapTexture;
use crate::guid::Guid;
use crate::lightmap::MapBuildDataRegistry;
use serde::{Deserialize, Serialize};

/// Per-LOD data of a static mesh component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshLodInfo {
    /// Key into the map build data registry
    pub map_build_data_id: Guid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticMeshComponent {
    #[serde(default)]
    pub lod_data: Vec<MeshLodInfo>,
    /// Lightmap resolution of the static mesh asset
    #[serde(default)]
    pub mesh_lightmap_resolution: i32,
    /// Per component override, wins over the mesh resolution when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overridden_lightmap_resolution: Option<i32>,
}

impl StaticMeshComponent {
    pub fn static_lightmap_resolution(&self) -> i32 {
        self.overridden_lightmap_resolution
            .unwrap_or(self.mesh_lightmap_resolution)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKind {
    StaticMesh(StaticMeshComponent),
    /// Renders something, but is not a static mesh (skeletal meshes, brushes, ...)
    Primitive,
    /// Transform only
    Scene,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(flatten)]
    pub kind: ComponentKind,
}

impl Component {
    pub fn static_mesh(name: impl Into<String>, mesh: StaticMeshComponent) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::StaticMesh(mesh),
        }
    }

    pub fn scene(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Scene,
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Primitive,
        }
    }

    /// Whether the component renders a static mesh and can carry lightmaps.
    pub fn is_mesh_renderer(&self) -> bool {
        matches!(self.kind, ComponentKind::StaticMesh(_))
    }

    /// LOD entries, empty for anything that is not a mesh renderer.
    pub fn lod_data(&self) -> &[MeshLodInfo] {
        match &self.kind {
            ComponentKind::StaticMesh(mesh) => &mesh.lod_data,
            ComponentKind::Primitive | ComponentKind::Scene => &[],
        }
    }

    pub fn static_lightmap_resolution(&self) -> i32 {
        match &self.kind {
            ComponentKind::StaticMesh(mesh) => mesh.static_lightmap_resolution(),
            ComponentKind::Primitive | ComponentKind::Scene => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Display name, the label if one was set. Not unique.
    pub name: String,
    pub guid: Guid,
    #[serde(default)]
    pub components: Vec<Option<Component>>,
}

impl Actor {
    pub fn new(name: impl Into<String>, guid: Guid) -> Self {
        Self {
            name: name.into(),
            guid,
            components: Vec::new(),
        }
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(Some(component));
        self
    }
}

/// A level with its baked lighting.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub name: String,
    pub actors: Vec<Option<Actor>>,
    pub build_data: MapBuildDataRegistry,
    pub lightmap_textures: Vec<LightmapTexture>,
}

impl World {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
