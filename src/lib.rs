//!
//! Lightmap export is a library for getting baked lightmaps out of a level.
//!
//! It writes the lightmap textures of a world as images and, for every actor
//! with lightmapped static mesh components, a JSON file describing which
//! texture each component samples and how its UVs map into it.
//!
//! ```no_run
//! use lightmap_export::export::ExporterRegistry;
//! use lightmap_export::scene::description::read_world;
//! use lightmap_export::{ExportOptions, export_world_lightmaps_to};
//!
//! let world = read_world(&"level01.json")?;
//! let report = export_world_lightmaps_to(
//!     &world,
//!     &"out",
//!     &ExporterRegistry::with_default_exporters(),
//!     &ExportOptions::default(),
//! )?;
//! for failure in &report.failures {
//!     eprintln!("{failure}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod export;
pub mod filesystem;
pub mod guid;
pub mod lightmap;
pub mod math;
pub mod options;
pub mod scene;
pub(crate) mod util;
pub mod world;

pub use error::{ExportError, ExportReport};
pub use guid::Guid;
pub use lightmap::metadata::{export_lightmap_metadata, export_lightmap_metadata_fs};
pub use options::{ActorFileNaming, ExportOptions};
pub use scene::World;
pub use world::{
    DirectoryPrompt, FixedDirectory, export_world_lightmaps, export_world_lightmaps_fs,
    export_world_lightmaps_to,
};
