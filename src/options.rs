use std::path::{Path, PathBuf};

/// How actor metadata files are named.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ActorFileNaming {
    /// `<ActorName>.json`, a later actor with the same name overwrites the file
    #[default]
    DisplayName,
    /// `<ActorName>_<ActorGuid>.json`, unique per actor
    DisplayNameWithGuid,
}

/// Options for exporting lightmaps.
///
/// Use [`ExportOptions::new`] to create a new instance with default settings,
/// then chain configuration methods to customize behavior.
///
/// # Examples
///
/// ```
/// use lightmap_export::{ActorFileNaming, ExportOptions};
///
/// let options = ExportOptions::new()
///     .create_missing_directories(false)
///     .actor_file_naming(ActorFileNaming::DisplayNameWithGuid);
/// ```
#[derive(Debug, Clone)]
pub struct ExportOptions {
    create_missing_directories: bool,
    actor_file_naming: ActorFileNaming,
    default_directory: Option<PathBuf>,
}

impl ExportOptions {
    /// Creates a new set of options with default settings.
    ///
    /// Defaults:
    /// - `create_missing_directories`: `true`
    /// - `actor_file_naming`: [`ActorFileNaming::DisplayName`]
    /// - `default_directory`: none
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether a missing output directory is created.
    ///
    /// When disabled, exporting metadata into a missing directory fails with
    /// [`crate::ExportError::DirectoryUnavailable`] before anything is written.
    pub fn create_missing_directories(mut self, create: bool) -> Self {
        self.create_missing_directories = create;
        self
    }

    pub fn actor_file_naming(mut self, naming: ActorFileNaming) -> Self {
        self.actor_file_naming = naming;
        self
    }

    /// Directory the directory prompt starts in.
    pub fn default_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_directory = Some(dir.into());
        self
    }

    pub(crate) fn should_create_missing_directories(&self) -> bool {
        self.create_missing_directories
    }

    pub(crate) fn get_actor_file_naming(&self) -> ActorFileNaming {
        self.actor_file_naming
    }

    pub(crate) fn get_default_directory(&self) -> Option<&Path> {
        self.default_directory.as_deref()
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            create_missing_directories: true,
            actor_file_naming: ActorFileNaming::DisplayName,
            default_directory: None,
        }
    }
}
