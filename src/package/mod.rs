//! Package model accessor
//!
//! Loads and persists the two documents that define an unpacked H5P package
//! (`content/content.json` and `h5p.json`), locates stages, resolves installed
//! libraries, and keeps the dependency manifest consistent.

mod assets;
mod content;
mod json;
mod layout;
mod library;
mod manifest;
mod repository;

pub use assets::{copy_content_assets, copy_dir, import_libraries};
pub use content::{
    ContentDocument, STAGES_POINTER, StageSelector, first_content_type, locate_stages,
    stage_label, stage_library,
};
pub use json::{read_json, to_pretty, write_json};
pub use layout::{DEFAULT_PACKAGE_DIR, PackageLayout};
pub use library::{InstalledLibrary, LibraryDescriptor, LibraryRef, find_installed_library};
pub use manifest::{DependencyEntry, Manifest, clean_manifest, ensure_dependency};
pub use repository::PackageRepository;
