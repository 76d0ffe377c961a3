use log::debug;
use std::path::PathBuf;

use crate::{
    package::{PackageLayout, PackageRepository},
    runtime::Runtime,
};

/// Everything a command needs: the runtime and the package it operates on.
pub struct Config<R: Runtime> {
    pub runtime: R,
    pub layout: PackageLayout,
}

impl<R: Runtime> Config<R> {
    /// Use `package_dir` when given, otherwise the default `h5p-folder`
    /// relative to the working directory.
    pub fn new(runtime: R, package_dir: Option<PathBuf>) -> Self {
        let layout = package_dir.map(PackageLayout::new).unwrap_or_default();
        debug!("Using package directory {:?}", layout.root());
        Self { runtime, layout }
    }

    pub fn repository(&self) -> PackageRepository<'_, R> {
        PackageRepository::new(&self.runtime, self.layout.clone())
    }
}
