//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ellee_compiler::toolchain;

/// Directory holding the sample configuration documents.
pub fn samples_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("samples")
}

/// The ESPHome checkout named by `ELLEE_ESPHOME`, when it and g++ are both
/// available.
pub fn esphome_checkout() -> Option<PathBuf> {
    let esphome = PathBuf::from(std::env::var_os("ELLEE_ESPHOME")?);
    toolchain::check_checkout(&esphome).ok()?;
    which::which("g++").ok()?;
    Some(esphome)
}

/// A directory that passes the checkout check but holds no real sources.
pub fn fake_checkout() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let marker = dir.path().join("esphome/core/color.cpp");
    std::fs::create_dir_all(marker.parent().expect("marker has a parent")).expect("mkdir");
    std::fs::write(&marker, "").expect("write marker");
    dir
}
