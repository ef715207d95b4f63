//! The host C++ compiler and the upstream ESPHome checkout it builds against.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::error::{CompileError, Result};
use crate::process;

/// Upstream translation units linked into every effect, in link order.
pub const SUPPORT_SOURCES: &[&str] = &[
    "esphome/components/host/core.cpp",
    "esphome/components/host/preferences.cpp",
    "esphome/components/light/addressable_light.cpp",
    "esphome/components/light/esp_color_correction.cpp",
    "esphome/components/light/esp_hsv_color.cpp",
    "esphome/components/light/esp_range_view.cpp",
    "esphome/components/light/light_call.cpp",
    "esphome/components/light/light_output.cpp",
    "esphome/components/light/light_state.cpp",
    "esphome/core/application.cpp",
    "esphome/core/color.cpp",
    "esphome/core/component.cpp",
    "esphome/core/entity_base.cpp",
    "esphome/core/helpers.cpp",
    "esphome/core/scheduler.cpp",
];

/// File whose presence identifies an ESPHome checkout.
const CHECKOUT_MARKER: &str = "esphome/core/color.cpp";

/// Verify that `esphome` points at an ESPHome source checkout.
pub fn check_checkout(esphome: &Path) -> Result<()> {
    if esphome.join(CHECKOUT_MARKER).is_file() {
        Ok(())
    } else {
        Err(CompileError::CheckoutMissing(esphome.to_path_buf()))
    }
}

/// A resolved compiler plus the checkout providing the support sources.
#[derive(Debug, Clone)]
pub struct Toolchain {
    cxx: PathBuf,
    esphome: PathBuf,
    timeout: Option<Duration>,
}

impl Toolchain {
    /// Resolve `cxx` on `PATH` and validate the checkout.
    pub fn locate(cxx: &OsStr, esphome: impl Into<PathBuf>) -> Result<Self> {
        let cxx = which::which(cxx)
            .map_err(|_| CompileError::ToolchainMissing(cxx.to_string_lossy().into_owned()))?;
        let esphome = esphome.into();
        check_checkout(&esphome)?;
        Ok(Self {
            cxx,
            esphome,
            timeout: None,
        })
    }

    /// Abort compilations that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cxx(&self) -> &Path {
        &self.cxx
    }

    /// Arguments passed to the compiler to build `source` into `exe`.
    pub fn arguments(&self, source: &Path, exe: &Path) -> Vec<OsString> {
        let mut include = OsString::from("-I");
        include.push(&self.esphome);

        let mut args: Vec<OsString> = vec![
            "-ggdb".into(),
            "-o".into(),
            exe.into(),
            "-DUSE_HOST".into(),
            "-I.".into(),
            include,
            source.into(),
        ];
        args.extend(
            SUPPORT_SOURCES
                .iter()
                .map(|support| self.esphome.join(support).into_os_string()),
        );
        args
    }

    /// Compile `source` into the executable `exe`.
    ///
    /// A non-zero exit yields [`CompileError::CompilerFailed`] carrying the
    /// compiler's stderr verbatim.
    pub fn compile(&self, source: &Path, exe: &Path) -> Result<()> {
        let mut command = Command::new(&self.cxx);
        command.args(self.arguments(source, exe));
        tracing::debug!("running {:?}", command);

        let output = process::run(command, self.timeout)?;
        if output.status.success() {
            return Ok(());
        }
        Err(CompileError::CompilerFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_checkout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join(CHECKOUT_MARKER);
        std::fs::create_dir_all(marker.parent().unwrap()).unwrap();
        std::fs::write(&marker, "").unwrap();
        dir
    }

    #[test]
    fn test_check_checkout() {
        let checkout = fake_checkout();
        assert!(check_checkout(checkout.path()).is_ok());

        let empty = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            check_checkout(empty.path()),
            Err(CompileError::CheckoutMissing(_))
        ));
    }

    #[test]
    fn test_missing_compiler() {
        let checkout = fake_checkout();
        let result = Toolchain::locate(OsStr::new("ellee-no-such-compiler"), checkout.path());
        assert!(matches!(result, Err(CompileError::ToolchainMissing(name)) if name == "ellee-no-such-compiler"));
    }

    #[test]
    fn test_arguments_order() {
        let toolchain = Toolchain {
            cxx: PathBuf::from("/usr/bin/g++"),
            esphome: PathBuf::from("/src/esphome"),
            timeout: None,
        };
        let args = toolchain.arguments(Path::new("out/fire.cc"), Path::new("out/fire"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            &args[..7],
            [
                "-ggdb",
                "-o",
                "out/fire",
                "-DUSE_HOST",
                "-I.",
                "-I/src/esphome",
                "out/fire.cc"
            ]
        );
        assert_eq!(args.len(), 7 + SUPPORT_SOURCES.len());
        assert_eq!(args[7], "/src/esphome/esphome/components/host/core.cpp");
        assert_eq!(args.last().unwrap(), "/src/esphome/esphome/core/scheduler.cpp");
    }
}
