//! Checks used to validate built effects against golden output.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::error::{CompileError, Result};
use crate::process;

/// What running one effect once must print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation<'a> {
    /// Exact stdout bytes.
    Output(&'a [u8]),
    /// Output varies between runs; only the artifacts are checked.
    NonDeterministic,
}

/// Artifact names produced for `effects`: each executable and its source.
pub fn expected_artifacts<'a>(effects: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    effects
        .into_iter()
        .flat_map(|name| [name.to_string(), format!("{}.cc", name)])
        .collect()
}

/// Names of the entries in `dir`.
pub fn list_artifacts(dir: &Path) -> Result<BTreeSet<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| CompileError::io(dir, e))?;
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| CompileError::io(dir, e))?;
        names.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Difference between an expected and an actual set of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetDiff {
    /// Present but not expected.
    pub unexpected: Vec<String>,
    /// Expected but not present.
    pub missing: Vec<String>,
}

impl SetDiff {
    pub fn between(want: &BTreeSet<String>, got: &BTreeSet<String>) -> Self {
        Self {
            unexpected: got.difference(want).cloned().collect(),
            missing: want.difference(got).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unexpected.is_empty() && self.missing.is_empty()
    }

    /// One line per non-empty side, each introduced by its label.
    pub fn describe(&self, unexpected_label: &str, missing_label: &str) -> String {
        let mut lines = Vec::new();
        if !self.unexpected.is_empty() {
            lines.push(format!("{}: {}", unexpected_label, self.unexpected.join(", ")));
        }
        if !self.missing.is_empty() {
            lines.push(format!("{}: {}", missing_label, self.missing.join(", ")));
        }
        lines.join("\n")
    }
}

/// Run a built effect once and capture its stdout.
///
/// A non-zero exit status is an error.
pub fn run_artifact(exe: &Path, timeout: Option<Duration>) -> Result<Vec<u8>> {
    let output = process::run(Command::new(exe), timeout)?;
    if !output.status.success() {
        return Err(CompileError::ProcessFailed {
            program: exe.display().to_string(),
            status: output.status.to_string(),
        });
    }
    Ok(output.stdout)
}

/// Captured output that differs from its golden value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMismatch<'a> {
    pub want: &'a [u8],
    pub got: &'a [u8],
}

impl fmt::Display for OutputMismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Want: b'{}'", self.want.escape_ascii())?;
        write!(f, "Got : b'{}'", self.got.escape_ascii())
    }
}

/// Compare captured output byte for byte against `expectation`.
pub fn check_output<'a>(
    expectation: Expectation<'a>,
    got: &'a [u8],
) -> std::result::Result<(), OutputMismatch<'a>> {
    match expectation {
        Expectation::NonDeterministic => Ok(()),
        Expectation::Output(want) if want == got => Ok(()),
        Expectation::Output(want) => Err(OutputMismatch { want, got }),
    }
}
