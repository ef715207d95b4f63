//! Compile driver: configuration document in, built effect programs out.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ellee_locator::{LocateOptions, LocatedEffect, RenderConfig};
use serde_yaml::Value;

use crate::codegen::CodeGenerator;
use crate::error::{CompileError, Result};
use crate::pool;
use crate::toolchain::Toolchain;

/// Compiler used when none is configured.
pub const DEFAULT_CXX: &str = "g++";

/// Options controlling one compiler run.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// ESPHome configuration document to scan.
    pub input: PathBuf,
    /// ESPHome source checkout providing the support sources.
    pub esphome: PathBuf,
    /// Directory receiving generated sources and executables.
    pub output_dir: PathBuf,
    /// C++ compiler, resolved on `PATH`.
    pub cxx: OsString,
    /// Lower bound for every effect's update interval.
    pub min_interval_ms: u32,
    pub render: RenderConfig,
    /// Worker threads per fan-out level.
    pub jobs: usize,
    /// Per-compilation deadline; `None` waits forever.
    pub timeout: Option<Duration>,
}

impl CompileOptions {
    pub fn new(input: impl Into<PathBuf>, esphome: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            esphome: esphome.into(),
            output_dir: PathBuf::from("."),
            cxx: OsString::from(DEFAULT_CXX),
            min_interval_ms: 0,
            render: RenderConfig::default(),
            jobs: pool::default_jobs(),
            timeout: None,
        }
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn cxx(mut self, cxx: impl Into<OsString>) -> Self {
        self.cxx = cxx.into();
        self
    }

    pub fn min_interval_ms(mut self, ms: u32) -> Self {
        self.min_interval_ms = ms;
        self
    }

    pub fn render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Outcome of building one effect. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildResult {
    pub component_name: String,
    pub effect_name: String,
    /// Executable the build aims at; `None` when the effect definition is invalid.
    pub target: Option<PathBuf>,
    /// Generated source, when it was written.
    pub source: Option<PathBuf>,
    /// Built executable; present exactly when the build succeeded.
    pub artifact: Option<PathBuf>,
    /// Why the build failed.
    pub diagnostic: Option<String>,
}

impl BuildResult {
    pub fn success(&self) -> bool {
        self.artifact.is_some()
    }

    /// Progress line announcing the compilation of this effect.
    pub fn compiling_line(&self) -> Option<String> {
        self.target.as_ref().map(|exe| {
            format!(
                "Compiling effect \"{}/{}\" to {}",
                self.component_name,
                self.effect_name,
                exe.display()
            )
        })
    }

    /// Suggested commands for running or debugging a built effect.
    pub fn hint(&self) -> Option<String> {
        self.artifact.as_ref().map(|exe| {
            format!(
                "Run \"{0}\" or \"gdb {0}\" to diagnose a crash",
                exe.display()
            )
        })
    }

    fn failed(
        component_name: String,
        effect_name: String,
        target: Option<PathBuf>,
        source: Option<PathBuf>,
        error: &CompileError,
    ) -> Self {
        Self {
            component_name,
            effect_name,
            target,
            source,
            artifact: None,
            diagnostic: Some(error.to_string()),
        }
    }
}

/// Builds of the effects declared by one display or light entry.
#[derive(Debug, Clone, Default)]
pub struct EntryOutput {
    pub builds: Vec<BuildResult>,
}

impl EntryOutput {
    pub fn success(&self) -> bool {
        pool::all_succeeded(self.builds.iter().map(BuildResult::success))
    }
}

/// Output of a full run.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub entries: Vec<EntryOutput>,
}

impl CompileOutput {
    /// True when every effect of every entry built; vacuously true when the
    /// document declares none.
    pub fn success(&self) -> bool {
        pool::all_succeeded(self.entries.iter().map(EntryOutput::success))
    }

    pub fn builds(&self) -> impl Iterator<Item = &BuildResult> {
        self.entries.iter().flat_map(|entry| entry.builds.iter())
    }
}

/// Main compiler interface
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Check preconditions, read the document and build every effect.
    ///
    /// Errors are returned only for unmet preconditions; individual effect
    /// failures are reported in the output.
    pub fn compile(&self) -> Result<CompileOutput> {
        let toolchain = Toolchain::locate(&self.options.cxx, &self.options.esphome)?
            .with_timeout(self.options.timeout);
        let document = self.load()?;
        fs::create_dir_all(&self.options.output_dir)
            .map_err(|e| CompileError::io(&self.options.output_dir, e))?;
        Ok(self.compile_document(&toolchain, &document))
    }

    /// Parse the input document without resolving tags.
    pub fn load(&self) -> Result<Value> {
        let input = &self.options.input;
        let text = fs::read_to_string(input).map_err(|e| CompileError::io(input, e))?;
        serde_yaml::from_str(&text).map_err(|source| CompileError::Yaml {
            path: input.clone(),
            source,
        })
    }

    /// Locate the effects of every entry, grouped by entry.
    pub fn plan(&self, document: &Value) -> Vec<Vec<LocatedEffect>> {
        let options = LocateOptions {
            source_name: self.options.input.to_string_lossy().into_owned(),
            min_interval_ms: self.options.min_interval_ms,
            render: self.options.render,
        };
        let plan: Vec<Vec<LocatedEffect>> = ellee_locator::entries(document)
            .into_iter()
            .map(|entry| ellee_locator::locate_effects(entry, &options))
            .collect();
        for collision in collisions(&plan) {
            tracing::warn!(
                "effects \"{}\" and \"{}\" both write {}",
                collision.first,
                collision.second,
                collision.artifact
            );
        }
        plan
    }

    /// Build every effect of `document` into the output directory, which
    /// must exist. One task per entry, and within it one task per effect.
    pub fn compile_document(&self, toolchain: &Toolchain, document: &Value) -> CompileOutput {
        let jobs = self.options.jobs;
        let entries = pool::fan_out(jobs, self.plan(document), |effects| EntryOutput {
            builds: pool::fan_out(jobs, effects, |effect| self.build_effect(toolchain, effect)),
        });
        CompileOutput { entries }
    }

    fn build_effect(&self, toolchain: &Toolchain, located: LocatedEffect) -> BuildResult {
        let LocatedEffect {
            component_name,
            effect_name,
            descriptor,
        } = located;

        let descriptor = match descriptor {
            Ok(descriptor) => descriptor,
            Err(e) => {
                let error = CompileError::from(e);
                tracing::error!("{}/{}: {}", component_name, effect_name, error);
                return BuildResult::failed(component_name, effect_name, None, None, &error);
            }
        };

        let exe = self.options.output_dir.join(descriptor.artifact_name());
        let source = self.options.output_dir.join(descriptor.source_name());
        tracing::debug!(
            "Compiling effect \"{}/{}\" to {}",
            component_name,
            effect_name,
            exe.display()
        );

        let built = CodeGenerator::new()
            .generate(&descriptor)
            .and_then(|text| write_source(&source, &text))
            .and_then(|()| toolchain.compile(&source, &exe));

        match built {
            Ok(()) => {
                tracing::info!("built {}", exe.display());
                BuildResult {
                    component_name,
                    effect_name,
                    target: Some(exe.clone()),
                    source: Some(source),
                    artifact: Some(exe),
                    diagnostic: None,
                }
            }
            Err(error) => {
                tracing::error!("{}/{}: {}", component_name, effect_name, error);
                let source = source.exists().then_some(source);
                BuildResult::failed(component_name, effect_name, Some(exe), source, &error)
            }
        }
    }
}

fn write_source(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| CompileError::io(path, e))
}

/// Two effects whose executables share a path. The later write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub artifact: String,
    /// `component/effect` located first.
    pub first: String,
    pub second: String,
}

/// Find effects whose artifacts would overwrite each other, in plan order.
pub fn collisions(plan: &[Vec<LocatedEffect>]) -> Vec<Collision> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut found = Vec::new();
    for effect in plan.iter().flatten() {
        let artifact = ellee_locator::sanitize_name(&effect.effect_name);
        let current = format!("{}/{}", effect.component_name, effect.effect_name);
        if let Some(first) = seen.insert(artifact.clone(), current.clone()) {
            found.push(Collision {
                artifact,
                first,
                second: current,
            });
        }
    }
    found
}
