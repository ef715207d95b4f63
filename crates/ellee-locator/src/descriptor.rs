/// Effect descriptor types
///
/// A descriptor is everything needed to synthesize and build one effect
/// program. Descriptors are derived fresh from the configuration document on
/// every run and never persisted.

/// Characters that cannot appear in a generated artifact file name.
const UNSAFE_CHARS: &[char] = &[' ', '[', ']', '{', '}', '\\', '/', '^', '$', '*', '?'];

/// Number of lights used when neither the effect nor its entry declares one.
pub const DEFAULT_NUM_LEDS: u32 = 70;

/// How the generated program renders frames on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderConfig {
    /// Print `rrggbb` triplets instead of ANSI truecolor glyphs.
    pub as_hex: bool,
    /// Prefix each frame with the elapsed milliseconds.
    pub show_millis: bool,
    /// Render a single frame then exit, with time frozen.
    pub once: bool,
    /// Terminate each frame with a newline instead of redrawing in place.
    pub one_per_line: bool,
}

/// One addressable lambda effect, ready for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectDescriptor {
    /// Name of the light or display entry declaring the effect.
    pub component_name: String,
    /// Name of the effect; falls back to the component name.
    pub effect_name: String,
    /// Number of pixels on the strip.
    pub num_lights: u32,
    /// Delay between frames, already clamped to the configured minimum.
    pub update_interval_ms: u32,
    /// The effect body, verbatim.
    pub code: String,
    pub render: RenderConfig,
}

impl EffectDescriptor {
    /// File name of the executable built for this effect.
    ///
    /// Two effects whose names sanitize to the same value share an artifact.
    pub fn artifact_name(&self) -> String {
        sanitize_name(&self.effect_name)
    }

    /// File name of the generated source for this effect.
    pub fn source_name(&self) -> String {
        format!("{}.cc", self.artifact_name())
    }
}

/// Replace characters that are unsafe in file names (space, brackets, braces,
/// slashes and glob characters) with underscores.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}
