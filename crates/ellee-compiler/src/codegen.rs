/// Source synthesis
///
/// Turns an effect descriptor into a complete C++ translation unit. The effect
/// body is opaque: it is re-indented and copied, never parsed.

use crate::error::Result;
use crate::template;
use ellee_locator::EffectDescriptor;
use std::fmt::Write as _;

/// Indentation applied to the effect body inside `update()`.
const BODY_INDENT: &str = "  ";

/// C++ source generator for one effect
pub struct CodeGenerator {
    /// Output buffer
    output: String,
}

impl CodeGenerator {
    /// Create a new code generator
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Generate the full program text for an effect
    pub fn generate(&mut self, effect: &EffectDescriptor) -> Result<String> {
        self.output.push_str(template::header());
        self.generate_configuration(effect)?;
        self.output.push_str(template::preamble());
        self.output.push_str(&indent(effect.code.trim_end(), BODY_INDENT));
        self.output.push_str(template::footer());

        Ok(std::mem::take(&mut self.output))
    }

    /// Emit the compile-time constants the preamble and footer refer to
    fn generate_configuration(&mut self, effect: &EffectDescriptor) -> Result<()> {
        let render = &effect.render;
        self.output.push_str("// Configuration\n");
        writeln!(self.output, "const bool AS_HEX = {};", render.as_hex)?;
        writeln!(self.output, "const int INTERVAL = {};", effect.update_interval_ms)?;
        writeln!(self.output, "const int NUMLIGHTS = {};", effect.num_lights)?;
        writeln!(self.output, "const bool ONCE = {};", render.once)?;
        writeln!(self.output, "const bool ONE_PER_LINE = {};", render.one_per_line)?;
        writeln!(self.output, "const bool SHOW_MILLIS = {};", render.show_millis)?;
        if render.once {
            // Freezes time for the body and the millis prefix alike.
            writeln!(self.output, "#define millis() {}", template::FROZEN_MILLIS)?;
        }
        Ok(())
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the program text for one effect.
pub fn synthesize(effect: &EffectDescriptor) -> Result<String> {
    CodeGenerator::new().generate(effect)
}

/// Prefix every line containing non-whitespace with `prefix`.
fn indent(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}
