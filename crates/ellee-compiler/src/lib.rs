/// Ellee effect compiler
///
/// Turns the addressable lambda effects of an ESPHome configuration into
/// standalone host programs that render their frames on the terminal.

pub mod driver;
pub mod error;
pub mod codegen;
pub mod pool;
pub mod process;
pub mod template;
pub mod toolchain;
pub mod validate;

pub use driver::{BuildResult, CompileOptions, CompileOutput, Compiler, EntryOutput};
pub use error::{CompileError, Result};
pub use codegen::{synthesize, CodeGenerator};
pub use toolchain::Toolchain;
pub use validate::Expectation;

pub use ellee_locator::{EffectDescriptor, RenderConfig};
