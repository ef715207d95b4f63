//! C++ fragments wrapped around every effect body
//!
//! The fragments are concatenated in order: header, configuration constants,
//! preamble, the indented effect body, footer.

/// Includes the upstream addressable light effect abstraction.
pub fn header() -> &'static str {
    include_str!("template/header.cc")
}

/// Opens the `update(it, initial_run)` function the effect body lives in.
pub fn preamble() -> &'static str {
    include_str!("template/preamble.cc")
}

/// Closes `update` and defines the in-memory light, the renderers and the
/// `setup`/`loop` pair driven by the host core.
pub fn footer() -> &'static str {
    include_str!("template/footer.cc")
}

/// Substituted for `millis()` in single-frame mode so that time-dependent
/// effects render deterministically.
pub const FROZEN_MILLIS: u32 = 42;
