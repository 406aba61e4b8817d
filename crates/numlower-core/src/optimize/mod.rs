//! Optimization pipeline (§4.3): reduce → dead-code → mangle, in that fixed
//! order regardless of which passes `CompileOptions` disables.

pub mod dead_code;
pub mod mangle;
pub mod reduce;
