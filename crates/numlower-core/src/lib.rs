//! `numlower-core`: expansion and optimization core for the numlower
//! compiler (§2). Lowers a Src vector/matrix program into a flat Dst
//! decimal-assignment program, then runs the fixed-order optimization
//! pipeline (reduce → dead-code → mangle, §4.3).
//!
//! The surface-grammar parser is out of scope (§6.1): callers construct or
//! deserialize a [`SrcTree`] and hand it to [`compile`].

pub mod decimal;
pub mod diagnostics;
pub mod env;
pub mod expand;
pub mod format;
pub mod json;
pub mod library;
pub mod ops;
pub mod optimize;
pub mod test_support;
pub mod tree;
pub mod value;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

pub use diagnostics::{CompileError, Context};
pub use tree::{Kind, NodeId, Tree};

/// The generic C1 tree, specialized to hold a Src program. A future parser
/// crate produces these; today only `numlower-cli` and [`test_support`] do.
pub type SrcTree = Tree;

/// Which optimization passes to run and where `using` looks for libraries.
/// Passes always run in the fixed C10 → C11 → C12 order; these flags only
/// skip a pass, they never reorder the rest (§6.4).
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub lib_root: PathBuf,
    pub no_reduce: bool,
    pub no_elim: bool,
    pub no_mangle: bool,
}

impl CompileOptions {
    pub fn new(lib_root: impl Into<PathBuf>) -> Self {
        Self {
            lib_root: lib_root.into(),
            no_reduce: false,
            no_elim: false,
            no_mangle: false,
        }
    }

    pub fn lib_root(&self) -> &Path {
        &self.lib_root
    }
}

/// The fully-expanded and optimized Dst program, plus the resolved import
/// and export name sets (§4.5) a caller needs to interpret it.
pub struct CompiledProgram {
    pub dst: Tree,
    pub program: NodeId,
    pub imported: HashSet<String>,
    pub exported: HashSet<String>,
}

/// Runs the whole pipeline (§4.4 expansion, §4.5 alias resolution, §4.3
/// optimization) over `root` (a `SrcProgram` node in `src`).
pub fn compile(src: &mut Tree, root: NodeId, options: &CompileOptions) -> Result<CompiledProgram, CompileError> {
    let expand::ExpandedProgram { mut dst, program, env } = expand::expand_program(src, root, &options.lib_root)?;
    let resolved = expand::alias::resolve(&mut dst, &env);

    if !options.no_reduce {
        optimize::reduce::run(&mut dst, program)?;
    }
    if !options.no_elim {
        optimize::dead_code::run(&mut dst, program, &resolved.exported);
    }
    if !options.no_mangle {
        let reserved: HashSet<String> = resolved.imported.union(&resolved.exported).cloned().collect();
        optimize::mangle::run(&mut dst, program, &reserved);
    }

    Ok(CompiledProgram {
        dst,
        program,
        imported: resolved.imported,
        exported: resolved.exported,
    })
}
