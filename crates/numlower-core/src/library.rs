//! Library loader (C7): resolves `using <name>` to a single `.lib.src` file
//! under a search root and installs its macro definitions into the caller's
//! environment (§4.7).
//!
//! The surface-grammar parser is out of scope for this crate (§6.1), so the
//! loader is generic over a parse function supplied by the caller — in
//! practice `numlower-cli` deserializes the library file's `SrcTree` JSON,
//! the same boundary `-i` reads from for the main input.

use std::{
    fs,
    path::{Path, PathBuf},
};

use glob::glob;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    diagnostics::{CompileError, Context},
    env::Environment,
    ops::Sort,
    tree::{Kind, NodeId, Tree},
};

/// On-disk shape of a `.lib.src` file. The surface-grammar parser is out of
/// scope for this crate (§6.1), so library files are read as the same
/// `SrcTree` JSON the CLI's `-i` flag accepts, with an explicit root handle
/// since a bare `Tree` arena doesn't otherwise identify its own root.
#[derive(Debug, Serialize, Deserialize)]
struct LibraryFile {
    tree: Tree,
    root: NodeId,
}

/// Reads and deserializes a library file located by [`locate`].
pub fn load(path: &Path) -> Result<(Tree, NodeId), CompileError> {
    let context = Context::new();
    let text = fs::read_to_string(path)
        .map_err(|error| CompileError::semantic(format!("could not read library file {}: {error}", path.display()), &context))?;
    let file: LibraryFile = serde_json::from_str(&text)
        .map_err(|error| CompileError::parse(format!("malformed library file {}: {error}", path.display()), &context))?;
    Ok((file.tree, file.root))
}

/// Finds the unique `<root>/**/<name>.lib.src` file, erroring on zero or
/// more than one match (§4.7).
pub fn locate(root: &Path, name: &str) -> Result<PathBuf, CompileError> {
    let pattern = root.join("**").join(format!("{name}.lib.src"));
    let pattern = pattern.to_string_lossy().into_owned();
    let context = Context::new();
    let matches: Vec<PathBuf> = glob(&pattern)
        .map_err(|error| CompileError::semantic(format!("invalid library search pattern: {error}"), &context))?
        .filter_map(Result::ok)
        .collect();

    match matches.len() {
        0 => Err(CompileError::semantic(format!("missing library `{name}`"), &context)),
        1 => Ok(matches.into_iter().next().expect("checked len == 1")),
        n => Err(CompileError::semantic(format!("ambiguous library `{name}`: found {n} matches"), &context)),
    }
}

/// Installs every macro `define` statement at the top level of `library`
/// into `env`. Any other statement kind (other than `Comment`) is rejected
/// (§4.7: a library is macro definitions and comments only).
pub fn install(env: Environment, library: &Tree, root: NodeId, name: &str) -> Result<Environment, CompileError> {
    let mut context = Context::new();
    context.set_statement(format!("using {name}"));
    debug!(library = name, "installing library macros");

    let mut env = env;
    for &stmt in library.children(root) {
        match library.kind(stmt) {
            Kind::Comment => continue,
            Kind::Define(return_sort) => {
                env = install_define(env, library, stmt, return_sort, &context)?;
            }
            other => {
                return Err(CompileError::parse(
                    format!("library `{name}` contains a non-macro top-level statement ({other:?})"),
                    &context,
                ));
            }
        }
    }
    Ok(env)
}

fn install_define(env: Environment, library: &Tree, stmt: NodeId, return_sort: Sort, context: &Context) -> Result<Environment, CompileError> {
    let children = library.children(stmt);
    let macro_name = library.value(children[0]).expect("Define's first child is an Ident").to_owned();
    let body = *children.last().expect("Define always has a trailing body expression");
    let params = children[1..children.len() - 1]
        .iter()
        .map(|&p| match library.kind(p) {
            Kind::Param(sort) => (library.value(p).expect("Param always carries a name").to_owned(), sort),
            other => unreachable!("Define's middle children are always Param nodes, got {other:?}"),
        })
        .collect();

    let macro_def = crate::env::Macro::new(macro_name, params, return_sort, library, body, context)?;
    env.define_macro(macro_def, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{BinaryOp, SrcBinary};

    fn make_define(tree: &mut Tree, name: &str, param: &str) -> NodeId {
        let ident = tree.leaf(Kind::Ident, name);
        let param_node = tree.leaf(Kind::Param(Sort::Scalar), param);
        let var_ref = tree.leaf(Kind::VarRef, param);
        let one = tree.leaf(Kind::NumberLit, "1");
        let body = tree.branch(Kind::SrcBinaryExpr(SrcBinary::Base(BinaryOp::Add)), vec![var_ref, one]);
        tree.branch(Kind::Define(Sort::Scalar), vec![ident, param_node, body])
    }

    #[test]
    fn installs_macro_definitions_only() {
        let mut tree = Tree::new();
        let define = make_define(&mut tree, "inc", "n");
        let comment = tree.leaf(Kind::Comment, "a helper library");
        let root = tree.branch(Kind::SrcProgram, vec![comment, define]);

        let env = install(Environment::new(), &tree, root, "helpers").unwrap();
        assert!(env.lookup_macro("inc", &Context::new()).is_ok());
    }

    #[test]
    fn rejects_non_macro_top_level_statements() {
        let mut tree = Tree::new();
        let name = tree.leaf(Kind::Ident, "A");
        let one = tree.leaf(Kind::NumberLit, "1");
        let let_stmt = tree.branch(Kind::Let(Sort::Scalar), vec![name, one]);
        let root = tree.branch(Kind::SrcProgram, vec![let_stmt]);

        assert!(install(Environment::new(), &tree, root, "helpers").is_err());
    }
}
