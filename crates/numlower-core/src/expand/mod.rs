//! Expansion engine (C8): three mutually recursive expanders —
//! `scalar::expand_scalar`, `vector::expand_vector`, `matrix::expand_matrix`
//! — plus the statement-level driver that threads the environment across a
//! whole program (§4.4), and the alias resolver (C9, §4.5).

pub mod alias;
pub mod matrix;
pub mod scalar;
pub mod statement;
pub mod vector;

pub use statement::{expand_program, ExpandedProgram};

use crate::{
    diagnostics::{CompileError, Context},
    env::Environment,
    ops::Sort,
    tree::{NodeId, Tree},
    value::Value,
};

/// Dispatches to the expander matching `sort`, wrapping the result in
/// `Value`. Used wherever a construct's sort is only known dynamically
/// (macro call arguments and return values).
pub(crate) fn expand_expr(sort: Sort, env: &Environment, src: &mut Tree, node: NodeId, dst: &mut Tree, context: &mut Context) -> Result<Value, CompileError> {
    match sort {
        Sort::Scalar => scalar::expand_scalar(env, src, node, dst, context).map(Value::Scalar),
        Sort::Vector => vector::expand_vector(env, src, node, dst, context).map(Value::Vector),
        Sort::Matrix => matrix::expand_matrix(env, src, node, dst, context).map(Value::Matrix),
    }
}

/// Expands an index expression and requires it to fold to a non-negative
/// integer constant; Dst has no compound indexing expression, so `elem`,
/// `row`, and `col` indices must be resolvable at expansion time.
pub(crate) fn expand_index(env: &Environment, src: &mut Tree, node: NodeId, dst: &mut Tree, context: &mut Context) -> Result<usize, CompileError> {
    let num = scalar::expand_scalar(env, src, node, dst, context)?;
    num.as_constant_index()
        .ok_or_else(|| CompileError::semantic("index must be a constant numeric expression", context))
}

/// Shared `MacroCall` handling for all three expanders (§4.4): sort-checks
/// each argument against its parameter's declared sort, substitutes the
/// (un-expanded) argument subtrees into a clone of the macro body, and
/// re-expands the substituted tree at the macro's return sort.
pub(crate) fn expand_macro_call(expected_sort: Sort, env: &Environment, src: &mut Tree, node: NodeId, dst: &mut Tree, context: &mut Context) -> Result<Value, CompileError> {
    let children = src.children(node).to_vec();
    let name = src
        .value(children[0])
        .expect("MacroCall's first child is its Ident name")
        .to_owned();
    context.set_expression(format!("call to `{name}`"));

    let mac = env.lookup_macro(&name, context)?;
    if mac.return_sort != expected_sort {
        return Err(CompileError::sort_mismatch(
            format!("macro `{name}` returns a {}, expected a {}", mac.return_sort.name(), expected_sort.name()),
            context,
        ));
    }

    let arg_nodes = &children[1..];
    if arg_nodes.len() != mac.params.len() {
        return Err(CompileError::semantic(
            format!("macro `{name}` expects {} argument(s), got {}", mac.params.len(), arg_nodes.len()),
            context,
        ));
    }

    for (&arg_node, (_, param_sort)) in arg_nodes.iter().zip(&mac.params) {
        // Sort-check only; the expanded value is discarded, and the
        // argument subtree itself (unexpanded) is what gets substituted.
        let mut scratch = Tree::new();
        expand_expr(*param_sort, env, src, arg_node, &mut scratch, context)?;
    }

    let substituted = mac.substitute(src, arg_nodes);
    expand_expr(expected_sort, env, src, substituted, dst, context)
}
