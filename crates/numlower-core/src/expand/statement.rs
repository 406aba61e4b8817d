//! Statement-level driver for C8: walks a `SrcProgram`'s top-level
//! statements in order, threading the environment and emitting one Dst
//! `Line` per `let` (§4.4).

use std::path::Path;

use tracing::debug;

use crate::{
    diagnostics::{CompileError, Context},
    env::{Environment, Macro},
    expand::{matrix, scalar, vector},
    library,
    ops::Sort,
    tree::{Kind, NodeId, Tree},
    value::Value,
};

/// The expanded program: the Dst tree, its `Program` root, and the final
/// environment (consulted by the alias resolver for imports/exports).
pub struct ExpandedProgram {
    pub dst: Tree,
    pub program: NodeId,
    pub env: Environment,
}

/// Expands every top-level statement of `root` (a `SrcProgram` node in
/// `src`) into a Dst program, resolving `using` against `lib_root`.
pub fn expand_program(src: &mut Tree, root: NodeId, lib_root: &Path) -> Result<ExpandedProgram, CompileError> {
    let mut dst = Tree::new();
    let mut env = Environment::new();
    let mut context = Context::new();
    let mut lines = Vec::new();

    let statements = src.children(root).to_vec();
    for stmt in statements {
        env = expand_statement(env, src, stmt, &mut dst, &mut context, lib_root, &mut lines)?;
    }

    let program = dst.branch(Kind::Program, lines);
    Ok(ExpandedProgram { dst, program, env })
}

fn expand_statement(
    env: Environment,
    src: &mut Tree,
    stmt: NodeId,
    dst: &mut Tree,
    context: &mut Context,
    lib_root: &Path,
    lines: &mut Vec<NodeId>,
) -> Result<Environment, CompileError> {
    match src.kind(stmt) {
        Kind::Comment => Ok(env),

        Kind::Using => {
            let name = src.value(stmt).expect("Using always carries a value").to_owned();
            context.set_statement(format!("using {name}"));
            debug!(library = %name, "resolving using statement");
            let path = library::locate(lib_root, &name)?;
            let (lib_tree, lib_root_id) = library::load(&path)?;
            library::install(env, &lib_tree, lib_root_id, &name)
        }

        Kind::Let(sort) => {
            let children = src.children(stmt).to_vec();
            let name = src.value(children[0]).expect("Let's first child is an Ident").to_owned();
            context.set_statement(format!("let {} {name} = ...", sort.name()));
            let expr = children[1];

            let index = env.next_index(sort);
            let (assignment_nodes, value) = match sort {
                Sort::Scalar => {
                    let num = scalar::expand_scalar(&env, src, expr, dst, context)?;
                    let (assignment, fresh) = num.assign(dst, &format!("N{index}"));
                    (vec![assignment], Value::Scalar(fresh))
                }
                Sort::Vector => {
                    let v = vector::expand_vector(&env, src, expr, dst, context)?;
                    let (assignments, fresh) = v.assign(dst, index);
                    (assignments, Value::Vector(fresh))
                }
                Sort::Matrix => {
                    let m = matrix::expand_matrix(&env, src, expr, dst, context)?;
                    let (assignments, fresh) = m.assign(dst, index);
                    (assignments, Value::Matrix(fresh))
                }
            };
            lines.push(dst.branch(Kind::Line, assignment_nodes));
            let (env, _) = env.define_variable(&name, value, context)?;
            Ok(env)
        }

        Kind::Define(return_sort) => {
            let children = src.children(stmt).to_vec();
            let name = src.value(children[0]).expect("Define's first child is an Ident").to_owned();
            context.set_statement(format!("define {name}(...)"));
            let body = *children.last().expect("Define always has a trailing body expression");
            let params = children[1..children.len() - 1]
                .iter()
                .map(|&p| match src.kind(p) {
                    Kind::Param(sort) => (src.value(p).expect("Param always carries a name").to_owned(), sort),
                    other => unreachable!("Define's middle children are always Param nodes, got {other:?}"),
                })
                .collect();
            let macro_def = Macro::new(name, params, return_sort, src, body, context)?;
            env.define_macro(macro_def, context)
        }

        Kind::Import => expand_import(env, src, stmt, context),

        Kind::ImportGroup => {
            let mut env = env;
            for &import in src.children(stmt).to_vec().iter() {
                env = expand_import(env, src, import, context)?;
            }
            Ok(env)
        }

        Kind::Export => {
            let children = src.children(stmt).to_vec();
            let alias = src.value(children[0]).expect("Export's first child is an Ident").to_owned();
            let target = src.value(children[1]).expect("Export's second child is an Ident").to_owned();
            context.set_statement(format!("export {alias} as {target}"));
            env.add_export(&alias, &target, context)
        }

        other => Err(CompileError::parse(format!("unexpected top-level statement kind {other:?}"), context)),
    }
}

fn expand_import(env: Environment, src: &Tree, import: NodeId, context: &mut Context) -> Result<Environment, CompileError> {
    let children = src.children(import);
    let alias = src.value(children[0]).expect("Import's first child is an Ident").to_owned();
    let target = src.value(children[1]).expect("Import's second child is an Ident").to_owned();
    context.set_statement(format!("import {alias} as {target}"));
    env.add_import(&alias, &target, context)
}
