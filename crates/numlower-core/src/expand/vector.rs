//! Vector expander (`expand_vector`, part of C8, §4.4).

use crate::{
    diagnostics::{CompileError, Context},
    env::Environment,
    expand::{expand_index, expand_macro_call, matrix, scalar},
    ops::Sort,
    tree::{Kind, NodeId, Tree},
    value::Vector,
};

pub fn expand_vector(env: &Environment, src: &mut Tree, node: NodeId, dst: &mut Tree, context: &mut Context) -> Result<Vector, CompileError> {
    match src.kind(node) {
        Kind::VarRef => {
            let name = src.value(node).expect("VarRef always carries a value").to_owned();
            context.set_expression(format!("variable `{name}`"));
            let bound = env.lookup_variable(&name, context)?;
            bound
                .as_vector()
                .cloned()
                .ok_or_else(|| CompileError::sort_mismatch(format!("`{name}` is not a vector"), context))
        }

        Kind::MacroCall => {
            let value = expand_macro_call(Sort::Vector, env, src, node, dst, context)?;
            Ok(value.as_vector().cloned().expect("expand_macro_call honored the requested sort"))
        }

        Kind::VectorLit => {
            let children = src.children(node).to_vec();
            let elems = children
                .iter()
                .map(|&c| scalar::expand_scalar(env, src, c, dst, context))
                .collect::<Result<Vec<_>, _>>()?;
            Vector::new(elems, context)
        }

        Kind::Map(op) => {
            let inner = expand_vector(env, src, src.child(node, 0), dst, context)?;
            Ok(inner.map(op))
        }

        Kind::PreMap(op) => {
            let (n_node, v_node) = (src.child(node, 0), src.child(node, 1));
            let n = scalar::expand_scalar(env, src, n_node, dst, context)?;
            let v = expand_vector(env, src, v_node, dst, context)?;
            Ok(v.premap(op, &n))
        }

        Kind::PostMap(op) => {
            let (v_node, n_node) = (src.child(node, 0), src.child(node, 1));
            let v = expand_vector(env, src, v_node, dst, context)?;
            let n = scalar::expand_scalar(env, src, n_node, dst, context)?;
            Ok(v.postmap(&n, op))
        }

        Kind::Apply(op) => {
            let (a_node, b_node) = (src.child(node, 0), src.child(node, 1));
            let a = expand_vector(env, src, a_node, dst, context)?;
            let b = expand_vector(env, src, b_node, dst, context)?;
            a.apply(op, &b, context)
        }

        Kind::Concat => {
            let (a_node, b_node) = (src.child(node, 0), src.child(node, 1));
            let a = expand_vector(env, src, a_node, dst, context)?;
            let b = expand_vector(env, src, b_node, dst, context)?;
            Ok(a.concat(&b))
        }

        Kind::Reverse => {
            let a = expand_vector(env, src, src.child(node, 0), dst, context)?;
            Ok(a.reverse())
        }

        Kind::Row => {
            let (m_node, idx_node) = (src.child(node, 0), src.child(node, 1));
            let m = matrix::expand_matrix(env, src, m_node, dst, context)?;
            let i = expand_index(env, src, idx_node, dst, context)?;
            m.row(i, context)
        }

        Kind::Col => {
            let (m_node, idx_node) = (src.child(node, 0), src.child(node, 1));
            let m = matrix::expand_matrix(env, src, m_node, dst, context)?;
            let j = expand_index(env, src, idx_node, dst, context)?;
            m.col(j, context)
        }

        other => Err(CompileError::sort_mismatch(format!("expected a vector expression, found {other:?}"), context)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::UnaryOp;

    #[test]
    fn expands_a_vector_literal() {
        let mut src = Tree::new();
        let a = src.leaf(Kind::NumberLit, "1");
        let b = src.leaf(Kind::NumberLit, "2");
        let lit = src.branch(Kind::VectorLit, vec![a, b]);
        let mut dst = Tree::new();
        let v = expand_vector(&Environment::new(), &mut src, lit, &mut dst, &mut Context::new()).unwrap();
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn map_negates_every_element() {
        let mut src = Tree::new();
        let a = src.leaf(Kind::NumberLit, "1");
        let lit = src.branch(Kind::VectorLit, vec![a]);
        let mapped = src.branch(Kind::Map(crate::ops::SrcUnary::Base(UnaryOp::Neg)), vec![lit]);
        let mut dst = Tree::new();
        let v = expand_vector(&Environment::new(), &mut src, mapped, &mut dst, &mut Context::new()).unwrap();
        let mut check = Tree::new();
        let root = v.elems()[0].evaluate(&mut check);
        assert_eq!(check.kind(root), Kind::Unary(UnaryOp::Neg));
    }

    #[test]
    fn row_index_must_be_constant() {
        let mut src = Tree::new();
        let a = src.leaf(Kind::NumberLit, "1");
        let b = src.leaf(Kind::NumberLit, "2");
        let row0 = src.branch(Kind::VectorLit, vec![a, b]);
        let mat = src.branch(Kind::MatrixLit, vec![row0]);
        let ext_idx = src.leaf(Kind::ExternalRef, "I");
        let row_expr = src.branch(Kind::Row, vec![mat, ext_idx]);
        let mut dst = Tree::new();
        let env = Environment::new().add_import("I", "i", &Context::new()).unwrap();
        let err = expand_vector(&env, &mut src, row_expr, &mut dst, &mut Context::new()).unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }
}
