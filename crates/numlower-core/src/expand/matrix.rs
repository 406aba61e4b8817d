//! Matrix expander (`expand_matrix`, part of C8, §4.4).

use crate::{
    diagnostics::{CompileError, Context},
    env::Environment,
    expand::{expand_macro_call, scalar, vector},
    ops::Sort,
    tree::{Kind, NodeId, Tree},
    value::Matrix,
};

pub fn expand_matrix(env: &Environment, src: &mut Tree, node: NodeId, dst: &mut Tree, context: &mut Context) -> Result<Matrix, CompileError> {
    match src.kind(node) {
        Kind::VarRef => {
            let name = src.value(node).expect("VarRef always carries a value").to_owned();
            context.set_expression(format!("variable `{name}`"));
            let bound = env.lookup_variable(&name, context)?;
            bound
                .as_matrix()
                .cloned()
                .ok_or_else(|| CompileError::sort_mismatch(format!("`{name}` is not a matrix"), context))
        }

        Kind::MacroCall => {
            let value = expand_macro_call(Sort::Matrix, env, src, node, dst, context)?;
            Ok(value.as_matrix().cloned().expect("expand_macro_call honored the requested sort"))
        }

        Kind::MatrixLit => {
            let children = src.children(node).to_vec();
            let rows = children
                .iter()
                .map(|&c| vector::expand_vector(env, src, c, dst, context))
                .collect::<Result<Vec<_>, _>>()?;
            Matrix::new(rows, context)
        }

        Kind::Map(op) => {
            let inner = expand_matrix(env, src, src.child(node, 0), dst, context)?;
            Ok(inner.map(op))
        }

        Kind::PreMap(op) => {
            let (n_node, m_node) = (src.child(node, 0), src.child(node, 1));
            let n = scalar::expand_scalar(env, src, n_node, dst, context)?;
            let m = expand_matrix(env, src, m_node, dst, context)?;
            Ok(m.premap(op, &n))
        }

        Kind::PostMap(op) => {
            let (m_node, n_node) = (src.child(node, 0), src.child(node, 1));
            let m = expand_matrix(env, src, m_node, dst, context)?;
            let n = scalar::expand_scalar(env, src, n_node, dst, context)?;
            Ok(m.postmap(&n, op))
        }

        Kind::Apply(op) => {
            let (a_node, b_node) = (src.child(node, 0), src.child(node, 1));
            let a = expand_matrix(env, src, a_node, dst, context)?;
            let b = expand_matrix(env, src, b_node, dst, context)?;
            a.apply(op, &b, context)
        }

        Kind::Transpose => {
            let m = expand_matrix(env, src, src.child(node, 0), dst, context)?;
            Ok(m.transpose())
        }

        Kind::MatMul => {
            let (a_node, b_node) = (src.child(node, 0), src.child(node, 1));
            let a = expand_matrix(env, src, a_node, dst, context)?;
            let b = expand_matrix(env, src, b_node, dst, context)?;
            a.matmul(&b, context)
        }

        other => Err(CompileError::sort_mismatch(format!("expected a matrix expression, found {other:?}"), context)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_row(src: &mut Tree, values: &[&str]) -> NodeId {
        let elems: Vec<NodeId> = values.iter().map(|v| src.leaf(Kind::NumberLit, *v)).collect();
        src.branch(Kind::VectorLit, elems)
    }

    #[test]
    fn expands_a_matrix_literal() {
        let mut src = Tree::new();
        let r0 = lit_row(&mut src, &["1", "2"]);
        let r1 = lit_row(&mut src, &["3", "4"]);
        let lit = src.branch(Kind::MatrixLit, vec![r0, r1]);
        let mut dst = Tree::new();
        let m = expand_matrix(&Environment::new(), &mut src, lit, &mut dst, &mut Context::new()).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 2);
    }

    #[test]
    fn transpose_then_matmul_expands() {
        let mut src = Tree::new();
        let r0 = lit_row(&mut src, &["1", "2"]);
        let r1 = lit_row(&mut src, &["3", "4"]);
        let lit = src.branch(Kind::MatrixLit, vec![r0, r1]);
        let t = src.branch(Kind::Transpose, vec![lit]);
        let mul = src.branch(Kind::MatMul, vec![lit, t]);
        let mut dst = Tree::new();
        let m = expand_matrix(&Environment::new(), &mut src, mul, &mut dst, &mut Context::new()).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 2);
    }
}
