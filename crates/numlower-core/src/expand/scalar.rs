//! Scalar expander (`expand_scalar`, part of C8, §4.4).

use crate::{
    decimal::Decimal,
    diagnostics::{CompileError, Context},
    env::Environment,
    expand::{expand_index, expand_macro_call, matrix, vector},
    ops::Sort,
    tree::{Kind, NodeId, Tree},
    value::Num,
};

pub fn expand_scalar(env: &Environment, src: &mut Tree, node: NodeId, dst: &mut Tree, context: &mut Context) -> Result<Num, CompileError> {
    match src.kind(node) {
        Kind::NumberLit => {
            let text = src.value(node).expect("NumberLit always carries a value").to_owned();
            let value = Decimal::parse(&text).ok_or_else(|| CompileError::parse(format!("invalid numeric literal `{text}`"), context))?;
            Ok(Num::literal(value))
        }

        Kind::VarRef => {
            let name = src.value(node).expect("VarRef always carries a value").to_owned();
            context.set_expression(format!("variable `{name}`"));
            let bound = env.lookup_variable(&name, context)?;
            bound
                .as_scalar()
                .cloned()
                .ok_or_else(|| CompileError::sort_mismatch(format!("`{name}` is not a number"), context))
        }

        Kind::ExternalRef => {
            let name = src.value(node).expect("ExternalRef always carries a value").to_owned();
            context.set_expression(format!("external `{name}`"));
            if env.imports().contains_key(&name) {
                Ok(Num::variable(name))
            } else {
                Err(CompileError::resolution(format!("external `{name}`"), context))
            }
        }

        Kind::MacroCall => {
            let value = expand_macro_call(Sort::Scalar, env, src, node, dst, context)?;
            Ok(value.as_scalar().cloned().expect("expand_macro_call honored the requested sort"))
        }

        Kind::SrcUnaryExpr(op) => {
            let inner_node = src.child(node, 0);
            let inner = expand_scalar(env, src, inner_node, dst, context)?;
            Ok(inner.unary(op))
        }

        Kind::SrcBinaryExpr(op) => {
            let (lhs, rhs) = (src.child(node, 0), src.child(node, 1));
            let left = expand_scalar(env, src, lhs, dst, context)?;
            let right = expand_scalar(env, src, rhs, dst, context)?;
            Ok(left.binary(op, right))
        }

        Kind::Len => {
            let v = vector::expand_vector(env, src, src.child(node, 0), dst, context)?;
            Ok(v.scalar_len())
        }

        Kind::Rows => {
            let m = matrix::expand_matrix(env, src, src.child(node, 0), dst, context)?;
            Ok(m.scalar_rows())
        }

        Kind::Cols => {
            let m = matrix::expand_matrix(env, src, src.child(node, 0), dst, context)?;
            Ok(m.scalar_cols())
        }

        Kind::Dot => {
            let (a_node, b_node) = (src.child(node, 0), src.child(node, 1));
            let a = vector::expand_vector(env, src, a_node, dst, context)?;
            let b = vector::expand_vector(env, src, b_node, dst, context)?;
            a.dot(&b, context)
        }

        Kind::Reduce(op) => {
            let v = vector::expand_vector(env, src, src.child(node, 0), dst, context)?;
            v.reduce(op, context)
        }

        Kind::Elem => {
            let children = src.children(node).to_vec();
            match children.len() {
                2 => {
                    let v = vector::expand_vector(env, src, children[0], dst, context)?;
                    let index = expand_index(env, src, children[1], dst, context)?;
                    v.elem(index, context)
                }
                3 => {
                    let m = matrix::expand_matrix(env, src, children[0], dst, context)?;
                    let i = expand_index(env, src, children[1], dst, context)?;
                    let j = expand_index(env, src, children[2], dst, context)?;
                    m.elem(i, j, context)
                }
                n => Err(CompileError::parse(format!("elem requires 2 or 3 children, got {n}"), context)),
            }
        }

        other => Err(CompileError::sort_mismatch(format!("expected a number expression, found {other:?}"), context)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{BinaryOp, SrcBinary};

    #[test]
    fn expands_a_literal() {
        let mut src = Tree::new();
        let lit = src.leaf(Kind::NumberLit, "3.5");
        let mut dst = Tree::new();
        let n = expand_scalar(&Environment::new(), &mut src, lit, &mut dst, &mut Context::new()).unwrap();
        assert_eq!(dst.value(n.evaluate(&mut dst)), Some("3.5"));
    }

    #[test]
    fn resolves_a_bound_variable() {
        let mut src = Tree::new();
        let var = src.leaf(Kind::VarRef, "A");
        let mut dst = Tree::new();
        let (env, _) = Environment::new()
            .define_variable("A", crate::value::Value::Scalar(Num::literal(Decimal::from_i64(7))), &Context::new())
            .unwrap();
        let n = expand_scalar(&env, &mut src, var, &mut dst, &mut Context::new()).unwrap();
        assert_eq!(dst.value(n.evaluate(&mut dst)), Some("7"));
    }

    #[test]
    fn rejects_unknown_external() {
        let mut src = Tree::new();
        let ext = src.leaf(Kind::ExternalRef, "X");
        let mut dst = Tree::new();
        assert!(expand_scalar(&Environment::new(), &mut src, ext, &mut dst, &mut Context::new()).is_err());
    }

    #[test]
    fn expands_binary_expression() {
        let mut src = Tree::new();
        let a = src.leaf(Kind::NumberLit, "1");
        let b = src.leaf(Kind::NumberLit, "2");
        let add = src.branch(Kind::SrcBinaryExpr(SrcBinary::Base(BinaryOp::Add)), vec![a, b]);
        let mut dst = Tree::new();
        let n = expand_scalar(&Environment::new(), &mut src, add, &mut dst, &mut Context::new()).unwrap();
        let root = n.evaluate(&mut dst);
        assert_eq!(dst.kind(root), Kind::Binary(BinaryOp::Add));
    }
}
