//! Reduce pass (C10, §4.3.2): alternates propagation and algebraic-identity
//! folding to a fixed point.

use std::collections::HashMap;

use tracing::trace;

use crate::{
    decimal::Decimal,
    diagnostics::CompileError,
    ops::BinaryOp,
    tree::{Kind, NodeId, Tree},
};

/// Runs propagation and folding in alternation until neither changes
/// anything in a round (§4.3.2's termination argument: every application
/// strictly shrinks the variable-reference or binary-node count).
pub fn run(dst: &mut Tree, program: NodeId) -> Result<(), CompileError> {
    loop {
        let propagated = propagate(dst, program);
        let folded = fold(dst, program)?;
        trace!(propagated, folded, "reduce pass round");
        if !propagated && !folded {
            return Ok(());
        }
    }
}

fn propagate(dst: &mut Tree, program: NodeId) -> bool {
    let mut rhs_of: HashMap<String, NodeId> = HashMap::new();
    for &line in dst.children(program) {
        for &assignment in dst.children(line) {
            let children = dst.children(assignment);
            let (lhs, rhs) = (children[0], children[1]);
            if let Some(name) = dst.value(lhs) {
                rhs_of.insert(name.to_owned(), rhs);
            }
        }
    }

    let mut changed = false;
    for line in dst.children(program).to_vec() {
        for assignment in dst.children(line).to_vec() {
            let rhs_root = dst.children(assignment)[1];
            for candidate in dst.descendants(rhs_root) {
                if dst.kind(candidate) != Kind::Variable {
                    continue;
                }
                let Some(name) = dst.value(candidate).map(str::to_owned) else {
                    continue;
                };
                let Some(&source_rhs) = rhs_of.get(&name) else {
                    continue; // external or otherwise unassigned: tolerated
                };
                if source_rhs == candidate {
                    continue;
                }
                let eligible = dst.kind(source_rhs) == Kind::Variable || !contains_local_variable(dst, source_rhs, &rhs_of);
                if !eligible {
                    continue;
                }
                let dup = dst.duplicate(source_rhs);
                let kind = dst.kind(dup);
                let value = dst.value(dup).map(str::to_owned);
                let children = dst.children(dup).to_vec();
                dst.replace_in_place(candidate, kind, value, children);
                changed = true;
            }
        }
    }
    changed
}

/// A "pure-constant expression" (§4.3.2) is one with no reference to another
/// *locally assigned* Dst name — an import like `x` is opaque input, not a
/// name this pass could still simplify, so it doesn't block propagation the
/// way an unresolved reference to another assignment's LHS would.
fn contains_local_variable(dst: &Tree, root: NodeId, rhs_of: &HashMap<String, NodeId>) -> bool {
    dst.descendants(root)
        .iter()
        .any(|&n| dst.kind(n) == Kind::Variable && dst.value(n).is_some_and(|name| rhs_of.contains_key(name)))
}

enum Identity {
    Child(NodeId),
    Literal(Decimal),
}

fn num_literal(dst: &Tree, id: NodeId) -> Option<Decimal> {
    if dst.kind(id) == Kind::Number {
        Decimal::parse(dst.value(id)?)
    } else {
        None
    }
}

/// The identities from §4.3.2, applied when at least one operand is a
/// literal but the pair isn't (or, for `^`, is) both-literal. `x ^ 0 → 1`
/// and `0 ^ x → 0` are checked in that order so `0 ^ 0` folds to `1`.
fn try_identity(dst: &Tree, op: BinaryOp, c0: NodeId, c1: NodeId) -> Option<Identity> {
    let is_zero = |n: NodeId| num_literal(dst, n).is_some_and(|d| d.is_zero());
    let is_one = |n: NodeId| num_literal(dst, n).is_some_and(|d| d == Decimal::from_i64(1));

    match op {
        BinaryOp::Add => {
            if is_zero(c0) {
                Some(Identity::Child(c1))
            } else if is_zero(c1) {
                Some(Identity::Child(c0))
            } else {
                None
            }
        }
        BinaryOp::Sub => is_zero(c1).then_some(Identity::Child(c0)),
        BinaryOp::Mul => {
            if is_zero(c0) {
                Some(Identity::Child(c0))
            } else if is_zero(c1) {
                Some(Identity::Child(c1))
            } else if is_one(c0) {
                Some(Identity::Child(c1))
            } else if is_one(c1) {
                Some(Identity::Child(c0))
            } else {
                None
            }
        }
        BinaryOp::Div => is_one(c1).then_some(Identity::Child(c0)),
        BinaryOp::Exp => {
            if is_zero(c1) {
                Some(Identity::Literal(Decimal::from_i64(1)))
            } else if is_zero(c0) {
                Some(Identity::Literal(Decimal::zero()))
            } else if is_one(c0) {
                Some(Identity::Literal(Decimal::from_i64(1)))
            } else if is_one(c1) {
                Some(Identity::Child(c0))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn fold(dst: &mut Tree, program: NodeId) -> Result<bool, CompileError> {
    let mut changed = false;
    for node in dst.descendants(program) {
        let Kind::Binary(op) = dst.kind(node) else { continue };
        let children = dst.children(node);
        if children.len() != 2 {
            continue;
        }
        let (c0, c1) = (children[0], children[1]);

        if let (Some(a), Some(b)) = (num_literal(dst, c0), num_literal(dst, c1)) {
            let result = Decimal::binary(op, &a, &b)?;
            dst.replace_in_place(node, Kind::Number, Some(result.render()), Vec::new());
            changed = true;
            continue;
        }

        if let Some(identity) = try_identity(dst, op, c0, c1) {
            match identity {
                Identity::Child(winner) => {
                    let kind = dst.kind(winner);
                    let value = dst.value(winner).map(str::to_owned);
                    let children = dst.children(winner).to_vec();
                    dst.replace_in_place(node, kind, value, children);
                }
                Identity::Literal(value) => {
                    dst.replace_in_place(node, Kind::Number, Some(value.render()), Vec::new());
                }
            }
            changed = true;
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::SrcBinary;
    use crate::value::Num;

    fn build_program(assignments: Vec<(&str, Num)>) -> (Tree, NodeId) {
        let mut dst = Tree::new();
        let mut lines = Vec::new();
        for (name, num) in assignments {
            let (assignment, _) = num.assign(&mut dst, name);
            lines.push(dst.branch(Kind::Line, vec![assignment]));
        }
        let program = dst.branch(Kind::Program, lines);
        (dst, program)
    }

    #[test]
    fn folds_zero_plus_one_times_x_to_x() {
        // a = 0 + 1 * x  (S1)
        let one_mul_x = Num::literal(Decimal::from_i64(1)).binary(SrcBinary::Base(BinaryOp::Mul), Num::variable("x"));
        let zero_plus = Num::literal(Decimal::zero()).binary(SrcBinary::Base(BinaryOp::Add), one_mul_x);
        let (mut dst, program) = build_program(vec![("a", zero_plus)]);
        run(&mut dst, program).unwrap();

        let line = dst.children(program)[0];
        let assignment = dst.children(line)[0];
        let rhs = dst.children(assignment)[1];
        assert_eq!(dst.kind(rhs), Kind::Variable);
        assert_eq!(dst.value(rhs), Some("x"));
    }

    #[test]
    fn folds_constant_expression() {
        let two_times_three = Num::literal(Decimal::from_i64(2)).binary(SrcBinary::Base(BinaryOp::Mul), Num::literal(Decimal::from_i64(3)));
        let (mut dst, program) = build_program(vec![("a", two_times_three)]);
        run(&mut dst, program).unwrap();
        let line = dst.children(program)[0];
        let assignment = dst.children(line)[0];
        let rhs = dst.children(assignment)[1];
        assert_eq!(dst.kind(rhs), Kind::Number);
        assert_eq!(dst.value(rhs), Some("6"));
    }

    #[test]
    fn zero_to_the_zero_folds_to_one() {
        let expr = Num::literal(Decimal::zero()).binary(SrcBinary::Base(BinaryOp::Exp), Num::literal(Decimal::zero()));
        let (mut dst, program) = build_program(vec![("a", expr)]);
        run(&mut dst, program).unwrap();
        let line = dst.children(program)[0];
        let assignment = dst.children(line)[0];
        let rhs = dst.children(assignment)[1];
        assert_eq!(dst.value(rhs), Some("1"));
    }

    #[test]
    fn propagates_bare_variable_alias() {
        // a = x; b = a  -->  b = x
        let (mut dst, program) = build_program(vec![("a", Num::variable("x")), ("b", Num::variable("a"))]);
        run(&mut dst, program).unwrap();
        let second_line = dst.children(program)[1];
        let assignment = dst.children(second_line)[0];
        let rhs = dst.children(assignment)[1];
        assert_eq!(dst.value(rhs), Some("x"));
    }

    #[test]
    fn propagates_single_use_expression_referencing_an_external() {
        // a = -x; b = -y; c = a + b  -->  c = -x + -y (S2's vector-element case)
        let neg_x = Num::variable("x").unary(crate::ops::SrcUnary::Base(crate::ops::UnaryOp::Neg));
        let neg_y = Num::variable("y").unary(crate::ops::SrcUnary::Base(crate::ops::UnaryOp::Neg));
        let sum = Num::variable("a").binary(SrcBinary::Base(BinaryOp::Add), Num::variable("b"));
        let (mut dst, program) = build_program(vec![("a", neg_x), ("b", neg_y), ("c", sum)]);
        run(&mut dst, program).unwrap();

        let third_line = dst.children(program)[2];
        let assignment = dst.children(third_line)[0];
        let rhs = dst.children(assignment)[1];
        assert_eq!(dst.kind(rhs), Kind::Binary(BinaryOp::Add));
        assert!(!dst.descendants(rhs).iter().any(|&n| dst.value(n) == Some("a") || dst.value(n) == Some("b")));
    }
}
