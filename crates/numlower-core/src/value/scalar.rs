//! Scalar value (C2) — `Num`.
//!
//! Carries a deferred op-queue rather than a materialized expression tree
//! (Design Notes §9): composing many operations on one scalar is then O(1)
//! per step, and the Dst expression tree is only built once, at `evaluate`
//! time. This mirrors the teacher's `CodeBuilder`
//! (`crates/ouros/src/bytecode/builder.rs`), which likewise defers building
//! its output representation until enough has been recorded to emit it.

use crate::{
    decimal::Decimal,
    ops::{BinaryOp, SrcBinary, SrcUnary, UnaryOp},
    tree::{Kind, NodeId, Tree},
};

#[derive(Debug, Clone)]
enum Initial {
    Literal(Decimal),
    Ident(String),
}

#[derive(Debug, Clone)]
enum QueueOp {
    Unary(UnaryOp),
    Binary(BinaryOp, Num),
}

/// A deferred scalar computation: an initial literal or identifier, plus an
/// ordered queue of operations still to apply.
#[derive(Debug, Clone)]
pub struct Num {
    initial: Initial,
    queue: Vec<QueueOp>,
}

impl Num {
    pub fn literal(value: Decimal) -> Self {
        Self {
            initial: Initial::Literal(value),
            queue: Vec::new(),
        }
    }

    pub fn variable(ident: impl Into<String>) -> Self {
        Self {
            initial: Initial::Ident(ident.into()),
            queue: Vec::new(),
        }
    }

    fn push_unary(mut self, op: UnaryOp) -> Self {
        self.queue.push(QueueOp::Unary(op));
        self
    }

    fn push_binary(mut self, op: BinaryOp, other: Num) -> Self {
        self.queue.push(QueueOp::Binary(op, other));
        self
    }

    fn reciprocal(self) -> Self {
        Num::literal(Decimal::from_i64(1)).push_binary(BinaryOp::Div, self)
    }

    /// Applies one surface unary operator. Base operators are queued;
    /// `ln`/`csc`/`sec`/`cot`/`arccsc`/`arcsec`/`arccot` are macro-expanded
    /// immediately into compositions of base unary/binary operators (§4.1).
    pub fn unary(self, op: SrcUnary) -> Self {
        match op {
            SrcUnary::Base(base) => self.push_unary(base),
            SrcUnary::Ln => ln_expand(self),
            SrcUnary::Csc => self.push_unary(UnaryOp::Sin).reciprocal(),
            SrcUnary::Sec => self.push_unary(UnaryOp::Cos).reciprocal(),
            SrcUnary::Cot => self.push_unary(UnaryOp::Tan).reciprocal(),
            SrcUnary::ArcCsc => self.push_unary(UnaryOp::ArcSin).reciprocal(),
            SrcUnary::ArcSec => self.push_unary(UnaryOp::ArcCos).reciprocal(),
            SrcUnary::ArcCot => self.push_unary(UnaryOp::ArcTan).reciprocal(),
        }
    }

    /// Applies one surface binary operator. Base operators are queued;
    /// `nand`/`nor`/`xor` rewrite to compositions of `and`/`or`/`not` (§4.1).
    pub fn binary(self, op: SrcBinary, other: Num) -> Self {
        match op {
            SrcBinary::Base(base) => self.push_binary(base, other),
            SrcBinary::Nand => self.push_binary(BinaryOp::And, other).push_unary(UnaryOp::Not),
            SrcBinary::Nor => self.push_binary(BinaryOp::Or, other).push_unary(UnaryOp::Not),
            SrcBinary::Xor => {
                let a_or_b = self.clone().push_binary(BinaryOp::Or, other.clone());
                let a_and_b = self.push_binary(BinaryOp::And, other).push_unary(UnaryOp::Not);
                a_or_b.push_binary(BinaryOp::And, a_and_b)
            }
        }
    }

    /// Folds the op-queue into a Dst expression tree rooted in `tree`.
    pub fn evaluate(&self, tree: &mut Tree) -> NodeId {
        let mut current = match &self.initial {
            Initial::Literal(value) => tree.leaf(Kind::Number, value.render()),
            Initial::Ident(name) => tree.leaf(Kind::Variable, name.clone()),
        };
        for op in &self.queue {
            current = match op {
                QueueOp::Unary(u) => tree.branch(Kind::Unary(*u), vec![current]),
                QueueOp::Binary(b, other) => {
                    let rhs = other.evaluate(tree);
                    tree.branch(Kind::Binary(*b), vec![current, rhs])
                }
            };
        }
        current
    }

    /// If this scalar is a bare, un-queued literal, returns it as a
    /// non-negative index. Used wherever an index must be resolvable at
    /// expansion time (`elem`, `row`, `col`): Dst has no compound indexing
    /// expression, so the index can't be deferred into the op-queue.
    pub fn as_constant_index(&self) -> Option<usize> {
        if !self.queue.is_empty() {
            return None;
        }
        match &self.initial {
            Initial::Literal(value) => value.to_usize(),
            Initial::Ident(_) => None,
        }
    }

    /// Materializes this value as a single Dst assignment to a fresh
    /// intermediate identifier, returning the assignment node and a fresh
    /// `Num` referencing that identifier (§4.1).
    pub fn assign(&self, tree: &mut Tree, ident: &str) -> (NodeId, Num) {
        let rhs = self.evaluate(tree);
        let lhs = tree.leaf(Kind::Variable, ident);
        let assignment = tree.branch(Kind::Assignment, vec![lhs, rhs]);
        (assignment, Num::variable(ident))
    }
}

/// `ln(z) ≈ 2 · Σ_{k=0..3} (1/(2k+1)) · ((z−1)/(z+1))^(2k+1)` (§4.2),
/// built purely by composing `unary`/`binary` on scalars.
fn ln_expand(z: Num) -> Num {
    let one = || Num::literal(Decimal::from_i64(1));
    let ratio = z.clone().push_binary(BinaryOp::Sub, one()).push_binary(
        BinaryOp::Div,
        z.push_binary(BinaryOp::Add, one()),
    );
    let mut sum = Num::literal(Decimal::zero());
    for k in 0..4 {
        let power = 2 * k + 1;
        let term = ratio
            .clone()
            .push_binary(BinaryOp::Exp, Num::literal(Decimal::from_i64(power)))
            .push_binary(BinaryOp::Div, Num::literal(Decimal::from_i64(power)));
        sum = sum.push_binary(BinaryOp::Add, term);
    }
    sum.push_binary(BinaryOp::Mul, Num::literal(Decimal::from_i64(2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_builds_left_folded_tree() {
        let mut tree = Tree::new();
        let n = Num::variable("x")
            .binary(SrcBinary::Base(BinaryOp::Add), Num::literal(Decimal::from_i64(1)))
            .unary(SrcUnary::Base(UnaryOp::Neg));
        let root = n.evaluate(&mut tree);
        assert_eq!(tree.kind(root), Kind::Unary(UnaryOp::Neg));
        let add = tree.child(root, 0);
        assert_eq!(tree.kind(add), Kind::Binary(BinaryOp::Add));
    }

    #[test]
    fn assign_emits_one_assignment_and_fresh_reference() {
        let mut tree = Tree::new();
        let n = Num::literal(Decimal::from_i64(2)).binary(SrcBinary::Base(BinaryOp::Mul), Num::literal(Decimal::from_i64(3)));
        let (assignment, fresh) = n.assign(&mut tree, "N0");
        assert_eq!(tree.kind(assignment), Kind::Assignment);
        assert_eq!(tree.value(tree.child(assignment, 0)), Some("N0"));
        let mut tree2 = Tree::new();
        assert_eq!(tree2.value(fresh.evaluate(&mut tree2)), Some("N0"));
    }

    #[test]
    fn csc_is_reciprocal_of_sin() {
        let mut tree = Tree::new();
        let n = Num::variable("x").unary(SrcUnary::Csc);
        let root = n.evaluate(&mut tree);
        assert_eq!(tree.kind(root), Kind::Binary(BinaryOp::Div));
        let rhs = tree.child(root, 1);
        assert_eq!(tree.kind(rhs), Kind::Unary(UnaryOp::Sin));
    }
}
