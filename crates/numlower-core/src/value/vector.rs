//! Vector value (C3): an ordered, value-semantic sequence of `Num`.

use crate::{
    diagnostics::{CompileError, Context},
    ops::{SrcBinary, SrcUnary},
    tree::{NodeId, Tree},
    value::scalar::Num,
};

#[derive(Debug, Clone)]
pub struct Vector {
    elems: Vec<Num>,
}

impl Vector {
    /// Validates the §4.2 invariant that a vector literal has length >= 1;
    /// the only way an empty Src literal can reach a `Vector` at all.
    pub fn new(elems: Vec<Num>, context: &Context) -> Result<Self, CompileError> {
        if elems.is_empty() {
            return Err(CompileError::shape_mismatch("vector literal must have at least one element", context));
        }
        Ok(Self { elems })
    }

    /// Builds from elements already known to be non-empty, e.g. the result
    /// of mapping or zipping an existing (non-empty) vector — used where a
    /// `Context` isn't otherwise at hand and re-validating would be inert.
    pub(crate) fn from_non_empty(elems: Vec<Num>) -> Self {
        debug_assert!(!elems.is_empty());
        Self { elems }
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn elems(&self) -> &[Num] {
        &self.elems
    }

    pub fn map(&self, op: SrcUnary) -> Self {
        Self { elems: self.elems.iter().map(|v| v.clone().unary(op)).collect() }
    }

    pub fn premap(&self, op: SrcBinary, n: &Num) -> Self {
        Self { elems: self.elems.iter().map(|v| v.clone().binary(op, n.clone())).collect() }
    }

    pub fn postmap(&self, n: &Num, op: SrcBinary) -> Self {
        Self { elems: self.elems.iter().map(|v| n.clone().binary(op, v.clone())).collect() }
    }

    /// `apply`/`vecbinary`: pointwise binary combination with another vector
    /// of the same length.
    pub fn apply(&self, op: SrcBinary, other: &Self, context: &Context) -> Result<Self, CompileError> {
        if self.len() != other.len() {
            return Err(CompileError::shape_mismatch(
                format!("vector apply requires equal lengths, got {} and {}", self.len(), other.len()),
                context,
            ));
        }
        Ok(Self {
            elems: self
                .elems
                .iter()
                .zip(&other.elems)
                .map(|(a, b)| a.clone().binary(op, b.clone()))
                .collect(),
        })
    }

    pub fn concat(&self, other: &Self) -> Self {
        let mut elems = self.elems.clone();
        elems.extend(other.elems.iter().cloned());
        Self { elems }
    }

    pub fn reverse(&self) -> Self {
        let mut elems = self.elems.clone();
        elems.reverse();
        Self { elems }
    }

    pub fn dot(&self, other: &Self, context: &Context) -> Result<Num, CompileError> {
        if self.len() != other.len() {
            return Err(CompileError::shape_mismatch(
                format!("dot product requires equal lengths, got {} and {}", self.len(), other.len()),
                context,
            ));
        }
        let mut products = self.elems.iter().zip(&other.elems).map(|(a, b)| a.clone().binary(SrcBinary::Base(crate::ops::BinaryOp::Mul), b.clone()));
        let first = products.next().expect("vectors are never empty");
        Ok(products.fold(first, |acc, term| acc.binary(SrcBinary::Base(crate::ops::BinaryOp::Add), term)))
    }

    pub fn scalar_len(&self) -> Num {
        Num::literal(crate::decimal::Decimal::from_i64(self.len() as i64))
    }

    pub fn reduce(&self, op: SrcBinary, context: &Context) -> Result<Num, CompileError> {
        if self.elems.is_empty() {
            return Err(CompileError::shape_mismatch("reduce of an empty vector", context));
        }
        let mut iter = self.elems.iter().cloned();
        let first = iter.next().unwrap();
        Ok(iter.fold(first, |acc, next| acc.binary(op, next)))
    }

    pub fn elem(&self, index: usize, context: &Context) -> Result<Num, CompileError> {
        self.elems.get(index).cloned().ok_or_else(|| {
            CompileError::index_out_of_range(format!("vector index {index} out of range (length {})", self.len()), context)
        })
    }

    /// Emits one assignment per element to `V<index>_e<i>` (§4.2), returning
    /// the assignment nodes and a vector of fresh variable-`Num`s.
    pub fn assign(&self, tree: &mut Tree, index: u32) -> (Vec<NodeId>, Self) {
        let mut assignments = Vec::with_capacity(self.elems.len());
        let mut fresh = Vec::with_capacity(self.elems.len());
        for (i, elem) in self.elems.iter().enumerate() {
            let ident = format!("V{index}_e{i}");
            let (assignment, new_num) = elem.assign(tree, &ident);
            assignments.push(assignment);
            fresh.push(new_num);
        }
        (assignments, Self::from_non_empty(fresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal;

    fn lit(n: i64) -> Num {
        Num::literal(Decimal::from_i64(n))
    }

    fn vec_of(elems: Vec<Num>) -> Vector {
        Vector::new(elems, &Context::new()).unwrap()
    }

    #[test]
    fn new_rejects_empty_literal() {
        let err = Vector::new(vec![], &Context::new()).unwrap_err();
        assert!(matches!(err, CompileError::ShapeMismatch { .. }));
    }

    #[test]
    fn dot_fails_on_length_mismatch() {
        let a = vec_of(vec![lit(1), lit(2)]);
        let b = vec_of(vec![lit(1)]);
        assert!(a.dot(&b, &Context::new()).is_err());
    }

    #[test]
    fn reduce_folds_single_element_vector() {
        let v = vec_of(vec![lit(1)]);
        assert!(v.reduce(SrcBinary::Base(crate::ops::BinaryOp::Add), &Context::new()).is_ok());
    }

    #[test]
    fn assign_names_elements_with_index_and_position() {
        let mut tree = Tree::new();
        let v = vec_of(vec![lit(1), lit(2)]);
        let (assignments, fresh) = v.assign(&mut tree, 3);
        assert_eq!(assignments.len(), 2);
        assert_eq!(tree.value(tree.child(assignments[0], 0)), Some("V3_e0"));
        assert_eq!(tree.value(tree.child(assignments[1], 0)), Some("V3_e1"));
        assert_eq!(fresh.len(), 2);
    }
}
