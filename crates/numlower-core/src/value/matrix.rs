//! Matrix value (C4): an ordered, value-semantic sequence of equal-length
//! `Vector`s.

use crate::{
    decimal::Decimal,
    diagnostics::{CompileError, Context},
    ops::{SrcBinary, SrcUnary},
    tree::{NodeId, Tree},
    value::{scalar::Num, vector::Vector},
};

#[derive(Debug, Clone)]
pub struct Matrix {
    rows: Vec<Vector>,
}

impl Matrix {
    pub fn new(rows: Vec<Vector>, context: &Context) -> Result<Self, CompileError> {
        if rows.is_empty() {
            return Err(CompileError::shape_mismatch("matrix literal must have at least one row", context));
        }
        let cols = rows[0].len();
        if rows.iter().any(|r| r.len() != cols) {
            return Err(CompileError::shape_mismatch(
                "matrix literal rows must all have the same length",
                context,
            ));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.rows[0].len()
    }

    fn map_rows(&self, f: impl Fn(&Vector) -> Vector) -> Self {
        Self {
            rows: self.rows.iter().map(f).collect(),
        }
    }

    pub fn map(&self, op: SrcUnary) -> Self {
        self.map_rows(|row| row.map(op))
    }

    pub fn premap(&self, op: SrcBinary, n: &Num) -> Self {
        self.map_rows(|row| row.premap(op, n))
    }

    pub fn postmap(&self, n: &Num, op: SrcBinary) -> Self {
        self.map_rows(|row| row.postmap(n, op))
    }

    /// `apply`/`matbinary`: pointwise binary combination, same failure rule
    /// as `Vector::apply` but checked per-row and across row counts.
    pub fn apply(&self, op: SrcBinary, other: &Self, context: &Context) -> Result<Self, CompileError> {
        if self.rows() != other.rows() || self.cols() != other.cols() {
            return Err(CompileError::shape_mismatch(
                format!(
                    "matrix apply requires equal shape, got {}x{} and {}x{}",
                    self.rows(),
                    self.cols(),
                    other.rows(),
                    other.cols()
                ),
                context,
            ));
        }
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(a, b)| a.apply(op, b, context))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn transpose(&self) -> Self {
        let mut rows = Vec::with_capacity(self.cols());
        for c in 0..self.cols() {
            let col_elems: Vec<Num> = self.rows.iter().map(|row| row.elems()[c].clone()).collect();
            rows.push(Vector::from_non_empty(col_elems));
        }
        Self { rows }
    }

    /// Standard O(rows · cols · inner) product; fails unless
    /// `self.cols() == other.rows()`.
    pub fn matmul(&self, other: &Self, context: &Context) -> Result<Self, CompileError> {
        if self.cols() != other.rows() {
            return Err(CompileError::shape_mismatch(
                format!(
                    "matrix multiply requires self.cols == other.rows, got {} and {}",
                    self.cols(),
                    other.rows()
                ),
                context,
            ));
        }
        let other_t = other.transpose();
        let mut rows = Vec::with_capacity(self.rows());
        for row in &self.rows {
            let mut out = Vec::with_capacity(other.cols());
            for other_col in &other_t.rows {
                out.push(row.dot(other_col, context)?);
            }
            rows.push(Vector::from_non_empty(out));
        }
        Ok(Self { rows })
    }

    pub fn row(&self, i: usize, context: &Context) -> Result<Vector, CompileError> {
        self.rows
            .get(i)
            .cloned()
            .ok_or_else(|| CompileError::index_out_of_range(format!("row index {i} out of range (rows {})", self.rows()), context))
    }

    pub fn col(&self, j: usize, context: &Context) -> Result<Vector, CompileError> {
        if j >= self.cols() {
            return Err(CompileError::index_out_of_range(
                format!("column index {j} out of range (cols {})", self.cols()),
                context,
            ));
        }
        Ok(Vector::from_non_empty(self.rows.iter().map(|row| row.elems()[j].clone()).collect()))
    }

    pub fn elem(&self, i: usize, j: usize, context: &Context) -> Result<Num, CompileError> {
        let row = self.row(i, context)?;
        row.elem(j, context)
    }

    pub fn scalar_rows(&self) -> Num {
        Num::literal(Decimal::from_i64(self.rows() as i64))
    }

    pub fn scalar_cols(&self) -> Num {
        Num::literal(Decimal::from_i64(self.cols() as i64))
    }

    /// Emits one assignment per cell to `M<index>_r<i>_c<j>` (§4.2).
    pub fn assign(&self, tree: &mut Tree, index: u32) -> (Vec<NodeId>, Self) {
        let mut assignments = Vec::new();
        let mut fresh_rows = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            let mut fresh_elems = Vec::with_capacity(row.len());
            for (j, elem) in row.elems().iter().enumerate() {
                let ident = format!("M{index}_r{i}_c{j}");
                let (assignment, new_num) = elem.assign(tree, &ident);
                assignments.push(assignment);
                fresh_elems.push(new_num);
            }
            fresh_rows.push(Vector::from_non_empty(fresh_elems));
        }
        (assignments, Self { rows: fresh_rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: i64) -> Num {
        Num::literal(Decimal::from_i64(n))
    }

    fn mat(values: &[[i64; 2]; 2]) -> Matrix {
        let rows = values
            .iter()
            .map(|r| Vector::new(r.iter().map(|&n| lit(n)).collect(), &Context::new()).unwrap())
            .collect();
        Matrix::new(rows, &Context::new()).unwrap()
    }

    #[test]
    fn new_rejects_empty_rows() {
        let err = Matrix::new(vec![], &Context::new()).unwrap_err();
        assert!(matches!(err, CompileError::ShapeMismatch { .. }));
    }

    #[test]
    fn transpose_swaps_rows_and_cols() {
        let m = mat(&[[1, 2], [3, 4]]);
        let t = m.transpose();
        assert_eq!(t.rows(), 2);
        assert_eq!(t.cols(), 2);
    }

    #[test]
    fn matmul_checks_shape() {
        let a = mat(&[[1, 2], [3, 4]]);
        let b = Matrix::new(vec![Vector::new(vec![lit(1), lit(2), lit(3)], &Context::new()).unwrap()], &Context::new()).unwrap();
        assert!(a.matmul(&b, &Context::new()).is_err());
    }

    #[test]
    fn matmul_identity_shape_matches() {
        let a = mat(&[[1, 2], [3, 4]]);
        let t = a.transpose();
        let result = a.matmul(&t, &Context::new()).unwrap();
        assert_eq!(result.rows(), 2);
        assert_eq!(result.cols(), 2);
        // each cell is a sum of two products, fully symbolic at this stage.
        let (_, _) = result.assign(&mut Tree::new(), 7);
    }

    #[test]
    fn assign_names_cells_by_row_and_column() {
        let m = mat(&[[1, 2], [3, 4]]);
        let mut tree = Tree::new();
        let (assignments, _) = m.assign(&mut tree, 2);
        assert_eq!(assignments.len(), 4);
        assert_eq!(tree.value(tree.child(assignments[0], 0)), Some("M2_r0_c0"));
        assert_eq!(tree.value(tree.child(assignments[3], 0)), Some("M2_r1_c1"));
    }
}
