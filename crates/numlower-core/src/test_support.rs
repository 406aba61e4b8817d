//! A minimal internal Src tree builder, standing in for the out-of-scope
//! surface-grammar parser (§6.1). This is test-only scaffolding for
//! constructing fixtures, not a parser, and carries no stability guarantee:
//! its shape is free to change alongside the tests that use it.

use crate::{
    ops::{SrcBinary, SrcUnary, Sort},
    tree::{Kind, NodeId, Tree},
};

pub struct SrcBuilder {
    tree: Tree,
    statements: Vec<NodeId>,
}

impl Default for SrcBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SrcBuilder {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            statements: Vec::new(),
        }
    }

    // --- expressions ---

    pub fn number(&mut self, text: &str) -> NodeId {
        self.tree.leaf(Kind::NumberLit, text)
    }

    pub fn var(&mut self, name: &str) -> NodeId {
        self.tree.leaf(Kind::VarRef, name)
    }

    pub fn external(&mut self, name: &str) -> NodeId {
        self.tree.leaf(Kind::ExternalRef, name)
    }

    pub fn unary(&mut self, op: SrcUnary, inner: NodeId) -> NodeId {
        self.tree.branch(Kind::SrcUnaryExpr(op), vec![inner])
    }

    pub fn binary(&mut self, op: SrcBinary, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.tree.branch(Kind::SrcBinaryExpr(op), vec![lhs, rhs])
    }

    pub fn vector_lit(&mut self, elems: Vec<NodeId>) -> NodeId {
        self.tree.branch(Kind::VectorLit, elems)
    }

    pub fn matrix_lit(&mut self, rows: Vec<NodeId>) -> NodeId {
        self.tree.branch(Kind::MatrixLit, rows)
    }

    pub fn map(&mut self, op: SrcUnary, v: NodeId) -> NodeId {
        self.tree.branch(Kind::Map(op), vec![v])
    }

    pub fn premap(&mut self, op: SrcBinary, n: NodeId, v: NodeId) -> NodeId {
        self.tree.branch(Kind::PreMap(op), vec![n, v])
    }

    pub fn postmap(&mut self, op: SrcBinary, v: NodeId, n: NodeId) -> NodeId {
        self.tree.branch(Kind::PostMap(op), vec![v, n])
    }

    pub fn apply(&mut self, op: SrcBinary, a: NodeId, b: NodeId) -> NodeId {
        self.tree.branch(Kind::Apply(op), vec![a, b])
    }

    pub fn concat(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.tree.branch(Kind::Concat, vec![a, b])
    }

    pub fn reverse(&mut self, v: NodeId) -> NodeId {
        self.tree.branch(Kind::Reverse, vec![v])
    }

    pub fn dot(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.tree.branch(Kind::Dot, vec![a, b])
    }

    pub fn len(&mut self, v: NodeId) -> NodeId {
        self.tree.branch(Kind::Len, vec![v])
    }

    pub fn reduce(&mut self, op: SrcBinary, v: NodeId) -> NodeId {
        self.tree.branch(Kind::Reduce(op), vec![v])
    }

    pub fn elem_vec(&mut self, v: NodeId, index: NodeId) -> NodeId {
        self.tree.branch(Kind::Elem, vec![v, index])
    }

    pub fn elem_mat(&mut self, m: NodeId, row: NodeId, col: NodeId) -> NodeId {
        self.tree.branch(Kind::Elem, vec![m, row, col])
    }

    pub fn transpose(&mut self, m: NodeId) -> NodeId {
        self.tree.branch(Kind::Transpose, vec![m])
    }

    pub fn matmul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.tree.branch(Kind::MatMul, vec![a, b])
    }

    pub fn row(&mut self, m: NodeId, index: NodeId) -> NodeId {
        self.tree.branch(Kind::Row, vec![m, index])
    }

    pub fn col(&mut self, m: NodeId, index: NodeId) -> NodeId {
        self.tree.branch(Kind::Col, vec![m, index])
    }

    pub fn rows(&mut self, m: NodeId) -> NodeId {
        self.tree.branch(Kind::Rows, vec![m])
    }

    pub fn cols(&mut self, m: NodeId) -> NodeId {
        self.tree.branch(Kind::Cols, vec![m])
    }

    pub fn macro_call(&mut self, name: &str, args: Vec<NodeId>) -> NodeId {
        let ident = self.tree.leaf(Kind::Ident, name);
        let mut children = vec![ident];
        children.extend(args);
        self.tree.branch(Kind::MacroCall, children)
    }

    // --- statements ---

    pub fn let_stmt(&mut self, sort: Sort, name: &str, expr: NodeId) -> &mut Self {
        let ident = self.tree.leaf(Kind::Ident, name);
        let stmt = self.tree.branch(Kind::Let(sort), vec![ident, expr]);
        self.statements.push(stmt);
        self
    }

    pub fn define(&mut self, name: &str, params: Vec<(&str, Sort)>, return_sort: Sort, body: NodeId) -> &mut Self {
        let ident = self.tree.leaf(Kind::Ident, name);
        let mut children = vec![ident];
        for (param, sort) in params {
            children.push(self.tree.leaf(Kind::Param(sort), param));
        }
        children.push(body);
        let stmt = self.tree.branch(Kind::Define(return_sort), children);
        self.statements.push(stmt);
        self
    }

    pub fn import(&mut self, alias: &str, target: &str) -> &mut Self {
        let stmt = self.import_node(alias, target);
        self.statements.push(stmt);
        self
    }

    /// A single grouped `import alias as target`, not yet a top-level
    /// statement on its own — used by `import_group`.
    fn import_node(&mut self, alias: &str, target: &str) -> NodeId {
        let a = self.tree.leaf(Kind::Ident, alias);
        let t = self.tree.leaf(Kind::Ident, target);
        self.tree.branch(Kind::Import, vec![a, t])
    }

    /// `import X as x, Y as y, ...` — one `ImportGroup` statement wrapping
    /// several `Import` children (§4.4's multi-import form).
    pub fn import_group(&mut self, imports: Vec<(&str, &str)>) -> &mut Self {
        let children = imports.into_iter().map(|(alias, target)| self.import_node(alias, target)).collect();
        let stmt = self.tree.branch(Kind::ImportGroup, children);
        self.statements.push(stmt);
        self
    }

    pub fn export(&mut self, alias: &str, target: &str) -> &mut Self {
        let a = self.tree.leaf(Kind::Ident, alias);
        let t = self.tree.leaf(Kind::Ident, target);
        let stmt = self.tree.branch(Kind::Export, vec![a, t]);
        self.statements.push(stmt);
        self
    }

    pub fn using(&mut self, name: &str) -> &mut Self {
        let stmt = self.tree.leaf(Kind::Using, name);
        self.statements.push(stmt);
        self
    }

    pub fn comment(&mut self, text: &str) -> &mut Self {
        let stmt = self.tree.leaf(Kind::Comment, text);
        self.statements.push(stmt);
        self
    }

    /// Finishes the program, returning the owning tree and its `SrcProgram`
    /// root. Also usable to build a library file's tree/root pair, since a
    /// library is just a `SrcProgram` restricted to `define`s and comments.
    pub fn build(mut self) -> (Tree, NodeId) {
        let root = self.tree.branch(Kind::SrcProgram, self.statements);
        (self.tree, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_let_statement_program() {
        let mut b = SrcBuilder::new();
        let lit = b.number("1");
        b.let_stmt(Sort::Scalar, "A", lit);
        let (tree, root) = b.build();
        assert_eq!(tree.children(root).len(), 1);
        assert_eq!(tree.kind(tree.children(root)[0]), Kind::Let(Sort::Scalar));
    }
}
