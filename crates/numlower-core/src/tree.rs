//! Generic labeled tree (C1), used for both Src and Dst ASTs.
//!
//! Nodes live in an arena (`Tree`) and are addressed by `NodeId`, the same
//! index-handle idiom the teacher uses for `NamespaceId`/`StringId`/`HeapId`:
//! a `Copy` newtype over `u32` rather than a pointer or `Rc`. This keeps the
//! optimization passes (§4.3), which mutate nodes in place and must keep
//! parent back-links correct, free of borrow-checker fights with shared
//! mutable references.
//!
//! Invariants (checked with `debug_assert!`, never on user input — these are
//! our own bugs if violated, not malformed Src):
//! - A node with children has no `value`; a node with a `value` has no children.
//! - `tree.parent(child) == Some(p)` iff `p`'s children contain `child`.

use serde::{Deserialize, Serialize};

use crate::ops::{BinaryOp, Sort, SrcBinary, SrcUnary, UnaryOp};

/// Handle into a `Tree`'s arena. Valid only for the `Tree` that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        Self(index.try_into().expect("tree arena overflowed u32"))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The tag distinguishing what a node represents. Shared by Src and Dst
/// trees; a given `Tree` only ever mixes kinds from one side in practice; a single enum keeps the
/// arena and mutation code generic over both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    // --- Dst program structure ---
    Program,
    Line,
    Assignment,
    /// Leaf: `value` holds the identifier.
    Variable,
    /// Leaf: `value` holds the decimal literal text.
    Number,
    Unary(UnaryOp),
    Binary(BinaryOp),

    // --- Src program structure ---
    /// Children are top-level statements.
    SrcProgram,
    /// `let <sort> name = expr`. Children: `[Ident(name), expr]`.
    Let(Sort),
    /// `define name(params) -> sort = expr`. Children: `[Ident(name),
    /// Param(sort)*, expr]`; the return sort is carried on the `Kind` itself
    /// rather than `value`, keeping the value/children invariant intact.
    Define(Sort),
    /// Children: `[Ident(alias), Ident(target)]`.
    Import,
    /// Children: one `Import` per entry.
    ImportGroup,
    /// Children: `[Ident(alias), Ident(target)]`.
    Export,
    /// Leaf: `value` holds the library name.
    Using,
    /// Leaf: `value` holds the comment text (never consumed by expansion).
    Comment,

    // --- Src expressions ---
    /// Leaf: `value` holds a raw name used in a statement slot (binder,
    /// macro name, import/export alias or target) rather than an
    /// expression-position reference.
    Ident,
    /// Macro parameter declaration. Leaf: `value` holds the parameter name.
    Param(Sort),
    /// Leaf: `value` holds the numeric literal text.
    NumberLit,
    /// Leaf: `value` holds the bound identifier (expression position).
    VarRef,
    /// Leaf: `value` holds the import alias (expression position).
    ExternalRef,
    /// Children: `[Ident(name), arg*]`.
    MacroCall,
    /// Children are scalar sub-expressions.
    VectorLit,
    /// Children are vector sub-expressions.
    MatrixLit,
    Map(SrcUnary),
    PreMap(SrcBinary),
    PostMap(SrcBinary),
    Apply(SrcBinary),
    Concat,
    Reverse,
    Dot,
    Len,
    Reduce(SrcBinary),
    Elem,
    Transpose,
    MatMul,
    Row,
    Col,
    Rows,
    Cols,
    SrcUnaryExpr(SrcUnary),
    SrcBinaryExpr(SrcBinary),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeData {
    kind: Kind,
    value: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Arena owning every node of one Src or Dst tree.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Creates a parentless leaf node (no children, carries `value`).
    pub fn leaf(&mut self, kind: Kind, value: impl Into<String>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            value: Some(value.into()),
            children: Vec::new(),
            parent: None,
        });
        id
    }

    /// Creates a parentless branch node and reparents each child to it.
    pub fn branch(&mut self, kind: Kind, children: Vec<NodeId>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        for &child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(NodeData {
            kind,
            value: None,
            children,
            parent: None,
        });
        id
    }

    pub fn kind(&self, id: NodeId) -> Kind {
        self.nodes[id.index()].kind
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.index()].value.as_deref()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn child(&self, id: NodeId, index: usize) -> NodeId {
        self.nodes[id.index()].children[index]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Rewrites a node's kind/value/children in place, keeping its `NodeId`
    /// (and therefore its parent's reference to it) stable. This is the
    /// primitive the reduce pass (§4.3.2) uses to apply a simplification
    /// without having to locate and patch the parent's child slot.
    pub fn replace_in_place(&mut self, id: NodeId, kind: Kind, value: Option<String>, children: Vec<NodeId>) {
        debug_assert!(
            value.is_none() || children.is_empty(),
            "a node cannot carry both a value and children"
        );
        for &child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        let node = &mut self.nodes[id.index()];
        node.kind = kind;
        node.value = value;
        node.children = children;
    }

    /// Replaces one child slot of `parent` and reparents the new child.
    /// The old child is left in the arena, unreferenced (dead-code
    /// elimination relies on reachability from roots, not arena compaction).
    pub fn set_child(&mut self, parent: NodeId, index: usize, new_child: NodeId) {
        self.nodes[new_child.index()].parent = Some(parent);
        self.nodes[parent.index()].children[index] = new_child;
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Removes the child at `index` from `parent`'s child list. Used by the
    /// dead-code pass to drop a dead assignment from its `Line`.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) {
        let child = self.nodes[parent.index()].children.remove(index);
        self.nodes[child.index()].parent = None;
    }

    /// Deep-clones the subtree rooted at `id` within this same tree,
    /// returning the new, fully detached root. Used where borrowing `self`
    /// as both source and destination rules out `clone_into`.
    pub fn duplicate(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.index()].clone();
        let new_children: Vec<NodeId> = data.children.iter().map(|&c| self.duplicate(c)).collect();
        if new_children.is_empty() {
            match data.value {
                Some(v) => self.leaf(data.kind, v),
                None => self.branch(data.kind, Vec::new()),
            }
        } else {
            self.branch(data.kind, new_children)
        }
    }

    /// Deep-clones the subtree rooted at `id` (from `self` or another tree)
    /// into `self`, returning the new, fully detached root (no parent).
    pub fn clone_into(&mut self, src: &Tree, id: NodeId) -> NodeId {
        let data = &src.nodes[id.index()];
        let new_children: Vec<NodeId> = data.children.iter().map(|&c| self.clone_into(src, c)).collect();
        if new_children.is_empty() {
            match &data.value {
                Some(v) => self.leaf(data.kind, v.clone()),
                None => self.branch(data.kind, Vec::new()),
            }
        } else {
            self.branch(data.kind, new_children)
        }
    }

    /// Every node id in the arena, in allocation order, regardless of
    /// reachability from any one root. The alias resolver (C9) needs this:
    /// it rewrites `variable` leaves across the whole Dst program, not a
    /// single rooted subtree.
    pub fn all_ids(&self) -> Vec<NodeId> {
        (0..self.nodes.len()).map(NodeId::new).collect()
    }

    /// Pre-order traversal starting at (and including) `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_sets_parent_links() {
        let mut t = Tree::new();
        let a = t.leaf(Kind::Number, "1");
        let b = t.leaf(Kind::Number, "2");
        let add = t.branch(Kind::Binary(BinaryOp::Add), vec![a, b]);
        assert_eq!(t.parent(a), Some(add));
        assert_eq!(t.parent(b), Some(add));
        assert_eq!(t.parent(add), None);
    }

    #[test]
    fn replace_in_place_keeps_id_stable() {
        let mut t = Tree::new();
        let a = t.leaf(Kind::Number, "1");
        let b = t.leaf(Kind::Number, "2");
        let add = t.branch(Kind::Binary(BinaryOp::Add), vec![a, b]);
        let root = t.branch(Kind::Line, vec![add]);
        t.replace_in_place(add, Kind::Number, Some("3".to_owned()), Vec::new());
        assert_eq!(t.child(root, 0), add);
        assert_eq!(t.value(add), Some("3"));
        assert!(t.children(add).is_empty());
    }

    #[test]
    fn clone_into_detaches_subtree() {
        let mut src = Tree::new();
        let a = src.leaf(Kind::Variable, "x");
        let b = src.leaf(Kind::Number, "2");
        let mul = src.branch(Kind::Binary(BinaryOp::Mul), vec![a, b]);

        let mut dst = Tree::new();
        let cloned = dst.clone_into(&src, mul);
        assert_eq!(dst.parent(cloned), None);
        assert_eq!(dst.children(cloned).len(), 2);
        assert_eq!(dst.value(dst.child(cloned, 0)), Some("x"));
    }
}
