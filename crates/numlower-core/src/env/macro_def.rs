//! Macro (C5): a captured parameter list, return sort, and body tree,
//! substitutable by textual tree substitution (§4.4, §9 Open Question 3).

use crate::{
    diagnostics::{CompileError, Context},
    ops::Sort,
    tree::{Kind, NodeId, Tree},
};

#[derive(Debug, Clone)]
pub struct Macro {
    pub name: String,
    pub params: Vec<(String, Sort)>,
    pub return_sort: Sort,
    tree: Tree,
    body: NodeId,
}

impl Macro {
    /// Builds a macro from a body subtree found in `src`, enforcing the
    /// construction invariants from §3: unique parameter names, every free
    /// variable in the body named as a parameter, and no self-call.
    pub fn new(
        name: String,
        params: Vec<(String, Sort)>,
        return_sort: Sort,
        src: &Tree,
        body_in_src: NodeId,
        context: &Context,
    ) -> Result<Self, CompileError> {
        let mut seen = std::collections::HashSet::new();
        for (param, _) in &params {
            if !seen.insert(param.clone()) {
                return Err(CompileError::redefinition(format!("macro parameter `{param}`"), context));
            }
        }

        let mut tree = Tree::new();
        let body = tree.clone_into(src, body_in_src);

        for node in tree.descendants(body) {
            match tree.kind(node) {
                Kind::VarRef => {
                    let name_ref = tree.value(node).expect("VarRef always carries a value");
                    if !params.iter().any(|(p, _)| p == name_ref) {
                        return Err(CompileError::resolution(
                            format!("free variable `{name_ref}` in macro body (not a parameter)"),
                            context,
                        ));
                    }
                }
                Kind::MacroCall => {
                    let callee = tree.value(tree.child(node, 0)).expect("MacroCall's first child is its Ident name");
                    if callee == name {
                        return Err(CompileError::semantic(
                            format!("macro `{name}` calls itself (recursion is disallowed)"),
                            context,
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            name,
            params,
            return_sort,
            tree,
            body,
        })
    }

    /// Clones this macro's body into `caller`, substituting each parameter
    /// leaf with the corresponding `args[i]` subtree (already present in
    /// `caller`), per the call-by-name rule of §4.4/§9.
    pub fn substitute(&self, caller: &mut Tree, args: &[NodeId]) -> NodeId {
        debug_assert_eq!(args.len(), self.params.len());
        substitute_node(caller, &self.tree, self.body, &self.params, args)
    }
}

fn substitute_node(caller: &mut Tree, macro_tree: &Tree, node: NodeId, params: &[(String, Sort)], args: &[NodeId]) -> NodeId {
    if macro_tree.kind(node) == Kind::VarRef {
        let name = macro_tree.value(node).expect("VarRef always carries a value");
        if let Some(pos) = params.iter().position(|(p, _)| p == name) {
            return caller.duplicate(args[pos]);
        }
        return caller.leaf(Kind::VarRef, name.to_owned());
    }
    if let Some(value) = macro_tree.value(node) {
        return caller.leaf(macro_tree.kind(node), value.to_owned());
    }
    let children: Vec<NodeId> = macro_tree
        .children(node)
        .iter()
        .map(|&c| substitute_node(caller, macro_tree, c, params, args))
        .collect();
    caller.branch(macro_tree.kind(node), children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{BinaryOp, SrcBinary};

    #[test]
    fn rejects_free_variables() {
        let mut src = Tree::new();
        let free = src.leaf(Kind::VarRef, "y");
        let result = Macro::new(
            "dbl".to_owned(),
            vec![("n".to_owned(), Sort::Scalar)],
            Sort::Scalar,
            &src,
            free,
            &Context::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_self_call() {
        let mut src = Tree::new();
        let name = src.leaf(Kind::Ident, "dbl");
        let arg = src.leaf(Kind::VarRef, "n");
        let call = src.branch(Kind::MacroCall, vec![name, arg]);
        let result = Macro::new(
            "dbl".to_owned(),
            vec![("n".to_owned(), Sort::Scalar)],
            Sort::Scalar,
            &src,
            call,
            &Context::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn substitutes_parameter_with_argument() {
        let mut src = Tree::new();
        let param_ref = src.leaf(Kind::VarRef, "n");
        let two = src.leaf(Kind::NumberLit, "2");
        let body = src.branch(Kind::SrcBinaryExpr(SrcBinary::Base(BinaryOp::Mul)), vec![param_ref, two]);
        let m = Macro::new("dbl".to_owned(), vec![("n".to_owned(), Sort::Scalar)], Sort::Scalar, &src, body, &Context::new()).unwrap();

        let mut caller = Tree::new();
        let arg = caller.leaf(Kind::NumberLit, "3");
        let expanded = m.substitute(&mut caller, &[arg]);
        assert_eq!(caller.kind(expanded), Kind::SrcBinaryExpr(SrcBinary::Base(BinaryOp::Mul)));
        assert_eq!(caller.value(caller.child(expanded, 0)), Some("3"));
    }
}
