//! Dead-code pass (C11, §4.3.3): drops every assignment whose identifier
//! is not transitively referenced by an exported name.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::tree::{Kind, NodeId, Tree};

/// Removes dead assignments (and the `Line`s left empty by their removal)
/// from `program`. `exported` seeds liveness and is the post-alias-resolution
/// name set (§4.5's `Resolved::exported`), since this pass always runs after
/// C9 in the pipeline.
pub fn run(dst: &mut Tree, program: NodeId, exported: &HashSet<String>) {
    let deps = dependency_graph(dst, program);
    let live = live_set(exported, &deps);

    for &line in &dst.children(program).to_vec() {
        let assignments = dst.children(line).to_vec();
        for i in (0..assignments.len()).rev() {
            let lhs = dst.children(assignments[i])[0];
            let name = dst.value(lhs).expect("assignment LHS is always a Variable leaf");
            if !live.contains(name) {
                debug!(name, "dropping dead assignment");
                dst.remove_child_at(line, i);
            }
        }
    }

    let lines = dst.children(program).to_vec();
    for i in (0..lines.len()).rev() {
        if dst.children(lines[i]).is_empty() {
            dst.remove_child_at(program, i);
        }
    }
}

fn dependency_graph(dst: &Tree, program: NodeId) -> HashMap<String, HashSet<String>> {
    let mut deps = HashMap::new();
    for &line in dst.children(program) {
        for &assignment in dst.children(line) {
            let children = dst.children(assignment);
            let (lhs, rhs) = (children[0], children[1]);
            let Some(name) = dst.value(lhs) else { continue };
            let refs = dst
                .descendants(rhs)
                .into_iter()
                .filter(|&n| dst.kind(n) == Kind::Variable)
                .filter_map(|n| dst.value(n).map(str::to_owned))
                .collect();
            deps.insert(name.to_owned(), refs);
        }
    }
    deps
}

fn live_set(exported: &HashSet<String>, deps: &HashMap<String, HashSet<String>>) -> HashSet<String> {
    let mut live: HashSet<String> = exported.clone();
    let mut frontier: Vec<String> = live.iter().cloned().collect();
    while let Some(name) = frontier.pop() {
        let Some(refs) = deps.get(&name) else { continue };
        for r in refs {
            if live.insert(r.clone()) {
                frontier.push(r.clone());
            }
        }
    }
    live
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decimal::Decimal, ops::SrcBinary, value::Num};

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
    fn drops_assignments_not_reachable_from_an_export() {
        // a = 1; b = a + 1; c = 2   -- only `a` is exported, `b`/`c` are dead
        let (mut dst, program) = build_program(vec![
            ("a", Num::literal(Decimal::from_i64(1))),
            ("b", Num::variable("a").binary(SrcBinary::Base(crate::ops::BinaryOp::Add), Num::literal(Decimal::from_i64(1)))),
            ("c", Num::literal(Decimal::from_i64(2))),
        ]);
        let exported: HashSet<String> = ["a".to_owned()].into_iter().collect();
        run(&mut dst, program, &exported);

        assert_eq!(dst.children(program).len(), 1);
        let line = dst.children(program)[0];
        let assignment = dst.children(line)[0];
        assert_eq!(dst.value(dst.children(assignment)[0]), Some("a"));
    }

    #[test]
    fn keeps_transitive_dependency_of_an_export() {
        // a = 1; b = a   -- `b` exported keeps `a` alive
        let (mut dst, program) = build_program(vec![("a", Num::literal(Decimal::from_i64(1))), ("b", Num::variable("a"))]);
        let exported: HashSet<String> = ["b".to_owned()].into_iter().collect();
        run(&mut dst, program, &exported);
        assert_eq!(dst.children(program).len(), 2);
    }
}
