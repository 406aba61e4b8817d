//! Mangle pass (C12, §4.3.4): renames every non-reserved identifier to a
//! short, deterministic fresh name (`a`, `b`, ..., `z`, `aa`, ...).

use std::collections::HashMap;
use std::collections::HashSet;

use crate::tree::{Kind, NodeId, Tree};

/// Bijective base-26 identifier generator: `a, b, ..., z, aa, ab, ...`.
struct NameGenerator {
    counter: u64,
}

impl NameGenerator {
    fn new() -> Self {
        Self { counter: 0 }
    }

    fn next(&mut self) -> String {
        let mut n = self.counter;
        self.counter += 1;
        let mut bytes = Vec::new();
        loop {
            let rem = (n % 26) as u8;
            bytes.push(b'a' + rem);
            n /= 26;
            if n == 0 {
                break;
            }
            n -= 1;
        }
        bytes.reverse();
        String::from_utf8(bytes).expect("only ascii lowercase bytes pushed")
    }

    fn fresh(&mut self, reserved: &HashSet<String>) -> String {
        loop {
            let candidate = self.next();
            if !reserved.contains(&candidate) {
                return candidate;
            }
        }
    }
}

/// Renames every `variable` leaf in `program` not in `reserved` (the union
/// of `Resolved::imported` and `Resolved::exported`) to a fresh identifier,
/// using the same fresh name for every occurrence of a given original name.
pub fn run(dst: &mut Tree, program: NodeId, reserved: &HashSet<String>) {
    let mut generator = NameGenerator::new();
    let mut renames: HashMap<String, String> = HashMap::new();

    for node in dst.descendants(program) {
        if dst.kind(node) != Kind::Variable {
            continue;
        }
        let Some(name) = dst.value(node).map(str::to_owned) else { continue };
        if reserved.contains(&name) {
            continue;
        }
        let mangled = renames.entry(name).or_insert_with(|| generator.fresh(reserved)).clone();
        dst.replace_in_place(node, Kind::Variable, Some(mangled), Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decimal::Decimal, value::Num};

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
    fn mangles_distinct_names_deterministically() {
        let (mut dst, program) = build_program(vec![("N0", Num::literal(Decimal::from_i64(1))), ("N1", Num::variable("N0"))]);
        run(&mut dst, program, &HashSet::new());

        let first_line = dst.children(program)[0];
        let first_assignment = dst.children(first_line)[0];
        assert_eq!(dst.value(dst.children(first_assignment)[0]), Some("a"));

        let second_line = dst.children(program)[1];
        let second_assignment = dst.children(second_line)[0];
        assert_eq!(dst.value(dst.children(second_assignment)[0]), Some("b"));
        assert_eq!(dst.value(dst.children(second_assignment)[1]), Some("a"));
    }

    #[test]
    fn leaves_reserved_names_untouched() {
        let (mut dst, program) = build_program(vec![("x", Num::literal(Decimal::from_i64(1)))]);
        let reserved: HashSet<String> = ["x".to_owned()].into_iter().collect();
        run(&mut dst, program, &reserved);
        let line = dst.children(program)[0];
        let assignment = dst.children(line)[0];
        assert_eq!(dst.value(dst.children(assignment)[0]), Some("x"));
    }
}
