//! Dst output writers (§6.2): precedence-aware surface text, and an
//! indented s-expression dump for `--ast`. The JSON `--cylon` writer lives
//! in `json.rs`.

use tracing::warn;

use crate::tree::{Kind, NodeId, Tree};

const LINE_LIMIT: usize = 70;

/// Renders the whole Dst `program` as surface text, one or more physical
/// lines per Dst `Line` node (§6.2's greedy packing with a soft 70-character
/// limit; an over-long single assignment is warned about and kept alone).
pub fn format_program(dst: &Tree, program: NodeId) -> String {
    let mut out = String::new();
    for &line in dst.children(program) {
        let assignments: Vec<String> = dst.children(line).iter().map(|&a| format_assignment(dst, a)).collect();
        out.push_str(&pack_line(&assignments));
        out.push('\n');
    }
    out
}

fn format_assignment(dst: &Tree, assignment: NodeId) -> String {
    let children = dst.children(assignment);
    let (lhs, rhs) = (children[0], children[1]);
    let name = dst.value(lhs).expect("assignment LHS is always a Variable leaf");
    format!("{name}={}", render_expr(dst, rhs, 0))
}

fn pack_line(assignments: &[String]) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();
    for a in assignments {
        if a.len() > LINE_LIMIT {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            warn!(length = a.len(), limit = LINE_LIMIT, "assignment exceeds soft line-length limit");
            lines.push(a.clone());
            continue;
        }
        let candidate_len = if current.is_empty() { a.len() } else { current.len() + 1 + a.len() };
        if candidate_len > LINE_LIMIT && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(a);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Renders one expression subtree at precedence `min_prec`, parenthesizing
/// only where the precedence table (§6.2) requires it for left-associative
/// operators: `a - b - c` needs no parens, `a - (b - c)` does.
fn render_expr(dst: &Tree, node: NodeId, min_prec: u8) -> String {
    match dst.kind(node) {
        Kind::Number | Kind::Variable => dst.value(node).expect("leaf always carries a value").to_owned(),
        Kind::Unary(op) => {
            use crate::ops::UnaryOp;
            if op == UnaryOp::Neg {
                let inner = render_expr(dst, dst.child(node, 0), op.precedence());
                parenthesize_if(format!("-{inner}"), op.precedence(), min_prec)
            } else {
                format!("{}({})", op.name(), render_expr(dst, dst.child(node, 0), 0))
            }
        }
        Kind::Binary(op) => {
            let prec = op.precedence();
            let left = render_expr(dst, dst.child(node, 0), prec);
            let right = render_expr(dst, dst.child(node, 1), prec + 1);
            let joined = if op.is_boolean() {
                format!("{left} {} {right}", op.infix())
            } else {
                format!("{left}{}{right}", op.infix())
            };
            parenthesize_if(joined, prec, min_prec)
        }
        other => unreachable!("Dst expressions never contain {other:?}"),
    }
}

fn parenthesize_if(s: String, prec: u8, min_prec: u8) -> String {
    if prec < min_prec {
        format!("({s})")
    } else {
        s
    }
}

/// Indented s-expression dump of the Dst tree, for `--ast`.
pub fn format_ast(dst: &Tree, root: NodeId) -> String {
    let mut out = String::new();
    write_ast_node(dst, root, 0, &mut out);
    out
}

fn write_ast_node(dst: &Tree, node: NodeId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    if let Some(value) = dst.value(node) {
        out.push_str(&format!("{indent}({:?} {value:?})\n", dst.kind(node)));
        return;
    }
    out.push_str(&format!("{indent}({:?}\n", dst.kind(node)));
    for &child in dst.children(node) {
        write_ast_node(dst, child, depth + 1, out);
    }
    out.push_str(&format!("{indent})\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decimal::Decimal, ops::SrcBinary, value::Num};

    fn single_assignment(num: Num, ident: &str) -> (Tree, NodeId) {
        let mut dst = Tree::new();
        let (assignment, _) = num.assign(&mut dst, ident);
        let line = dst.branch(Kind::Line, vec![assignment]);
        let program = dst.branch(Kind::Program, vec![line]);
        (dst, program)
    }

    #[test]
    fn renders_left_associative_subtraction_without_parens() {
        let expr = Num::literal(Decimal::from_i64(1))
            .binary(SrcBinary::Base(crate::ops::BinaryOp::Sub), Num::literal(Decimal::from_i64(2)))
            .binary(SrcBinary::Base(crate::ops::BinaryOp::Sub), Num::literal(Decimal::from_i64(3)));
        let (dst, program) = single_assignment(expr, "a");
        assert_eq!(format_program(&dst, program).trim(), "a=1-2-3");
    }

    #[test]
    fn wraps_right_operand_of_same_precedence_subtraction() {
        // `Num::binary` always left-folds, so `1-(2-3)` is built directly on
        // the tree rather than through `Num`.
        let mut dst = Tree::new();
        let one = dst.leaf(Kind::Number, "1");
        let two = dst.leaf(Kind::Number, "2");
        let three = dst.leaf(Kind::Number, "3");
        let inner = dst.branch(Kind::Binary(crate::ops::BinaryOp::Sub), vec![two, three]);
        let outer = dst.branch(Kind::Binary(crate::ops::BinaryOp::Sub), vec![one, inner]);
        let lhs = dst.leaf(Kind::Variable, "a");
        let assignment = dst.branch(Kind::Assignment, vec![lhs, outer]);
        let line = dst.branch(Kind::Line, vec![assignment]);
        let program = dst.branch(Kind::Program, vec![line]);
        assert_eq!(format_program(&dst, program).trim(), "a=1-(2-3)");
    }

    #[test]
    fn unary_function_form_wraps_operand_in_call_parens() {
        let n = Num::variable("x").unary(crate::ops::SrcUnary::Base(crate::ops::UnaryOp::Sin));
        let (dst, program) = single_assignment(n, "a");
        assert_eq!(format_program(&dst, program).trim(), "a=sin(x)");
    }

    #[test]
    fn packs_short_assignments_onto_one_line() {
        let mut dst = Tree::new();
        let (a1, _) = Num::literal(Decimal::from_i64(1)).assign(&mut dst, "a");
        let (a2, _) = Num::literal(Decimal::from_i64(2)).assign(&mut dst, "b");
        let line = dst.branch(Kind::Line, vec![a1, a2]);
        let program = dst.branch(Kind::Program, vec![line]);
        assert_eq!(format_program(&dst, program).trim(), "a=1 b=2");
    }
}
