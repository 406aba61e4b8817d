//! `--cylon` JSON AST writer (§6.4): a serde-derived mirror of the schema
//! `{version, program: {type:"program", lines:[...]}}` with tagged
//! `expression::*` node kinds.

use serde::Serialize;

use crate::tree::{Kind, NodeId, Tree};

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct CylonDocument {
    pub version: u32,
    pub program: CylonProgram,
}

#[derive(Debug, Serialize)]
pub struct CylonProgram {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub lines: Vec<CylonLine>,
}

#[derive(Debug, Serialize)]
pub struct CylonLine {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub code: Vec<CylonStatement>,
}

#[derive(Debug, Serialize)]
pub struct CylonStatement {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub identifier: String,
    pub operator: &'static str,
    pub value: CylonExpr,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum CylonExpr {
    #[serde(rename = "expression::identifier")]
    Identifier { name: String },
    #[serde(rename = "expression::number")]
    Number { value: String },
    #[serde(rename = "expression::unary_op")]
    UnaryOp { operator: String, operand: Box<CylonExpr> },
    #[serde(rename = "expression::binary_op")]
    BinaryOp {
        operator: String,
        left: Box<CylonExpr>,
        right: Box<CylonExpr>,
    },
}

/// Builds the `--cylon` document for the Dst `program`.
pub fn to_cylon(dst: &Tree, program: NodeId) -> CylonDocument {
    let lines = dst
        .children(program)
        .iter()
        .map(|&line| CylonLine {
            kind: "line",
            code: dst.children(line).iter().map(|&a| build_statement(dst, a)).collect(),
        })
        .collect();

    CylonDocument {
        version: SCHEMA_VERSION,
        program: CylonProgram { kind: "program", lines },
    }
}

fn build_statement(dst: &Tree, assignment: NodeId) -> CylonStatement {
    let children = dst.children(assignment);
    let identifier = dst.value(children[0]).expect("assignment LHS is always a Variable leaf").to_owned();
    CylonStatement {
        kind: "statement::assignment",
        identifier,
        operator: "=",
        value: build_expr(dst, children[1]),
    }
}

fn build_expr(dst: &Tree, node: NodeId) -> CylonExpr {
    match dst.kind(node) {
        Kind::Variable => CylonExpr::Identifier {
            name: dst.value(node).expect("Variable always carries a value").to_owned(),
        },
        Kind::Number => CylonExpr::Number {
            value: dst.value(node).expect("Number always carries a value").to_owned(),
        },
        Kind::Unary(op) => CylonExpr::UnaryOp {
            operator: op.name().to_owned(),
            operand: Box::new(build_expr(dst, dst.child(node, 0))),
        },
        Kind::Binary(op) => CylonExpr::BinaryOp {
            operator: op.name().to_owned(),
            left: Box::new(build_expr(dst, dst.child(node, 0))),
            right: Box::new(build_expr(dst, dst.child(node, 1))),
        },
        other => unreachable!("Dst expressions never contain {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decimal::Decimal, ops::SrcBinary, value::Num};

    #[test]
    fn serializes_a_binary_assignment() {
        let mut dst = Tree::new();
        let n = Num::literal(Decimal::from_i64(1)).binary(SrcBinary::Base(crate::ops::BinaryOp::Add), Num::variable("x"));
        let (assignment, _) = n.assign(&mut dst, "a");
        let line = dst.branch(Kind::Line, vec![assignment]);
        let program = dst.branch(Kind::Program, vec![line]);

        let doc = to_cylon(&dst, program);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["program"]["lines"][0]["code"][0]["identifier"], "a");
        assert_eq!(json["program"]["lines"][0]["code"][0]["value"]["type"], "expression::binary_op");
    }
}
