//! Operator and sort vocabularies shared by the Src and Dst tree kinds.
//!
//! Kept as closed enums rather than strings per the "variants instead of
//! sort-tag strings" design note: matching on `Sort::Vector` is a compiler
//! error if a case is missed, matching on `"vector"` is not.

use serde::{Deserialize, Serialize};

/// The three top-level value kinds a Src expression can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sort {
    Scalar,
    Vector,
    Matrix,
}

impl Sort {
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "number",
            Self::Vector => "vector",
            Self::Matrix => "matrix",
        }
    }
}

/// Dst unary operators (§6.3). This is also the set of base unary operators
/// a Src unary expression may ultimately queue onto a `Num`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Abs,
    Sqrt,
    Sin,
    Cos,
    Tan,
    ArcSin,
    ArcCos,
    ArcTan,
    Not,
}

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::ArcSin => "arcsin",
            Self::ArcCos => "arccos",
            Self::ArcTan => "arctan",
            Self::Not => "not",
        }
    }

    /// Precedence for the text formatter (§6.2): all unary function forms
    /// share one precedence tier below `neg`'s prefix-minus spelling.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Neg => 100,
            _ => 90,
        }
    }
}

/// Dst binary operators (§6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Exp => "exp",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// Infix spelling used by the Dst text formatter (§6.2).
    pub fn infix(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Exp => "^",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// Precedence table from §6.2: `^` 80 > `* / %` 70 > `+ -` 60 >
    /// comparisons 50 > `== !=` 40 > `or` 30 > `and` 20. All left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Exp => 80,
            Self::Mul | Self::Div | Self::Mod => 70,
            Self::Add | Self::Sub => 60,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => 50,
            Self::Eq | Self::Ne => 40,
            Self::Or => 30,
            Self::And => 20,
        }
    }

    /// True for the operators the decimal evaluator (§4.3.1) treats as
    /// Boolean: any nonzero operand is true, zero is false.
    pub fn is_boolean(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Lt | Self::Le | Self::Gt | Self::Ge | Self::Eq | Self::Ne
        )
    }
}

/// Surface-level unary operator names (§4.1). Some are base Dst operators;
/// the rest are macro-expanded at `Num::unary` time rather than queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SrcUnary {
    Base(UnaryOp),
    Ln,
    Csc,
    Sec,
    Cot,
    ArcCsc,
    ArcSec,
    ArcCot,
}

impl SrcUnary {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "neg" => Self::Base(UnaryOp::Neg),
            "abs" => Self::Base(UnaryOp::Abs),
            "sqrt" => Self::Base(UnaryOp::Sqrt),
            "sin" => Self::Base(UnaryOp::Sin),
            "cos" => Self::Base(UnaryOp::Cos),
            "tan" => Self::Base(UnaryOp::Tan),
            "arcsin" => Self::Base(UnaryOp::ArcSin),
            "arccos" => Self::Base(UnaryOp::ArcCos),
            "arctan" => Self::Base(UnaryOp::ArcTan),
            "not" => Self::Base(UnaryOp::Not),
            "ln" => Self::Ln,
            "csc" => Self::Csc,
            "sec" => Self::Sec,
            "cot" => Self::Cot,
            "arccsc" => Self::ArcCsc,
            "arcsec" => Self::ArcSec,
            "arccot" => Self::ArcCot,
            _ => return None,
        })
    }
}

/// Surface-level binary operator names (§4.1): the base Dst set plus
/// `nand`/`nor`/`xor`, which rewrite to base Boolean ops at `Num::binary` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SrcBinary {
    Base(BinaryOp),
    Nand,
    Nor,
    Xor,
}

impl SrcBinary {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "add" => Self::Base(BinaryOp::Add),
            "sub" => Self::Base(BinaryOp::Sub),
            "mul" => Self::Base(BinaryOp::Mul),
            "div" => Self::Base(BinaryOp::Div),
            "mod" => Self::Base(BinaryOp::Mod),
            "exp" => Self::Base(BinaryOp::Exp),
            "lt" => Self::Base(BinaryOp::Lt),
            "le" => Self::Base(BinaryOp::Le),
            "gt" => Self::Base(BinaryOp::Gt),
            "ge" => Self::Base(BinaryOp::Ge),
            "eq" => Self::Base(BinaryOp::Eq),
            "ne" => Self::Base(BinaryOp::Ne),
            "and" => Self::Base(BinaryOp::And),
            "or" => Self::Base(BinaryOp::Or),
            "nand" => Self::Nand,
            "nor" => Self::Nor,
            "xor" => Self::Xor,
            _ => return None,
        })
    }
}
