//! Operators and the functions that implement them.
//!
//! The binder never hard-codes operator semantics: an operator expression is an
//! invocation of a named function on the left operand.

use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
}

impl BinaryOp {
    /// Name of the operator function invoked on the left operand.
    pub fn function_name(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "opPlus",
            Sub => "opMinus",
            Mul => "opTimes",
            Div => "opDivide",
            Equal | NotEqual => "opEquals",
            Less | LessEqual | Greater | GreaterEqual => "opCompare",
        }
    }

    /// Whether the expression evaluates to `Boolean` regardless of the operator
    /// function's own return type.
    pub fn yields_boolean(self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual
        )
    }

    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
}

impl UnaryOp {
    /// Name of the parameterless operator function invoked on the operand.
    pub fn function_name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "unaryMinus",
            UnaryOp::Not => "unaryNot",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
