// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Scalar expressions used by filters, maps, windows and projections.

use crate::datasource::BasicType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops;

/// A constant value.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub enum Literal {
    /// Signed integer.
    Int(i64),
    /// Double precision float.
    Float(f64),
    /// Boolean.
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            // `{:?}` keeps the fractional part of whole numbers (20.0).
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Binary operators.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        f.write_str(op)
    }
}

/// An expression tree.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum Expr {
    /// A field of the input record, optionally annotated with its type.
    Attribute {
        /// Field name.
        name:      String,
        /// Type hint passed to the coordinator.
        data_type: Option<BasicType>,
    },
    /// A constant.
    Literal(Literal),
    /// `left op right`.
    Binary {
        /// Left operand.
        left:  Box<Expr>,
        /// Operator.
        op:    BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// A built-in function of the coordinator, e.g. a spatio-temporal predicate.
    Call {
        /// Function name.
        func: String,
        /// Arguments in call order.
        args: Vec<Expr>,
    },
}

/// Refers to a field of the input record.
pub fn attr(name: impl Into<String>) -> Expr {
    Expr::Attribute {
        name:      name.into(),
        data_type: None,
    }
}

/// Refers to a field of the input record with an explicit type.
pub fn typed_attr(name: impl Into<String>, data_type: BasicType) -> Expr {
    Expr::Attribute {
        name:      name.into(),
        data_type: Some(data_type),
    }
}

/// A literal expression.
pub fn lit(value: impl Into<Literal>) -> Expr {
    Expr::Literal(value.into())
}

/// Calls a coordinator built-in function.
pub fn call(func: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::Call {
        func: func.into(),
        args,
    }
}

impl Expr {
    fn binary(self, op: BinaryOp, right: impl Into<Expr>) -> Expr {
        Expr::Binary {
            left:  Box::new(self),
            op,
            right: Box::new(right.into()),
        }
    }

    /// `self == other`
    pub fn eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Eq, other)
    }

    /// `self != other`
    pub fn not_eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::NotEq, other)
    }

    /// `self > other`
    pub fn gt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Gt, other)
    }

    /// `self >= other`
    pub fn gt_eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::GtEq, other)
    }

    /// `self < other`
    pub fn lt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Lt, other)
    }

    /// `self <= other`
    pub fn lt_eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::LtEq, other)
    }

    /// `self && other`
    pub fn and(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::And, other)
    }

    /// `self || other`
    pub fn or(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Or, other)
    }

    /// Returns the field name if this is an attribute reference.
    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Expr::Attribute { name, .. } => Some(name),
            _ => None,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary { .. } => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Attribute {
                name,
                data_type: None,
            } => write!(f, "Attribute(\"{}\")", name),
            Expr::Attribute {
                name,
                data_type: Some(t),
            } => write!(f, "Attribute(\"{}\", {})", name, t),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Binary { left, op, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op)?;
                right.fmt_operand(f)
            }
            Expr::Call { func, args } => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(v as i64)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        lit(v)
    }
}

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        lit(v)
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        lit(v)
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        lit(v)
    }
}

macro_rules! arithmetic {
    ($tr:ident, $method:ident, $op:expr) => {
        impl<T: Into<Expr>> ops::$tr<T> for Expr {
            type Output = Expr;

            fn $method(self, rhs: T) -> Expr {
                self.binary($op, rhs)
            }
        }
    };
}

arithmetic!(Add, add, BinaryOp::Add);
arithmetic!(Sub, sub, BinaryOp::Sub);
arithmetic!(Mul, mul, BinaryOp::Mul);
arithmetic!(Div, div, BinaryOp::Div);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_rendering() {
        assert_eq!("Attribute(\"speed\")", attr("speed").to_string());
        assert_eq!(
            "Attribute(\"longitude\", BasicType::FLOAT64)",
            typed_attr("longitude", BasicType::Float64).to_string()
        );
        assert_eq!(Some("speed"), attr("speed").attribute_name());
        assert_eq!(None, lit(1).attribute_name());
    }

    #[test]
    fn literals_keep_their_kind() {
        assert_eq!("100", lit(100).to_string());
        assert_eq!("-1", lit(-1).to_string());
        assert_eq!("20.0", lit(20.0).to_string());
        assert_eq!("3.15", lit(3.15).to_string());
        assert_eq!("true", lit(true).to_string());
    }

    #[test]
    fn nested_operands_are_parenthesised() {
        let e = attr("Code1").not_eq(0).or(attr("Code2").not_eq(0));
        assert_eq!(
            "(Attribute(\"Code1\") != 0) || (Attribute(\"Code2\") != 0)",
            e.to_string()
        );

        let avg = (attr("T1_bar") + attr("T2_bar")) / 2.0;
        assert_eq!(
            "(Attribute(\"T1_bar\") + Attribute(\"T2_bar\")) / 2.0",
            avg.to_string()
        );
    }

    #[test]
    fn function_calls() {
        let e = call(
            "teintersects",
            vec![attr("longitude"), attr("latitude"), attr("timestamp")],
        )
        .eq(1);
        assert_eq!(
            "teintersects(Attribute(\"longitude\"), Attribute(\"latitude\"), \
             Attribute(\"timestamp\")) == 1",
            e.to_string()
        );
    }
}
