//! Expression AST types.

use super::{DataType, GeometryFunction, Query};

/// An identifier, remembering whether it was written double-quoted.
///
/// Regular identifiers keep their source spelling; delimited ones keep their
/// contents with `""` already collapsed to `"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ident {
    pub value: String,
    pub quoted: bool,
}

impl Ident {
    /// Creates a regular identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }

    /// Creates a delimited identifier.
    #[must_use]
    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }

    /// Compares names the way ADQL resolves them: regular identifiers are
    /// case-insensitive, delimited ones are exact.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        if self.quoted || other.quoted {
            self.value == other.value
        } else {
            self.value.eq_ignore_ascii_case(&other.value)
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Literal {
    /// Integer literal (decimal or hexadecimal source).
    Integer(i64),
    /// Real literal.
    Real(f64),
    /// String literal, unescaped.
    String(String),
    /// Boolean literal.
    Boolean(bool),
    /// NULL literal.
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinaryOp {
    // Logical
    Or,
    And,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // String
    Concat,

    // Bitwise
    BitOr,
    BitXor,
    BitAnd,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// The sub-language an operator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    Boolean,
    Comparison,
    Concatenation,
    Bitwise,
    Arithmetic,
}

impl BinaryOp {
    /// Returns the ADQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Or => "OR",
            Self::And => "AND",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Concat => "||",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }

    #[must_use]
    pub const fn family(&self) -> OperatorFamily {
        match self {
            Self::Or | Self::And => OperatorFamily::Boolean,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => {
                OperatorFamily::Comparison
            }
            Self::Concat => OperatorFamily::Concatenation,
            Self::BitOr | Self::BitXor | Self::BitAnd => OperatorFamily::Bitwise,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod => {
                OperatorFamily::Arithmetic
            }
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UnaryOp {
    /// Logical NOT
    Not,
    /// Negation (-)
    Neg,
    /// Identity (+)
    Plus,
    /// Bitwise NOT (~)
    BitNot,
}

impl UnaryOp {
    /// Returns the ADQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "NOT",
            Self::Neg => "-",
            Self::Plus => "+",
            Self::BitNot => "~",
        }
    }
}

/// A column reference, optionally qualified (`schema.table.column`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ColumnRef {
    /// Qualifying names, outermost first. Empty when unqualified.
    pub qualifier: Vec<Ident>,
    pub name: Ident,
}

/// A call to a non-geometric function.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionCall {
    /// The function name. Aggregates use their upper-case keyword spelling.
    pub name: Ident,
    /// The arguments. `COUNT(*)` holds a single [`Expr::Wildcard`].
    pub args: Vec<Expr>,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
}

/// A call to one of the geometry functions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeometryCall {
    pub function: GeometryFunction,
    pub args: Vec<Expr>,
}

/// An ADQL expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A column reference.
    Column(ColumnRef),

    /// `*` or `t.*`, in a select list or `COUNT(*)`.
    Wildcard {
        /// Table qualifier, empty for a bare `*`.
        qualifier: Vec<Ident>,
    },

    /// A binary expression.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// A unary expression.
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// A function call.
    Function(FunctionCall),

    /// A geometry constructor or geometric predicate.
    Geometry(GeometryCall),

    /// IS [NOT] NULL.
    IsNull { expr: Box<Expr>, negated: bool },

    /// [NOT] BETWEEN low AND high.
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// [NOT] IN (list).
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// [NOT] IN (subquery).
    InSubquery {
        expr: Box<Expr>,
        query: Box<Query>,
        negated: bool,
    },

    /// [NOT] LIKE / ILIKE.
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        escape: Option<Box<Expr>>,
        negated: bool,
        case_insensitive: bool,
    },

    /// EXISTS (subquery).
    Exists(Box<Query>),

    /// A scalar subquery.
    Subquery(Box<Query>),

    /// CASE expression.
    Case {
        /// The operand of a simple CASE.
        operand: Option<Box<Expr>>,
        /// WHEN/THEN clauses.
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },

    /// CAST (expr AS type).
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
    },

    /// Parenthesized expression.
    Paren(Box<Expr>),
}

impl Expr {
    /// Creates an unqualified column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(ColumnRef {
            qualifier: Vec::new(),
            name: Ident::new(name),
        })
    }

    /// Creates a column reference qualified by a table name.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column(ColumnRef {
            qualifier: vec![Ident::new(table)],
            name: Ident::new(name),
        })
    }

    /// Creates an integer literal.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// Creates a real literal.
    #[must_use]
    pub const fn real(value: f64) -> Self {
        Self::Literal(Literal::Real(value))
    }

    /// Creates a string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Creates a binary expression.
    #[must_use]
    pub fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// Creates a unary expression.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: Self) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Creates a parenthesized expression.
    #[must_use]
    pub fn paren(self) -> Self {
        Self::Paren(Box::new(self))
    }

    /// Creates a geometry call.
    #[must_use]
    pub fn geometry(function: GeometryFunction, args: Vec<Self>) -> Self {
        Self::Geometry(GeometryCall { function, args })
    }

    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.binary(BinaryOp::Eq, right)
    }

    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.binary(BinaryOp::Lt, right)
    }

    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.binary(BinaryOp::Gt, right)
    }

    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    #[must_use]
    pub fn add(self, right: Self) -> Self {
        self.binary(BinaryOp::Add, right)
    }

    #[must_use]
    pub fn sub(self, right: Self) -> Self {
        self.binary(BinaryOp::Sub, right)
    }

    #[must_use]
    pub fn mul(self, right: Self) -> Self {
        self.binary(BinaryOp::Mul, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_matching() {
        assert!(Ident::new("RA").matches(&Ident::new("ra")));
        assert!(!Ident::quoted("RA").matches(&Ident::new("ra")));
        assert!(Ident::quoted("ra").matches(&Ident::new("ra")));
    }

    #[test]
    fn test_operator_families() {
        assert_eq!(BinaryOp::And.family(), OperatorFamily::Boolean);
        assert_eq!(BinaryOp::GtEq.family(), OperatorFamily::Comparison);
        assert_eq!(BinaryOp::Concat.family(), OperatorFamily::Concatenation);
        assert_eq!(BinaryOp::BitXor.family(), OperatorFamily::Bitwise);
        assert_eq!(BinaryOp::Mod.family(), OperatorFamily::Arithmetic);
    }

    #[test]
    fn test_expr_chaining() {
        let expr = Expr::column("mag")
            .gt(Expr::integer(18))
            .and(Expr::column("flag").eq(Expr::string("ok")));

        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }
}
