//! Query AST types.

use super::expression::{Expr, Ident};

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the ADQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY entry. Ordinal sort keys are integer literals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OrderBy {
    pub expr: Expr,
    pub direction: OrderDirection,
}

impl OrderBy {
    #[must_use]
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: OrderDirection::Asc,
        }
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum JoinType {
    /// INNER JOIN, also a bare JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    Left,
    /// RIGHT OUTER JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
    /// CROSS JOIN.
    Cross,
}

impl JoinType {
    /// Returns the ADQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT OUTER JOIN",
            Self::Right => "RIGHT OUTER JOIN",
            Self::Full => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// How the rows of a join are matched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<Ident>),
    /// CROSS and NATURAL joins.
    None,
}

/// A joined table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Join {
    pub left: TableRef,
    pub join_type: JoinType,
    pub natural: bool,
    pub right: TableRef,
    pub constraint: JoinConstraint,
}

/// A possibly qualified table name (`catalog.schema.table`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableName {
    pub qualifier: Vec<Ident>,
    pub name: Ident,
}

impl TableName {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            qualifier: Vec::new(),
            name: Ident::new(name),
        }
    }
}

/// A table reference in the FROM clause.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TableRef {
    /// A named table.
    Table {
        name: TableName,
        alias: Option<Ident>,
    },
    /// A derived table; the alias is mandatory.
    Subquery { query: Box<Query>, alias: Ident },
    /// A joined table.
    Join(Box<Join>),
    /// A parenthesized table reference.
    Nested(Box<TableRef>),
}

impl TableRef {
    /// Creates a simple table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            name: TableName::new(name),
            alias: None,
        }
    }

    /// Adds an alias to a named table or derived table.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        match self {
            Self::Table { name, .. } => Self::Table {
                name,
                alias: Some(Ident::new(alias)),
            },
            Self::Subquery { query, .. } => Self::Subquery {
                query,
                alias: Ident::new(alias),
            },
            other => other,
        }
    }
}

/// An item of the select list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SelectItem {
    /// The expression, or [`Expr::Wildcard`].
    pub expr: Expr,
    pub alias: Option<Ident>,
}

impl SelectItem {
    #[must_use]
    pub const fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }
}

/// A single SELECT ... FROM ... block.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QuerySpec {
    pub distinct: bool,
    /// TOP n.
    pub top: Option<u64>,
    pub select_list: Vec<SelectItem>,
    /// Comma-separated FROM items.
    pub from_clause: Vec<TableRef>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    /// Set only when this specification is the whole query body.
    pub order_by: Vec<OrderBy>,
    /// Set only when this specification is the whole query body.
    pub offset: Option<u64>,
}

/// Set operators between query terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SetOperator {
    Union,
    Except,
    Intersect,
}

impl SetOperator {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::Except => "EXCEPT",
            Self::Intersect => "INTERSECT",
        }
    }

    /// Binding strength: INTERSECT binds tighter than UNION and EXCEPT.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Union | Self::Except => 1,
            Self::Intersect => 2,
        }
    }
}

/// The body of a query: specifications combined by set operators.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum QueryBody {
    Spec(Box<QuerySpec>),
    SetOperation {
        op: SetOperator,
        all: bool,
        left: Box<QueryBody>,
        right: Box<QueryBody>,
    },
    /// A parenthesized query used as a set operand.
    Nested(Box<Query>),
}

/// A named subquery introduced by WITH.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommonTableExpr {
    pub name: Ident,
    pub columns: Vec<Ident>,
    pub query: Box<Query>,
}

/// A complete query: the root of every parse tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Query {
    pub with: Vec<CommonTableExpr>,
    pub body: QueryBody,
    /// ORDER BY over a set operation. A single specification keeps its own.
    pub order_by: Vec<OrderBy>,
    /// OFFSET over a set operation. A single specification keeps its own.
    pub offset: Option<u64>,
}

impl Query {
    /// Wraps a single specification.
    #[must_use]
    pub fn from_spec(spec: QuerySpec) -> Self {
        Self {
            with: Vec::new(),
            body: QueryBody::Spec(Box::new(spec)),
            order_by: Vec::new(),
            offset: None,
        }
    }

    /// Returns the specification when the body is a single one.
    #[must_use]
    pub fn as_spec(&self) -> Option<&QuerySpec> {
        match &self.body {
            QueryBody::Spec(spec) => Some(spec),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_type() {
        assert_eq!(JoinType::Inner.as_str(), "JOIN");
        assert_eq!(JoinType::Left.as_str(), "LEFT OUTER JOIN");
    }

    #[test]
    fn test_table_ref_builder() {
        let table = TableRef::table("gaia_source").alias("g");
        assert!(matches!(
            table,
            TableRef::Table { name, alias: Some(alias) }
                if name.name.value == "gaia_source" && alias.value == "g"
        ));
    }

    #[test]
    fn test_set_operator_precedence() {
        assert!(SetOperator::Intersect.precedence() > SetOperator::Union.precedence());
        assert_eq!(
            SetOperator::Union.precedence(),
            SetOperator::Except.precedence()
        );
    }

    #[test]
    fn test_as_spec() {
        let query = Query::from_spec(QuerySpec::default());
        assert!(query.as_spec().is_some());
    }
}
