//! Abstract Syntax Tree (AST) types for ADQL queries.
//!
//! Every node owns its children. [`Query`] is the root of a parse tree; it
//! prints back to ADQL through [`std::fmt::Display`] and is traversed with a
//! [`Visitor`] (read-only) or a [`Fold`] (rewriting).

mod display;
mod expression;
mod fold;
mod geometry;
mod query;
mod types;
mod visit;

pub use display::expr_level;
pub use expression::{
    BinaryOp, ColumnRef, Expr, FunctionCall, GeometryCall, Ident, Literal, OperatorFamily, UnaryOp,
};
pub use fold::{
    fold_binary, fold_expr, fold_function, fold_geometry, fold_join, fold_query, fold_query_body,
    fold_query_spec, fold_table_ref, ConstantFolder, Fold,
};
pub use geometry::GeometryFunction;
pub use query::{
    CommonTableExpr, Join, JoinConstraint, JoinType, OrderBy, OrderDirection, Query, QueryBody,
    QuerySpec, SelectItem, SetOperator, TableName, TableRef,
};
pub use types::DataType;
pub use visit::{
    walk_binary, walk_expr, walk_function, walk_geometry, walk_join, walk_query, walk_query_body,
    walk_query_spec, walk_table_ref, ColumnCollector, Visitor,
};
