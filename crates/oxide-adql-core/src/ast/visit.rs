//! Read-only traversal of the syntax tree.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, which
//! visits the node's children in source order. Override a method to act on a
//! node; call the `walk_*` function from the override to keep descending.
//! [`walk_expr`] dispatches every expression to its per-kind hook, so a
//! visitor interested in one kind of node overrides only that hook.

use super::{
    BinaryOp, ColumnRef, Expr, FunctionCall, GeometryCall, Join, JoinConstraint, Literal, Query,
    QueryBody, QuerySpec, SelectItem, TableRef, UnaryOp,
};

/// A read-only visitor over the syntax tree.
pub trait Visitor {
    fn visit_query(&mut self, query: &Query) {
        walk_query(self, query);
    }

    fn visit_query_body(&mut self, body: &QueryBody) {
        walk_query_body(self, body);
    }

    fn visit_query_spec(&mut self, spec: &QuerySpec) {
        walk_query_spec(self, spec);
    }

    /// A query nested in an expression or in a FROM clause.
    fn visit_subquery(&mut self, query: &Query) {
        self.visit_query(query);
    }

    fn visit_select_item(&mut self, item: &SelectItem) {
        self.visit_expr(&item.expr);
    }

    fn visit_table_ref(&mut self, table: &TableRef) {
        walk_table_ref(self, table);
    }

    fn visit_join(&mut self, join: &Join) {
        walk_join(self, join);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_literal(&mut self, _literal: &Literal) {}

    /// Also called for each column named in a `USING` list.
    fn visit_column(&mut self, _column: &ColumnRef) {}

    fn visit_binary(&mut self, left: &Expr, _op: BinaryOp, right: &Expr) {
        walk_binary(self, left, right);
    }

    fn visit_unary(&mut self, _op: UnaryOp, operand: &Expr) {
        self.visit_expr(operand);
    }

    fn visit_function(&mut self, call: &FunctionCall) {
        walk_function(self, call);
    }

    fn visit_geometry(&mut self, call: &GeometryCall) {
        walk_geometry(self, call);
    }
}

pub fn walk_query<V: Visitor + ?Sized>(visitor: &mut V, query: &Query) {
    for cte in &query.with {
        visitor.visit_query(&cte.query);
    }
    visitor.visit_query_body(&query.body);
    for key in &query.order_by {
        visitor.visit_expr(&key.expr);
    }
}

pub fn walk_query_body<V: Visitor + ?Sized>(visitor: &mut V, body: &QueryBody) {
    match body {
        QueryBody::Spec(spec) => visitor.visit_query_spec(spec),
        QueryBody::SetOperation { left, right, .. } => {
            visitor.visit_query_body(left);
            visitor.visit_query_body(right);
        }
        QueryBody::Nested(query) => visitor.visit_query(query),
    }
}

pub fn walk_query_spec<V: Visitor + ?Sized>(visitor: &mut V, spec: &QuerySpec) {
    for item in &spec.select_list {
        visitor.visit_select_item(item);
    }
    for table in &spec.from_clause {
        visitor.visit_table_ref(table);
    }
    if let Some(expr) = &spec.where_clause {
        visitor.visit_expr(expr);
    }
    for expr in &spec.group_by {
        visitor.visit_expr(expr);
    }
    if let Some(expr) = &spec.having {
        visitor.visit_expr(expr);
    }
    for key in &spec.order_by {
        visitor.visit_expr(&key.expr);
    }
}

pub fn walk_table_ref<V: Visitor + ?Sized>(visitor: &mut V, table: &TableRef) {
    match table {
        TableRef::Table { .. } => {}
        TableRef::Subquery { query, .. } => visitor.visit_subquery(query),
        TableRef::Join(join) => visitor.visit_join(join),
        TableRef::Nested(inner) => visitor.visit_table_ref(inner),
    }
}

pub fn walk_join<V: Visitor + ?Sized>(visitor: &mut V, join: &Join) {
    visitor.visit_table_ref(&join.left);
    visitor.visit_table_ref(&join.right);
    match &join.constraint {
        JoinConstraint::On(expr) => visitor.visit_expr(expr),
        JoinConstraint::Using(names) => {
            for name in names {
                visitor.visit_column(&ColumnRef {
                    qualifier: Vec::new(),
                    name: name.clone(),
                });
            }
        }
        JoinConstraint::None => {}
    }
}

pub fn walk_binary<V: Visitor + ?Sized>(visitor: &mut V, left: &Expr, right: &Expr) {
    visitor.visit_expr(left);
    visitor.visit_expr(right);
}

pub fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, call: &FunctionCall) {
    for arg in &call.args {
        visitor.visit_expr(arg);
    }
}

pub fn walk_geometry<V: Visitor + ?Sized>(visitor: &mut V, call: &GeometryCall) {
    for arg in &call.args {
        visitor.visit_expr(arg);
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::Wildcard { .. } => {}
        Expr::Literal(literal) => visitor.visit_literal(literal),
        Expr::Column(column) => visitor.visit_column(column),
        Expr::Binary { left, op, right } => visitor.visit_binary(left, *op, right),
        Expr::Unary { op, operand } => visitor.visit_unary(*op, operand),
        Expr::Function(call) => visitor.visit_function(call),
        Expr::Geometry(call) => visitor.visit_geometry(call),
        Expr::IsNull { expr, .. } | Expr::Cast { expr, .. } | Expr::Paren(expr) => {
            visitor.visit_expr(expr);
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            visitor.visit_expr(expr);
            visitor.visit_expr(low);
            visitor.visit_expr(high);
        }
        Expr::InList { expr, list, .. } => {
            visitor.visit_expr(expr);
            for item in list {
                visitor.visit_expr(item);
            }
        }
        Expr::InSubquery { expr, query, .. } => {
            visitor.visit_expr(expr);
            visitor.visit_subquery(query);
        }
        Expr::Like {
            expr,
            pattern,
            escape,
            ..
        } => {
            visitor.visit_expr(expr);
            visitor.visit_expr(pattern);
            if let Some(escape) = escape {
                visitor.visit_expr(escape);
            }
        }
        Expr::Exists(query) | Expr::Subquery(query) => visitor.visit_subquery(query),
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => {
            if let Some(operand) = operand {
                visitor.visit_expr(operand);
            }
            for (when, then) in when_clauses {
                visitor.visit_expr(when);
                visitor.visit_expr(then);
            }
            if let Some(else_clause) = else_clause {
                visitor.visit_expr(else_clause);
            }
        }
    }
}

/// Collects every column reference in source order, subqueries included.
#[derive(Debug, Default)]
pub struct ColumnCollector {
    pub columns: Vec<ColumnRef>,
}

impl ColumnCollector {
    /// Returns the columns referenced anywhere in `query`.
    #[must_use]
    pub fn collect(query: &Query) -> Vec<ColumnRef> {
        let mut collector = Self::default();
        collector.visit_query(query);
        collector.columns
    }
}

impl Visitor for ColumnCollector {
    fn visit_column(&mut self, column: &ColumnRef) {
        self.columns.push(column.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{GeometryFunction, Ident, JoinType};

    struct ExprCounter(usize);

    impl Visitor for ExprCounter {
        fn visit_expr(&mut self, expr: &Expr) {
            self.0 += 1;
            walk_expr(self, expr);
        }
    }

    fn sample() -> Query {
        Query::from_spec(QuerySpec {
            select_list: vec![
                SelectItem::new(Expr::column("ra")),
                SelectItem::new(Expr::qualified_column("g", "dec")),
            ],
            from_clause: vec![TableRef::table("gaia").alias("g")],
            where_clause: Some(Expr::geometry(
                GeometryFunction::Contains,
                vec![Expr::column("pos"), Expr::column("region")],
            )),
            ..QuerySpec::default()
        })
    }

    #[test]
    fn test_column_collector_keeps_source_order() {
        let names: Vec<_> = ColumnCollector::collect(&sample())
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(
            names,
            vec![
                Ident::new("ra"),
                Ident::new("dec"),
                Ident::new("pos"),
                Ident::new("region")
            ]
        );
    }

    #[test]
    fn test_using_columns_are_visited() {
        let join = TableRef::Join(Box::new(Join {
            left: TableRef::table("a"),
            join_type: JoinType::Inner,
            natural: false,
            right: TableRef::table("b"),
            constraint: JoinConstraint::Using(vec![Ident::new("id"), Ident::new("epoch")]),
        }));
        let query = Query::from_spec(QuerySpec {
            select_list: vec![SelectItem::new(Expr::column("ra"))],
            from_clause: vec![join],
            ..QuerySpec::default()
        });
        let names: Vec<_> = ColumnCollector::collect(&query)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(
            names,
            vec![Ident::new("ra"), Ident::new("id"), Ident::new("epoch")]
        );
    }

    #[test]
    fn test_override_with_walk_descends() {
        let mut counter = ExprCounter(0);
        counter.visit_query(&sample());
        // ra, g.dec, CONTAINS(...), pos, region
        assert_eq!(counter.0, 5);
    }
}
