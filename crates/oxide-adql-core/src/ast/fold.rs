//! Rewriting traversal of the syntax tree.
//!
//! A [`Fold`] consumes a node and returns its replacement. The `fold_*`
//! defaults rebuild each node from its folded children, so an implementation
//! only overrides the nodes it rewrites. [`fold_expr`] hands each expression
//! to its per-kind hook.

use super::{
    BinaryOp, ColumnRef, CommonTableExpr, Expr, FunctionCall, GeometryCall, Join,
    JoinConstraint, Literal, OrderBy, Query, QueryBody, QuerySpec, SelectItem, TableRef, UnaryOp,
};

/// A rewriting pass over the syntax tree.
pub trait Fold {
    fn fold_query(&mut self, query: Query) -> Query {
        fold_query(self, query)
    }

    fn fold_query_body(&mut self, body: QueryBody) -> QueryBody {
        fold_query_body(self, body)
    }

    fn fold_query_spec(&mut self, spec: QuerySpec) -> QuerySpec {
        fold_query_spec(self, spec)
    }

    /// A query nested in an expression or in a FROM clause.
    fn fold_subquery(&mut self, query: Query) -> Query {
        self.fold_query(query)
    }

    fn fold_table_ref(&mut self, table: TableRef) -> TableRef {
        fold_table_ref(self, table)
    }

    fn fold_join(&mut self, join: Join) -> Join {
        fold_join(self, join)
    }

    fn fold_expr(&mut self, expr: Expr) -> Expr {
        fold_expr(self, expr)
    }

    fn fold_literal(&mut self, literal: Literal) -> Expr {
        Expr::Literal(literal)
    }

    fn fold_column(&mut self, column: ColumnRef) -> Expr {
        Expr::Column(column)
    }

    fn fold_binary(&mut self, left: Expr, op: BinaryOp, right: Expr) -> Expr {
        fold_binary(self, left, op, right)
    }

    fn fold_unary(&mut self, op: UnaryOp, operand: Expr) -> Expr {
        Expr::unary(op, self.fold_expr(operand))
    }

    fn fold_function(&mut self, call: FunctionCall) -> Expr {
        Expr::Function(fold_function(self, call))
    }

    fn fold_geometry(&mut self, call: GeometryCall) -> Expr {
        Expr::Geometry(fold_geometry(self, call))
    }
}

fn fold_order_by<F: Fold + ?Sized>(folder: &mut F, keys: Vec<OrderBy>) -> Vec<OrderBy> {
    keys.into_iter()
        .map(|key| OrderBy {
            expr: folder.fold_expr(key.expr),
            direction: key.direction,
        })
        .collect()
}

fn fold_exprs<F: Fold + ?Sized>(folder: &mut F, exprs: Vec<Expr>) -> Vec<Expr> {
    exprs.into_iter().map(|e| folder.fold_expr(e)).collect()
}

fn fold_boxed<F: Fold + ?Sized>(folder: &mut F, expr: Box<Expr>) -> Box<Expr> {
    Box::new(folder.fold_expr(*expr))
}

fn fold_boxed_query<F: Fold + ?Sized>(folder: &mut F, query: Box<Query>) -> Box<Query> {
    Box::new(folder.fold_query(*query))
}

fn fold_boxed_subquery<F: Fold + ?Sized>(folder: &mut F, query: Box<Query>) -> Box<Query> {
    Box::new(folder.fold_subquery(*query))
}

pub fn fold_query<F: Fold + ?Sized>(folder: &mut F, query: Query) -> Query {
    Query {
        with: query
            .with
            .into_iter()
            .map(|cte| CommonTableExpr {
                name: cte.name,
                columns: cte.columns,
                query: fold_boxed_query(folder, cte.query),
            })
            .collect(),
        body: folder.fold_query_body(query.body),
        order_by: fold_order_by(folder, query.order_by),
        offset: query.offset,
    }
}

pub fn fold_query_body<F: Fold + ?Sized>(folder: &mut F, body: QueryBody) -> QueryBody {
    match body {
        QueryBody::Spec(spec) => QueryBody::Spec(Box::new(folder.fold_query_spec(*spec))),
        QueryBody::SetOperation {
            op,
            all,
            left,
            right,
        } => QueryBody::SetOperation {
            op,
            all,
            left: Box::new(folder.fold_query_body(*left)),
            right: Box::new(folder.fold_query_body(*right)),
        },
        QueryBody::Nested(query) => QueryBody::Nested(fold_boxed_query(folder, query)),
    }
}

pub fn fold_query_spec<F: Fold + ?Sized>(folder: &mut F, spec: QuerySpec) -> QuerySpec {
    QuerySpec {
        distinct: spec.distinct,
        top: spec.top,
        select_list: spec
            .select_list
            .into_iter()
            .map(|item| SelectItem {
                expr: folder.fold_expr(item.expr),
                alias: item.alias,
            })
            .collect(),
        from_clause: spec
            .from_clause
            .into_iter()
            .map(|t| folder.fold_table_ref(t))
            .collect(),
        where_clause: spec.where_clause.map(|e| folder.fold_expr(e)),
        group_by: fold_exprs(folder, spec.group_by),
        having: spec.having.map(|e| folder.fold_expr(e)),
        order_by: fold_order_by(folder, spec.order_by),
        offset: spec.offset,
    }
}

pub fn fold_table_ref<F: Fold + ?Sized>(folder: &mut F, table: TableRef) -> TableRef {
    match table {
        TableRef::Table { .. } => table,
        TableRef::Subquery { query, alias } => TableRef::Subquery {
            query: fold_boxed_subquery(folder, query),
            alias,
        },
        TableRef::Join(join) => TableRef::Join(Box::new(folder.fold_join(*join))),
        TableRef::Nested(inner) => TableRef::Nested(Box::new(folder.fold_table_ref(*inner))),
    }
}

pub fn fold_join<F: Fold + ?Sized>(folder: &mut F, join: Join) -> Join {
    Join {
        left: folder.fold_table_ref(join.left),
        join_type: join.join_type,
        natural: join.natural,
        right: folder.fold_table_ref(join.right),
        constraint: match join.constraint {
            JoinConstraint::On(expr) => JoinConstraint::On(folder.fold_expr(expr)),
            other => other,
        },
    }
}

pub fn fold_binary<F: Fold + ?Sized>(
    folder: &mut F,
    left: Expr,
    op: BinaryOp,
    right: Expr,
) -> Expr {
    Expr::Binary {
        left: Box::new(folder.fold_expr(left)),
        op,
        right: Box::new(folder.fold_expr(right)),
    }
}

pub fn fold_function<F: Fold + ?Sized>(folder: &mut F, call: FunctionCall) -> FunctionCall {
    FunctionCall {
        name: call.name,
        args: fold_exprs(folder, call.args),
        distinct: call.distinct,
    }
}

pub fn fold_geometry<F: Fold + ?Sized>(folder: &mut F, call: GeometryCall) -> GeometryCall {
    GeometryCall {
        function: call.function,
        args: fold_exprs(folder, call.args),
    }
}

pub fn fold_expr<F: Fold + ?Sized>(folder: &mut F, expr: Expr) -> Expr {
    match expr {
        Expr::Wildcard { .. } => expr,
        Expr::Literal(literal) => folder.fold_literal(literal),
        Expr::Column(column) => folder.fold_column(column),
        Expr::Binary { left, op, right } => folder.fold_binary(*left, op, *right),
        Expr::Unary { op, operand } => folder.fold_unary(op, *operand),
        Expr::Function(call) => folder.fold_function(call),
        Expr::Geometry(call) => folder.fold_geometry(call),
        Expr::IsNull { expr, negated } => Expr::IsNull {
            expr: fold_boxed(folder, expr),
            negated,
        },
        Expr::Between {
            expr,
            low,
            high,
            negated,
        } => Expr::Between {
            expr: fold_boxed(folder, expr),
            low: fold_boxed(folder, low),
            high: fold_boxed(folder, high),
            negated,
        },
        Expr::InList {
            expr,
            list,
            negated,
        } => Expr::InList {
            expr: fold_boxed(folder, expr),
            list: fold_exprs(folder, list),
            negated,
        },
        Expr::InSubquery {
            expr,
            query,
            negated,
        } => Expr::InSubquery {
            expr: fold_boxed(folder, expr),
            query: fold_boxed_subquery(folder, query),
            negated,
        },
        Expr::Like {
            expr,
            pattern,
            escape,
            negated,
            case_insensitive,
        } => Expr::Like {
            expr: fold_boxed(folder, expr),
            pattern: fold_boxed(folder, pattern),
            escape: escape.map(|e| fold_boxed(folder, e)),
            negated,
            case_insensitive,
        },
        Expr::Exists(query) => Expr::Exists(fold_boxed_subquery(folder, query)),
        Expr::Subquery(query) => Expr::Subquery(fold_boxed_subquery(folder, query)),
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => Expr::Case {
            operand: operand.map(|e| fold_boxed(folder, e)),
            when_clauses: when_clauses
                .into_iter()
                .map(|(when, then)| (folder.fold_expr(when), folder.fold_expr(then)))
                .collect(),
            else_clause: else_clause.map(|e| fold_boxed(folder, e)),
        },
        Expr::Cast { expr, data_type } => Expr::Cast {
            expr: fold_boxed(folder, expr),
            data_type,
        },
        Expr::Paren(inner) => Expr::Paren(fold_boxed(folder, inner)),
    }
}

/// Evaluates arithmetic on numeric literals and string concatenation.
///
/// Operations that would overflow, divide by zero or produce a non-finite
/// real are left as written.
#[derive(Debug, Default)]
pub struct ConstantFolder {
    /// Number of nodes replaced.
    pub folded: usize,
}

impl ConstantFolder {
    fn integer_op(op: BinaryOp, a: i64, b: i64) -> Option<i64> {
        match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div => a.checked_div(b),
            BinaryOp::Mod => a.checked_rem(b),
            BinaryOp::BitAnd => Some(a & b),
            BinaryOp::BitOr => Some(a | b),
            BinaryOp::BitXor => Some(a ^ b),
            _ => None,
        }
    }

    fn real_op(op: BinaryOp, a: f64, b: f64) -> Option<f64> {
        let value = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    #[allow(clippy::cast_precision_loss)]
    fn evaluate(op: BinaryOp, left: &Literal, right: &Literal) -> Option<Literal> {
        match (left, right) {
            (Literal::Integer(a), Literal::Integer(b)) => {
                Self::integer_op(op, *a, *b).map(Literal::Integer)
            }
            (Literal::Real(a), Literal::Real(b)) => Self::real_op(op, *a, *b).map(Literal::Real),
            (Literal::Integer(a), Literal::Real(b)) => {
                Self::real_op(op, *a as f64, *b).map(Literal::Real)
            }
            (Literal::Real(a), Literal::Integer(b)) => {
                Self::real_op(op, *a, *b as f64).map(Literal::Real)
            }
            (Literal::String(a), Literal::String(b)) if op == BinaryOp::Concat => {
                Some(Literal::String(format!("{a}{b}")))
            }
            _ => None,
        }
    }
}

impl Fold for ConstantFolder {
    fn fold_expr(&mut self, expr: Expr) -> Expr {
        match fold_expr(self, expr) {
            Expr::Binary { left, op, right } => {
                if let (Expr::Literal(l), Expr::Literal(r)) = (left.as_ref(), right.as_ref()) {
                    if let Some(value) = Self::evaluate(op, l, r) {
                        self.folded += 1;
                        return Expr::Literal(value);
                    }
                }
                Expr::Binary { left, op, right }
            }
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => match *operand {
                Expr::Literal(Literal::Integer(n)) if n != i64::MIN => {
                    self.folded += 1;
                    Expr::Literal(Literal::Integer(-n))
                }
                Expr::Literal(Literal::Real(v)) => {
                    self.folded += 1;
                    Expr::Literal(Literal::Real(-v))
                }
                other => Expr::unary(UnaryOp::Neg, other),
            },
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => match *operand {
                Expr::Literal(Literal::Boolean(b)) => {
                    self.folded += 1;
                    Expr::Literal(Literal::Boolean(!b))
                }
                other => Expr::unary(UnaryOp::Not, other),
            },
            Expr::Paren(inner) if matches!(inner.as_ref(), Expr::Literal(_)) => {
                self.folded += 1;
                *inner
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_folder_arithmetic() {
        let mut folder = ConstantFolder::default();
        let expr = Expr::integer(1).add(Expr::integer(2).mul(Expr::integer(3)));
        assert_eq!(folder.fold_expr(expr), Expr::integer(7));
        assert_eq!(folder.folded, 2);
    }

    #[test]
    fn test_constant_folder_keeps_columns() {
        let mut folder = ConstantFolder::default();
        let expr = Expr::column("mag").add(Expr::integer(2).paren());
        assert_eq!(
            folder.fold_expr(expr),
            Expr::column("mag").add(Expr::integer(2))
        );
    }

    #[test]
    fn test_constant_folder_division_by_zero() {
        let mut folder = ConstantFolder::default();
        let expr = Expr::integer(1).binary(BinaryOp::Div, Expr::integer(0));
        assert_eq!(folder.fold_expr(expr.clone()), expr);
        assert_eq!(folder.folded, 0);
    }

    #[test]
    fn test_constant_folder_mixed_numeric() {
        let mut folder = ConstantFolder::default();
        let expr = Expr::integer(1).add(Expr::real(0.5));
        assert_eq!(folder.fold_expr(expr), Expr::real(1.5));
    }

    #[test]
    fn test_literal_hook_sees_nested_literals() {
        struct Doubler;
        impl Fold for Doubler {
            fn fold_literal(&mut self, literal: Literal) -> Expr {
                match literal {
                    Literal::Integer(n) => Expr::integer(n * 2),
                    other => Expr::Literal(other),
                }
            }
        }

        let expr = Expr::column("a").add(Expr::integer(2).mul(Expr::integer(3).paren()));
        assert_eq!(
            Doubler.fold_expr(expr),
            Expr::column("a").add(Expr::integer(4).mul(Expr::integer(6).paren()))
        );
    }

    #[test]
    fn test_identity_fold_preserves_tree() {
        struct Identity;
        impl Fold for Identity {}

        let query = Query::from_spec(QuerySpec {
            select_list: vec![SelectItem::new(Expr::column("a").add(Expr::integer(1)))],
            from_clause: vec![TableRef::table("t")],
            ..QuerySpec::default()
        });
        assert_eq!(Identity.fold_query(query.clone()), query);
    }
}
