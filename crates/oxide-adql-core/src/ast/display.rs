//! ADQL pretty-printing via `fmt::Display`.
//!
//! The printer adds parentheses only where the precedence table requires
//! them, so a tree produced by the parser prints back to text that parses to
//! the same tree.

use std::fmt;

use super::{
    ColumnRef, CommonTableExpr, Expr, FunctionCall, GeometryCall, Ident, Join, JoinConstraint,
    Literal, OrderBy, OrderDirection, Query, QueryBody, QuerySpec, SelectItem, TableName,
    TableRef, UnaryOp,
};
use crate::precedence::PrecedenceTable;

/// Level of anything that never needs parentheses.
const ATOM_LEVEL: u8 = u8::MAX;

/// Returns the binding level of an expression's outermost operator.
#[must_use]
pub fn expr_level(expr: &Expr, table: &PrecedenceTable) -> u8 {
    match expr {
        Expr::Binary { op, .. } => table.binary(*op).map_or(ATOM_LEVEL, |info| info.level),
        Expr::Unary { op, .. } => table.prefix(*op),
        Expr::IsNull { .. }
        | Expr::Between { .. }
        | Expr::InList { .. }
        | Expr::InSubquery { .. }
        | Expr::Like { .. } => table.predicate_level,
        // Printed with a leading minus sign.
        Expr::Literal(Literal::Integer(n)) if *n < 0 => table.unary_level,
        Expr::Literal(Literal::Real(v)) if v.is_sign_negative() => table.unary_level,
        _ => ATOM_LEVEL,
    }
}

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn dotted(f: &mut fmt::Formatter<'_>, qualifier: &[Ident], name: &Ident) -> fmt::Result {
    for part in qualifier {
        write!(f, "{part}.")?;
    }
    write!(f, "{name}")
}

/// Writes `expr`, parenthesized when it binds looser than `min_level`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min_level: u8) -> fmt::Result {
    if expr_level(expr, &PrecedenceTable::ADQL) < min_level {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.value.replace('"', "\"\""))
        } else {
            f.write_str(&self.value)
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            // Debug keeps a decimal point or exponent, so the text lexes as a real.
            Self::Real(v) => write!(f, "{v:?}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dotted(f, &self.qualifier, &self.name)
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        comma_list(f, &self.args)?;
        f.write_str(")")
    }
}

impl fmt::Display for GeometryCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function.as_str())?;
        comma_list(f, &self.args)?;
        f.write_str(")")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = &PrecedenceTable::ADQL;
        let predicate = table.predicate_level;
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Column(col) => write!(f, "{col}"),
            Self::Wildcard { qualifier } => {
                for part in qualifier {
                    write!(f, "{part}.")?;
                }
                f.write_str("*")
            }
            Self::Binary { left, op, right } => {
                let info = table.binary(*op);
                let level = info.map_or(ATOM_LEVEL, |i| i.level);
                let right_level = info.map_or(ATOM_LEVEL, |i| i.right_operand_level());
                write_operand(f, left, level)?;
                write!(f, " {} ", op.as_str())?;
                // A prefix operator on the right absorbs what follows it, so
                // the parser accepts it there without parentheses.
                if matches!(right.as_ref(), Self::Unary { .. }) {
                    write!(f, "{right}")
                } else {
                    write_operand(f, right, right_level)
                }
            }
            Self::Unary { op, operand } => {
                let level = table.prefix(*op);
                let inner = if expr_level(operand, table) < level
                    && !matches!(operand.as_ref(), Self::Unary { .. })
                {
                    format!("({operand})")
                } else {
                    operand.to_string()
                };
                match op {
                    UnaryOp::Not => write!(f, "NOT {inner}"),
                    // `--` would start a comment.
                    UnaryOp::Neg if inner.starts_with('-') => write!(f, "- {inner}"),
                    _ => write!(f, "{}{inner}", op.as_str()),
                }
            }
            Self::Function(call) => write!(f, "{call}"),
            Self::Geometry(call) => write!(f, "{call}"),
            Self::IsNull { expr, negated } => {
                write_operand(f, expr, predicate)?;
                f.write_str(if *negated { " IS NOT NULL" } else { " IS NULL" })
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => {
                write_operand(f, expr, predicate)?;
                f.write_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " })?;
                write_operand(f, low, predicate + 1)?;
                f.write_str(" AND ")?;
                write_operand(f, high, predicate + 1)
            }
            Self::InList {
                expr,
                list,
                negated,
            } => {
                write_operand(f, expr, predicate)?;
                f.write_str(if *negated { " NOT IN (" } else { " IN (" })?;
                comma_list(f, list)?;
                f.write_str(")")
            }
            Self::InSubquery {
                expr,
                query,
                negated,
            } => {
                write_operand(f, expr, predicate)?;
                f.write_str(if *negated { " NOT IN (" } else { " IN (" })?;
                write!(f, "{query})")
            }
            Self::Like {
                expr,
                pattern,
                escape,
                negated,
                case_insensitive,
            } => {
                write_operand(f, expr, predicate)?;
                if *negated {
                    f.write_str(" NOT")?;
                }
                f.write_str(if *case_insensitive { " ILIKE " } else { " LIKE " })?;
                write_operand(f, pattern, predicate + 1)?;
                if let Some(escape) = escape {
                    f.write_str(" ESCAPE ")?;
                    write_operand(f, escape, predicate + 1)?;
                }
                Ok(())
            }
            Self::Exists(query) => write!(f, "EXISTS ({query})"),
            Self::Subquery(query) => write!(f, "({query})"),
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                f.write_str("CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {operand}")?;
                }
                for (when, then) in when_clauses {
                    write!(f, " WHEN {when} THEN {then}")?;
                }
                if let Some(else_clause) = else_clause {
                    write!(f, " ELSE {else_clause}")?;
                }
                f.write_str(" END")
            }
            Self::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Self::Paren(inner) => write!(f, "({inner})"),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.direction == OrderDirection::Desc {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dotted(f, &self.qualifier, &self.name)
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.left)?;
        if self.natural {
            f.write_str("NATURAL ")?;
        }
        f.write_str(self.join_type.as_str())?;
        // Joins nest to the left; a join on the right needs parentheses.
        if matches!(self.right, TableRef::Join(_)) {
            write!(f, " ({})", self.right)?;
        } else {
            write!(f, " {}", self.right)?;
        }
        match &self.constraint {
            JoinConstraint::On(expr) => write!(f, " ON {expr}"),
            JoinConstraint::Using(columns) => {
                f.write_str(" USING (")?;
                comma_list(f, columns)?;
                f.write_str(")")
            }
            JoinConstraint::None => Ok(()),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { name, alias } => {
                write!(f, "{name}")?;
                if let Some(alias) = alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
            Self::Subquery { query, alias } => write!(f, "({query}) AS {alias}"),
            Self::Join(join) => write!(f, "{join}"),
            Self::Nested(inner) => write!(f, "({inner})"),
        }
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

fn write_order_and_offset(
    f: &mut fmt::Formatter<'_>,
    order_by: &[OrderBy],
    offset: Option<u64>,
) -> fmt::Result {
    if !order_by.is_empty() {
        f.write_str(" ORDER BY ")?;
        comma_list(f, order_by)?;
    }
    if let Some(offset) = offset {
        write!(f, " OFFSET {offset}")?;
    }
    Ok(())
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        if let Some(top) = self.top {
            write!(f, "TOP {top} ")?;
        }
        comma_list(f, &self.select_list)?;
        f.write_str(" FROM ")?;
        comma_list(f, &self.from_clause)?;
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            comma_list(f, &self.group_by)?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        write_order_and_offset(f, &self.order_by, self.offset)
    }
}

impl fmt::Display for QueryBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec(spec) => write!(f, "{spec}"),
            Self::SetOperation {
                op,
                all,
                left,
                right,
            } => {
                let level = op.precedence();
                match left.as_ref() {
                    Self::SetOperation { op: inner, .. } if inner.precedence() < level => {
                        write!(f, "({left})")?;
                    }
                    _ => write!(f, "{left}")?,
                }
                write!(f, " {}", op.as_str())?;
                if *all {
                    f.write_str(" ALL")?;
                }
                match right.as_ref() {
                    Self::SetOperation { op: inner, .. } if inner.precedence() <= level => {
                        write!(f, " ({right})")
                    }
                    _ => write!(f, " {right}"),
                }
            }
            Self::Nested(query) => write!(f, "({query})"),
        }
    }
}

impl fmt::Display for CommonTableExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.columns.is_empty() {
            f.write_str("(")?;
            comma_list(f, &self.columns)?;
            f.write_str(")")?;
        }
        write!(f, " AS ({})", self.query)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.with.is_empty() {
            f.write_str("WITH ")?;
            comma_list(f, &self.with)?;
            f.write_str(" ")?;
        }
        write!(f, "{}", self.body)?;
        write_order_and_offset(f, &self.order_by, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, GeometryFunction};

    #[test]
    fn test_minimal_parentheses() {
        let sum = Expr::integer(1).add(Expr::integer(2));
        assert_eq!(sum.clone().mul(Expr::integer(3)).to_string(), "(1 + 2) * 3");
        assert_eq!(Expr::integer(3).mul(sum.clone()).to_string(), "3 * (1 + 2)");
        assert_eq!(Expr::integer(3).add(sum.clone()).to_string(), "3 + (1 + 2)");
        assert_eq!(sum.add(Expr::integer(3)).to_string(), "1 + 2 + 3");
    }

    #[test]
    fn test_string_and_identifier_escaping() {
        assert_eq!(Expr::string("it's").to_string(), "'it''s'");
        let col = Expr::Column(ColumnRef {
            qualifier: vec![Ident::quoted("My \"T\"")],
            name: Ident::new("ra"),
        });
        assert_eq!(col.to_string(), "\"My \"\"T\"\"\".ra");
    }

    #[test]
    fn test_real_keeps_decimal_point() {
        assert_eq!(Expr::real(2.0).to_string(), "2.0");
        assert_eq!(Expr::real(0.5).to_string(), "0.5");
    }

    #[test]
    fn test_double_negation_does_not_form_comment() {
        let expr = Expr::unary(UnaryOp::Neg, Expr::unary(UnaryOp::Neg, Expr::column("x")));
        assert_eq!(expr.to_string(), "- -x");
    }

    #[test]
    fn test_not_wraps_boolean_operand() {
        let expr = Expr::unary(UnaryOp::Not, Expr::column("a").and(Expr::column("b")));
        assert_eq!(expr.to_string(), "NOT (a AND b)");
    }

    #[test]
    fn test_geometry_call() {
        let expr = Expr::geometry(
            GeometryFunction::Point,
            vec![Expr::string("ICRS"), Expr::real(10.5), Expr::real(-1.25)],
        );
        assert_eq!(expr.to_string(), "POINT('ICRS', 10.5, -1.25)");
    }

    #[test]
    fn test_levels() {
        let table = &PrecedenceTable::ADQL;
        assert_eq!(expr_level(&Expr::column("a"), table), ATOM_LEVEL);
        assert_eq!(
            expr_level(&Expr::column("a").binary(BinaryOp::Or, Expr::column("b")), table),
            1
        );
        assert_eq!(expr_level(&Expr::integer(-1), table), 11);
    }

    #[test]
    fn test_query_spec_display() {
        let spec = QuerySpec {
            top: Some(10),
            select_list: vec![SelectItem::new(Expr::column("ra"))],
            from_clause: vec![TableRef::table("gaia").alias("g")],
            where_clause: Some(Expr::column("mag").lt(Expr::integer(12))),
            order_by: vec![OrderBy {
                expr: Expr::column("mag"),
                direction: OrderDirection::Desc,
            }],
            ..QuerySpec::default()
        };
        assert_eq!(
            Query::from_spec(spec).to_string(),
            "SELECT TOP 10 ra FROM gaia AS g WHERE mag < 12 ORDER BY mag DESC"
        );
    }
}
