//! Tests for compound queries: UNION, EXCEPT, INTERSECT and WITH.

mod common;
use common::*;

use oxide_adql_core::ast::{Ident, OrderDirection, QueryBody, SetOperator};

fn set_op(body: &QueryBody) -> (SetOperator, bool, &QueryBody, &QueryBody) {
    match body {
        QueryBody::SetOperation {
            op,
            all,
            left,
            right,
        } => (*op, *all, left, right),
        other => panic!("expected a set operation, got {other:?}"),
    }
}

#[test]
fn union_all() {
    let query = parse("SELECT a FROM t UNION ALL SELECT a FROM u");
    let (op, all, left, right) = set_op(&query.body);
    assert_eq!(op, SetOperator::Union);
    assert!(all);
    assert!(matches!(left, QueryBody::Spec(_)));
    assert!(matches!(right, QueryBody::Spec(_)));
    round_trip("SELECT a FROM t UNION ALL SELECT a FROM u");
}

#[test]
fn union_and_except_are_left_associative() {
    let query = parse("SELECT a FROM t UNION SELECT a FROM u EXCEPT SELECT a FROM v");
    let (op, _, left, _) = set_op(&query.body);
    assert_eq!(op, SetOperator::Except);
    assert_eq!(set_op(left).0, SetOperator::Union);
    round_trip("SELECT a FROM t UNION SELECT a FROM u EXCEPT SELECT a FROM v");
}

#[test]
fn intersect_binds_tighter() {
    let query = parse("SELECT a FROM t UNION SELECT a FROM u INTERSECT SELECT a FROM v");
    let (op, _, _, right) = set_op(&query.body);
    assert_eq!(op, SetOperator::Union);
    assert_eq!(set_op(right).0, SetOperator::Intersect);
    round_trip("SELECT a FROM t UNION SELECT a FROM u INTERSECT SELECT a FROM v");
}

#[test]
fn parenthesized_query_terms() {
    let query = parse("(SELECT a FROM t UNION SELECT a FROM u) INTERSECT SELECT a FROM v");
    let (op, _, left, _) = set_op(&query.body);
    assert_eq!(op, SetOperator::Intersect);
    assert!(matches!(left, QueryBody::Nested(_)));
    round_trip("(SELECT a FROM t UNION SELECT a FROM u) INTERSECT SELECT a FROM v");
}

#[test]
fn order_by_attaches_to_compound_query() {
    let query = parse("SELECT a FROM t UNION SELECT a FROM u ORDER BY a DESC OFFSET 5");
    assert_eq!(query.order_by.len(), 1);
    assert_eq!(query.order_by[0].direction, OrderDirection::Desc);
    assert_eq!(query.offset, Some(5));
    let (_, _, _, right) = set_op(&query.body);
    let QueryBody::Spec(spec) = right else {
        panic!("expected a specification");
    };
    assert!(spec.order_by.is_empty());
    round_trip("SELECT a FROM t UNION SELECT a FROM u ORDER BY a DESC OFFSET 5");
}

#[test]
fn with_common_table_expressions() {
    let sql = "WITH bright(id, m) AS (SELECT source_id, mag FROM gaia WHERE mag < 10), \
               near AS (SELECT id FROM bright) \
               SELECT b.id FROM bright AS b JOIN near AS n USING (id)";
    let query = parse(sql);
    assert_eq!(query.with.len(), 2);
    assert_eq!(query.with[0].name, Ident::new("bright"));
    assert_eq!(
        query.with[0].columns,
        vec![Ident::new("id"), Ident::new("m")]
    );
    assert!(query.with[1].columns.is_empty());
    round_trip(sql);
}

#[test]
fn with_requires_parenthesized_query() {
    let errors = parse_errs("WITH x AS SELECT 1 FROM t SELECT a FROM x");
    assert_eq!(errors[0].found, "SELECT");
}

#[test]
fn set_operation_missing_right_operand() {
    let errors = parse_errs("SELECT a FROM t UNION");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().ends_with("found '<EOF>'"));
}
