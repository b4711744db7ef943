//! Tests for the geometry functions and their argument counts.

mod common;
use common::*;

use oxide_adql_core::ast::{BinaryOp, Expr, GeometryFunction};
use oxide_adql_core::TokenKind;

fn geometry(expr: &Expr) -> (GeometryFunction, usize) {
    match expr {
        Expr::Geometry(call) => (call.function, call.args.len()),
        other => panic!("expected a geometry call, got {other:?}"),
    }
}

#[test]
fn geometry_cone_search() {
    let sql = "SELECT source_id FROM gaia \
               WHERE 1 = CONTAINS(POINT('ICRS', ra, dec), CIRCLE('ICRS', 266.4, -29.0, 0.5))";
    let spec = parse_spec(sql);
    let Some(Expr::Binary {
        op: BinaryOp::Eq,
        right,
        ..
    }) = &spec.where_clause
    else {
        panic!("expected a comparison");
    };
    let Expr::Geometry(contains) = right.as_ref() else {
        panic!("expected CONTAINS");
    };
    assert_eq!(contains.function, GeometryFunction::Contains);
    assert_eq!(geometry(&contains.args[0]), (GeometryFunction::Point, 3));
    assert_eq!(geometry(&contains.args[1]), (GeometryFunction::Circle, 4));
    round_trip(sql);
}

#[test]
fn geometry_names_are_case_insensitive() {
    assert_eq!(
        geometry(&parse_expr("point(ra, dec)")),
        (GeometryFunction::Point, 2)
    );
    assert_eq!(
        geometry(&parse_expr("Distance(p1, p2)")),
        (GeometryFunction::Distance, 2)
    );
}

#[test]
fn geometry_arities() {
    let cases = [
        ("BOX('ICRS', 1, 2, 3, 4)", GeometryFunction::Box, 5),
        ("BOX(p, 3, 4)", GeometryFunction::Box, 3),
        ("POLYGON(1, 2, 3, 4, 5, 6, 7, 8)", GeometryFunction::Polygon, 8),
        ("REGION('Circle ICRS 1 2 3')", GeometryFunction::Region, 1),
        ("INTERSECTS(a, b)", GeometryFunction::Intersects, 2),
        ("AREA(c)", GeometryFunction::Area, 1),
        ("CENTROID(c)", GeometryFunction::Centroid, 1),
        ("COORD1(p)", GeometryFunction::Coord1, 1),
        ("COORD2(p)", GeometryFunction::Coord2, 1),
        ("COORDSYS(p)", GeometryFunction::Coordsys, 1),
        ("DISTANCE(1, 2, 3, 4)", GeometryFunction::Distance, 4),
    ];
    for (sql, function, count) in cases {
        assert_eq!(geometry(&parse_expr(sql)), (function, count), "{sql}");
    }
}

#[test]
fn geometry_missing_argument_expects_comma() {
    let errors = parse_errs("SELECT POINT(1) FROM t");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].found, ")");
    let expected = errors[0].expected().unwrap();
    assert!(expected.contains(&TokenKind::Comma));
    assert!(!expected.contains(&TokenKind::RightParen));
}

#[test]
fn geometry_extra_argument_expects_close_paren() {
    let errors = parse_errs("SELECT CONTAINS(1, 2, 3) FROM t");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].found, ",");
    let expected = errors[0].expected().unwrap();
    assert!(expected.contains(&TokenKind::RightParen));
    assert!(!expected.contains(&TokenKind::Comma));
}

#[test]
fn geometry_distance_rejects_three_arguments() {
    let errors = parse_errs("SELECT DISTANCE(1, 2, 3) FROM t");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].found, ")");
}

#[test]
fn geometry_name_without_call_is_a_column() {
    assert_eq!(parse_expr("point"), Expr::column("point"));
}

#[test]
fn geometry_delimited_name_is_a_generic_function() {
    assert!(matches!(
        parse_expr("\"POINT\"(1, 2)"),
        Expr::Function(_)
    ));
}

#[test]
fn geometry_predicate_in_join() {
    round_trip(
        "SELECT a.id, b.id FROM a JOIN b \
         ON 1 = CONTAINS(POINT('ICRS', a.ra, a.dec), CIRCLE('ICRS', b.ra, b.dec, 0.01))",
    );
}
