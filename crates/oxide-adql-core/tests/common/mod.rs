#![allow(dead_code)]

use oxide_adql_core::ast::{Expr, Query, QuerySpec};
use oxide_adql_core::{parse_with, ParseError, ParserConfig};

pub fn parse(sql: &str) -> Query {
    let result = oxide_adql_core::parse(sql);
    assert!(
        result.errors.is_empty(),
        "Failed to parse: {sql}\nErrors: {:?}",
        result.errors
    );
    result
        .ast
        .unwrap_or_else(|| panic!("No tree for: {sql}"))
}

pub fn parse_errs(sql: &str) -> Vec<ParseError> {
    let result = oxide_adql_core::parse(sql);
    assert!(
        !result.errors.is_empty(),
        "Expected parse errors for: {sql}"
    );
    result.errors
}

pub fn parse_errs_with(sql: &str, config: &ParserConfig) -> Vec<ParseError> {
    parse_with(sql, config).errors
}

pub fn parse_spec(sql: &str) -> QuerySpec {
    match parse(sql).as_spec() {
        Some(spec) => spec.clone(),
        None => panic!("Expected a single SELECT, got a compound query: {sql}"),
    }
}

/// Parses `SELECT <expr> FROM t` and returns the expression.
pub fn parse_expr(expr: &str) -> Expr {
    let mut spec = parse_spec(&format!("SELECT {expr} FROM t"));
    assert_eq!(spec.select_list.len(), 1, "Expected one select item: {expr}");
    spec.select_list.remove(0).expr
}

/// Verifies that printing is a fixed point: the printed text parses to the
/// same tree and prints identically.
pub fn round_trip(sql: &str) {
    let ast1 = parse(sql);
    let rendered1 = ast1.to_string();
    let ast2 = parse(&rendered1);
    let rendered2 = ast2.to_string();
    assert_eq!(
        ast1, ast2,
        "Round-trip changed the tree.\n  Input:    {sql}\n  Rendered: {rendered1}"
    );
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {sql}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
}
