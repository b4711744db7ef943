//! Query-level rules: WITH, set operations, SELECT specifications and the
//! FROM clause.

use super::engine::{PResult, Parser};
use super::literal::parse_integer;
use crate::ast::{
    CommonTableExpr, Expr, Ident, Join, JoinConstraint, JoinType, OrderBy, OrderDirection, Query,
    QueryBody, QuerySpec, SelectItem, SetOperator, TableName, TableRef,
};
use crate::lexer::{Keyword, TokenKind};

/// Tokens that start a clause after the select list.
const CLAUSE_SYNC: &[TokenKind] = &[
    TokenKind::Keyword(Keyword::Where),
    TokenKind::Keyword(Keyword::Group),
    TokenKind::Keyword(Keyword::Having),
    TokenKind::Keyword(Keyword::Order),
    TokenKind::Keyword(Keyword::Offset),
    TokenKind::Keyword(Keyword::Union),
    TokenKind::Keyword(Keyword::Except),
    TokenKind::Keyword(Keyword::Intersect),
    TokenKind::Semicolon,
    TokenKind::Eof,
];

/// Tokens that end a select item.
const SELECT_ITEM_SYNC: &[TokenKind] = &[
    TokenKind::Comma,
    TokenKind::Keyword(Keyword::From),
    TokenKind::Keyword(Keyword::Where),
    TokenKind::Keyword(Keyword::Group),
    TokenKind::Keyword(Keyword::Having),
    TokenKind::Keyword(Keyword::Order),
    TokenKind::Keyword(Keyword::Offset),
    TokenKind::Semicolon,
    TokenKind::Eof,
];

impl Parser {
    /// Parses a query: `[WITH ...] body [ORDER BY ...] [OFFSET n]`.
    ///
    /// # Errors
    ///
    /// Returns the deepest failure if the tokens do not form a query.
    pub fn parse_query(&mut self) -> PResult<Query> {
        self.query_depth += 1;
        let result = self.rule("query", Self::query);
        self.query_depth -= 1;
        result
    }

    fn query(&mut self) -> PResult<Query> {
        let with = if self.eat_keyword(Keyword::With) {
            self.one_or_more(TokenKind::Comma, Self::parse_common_table_expr)?
        } else {
            Vec::new()
        };

        let body = self.parse_query_body()?;

        let order_by = if self.eat_keyword(Keyword::Order) {
            self.clause(CLAUSE_SYNC, |p| {
                p.expect_keyword(Keyword::By)?;
                p.one_or_more(TokenKind::Comma, Self::parse_sort_key)
            })?
            .unwrap_or_default()
        } else {
            Vec::new()
        };

        let offset = if self.eat_keyword(Keyword::Offset) {
            self.clause(CLAUSE_SYNC, Self::parse_unsigned_integer)?
        } else {
            None
        };

        // A lone specification owns its ORDER BY and OFFSET.
        Ok(match body {
            QueryBody::Spec(mut spec) => {
                spec.order_by = order_by;
                spec.offset = offset;
                Query {
                    with,
                    body: QueryBody::Spec(spec),
                    order_by: Vec::new(),
                    offset: None,
                }
            }
            body => Query {
                with,
                body,
                order_by,
                offset,
            },
        })
    }

    /// Parses query terms joined by UNION, EXCEPT and INTERSECT.
    ///
    /// # Errors
    ///
    /// Fails if a term is malformed or an operator has no right operand.
    pub fn parse_query_body(&mut self) -> PResult<QueryBody> {
        self.rule("query_body", |p| p.set_operation(0))
    }

    fn set_operation(&mut self, min_level: u8) -> PResult<QueryBody> {
        let mut left = self.parse_query_term()?;
        loop {
            let op = if self.check_keyword(Keyword::Union) {
                SetOperator::Union
            } else if self.check_keyword(Keyword::Except) {
                SetOperator::Except
            } else if self.check_keyword(Keyword::Intersect) {
                SetOperator::Intersect
            } else {
                break;
            };
            let level = op.precedence();
            if level < min_level {
                break;
            }
            self.advance();
            let all = self.eat_keyword(Keyword::All);
            let right = self.set_operation(level + 1)?;
            left = QueryBody::SetOperation {
                op,
                all,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_query_term(&mut self) -> PResult<QueryBody> {
        self.rule("query_term", |p| {
            if p.check_keyword(Keyword::Select) {
                return Ok(QueryBody::Spec(Box::new(p.parse_query_spec()?)));
            }
            if p.eat(TokenKind::LeftParen) {
                let query = p.parse_query()?;
                p.expect(TokenKind::RightParen)?;
                return Ok(QueryBody::Nested(Box::new(query)));
            }
            Err(p.fail())
        })
    }

    /// Parses `SELECT ... FROM ... [WHERE] [GROUP BY] [HAVING]`.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed clause unless this is the outermost
    /// query and recovery is enabled.
    pub fn parse_query_spec(&mut self) -> PResult<QuerySpec> {
        self.rule("query_spec", Self::query_spec)
    }

    fn query_spec(&mut self) -> PResult<QuerySpec> {
        self.expect_keyword(Keyword::Select)?;

        let distinct = if self.eat_keyword(Keyword::Distinct) {
            true
        } else {
            self.eat_keyword(Keyword::All);
            false
        };

        let top = if self.eat_keyword(Keyword::Top) {
            Some(self.parse_unsigned_integer()?)
        } else {
            None
        };

        let select_list = self.parse_select_list()?;

        let from_clause = self
            .clause(CLAUSE_SYNC, |p| {
                p.expect_keyword(Keyword::From)?;
                p.one_or_more(TokenKind::Comma, Self::parse_table_reference)
            })?
            .unwrap_or_default();

        let where_clause = if self.eat_keyword(Keyword::Where) {
            self.clause(CLAUSE_SYNC, Self::parse_expression)?
        } else {
            None
        };

        let group_by = if self.eat_keyword(Keyword::Group) {
            self.clause(CLAUSE_SYNC, |p| {
                p.expect_keyword(Keyword::By)?;
                p.one_or_more(TokenKind::Comma, Self::parse_expression)
            })?
            .unwrap_or_default()
        } else {
            Vec::new()
        };

        let having = if self.eat_keyword(Keyword::Having) {
            self.clause(CLAUSE_SYNC, Self::parse_expression)?
        } else {
            None
        };

        Ok(QuerySpec {
            distinct,
            top,
            select_list,
            from_clause,
            where_clause,
            group_by,
            having,
            order_by: Vec::new(),
            offset: None,
        })
    }

    /// Parses the select list. In the outermost query a malformed item is
    /// reported, skipped and left out of the list.
    fn parse_select_list(&mut self) -> PResult<Vec<SelectItem>> {
        self.rule("select_list", |p| {
            if p.eat(TokenKind::Star) {
                return Ok(vec![SelectItem::new(Expr::Wildcard {
                    qualifier: Vec::new(),
                })]);
            }
            if !p.can_recover() {
                return p.one_or_more(TokenKind::Comma, Self::parse_select_item);
            }

            let mut items = Vec::new();
            loop {
                match p.parse_select_item() {
                    Ok(item) => items.push(item),
                    Err(fail) => p.recover_from(fail, SELECT_ITEM_SYNC)?,
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            Ok(items)
        })
    }

    /// Parses `qualifier.*` or `expr [[AS] alias]`.
    ///
    /// # Errors
    ///
    /// Fails if neither form matches.
    pub fn parse_select_item(&mut self) -> PResult<SelectItem> {
        self.rule("select_item", |p| {
            if p.peek_kind(0).is_identifier() && p.peek_kind(1) == TokenKind::Dot {
                p.first_of(&[
                    ("qualified_wildcard", Self::qualified_wildcard),
                    ("derived_column", Self::derived_column),
                ])
            } else {
                p.derived_column()
            }
        })
    }

    fn qualified_wildcard(&mut self) -> PResult<SelectItem> {
        let mut qualifier = vec![self.parse_identifier()?];
        loop {
            self.expect(TokenKind::Dot)?;
            if self.eat(TokenKind::Star) {
                return Ok(SelectItem::new(Expr::Wildcard { qualifier }));
            }
            qualifier.push(self.parse_identifier()?);
        }
    }

    fn derived_column(&mut self) -> PResult<SelectItem> {
        let expr = self.parse_expression()?;
        let alias = self.optional("alias", Self::parse_alias)?;
        Ok(SelectItem { expr, alias })
    }

    fn parse_alias(&mut self) -> PResult<Ident> {
        self.eat_keyword(Keyword::As);
        self.parse_identifier()
    }

    /// Parses a regular or delimited identifier.
    pub(super) fn parse_identifier(&mut self) -> PResult<Ident> {
        if self.check(TokenKind::Identifier) {
            return Ok(Ident::new(self.advance().lexeme));
        }
        if self.check(TokenKind::DelimitedIdentifier) {
            let token = self.advance();
            return Ok(Ident::quoted(super::literal::unquote_identifier(&token.lexeme)));
        }
        Err(self.fail())
    }

    /// Parses a FROM item: a table primary followed by any number of joins.
    ///
    /// # Errors
    ///
    /// Fails on a malformed table or join.
    pub fn parse_table_reference(&mut self) -> PResult<TableRef> {
        self.rule("table_reference", |p| {
            let mut left = p.parse_table_primary()?;
            loop {
                let natural = p.eat_keyword(Keyword::Natural);
                let join_type = if !natural && p.eat_keyword(Keyword::Cross) {
                    p.expect_keyword(Keyword::Join)?;
                    JoinType::Cross
                } else if p.eat_keyword(Keyword::Join) {
                    JoinType::Inner
                } else if p.eat_keyword(Keyword::Inner) {
                    p.expect_keyword(Keyword::Join)?;
                    JoinType::Inner
                } else if let Some(outer) = p.outer_join_type() {
                    p.eat_keyword(Keyword::Outer);
                    p.expect_keyword(Keyword::Join)?;
                    outer
                } else if natural {
                    return Err(p.fail());
                } else {
                    break;
                };

                let right = p.parse_table_primary()?;
                let constraint = if natural || join_type == JoinType::Cross {
                    JoinConstraint::None
                } else if p.eat_keyword(Keyword::On) {
                    JoinConstraint::On(p.parse_expression()?)
                } else if p.eat_keyword(Keyword::Using) {
                    p.expect(TokenKind::LeftParen)?;
                    let columns = p.one_or_more(TokenKind::Comma, Self::parse_identifier)?;
                    p.expect(TokenKind::RightParen)?;
                    JoinConstraint::Using(columns)
                } else {
                    return Err(p.fail());
                };

                left = TableRef::Join(Box::new(Join {
                    left,
                    join_type,
                    natural,
                    right,
                    constraint,
                }));
            }
            Ok(left)
        })
    }

    fn outer_join_type(&mut self) -> Option<JoinType> {
        if self.eat_keyword(Keyword::Left) {
            Some(JoinType::Left)
        } else if self.eat_keyword(Keyword::Right) {
            Some(JoinType::Right)
        } else if self.eat_keyword(Keyword::Full) {
            Some(JoinType::Full)
        } else {
            None
        }
    }

    fn parse_table_primary(&mut self) -> PResult<TableRef> {
        self.rule("table_primary", |p| {
            // `((` may open a derived table or a parenthesized join.
            if p.check(TokenKind::LeftParen) {
                return p.first_of(&[
                    ("derived_table", Self::derived_table),
                    ("nested_table", Self::nested_table),
                ]);
            }
            let name = p.parse_table_name()?;
            let alias = p.optional("alias", Self::parse_alias)?;
            Ok(TableRef::Table { name, alias })
        })
    }

    fn derived_table(&mut self) -> PResult<TableRef> {
        self.expect(TokenKind::LeftParen)?;
        let query = self.parse_query()?;
        self.expect(TokenKind::RightParen)?;
        let alias = self.parse_alias()?;
        Ok(TableRef::Subquery {
            query: Box::new(query),
            alias,
        })
    }

    fn nested_table(&mut self) -> PResult<TableRef> {
        self.expect(TokenKind::LeftParen)?;
        let inner = self.parse_table_reference()?;
        self.expect(TokenKind::RightParen)?;
        Ok(TableRef::Nested(Box::new(inner)))
    }

    fn parse_table_name(&mut self) -> PResult<TableName> {
        let mut parts = self.one_or_more(TokenKind::Dot, Self::parse_identifier)?;
        let Some(name) = parts.pop() else {
            return Err(self.fail());
        };
        Ok(TableName {
            qualifier: parts,
            name,
        })
    }

    fn parse_common_table_expr(&mut self) -> PResult<CommonTableExpr> {
        self.rule("common_table_expr", |p| {
            let name = p.parse_identifier()?;
            let columns = if p.eat(TokenKind::LeftParen) {
                let columns = p.one_or_more(TokenKind::Comma, Self::parse_identifier)?;
                p.expect(TokenKind::RightParen)?;
                columns
            } else {
                Vec::new()
            };
            p.expect_keyword(Keyword::As)?;
            p.expect(TokenKind::LeftParen)?;
            let query = p.parse_query()?;
            p.expect(TokenKind::RightParen)?;
            Ok(CommonTableExpr {
                name,
                columns,
                query: Box::new(query),
            })
        })
    }

    /// Parses an ORDER BY key. An ordinal is an integer literal key.
    ///
    /// # Errors
    ///
    /// Fails if the key is not an expression.
    pub fn parse_sort_key(&mut self) -> PResult<OrderBy> {
        self.rule("sort_key", |p| {
            let expr = p.parse_expression()?;
            let direction = if p.eat_keyword(Keyword::Desc) {
                OrderDirection::Desc
            } else {
                p.eat_keyword(Keyword::Asc);
                OrderDirection::Asc
            };
            Ok(OrderBy { expr, direction })
        })
    }

    pub(super) fn parse_unsigned_integer(&mut self) -> PResult<u64> {
        if !self.check(TokenKind::Integer) {
            return Err(self.fail());
        }
        let value = parse_integer(&self.peek().lexeme).and_then(|n| u64::try_from(n).ok());
        match value {
            Some(value) => {
                self.advance();
                Ok(value)
            }
            None => Err(self.fail()),
        }
    }
}
