//! Expression rules.
//!
//! Binary operators are parsed by precedence climbing over the configured
//! [`PrecedenceTable`](crate::precedence::PrecedenceTable). IS NULL,
//! BETWEEN, IN and LIKE sit in the same loop as postfix operators at the
//! predicate level.

use super::engine::{PResult, Parser};
use super::literal::{parse_integer, unquote_string};
use crate::ast::{DataType, Expr, FunctionCall, GeometryFunction, Ident, Literal};
use crate::lexer::{Keyword, TokenKind};
use crate::precedence::token_to_unary_op;

/// Keywords that continue an operand as a postfix predicate.
const PREDICATE_START: &[TokenKind] = &[
    TokenKind::Keyword(Keyword::Is),
    TokenKind::Keyword(Keyword::Not),
    TokenKind::Keyword(Keyword::Between),
    TokenKind::Keyword(Keyword::In),
    TokenKind::Keyword(Keyword::Like),
    TokenKind::Keyword(Keyword::Ilike),
];

/// Tokens that can start an expression.
const EXPR_START: &[TokenKind] = &[
    TokenKind::Keyword(Keyword::Not),
    TokenKind::Keyword(Keyword::True),
    TokenKind::Keyword(Keyword::False),
    TokenKind::Keyword(Keyword::Null),
    TokenKind::Keyword(Keyword::Exists),
    TokenKind::Keyword(Keyword::Case),
    TokenKind::Keyword(Keyword::Cast),
    TokenKind::Keyword(Keyword::Count),
    TokenKind::Keyword(Keyword::Sum),
    TokenKind::Keyword(Keyword::Avg),
    TokenKind::Keyword(Keyword::Min),
    TokenKind::Keyword(Keyword::Max),
    TokenKind::Identifier,
    TokenKind::DelimitedIdentifier,
    TokenKind::Integer,
    TokenKind::Real,
    TokenKind::String,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::BitNot,
    TokenKind::LeftParen,
];

/// Tokens that can start a CAST target type.
const DATA_TYPE_START: &[TokenKind] = &[
    TokenKind::Keyword(Keyword::Smallint),
    TokenKind::Keyword(Keyword::Integer),
    TokenKind::Keyword(Keyword::Bigint),
    TokenKind::Keyword(Keyword::Real),
    TokenKind::Keyword(Keyword::Double),
    TokenKind::Keyword(Keyword::Char),
    TokenKind::Keyword(Keyword::Varchar),
    TokenKind::Keyword(Keyword::Timestamp),
    TokenKind::Identifier,
];

const fn is_predicate_keyword(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Keyword(Keyword::Between | Keyword::In | Keyword::Like | Keyword::Ilike)
    )
}

impl Parser {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns the deepest failure if no expression starts here.
    pub fn parse_expression(&mut self) -> PResult<Expr> {
        self.rule("expression", |p| p.climb(0))
    }

    /// Parses operators binding at `min_level` or tighter. Each call is one
    /// nesting level.
    fn climb(&mut self, min_level: u8) -> PResult<Expr> {
        self.nested(|p| p.operator_chain(min_level))
    }

    fn operator_chain(&mut self, min_level: u8) -> PResult<Expr> {
        let table = self.config.precedence;
        let mut lhs = self.parse_prefix()?;
        loop {
            if self.at_predicate() {
                let info = table.predicate();
                if info.level < min_level {
                    break;
                }
                lhs = self.parse_predicate(lhs, info.right_operand_level())?;
                continue;
            }

            let Some((op, info)) = table.infix(self.peek_kind(0)) else {
                self.note_continuations(min_level);
                break;
            };
            if info.level < min_level {
                break;
            }
            self.advance();
            let rhs = self.climb(info.right_operand_level())?;
            lhs = lhs.binary(op, rhs);
        }
        Ok(lhs)
    }

    /// Records the operators that could have extended the operand here.
    fn note_continuations(&mut self, min_level: u8) {
        let table = self.config.precedence;
        for kind in table.infix_tokens(min_level) {
            self.note(kind);
        }
        if table.predicate_level >= min_level {
            for &kind in PREDICATE_START {
                self.note(kind);
            }
        }
    }

    fn parse_prefix(&mut self) -> PResult<Expr> {
        if let Some(op) = token_to_unary_op(self.peek_kind(0)) {
            self.advance();
            let operand = self.climb(self.config.precedence.prefix(op))?;
            return Ok(Expr::unary(op, operand));
        }
        self.parse_primary()
    }

    fn at_predicate(&self) -> bool {
        match self.peek_kind(0) {
            TokenKind::Keyword(Keyword::Is) => true,
            TokenKind::Keyword(Keyword::Not) => is_predicate_keyword(self.peek_kind(1)),
            kind => is_predicate_keyword(kind),
        }
    }

    /// Parses the postfix part of a predicate applied to `lhs`. Operands
    /// bind at `operand_level` or tighter.
    fn parse_predicate(&mut self, lhs: Expr, operand_level: u8) -> PResult<Expr> {
        let expr = Box::new(lhs);
        if self.eat_keyword(Keyword::Is) {
            let negated = self.eat_keyword(Keyword::Not);
            self.expect_keyword(Keyword::Null)?;
            return Ok(Expr::IsNull { expr, negated });
        }

        let negated = self.eat_keyword(Keyword::Not);

        if self.eat_keyword(Keyword::Between) {
            let low = self.climb(operand_level)?;
            self.expect_keyword(Keyword::And)?;
            let high = self.climb(operand_level)?;
            return Ok(Expr::Between {
                expr,
                low: Box::new(low),
                high: Box::new(high),
                negated,
            });
        }

        if self.eat_keyword(Keyword::In) {
            self.expect(TokenKind::LeftParen)?;
            if matches!(
                self.peek_kind(0),
                TokenKind::Keyword(Keyword::Select | Keyword::With)
            ) {
                let query = self.parse_query()?;
                self.expect(TokenKind::RightParen)?;
                return Ok(Expr::InSubquery {
                    expr,
                    query: Box::new(query),
                    negated,
                });
            }
            let list = self.one_or_more(TokenKind::Comma, Self::parse_expression)?;
            self.expect(TokenKind::RightParen)?;
            return Ok(Expr::InList {
                expr,
                list,
                negated,
            });
        }

        let case_insensitive = if self.eat_keyword(Keyword::Like) {
            false
        } else if self.eat_keyword(Keyword::Ilike) {
            true
        } else {
            return Err(self.fail());
        };
        let pattern = self.climb(operand_level)?;
        let escape = if self.eat_keyword(Keyword::Escape) {
            Some(Box::new(self.climb(operand_level)?))
        } else {
            None
        };
        Ok(Expr::Like {
            expr,
            pattern: Box::new(pattern),
            escape,
            negated,
            case_insensitive,
        })
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let token = self.peek();
        let kind = token.kind;
        let literal = match kind {
            TokenKind::Integer => parse_integer(&token.lexeme).map(Literal::Integer),
            TokenKind::Real => token
                .lexeme
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Literal::Real),
            TokenKind::String => Some(Literal::String(unquote_string(&token.lexeme))),
            TokenKind::Keyword(Keyword::True) => Some(Literal::Boolean(true)),
            TokenKind::Keyword(Keyword::False) => Some(Literal::Boolean(false)),
            TokenKind::Keyword(Keyword::Null) => Some(Literal::Null),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(Expr::Literal(literal));
        }

        match kind {
            TokenKind::LeftParen => self.parse_parenthesized(),
            TokenKind::Keyword(Keyword::Case) => self.parse_case(),
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast(),
            TokenKind::Keyword(Keyword::Exists) => self.parse_exists(),
            TokenKind::Keyword(
                Keyword::Count | Keyword::Sum | Keyword::Avg | Keyword::Min | Keyword::Max,
            ) => self.parse_aggregate(),
            TokenKind::Identifier | TokenKind::DelimitedIdentifier
                if self.peek_kind(1) == TokenKind::LeftParen =>
            {
                // Geometry names are plain identifiers; the name decides.
                let geometry = (kind == TokenKind::Identifier)
                    .then(|| GeometryFunction::from_name(&self.peek().lexeme))
                    .flatten();
                match geometry {
                    Some(function) => self.parse_geometry_call(function),
                    None => self.parse_function_call(),
                }
            }
            TokenKind::Identifier | TokenKind::DelimitedIdentifier => self.parse_column_ref(),
            _ => Err(self.fail_expecting(EXPR_START)),
        }
    }

    /// `(` opens a subquery or a parenthesized expression. Only when a run
    /// of `(` ends at SELECT or WITH are both possible; then the expression
    /// is tried first.
    fn parse_parenthesized(&mut self) -> PResult<Expr> {
        match self.peek_kind(1) {
            TokenKind::Keyword(Keyword::Select | Keyword::With) => self.parse_scalar_subquery(),
            TokenKind::LeftParen if self.parens_open_query() => self.first_of(&[
                ("parenthesized_expression", Self::parse_paren_expr),
                ("scalar_subquery", Self::parse_scalar_subquery),
            ]),
            _ => self.parse_paren_expr(),
        }
    }

    /// Looks past the run of `(` at the cursor for a query keyword.
    fn parens_open_query(&self) -> bool {
        let mut offset = 0;
        while self.peek_kind(offset) == TokenKind::LeftParen {
            offset += 1;
        }
        matches!(
            self.peek_kind(offset),
            TokenKind::Keyword(Keyword::Select | Keyword::With)
        )
    }

    fn parse_paren_expr(&mut self) -> PResult<Expr> {
        self.rule("parenthesized_expression", |p| {
            p.expect(TokenKind::LeftParen)?;
            let inner = p.parse_expression()?;
            p.expect(TokenKind::RightParen)?;
            Ok(inner.paren())
        })
    }

    fn parse_scalar_subquery(&mut self) -> PResult<Expr> {
        self.rule("scalar_subquery", |p| {
            p.expect(TokenKind::LeftParen)?;
            let query = p.parse_query()?;
            p.expect(TokenKind::RightParen)?;
            Ok(Expr::Subquery(Box::new(query)))
        })
    }

    fn parse_exists(&mut self) -> PResult<Expr> {
        self.rule("exists", |p| {
            p.expect_keyword(Keyword::Exists)?;
            p.expect(TokenKind::LeftParen)?;
            let query = p.parse_query()?;
            p.expect(TokenKind::RightParen)?;
            Ok(Expr::Exists(Box::new(query)))
        })
    }

    fn parse_column_ref(&mut self) -> PResult<Expr> {
        let mut parts = self.one_or_more(TokenKind::Dot, Self::parse_identifier)?;
        let Some(name) = parts.pop() else {
            return Err(self.fail());
        };
        Ok(Expr::Column(crate::ast::ColumnRef {
            qualifier: parts,
            name,
        }))
    }

    fn parse_aggregate(&mut self) -> PResult<Expr> {
        self.rule("aggregate", |p| {
            let Some(keyword) = p.peek().as_keyword() else {
                return Err(p.fail());
            };
            p.advance();
            p.expect(TokenKind::LeftParen)?;
            let name = Ident::new(keyword.as_str());

            if keyword == Keyword::Count && p.eat(TokenKind::Star) {
                p.expect(TokenKind::RightParen)?;
                return Ok(Expr::Function(FunctionCall {
                    name,
                    args: vec![Expr::Wildcard {
                        qualifier: Vec::new(),
                    }],
                    distinct: false,
                }));
            }

            let distinct = if p.eat_keyword(Keyword::Distinct) {
                true
            } else {
                p.eat_keyword(Keyword::All);
                false
            };
            let arg = p.parse_expression()?;
            p.expect(TokenKind::RightParen)?;
            Ok(Expr::Function(FunctionCall {
                name,
                args: vec![arg],
                distinct,
            }))
        })
    }

    fn parse_function_call(&mut self) -> PResult<Expr> {
        self.rule("function_call", |p| {
            let name = p.parse_identifier()?;
            p.expect(TokenKind::LeftParen)?;
            let args = if p.check(TokenKind::RightParen) {
                Vec::new()
            } else {
                p.one_or_more(TokenKind::Comma, Self::parse_expression)?
            };
            p.expect(TokenKind::RightParen)?;
            Ok(Expr::Function(FunctionCall {
                name,
                args,
                distinct: false,
            }))
        })
    }

    /// Parses a geometry call, enforcing the function's argument count: a
    /// missing argument fails expecting `,` and a surplus one fails
    /// expecting `)`.
    fn parse_geometry_call(&mut self, function: GeometryFunction) -> PResult<Expr> {
        self.rule("geometry", |p| {
            p.advance();
            p.expect(TokenKind::LeftParen)?;
            let mut args = Vec::new();
            loop {
                args.push(p.parse_expression()?);
                let count = args.len();
                if function.needs_more(count) {
                    p.expect(TokenKind::Comma)?;
                } else if !(function.accepts_more(count) && p.eat(TokenKind::Comma)) {
                    p.expect(TokenKind::RightParen)?;
                    break;
                }
            }
            Ok(Expr::geometry(function, args))
        })
    }

    fn parse_case(&mut self) -> PResult<Expr> {
        self.rule("case", |p| {
            p.expect_keyword(Keyword::Case)?;
            let operand = if p.check_keyword(Keyword::When) {
                None
            } else {
                Some(Box::new(p.parse_expression()?))
            };

            p.expect_keyword(Keyword::When)?;
            let mut when_clauses = Vec::new();
            loop {
                let condition = p.parse_expression()?;
                p.expect_keyword(Keyword::Then)?;
                let result = p.parse_expression()?;
                when_clauses.push((condition, result));
                if !p.eat_keyword(Keyword::When) {
                    break;
                }
            }

            let else_clause = if p.eat_keyword(Keyword::Else) {
                Some(Box::new(p.parse_expression()?))
            } else {
                None
            };
            p.expect_keyword(Keyword::End)?;
            Ok(Expr::Case {
                operand,
                when_clauses,
                else_clause,
            })
        })
    }

    fn parse_cast(&mut self) -> PResult<Expr> {
        self.rule("cast", |p| {
            p.expect_keyword(Keyword::Cast)?;
            p.expect(TokenKind::LeftParen)?;
            let expr = p.parse_expression()?;
            p.expect_keyword(Keyword::As)?;
            let data_type = p.parse_data_type()?;
            p.expect(TokenKind::RightParen)?;
            Ok(Expr::Cast {
                expr: Box::new(expr),
                data_type,
            })
        })
    }

    /// Parses a CAST target type.
    ///
    /// # Errors
    ///
    /// Fails if the tokens do not name a supported type.
    pub fn parse_data_type(&mut self) -> PResult<DataType> {
        self.rule("data_type", |p| {
            let data_type = match p.peek_kind(0) {
                TokenKind::Keyword(Keyword::Smallint) => DataType::Smallint,
                TokenKind::Keyword(Keyword::Integer) => DataType::Integer,
                TokenKind::Keyword(Keyword::Bigint) => DataType::Bigint,
                TokenKind::Keyword(Keyword::Real) => DataType::Real,
                TokenKind::Keyword(Keyword::Timestamp) => DataType::Timestamp,
                TokenKind::Keyword(Keyword::Double) => {
                    p.advance();
                    p.expect_keyword(Keyword::Precision)?;
                    return Ok(DataType::Double);
                }
                TokenKind::Keyword(Keyword::Char) => {
                    p.advance();
                    return Ok(DataType::Char(p.parse_type_length()?));
                }
                TokenKind::Keyword(Keyword::Varchar) => {
                    p.advance();
                    return Ok(DataType::Varchar(p.parse_type_length()?));
                }
                TokenKind::Identifier => match p.peek().lexeme.to_ascii_uppercase().as_str() {
                    "POINT" => DataType::Point,
                    "CIRCLE" => DataType::Circle,
                    "POLYGON" => DataType::Polygon,
                    _ => return Err(p.fail_expecting(DATA_TYPE_START)),
                },
                _ => return Err(p.fail_expecting(DATA_TYPE_START)),
            };
            p.advance();
            Ok(data_type)
        })
    }

    fn parse_type_length(&mut self) -> PResult<Option<u32>> {
        if !self.eat(TokenKind::LeftParen) {
            return Ok(None);
        }
        if !self.check(TokenKind::Integer) {
            return Err(self.fail());
        }
        let Some(length) = parse_integer(&self.peek().lexeme).and_then(|n| u32::try_from(n).ok())
        else {
            return Err(self.fail_expecting(&[TokenKind::Integer]));
        };
        self.advance();
        self.expect(TokenKind::RightParen)?;
        Ok(Some(length))
    }
}
