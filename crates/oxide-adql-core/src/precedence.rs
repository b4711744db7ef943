//! Operator precedence for the expression grammar.
//!
//! Levels are small integers; a higher level binds tighter. The climbing loop
//! in the parser consults a [`PrecedenceTable`] rather than hard-coding
//! levels, so a grammar variant only has to supply a different table.

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

/// Associativity of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Level and associativity of one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorInfo {
    pub level: u8,
    pub associativity: Associativity,
}

impl OperatorInfo {
    /// Minimum level for the right-hand operand.
    #[must_use]
    pub const fn right_operand_level(&self) -> u8 {
        match self.associativity {
            Associativity::Left => self.level + 1,
            Associativity::Right => self.level,
        }
    }
}

/// A static operator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecedenceTable {
    /// Binary operators. Operators missing here are not parsed.
    pub binary: &'static [(BinaryOp, u8, Associativity)],
    /// Level of prefix NOT.
    pub not_level: u8,
    /// Level of IS NULL, BETWEEN, IN and LIKE. They behave like
    /// left-associative postfix operators.
    pub predicate_level: u8,
    /// Level of prefix `-`, `+` and `~`.
    pub unary_level: u8,
}

impl PrecedenceTable {
    /// The ADQL table.
    pub const ADQL: Self = Self {
        binary: &[
            (BinaryOp::Or, 1, Associativity::Left),
            (BinaryOp::And, 2, Associativity::Left),
            (BinaryOp::Eq, 4, Associativity::Left),
            (BinaryOp::NotEq, 4, Associativity::Left),
            (BinaryOp::Lt, 4, Associativity::Left),
            (BinaryOp::LtEq, 4, Associativity::Left),
            (BinaryOp::Gt, 4, Associativity::Left),
            (BinaryOp::GtEq, 4, Associativity::Left),
            (BinaryOp::Concat, 5, Associativity::Left),
            (BinaryOp::BitOr, 6, Associativity::Left),
            (BinaryOp::BitXor, 7, Associativity::Left),
            (BinaryOp::BitAnd, 8, Associativity::Left),
            (BinaryOp::Add, 9, Associativity::Left),
            (BinaryOp::Sub, 9, Associativity::Left),
            (BinaryOp::Mul, 10, Associativity::Left),
            (BinaryOp::Div, 10, Associativity::Left),
            (BinaryOp::Mod, 10, Associativity::Left),
        ],
        not_level: 3,
        predicate_level: 4,
        unary_level: 11,
    };

    /// Returns the entry for a binary operator.
    #[must_use]
    pub fn binary(&self, op: BinaryOp) -> Option<OperatorInfo> {
        self.binary
            .iter()
            .find(|(candidate, _, _)| *candidate == op)
            .map(|&(_, level, associativity)| OperatorInfo {
                level,
                associativity,
            })
    }

    /// Returns the entry for the binary operator a token denotes.
    #[must_use]
    pub fn infix(&self, kind: TokenKind) -> Option<(BinaryOp, OperatorInfo)> {
        let op = token_to_binary_op(kind)?;
        self.binary(op).map(|info| (op, info))
    }

    /// Tokens of the binary operators binding at `min_level` or tighter.
    pub fn infix_tokens(&self, min_level: u8) -> impl Iterator<Item = TokenKind> + '_ {
        self.binary
            .iter()
            .filter(move |&&(_, level, _)| level >= min_level)
            .map(|&(op, _, _)| binary_op_token(op))
    }

    /// Returns the level at which a prefix operator parses its operand.
    #[must_use]
    pub const fn prefix(&self, op: UnaryOp) -> u8 {
        match op {
            UnaryOp::Not => self.not_level,
            UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitNot => self.unary_level,
        }
    }

    /// Entry used for postfix predicates.
    #[must_use]
    pub const fn predicate(&self) -> OperatorInfo {
        OperatorInfo {
            level: self.predicate_level,
            associativity: Associativity::Left,
        }
    }
}

impl Default for PrecedenceTable {
    fn default() -> Self {
        Self::ADQL
    }
}

/// Converts a token to a binary operator.
#[must_use]
pub const fn token_to_binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
        TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
        TokenKind::Eq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Concat => Some(BinaryOp::Concat),
        TokenKind::BitOr => Some(BinaryOp::BitOr),
        TokenKind::BitXor => Some(BinaryOp::BitXor),
        TokenKind::BitAnd => Some(BinaryOp::BitAnd),
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        _ => None,
    }
}

/// Returns the token that spells a binary operator.
#[must_use]
pub const fn binary_op_token(op: BinaryOp) -> TokenKind {
    match op {
        BinaryOp::Or => TokenKind::Keyword(Keyword::Or),
        BinaryOp::And => TokenKind::Keyword(Keyword::And),
        BinaryOp::Eq => TokenKind::Eq,
        BinaryOp::NotEq => TokenKind::NotEq,
        BinaryOp::Lt => TokenKind::Lt,
        BinaryOp::LtEq => TokenKind::LtEq,
        BinaryOp::Gt => TokenKind::Gt,
        BinaryOp::GtEq => TokenKind::GtEq,
        BinaryOp::Concat => TokenKind::Concat,
        BinaryOp::BitOr => TokenKind::BitOr,
        BinaryOp::BitXor => TokenKind::BitXor,
        BinaryOp::BitAnd => TokenKind::BitAnd,
        BinaryOp::Add => TokenKind::Plus,
        BinaryOp::Sub => TokenKind::Minus,
        BinaryOp::Mul => TokenKind::Star,
        BinaryOp::Div => TokenKind::Slash,
        BinaryOp::Mod => TokenKind::Percent,
    }
}

/// Converts a token to a prefix operator.
#[must_use]
pub const fn token_to_unary_op(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Keyword(Keyword::Not) => Some(UnaryOp::Not),
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::BitNot => Some(UnaryOp::BitNot),
        _ => None,
    }
}
