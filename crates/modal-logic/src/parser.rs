//! Parser: recursive descent over the lexer's token stream.
//!
//! One method per precedence level, loosest first. Binary levels fold
//! left-to-right, so `a -> b -> c` parses as `(a -> b) -> c`.

use crate::error::{Result, SyntaxError};
use crate::formula::{Formula, Modality};
use crate::lexer::{Lexer, Token, TokenKind};

/// Maximum height of a parsed formula tree, leaves included.
///
/// Applies to binary chains as well as prefix and parenthesis nesting, so
/// `p & p & ... & p` is bounded the same way as `~~...~p`.
pub const MAX_NESTING: usize = 256;

/// A subtree and its height.
type Node = (Formula, usize);

/// Parser for modal formulas.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Parse formula text into a [`Formula`].
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] naming the offending token and its position.
    pub fn parse(input: &str) -> Result<Formula> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Self {
            tokens,
            pos: 0,
            depth: 0,
        };

        if parser.check(TokenKind::Eof) {
            return Err(SyntaxError::Empty);
        }

        let (formula, _) = parser.parse_iff()?;
        if !parser.check(TokenKind::Eof) {
            return Err(parser.unexpected("an operator or end of input"));
        }
        Ok(formula)
    }

    fn parse_iff(&mut self) -> Result<Node> {
        let mut left = self.parse_implication()?;
        while self.check(TokenKind::Iff) {
            let op = self.bump();
            let right = self.parse_implication()?;
            left = join(&op, left, right, Formula::iff)?;
        }
        Ok(left)
    }

    fn parse_implication(&mut self) -> Result<Node> {
        let mut left = self.parse_disjunction()?;
        while self.check(TokenKind::Implies) {
            let op = self.bump();
            let right = self.parse_disjunction()?;
            left = join(&op, left, right, Formula::implies)?;
        }
        Ok(left)
    }

    fn parse_disjunction(&mut self) -> Result<Node> {
        let mut left = self.parse_conjunction()?;
        while self.check(TokenKind::Or) {
            let op = self.bump();
            let right = self.parse_conjunction()?;
            left = join(&op, left, right, Formula::or)?;
        }
        Ok(left)
    }

    fn parse_conjunction(&mut self) -> Result<Node> {
        let mut left = self.parse_unary()?;
        while self.check(TokenKind::And) {
            let op = self.bump();
            let right = self.parse_unary()?;
            left = join(&op, left, right, Formula::and)?;
        }
        Ok(left)
    }

    /// Prefix operators: negation and the modal operators.
    fn parse_unary(&mut self) -> Result<Node> {
        self.enter()?;
        let result = self.parse_prefixed();
        self.depth -= 1;
        result
    }

    fn parse_prefixed(&mut self) -> Result<Node> {
        let op = self.peek().clone();
        match op.kind {
            TokenKind::Not => {
                self.advance();
                let inner = self.parse_unary()?;
                wrap(&op, inner, Formula::not)
            }
            TokenKind::LBracket => {
                let modality = self.parse_box_tag()?;
                let inner = self.parse_unary()?;
                wrap(&op, inner, |f| Formula::necessity(modality, f))
            }
            TokenKind::LAngle => {
                let modality = self.parse_diamond_tag()?;
                let inner = self.parse_unary()?;
                wrap(&op, inner, |f| Formula::possibility(modality, f))
            }
            TokenKind::BoxWord => {
                self.advance();
                let modality = self.parse_word_tag()?;
                let inner = self.parse_unary()?;
                wrap(&op, inner, |f| Formula::necessity(modality, f))
            }
            TokenKind::DiamondWord => {
                self.advance();
                let modality = self.parse_word_tag()?;
                let inner = self.parse_unary()?;
                wrap(&op, inner, |f| Formula::possibility(modality, f))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::True => {
                self.advance();
                Ok((Formula::True, 1))
            }
            TokenKind::False => {
                self.advance();
                Ok((Formula::False, 1))
            }
            TokenKind::Ident => {
                self.advance();
                Ok((Formula::Atom(token.text), 1))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_iff()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("a formula")),
        }
    }

    /// `[]` or `[tag]`
    fn parse_box_tag(&mut self) -> Result<Modality> {
        self.expect(TokenKind::LBracket, "'['")?;
        if self.eat(TokenKind::RBracket) {
            return Ok(Modality::default());
        }
        let tag = self.expect(TokenKind::Ident, "a modality tag or ']'")?;
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Modality::new(tag.text))
    }

    /// `<>` or `<tag>`
    fn parse_diamond_tag(&mut self) -> Result<Modality> {
        self.expect(TokenKind::LAngle, "'<'")?;
        if self.eat(TokenKind::RAngle) {
            return Ok(Modality::default());
        }
        let tag = self.expect(TokenKind::Ident, "a modality tag or '>'")?;
        self.expect(TokenKind::RAngle, "'>'")?;
        Ok(Modality::new(tag.text))
    }

    /// Optional `[tag]` after the `box` / `diamond` keywords.
    fn parse_word_tag(&mut self) -> Result<Modality> {
        if self.check(TokenKind::LBracket) {
            self.parse_box_tag()
        } else {
            Ok(Modality::default())
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(too_deep(self.peek()));
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        // tokenize() always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        self.advance();
        token
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if self.check(kind) {
            let token = self.peek().clone();
            self.advance();
            Ok(token)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            SyntaxError::UnexpectedEof {
                expected: expected.to_string(),
                line: token.line,
                col: token.col,
            }
        } else {
            SyntaxError::UnexpectedToken {
                found: token.describe(),
                expected: expected.to_string(),
                line: token.line,
                col: token.col,
            }
        }
    }
}

fn join(
    op: &Token,
    left: Node,
    right: Node,
    build: fn(Formula, Formula) -> Formula,
) -> Result<Node> {
    let height = left.1.max(right.1) + 1;
    if height > MAX_NESTING {
        return Err(too_deep(op));
    }
    Ok((build(left.0, right.0), height))
}

fn wrap(
    op: &Token,
    (inner, height): Node,
    build: impl FnOnce(Formula) -> Formula,
) -> Result<Node> {
    if height + 1 > MAX_NESTING {
        return Err(too_deep(op));
    }
    Ok((build(inner), height + 1))
}

fn too_deep(at: &Token) -> SyntaxError {
    SyntaxError::TooDeep {
        limit: MAX_NESTING,
        line: at.line,
        col: at.col,
    }
}
