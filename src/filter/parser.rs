// ABOUTME: Recursive-descent parser turning filter tokens into an Expr tree.
// ABOUTME: Precedence from loosest: or, and, not, comparison / membership.

use super::expr::{CompareOp, Expr};
use super::lexer::{Token, TokenKind, tokenize};
use crate::error::FilterError;
use crate::table::CellValue;

/// Deepest nesting of parentheses and `not` accepted.
const MAX_DEPTH: usize = 256;

/// Most operators accepted in one expression. Long `and`/`or` chains build
/// trees as deep as they are long, and evaluation recurses through them.
const MAX_OPERATORS: usize = 1024;

/// Parse a filter expression such as `age > 25 and city == "Oslo"`.
pub fn parse(input: &str) -> Result<Expr, FilterError> {
    let tokens = tokenize(input)?;
    if tokens.len() == 1 {
        return Err(FilterError::Syntax {
            offset: 0,
            message: "empty expression".into(),
        });
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        operators: 0,
    };
    let expr = parser.or_expr()?;
    match parser.peek() {
        TokenKind::Eof => Ok(expr),
        _ => Err(parser.error("unexpected token after expression")),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    operators: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_next(&self) -> &TokenKind {
        let next = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[next].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: &str) -> FilterError {
        FilterError::Syntax {
            offset: self.tokens[self.pos].offset,
            message: message.to_string(),
        }
    }

    fn enter(&mut self) -> Result<(), FilterError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn operator(&mut self) -> Result<(), FilterError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(self.error("expression has too many operators"));
        }
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<(), FilterError> {
        if *self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn or_expr(&mut self) -> Result<Expr, FilterError> {
        let mut expr = self.and_expr()?;
        while *self.peek() == TokenKind::Or {
            self.advance();
            self.operator()?;
            let right = self.and_expr()?;
            expr = Expr::Or(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<Expr, FilterError> {
        let mut expr = self.not_expr()?;
        while *self.peek() == TokenKind::And {
            self.advance();
            self.operator()?;
            let right = self.not_expr()?;
            expr = Expr::And(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn not_expr(&mut self) -> Result<Expr, FilterError> {
        if *self.peek() == TokenKind::Not {
            self.advance();
            self.operator()?;
            self.enter()?;
            let inner = self.not_expr()?;
            self.leave();
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, FilterError> {
        let first = self.operand()?;

        if *self.peek() == TokenKind::In {
            self.advance();
            return self.membership(first, false);
        }
        if *self.peek() == TokenKind::Not && *self.peek_next() == TokenKind::In {
            self.advance();
            self.advance();
            return self.membership(first, true);
        }

        // `a < b < c` is `a < b and b < c`.
        let mut chain: Option<Expr> = None;
        let mut left = first;
        while let Some(op) = compare_op(self.peek()) {
            self.advance();
            self.operator()?;
            let right = self.operand()?;
            let link = Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right.clone()),
            };
            chain = Some(match chain {
                Some(prev) => Expr::And(Box::new(prev), Box::new(link)),
                None => link,
            });
            left = right;
        }

        Ok(chain.unwrap_or(left))
    }

    fn membership(&mut self, operand: Expr, negated: bool) -> Result<Expr, FilterError> {
        self.operator()?;
        self.expect(TokenKind::LBracket, "expected '[' after 'in'")?;
        let mut values = Vec::new();
        if *self.peek() != TokenKind::RBracket {
            loop {
                let token = self.advance();
                match literal(&token.kind) {
                    Some(value) => values.push(value),
                    None => {
                        return Err(FilterError::Syntax {
                            offset: token.offset,
                            message: "list items must be literals".into(),
                        });
                    }
                }
                if *self.peek() == TokenKind::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket, "expected ']' to close list")?;

        Ok(Expr::In {
            operand: Box::new(operand),
            values,
            negated,
        })
    }

    fn operand(&mut self) -> Result<Expr, FilterError> {
        if let Some(value) = literal(self.peek()) {
            self.advance();
            return Ok(Expr::Literal(value));
        }

        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Column(name))
            }
            TokenKind::LParen => {
                self.advance();
                self.enter()?;
                let inner = self.or_expr()?;
                self.expect(TokenKind::RParen, "expected ')'")?;
                self.leave();
                Ok(inner)
            }
            TokenKind::Eof => Err(self.error("unexpected end of expression")),
            _ => Err(self.error("expected a column, literal, or '('")),
        }
    }
}

fn compare_op(kind: &TokenKind) -> Option<CompareOp> {
    match kind {
        TokenKind::Eq => Some(CompareOp::Eq),
        TokenKind::Ne => Some(CompareOp::Ne),
        TokenKind::Lt => Some(CompareOp::Lt),
        TokenKind::Le => Some(CompareOp::Le),
        TokenKind::Gt => Some(CompareOp::Gt),
        TokenKind::Ge => Some(CompareOp::Ge),
        _ => None,
    }
}

fn literal(kind: &TokenKind) -> Option<CellValue> {
    match kind {
        TokenKind::Str(s) => Some(CellValue::Text(s.clone())),
        TokenKind::Int(i) => Some(CellValue::Int(*i)),
        TokenKind::Float(f) => Some(CellValue::Float(*f)),
        TokenKind::True => Some(CellValue::Bool(true)),
        TokenKind::False => Some(CellValue::Bool(false)),
        _ => None,
    }
}
