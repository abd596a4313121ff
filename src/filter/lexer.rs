// ABOUTME: Tokenizer for filter expressions - identifiers, literals, operators.
// ABOUTME: Every token keeps its byte offset so syntax errors can point at it.

use crate::error::FilterError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    True,
    False,
    And,
    Or,
    Not,
    In,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, FilterError> {
    let mut lexer = Lexer {
        input,
        chars: input.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

fn syntax(offset: usize, message: impl Into<String>) -> FilterError {
    FilterError::Syntax {
        offset,
        message: message.into(),
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Lexer<'_> {
    fn next_token(&mut self) -> Result<Token, FilterError> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some((offset, c)) = self.chars.next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset: self.input.len(),
            });
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '&' => TokenKind::And,
            '|' => TokenKind::Or,
            '~' => TokenKind::Not,
            '=' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_none() {
                    return Err(syntax(offset, "expected '==' for comparison"));
                }
                TokenKind::Eq
            }
            '!' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_none() {
                    return Err(syntax(offset, "expected '!=' ('not' negates)"));
                }
                TokenKind::Ne
            }
            '<' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_some() {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_some() {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '"' | '\'' => TokenKind::Str(self.string(offset, c)?),
            '`' => TokenKind::Ident(self.quoted_ident(offset)?),
            '-' => match self.chars.peek() {
                Some((_, d)) if d.is_ascii_digit() => self.number(offset)?,
                _ => return Err(syntax(offset, "arithmetic is not supported")),
            },
            c if c.is_ascii_digit() => self.number(offset)?,
            c if c.is_alphabetic() || c == '_' => self.word(offset),
            other => return Err(syntax(offset, format!("unexpected character '{}'", other))),
        };

        Ok(Token { kind, offset })
    }

    fn string(&mut self, start: usize, quote: char) -> Result<String, FilterError> {
        let mut value = String::new();
        while let Some((offset, c)) = self.chars.next() {
            match c {
                c if c == quote => return Ok(value),
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, c @ ('\\' | '"' | '\''))) => value.push(c),
                    Some((_, c)) => {
                        return Err(syntax(offset, format!("unknown escape '\\{}'", c)));
                    }
                    None => break,
                },
                c => value.push(c),
            }
        }
        Err(syntax(start, "unterminated string literal"))
    }

    fn quoted_ident(&mut self, start: usize) -> Result<String, FilterError> {
        let mut name = String::new();
        for (_, c) in self.chars.by_ref() {
            if c == '`' {
                return Ok(name);
            }
            name.push(c);
        }
        Err(syntax(start, "unterminated `column` reference"))
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, FilterError> {
        let mut end = start + 1;
        let mut is_float = false;

        while let Some((i, c)) = self.chars.next_if(|(_, c)| c.is_ascii_digit()) {
            end = i + c.len_utf8();
        }
        if let Some((i, _)) = self.chars.next_if(|(_, c)| *c == '.') {
            is_float = true;
            end = i + 1;
            while let Some((i, _)) = self.chars.next_if(|(_, c)| c.is_ascii_digit()) {
                end = i + 1;
            }
        }
        if let Some((i, _)) = self.chars.next_if(|(_, c)| *c == 'e' || *c == 'E') {
            is_float = true;
            end = i + 1;
            if let Some((i, _)) = self.chars.next_if(|(_, c)| *c == '+' || *c == '-') {
                end = i + 1;
            }
            let mut has_digits = false;
            while let Some((i, _)) = self.chars.next_if(|(_, c)| c.is_ascii_digit()) {
                end = i + 1;
                has_digits = true;
            }
            if !has_digits {
                return Err(syntax(start, "malformed exponent in number"));
            }
        }

        let text = &self.input[start..end];
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(TokenKind::Int(i));
            }
        }
        text.parse::<f64>()
            .map(TokenKind::Float)
            .map_err(|_| syntax(start, format!("invalid number '{}'", text)))
    }

    fn word(&mut self, start: usize) -> TokenKind {
        let mut end = self.input.len();
        while let Some((i, c)) = self.chars.peek().copied() {
            if c.is_alphanumeric() || c == '_' {
                self.chars.next();
            } else {
                end = i;
                break;
            }
        }

        match &self.input[start..end] {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "in" => TokenKind::In,
            "True" | "true" => TokenKind::True,
            "False" | "false" => TokenKind::False,
            name => TokenKind::Ident(name.to_string()),
        }
    }
}
