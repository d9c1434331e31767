//! Tokenizer for `.zed` schema source.
//!
//! Newlines are not significant and are dropped. Comments are not tokens
//! either: they are attached to the next significant token so the parser can
//! turn them into doc comments on the definition or relation that follows.
//! Consecutive `//` lines form a single comment.

use crate::errors::{ZedmapError, ZedmapResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword, including `prefix/name` paths.
    Ident(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Semicolon,
    Pipe,
    Hash,
    Star,
    Equals,
    Plus,
    Amp,
    Minus,
    Arrow,
    Ellipsis,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(s) => format!("`{s}`"),
            Self::LBrace => "`{`".into(),
            Self::RBrace => "`}`".into(),
            Self::LParen => "`(`".into(),
            Self::RParen => "`)`".into(),
            Self::Colon => "`:`".into(),
            Self::Semicolon => "`;`".into(),
            Self::Pipe => "`|`".into(),
            Self::Hash => "`#`".into(),
            Self::Star => "`*`".into(),
            Self::Equals => "`=`".into(),
            Self::Plus => "`+`".into(),
            Self::Amp => "`&`".into(),
            Self::Minus => "`-`".into(),
            Self::Arrow => "`->`".into(),
            Self::Ellipsis => "`...`".into(),
            Self::Eof => "end of input".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    /// Raw comment blocks (delimiters included) preceding this token.
    pub comments: Vec<String>,
}

struct Lexer<'a> {
    source_name: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CommentStyle {
    Line,
    Block,
}

/// Tokenize `source`. The returned vector always ends with `TokenKind::Eof`.
pub fn tokenize(source_name: &str, source: &str) -> ZedmapResult<Vec<Token>> {
    let mut lx = Lexer {
        source_name,
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    };

    let mut tokens = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    // Style and end line of the last pending comment, for merging `//` runs.
    let mut last_comment: Option<(CommentStyle, usize)> = None;

    loop {
        lx.skip_whitespace();

        let (line, column) = (lx.line, lx.column);
        let Some(c) = lx.peek() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                column,
                comments: pending,
            });
            return Ok(tokens);
        };

        if c == '/' && lx.peek_at(1) == Some('/') {
            let text = lx.line_comment();
            match (last_comment, pending.last_mut()) {
                (Some((CommentStyle::Line, end)), Some(prev)) if end + 1 == line => {
                    prev.push('\n');
                    prev.push_str(&text);
                }
                _ => pending.push(text),
            }
            last_comment = Some((CommentStyle::Line, line));
            continue;
        }

        if c == '/' && lx.peek_at(1) == Some('*') {
            let text = lx.block_comment(line, column)?;
            pending.push(text);
            last_comment = Some((CommentStyle::Block, lx.line));
            continue;
        }

        let kind = lx.next_token(line, column)?;
        tokens.push(Token {
            kind,
            line,
            column,
            comments: std::mem::take(&mut pending),
        });
        last_comment = None;
    }
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> ZedmapError {
        ZedmapError::compile(self.source_name, line, column, message)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn line_comment(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        text.trim_end_matches('\r').to_string()
    }

    fn block_comment(&mut self, line: usize, column: usize) -> ZedmapResult<String> {
        let mut text = String::new();
        // Opening `/*`.
        text.extend(self.bump());
        text.extend(self.bump());

        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    text.push('*');
                    text.extend(self.bump());
                    return Ok(text);
                }
                Some(c) => text.push(c),
                None => return Err(self.error(line, column, "unterminated block comment")),
            }
        }
    }

    fn next_token(&mut self, line: usize, column: usize) -> ZedmapResult<TokenKind> {
        let Some(c) = self.bump() else {
            return Ok(TokenKind::Eof);
        };

        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '|' => TokenKind::Pipe,
            '#' => TokenKind::Hash,
            '*' => TokenKind::Star,
            '=' => TokenKind::Equals,
            '+' => TokenKind::Plus,
            '&' => TokenKind::Amp,
            '-' if self.peek() == Some('>') => {
                self.bump();
                TokenKind::Arrow
            }
            '-' => TokenKind::Minus,
            '.' if self.peek() == Some('.') && self.peek_at(1) == Some('.') => {
                self.bump();
                self.bump();
                TokenKind::Ellipsis
            }
            c if c.is_ascii_alphabetic() || c == '_' => TokenKind::Ident(self.ident(c)),
            other => {
                return Err(self.error(line, column, format!("unexpected character `{other}`")))
            }
        };

        Ok(kind)
    }

    fn ident(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(c) = self.peek() {
            let path_sep = c == '/'
                && matches!(self.peek_at(1), Some(n) if n.is_ascii_alphanumeric() || n == '_');
            if c.is_ascii_alphanumeric() || c == '_' || path_sep {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        s
    }
}
