//! Splits template source into text runs and action tokens.

use super::error::TemplateError;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const TRIM_RIGHT_DELIM: &str = "-}}";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Text(String),
    LeftDelim,
    RightDelim,
    /// `.Name`, without the dot.
    Field(String),
    Ident(String),
    Str(String),
    Int(i64),
    Pipe,
    LeftParen,
    RightParen,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) pos: usize,
}

pub(crate) fn lex(src: &str) -> Result<Vec<Token>, TemplateError> {
    Lexer {
        src,
        pos: 0,
        tokens: Vec::new(),
    }
    .run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Vec<Token>, TemplateError> {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            let Some(offset) = rest.find(LEFT_DELIM) else {
                self.push_text(rest, self.pos);
                break;
            };

            let open = self.pos + offset;
            let mut text = &rest[..offset];
            let mut cursor = open + LEFT_DELIM.len();

            // "{{- " trims whitespace before the action.
            if self.trim_marker_at(cursor) {
                text = text.trim_end();
                cursor += 1;
            }
            self.push_text(text, self.pos);

            let (close, trim_after) = if self.comment_at(cursor) {
                self.skip_comment(open, cursor)?
            } else {
                self.tokens.push(Token {
                    kind: TokenKind::LeftDelim,
                    pos: open,
                });
                self.lex_action(open, cursor)?
            };

            self.pos = close;
            if trim_after {
                let tail = &self.src[self.pos..];
                self.pos += tail.len() - tail.trim_start().len();
            }
        }

        Ok(self.tokens)
    }

    fn push_text(&mut self, text: &str, pos: usize) {
        if !text.is_empty() {
            self.tokens.push(Token {
                kind: TokenKind::Text(text.to_string()),
                pos,
            });
        }
    }

    fn trim_marker_at(&self, at: usize) -> bool {
        let bytes = self.src.as_bytes();
        bytes.get(at) == Some(&b'-')
            && bytes.get(at + 1).is_some_and(|b| b.is_ascii_whitespace())
    }

    fn comment_at(&self, at: usize) -> bool {
        self.src[at..].trim_start().starts_with("/*")
    }

    /// Skips `{{/* ... */}}`, returning the offset after the closing delimiter.
    fn skip_comment(&self, open: usize, cursor: usize) -> Result<(usize, bool), TemplateError> {
        let body = &self.src[cursor..];
        let end = body
            .find("*/")
            .ok_or_else(|| TemplateError::syntax(open, "unclosed comment"))?;

        let after = cursor + end + 2;
        let tail = &self.src[after..];
        let trimmed = tail.trim_start();
        let ws = tail.len() - trimmed.len();

        if ws > 0 && trimmed.starts_with(TRIM_RIGHT_DELIM) {
            Ok((after + ws + TRIM_RIGHT_DELIM.len(), true))
        } else if trimmed.starts_with(RIGHT_DELIM) {
            Ok((after + ws + RIGHT_DELIM.len(), false))
        } else {
            Err(TemplateError::syntax(after, "comment must be the only content of an action"))
        }
    }

    /// Tokenizes one action, returning the offset after `}}` and whether `-}}` was used.
    fn lex_action(
        &mut self,
        open: usize,
        mut cursor: usize,
    ) -> Result<(usize, bool), TemplateError> {
        loop {
            let rest = &self.src[cursor..];
            let Some(c) = rest.chars().next() else {
                return Err(TemplateError::syntax(open, "unclosed action"));
            };

            if c.is_whitespace() {
                let trimmed = rest.trim_start();
                let ws = rest.len() - trimmed.len();
                if trimmed.starts_with(TRIM_RIGHT_DELIM) {
                    self.push(TokenKind::RightDelim, cursor + ws + 1);
                    return Ok((cursor + ws + TRIM_RIGHT_DELIM.len(), true));
                }
                cursor += ws;
                continue;
            }

            if rest.starts_with(RIGHT_DELIM) {
                self.push(TokenKind::RightDelim, cursor);
                return Ok((cursor + RIGHT_DELIM.len(), false));
            }

            let start = cursor;
            match c {
                '|' => {
                    self.push(TokenKind::Pipe, start);
                    cursor += 1;
                }
                '(' => {
                    self.push(TokenKind::LeftParen, start);
                    cursor += 1;
                }
                ')' => {
                    self.push(TokenKind::RightParen, start);
                    cursor += 1;
                }
                '"' => {
                    let (value, len) = lex_quoted(&rest[1..], start)?;
                    self.push(TokenKind::Str(value), start);
                    cursor += 1 + len;
                }
                '`' => {
                    let end = rest[1..]
                        .find('`')
                        .ok_or_else(|| TemplateError::syntax(start, "unterminated raw string"))?;
                    self.push(TokenKind::Str(rest[1..1 + end].to_string()), start);
                    cursor += end + 2;
                }
                '.' => {
                    let name = take_ident(&rest[1..]);
                    if name.is_empty() {
                        return Err(TemplateError::syntax(
                            start,
                            "expected a field name after '.'",
                        ));
                    }
                    self.push(TokenKind::Field(name.to_string()), start);
                    cursor += 1 + name.len();
                }
                c if c.is_ascii_digit() || (c == '-' && starts_with_digit(&rest[1..])) => {
                    let digits_len = 1 + rest[1..]
                        .find(|ch: char| !ch.is_ascii_digit())
                        .unwrap_or(rest.len() - 1);
                    let literal = &rest[..digits_len];
                    let value = literal.parse::<i64>().map_err(|_| {
                        TemplateError::syntax(start, format!("invalid number '{literal}'"))
                    })?;
                    self.push(TokenKind::Int(value), start);
                    cursor += digits_len;
                }
                c if c.is_alphabetic() || c == '_' => {
                    let name = take_ident(rest);
                    self.push(TokenKind::Ident(name.to_string()), start);
                    cursor += name.len();
                }
                other => {
                    return Err(TemplateError::syntax(
                        start,
                        format!("unexpected character {other:?} in action"),
                    ));
                }
            }
        }
    }

    fn push(&mut self, kind: TokenKind, pos: usize) {
        self.tokens.push(Token { kind, pos });
    }
}

fn take_ident(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Reads an interpreted string body (after the opening quote).
/// Returns the decoded value and the number of bytes consumed, closing quote included.
fn lex_quoted(body: &str, start: usize) -> Result<(String, usize), TemplateError> {
    let mut value = String::new();
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, i + 1)),
            '\n' => break,
            '\\' => {
                let escaped = match chars.next() {
                    Some((_, 'n')) => '\n',
                    Some((_, 't')) => '\t',
                    Some((_, 'r')) => '\r',
                    Some((_, '"')) => '"',
                    Some((_, '\\')) => '\\',
                    Some((_, other)) => {
                        return Err(TemplateError::syntax(
                            start,
                            format!("unknown escape sequence '\\{other}'"),
                        ));
                    }
                    None => break,
                };
                value.push(escaped);
            }
            _ => value.push(c),
        }
    }

    Err(TemplateError::syntax(start, "unterminated quoted string"))
}
