//! Builds the template tree from lexer tokens.
//!
//! Field and function names are resolved here, against [`Field`] and the
//! [`Function`] registry, so a template that parses can only ever touch
//! the closed set of symbols this crate exposes.

use std::iter::Peekable;
use std::vec::IntoIter;

use super::error::{TemplateError, TemplateErrorKind};
use super::funcs::Function;
use super::lexer::{Token, TokenKind};
use crate::context::Field;

/// Deepest allowed nesting of `if` blocks and parenthesized pipelines.
pub(crate) const MAX_NESTING_DEPTH: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Action(Pipeline),
    If {
        branches: Vec<(Pipeline, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pipeline {
    pub(crate) commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Command {
    pub(crate) operands: Vec<Operand>,
    pub(crate) pos: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Field(Field),
    Function(Function, usize),
    Str(String),
    Int(i64),
    Bool(bool),
    Pipeline(Box<Pipeline>),
}

enum Terminator {
    Else(usize),
    End(usize),
}

pub(crate) fn parse(tokens: Vec<Token>, src_len: usize) -> Result<Vec<Node>, TemplateError> {
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        src_len,
        depth: 0,
    };

    match parser.parse_nodes()? {
        (nodes, None) => Ok(nodes),
        (_, Some(Terminator::Else(pos))) => Err(TemplateError::syntax(pos, "unexpected {{else}}")),
        (_, Some(Terminator::End(pos))) => Err(TemplateError::syntax(pos, "unexpected {{end}}")),
    }
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    src_len: usize,
    depth: usize,
}

impl Parser {
    fn parse_nodes(&mut self) -> Result<(Vec<Node>, Option<Terminator>), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            match token.kind {
                TokenKind::Text(text) => nodes.push(Node::Text(text)),
                TokenKind::LeftDelim => match self.peek_ident().map(str::to_owned).as_deref() {
                    Some("if") => {
                        self.tokens.next();
                        self.enter(token.pos)?;
                        nodes.push(self.parse_if(token.pos)?);
                        self.leave();
                    }
                    Some("else") => {
                        self.tokens.next();
                        return Ok((nodes, Some(Terminator::Else(token.pos))));
                    }
                    Some("end") => {
                        self.tokens.next();
                        self.expect_right_delim()?;
                        return Ok((nodes, Some(Terminator::End(token.pos))));
                    }
                    _ => {
                        let pipeline = self.parse_pipeline(token.pos)?;
                        self.expect_right_delim()?;
                        nodes.push(Node::Action(pipeline));
                    }
                },
                other => {
                    return Err(TemplateError::syntax(
                        token.pos,
                        format!("unexpected {other:?} outside action"),
                    ));
                }
            }
        }

        Ok((nodes, None))
    }

    /// Parses everything after `{{ if`, through the matching `{{ end }}`.
    fn parse_if(&mut self, open: usize) -> Result<Node, TemplateError> {
        let mut branches = Vec::new();
        let mut condition = self.parse_pipeline(open)?;
        self.expect_right_delim()?;

        loop {
            let (body, terminator) = self.parse_nodes()?;
            branches.push((condition, body));

            match terminator {
                Some(Terminator::End(_)) => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    });
                }
                Some(Terminator::Else(pos)) => {
                    if self.peek_ident() == Some("if") {
                        self.tokens.next();
                        condition = self.parse_pipeline(pos)?;
                        self.expect_right_delim()?;
                        continue;
                    }

                    self.expect_right_delim()?;
                    let (otherwise, terminator) = self.parse_nodes()?;
                    return match terminator {
                        Some(Terminator::End(_)) => Ok(Node::If { branches, otherwise }),
                        Some(Terminator::Else(pos)) => {
                            Err(TemplateError::syntax(pos, "{{else}} after final {{else}}"))
                        }
                        None => Err(self.missing_end(open)),
                    };
                }
                None => return Err(self.missing_end(open)),
            }
        }
    }

    fn parse_pipeline(&mut self, open: usize) -> Result<Pipeline, TemplateError> {
        let mut commands = vec![self.parse_command(open)?];

        while self.peek_kind() == Some(&TokenKind::Pipe) {
            let pipe = self.tokens.next().map_or(self.src_len, |t| t.pos);
            commands.push(self.parse_command(pipe)?);
        }

        Ok(Pipeline { commands })
    }

    fn parse_command(&mut self, open: usize) -> Result<Command, TemplateError> {
        let pos = self.tokens.peek().map_or(self.src_len, |t| t.pos);
        let mut operands = Vec::new();

        loop {
            match self.peek_kind() {
                None
                | Some(TokenKind::Pipe)
                | Some(TokenKind::RightDelim)
                | Some(TokenKind::RightParen) => break,
                _ => {}
            }

            let Some(token) = self.tokens.next() else {
                break;
            };
            operands.push(self.parse_operand(token)?);
        }

        if operands.is_empty() {
            return Err(TemplateError::syntax(open, "missing value for command"));
        }

        Ok(Command { operands, pos })
    }

    fn parse_operand(&mut self, token: Token) -> Result<Operand, TemplateError> {
        match token.kind {
            TokenKind::Field(name) => Field::lookup(&name).map(Operand::Field).ok_or_else(|| {
                TemplateError::new(
                    TemplateErrorKind::UndefinedField,
                    format!("can't evaluate field {name}"),
                )
                .at(token.pos)
            }),
            TokenKind::Ident(name) => match name.as_str() {
                "true" => Ok(Operand::Bool(true)),
                "false" => Ok(Operand::Bool(false)),
                "if" | "else" | "end" => Err(TemplateError::syntax(
                    token.pos,
                    format!("unexpected keyword '{name}' in command"),
                )),
                _ => Function::lookup(&name)
                    .map(|f| Operand::Function(f, token.pos))
                    .ok_or_else(|| {
                        TemplateError::new(
                            TemplateErrorKind::UndefinedFunction,
                            format!("function \"{name}\" not defined"),
                        )
                        .at(token.pos)
                    }),
            },
            TokenKind::Str(value) => Ok(Operand::Str(value)),
            TokenKind::Int(value) => Ok(Operand::Int(value)),
            TokenKind::LeftParen => {
                self.enter(token.pos)?;
                let inner = self.parse_pipeline(token.pos)?;
                self.leave();
                match self.tokens.next() {
                    Some(Token {
                        kind: TokenKind::RightParen,
                        ..
                    }) => Ok(Operand::Pipeline(Box::new(inner))),
                    Some(other) => Err(TemplateError::syntax(other.pos, "expected ')'")),
                    None => Err(TemplateError::syntax(token.pos, "unclosed '('")),
                }
            }
            other => Err(TemplateError::syntax(
                token.pos,
                format!("unexpected {other:?} in command"),
            )),
        }
    }

    fn expect_right_delim(&mut self) -> Result<(), TemplateError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::RightDelim,
                ..
            }) => Ok(()),
            Some(token) => Err(TemplateError::syntax(
                token.pos,
                format!("expected '}}}}', found {:?}", token.kind),
            )),
            None => Err(TemplateError::syntax(self.src_len, "unclosed action")),
        }
    }

    fn enter(&mut self, pos: usize) -> Result<(), TemplateError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(TemplateError::syntax(pos, "template nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn missing_end(&self, open: usize) -> TemplateError {
        TemplateError::syntax(open, "{{if}} without matching {{end}}")
    }

    fn peek_kind(&mut self) -> Option<&TokenKind> {
        self.tokens.peek().map(|t| &t.kind)
    }

    fn peek_ident(&mut self) -> Option<&str> {
        match self.peek_kind() {
            Some(TokenKind::Ident(name)) => Some(name.as_str()),
            _ => None,
        }
    }
}
