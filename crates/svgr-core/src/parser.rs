use crate::ast::*;
use crate::tokenizer::*;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Deepest element nesting accepted. Every later stage walks the tree
/// recursively, so this bounds their stack use too.
pub const MAX_DEPTH: usize = 256;

/// Build the markup tree. The document must hold exactly one root element, `<svg>`.
pub fn parse(tokens: Vec<Token>) -> Result<MarkupNode, ParseError> {
    let mut parser = Parser::new(tokens);
    let nodes = parser.parse_nodes(None)?;

    let mut root: Option<MarkupNode> = None;
    for node in nodes {
        match node {
            MarkupChild::Element(element) => {
                if let Some(first) = &root {
                    return Err(ParseError::new(format!(
                        "Expected a single root element, found <{}> after <{}>",
                        element.tag, first.tag
                    )));
                }
                root = Some(element);
            }
            MarkupChild::Text(text) => {
                if !text.trim().is_empty() {
                    return Err(ParseError::new(format!(
                        "Unexpected text outside the root element: {:?}",
                        text.trim()
                    )));
                }
            }
        }
    }

    let root = root.ok_or_else(|| ParseError::new("No root element found"))?;
    if root.tag != "svg" {
        return Err(ParseError::new(format!(
            "Root element must be <svg>, found <{}>",
            root.tag
        )));
    }
    Ok(root)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        if self.pos < self.tokens.len() {
            let token = std::mem::replace(&mut self.tokens[self.pos], Token::Text(String::new()));
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    /// Parse nodes until we hit a closing tag matching `until_close` or EOF.
    fn parse_nodes(&mut self, until_close: Option<&str>) -> Result<Vec<MarkupChild>, ParseError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.peek() {
            match token {
                Token::CloseTag { tag } => {
                    let tag = tag.clone();
                    if let Some(expected) = until_close {
                        if tag == expected {
                            self.next(); // consume the close tag
                            return Ok(nodes);
                        }
                        return Err(ParseError::new(format!(
                            "Unexpected closing tag </{tag}>, expected </{expected}>"
                        )));
                    }
                    return Err(ParseError::new(format!(
                        "Unexpected closing tag </{tag}> with no matching open tag"
                    )));
                }
                _ => {
                    let node = self.parse_node()?;
                    nodes.push(node);
                }
            }
        }

        if let Some(expected) = until_close {
            return Err(ParseError::new(format!(
                "Unclosed element <{expected}>: reached end of input"
            )));
        }

        Ok(nodes)
    }

    fn parse_node(&mut self) -> Result<MarkupChild, ParseError> {
        let token = self
            .next()
            .ok_or_else(|| ParseError::new("Unexpected end of input"))?;

        match token {
            Token::Text(content) => Ok(MarkupChild::Text(content)),
            Token::OpenTag {
                tag,
                attributes,
                self_closing,
            } => {
                let attributes = attributes
                    .into_iter()
                    .map(|a| MarkupAttribute {
                        namespaced: a.name.contains(':'),
                        name: a.name,
                        value: a.value,
                    })
                    .collect();

                let children = if self_closing {
                    vec![]
                } else {
                    self.depth += 1;
                    if self.depth > MAX_DEPTH {
                        return Err(ParseError::new(format!(
                            "Elements nested deeper than {MAX_DEPTH} levels at <{tag}>"
                        )));
                    }
                    let children = self.parse_nodes(Some(&tag))?;
                    self.depth -= 1;
                    children
                };
                Ok(MarkupChild::Element(MarkupNode {
                    tag,
                    attributes,
                    children,
                    self_closing,
                }))
            }
            Token::CloseTag { tag } => Err(ParseError::new(format!("Unexpected closing tag </{tag}>"))),
        }
    }
}
