use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    OpenTag {
        tag: String,
        attributes: Vec<RawAttribute>,
        self_closing: bool,
    },
    CloseTag {
        tag: String,
    },
    /// Character data with entities already decoded.
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (at byte {offset})")]
pub struct TokenizeError {
    pub message: String,
    pub offset: usize,
}

impl TokenizeError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut chars: &str = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut text_buf = String::new();

    while !chars.is_empty() {
        let offset = input.len() - chars.len();

        // Comments vanish without splitting the surrounding text run
        if let Some(after) = chars.strip_prefix("<!--") {
            let end = after
                .find("-->")
                .ok_or_else(|| TokenizeError::new("unterminated comment", offset))?;
            chars = &after[end + 3..];
            continue;
        }

        if let Some(after) = chars.strip_prefix("<![CDATA[") {
            let end = after
                .find("]]>")
                .ok_or_else(|| TokenizeError::new("unterminated CDATA section", offset))?;
            text_buf.push_str(&after[..end]);
            chars = &after[end + 3..];
            continue;
        }

        if chars.starts_with("<?") {
            let end = chars
                .find("?>")
                .ok_or_else(|| TokenizeError::new("unterminated processing instruction", offset))?;
            chars = &chars[end + 2..];
            continue;
        }

        if chars.starts_with("<!") {
            chars = skip_declaration(chars)
                .ok_or_else(|| TokenizeError::new("unterminated markup declaration", offset))?;
            continue;
        }

        if chars.starts_with('<') {
            let (tag_token, rest) = parse_tag(chars, offset)?;
            flush_text(&mut text_buf, &mut tokens);
            tokens.push(tag_token);
            chars = rest;
            continue;
        }

        let end = chars.find('<').unwrap_or(chars.len());
        text_buf.push_str(&decode_entities(&chars[..end]));
        chars = &chars[end..];
    }

    flush_text(&mut text_buf, &mut tokens);
    Ok(tokens)
}

fn flush_text(buf: &mut String, tokens: &mut Vec<Token>) {
    if !buf.is_empty() {
        tokens.push(Token::Text(std::mem::take(buf)));
    }
}

/// Skip a `<!DOCTYPE ...>` style declaration, including an internal subset in `[...]`.
fn skip_declaration(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut in_string: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate().skip(2) {
        match in_string {
            Some(quote) => {
                if b == quote {
                    in_string = None;
                }
            }
            None => match b {
                b'"' | b'\'' => in_string = Some(b),
                b'[' => depth += 1,
                b']' => depth -= 1,
                b'>' if depth == 0 => return Some(&s[i + 1..]),
                _ => {}
            },
        }
    }
    None
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}

/// Parse an element tag starting with `<`: `<tag ...>`, `<tag ... />` or `</tag>`.
fn parse_tag(s: &str, offset: usize) -> Result<(Token, &str), TokenizeError> {
    let bytes = s.as_bytes();
    let mut pos = 1; // skip `<`
    let is_closing = bytes.get(pos) == Some(&b'/');
    if is_closing {
        pos += 1;
    }

    match bytes.get(pos) {
        Some(&b) if is_name_start(b) => {}
        _ => return Err(TokenizeError::new("expected a tag name after `<`", offset + pos)),
    }

    let tag_start = pos;
    while pos < bytes.len() && is_name_char(bytes[pos]) {
        pos += 1;
    }
    let tag_name = s[tag_start..pos].to_string();

    if is_closing {
        pos = skip_whitespace(bytes, pos);
        if bytes.get(pos) == Some(&b'>') {
            return Ok((Token::CloseTag { tag: tag_name }, &s[pos + 1..]));
        }
        return Err(TokenizeError::new(
            format!("unterminated closing tag </{tag_name}>"),
            offset,
        ));
    }

    let mut attributes: Vec<RawAttribute> = Vec::new();
    loop {
        pos = skip_whitespace(bytes, pos);

        if pos >= bytes.len() {
            return Err(TokenizeError::new(format!("unterminated tag <{tag_name}>"), offset));
        }

        if bytes[pos] == b'/' && bytes.get(pos + 1) == Some(&b'>') {
            return Ok((
                Token::OpenTag {
                    tag: tag_name,
                    attributes,
                    self_closing: true,
                },
                &s[pos + 2..],
            ));
        }
        if bytes[pos] == b'>' {
            return Ok((
                Token::OpenTag {
                    tag: tag_name,
                    attributes,
                    self_closing: false,
                },
                &s[pos + 1..],
            ));
        }

        if !is_name_start(bytes[pos]) {
            return Err(TokenizeError::new(
                format!("unexpected character in tag <{tag_name}>"),
                offset + pos,
            ));
        }
        let attr_start = pos;
        while pos < bytes.len() && is_name_char(bytes[pos]) {
            pos += 1;
        }
        let attr_name = s[attr_start..pos].to_string();

        pos = skip_whitespace(bytes, pos);
        if bytes.get(pos) != Some(&b'=') {
            return Err(TokenizeError::new(
                format!("attribute `{attr_name}` on <{tag_name}> has no value"),
                offset + pos,
            ));
        }
        pos = skip_whitespace(bytes, pos + 1);

        let quote = match bytes.get(pos) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => {
                return Err(TokenizeError::new(
                    format!("value of attribute `{attr_name}` on <{tag_name}> must be quoted"),
                    offset + pos,
                ))
            }
        };
        pos += 1;
        let val_start = pos;
        while pos < bytes.len() && bytes[pos] != quote {
            pos += 1;
        }
        if pos >= bytes.len() {
            return Err(TokenizeError::new(
                format!("unterminated value for attribute `{attr_name}`"),
                offset + val_start,
            ));
        }
        let value = decode_entities(&s[val_start..pos]);
        pos += 1; // skip closing quote

        if attributes.iter().any(|a| a.name == attr_name) {
            return Err(TokenizeError::new(
                format!("duplicate attribute `{attr_name}` on <{tag_name}>"),
                offset + attr_start,
            ));
        }
        attributes.push(RawAttribute {
            name: attr_name,
            value,
        });
    }
}

/// Decode XML character and entity references in a single pass.
/// Unknown or malformed references are kept literally.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match decode_reference(candidate) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `s` starts with `&`. Returns the decoded char and the byte length of the reference.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let semi = s[1..].find(';')? + 1;
    if semi > 12 {
        return None;
    }
    let body = &s[1..semi];
    let ch = match body {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = body.strip_prefix('#') {
                if dec.is_empty() || !dec.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((ch, semi + 1))
}
