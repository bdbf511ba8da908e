//! Tokenizer for the IDL text front end.
//!
//! Produces a flat token list with line/column positions. `//` and
//! `/* */` comments are skipped; `///` doc lines become tokens so the
//! parser can attach them to the following declaration.

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    Ident(String),
    Nat(u64),
    /// `0x...` literal, digits kept verbatim (without the prefix).
    Hex(String),
    /// `"..."` literal.
    Str(String),
    /// One `/// ...` line, leading space trimmed.
    Doc(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Comma,
    Colon,
    Semi,
    Eq,
    Arrow,
    Hash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub tok: Tok,
    pub line: usize,
    pub col: usize,
}

pub fn tokenize(text: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut out = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut line = 1;
    let mut col = 1;

    macro_rules! push {
        ($tok:expr, $line:expr, $col:expr) => {
            out.push(Spanned {
                tok: $tok,
                line: $line,
                col: $col,
            })
        };
    }

    while i < chars.len() {
        let c = chars[i];
        let (tok_line, tok_col) = (line, col);
        match c {
            '\n' => {
                i += 1;
                line += 1;
                col = 1;
            }
            _ if c.is_whitespace() => {
                i += 1;
                col += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                let doc = chars.get(i + 2) == Some(&'/') && chars.get(i + 3) != Some(&'/');
                let start = if doc { i + 3 } else { i + 2 };
                let mut end = start;
                while end < chars.len() && chars[end] != '\n' {
                    end += 1;
                }
                if doc {
                    let text: String = chars[start..end].iter().collect();
                    push!(Tok::Doc(text.trim().to_string()), tok_line, tok_col);
                }
                col += end - i;
                i = end;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let mut end = i + 2;
                loop {
                    if end + 1 >= chars.len() {
                        return Err(ParseError::syntax(tok_line, tok_col, "unterminated comment"));
                    }
                    if chars[end] == '*' && chars[end + 1] == '/' {
                        end += 2;
                        break;
                    }
                    if chars[end] == '\n' {
                        line += 1;
                        col = 0;
                    }
                    end += 1;
                    col += 1;
                }
                col += 2;
                i = end;
            }
            '"' => {
                let mut end = i + 1;
                while end < chars.len() && chars[end] != '"' {
                    if chars[end] == '\n' {
                        return Err(ParseError::syntax(tok_line, tok_col, "unterminated string"));
                    }
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(ParseError::syntax(tok_line, tok_col, "unterminated string"));
                }
                let text: String = chars[i + 1..end].iter().collect();
                push!(Tok::Str(text), tok_line, tok_col);
                col += end + 1 - i;
                i = end + 1;
            }
            '0' if chars.get(i + 1) == Some(&'x') => {
                let start = i + 2;
                let mut end = start;
                while end < chars.len() && chars[end].is_ascii_hexdigit() {
                    end += 1;
                }
                if end == start {
                    return Err(ParseError::syntax(tok_line, tok_col, "empty hex literal"));
                }
                let digits: String = chars[start..end].iter().collect();
                push!(Tok::Hex(digits), tok_line, tok_col);
                col += end - i;
                i = end;
            }
            _ if c.is_ascii_digit() => {
                let mut end = i;
                while end < chars.len() && chars[end].is_ascii_digit() {
                    end += 1;
                }
                let digits: String = chars[i..end].iter().collect();
                let value = digits.parse::<u64>().map_err(|_| {
                    ParseError::syntax(tok_line, tok_col, format!("number out of range: {}", digits))
                })?;
                push!(Tok::Nat(value), tok_line, tok_col);
                col += end - i;
                i = end;
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = i;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_')
                {
                    end += 1;
                }
                let ident: String = chars[i..end].iter().collect();
                push!(Tok::Ident(ident), tok_line, tok_col);
                col += end - i;
                i = end;
            }
            '-' if chars.get(i + 1) == Some(&'>') => {
                push!(Tok::Arrow, tok_line, tok_col);
                i += 2;
                col += 2;
            }
            _ => {
                let tok = match c {
                    '{' => Tok::LBrace,
                    '}' => Tok::RBrace,
                    '(' => Tok::LParen,
                    ')' => Tok::RParen,
                    '[' => Tok::LBracket,
                    ']' => Tok::RBracket,
                    '<' => Tok::Lt,
                    '>' => Tok::Gt,
                    ',' => Tok::Comma,
                    ':' => Tok::Colon,
                    ';' => Tok::Semi,
                    '=' => Tok::Eq,
                    '#' => Tok::Hash,
                    _ => {
                        return Err(ParseError::syntax(
                            tok_line,
                            tok_col,
                            format!("unexpected character '{}'", c),
                        ))
                    }
                };
                push!(tok, tok_line, tok_col);
                i += 1;
                col += 1;
            }
        }
    }

    Ok(out)
}
