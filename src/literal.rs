//! A restricted object-literal reader for directive headers.
//!
//! Accepts the subset of JavaScript literal syntax people write in a
//! playground header: identifiers or quoted keys, strings, numbers,
//! booleans, `null`, nested objects and arrays, trailing commas. Nothing
//! else parses, and nothing is ever evaluated.

use serde_json::{Map, Number, Value};

use crate::errors::{ErrorKind, Result};

const MAX_DEPTH: usize = 32;

pub fn parse_literal(text: &str) -> Result<Value> {
    let mut parser = Parser { src: text, pos: 0 };
    parser.skip_whitespace();
    let value = parser.value(0)?;
    parser.skip_whitespace();
    if parser.pos != text.len() {
        return Err(parser.fail("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn fail(&self, reason: &str) -> crate::errors::Error {
        ErrorKind::MalformedDirective(self.pos, reason.to_string()).into()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(self.fail("literal is nested too deeply"));
        }
        match self.peek() {
            Some('{') => self.object(depth + 1),
            Some('[') => self.array(depth + 1),
            Some(quote @ '"') | Some(quote @ '\'') => self.string(quote).map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if is_ident_start(c) => {
                let start = self.pos;
                match self.identifier() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    _ => {
                        self.pos = start;
                        Err(self.fail("expected a value"))
                    }
                }
            }
            Some(_) => Err(self.fail("expected a value")),
            None => Err(self.fail("unexpected end of literal")),
        }
    }

    fn object(&mut self, depth: usize) -> Result<Value> {
        self.eat('{');
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            let key = self.key()?;
            self.skip_whitespace();
            if !self.eat(':') {
                return Err(self.fail("expected ':' after key"));
            }
            self.skip_whitespace();
            let value = self.value(depth)?;
            map.insert(key, value);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            return Err(self.fail("expected ',' or '}'"));
        }
    }

    fn array(&mut self, depth: usize) -> Result<Value> {
        self.eat('[');
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            items.push(self.value(depth)?);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            return Err(self.fail("expected ',' or ']'"));
        }
    }

    fn key(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ '"') | Some(quote @ '\'') => self.string(quote),
            Some(c) if is_ident_start(c) => Ok(self.identifier().to_string()),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                Ok(self.src[start..self.pos].to_string())
            }
            _ => Err(self.fail("expected a key")),
        }
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(is_ident_start(c) || c.is_ascii_digit()) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn string(&mut self, quote: char) -> Result<String> {
        self.bump();
        let mut out = String::new();
        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(self.fail("unterminated string")),
            };
            match c {
                '\n' => return Err(self.fail("line break inside string")),
                '\\' => out.push(self.escape()?),
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char> {
        let escaped = match self.bump() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('0') => '\0',
            Some('u') => {
                let start = self.pos;
                let end = start + 4;
                let hex = self
                    .src
                    .get(start..end)
                    .ok_or_else(|| self.fail("short unicode escape"))?;
                let code = u32::from_str_radix(hex, 16).map_err(|_| self.fail("bad unicode escape"))?;
                self.pos = end;
                std::char::from_u32(code).ok_or_else(|| self.fail("bad unicode escape"))?
            }
            Some(c @ '\\') | Some(c @ '\'') | Some(c @ '"') | Some(c @ '/') => c,
            Some(_) => return Err(self.fail("unknown escape sequence")),
            None => return Err(self.fail("unterminated string")),
        };
        Ok(escaped)
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek() == Some('-') || self.peek() == Some('+') {
            self.pos += 1;
        }
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '-' || c == '+')
                && matches!(self.src[..self.pos].chars().last(), Some('e') | Some('E'));
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = self.src[start..self.pos].trim_start_matches('+');

        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }
        match text.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(number) => Ok(Value::Number(number)),
            None => {
                self.pos = start;
                Err(self.fail("invalid number"))
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}
