//! Restricted literal grammar for legacy object reprs.
//!
//! Legacy logs stored content blocks as the textual repr of SDK objects, e.g.
//! `ToolUseBlock(id='t1', name='Bash', input={'command': 'ls -la', 'timeout': 30})`.
//! The embedded `{...}` / `[...]` fragments use the repr literal syntax:
//! dicts, lists, tuples, quoted strings, numbers, `True`, `False`, `None`.
//! This module parses exactly that and nothing else; no names, operators or
//! calls are accepted.

use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),
    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),
    #[error("unsupported literal: {0}")]
    Unsupported(&'static str),
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
    #[error("value has no JSON representation: {0}")]
    NotJson(&'static str),
}

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    /// Key/value pairs in source order.
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Look up a string key in a dict literal.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Self::Dict(pairs) => pairs
                .iter()
                .find(|(k, _)| matches!(k, Self::Str(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Plain-string conversion: strings verbatim, everything else as [`repr`].
    ///
    /// [`repr`]: Literal::repr
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            other => other.repr(),
        }
    }

    /// Canonical repr text: `{'k': [1, 2.5, True, None]}`.
    pub fn repr(&self) -> String {
        match self {
            Self::None => "None".to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => float_repr(*f),
            Self::Str(s) => str_repr(s),
            Self::List(items) => format!("[{}]", join_repr(items)),
            Self::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            Self::Tuple(items) => format!("({})", join_repr(items)),
            Self::Dict(pairs) => {
                let body = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{body}}}")
            }
        }
    }

    /// Convert to JSON. Tuples become arrays; scalar dict keys are stringified
    /// the way JSON encoders do; container keys and non-finite floats fail.
    pub fn to_json(&self) -> Result<Value, LiteralError> {
        Ok(match self {
            Self::None => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => int_to_json(*n)?,
            Self::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .ok_or(LiteralError::NotJson("non-finite float"))?,
            Self::Str(s) => Value::String(s.clone()),
            Self::List(items) | Self::Tuple(items) => Value::Array(
                items
                    .iter()
                    .map(Literal::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            Self::Dict(pairs) => {
                let mut map = Map::new();
                for (k, v) in pairs {
                    map.insert(json_key(k)?, v.to_json()?);
                }
                Value::Object(map)
            }
        })
    }
}

impl From<&Value> for Literal {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Int(i128::from(u))
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Literal::from).collect()),
            Value::Object(map) => Self::Dict(
                map.iter()
                    .map(|(k, v)| (Self::Str(k.clone()), Literal::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Parse a single literal spanning all of `src` (surrounding whitespace allowed).
pub fn parse(src: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser::new(src);
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    parser.expect_end()?;
    Ok(value)
}

/// Parse a comma-separated expression list, as found between the brackets of
/// `content=[...]`. One bare item yields that item; several items (or a
/// trailing comma) yield a tuple.
pub fn parse_expression_list(src: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser::new(src);
    parser.skip_ws();
    let first = parser.value()?;
    parser.skip_ws();
    if parser.at_end() {
        return Ok(first);
    }
    let mut items = vec![first];
    while parser.eat(',') {
        parser.skip_ws();
        if parser.at_end() {
            break;
        }
        items.push(parser.value()?);
        parser.skip_ws();
    }
    parser.expect_end()?;
    Ok(Literal::Tuple(items))
}

/// Container nesting limit, matching serde_json's default recursion limit.
/// Every recursive walk over a parsed [`Literal`] is bounded by it.
pub const MAX_DEPTH: usize = 128;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(found) => LiteralError::Unexpected {
                found,
                offset: self.pos,
            },
            None => LiteralError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, c: char) -> Result<(), LiteralError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_end(&self) -> Result<(), LiteralError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        match self.peek().ok_or(LiteralError::UnexpectedEnd)? {
            open @ ('{' | '[' | '(') => self.nested(open),
            '\'' | '"' => self.strings(),
            c if c.is_ascii_digit() || c == '.' => self.number(false),
            '-' | '+' => {
                let negative = self.peek() == Some('-');
                self.pos += 1;
                self.skip_ws();
                self.number(negative)
            }
            c if c.is_alphabetic() || c == '_' => self.word(),
            _ => Err(self.unexpected()),
        }
    }

    fn nested(&mut self, open: char) -> Result<Literal, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(LiteralError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = match open {
            '{' => self.dict(),
            '[' => self.list(),
            _ => self.tuple(),
        };
        self.depth -= 1;
        value
    }

    fn word(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        let next_is_quote = matches!(self.peek(), Some('\'' | '"'));
        match word.as_str() {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            "r" | "R" | "u" | "U" | "ur" | "UR" | "Ur" | "uR" | "Ru" | "rU" | "RU" | "ru"
                if next_is_quote =>
            {
                self.pos = start;
                self.strings()
            }
            "b" | "B" | "br" | "rb" | "BR" | "RB" | "Br" | "bR" | "Rb" | "rB" if next_is_quote => {
                Err(LiteralError::Unsupported("bytes literal"))
            }
            _ => {
                self.pos = start;
                Err(self.unexpected())
            }
        }
    }

    fn dict(&mut self) -> Result<Literal, LiteralError> {
        self.expect('{')?;
        let mut pairs = Vec::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(Literal::Dict(pairs));
            }
            let key = self.value()?;
            self.skip_ws();
            if !self.eat(':') {
                return match self.peek() {
                    Some(',' | '}') => Err(LiteralError::Unsupported("set literal")),
                    _ => Err(self.unexpected()),
                };
            }
            self.skip_ws();
            let value = self.value()?;
            pairs.push((key, value));
            self.skip_ws();
            if !self.eat(',') {
                self.skip_ws();
                self.expect('}')?;
                return Ok(Literal::Dict(pairs));
            }
        }
    }

    fn list(&mut self) -> Result<Literal, LiteralError> {
        self.expect('[')?;
        self.sequence(']').map(Literal::List)
    }

    fn tuple(&mut self) -> Result<Literal, LiteralError> {
        self.expect('(')?;
        self.skip_ws();
        if self.eat(')') {
            return Ok(Literal::Tuple(Vec::new()));
        }
        let first = self.value()?;
        self.skip_ws();
        if self.eat(')') {
            // Parenthesized expression, not a tuple.
            return Ok(first);
        }
        self.expect(',')?;
        let mut items = vec![first];
        items.extend(self.sequence(')')?);
        Ok(Literal::Tuple(items))
    }

    /// Items up to `close`, allowing a trailing comma. The opener is consumed.
    fn sequence(&mut self, close: char) -> Result<Vec<Literal>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            if !self.eat(',') {
                self.skip_ws();
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<Literal, LiteralError> {
        let mut out = self.string()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.starts_string() {
                out.push_str(&self.string()?);
            } else {
                self.pos = save;
                return Ok(Literal::Str(out));
            }
        }
    }

    fn starts_string(&self) -> bool {
        let mut ahead = 0;
        while let Some(c) = self.peek_at(ahead) {
            match c {
                '\'' | '"' => return true,
                'r' | 'R' | 'u' | 'U' if ahead < 2 => ahead += 1,
                _ => return false,
            }
        }
        false
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let mut raw = false;
        while let Some(c @ ('r' | 'R' | 'u' | 'U')) = self.peek() {
            raw |= matches!(c, 'r' | 'R');
            self.pos += 1;
        }
        let quote = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
        if quote != '\'' && quote != '"' {
            return Err(self.unexpected());
        }
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        let mut out = String::new();
        loop {
            let c = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
            if c == quote {
                if !triple {
                    self.pos += 1;
                    return Ok(out);
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.pos += 3;
                    return Ok(out);
                }
                out.push(c);
                self.pos += 1;
                continue;
            }
            if c == '\n' && !triple {
                return Err(self.unexpected());
            }
            if c == '\\' {
                if raw {
                    // Raw strings keep the backslash but it still protects the quote.
                    out.push('\\');
                    self.pos += 1;
                    if let Some(next) = self.peek() {
                        out.push(next);
                        self.pos += 1;
                    }
                    continue;
                }
                self.escape(&mut out)?;
                continue;
            }
            out.push(c);
            self.pos += 1;
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let at = self.pos;
        self.pos += 1;
        let c = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
        self.pos += 1;
        match c {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            'x' => out.push(self.hex_char(2, at)?),
            'u' => out.push(self.hex_char(4, at)?),
            'U' => out.push(self.hex_char(8, at)?),
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or(LiteralError::InvalidEscape(at))?);
            }
            'N' => return Err(LiteralError::Unsupported("named unicode escape")),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_char(&mut self, digits: usize, at: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(LiteralError::InvalidEscape(at));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16).map_err(|_| LiteralError::InvalidEscape(at))?;
        self.pos = end;
        char::from_u32(code).ok_or(LiteralError::InvalidEscape(at))
    }

    fn number(&mut self, negative: bool) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            // Exponent signs: `1e-5`, `2.5E+3`.
            let is_exp = matches!(self.peek(), Some('e' | 'E'));
            self.pos += 1;
            if is_exp && matches!(self.peek(), Some('+' | '-')) {
                let text: String = self.chars[start..self.pos].iter().collect();
                if !text.starts_with("0x") && !text.starts_with("0X") {
                    self.pos += 1;
                }
            }
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        if text.is_empty() {
            return Err(self.unexpected());
        }
        let sign: i128 = if negative { -1 } else { 1 };
        let lower = text.to_ascii_lowercase();
        for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
            if let Some(digits) = lower.strip_prefix(prefix) {
                return i128::from_str_radix(digits, radix)
                    .map(|n| Literal::Int(sign * n))
                    .map_err(|_| LiteralError::InvalidNumber(text.clone()));
            }
        }
        if lower.ends_with('j') {
            return Err(LiteralError::Unsupported("complex literal"));
        }
        if lower.chars().all(|c| c.is_ascii_digit()) {
            return lower
                .parse::<i128>()
                .map(|n| Literal::Int(sign * n))
                .map_err(|_| LiteralError::InvalidNumber(text.clone()));
        }
        lower
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| Literal::Float(if negative { -f } else { f }))
            .ok_or(LiteralError::InvalidNumber(text))
    }
}

fn join_repr(items: &[Literal]) -> String {
    items
        .iter()
        .map(Literal::repr)
        .collect::<Vec<_>>()
        .join(", ")
}

fn int_to_json(n: i128) -> Result<Value, LiteralError> {
    if let Ok(i) = i64::try_from(n) {
        Ok(Value::Number(i.into()))
    } else if let Ok(u) = u64::try_from(n) {
        Ok(Value::Number(u.into()))
    } else {
        Err(LiteralError::NotJson("integer out of range"))
    }
}

fn json_key(key: &Literal) -> Result<String, LiteralError> {
    match key {
        Literal::Str(s) => Ok(s.clone()),
        Literal::Int(n) => Ok(n.to_string()),
        Literal::Float(f) => Ok(float_repr(*f)),
        Literal::Bool(true) => Ok("true".to_string()),
        Literal::Bool(false) => Ok("false".to_string()),
        Literal::None => Ok("null".to_string()),
        _ => Err(LiteralError::NotJson("container used as dict key")),
    }
}

fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = f.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        // `1e-7` -> `1e-07`, `1.5e20` -> `1.5e+20`
        let sci = format!("{f:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(d) => ('-', d),
            None => ('+', exp),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    if f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
