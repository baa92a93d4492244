//! Tokenizer with indentation tracking

use super::SyntaxError;

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kw {
    Def,
    Return,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Not,
    And,
    Or,
    Is,
    True,
    False,
    None,
    Assert,
    Pass,
    Break,
    Continue,
    Import,
    From,
    As,
}

impl Kw {
    fn lookup(word: &str) -> Option<Self> {
        let kw = match word {
            "def" => Self::Def,
            "return" => Self::Return,
            "if" => Self::If,
            "elif" => Self::Elif,
            "else" => Self::Else,
            "while" => Self::While,
            "for" => Self::For,
            "in" => Self::In,
            "not" => Self::Not,
            "and" => Self::And,
            "or" => Self::Or,
            "is" => Self::Is,
            "True" => Self::True,
            "False" => Self::False,
            "None" => Self::None,
            "assert" => Self::Assert,
            "pass" => Self::Pass,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "import" => Self::Import,
            "from" => Self::From,
            "as" => Self::As,
            _ => return None,
        };
        Some(kw)
    }
}

/// Token types from lexical analysis
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier
    Name(String),
    /// Reserved word
    Keyword(Kw),
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal, escapes resolved
    Str(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    /// End of a logical line
    Newline,
    /// Block opened by deeper indentation
    Indent,
    /// Block closed by shallower indentation
    Dedent,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Short description for error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Name(name) => format!("name '{name}'"),
            Self::Keyword(kw) => format!("keyword {kw:?}"),
            Self::Int(v) => format!("integer {v}"),
            Self::Float(v) => format!("float {v}"),
            Self::Str(_) => "string literal".to_string(),
            Self::Newline => "end of line".to_string(),
            Self::Indent => "indent".to_string(),
            Self::Dedent => "dedent".to_string(),
            Self::Eof => "end of file".to_string(),
            other => format!("{other:?}"),
        }
    }
}

/// A token and the line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token type
    pub kind: TokenKind,
    /// 1-based source line
    pub line: usize,
}

const TAB_WIDTH: usize = 8;

/// Tokenizer for converting source text to tokens
#[derive(Debug)]
pub struct Lexer<'a> {
    file: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    indents: Vec<usize>,
    paren_depth: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Creates a new tokenizer for the given input
    #[must_use]
    pub fn new(source: &str, file: &'a str) -> Self {
        Self {
            file,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            indents: vec![0],
            paren_depth: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenizes the entire input, ending with `Newline`, dedents and `Eof`
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut at_line_start = true;

        loop {
            if at_line_start && self.paren_depth == 0 {
                if !self.read_indentation()? {
                    break;
                }
                at_line_start = false;
            }

            let Some(ch) = self.peek(0) else { break };
            match ch {
                ' ' | '\t' | '\r' | '\x0c' => self.pos += 1,
                '\\' if self.peek(1) == Some('\n') => {
                    self.pos += 2;
                    self.line += 1;
                }
                '#' => self.skip_comment(),
                '\n' => {
                    self.pos += 1;
                    if self.paren_depth == 0 {
                        self.push(TokenKind::Newline);
                        at_line_start = true;
                    }
                    self.line += 1;
                }
                '0'..='9' => self.read_number()?,
                '.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number()?,
                '"' | '\'' => self.read_string(ch)?,
                c if c == '_' || c.is_alphabetic() => self.read_word(),
                _ => self.read_operator(ch)?,
            }
        }

        if self.paren_depth > 0 {
            return Err(self.error("unexpected end of file inside brackets"));
        }
        if self
            .tokens
            .last()
            .is_some_and(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Dedent))
        {
            self.push(TokenKind::Newline);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent);
        }
        self.push(TokenKind::Eof);
        Ok(self.tokens)
    }

    /// Measures leading whitespace and emits indent/dedent tokens.
    ///
    /// Blank and comment-only lines are consumed whole. Returns `false` at end
    /// of input.
    fn read_indentation(&mut self) -> Result<bool, SyntaxError> {
        loop {
            let mut width = 0;
            while let Some(ch) = self.peek(0) {
                match ch {
                    ' ' => width += 1,
                    '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                    '\x0c' | '\r' => {}
                    _ => break,
                }
                self.pos += 1;
            }

            match self.peek(0) {
                None => return Ok(false),
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                Some('\n') => {
                    self.pos += 1;
                    self.line += 1;
                    continue;
                }
                Some(_) => {}
            }

            let current = self.indents.last().copied().unwrap_or(0);
            if width > current {
                self.indents.push(width);
                self.push(TokenKind::Indent);
            } else if width < current {
                while self.indents.last().is_some_and(|&top| top > width) {
                    self.indents.pop();
                    self.push(TokenKind::Dedent);
                }
                if self.indents.last() != Some(&width) {
                    return Err(
                        self.error("unindent does not match any outer indentation level")
                    );
                }
            }
            return Ok(true);
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind) {
        self.tokens.push(Token {
            kind,
            line: self.line,
        });
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.file, self.line, message)
    }

    fn skip_comment(&mut self) {
        while self.peek(0).is_some_and(|c| c != '\n') {
            self.pos += 1;
        }
    }

    fn read_word(&mut self) {
        let start = self.pos;
        while self
            .peek(0)
            .is_some_and(|c| c == '_' || c.is_alphanumeric())
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        let kind = match Kw::lookup(&word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Name(word),
        };
        self.push(kind);
    }

    fn read_number(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let mut is_float = false;

        self.eat_digits();
        if self.peek(0) == Some('.') {
            is_float = true;
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.peek(0), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek(1), Some('+' | '-')));
            if self.peek(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos += 1 + sign;
                self.eat_digits();
            }
        }

        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|&&c| c != '_')
            .collect();
        let kind = if is_float {
            text.parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| self.error(format!("invalid float literal '{text}'")))?
        } else {
            text.parse::<i64>()
                .map(TokenKind::Int)
                .map_err(|_| self.error(format!("integer literal '{text}' is out of range")))?
        };
        self.push(kind);
        Ok(())
    }

    fn eat_digits(&mut self) {
        while self
            .peek(0)
            .is_some_and(|c| c.is_ascii_digit() || c == '_')
        {
            self.pos += 1;
        }
    }

    fn read_string(&mut self, quote: char) -> Result<(), SyntaxError> {
        let start_line = self.line;
        let triple = self.peek(1) == Some(quote) && self.peek(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        let mut value = String::new();
        loop {
            let Some(ch) = self.peek(0) else {
                return Err(SyntaxError::new(
                    self.file,
                    start_line,
                    "unterminated string literal",
                ));
            };
            if ch == quote {
                if !triple {
                    self.pos += 1;
                    break;
                }
                if self.peek(1) == Some(quote) && self.peek(2) == Some(quote) {
                    self.pos += 3;
                    break;
                }
            }
            if ch == '\n' {
                if !triple {
                    return Err(self.error("unterminated string literal"));
                }
                self.line += 1;
            }
            if ch == '\\' {
                if let Some(next) = self.peek(1) {
                    self.pos += 2;
                    match next {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '0' => value.push('\0'),
                        '\\' | '\'' | '"' => value.push(next),
                        '\n' => self.line += 1,
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                    continue;
                }
            }
            value.push(ch);
            self.pos += 1;
        }

        self.tokens.push(Token {
            kind: TokenKind::Str(value),
            line: start_line,
        });
        Ok(())
    }

    fn read_operator(&mut self, ch: char) -> Result<(), SyntaxError> {
        let next = self.peek(1);
        let (kind, width) = match (ch, next) {
            ('*', Some('*')) => (TokenKind::DoubleStar, 2),
            ('*', Some('=')) => (TokenKind::StarAssign, 2),
            ('*', _) => (TokenKind::Star, 1),
            ('/', Some('/')) => (TokenKind::DoubleSlash, 2),
            ('/', _) => (TokenKind::Slash, 1),
            ('+', Some('=')) => (TokenKind::PlusAssign, 2),
            ('+', _) => (TokenKind::Plus, 1),
            ('-', Some('=')) => (TokenKind::MinusAssign, 2),
            ('-', _) => (TokenKind::Minus, 1),
            ('%', _) => (TokenKind::Percent, 1),
            ('=', Some('=')) => (TokenKind::EqEq, 2),
            ('=', _) => (TokenKind::Assign, 1),
            ('!', Some('=')) => (TokenKind::NotEq, 2),
            ('<', Some('=')) => (TokenKind::LtE, 2),
            ('<', _) => (TokenKind::Lt, 1),
            ('>', Some('=')) => (TokenKind::GtE, 2),
            ('>', _) => (TokenKind::Gt, 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            ('[', _) => (TokenKind::LBracket, 1),
            (']', _) => (TokenKind::RBracket, 1),
            (',', _) => (TokenKind::Comma, 1),
            (':', _) => (TokenKind::Colon, 1),
            (';', _) => (TokenKind::Semicolon, 1),
            ('.', _) => (TokenKind::Dot, 1),
            _ => return Err(self.error(format!("unexpected character '{ch}'"))),
        };

        match kind {
            TokenKind::LParen | TokenKind::LBracket => self.paren_depth += 1,
            TokenKind::RParen | TokenKind::RBracket => {
                self.paren_depth = self
                    .paren_depth
                    .checked_sub(1)
                    .ok_or_else(|| self.error(format!("unmatched '{ch}'")))?;
            }
            _ => {}
        }

        self.pos += width;
        self.push(kind);
        Ok(())
    }
}
