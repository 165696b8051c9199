use std::fmt;

const SPECIAL_CHARS: &str = "+=.-:*";

fn is_special_char(c: char) -> bool {
    SPECIAL_CHARS.contains(c)
}

/// A 1-based (line, column) pair into the Matmakefile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matmakefile:{}:{}", self.line, self.col)
    }
}

/// A lexical fragment plus the whitespace that followed it in the source.
///
/// Keeping `trailing_space` lets callers tell `foo.bar` (one name) apart
/// from `foo . bar` (three tokens) and lets a sequence of tokens be
/// reassembled byte-for-byte via [`Tokens::concat`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub text: String,
    pub trailing_space: String,
    pub location: Location,
}

impl Token {
    pub fn new(text: impl Into<String>, location: Location) -> Self {
        Self {
            text: text.into(),
            trailing_space: String::new(),
            location,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn location_description(&self) -> String {
        self.location.to_string()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.text, self.trailing_space)
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// An ordered run of [`Token`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens(pub Vec<Token>);

impl Tokens {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.0
    }

    /// Split on tokens with non-empty trailing whitespace, yielding the
    /// "groups" (space-separated sub-sequences, spec §3) used as
    /// individual glob patterns / arguments.
    pub fn groups(&self) -> Vec<Tokens> {
        if self.0.is_empty() {
            return Vec::new();
        }
        let mut ret = vec![Tokens::new()];
        for t in &self.0 {
            ret.last_mut().unwrap().push(t.clone());
            if !t.trailing_space.is_empty() {
                ret.push(Tokens::new());
            }
        }
        ret
    }

    /// Reassemble the underlying source text (modulo comment stripping).
    pub fn concat(&self) -> Token {
        let mut text = String::new();
        for t in &self.0 {
            text.push_str(&t.text);
            text.push_str(&t.trailing_space);
        }
        let location = self.0.first().map(|t| t.location).unwrap_or_default();
        Token {
            text,
            trailing_space: String::new(),
            location,
        }
    }

    /// `+=` semantics (spec §4.2): append with a one-space separator when
    /// the current last token has no trailing whitespace of its own.
    pub fn append(&mut self, other: &Tokens) {
        if let Some(last) = self.0.last_mut() {
            if last.trailing_space.is_empty() {
                last.trailing_space.push(' ');
            }
        }
        self.0.extend(other.0.iter().cloned());
    }
}

impl From<Token> for Tokens {
    fn from(t: Token) -> Self {
        Tokens(vec![t])
    }
}

impl FromIterator<Token> for Tokens {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Tokens(iter.into_iter().collect())
    }
}

impl IntoIterator for Tokens {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in &self.0 {
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

fn start_new_word(ret: &mut Vec<Token>, line_number: usize, col: usize) {
    if ret.is_empty() || !ret.last().unwrap().text.is_empty() {
        ret.push(Token {
            text: String::new(),
            trailing_space: String::new(),
            location: Location::new(line_number, col),
        });
    }
}

/// Tokenize one line of a Matmakefile.
///
/// Special characters (`+=.-:*`) merge into multi-char operators greedily,
/// stopping as soon as an `=` is consumed (so `+=` and `-=` form but `...`
/// does not swallow a following `=`-less run past its own end). A `#`
/// starts a line comment that consumes the remainder of the line.
pub fn tokenize_line(line: &str, line_number: usize) -> Tokens {
    let mut ret: Vec<Token> = Vec::new();
    let mut chars = line.chars().peekable();
    let mut col: usize = 1;

    while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
        chars.next();
        col += 1;
    }

    start_new_word(&mut ret, line_number, col);

    while let Some(&c) = chars.peek() {
        if c == '#' {
            break;
        }
        if c.is_whitespace() {
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                let ws = chars.next().unwrap();
                ret.last_mut().unwrap().trailing_space.push(ws);
                col += 1;
            }
            start_new_word(&mut ret, line_number, col);
            continue;
        }
        if is_special_char(c) {
            start_new_word(&mut ret, line_number, col);
            let first = chars.next().unwrap();
            ret.last_mut().unwrap().text.push(first);
            col += 1;
            loop {
                let Some(&next) = chars.peek() else { break };
                if !is_special_char(next) {
                    break;
                }
                chars.next();
                ret.last_mut().unwrap().text.push(next);
                col += 1;
                if next == '=' {
                    break;
                }
            }
            let next_is_space = matches!(chars.peek(), Some(c) if c.is_whitespace());
            if !next_is_space {
                start_new_word(&mut ret, line_number, col);
            }
            continue;
        }
        let ch = chars.next().unwrap();
        ret.last_mut().unwrap().text.push(ch);
        col += 1;
    }

    if ret.last().map(|t| t.text.is_empty()).unwrap_or(false) {
        ret.pop();
    }
    Tokens(ret)
}
