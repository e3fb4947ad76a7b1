//! A module implementing lexical analysis (tokenization) for the shell's command lines.

use crate::cursor::Cursor;
use log::trace;
use std::fmt;
use std::str::Chars;
use thiserror::Error;

/// Characters that separate tokens.
const DELIMITERS: [char; 3] = [' ', '\t', '\n'];

/// Characters that end a command unit. Apart from quotes and `>`, none of them
/// is supported by the grammar.
const RESERVED: [char; 9] = ['\'', '"', '|', '&', ';', '<', '>', '(', ')'];

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An unquoted run of ordinary characters: a bare word or a number.
    CommandUnit(String),
    /// Text between single quotes, taken verbatim.
    SingleQuoted(String),
    /// Text between double quotes, taken verbatim.
    DoubleQuoted(String),
    /// Output redirection symbol, `>`.
    Redirect,
    /// Marks the end of the line. Always the last token.
    EndOfInput,
}

impl Token {
    /// Returns the text of a word-like token, i.e. one that can serve as a
    /// command name, an argument or a redirection target.
    pub fn word(&self) -> Option<&str> {
        match self {
            Token::CommandUnit(text) | Token::SingleQuoted(text) | Token::DoubleQuoted(text) => {
                Some(text.as_str())
            }
            Token::Redirect | Token::EndOfInput => None,
        }
    }

    pub fn is_word_like(&self) -> bool {
        self.word().is_some()
    }

    /// Returns the digits of an unquoted, all-digit command unit.
    ///
    /// Such a token directly before `>` is a file descriptor prefix.
    pub fn number(&self) -> Option<&str> {
        match self {
            Token::CommandUnit(text) if text.bytes().all(|b| b.is_ascii_digit()) => {
                Some(text.as_str())
            }
            _ => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Token::Redirect)
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Token::EndOfInput)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::CommandUnit(text) => write!(f, "`{text}`"),
            Token::SingleQuoted(text) => write!(f, "`'{text}'`"),
            Token::DoubleQuoted(text) => write!(f, "`\"{text}\"`"),
            Token::Redirect => f.write_str("`>`"),
            Token::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// The two quoting styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    fn delimiter(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::Single => f.write_str("single-quoted"),
            Quote::Double => f.write_str("double-quoted"),
        }
    }
}

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("unterminated {0} string")]
    UnterminatedQuote(Quote),
    /// A character reserved for an operator this shell does not support.
    #[error("undefined character {0:?}")]
    UndefinedCharacter(char),
}

/// Lazy token stream over one line of input.
///
/// Each call to `next` scans just enough characters to produce one token.
/// The stream always finishes with a single [`Token::EndOfInput`], unless a
/// [`LexingError`] is hit first; in both cases it is exhausted afterwards.
pub struct Tokens<'a> {
    chars: Cursor<Chars<'a>>,
    finished: bool,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            chars: Cursor::new(line.chars()),
            finished: false,
        }
    }

    fn skip_delimiters(&mut self) {
        while matches!(self.chars.current(), Some(' ' | '\t')) {
            self.chars.advance();
        }
    }

    /// Reads a quoted string. The cursor is on the opening quote; on success it
    /// is left right after the closing one.
    fn read_quoted(&mut self, quote: Quote) -> Result<Token, LexingError> {
        self.chars.advance();
        let mut text = String::new();
        loop {
            match self.chars.current() {
                None => return Err(LexingError::UnterminatedQuote(quote)),
                Some(&c) if c == quote.delimiter() => break,
                Some(&c) => text.push(c),
            }
            self.chars.advance();
        }
        self.chars.advance();

        Ok(match quote {
            Quote::Single => Token::SingleQuoted(text),
            Quote::Double => Token::DoubleQuoted(text),
        })
    }

    /// Reads a command unit. The terminating character is left unconsumed.
    fn read_command_unit(&mut self) -> Token {
        let mut text = String::new();
        while let Some(&c) = self.chars.current() {
            if DELIMITERS.contains(&c) || RESERVED.contains(&c) {
                break;
            }
            text.push(c);
            self.chars.advance();
        }
        Token::CommandUnit(text)
    }

    fn scan(&mut self) -> Result<Token, LexingError> {
        self.skip_delimiters();

        let Some(&ch) = self.chars.current() else {
            self.finished = true;
            return Ok(Token::EndOfInput);
        };

        match ch {
            '\'' => self.read_quoted(Quote::Single),
            '"' => self.read_quoted(Quote::Double),
            '>' => {
                self.chars.advance();
                Ok(Token::Redirect)
            }
            c if c == '\n' || RESERVED.contains(&c) => Err(LexingError::UndefinedCharacter(c)),
            _ => Ok(self.read_command_unit()),
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, LexingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.scan();
        match &token {
            Ok(token) => trace!("token: {token:?}"),
            Err(err) => {
                trace!("lexing failed: {err}");
                self.finished = true;
            }
        }
        Some(token)
    }
}

/// The main entry point function to perform lexical analysis.
///
/// Nothing is scanned until the returned stream is polled, and calling this
/// again on the same text yields the same tokens.
///
/// # Arguments
/// * `line` - The string to be tokenized, without its trailing newline.
pub fn tokenize(line: &str) -> Tokens<'_> {
    Tokens::new(line)
}
