//! Turns the lexer's tokens into a [`CommandLine`].
//!
//! Grammar (one simple command, output redirections only):
//!
//! ```text
//! command_line := command redirection* END
//! command      := WORD WORD*
//! redirection  := NUMBER? '>' WORD
//! ```
//!
//! A `NUMBER` is only a descriptor when the next token is `>`, whether or not
//! whitespace separates them; otherwise it is an ordinary argument.

use crate::cursor::Cursor;
use crate::lexer::{self, LexingError, Token};
use log::debug;
use thiserror::Error;

/// Descriptor used by a redirection without an explicit number.
pub const STDOUT_FILENO: u32 = 1;

/// A simple command: its name and arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    /// `None` only when the line was empty.
    pub name: Option<String>,
    pub args: Vec<String>,
}

/// An output redirection such as `2>errors.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub descriptor: u32,
    pub target: String,
}

/// The parse result for one line of input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    pub command: Command,
    /// Redirections in the order they were written.
    pub redirects: Vec<Redirection>,
}

impl CommandLine {
    /// The file that standard output should go to, if any.
    ///
    /// When several redirections name descriptor 1, the last one wins.
    pub fn stdout_target(&self) -> Option<&str> {
        self.redirects
            .iter()
            .rev()
            .find(|r| r.descriptor == STDOUT_FILENO)
            .map(|r| r.target.as_str())
    }
}

/// Errors that can occur while parsing a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    /// The line could not be tokenized.
    #[error(transparent)]
    Lexing(#[from] LexingError),
    /// The line starts with something that cannot name a command.
    #[error("syntax error: expected command name, found {0}")]
    ExpectedCommandName(Token),
    /// The line ended in the middle of a redirection.
    #[error("syntax error: unexpected end of input while parsing redirection")]
    UnexpectedEnd,
    /// A redirection without its `>`.
    #[error("syntax error: expected `>` in redirection, found {0}")]
    ExpectedRedirectOperator(Token),
    /// A `>` that is not followed by a file name.
    #[error("syntax error: expected file name after `>`, found {0}")]
    ExpectedFilename(Token),
    /// A descriptor prefix too large to be a file descriptor.
    #[error("syntax error: bad file descriptor `{0}`")]
    InvalidDescriptor(String),
    /// Tokens left over after the redirections.
    #[error("syntax error: unexpected {0} after redirection")]
    TrailingToken(Token),
}

/// Recursive-descent parser over a token stream.
///
/// The stream may be the lazy output of [`lexer::tokenize`] or any other
/// sequence of tokens; a lexing error inside it is reported as soon as the
/// parser looks at that position.
pub struct Parser<I: Iterator<Item = Result<Token, LexingError>>> {
    tokens: Cursor<I>,
}

impl<I: Iterator<Item = Result<Token, LexingError>>> Parser<I> {
    pub fn new(tokens: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            tokens: Cursor::new(tokens.into_iter()),
        }
    }

    /// Parse a command line: command redirection*
    pub fn parse(mut self) -> Result<CommandLine, ParsingError> {
        let command = self.parse_command()?;

        let mut redirects = Vec::new();
        while self.redirect_ahead()? {
            redirects.push(self.parse_redirection()?);
        }

        match self.current()? {
            None | Some(Token::EndOfInput) => {}
            Some(token) => return Err(ParsingError::TrailingToken(token.clone())),
        }

        let line = CommandLine { command, redirects };
        debug!("parsed {line:?}");
        Ok(line)
    }

    fn current(&self) -> Result<Option<&Token>, ParsingError> {
        Self::settle(self.tokens.current())
    }

    fn lookahead(&self) -> Result<Option<&Token>, ParsingError> {
        Self::settle(self.tokens.lookahead())
    }

    fn settle(
        slot: Option<&Result<Token, LexingError>>,
    ) -> Result<Option<&Token>, ParsingError> {
        match slot {
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(err)) => Err(err.clone().into()),
            None => Ok(None),
        }
    }

    /// Whether a redirection starts at the current token: either `>` itself or
    /// a number whose next token is `>`. Consumes nothing.
    fn redirect_ahead(&self) -> Result<bool, ParsingError> {
        let Some(current) = self.current()? else {
            return Ok(false);
        };
        if current.is_redirect() {
            return Ok(true);
        }
        if current.number().is_some() {
            return Ok(self.lookahead()?.is_some_and(Token::is_redirect));
        }
        Ok(false)
    }

    /// Parse a command: name followed by its arguments.
    fn parse_command(&mut self) -> Result<Command, ParsingError> {
        let name = match self.current()? {
            None | Some(Token::EndOfInput) => return Ok(Command::default()),
            Some(token) => match token.word() {
                Some(word) => word.to_owned(),
                None => return Err(ParsingError::ExpectedCommandName(token.clone())),
            },
        };
        self.tokens.advance();

        let mut args = Vec::new();
        loop {
            let arg = match self.current()?.and_then(Token::word) {
                Some(word) => word.to_owned(),
                None => break,
            };
            if self.redirect_ahead()? {
                break;
            }
            args.push(arg);
            self.tokens.advance();
        }

        Ok(Command {
            name: Some(name),
            args,
        })
    }

    /// Parse a redirect: NUMBER? '>' word
    fn parse_redirection(&mut self) -> Result<Redirection, ParsingError> {
        let current = match self.current()? {
            None | Some(Token::EndOfInput) => return Err(ParsingError::UnexpectedEnd),
            Some(token) => token,
        };

        let mut descriptor = STDOUT_FILENO;
        if let Some(digits) = current.number() {
            if self.lookahead()?.is_some_and(Token::is_redirect) {
                descriptor = digits
                    .parse()
                    .map_err(|_| ParsingError::InvalidDescriptor(digits.to_owned()))?;
                self.tokens.advance();
            }
        }

        match self.current()? {
            Some(Token::Redirect) => self.tokens.advance(),
            None | Some(Token::EndOfInput) => return Err(ParsingError::UnexpectedEnd),
            Some(token) => return Err(ParsingError::ExpectedRedirectOperator(token.clone())),
        }

        let target = match self.current()? {
            None => return Err(ParsingError::UnexpectedEnd),
            Some(token) => match token.word() {
                Some(word) => word.to_owned(),
                None => return Err(ParsingError::ExpectedFilename(token.clone())),
            },
        };
        self.tokens.advance();

        Ok(Redirection { descriptor, target })
    }
}

/// Tokenizes and parses one line of input.
///
/// Example
/// ```
/// use line_shell::parser::{parse, Redirection};
/// let line = parse("echo hi 2>err.txt").unwrap();
/// assert_eq!(line.command.name.as_deref(), Some("echo"));
/// assert_eq!(line.command.args, ["hi"]);
/// assert_eq!(line.redirects, [Redirection { descriptor: 2, target: "err.txt".into() }]);
/// ```
pub fn parse(line: &str) -> Result<CommandLine, ParsingError> {
    Parser::new(lexer::tokenize(line)).parse()
}
