//! A pull-based stream adapter with one item of lookahead.
//!
//! [`Cursor`] is shared by both stages of the front end: the lexer walks a
//! `Cursor<Chars>` and the parser walks a cursor over the lexer's tokens.

use std::iter::Fuse;

/// Wraps any iterator and exposes the item about to be consumed
/// ([`current`](Cursor::current)) and the one after it
/// ([`lookahead`](Cursor::lookahead)) without consuming either.
///
/// Nothing is pulled from the underlying iterator except on construction and
/// on [`advance`](Cursor::advance), so laziness of the source is preserved.
///
/// Example
/// ```
/// use line_shell::cursor::Cursor;
/// let mut chars = Cursor::new("ab".chars());
/// assert_eq!(chars.current(), Some(&'a'));
/// assert_eq!(chars.lookahead(), Some(&'b'));
/// chars.advance();
/// assert_eq!(chars.current(), Some(&'b'));
/// assert_eq!(chars.lookahead(), None);
/// ```
pub struct Cursor<I: Iterator> {
    source: Fuse<I>,
    current: Option<I::Item>,
    lookahead: Option<I::Item>,
}

impl<I: Iterator> Cursor<I> {
    /// Creates a cursor and primes both slots from `source`.
    pub fn new(source: I) -> Self {
        let mut source = source.fuse();
        let current = source.next();
        let lookahead = source.next();
        Self {
            source,
            current,
            lookahead,
        }
    }

    /// The item that would be consumed next.
    pub fn current(&self) -> Option<&I::Item> {
        self.current.as_ref()
    }

    /// The item right after [`current`](Cursor::current).
    pub fn lookahead(&self) -> Option<&I::Item> {
        self.lookahead.as_ref()
    }

    /// Shifts the lookahead into the current slot and pulls one more item.
    ///
    /// Calling this after the source is exhausted is a no-op that leaves
    /// both slots empty.
    pub fn advance(&mut self) {
        self.current = self.lookahead.take();
        self.lookahead = self.source.next();
    }
}

impl<I: Iterator> Iterator for Cursor<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.current.take()?;
        self.advance();
        Some(item)
    }
}
