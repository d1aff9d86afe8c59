use std::{io::BufRead, str::FromStr};

use super::{DecodeErr, Result};

/// Splits a buffered text stream into whitespace separated tokens.
///
/// Lines are pulled lazily, so many values can be decoded back to back from the
/// same reader regardless of how they are laid out in lines.
#[derive(Debug)]
pub struct TokenReader<R> {
    inner: R,
    line: String,
    pos: usize,
}

impl<R: BufRead> TokenReader<R> {
    /// Creates a new `TokenReader`.
    ///
    /// # Arguments
    /// * `inner` - The underlying buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: String::new(),
            pos: 0,
        }
    }

    /// Reads the next token.
    ///
    /// # Returns
    /// The token, `None` at the end of the stream or an io error.
    pub fn next_token(&mut self) -> Result<Option<&str>> {
        loop {
            let rest = &self.line[self.pos..];
            self.pos += rest.len() - rest.trim_start().len();

            if self.pos < self.line.len() {
                let start = self.pos;
                let rest = &self.line[start..];
                self.pos += rest.find(char::is_whitespace).unwrap_or(rest.len());
                return Ok(Some(&self.line[start..self.pos]));
            }

            self.line.clear();
            self.pos = 0;

            if self.inner.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
        }
    }

    /// Reads and parses the next token as the value of `field`.
    ///
    /// # Returns
    /// The parsed value, or a `DecodeErr` if the stream ended or the token is malformed.
    pub fn parse<T: FromStr>(&mut self, field: &'static str) -> Result<T> {
        match self.next_token()? {
            Some(token) => token.parse().map_err(|_| DecodeErr::InvalidToken {
                field,
                token: token.to_string(),
            }),
            None => Err(DecodeErr::Truncated { field }),
        }
    }

    /// Returns whether only whitespace is left in the stream.
    pub fn is_exhausted(&mut self) -> Result<bool> {
        loop {
            if !self.line[self.pos..].trim().is_empty() {
                return Ok(false);
            }

            self.line.clear();
            self.pos = 0;

            if self.inner.read_line(&mut self.line)? == 0 {
                return Ok(true);
            }
        }
    }
}
