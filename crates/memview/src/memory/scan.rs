//! Byte-pattern signatures and the scanner contract.
//!
//! Pattern text is a whitespace separated list of tokens:
//! - `48`: literal byte (hex)
//! - `?` / `??`: any byte
//! - `*`: any byte, captured; four consecutive `*` form one 32-bit displacement
//!
//! [`Scanner::find_point`] resolves the capture as a RIP-relative reference
//! (target = end of displacement + displacement), [`Scanner::find_val`]
//! returns the captured value itself.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::reader::{Address, ReadMemory};
use super::snapshot::SnapshotMemory;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Byte(u8),
    Any,
    Capture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<Token>,
}

impl Pattern {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Position of the first captured byte
    pub fn capture_offset(&self) -> Option<usize> {
        self.tokens.iter().position(|t| *t == Token::Capture)
    }

    /// Check the pattern against `window`, which must be at least `len()` bytes
    pub fn matches(&self, window: &[u8]) -> bool {
        window.len() >= self.tokens.len()
            && self.tokens.iter().zip(window).all(|(t, b)| match t {
                Token::Byte(v) => v == b,
                Token::Any | Token::Capture => true,
            })
    }

    /// All match positions inside `haystack`
    pub fn find_in(&self, haystack: &[u8]) -> Vec<usize> {
        if self.tokens.len() > haystack.len() {
            return Vec::new();
        }
        let last_start = haystack.len() - self.tokens.len();

        // Anchor on the first literal byte to skip most positions quickly
        let anchor = self.tokens.iter().enumerate().find_map(|(i, t)| match t {
            Token::Byte(v) => Some((i, *v)),
            _ => None,
        });
        match anchor {
            Some((offset, byte)) => memchr::memchr_iter(byte, &haystack[offset..])
                .filter(|&pos| pos <= last_start)
                .filter(|&pos| self.matches(&haystack[pos..]))
                .collect(),
            None => (0..=last_start).collect(),
        }
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(pattern: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        for token in pattern.split_whitespace() {
            let parsed = match token {
                "??" | "?" => Token::Any,
                "*" => Token::Capture,
                _ => Token::Byte(u8::from_str_radix(token, 16).map_err(|e| {
                    Error::InvalidPattern(format!("Invalid signature token '{}': {}", token, e))
                })?),
            };
            tokens.push(parsed);
        }

        if tokens.is_empty() {
            return Err(Error::InvalidPattern("Signature pattern is empty".to_string()));
        }

        let captures = tokens.iter().filter(|t| **t == Token::Capture).count();
        if captures > 0 {
            let start = tokens.iter().position(|t| *t == Token::Capture).unwrap_or(0);
            let contiguous = tokens[start..]
                .iter()
                .take(captures)
                .all(|t| *t == Token::Capture);
            if captures != 4 || !contiguous {
                return Err(Error::InvalidPattern(format!(
                    "'{}' must capture exactly four consecutive bytes",
                    pattern
                )));
            }
        }

        Ok(Self { tokens })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .tokens
            .iter()
            .map(|t| match t {
                Token::Byte(value) => format!("{:02X}", value),
                Token::Any => "??".to_string(),
                Token::Capture => "*".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&text)
    }
}

/// Signature scanning over the target's executable image
pub trait Scanner: ReadMemory {
    /// Absolute addresses where `pattern` starts
    fn scan(&self, pattern: &Pattern) -> Result<Vec<Address>>;

    /// Targets of the RIP-relative displacement captured by `pattern`
    fn find_point(&self, pattern: &str) -> Result<Vec<Address>> {
        let points: Vec<Address> = self
            .find_val(pattern)?
            .into_iter()
            .map(|(capture, disp)| (capture + 4).wrapping_add_signed(disp))
            .collect();
        debug!("find_point({}) -> {} hit(s)", pattern, points.len());
        Ok(points)
    }

    /// Captured displacement values, paired with where each was captured
    fn find_val(&self, pattern: &str) -> Result<Vec<(Address, i64)>> {
        let parsed: Pattern = pattern.parse()?;
        let offset = parsed.capture_offset().ok_or_else(|| {
            Error::InvalidPattern(format!("'{}' has no capture bytes", pattern))
        })? as Address;
        self.scan(&parsed)?
            .into_iter()
            .map(|hit| {
                let capture = hit + offset;
                Ok((capture, self.read_i32(capture)? as i64))
            })
            .collect()
    }
}

impl Scanner for SnapshotMemory {
    fn scan(&self, pattern: &Pattern) -> Result<Vec<Address>> {
        Ok(self
            .regions()
            .iter()
            .flat_map(|r| {
                pattern
                    .find_in(&r.bytes)
                    .into_iter()
                    .map(|pos| r.base + pos as Address)
            })
            .collect())
    }
}

/// First hit of a scan, or [`Error::PatternNotFound`]
pub fn first_hit<T>(hits: Vec<T>, pattern: &str) -> Result<T> {
    hits.into_iter()
        .next()
        .ok_or_else(|| Error::PatternNotFound(pattern.to_string()))
}
