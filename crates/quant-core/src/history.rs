use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::constants::ALPHABET_SIZE;

/// One letter of the history alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Symbol {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
}

impl Symbol {
    pub const ALL: [Symbol; ALPHABET_SIZE] = [Self::Zero, Self::One, Self::Two, Self::Three];

    /// Child slot this symbol selects in a tree node.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Zero),
            '1' => Some(Self::One),
            '2' => Some(Self::Two),
            '3' => Some(Self::Three),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        (b'0' + self as u8) as char
    }
}

impl TryFrom<u8> for Symbol {
    type Error = ParseHistoryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(ParseHistoryError::InvalidSymbol(value as char))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseHistoryError {
    Empty,
    InvalidSymbol(char),
}

impl fmt::Display for ParseHistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseHistoryError::Empty => write!(f, "history must not be empty"),
            ParseHistoryError::InvalidSymbol(c) => {
                write!(f, "invalid history symbol {c:?} (expected 0-3)")
            }
        }
    }
}

impl std::error::Error for ParseHistoryError {}

/// A non-empty sequence of symbols, the key of the prefix tree.
///
/// The empty sequence names the tree root, which exists structurally but is
/// never addressed by a user, so `History` refuses to hold it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct History(Vec<Symbol>);

impl History {
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, ParseHistoryError> {
        if symbols.is_empty() {
            return Err(ParseHistoryError::Empty);
        }
        Ok(Self(symbols))
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// True if `self` equals `other` or lies beneath it in the tree.
    pub fn starts_with(&self, other: &History) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl Deref for History {
    type Target = [Symbol];

    fn deref(&self) -> &[Symbol] {
        &self.0
    }
}

impl TryFrom<Vec<Symbol>> for History {
    type Error = ParseHistoryError;

    fn try_from(symbols: Vec<Symbol>) -> Result<Self, Self::Error> {
        Self::new(symbols)
    }
}

impl FromStr for History {
    type Err = ParseHistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols = s
            .chars()
            .map(|c| Symbol::from_digit(c).ok_or(ParseHistoryError::InvalidSymbol(c)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(symbols)
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}
