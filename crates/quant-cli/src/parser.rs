use std::fmt;
use std::sync::LazyLock;

use quant_core::History;
use regex::Regex;

static SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(DECLARE|REMOVE|VALID) ([0-3]+)$").unwrap());
static ENERGY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ENERGY ([0-3]+)(?: ([0-9]+))?$").unwrap());
static EQUAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^EQUAL ([0-3]+) ([0-3]+)$").unwrap());

/// One input line, classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Blank line or `#` comment.
    Skip,
    Declare(History),
    Remove(History),
    Valid(History),
    EnergyCheck(History),
    EnergySet(History, u64),
    Equal(History, History),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Line is not valid UTF-8.
    Encoding,
    /// Unknown command or malformed arguments.
    Syntax,
    /// Energy is zero or does not fit in 64 bits.
    EnergyOutOfRange,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Encoding => write!(f, "line is not valid UTF-8"),
            ParseError::Syntax => write!(f, "malformed command"),
            ParseError::EnergyOutOfRange => write!(f, "energy must be in [1, 2^64 - 1]"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse one line, without its terminating newline.
///
/// Tokens are separated by exactly one space and nothing may trail the last
/// argument. Energies accept leading zeros but no sign.
pub fn parse_line(line: &[u8]) -> Result<Command, ParseError> {
    if line.is_empty() || line[0] == b'#' {
        return Ok(Command::Skip);
    }
    let line = std::str::from_utf8(line).map_err(|_| ParseError::Encoding)?;

    if let Some(caps) = SINGLE.captures(line) {
        let history = parse_history(&caps[2])?;
        return Ok(match &caps[1] {
            "DECLARE" => Command::Declare(history),
            "REMOVE" => Command::Remove(history),
            _ => Command::Valid(history),
        });
    }

    if let Some(caps) = ENERGY.captures(line) {
        let history = parse_history(&caps[1])?;
        return match caps.get(2) {
            None => Ok(Command::EnergyCheck(history)),
            Some(digits) => Ok(Command::EnergySet(history, parse_energy(digits.as_str())?)),
        };
    }

    if let Some(caps) = EQUAL.captures(line) {
        return Ok(Command::Equal(parse_history(&caps[1])?, parse_history(&caps[2])?));
    }

    Err(ParseError::Syntax)
}

fn parse_history(s: &str) -> Result<History, ParseError> {
    s.parse().map_err(|_| ParseError::Syntax)
}

fn parse_energy(digits: &str) -> Result<u64, ParseError> {
    match digits.parse::<u64>() {
        Ok(0) | Err(_) => Err(ParseError::EnergyOutOfRange),
        Ok(value) => Ok(value),
    }
}
