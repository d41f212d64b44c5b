//! English cardinal numbers to integers.
//!
//! Accepts digit strings ("12") and number words up to the trillions
//! ("two hundred and five", "one thousand three hundred"). Scales above one
//! hundred close a group: "two million five" is 2_000_005.

use thiserror::Error;

const UNITS: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 5] = ["hundred", "thousand", "million", "billion", "trillion"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NumberError {
    #[error("unrecognized number word: {0}")]
    UnrecognizedWord(String),
    #[error("number out of range: {0}")]
    Overflow(String),
}

/// `(scale, increment)` for one lower-case word.
fn lookup(word: &str) -> Option<(u64, u64)> {
    if word == "and" {
        return Some((1, 0));
    }
    if let Some(idx) = UNITS.iter().position(|w| *w == word) {
        return Some((1, idx as u64));
    }
    if let Some(idx) = TENS.iter().position(|w| !w.is_empty() && *w == word) {
        return Some((1, idx as u64 * 10));
    }
    SCALES
        .iter()
        .position(|w| *w == word)
        .map(|idx| (10u64.pow(if idx == 0 { 2 } else { idx as u32 * 3 }), 0))
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
}

/// True for a number word or hyphenated compound ("seven", "twenty-one").
/// The joiner "and" alone does not count.
pub fn is_number_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    let mut any = false;
    for part in words(&lower) {
        if part == "and" || lookup(part).is_none() {
            return false;
        }
        any = true;
    }
    any
}

/// Parse a digit string or a sequence of English number words.
pub fn parse_number(text: &str) -> Result<u64, NumberError> {
    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed
            .parse()
            .map_err(|_| NumberError::Overflow(trimmed.to_string()));
    }

    let overflow = || NumberError::Overflow(trimmed.to_string());
    let lower = trimmed.to_lowercase();
    let mut current = 0u64;
    let mut result = 0u64;
    for word in words(&lower) {
        let (scale, increment) =
            lookup(word).ok_or_else(|| NumberError::UnrecognizedWord(word.to_string()))?;
        current = current
            .checked_mul(scale)
            .and_then(|c| c.checked_add(increment))
            .ok_or_else(overflow)?;
        if scale > 100 {
            result = result.checked_add(current).ok_or_else(overflow)?;
            current = 0;
        }
    }
    result.checked_add(current).ok_or_else(overflow)
}
