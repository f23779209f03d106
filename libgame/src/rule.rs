use std::{fmt, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Living neighbor counts deciding births and survivals.
///
/// Counts keep the order they were written in; duplicates are allowed and harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub birth: Vec<u8>,
    pub survive: Vec<u8>,
}

impl Rule {
    pub fn new(birth: Vec<u8>, survive: Vec<u8>) -> Self {
        Self { birth, survive }
    }

    pub fn births_on(&self, alive_neighbor_count: u8) -> bool {
        self.birth.contains(&alive_neighbor_count)
    }

    pub fn survives_on(&self, alive_neighbor_count: u8) -> bool {
        self.survive.contains(&alive_neighbor_count)
    }

    /// Replaces this rule with the one described by `text`.
    ///
    /// Blank text leaves the rule alone. Malformed text is logged and also leaves the rule
    /// alone. Returns whether the rule changed.
    pub fn update_from(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        match text.parse::<Rule>() {
            Ok(rule) => {
                *self = rule;
                true
            }
            Err(e) => {
                log::warn!("Keeping rule {self}: {e}");
                false
            }
        }
    }

    /// The `<survive>/<birth>` notation used by `#R` lines of coordinate files.
    pub fn to_survive_birth(&self) -> String {
        format!("{}/{}", digits_to_string(&self.survive), digits_to_string(&self.birth))
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            birth: vec![3],
            survive: vec![2, 3],
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "b{}s{}",
            digits_to_string(&self.birth),
            digits_to_string(&self.survive)
        )
    }
}

impl FromStr for Rule {
    type Err = RuleParseError;

    /// Accepts `B<digits>/S<digits>` (case-insensitive letters, optional slash) or
    /// `<survive digits>/<birth digits>`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();

        parse_birth_survive(trimmed)
            .or_else(|| parse_survive_birth(trimmed))
            .ok_or_else(|| RuleParseError::Malformed(trimmed.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleParseError {
    #[error("rule text {0:?} is neither B<digits>/S<digits> nor <digits>/<digits>")]
    Malformed(String),
}

fn parse_birth_survive(text: &str) -> Option<Rule> {
    let rest = text.strip_prefix(|c: char| c == 'b' || c == 'B')?;
    let (birth, rest) = split_digits(rest);

    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let rest = rest.strip_prefix(|c: char| c == 's' || c == 'S')?;
    let (survive, rest) = split_digits(rest);

    rest.is_empty()
        .then(|| Rule::new(string_to_digits(birth), string_to_digits(survive)))
}

fn parse_survive_birth(text: &str) -> Option<Rule> {
    let (survive, rest) = split_digits(text);
    let rest = rest.strip_prefix('/')?;
    let (birth, rest) = split_digits(rest);

    rest.is_empty()
        .then(|| Rule::new(string_to_digits(birth), string_to_digits(survive)))
}

fn split_digits(text: &str) -> (&str, &str) {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text.split_at(end)
}

fn string_to_digits(text: &str) -> Vec<u8> {
    text.bytes().map(|b| b - b'0').collect()
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().join("")
}
