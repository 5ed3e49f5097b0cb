//! Ticker lists.
//!
//! A run always receives its tickers explicitly. Symbols are trimmed,
//! upper-cased and de-duplicated, keeping the order they were first seen in.

use crate::error::Result;
use std::path::Path;

/// Tickers used when none are given.
pub const DEFAULT_TICKERS: [&str; 1] = ["AMZN"];

/// Normalized, ordered list of ticker symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerList {
    symbols: Vec<String>,
}

impl TickerList {
    /// Build a list from raw symbols.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for symbol in symbols {
            list.push(symbol.as_ref());
        }
        list
    }

    /// Parse symbols separated by commas or whitespace.
    pub fn parse(input: &str) -> Self {
        Self::new(input.split(|c: char| c == ',' || c.is_whitespace()))
    }

    /// Read a ticker file: one or more symbols per line, `#` starts a comment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut list = Self::default();
        for line in contents.lines() {
            let line = line.split('#').next().unwrap_or_default();
            list.extend(&Self::parse(line));
        }
        Ok(list)
    }

    /// Append a symbol unless it is blank or already present.
    pub fn push(&mut self, symbol: &str) {
        let symbol = symbol.trim().to_ascii_uppercase();
        if !symbol.is_empty() && !self.symbols.contains(&symbol) {
            self.symbols.push(symbol);
        }
    }

    /// Append every symbol of `other`, keeping first-seen order.
    pub fn extend(&mut self, other: &Self) {
        for symbol in &other.symbols {
            self.push(symbol);
        }
    }

    /// Symbols in order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Whether `symbol` (any case) is in the list.
    pub fn contains(&self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_ascii_uppercase();
        self.symbols.contains(&symbol)
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// This list, or the default tickers when it is empty.
    #[must_use]
    pub fn or_default_tickers(self) -> Self {
        if self.is_empty() {
            Self::default_tickers()
        } else {
            self
        }
    }

    /// The default ticker list.
    pub fn default_tickers() -> Self {
        Self::new(DEFAULT_TICKERS)
    }
}

impl<'a> IntoIterator for &'a TickerList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AAPL", &["AAPL"])]
    #[case(" aapl , msft ", &["AAPL", "MSFT"])]
    #[case("msft aapl\tMSFT", &["MSFT", "AAPL"])]
    #[case("brk.b,,", &["BRK.B"])]
    #[case("", &[])]
    fn test_parse(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(TickerList::parse(input).symbols(), expected);
    }

    #[test]
    fn test_new_dedupes_in_first_seen_order() {
        let list = TickerList::new(["goog", "AMZN", "Goog", "amzn", "meta"]);
        assert_eq!(list.symbols(), ["GOOG", "AMZN", "META"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let list = TickerList::parse("AMZN");
        assert!(list.contains("amzn"));
        assert!(list.contains(" Amzn "));
        assert!(!list.contains("MSFT"));
    }

    #[test]
    fn test_default_tickers() {
        assert_eq!(TickerList::default_tickers().symbols(), ["AMZN"]);
        assert_eq!(TickerList::default().or_default_tickers().len(), 1);
        assert_eq!(
            TickerList::parse("MSFT").or_default_tickers().symbols(),
            ["MSFT"]
        );
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("fundus_tickers_{}.txt", std::process::id()));
        std::fs::write(&path, "# big tech\naapl msft\n\namzn # retail\nAAPL\n").unwrap();

        let list = TickerList::from_file(&path).unwrap();
        assert_eq!(list.symbols(), ["AAPL", "MSFT", "AMZN"]);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_from_missing_file() {
        let path = std::env::temp_dir().join("fundus_no_such_tickers_file.txt");
        assert!(TickerList::from_file(&path).is_err());
    }

    #[test]
    fn test_iterates_in_order() {
        let list = TickerList::parse("MSFT AMZN");
        let symbols: Vec<&str> = list.into_iter().map(String::as_str).collect();
        assert_eq!(symbols, ["MSFT", "AMZN"]);
        assert_eq!(list.len(), 2);
    }
}
