//! Invocation parameters
//!
//! The program takes a single optional argument of `key=value` pairs joined by `|`:
//!
//! ```text
//! switch=1|headphones=Headphones|speakers=Speakers (Realtek)
//! ```
//!
//! Recognized keys are `switch` (presence only), `headphones` and `speakers`.
//! Unknown keys are kept so presentation code can read them.

use std::collections::HashMap;

use crate::error::UsageError;

/// Presence-only flag selecting non-interactive toggle-and-exit mode
pub const SWITCH_KEY: &str = "switch";
/// Display-name fragment of the headphones endpoint
pub const HEADPHONES_KEY: &str = "headphones";
/// Display-name fragment of the speakers endpoint
pub const SPEAKERS_KEY: &str = "speakers";

const PAIR_DELIMITER: char = '|';
const KEY_VALUE_SEPARATOR: char = '=';

/// Parsed invocation parameters, immutable after construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationArgs {
    values: HashMap<String, String>,
}

impl InvocationArgs {
    /// Parse the delimited invocation string
    ///
    /// Values are taken verbatim (no trimming); only the first `=` of a pair
    /// separates key from value.
    ///
    /// # Errors
    /// Returns [`UsageError::MissingSeparator`] for a pair without `=` (including
    /// an empty pair) and [`UsageError::DuplicateKey`] when a key repeats.
    pub fn parse(raw: &str) -> Result<Self, UsageError> {
        let mut values = HashMap::new();

        for pair in raw.split(PAIR_DELIMITER) {
            let (key, value) = pair
                .split_once(KEY_VALUE_SEPARATOR)
                .ok_or_else(|| UsageError::MissingSeparator(pair.to_string()))?;

            if values.insert(key.to_string(), value.to_string()).is_some() {
                return Err(UsageError::DuplicateKey(key.to_string()));
            }
        }

        Ok(Self { values })
    }

    /// Parse an optional argument; absence yields an empty map
    ///
    /// # Errors
    /// See [`InvocationArgs::parse`].
    pub fn from_optional(raw: Option<&str>) -> Result<Self, UsageError> {
        raw.map_or_else(|| Ok(Self::default()), Self::parse)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Whether non-interactive switch mode was requested
    #[must_use]
    pub fn is_switch(&self) -> bool {
        self.contains(SWITCH_KEY)
    }

    #[must_use]
    pub fn headphones(&self) -> Option<&str> {
        self.get(HEADPHONES_KEY)
    }

    #[must_use]
    pub fn speakers(&self) -> Option<&str> {
        self.get(SPEAKERS_KEY)
    }

    /// Both fragments, as required by the toggle
    ///
    /// # Errors
    /// Returns [`UsageError::MissingParameter`] naming the first absent key.
    pub fn toggle_targets(&self) -> Result<(&str, &str), UsageError> {
        let headphones = self
            .headphones()
            .ok_or(UsageError::MissingParameter(HEADPHONES_KEY))?;
        let speakers = self
            .speakers()
            .ok_or(UsageError::MissingParameter(SPEAKERS_KEY))?;
        Ok((headphones, speakers))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_targets_without_switch() {
        let args = InvocationArgs::parse("headphones=A|speakers=B").unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args.headphones(), Some("A"));
        assert_eq!(args.speakers(), Some("B"));
        assert!(!args.is_switch());
    }

    #[test]
    fn test_parse_full_switch_invocation() {
        let args =
            InvocationArgs::parse("switch=1|headphones=Headphones|speakers=Speakers (Realtek)")
                .unwrap();
        assert!(args.is_switch());
        assert_eq!(args.get(SWITCH_KEY), Some("1"));
        assert_eq!(args.speakers(), Some("Speakers (Realtek)"));
    }

    #[test]
    fn test_switch_with_empty_value_still_counts() {
        let args = InvocationArgs::parse("switch=").unwrap();
        assert!(args.is_switch());
        assert_eq!(args.get(SWITCH_KEY), Some(""));
    }

    #[test]
    fn test_value_keeps_later_separators() {
        let args = InvocationArgs::parse("speakers=Out=Line").unwrap();
        assert_eq!(args.speakers(), Some("Out=Line"));
    }

    #[test]
    fn test_missing_separator_is_usage_error() {
        assert_eq!(
            InvocationArgs::parse("switch|headphones=A"),
            Err(UsageError::MissingSeparator("switch".to_string()))
        );
    }

    #[test]
    fn test_empty_string_is_usage_error() {
        assert_eq!(
            InvocationArgs::parse(""),
            Err(UsageError::MissingSeparator(String::new()))
        );
    }

    #[test]
    fn test_duplicate_key_is_usage_error() {
        assert_eq!(
            InvocationArgs::parse("headphones=A|headphones=B"),
            Err(UsageError::DuplicateKey("headphones".to_string()))
        );
    }

    #[test]
    fn test_absent_argument_is_empty() {
        let args = InvocationArgs::from_optional(None).unwrap();
        assert!(args.is_empty());
        assert!(!args.is_switch());
    }

    #[test]
    fn test_toggle_targets_requires_both() {
        let args = InvocationArgs::parse("switch=1|headphones=A").unwrap();
        assert_eq!(
            args.toggle_targets(),
            Err(UsageError::MissingParameter(SPEAKERS_KEY))
        );

        let args = InvocationArgs::parse("headphones=A|speakers=B").unwrap();
        assert_eq!(args.toggle_targets(), Ok(("A", "B")));
    }
}
