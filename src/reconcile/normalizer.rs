//! Channel name normalization
//!
//! Normalization is applied identically to query names and guide display
//! names, so matching stays symmetric. The steps run in a fixed order:
//! locale suffix, parenthesized segments, decoration tokens, punctuation,
//! case/whitespace folding, then optional number-word substitution.

use regex::Regex;

use crate::config::ReconcilerConfig;
use crate::errors::{AppError, AppResult};

/// A normalized name plus the numeric token it carried, if any
///
/// The number is detected either as a standalone digit token or as a word
/// from the configured vocabulary, so "Rai 1" and "Rai Uno" both report 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    pub text: String,
    pub number: Option<u32>,
}

/// Configurable name normalizer
pub struct NameNormalizer {
    decoration_regex: Vec<Regex>,
    paren_regex: Regex,
    non_word_regex: Regex,
    country_suffixes: Vec<String>,
    spell_out_numbers: bool,
    number_words: Vec<String>,
}

impl NameNormalizer {
    pub fn new(config: &ReconcilerConfig) -> AppResult<Self> {
        let mut decoration_regex = Vec::with_capacity(config.decoration_patterns.len());
        for pattern in &config.decoration_patterns {
            let regex = Regex::new(pattern).map_err(|e| {
                AppError::configuration(format!("invalid decoration pattern '{pattern}': {e}"))
            })?;
            decoration_regex.push(regex);
        }

        Ok(Self {
            decoration_regex,
            paren_regex: Regex::new(r"\([^)]*\)")
                .map_err(|e| AppError::configuration(e.to_string()))?,
            non_word_regex: Regex::new(r"[^\w\s]")
                .map_err(|e| AppError::configuration(e.to_string()))?,
            country_suffixes: config.country_suffixes.clone(),
            spell_out_numbers: config.spell_out_numbers,
            number_words: config.number_words.clone(),
        })
    }

    /// Normalize a raw channel name
    ///
    /// Total and deterministic: any input produces a result, and feeding a
    /// normalized name back in returns it unchanged.
    pub fn normalize(&self, raw: &str) -> NormalizedName {
        let mut name = raw.trim().to_string();

        for suffix in &self.country_suffixes {
            if suffix.is_ascii()
                && name.len() >= suffix.len()
                && name.is_char_boundary(name.len() - suffix.len())
                && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
            {
                name.truncate(name.len() - suffix.len());
                break;
            }
        }

        let name = self.paren_regex.replace_all(&name, "");

        let mut name = name.into_owned();
        for regex in &self.decoration_regex {
            name = regex.replace_all(&name, "").into_owned();
        }
        let name = self.non_word_regex.replace_all(&name, "");

        let mut number = None;
        let mut tokens: Vec<String> = name
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        for token in tokens.iter_mut() {
            if let Ok(value) = token.parse::<u32>() {
                if number.is_none() {
                    number = Some(value);
                }
                if self.spell_out_numbers {
                    if let Some(word) = self.number_words.get(value as usize) {
                        *token = word.clone();
                    }
                }
            } else if number.is_none() && self.spell_out_numbers {
                if let Some(value) = self.number_words.iter().position(|w| w == token) {
                    number = Some(value as u32);
                }
            }
        }

        NormalizedName {
            text: tokens.join(" "),
            number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn normalizer() -> NameNormalizer {
        NameNormalizer::new(&ReconcilerConfig::default()).unwrap()
    }

    #[rstest]
    #[case("Sky  Sport", "sky sport")]
    #[case("sky sport", "sky sport")]
    #[case("SKY SPORT HD", "sky sport")]
    #[case("Rai Premium (BACKUP)", "rai premium")]
    #[case("Canale 5 FullHD", "canale cinque")]
    #[case("Rai News 24.it", "rai news 24")]
    fn normalizes_known_shapes(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalizer().normalize(raw).text, expected);
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizer = normalizer();
        for raw in ["Rai Uno HD", "Sport 1 (IT)", "  DAZN  2  ", "Focus.it"] {
            let once = normalizer.normalize(raw);
            let twice = normalizer.normalize(&once.text);
            assert_eq!(once.text, twice.text, "not idempotent for {raw:?}");
            assert_eq!(once.number, twice.number, "number drifted for {raw:?}");
        }
    }

    #[test]
    fn extracts_digit_token() {
        let result = normalizer().normalize("Sport 1 HD");
        assert_eq!(result.text, "sport uno");
        assert_eq!(result.number, Some(1));
    }

    #[test]
    fn recognizes_number_word_as_numeric_token() {
        let result = normalizer().normalize("Sport Uno");
        assert_eq!(result.text, "sport uno");
        assert_eq!(result.number, Some(1));
    }

    #[test]
    fn leaves_large_numbers_as_digits() {
        let result = normalizer().normalize("Canale 34");
        assert_eq!(result.text, "canale 34");
        assert_eq!(result.number, Some(34));
    }

    #[test]
    fn strips_trailing_country_suffix_case_insensitively() {
        let result = normalizer().normalize("Rai 1.IT");
        assert_eq!(result.text, "rai uno");
    }

    #[test]
    fn handles_empty_and_symbol_only_input() {
        let normalizer = normalizer();
        assert_eq!(normalizer.normalize("").text, "");
        assert_eq!(normalizer.normalize("***").text, "");
        assert_eq!(normalizer.normalize("").number, None);
    }

    #[test]
    fn spell_out_can_be_disabled() {
        let config = ReconcilerConfig {
            spell_out_numbers: false,
            ..ReconcilerConfig::default()
        };
        let normalizer = NameNormalizer::new(&config).unwrap();
        let result = normalizer.normalize("Sport 1");
        assert_eq!(result.text, "sport 1");
        assert_eq!(result.number, Some(1));
        // Word forms are not recognized without the vocabulary pass
        assert_eq!(normalizer.normalize("Sport Uno").number, None);
    }

    #[test]
    fn rejects_invalid_decoration_pattern() {
        let config = ReconcilerConfig {
            decoration_patterns: vec!["(unclosed".to_string()],
            ..ReconcilerConfig::default()
        };
        assert!(NameNormalizer::new(&config).is_err());
    }
}
