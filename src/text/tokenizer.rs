use tokenizers::pre_tokenizers::split::{Split, SplitPattern};
use tokenizers::{
    OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, SplitDelimiterBehavior,
};

use super::error::TextError;

/// Treebank-style word rules, tried left to right at every position:
///
/// 1. the stem of a negated contraction (`ca` in `can't`)
/// 2. the negation clitic itself (`n't`)
/// 3. other English clitics (`'s`, `'re`, `'ve`, `'ll`, `'d`, `'m`)
/// 4. a word: a run of anything but whitespace and ASCII punctuation, keeping internal
///    `.` `,` `-` between runs (`3.5`, `e-mail`). Non-ASCII marks such as `„` or `“`
///    stay attached (`„Hallo“`).
/// 5. any single ASCII punctuation character other than `_`
const WORD_PATTERN: &str = concat!(
    r"\w+(?=n't\b)|n't\b|'(?:s|re|ve|ll|d|m)\b",
    r"|[^\s!-/:-@\[-\^`{-~]+(?:[.,\-][^\s!-/:-@\[-\^`{-~]+)*",
    r"|[!-/:-@\[-\^`{-~]",
);

/// Splits raw text into an ordered sequence of word tokens.
///
/// No casing or punctuation normalization happens here. The rule set is compiled once
/// at construction and the tokenizer is stateless per call.
#[derive(Clone)]
pub struct Tokenizer {
    rules: Split,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("pattern", &WORD_PATTERN)
            .finish()
    }
}

impl Tokenizer {
    pub fn new() -> Result<Self, TextError> {
        let rules = Split::new(
            SplitPattern::Regex(WORD_PATTERN.to_string()),
            SplitDelimiterBehavior::Removed,
            true,
        )
        .map_err(|e| TextError::TokenizerInit {
            reason: e.to_string(),
        })?;

        Ok(Self { rules })
    }

    /// Tokenizes `text`. Empty or whitespace-only input yields an empty sequence.
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>, TextError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut pretokenized = PreTokenizedString::from(text);
        self.rules
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| TextError::TokenizationFailed {
                reason: e.to_string(),
            })?;

        Ok(pretokenized
            .get_splits(OffsetReferential::Original, OffsetType::Byte)
            .into_iter()
            .map(|(token, _, _)| token.to_string())
            .filter(|token| !token.trim().is_empty())
            .collect())
    }
}
