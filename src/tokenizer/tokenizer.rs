use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use stop_words::{get, LANGUAGE};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::{Language, TokenizerConfig};

/// Text tokenizer with stemming and stopword removal
pub struct Tokenizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

fn stemmer_algorithm(language: Language) -> Algorithm {
    match language {
        Language::English => Algorithm::English,
        Language::Russian => Algorithm::Russian,
        Language::German => Algorithm::German,
        Language::French => Algorithm::French,
        Language::Spanish => Algorithm::Spanish,
    }
}

fn stopword_language(language: Language) -> LANGUAGE {
    match language {
        Language::English => LANGUAGE::English,
        Language::Russian => LANGUAGE::Russian,
        Language::German => LANGUAGE::German,
        Language::French => LANGUAGE::French,
        Language::Spanish => LANGUAGE::Spanish,
    }
}

impl Tokenizer {
    /// Create a new tokenizer from configuration
    pub fn new(config: &TokenizerConfig) -> Self {
        let stemmer = if config.stem {
            Some(Stemmer::create(stemmer_algorithm(config.language)))
        } else {
            None
        };

        let stopwords = if config.remove_stopwords {
            get(stopword_language(config.language))
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect()
        } else {
            HashSet::new()
        };

        Self {
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    /// Tokenize text into a vector of terms
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .filter_map(|word| self.normalize(word))
            .collect()
    }

    /// Tokenize text keeping only the first occurrence of each term
    pub fn tokenize_unique(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokenize(text)
            .into_iter()
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }

    /// Compute term frequencies for a tokenized document
    pub fn compute_term_frequencies(&self, text: &str) -> HashMap<String, u32> {
        let mut freq = HashMap::new();
        for token in self.tokenize(text) {
            *freq.entry(token).or_insert(0) += 1;
        }
        freq
    }

    fn normalize(&self, word: &str) -> Option<String> {
        let token = if self.config.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        };

        let len = token.chars().count();
        if len < self.config.min_token_length || len > self.config.max_token_length {
            return None;
        }

        // Stopwords are matched before stemming
        if self.stopwords.contains(&token) {
            return None;
        }

        match &self.stemmer {
            Some(stemmer) => Some(stemmer.stem(&token).into_owned()),
            None => Some(token),
        }
    }
}
