//! Sentiment scoring for aggregated article text.
//!
//! The pipeline only depends on the [`SentimentOracle`] trait: any scorer
//! returning a value in `[-100, 100]` can be plugged in. [`LexiconScorer`] is
//! the built-in oracle, a valence-lexicon scorer modelled on VADER:
//!
//! 1. Each token found in the lexicon contributes its valence.
//! 2. A booster word ("very", "slightly", ...) within the three preceding
//!    tokens shifts the valence by [`BOOSTER_INCREMENT`], damped by distance.
//! 3. A negation within the three preceding tokens multiplies the valence
//!    by [`NEGATION_SCALAR`].
//! 4. The sum is normalised with `x / sqrt(x² + alpha)` and scaled by 100.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Normalisation constant for the compound score.
pub const NORMALIZATION_ALPHA: f64 = 15.0;
/// Valence multiplier applied after a negation.
pub const NEGATION_SCALAR: f64 = -0.74;
/// Valence shift contributed by a booster word.
pub const BOOSTER_INCREMENT: f64 = 0.293;

const LOOKBACK: usize = 3;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+(?:'[A-Za-z]+)?").unwrap());

/// A scorer returning aggregate sentiment for a block of text.
pub trait SentimentOracle {
    /// Sentiment of `text` in `[-100, 100]`.
    fn score(&self, text: &str) -> f64;
}

/// Valence-lexicon sentiment scorer.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<String, f64>,
    boosters: HashMap<String, f64>,
    negations: Vec<String>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    /// Create a scorer with the built-in English news lexicon.
    pub fn new() -> Self {
        let valences = VALENCES
            .iter()
            .map(|(w, v)| ((*w).to_string(), *v))
            .collect();
        let boosters = BOOSTERS
            .iter()
            .map(|(w, up)| {
                let inc = if *up { BOOSTER_INCREMENT } else { -BOOSTER_INCREMENT };
                ((*w).to_string(), inc)
            })
            .collect();
        let negations = NEGATIONS.iter().map(|w| (*w).to_string()).collect();
        Self {
            valences,
            boosters,
            negations,
        }
    }

    /// Add or override lexicon entries. Valences use the `[-4, 4]` scale.
    pub fn with_valences<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        for (word, valence) in entries {
            self.valences.insert(word.into().to_lowercase(), valence);
        }
        self
    }

    fn is_negation(&self, token: &str) -> bool {
        token.ends_with("n't") || self.negations.iter().any(|n| n == token)
    }

    /// Sum of token valences after booster and negation adjustment.
    fn raw_sum(&self, tokens: &[String]) -> f64 {
        let mut total = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.valences.get(token) else {
                continue;
            };
            let mut valence = base;
            let start = i.saturating_sub(LOOKBACK);
            for (distance, prev) in tokens[start..i].iter().rev().enumerate() {
                if let Some(&inc) = self.boosters.get(prev) {
                    let damp = 1.0 - 0.05 * distance as f64;
                    let inc = inc * damp;
                    valence += if valence >= 0.0 { inc } else { -inc };
                }
            }
            if tokens[start..i].iter().any(|prev| self.is_negation(prev)) {
                valence *= NEGATION_SCALAR;
            }
            total += valence;
        }
        total
    }
}

impl SentimentOracle for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let tokens: Vec<String> = TOKEN_RE
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        let sum = self.raw_sum(&tokens);
        if sum == 0.0 {
            return 0.0;
        }
        let compound = sum / (sum * sum + NORMALIZATION_ALPHA).sqrt();
        (compound.clamp(-1.0, 1.0) * 100.0).clamp(-100.0, 100.0)
    }
}

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "without",
    "cannot", "isnt", "arent", "wasnt", "werent", "dont", "doesnt", "didnt", "wont", "cant",
];

const BOOSTERS: &[(&str, bool)] = &[
    ("absolutely", true),
    ("completely", true),
    ("deeply", true),
    ("enormously", true),
    ("especially", true),
    ("extremely", true),
    ("highly", true),
    ("hugely", true),
    ("incredibly", true),
    ("most", true),
    ("really", true),
    ("remarkably", true),
    ("so", true),
    ("substantially", true),
    ("totally", true),
    ("very", true),
    ("barely", false),
    ("hardly", false),
    ("marginally", false),
    ("partly", false),
    ("slightly", false),
    ("somewhat", false),
];

const VALENCES: &[(&str, f64)] = &[
    // positive
    ("accomplish", 1.8),
    ("advance", 1.3),
    ("agree", 1.5),
    ("approve", 1.7),
    ("approved", 1.8),
    ("benefit", 2.0),
    ("best", 3.2),
    ("better", 1.9),
    ("boost", 1.7),
    ("breakthrough", 2.3),
    ("celebrate", 2.7),
    ("confident", 2.2),
    ("cure", 2.0),
    ("effective", 2.1),
    ("excellent", 3.2),
    ("excited", 2.4),
    ("gain", 2.0),
    ("gains", 1.8),
    ("good", 1.9),
    ("great", 3.1),
    ("grow", 1.4),
    ("growth", 1.6),
    ("happy", 2.7),
    ("healthy", 1.7),
    ("hope", 1.9),
    ("improve", 1.9),
    ("improved", 2.1),
    ("innovative", 1.9),
    ("success", 2.7),
    ("successful", 2.8),
    ("love", 3.2),
    ("opportunity", 1.8),
    ("optimistic", 2.1),
    ("positive", 2.6),
    ("progress", 1.8),
    ("record", 0.8),
    ("recover", 1.4),
    ("recovery", 1.4),
    ("rally", 1.5),
    ("rise", 1.0),
    ("safe", 1.9),
    ("strong", 2.3),
    ("support", 1.7),
    ("surge", 1.2),
    ("thrive", 2.3),
    ("top", 0.8),
    ("win", 2.8),
    ("wins", 2.7),
    ("winning", 2.4),
    ("won", 2.7),
    // negative
    ("attack", -2.1),
    ("bad", -2.5),
    ("ban", -2.6),
    ("bankrupt", -2.6),
    ("collapse", -2.2),
    ("concern", -1.4),
    ("concerns", -1.4),
    ("crash", -1.7),
    ("crisis", -3.1),
    ("cut", -1.1),
    ("cuts", -1.2),
    ("damage", -2.2),
    ("dead", -3.3),
    ("death", -2.9),
    ("decline", -1.1),
    ("disease", -1.7),
    ("drop", -1.1),
    ("fail", -2.5),
    ("failure", -2.3),
    ("fall", -0.6),
    ("fear", -2.2),
    ("fears", -2.2),
    ("fraud", -2.8),
    ("hack", -1.2),
    ("hurt", -2.4),
    ("kill", -3.7),
    ("killed", -3.5),
    ("lawsuit", -0.9),
    ("lose", -1.6),
    ("loss", -1.3),
    ("losses", -1.7),
    ("lost", -1.3),
    ("poor", -2.1),
    ("problem", -1.7),
    ("recession", -2.1),
    ("risk", -1.1),
    ("scandal", -1.9),
    ("slump", -1.6),
    ("terrible", -2.1),
    ("threat", -2.4),
    ("war", -2.9),
    ("weak", -1.9),
    ("worry", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
];
