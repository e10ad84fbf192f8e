//! Lexicon-based sentiment scoring: four bounded channels plus a thresholded label.
//!
//! `LexiconScorer` follows the VADER recipe: per-token valences adjusted for boosters,
//! negation, capitalisation and a contrastive "but", summed and squashed into a
//! compound score in [-1, 1]; neg/neu/pos are the proportions of each polarity.

use crate::error::LoadError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub neg: f64,      // [0, 1]
    pub neu: f64,      // [0, 1]
    pub pos: f64,      // [0, 1]
    pub compound: f64, // [-1, 1]
}

impl SentimentScores {
    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_compound(self.compound)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub const THRESHOLD: f64 = 0.05;

    /// `≥ 0.05` positive, `≤ -0.05` negative, otherwise neutral.
    pub fn from_compound(compound: f64) -> Self {
        if compound >= Self::THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= -Self::THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" => Some(SentimentLabel::Negative),
            "neutral" => Some(SentimentLabel::Neutral),
            "positive" => Some(SentimentLabel::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that turns cleaned text into sentiment channels.
pub trait SentimentScorer {
    fn polarity_scores(&self, text: &str) -> SentimentScores;
}

// ----------------------------- Lexicon scorer -----------------------------

const BOOST: f64 = 0.293;
const CAPS_BOOST: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAIM_BOOST: f64 = 0.292;
const MAX_EXCLAIMS: usize = 4;
const NORMALIZE_ALPHA: f64 = 15.0;

const BUILTIN_LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8), ("awesome", 3.1), ("beautiful", 2.9), ("best", 3.2), ("better", 1.9),
    ("clean", 1.7), ("comfortable", 1.9), ("comfy", 1.9), ("cool", 1.3), ("dope", 1.6),
    ("enjoy", 2.2), ("excellent", 2.7), ("excited", 1.4), ("favorite", 2.0), ("fire", 1.0),
    ("fresh", 1.3), ("fun", 2.3), ("glad", 2.0), ("good", 1.9), ("gorgeous", 3.0),
    ("great", 3.1), ("happy", 2.7), ("impressive", 2.3), ("incredible", 2.8), ("like", 1.5),
    ("liked", 1.8), ("love", 3.2), ("loved", 2.9), ("lovely", 2.8), ("loves", 2.7),
    ("nice", 1.8), ("perfect", 2.7), ("recommend", 1.5), ("solid", 1.2), ("stylish", 1.8),
    ("thanks", 1.9), ("win", 2.8), ("wonderful", 2.7), ("worth", 0.9), ("wow", 2.8),
    ("angry", -2.3), ("annoying", -1.7), ("awful", -2.0), ("bad", -2.5), ("boring", -1.3),
    ("broke", -1.8), ("broken", -1.5), ("cheap", -0.5), ("disappointed", -1.9),
    ("disappointing", -2.2), ("expensive", -0.5), ("fail", -2.5), ("failed", -2.3),
    ("fake", -2.1), ("garbage", -2.4), ("hate", -2.7), ("hated", -3.2), ("horrible", -2.5),
    ("hurt", -2.4), ("hurts", -2.1), ("overpriced", -1.6), ("pain", -2.3), ("poor", -2.1),
    ("problem", -1.7), ("problems", -1.7), ("sad", -2.1), ("scam", -2.3), ("sucks", -1.5),
    ("terrible", -2.5), ("trash", -1.5), ("ugly", -2.3), ("uncomfortable", -1.6),
    ("useless", -1.8), ("waste", -1.8), ("worse", -2.1), ("worst", -3.1), ("wrong", -2.1),
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOST), ("completely", BOOST), ("extremely", BOOST), ("highly", BOOST),
    ("incredibly", BOOST), ("most", BOOST), ("really", BOOST), ("so", BOOST),
    ("super", BOOST), ("totally", BOOST), ("very", BOOST),
    ("barely", -BOOST), ("hardly", -BOOST), ("less", -BOOST), ("slightly", -BOOST),
    ("somewhat", -BOOST),
];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "didnt", "doesnt", "dont", "hadnt",
    "hasnt", "havent", "isnt", "neither", "never", "no", "nobody", "none", "nor",
    "not", "nothing", "nowhere", "shouldnt", "wasnt", "werent", "without", "wont", "wouldnt",
];

#[derive(Clone, Debug)]
pub struct LexiconScorer {
    lexicon: AHashMap<String, f64>,
    boosters: AHashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LexiconScorer {
    /// Small built-in lexicon suited to product/brand chatter.
    pub fn builtin() -> Self {
        let lexicon = BUILTIN_LEXICON.iter().map(|(w, v)| (w.to_string(), *v)).collect();
        Self { lexicon, boosters: BOOSTERS.iter().copied().collect() }
    }

    /// Load a VADER-format lexicon (`token<TAB>mean<TAB>...` per line), replacing the
    /// built-in entries. Unparseable lines are skipped.
    pub fn from_lexicon_file(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|e| LoadError::Io { path: path.to_path_buf(), source: e })?;
        let mut lexicon = AHashMap::new();
        for line in text.lines() {
            let mut cols = line.split('\t');
            let (Some(token), Some(mean)) = (cols.next(), cols.next()) else { continue };
            if let Ok(v) = mean.trim().parse::<f64>() {
                lexicon.insert(token.trim().to_lowercase(), v);
            }
        }
        tracing::info!(path = %path.display(), entries = lexicon.len(), "Loaded sentiment lexicon");
        Ok(Self { lexicon, boosters: BOOSTERS.iter().copied().collect() })
    }

    pub fn with_entry(mut self, token: impl AsRef<str>, valence: f64) -> Self {
        self.lexicon.insert(token.as_ref().to_lowercase(), valence);
        self
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }

    fn valence_at(&self, words: &[Word], i: usize, mixed_case: bool) -> f64 {
        let w = &words[i];
        if self.boosters.contains_key(w.lower.as_str()) {
            return 0.0;
        }
        let Some(&base) = self.lexicon.get(&w.lower) else { return 0.0 };
        // signum(0.0) is 1.0, so a neutral entry must not pick up modifiers
        if base == 0.0 {
            return 0.0;
        }
        let mut v = base;

        if w.shouting && mixed_case {
            v += CAPS_BOOST * v.signum();
        }

        // boosters/dampeners up to three words back; further ones count less
        for back in 1..=3usize {
            let Some(j) = i.checked_sub(back) else { break };
            if let Some(&b) = self.boosters.get(words[j].lower.as_str()) {
                let mut scalar = b * v.signum();
                if words[j].shouting && mixed_case {
                    scalar += CAPS_BOOST * v.signum();
                }
                match back {
                    2 => scalar *= 0.95,
                    3 => scalar *= 0.9,
                    _ => {}
                }
                v += scalar;
            }
        }

        let negated = (1..=3usize)
            .filter_map(|back| i.checked_sub(back))
            .any(|j| is_negation(&words[j].lower));
        if negated {
            v *= NEGATION_SCALAR;
        }
        v
    }
}

impl SentimentScorer for LexiconScorer {
    fn polarity_scores(&self, text: &str) -> SentimentScores {
        let words = tokenize(text);
        if words.is_empty() {
            return SentimentScores::default();
        }
        let mixed_case = words.iter().any(|w| w.shouting) && words.iter().any(|w| !w.shouting && w.has_alpha);

        let mut valences: Vec<f64> = (0..words.len()).map(|i| self.valence_at(&words, i, mixed_case)).collect();

        // "but" shifts weight to the clause after it
        if let Some(k) = words.iter().position(|w| w.lower == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < k {
                    *v *= 0.5;
                } else if i > k {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        let exclaims = text.matches('!').count().min(MAX_EXCLAIMS);
        let emphasis = exclaims as f64 * EXCLAIM_BOOST;
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }
        let compound = (sum / (sum * sum + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0);

        let mut pos_sum = 0.0;
        let mut neg_sum = 0.0;
        let mut neu_count = 0.0;
        for &v in &valences {
            if v > 0.0 {
                pos_sum += v + 1.0;
            } else if v < 0.0 {
                neg_sum += v - 1.0;
            } else {
                neu_count += 1.0;
            }
        }
        if pos_sum > neg_sum.abs() {
            pos_sum += emphasis;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= emphasis;
        }
        let total = pos_sum + neg_sum.abs() + neu_count;
        if total == 0.0 {
            return SentimentScores::default();
        }

        SentimentScores {
            neg: round_to(neg_sum.abs() / total, 3),
            neu: round_to(neu_count / total, 3),
            pos: round_to(pos_sum / total, 3),
            compound: round_to(compound, 4),
        }
    }
}

struct Word {
    lower: String,
    shouting: bool,
    has_alpha: bool,
}

fn tokenize(text: &str) -> Vec<Word> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|t| !t.is_empty())
        .map(|t| {
            let has_alpha = t.chars().any(char::is_alphabetic);
            Word {
                lower: t.to_lowercase().replace('\'', ""),
                shouting: has_alpha && t.chars().count() > 1 && !t.chars().any(char::is_lowercase),
                has_alpha,
            }
        })
        .collect()
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word)
}

fn round_to(x: f64, places: i32) -> f64 {
    let m = 10f64.powi(places);
    (x * m).round() / m
}
