//! Word-list sentiment scorer.
//!
//! Stands in for an external NLP scorer behind the [`SentimentScorer`] trait:
//! counts finance-flavored positive and negative terms, flips a match when a
//! negation word appears shortly before it, and normalizes the balance to
//! [-1, 1].

use std::collections::HashSet;

use valuation_core::SentimentScorer;

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "rally", "surge", "gain", "profit", "growth", "beat",
    "upgrade", "outperform", "strong", "positive", "rise", "increase",
    "breakthrough", "innovation", "success", "exceed", "momentum",
    "buy", "recommend", "optimistic", "record", "advance",
    "dividend", "buyback", "upside", "recovery", "rebound", "expansion",
    "robust", "accelerating", "raised", "tailwind",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "decline", "loss", "fall", "plunge", "crash", "miss",
    "downgrade", "underperform", "weak", "negative", "drop", "decrease",
    "concern", "risk", "fail", "disappoint", "slump", "sell",
    "warning", "pessimistic", "retreat", "fear", "trouble",
    "headwind", "lawsuit", "litigation", "recall", "investigation",
    "default", "bankruptcy", "layoff", "downside", "overvalued", "lowered",
];

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't",
    "hardly", "barely", "neither", "nor", "without",
];

const NEGATION_WINDOW: usize = 3;

pub struct LexiconSentimentScorer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negation: HashSet<&'static str>,
}

impl LexiconSentimentScorer {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negation: NEGATION_WORDS.iter().copied().collect(),
        }
    }
}

impl SentimentScorer for LexiconSentimentScorer {
    fn score(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')'))
            .filter(|w| !w.is_empty())
            .collect();

        let negation_positions: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.negation.contains(*w))
            .map(|(i, _)| i)
            .collect();

        let mut balance: i32 = 0;
        let mut matched: u32 = 0;

        for (i, word) in words.iter().enumerate() {
            let is_positive = self.positive.contains(*word);
            let is_negative = self.negative.contains(*word);

            if !is_positive && !is_negative {
                continue;
            }
            matched += 1;

            let negated = negation_positions
                .iter()
                .any(|&neg| neg < i && (i - neg) <= NEGATION_WINDOW);

            if is_positive {
                balance += if negated { -1 } else { 1 };
            } else {
                balance += if negated { 1 } else { -1 };
            }
        }

        if matched == 0 {
            return 0.0;
        }

        // Net balance over matched terms lands in [-1, 1] by construction
        balance as f64 / matched as f64
    }
}

impl Default for LexiconSentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_text_scores_positive() {
        let scorer = LexiconSentimentScorer::new();
        let score = scorer.score("Shares surge after record profit and strong growth");
        assert!(score > 0.0);
        assert!(score <= 1.0);
    }

    #[test]
    fn negative_text_scores_negative() {
        let scorer = LexiconSentimentScorer::new();
        let score = scorer.score("Stock plunges on weak guidance, lawsuit and layoff fears");
        assert!(score < 0.0);
        assert!(score >= -1.0);
    }

    #[test]
    fn neutral_text_scores_zero() {
        let scorer = LexiconSentimentScorer::new();
        assert_eq!(scorer.score("The company held its annual meeting on Tuesday"), 0.0);
        assert_eq!(scorer.score(""), 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        let scorer = LexiconSentimentScorer::new();
        // "not strong" counts against, single matched term
        let score = scorer.score("results were not strong");
        assert!(score < 0.0);
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let scorer = LexiconSentimentScorer::new();
        let texts = [
            "surge rally gain profit growth beat upgrade strong",
            "plunge crash loss decline miss downgrade weak bankruptcy",
            "gain loss gain loss",
        ];
        for text in texts {
            let score = scorer.score(text);
            assert!((-1.0..=1.0).contains(&score), "score {score} out of range for {text:?}");
        }
    }
}
