use valuation_core::{NewsArticle, Recommendation, SentimentResult, SentimentScorer};

pub mod lexicon;
pub use lexicon::LexiconSentimentScorer;

/// Aggregates per-article sentiment into one recency-weighted score.
///
/// Articles arrive most-recent-first from the news feed and keep that
/// delivered order; the weight for the article at 1-based rank `i` is `1/i`,
/// so earlier (typically fresher) entries dominate. Articles without a
/// description are skipped but still consume their rank slot — rank is the
/// position in the original sequence, not a re-index among scored entries.
pub struct NewsSentimentAggregator;

impl NewsSentimentAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(
        &self,
        articles: &[NewsArticle],
        scorer: &dyn SentimentScorer,
    ) -> SentimentResult {
        let mut total = 0.0;
        let mut scored = 0usize;

        for (index, article) in articles.iter().enumerate() {
            let rank = index + 1;
            let Some(description) = article.description.as_deref() else {
                continue;
            };
            let polarity = scorer.score(description);
            total += polarity * (1.0 / rank as f64);
            scored += 1;
        }

        let recommendation = if total > 0.0 {
            Recommendation::Buy
        } else if total < 0.0 {
            Recommendation::Sell
        } else {
            // Also covers the zero-qualifying-articles case
            Recommendation::Hold
        };

        tracing::debug!(
            articles = articles.len(),
            scored,
            aggregate_score = total,
            recommendation = recommendation.as_str(),
            "news sentiment aggregated"
        );

        SentimentResult {
            aggregate_score: total,
            recommendation,
        }
    }
}

impl Default for NewsSentimentAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    /// Scorer returning a fixed polarity per text, standing in for the
    /// external scoring collaborator.
    struct FixedScorer {
        scores: HashMap<&'static str, f64>,
    }

    impl SentimentScorer for FixedScorer {
        fn score(&self, text: &str) -> f64 {
            self.scores.get(text).copied().unwrap_or(0.0)
        }
    }

    fn article(description: Option<&str>) -> NewsArticle {
        NewsArticle {
            title: "headline".to_string(),
            description: description.map(str::to_string),
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            url: "https://example.com/a".to_string(),
            source: Some("Example Wire".to_string()),
        }
    }

    #[test]
    fn harmonic_weights_follow_delivered_rank() {
        let scorer = FixedScorer {
            scores: HashMap::from([("great", 0.8), ("bad", -0.4)]),
        };
        let articles = vec![
            article(Some("great")),
            article(None),
            article(Some("bad")),
        ];

        let result = NewsSentimentAggregator::new().aggregate(&articles, &scorer);

        // The null-description article at rank 2 keeps its slot: the third
        // article is still weighted 1/3, not 1/2.
        let expected = 0.8 / 1.0 + (-0.4) / 3.0;
        assert!((result.aggregate_score - expected).abs() < 1e-9);
        assert_eq!(result.recommendation, Recommendation::Buy);
    }

    #[test]
    fn empty_feed_is_hold() {
        let scorer = FixedScorer {
            scores: HashMap::new(),
        };
        let result = NewsSentimentAggregator::new().aggregate(&[], &scorer);
        assert_eq!(result.aggregate_score, 0.0);
        assert_eq!(result.recommendation, Recommendation::Hold);
    }

    #[test]
    fn all_null_descriptions_is_hold() {
        let scorer = FixedScorer {
            scores: HashMap::new(),
        };
        let articles = vec![article(None), article(None)];
        let result = NewsSentimentAggregator::new().aggregate(&articles, &scorer);
        assert_eq!(result.aggregate_score, 0.0);
        assert_eq!(result.recommendation, Recommendation::Hold);
    }

    #[test]
    fn net_negative_sentiment_is_sell() {
        let scorer = FixedScorer {
            scores: HashMap::from([("meh", 0.1), ("awful", -0.9)]),
        };
        let articles = vec![article(Some("awful")), article(Some("meh"))];
        let result = NewsSentimentAggregator::new().aggregate(&articles, &scorer);
        assert!(result.aggregate_score < 0.0);
        assert_eq!(result.recommendation, Recommendation::Sell);
    }
}
