use serde::Deserialize;

/// Confidence above which a blocked category flags the text.
pub const BLOCK_THRESHOLD: f64 = 0.6;

/// Provider categories that cause content to be flagged. Other categories
/// (e.g. Politics, Finance) are informational and never block.
pub const BLOCKED_CATEGORIES: [&str; 5] = [
    "Toxic",
    "Profanity",
    "Sexual",
    "Violent",
    "Death, Harm & Tragedy",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Clean,
    Flagged { category: String, confidence: f64 },
}

impl Verdict {
    pub fn is_flagged(&self) -> bool {
        matches!(self, Verdict::Flagged { .. })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub confidence: f64,
}

/// Maps provider category scores to a verdict: flagged when any blocked
/// category exceeds the threshold, clean otherwise.
pub fn verdict_from_scores(scores: &[CategoryScore]) -> Verdict {
    for score in scores {
        if score.confidence > BLOCK_THRESHOLD
            && BLOCKED_CATEGORIES.contains(&score.name.as_str())
        {
            return Verdict::Flagged {
                category: score.name.clone(),
                confidence: score.confidence,
            };
        }
    }
    Verdict::Clean
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(name: &str, confidence: f64) -> CategoryScore {
        CategoryScore {
            name: name.to_string(),
            confidence,
        }
    }

    #[test]
    fn empty_scores_are_clean() {
        assert_eq!(verdict_from_scores(&[]), Verdict::Clean);
    }

    #[test]
    fn blocked_category_above_threshold_flags() {
        let verdict = verdict_from_scores(&[score("Profanity", 0.92)]);
        assert_eq!(
            verdict,
            Verdict::Flagged {
                category: "Profanity".to_string(),
                confidence: 0.92
            }
        );
    }

    #[test]
    fn blocked_category_at_threshold_is_clean() {
        assert_eq!(
            verdict_from_scores(&[score("Toxic", BLOCK_THRESHOLD)]),
            Verdict::Clean
        );
    }

    #[test]
    fn unblocked_category_never_flags() {
        assert_eq!(
            verdict_from_scores(&[score("Politics", 0.99)]),
            Verdict::Clean
        );
    }

    #[test]
    fn first_blocked_category_wins() {
        let verdict = verdict_from_scores(&[
            score("Insult", 0.9),
            score("Violent", 0.7),
            score("Toxic", 0.95),
        ]);
        assert!(matches!(
            verdict,
            Verdict::Flagged { category, .. } if category == "Violent"
        ));
    }
}
