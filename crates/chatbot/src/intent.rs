//! Keyword-based intent classification.
//!
//! Intents are matched with word-boundary patterns in a fixed priority
//! order; the first intent with a matching pattern wins. This is slot
//! matching, not language understanding, and that is the point: the
//! chatbot's job is routing to the recommend/explain calls.

use regex::Regex;
use serde::Serialize;

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Intent {
    Greeting,
    Farewell,
    ThankYou,
    GetRecommendations,
    AskSustainability,
    CompareDestinations,
    SetPreference,
    AskDestination,
    AskActivities,
    Help,
    Reset,
    GeneralQuery,
}

/// Classifies user messages into intents with keyword patterns.
pub struct IntentClassifier {
    patterns: Vec<(Intent, Vec<Regex>)>,
}

impl IntentClassifier {
    pub fn new() -> Self {
        // Priority order matters: earlier intents win on multi-match input
        let table: Vec<(Intent, &[&str])> = vec![
            (
                Intent::Greeting,
                &[
                    r"\bhello\b",
                    r"\bhi\b",
                    r"\bhey\b",
                    r"\bgreetings\b",
                    r"\bgood\s(morning|afternoon|evening)\b",
                    r"\bhowdy\b",
                ],
            ),
            (
                Intent::Farewell,
                &[r"\bgoodbye\b", r"\bbye\b", r"\bsee you\b", r"\bthanks,?\s*bye\b"],
            ),
            (
                Intent::ThankYou,
                &[r"\bthanks?\b", r"\bthank\s+you\b", r"\bappreciate\b", r"\bgrateful\b"],
            ),
            (
                Intent::GetRecommendations,
                &[
                    r"\brecommend\b",
                    r"\bsuggest\b",
                    r"\bwhere should\b",
                    r"\btravel to\b",
                    r"\bplace to visit\b",
                    r"\bwhere to go\b",
                    r"\bwhere can i\b",
                    r"\bshow me\b",
                ],
            ),
            (
                Intent::AskSustainability,
                &[
                    r"\bsustainab",
                    r"\beco-friendly\b",
                    r"\bgreen\b",
                    r"\benvironment",
                    r"\bcarbon footprint\b",
                    r"\beco\b",
                ],
            ),
            (
                Intent::CompareDestinations,
                &[
                    r"\bcompare\b",
                    r"\bdifference\b",
                    r"\bversus\b",
                    r"\bvs\b",
                    r"\bwhich (is|one|would|should)\b",
                    r"\bbetter (choice|alternative|option)\b",
                ],
            ),
            (
                Intent::SetPreference,
                &[
                    r"\bprefer\b",
                    r"\bi like\b",
                    r"\bi want\b",
                    r"\binterested\b",
                    r"\bbudget\b",
                    r"\bimportant to me\b",
                    r"\blooking for\b",
                ],
            ),
            (
                Intent::AskDestination,
                &[
                    r"\btell me about\b",
                    r"\bmore about\b",
                    r"\bdetails\b",
                    r"\binformation\b",
                    r"\bwhat is\b",
                    r"\bdescribe\b",
                ],
            ),
            (
                Intent::AskActivities,
                &[
                    r"\bactivities\b",
                    r"\bthings to do\b",
                    r"\bexperiences\b",
                    r"\btours\b",
                    r"\battractions\b",
                    r"\bwhat (can i|to) do\b",
                ],
            ),
            (
                Intent::Help,
                &[
                    r"\bhelp\b",
                    r"\bassist\b",
                    r"\bconfused\b",
                    r"\bhow does this work\b",
                    r"\bwhat can you do\b",
                ],
            ),
            (
                Intent::Reset,
                &[r"\breset\b", r"\brestart\b", r"\bstart over\b", r"\bnew search\b"],
            ),
        ];

        let patterns = table
            .into_iter()
            .map(|(intent, raw)| {
                let compiled = raw
                    .iter()
                    .map(|p| Regex::new(p).expect("hard-coded intent pattern"))
                    .collect();
                (intent, compiled)
            })
            .collect();

        Self { patterns }
    }

    /// Classify a message; `GeneralQuery` when nothing matches.
    pub fn classify(&self, message: &str) -> Intent {
        let message = message.to_lowercase();
        for (intent, patterns) in &self.patterns {
            if patterns.iter().any(|p| p.is_match(&message)) {
                return *intent;
            }
        }
        Intent::GeneralQuery
    }

    /// All matching intents with a crude confidence (matched pattern share,
    /// plus a base boost), sorted descending.
    pub fn classify_ranked(&self, message: &str) -> Vec<(Intent, f32)> {
        let message = message.to_lowercase();
        let mut results: Vec<(Intent, f32)> = self
            .patterns
            .iter()
            .filter_map(|(intent, patterns)| {
                let matches = patterns.iter().filter(|p| p.is_match(&message)).count();
                if matches == 0 {
                    return None;
                }
                let confidence = (matches as f32 / patterns.len() as f32 + 0.3).min(1.0);
                Some((*intent, confidence))
            })
            .collect();

        if results.is_empty() {
            results.push((Intent::GeneralQuery, 0.3));
        }
        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        results
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting() {
        let classifier = IntentClassifier::new();
        assert_eq!(classifier.classify("Hello there!"), Intent::Greeting);
        assert_eq!(classifier.classify("good morning"), Intent::Greeting);
    }

    #[test]
    fn test_recommendations() {
        let classifier = IntentClassifier::new();
        assert_eq!(
            classifier.classify("Can you recommend a place for summer?"),
            Intent::GetRecommendations
        );
        assert_eq!(
            classifier.classify("where should I travel this year"),
            Intent::GetRecommendations
        );
    }

    #[test]
    fn test_sustainability_question() {
        let classifier = IntentClassifier::new();
        assert_eq!(
            classifier.classify("how sustainable is Costa Verde?"),
            Intent::AskSustainability
        );
    }

    #[test]
    fn test_unmatched_message_is_general_query() {
        let classifier = IntentClassifier::new();
        assert_eq!(classifier.classify("qwertyuiop"), Intent::GeneralQuery);
    }

    #[test]
    fn test_priority_order_on_multi_match() {
        let classifier = IntentClassifier::new();
        // Matches both Greeting and GetRecommendations; greeting wins
        assert_eq!(
            classifier.classify("hi, recommend something"),
            Intent::Greeting
        );
    }

    #[test]
    fn test_ranked_returns_sorted_confidences() {
        let classifier = IntentClassifier::new();
        let ranked = classifier.classify_ranked("recommend an eco-friendly beach");
        assert!(ranked.len() >= 2);
        for pair in ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }
}
