//! Keyword slot extraction from user messages.
//!
//! Pulls structured preferences out of free text: interest tags, how much
//! the user cares about sustainability, budget tier, travel style, season,
//! and trip duration. Everything is keyword tables plus one duration
//! pattern; unmatched slots stay `None`.

use regex::Regex;
use serde::Serialize;

/// Preferences recognized in a single message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedEntities {
    pub interests: Vec<String>,
    /// 0-10, mapped from phrase intensity
    pub sustainability_preference: Option<f32>,
    /// 1 (budget) to 5 (luxury)
    pub budget_level: Option<u8>,
    pub travel_style: Option<String>,
    pub season: Option<String>,
    pub duration_days: Option<u32>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.interests.is_empty()
            && self.sustainability_preference.is_none()
            && self.budget_level.is_none()
            && self.travel_style.is_none()
            && self.season.is_none()
            && self.duration_days.is_none()
    }
}

/// Rule-based entity extractor.
pub struct EntityExtractor {
    interest_keywords: Vec<(&'static str, Vec<&'static str>)>,
    sustainability_phrases: Vec<(f32, Vec<&'static str>)>,
    budget_phrases: Vec<(u8, Vec<&'static str>)>,
    travel_styles: Vec<(&'static str, Vec<&'static str>)>,
    seasons: Vec<(&'static str, Vec<&'static str>)>,
    duration_pattern: Regex,
}

impl EntityExtractor {
    pub fn new() -> Self {
        Self {
            interest_keywords: vec![
                ("beach", vec!["beach", "ocean", "sea", "coastal", "swimming"]),
                ("mountain", vec!["mountain", "hiking", "climbing", "trek", "peak"]),
                ("culture", vec!["culture", "history", "museum", "art", "heritage"]),
                ("nature", vec!["nature", "wildlife", "forest", "outdoors", "scenic"]),
                ("adventure", vec!["adventure", "thrill", "extreme", "adrenaline"]),
                ("relaxation", vec!["relax", "peaceful", "calm", "tranquil", "spa"]),
                ("food", vec!["food", "cuisine", "culinary", "dining", "restaurant"]),
                ("urban", vec!["city", "urban", "shopping", "nightlife", "modern"]),
            ],
            // Most specific phrases first so "moderately sustainable" or
            // "not very eco" does not stop at the generic "sustainable"/"eco"
            sustainability_phrases: vec![
                (9.5, vec!["extremely sustainable", "most sustainable", "greenest", "very eco", "fully eco"]),
                (6.0, vec!["somewhat sustainable", "fairly green", "moderately sustainable"]),
                (4.0, vec!["not too concerned about sustainability", "not very eco", "not focused on sustainability"]),
                (8.0, vec!["very sustainable", "eco-friendly", "environmentally friendly", "sustainable", "green", "eco"]),
            ],
            budget_phrases: vec![
                (5, vec!["luxury", "high-end", "five star", "premium", "upscale"]),
                (3, vec!["mid range", "moderate", "standard", "reasonable", "not too expensive"]),
                (1, vec!["budget", "cheap", "affordable", "inexpensive", "low cost"]),
            ],
            travel_styles: vec![
                ("solo", vec!["solo", "alone", "by myself", "independent"]),
                ("couple", vec!["couple", "romantic", "honeymoon", "with partner"]),
                ("family", vec!["family", "with kids", "children", "family-friendly"]),
                ("friends", vec!["friends", "group"]),
                ("business", vec!["business", "work trip", "conference"]),
            ],
            seasons: vec![
                ("summer", vec!["summer", "july", "august", "june"]),
                ("winter", vec!["winter", "snow", "december", "january", "february"]),
                ("spring", vec!["spring", "blossom", "march", "april", "may"]),
                ("fall", vec!["fall", "autumn", "foliage", "september", "october", "november"]),
            ],
            duration_pattern: Regex::new(r"(\d+)\s*(day|days|week|weeks|month|months)")
                .expect("hard-coded duration pattern"),
        }
    }

    /// Extract every recognizable slot from a message.
    pub fn extract(&self, message: &str) -> ExtractedEntities {
        let message = message.to_lowercase();
        let mut entities = ExtractedEntities::default();

        for (interest, keywords) in &self.interest_keywords {
            if keywords.iter().any(|kw| contains_word(&message, kw)) {
                entities.interests.push(interest.to_string());
            }
        }

        // First (most intense) phrase group that matches wins
        for (value, phrases) in &self.sustainability_phrases {
            if phrases.iter().any(|p| message.contains(p)) {
                entities.sustainability_preference = Some(*value);
                break;
            }
        }

        for (level, phrases) in &self.budget_phrases {
            if phrases.iter().any(|p| message.contains(p)) {
                entities.budget_level = Some(*level);
                break;
            }
        }

        for (style, phrases) in &self.travel_styles {
            if phrases.iter().any(|p| message.contains(p)) {
                entities.travel_style = Some(style.to_string());
                break;
            }
        }

        for (season, phrases) in &self.seasons {
            if phrases.iter().any(|p| contains_word(&message, p)) {
                entities.season = Some(season.to_string());
                break;
            }
        }

        if let Some(captures) = self.duration_pattern.captures(&message) {
            if let Ok(value) = captures[1].parse::<u32>() {
                let days = match &captures[2] {
                    unit if unit.starts_with("week") => value * 7,
                    unit if unit.starts_with("month") => value * 30,
                    _ => value,
                };
                entities.duration_days = Some(days);
            }
        }

        entities
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Word-boundary containment without compiling a regex per keyword.
fn contains_word(message: &str, word: &str) -> bool {
    message.match_indices(word).any(|(start, _)| {
        let end = start + word.len();
        let boundary_before = start == 0
            || !message[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let boundary_after = end == message.len()
            || !message[end..].chars().next().is_some_and(char::is_alphanumeric);
        boundary_before && boundary_after
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_interests() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("I love hiking and wildlife watching");
        assert!(entities.interests.contains(&"mountain".to_string()));
        assert!(entities.interests.contains(&"nature".to_string()));
    }

    #[test]
    fn test_word_boundaries_prevent_partial_matches() {
        let extractor = EntityExtractor::new();
        // "seaside" must not match the "sea" keyword
        let entities = extractor.extract("thinking about seasides");
        assert!(!entities.interests.contains(&"beach".to_string()));
    }

    #[test]
    fn test_sustainability_intensity_mapping() {
        let extractor = EntityExtractor::new();
        assert_eq!(
            extractor.extract("I want the greenest option").sustainability_preference,
            Some(9.5)
        );
        assert_eq!(
            extractor.extract("something eco-friendly please").sustainability_preference,
            Some(8.0)
        );
        assert_eq!(
            extractor
                .extract("moderately sustainable is fine")
                .sustainability_preference,
            Some(6.0)
        );
    }

    #[test]
    fn test_budget_and_style() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("a cheap romantic getaway");
        assert_eq!(entities.budget_level, Some(1));
        assert_eq!(entities.travel_style, Some("couple".to_string()));
    }

    #[test]
    fn test_duration_conversion() {
        let extractor = EntityExtractor::new();
        assert_eq!(extractor.extract("for 10 days").duration_days, Some(10));
        assert_eq!(extractor.extract("about 2 weeks").duration_days, Some(14));
        assert_eq!(extractor.extract("one 1 month trip").duration_days, Some(30));
    }

    #[test]
    fn test_empty_extraction() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("zzz");
        assert!(entities.is_empty());
    }
}
