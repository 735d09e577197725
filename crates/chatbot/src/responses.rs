//! Response text generation.
//!
//! Turns structured results (recommendations, sustainability profiles,
//! counterfactuals, activity lists) into conversational text. Template
//! variants rotate per turn so repeated intents do not read identically,
//! while staying fully deterministic for a given turn counter.

use data_loader::{Activity, Destination};
use engine::Recommendation;
use std::collections::BTreeMap;
use sustainability::{Counterfactual, SustainabilityProfile};

use crate::dialogue::DialogueState;

const GREETINGS: &[&str] = &[
    "Hello! I'm your sustainable tourism assistant. How can I help you find eco-friendly travel destinations today?",
    "Hi there! I'm here to help you discover sustainable travel options. What kind of trip are you planning?",
    "Welcome! I'm your guide to environmentally responsible travel. What sort of destination are you interested in?",
];

const FAREWELLS: &[&str] = &[
    "Thank you for using the sustainable tourism assistant. Have a wonderful trip and safe travels!",
    "It was great helping you find sustainable travel options. Enjoy your journey!",
    "Safe travels and enjoy your sustainable adventure! Feel free to return if you need more recommendations.",
];

const THANK_YOU: &[&str] = &[
    "You're welcome! I'm happy to help with sustainable travel planning.",
    "My pleasure! Sustainable tourism benefits both travelers and destinations.",
    "Glad I could help! Enjoy your eco-friendly adventure.",
];

const FALLBACKS: &[&str] = &[
    "I'm not sure I fully understood. Could you tell me more about what you're looking for in a sustainable destination?",
    "I'd like to help you better. Can you share more details about your travel preferences?",
    "I want to make sure I give you the best recommendations. Could you clarify what you're looking for?",
];

/// Generates the chatbot's natural-language replies.
pub struct ResponseGenerator;

impl ResponseGenerator {
    pub fn new() -> Self {
        Self
    }

    fn pick<'a>(&self, templates: &'a [&str], turn: usize) -> &'a str {
        templates[turn % templates.len()]
    }

    pub fn greeting(&self, turn: usize) -> String {
        self.pick(GREETINGS, turn).to_string()
    }

    pub fn farewell(&self, turn: usize) -> String {
        self.pick(FAREWELLS, turn).to_string()
    }

    pub fn thank_you(&self, turn: usize) -> String {
        self.pick(THANK_YOU, turn).to_string()
    }

    pub fn fallback(&self, turn: usize) -> String {
        self.pick(FALLBACKS, turn).to_string()
    }

    pub fn reset_confirmation(&self) -> String {
        "I've reset our conversation. What kind of trip are you interested in?".to_string()
    }

    pub fn help(&self) -> String {
        let mut text = String::from("I'm your sustainable tourism assistant. Here's how I can help you:\n\n");
        text.push_str("- Find eco-friendly travel destinations based on your preferences\n");
        text.push_str("- Explain sustainability features of destinations\n");
        text.push_str("- Compare different destinations on sustainability factors\n");
        text.push_str("- Suggest sustainable activities at your chosen destinations\n");
        text.push_str("- Provide detailed information about destinations\n\n");
        text.push_str(
            "To get started, tell me what kind of trip you're looking for and any preferences you have.",
        );
        text
    }

    /// Format a recommendation list; top three with scores.
    pub fn recommendations(&self, recommendations: &[Recommendation]) -> String {
        if recommendations.is_empty() {
            return "I'd need a bit more information to make tailored recommendations. \
                    Could you tell me what kinds of activities you enjoy or what landscapes you prefer?"
                .to_string();
        }

        let mut text = String::from("Based on your preferences, I recommend these sustainable destinations:\n\n");
        for (rank, rec) in recommendations.iter().take(3).enumerate() {
            text.push_str(&format!(
                "{}. {} ({}) - Sustainability score: {:.1}/10\n",
                rank + 1,
                rec.name,
                rec.country,
                rec.sustainability_score
            ));
        }
        text.push_str("\nWould you like to know more about any of these destinations or see how they compare?");
        text
    }

    /// General explanation of what sustainable tourism means, for
    /// sustainability questions with no destination in context.
    pub fn general_sustainability(&self) -> String {
        "Sustainable tourism minimizes negative environmental impacts while supporting local \
         communities. Key aspects include reducing carbon emissions, conserving water, minimizing \
         waste, protecting biodiversity, and ensuring economic benefits reach local people. \
         Would you like me to recommend destinations with strong sustainability practices?"
            .to_string()
    }

    /// Destination-specific sustainability rundown from a full profile.
    pub fn sustainability_profile(&self, profile: &SustainabilityProfile) -> String {
        let mut text = format!(
            "About the sustainability of {} ({}), rated {:.1}/10 overall:\n\n",
            profile.name, profile.country, profile.overall_score
        );

        text.push_str("Sustainability metrics:\n");
        for reading in &profile.metrics {
            text.push_str(&format!("- {}: {:.1}/10\n", reading.kind.label(), reading.value));
        }

        if !profile.strengths.is_empty() {
            let labels: Vec<&str> = profile.strengths.iter().map(|k| k.label()).collect();
            text.push_str(&format!("\nStandout strengths: {}.\n", labels.join(", ")));
        }
        if !profile.weaknesses.is_empty() {
            let labels: Vec<&str> = profile.weaknesses.iter().map(|k| k.label()).collect();
            text.push_str(&format!("Room to improve: {}.\n", labels.join(", ")));
        }

        if !profile.certifications.is_empty() {
            text.push_str(&format!(
                "\nCertifications held: {}.\n",
                profile.certifications.join(", ")
            ));
        }

        text.push_str("\nWould you like to know about eco-friendly activities at this destination?");
        text
    }

    /// Phrase a counterfactual result; "no better alternative" is good news.
    pub fn counterfactual(&self, result: &Counterfactual) -> String {
        match result {
            Counterfactual::NoneFound { destination_name, .. } => format!(
                "{} is already the most sustainable option among comparable destinations. \
                 No better alternative found!",
                destination_name
            ),
            Counterfactual::Found(report) => {
                let mut text = format!(
                    "If sustainability matters most, consider {} instead of {}: it scores {:.1}/10 \
                     versus {:.1}/10 ({:+.1} points).\n",
                    report.better_destination_name,
                    report.destination_name,
                    report.better_score,
                    report.current_score,
                    report.score_difference
                );
                if !report.improvement_areas.is_empty() {
                    let labels: Vec<&str> =
                        report.improvement_areas.iter().map(|k| k.label()).collect();
                    text.push_str(&format!("It does notably better on: {}.", labels.join(", ")));
                }
                text
            }
        }
    }

    /// Head-to-head sustainability comparison of two destinations.
    pub fn comparison(
        &self,
        first: &Destination,
        first_score: f32,
        second: &Destination,
        second_score: f32,
    ) -> String {
        let mut text = format!("Comparing {} and {}:\n\n", first.name, second.name);
        text.push_str(&format!(
            "Sustainability: {} scores {:.1}/10, {} scores {:.1}/10.\n",
            first.name, first_score, second.name, second_score
        ));

        let diff = (first_score - second_score).abs();
        if first_score > second_score {
            text.push_str(&format!(
                "{} is more sustainable, by {:.1} points.\n",
                first.name, diff
            ));
        } else if second_score > first_score {
            text.push_str(&format!(
                "{} is more sustainable, by {:.1} points.\n",
                second.name, diff
            ));
        } else {
            text.push_str("Both destinations have similar sustainability scores.\n");
        }

        text.push_str(&format!(
            "\nLandscape: {} offers {} landscapes, while {} features {} scenery.\n",
            first.name,
            first.landscape_type.to_lowercase(),
            second.name,
            second.landscape_type.to_lowercase()
        ));
        text.push_str("\nWould you like to know more about either of these destinations?");
        text
    }

    /// Details card for one destination.
    pub fn destination_details(&self, destination: &Destination, score: f32) -> String {
        let mut text = format!("About {}:\n\n", destination.name);
        text.push_str(&format!("Location: {}, {}\n", destination.country, destination.region));
        text.push_str(&format!("Landscape: {}\n", destination.landscape_type));
        text.push_str(&format!("Category: {}\n", destination.category));
        text.push_str(&format!("Sustainability score: {:.1}/10\n", score));

        if !destination.transportation_options.is_empty() {
            text.push_str(&format!(
                "Low-impact transport: {}\n",
                destination.transportation_options.join(", ")
            ));
        }
        if !destination.eco_certifications.is_empty() {
            text.push_str(&format!(
                "Eco-certifications: {}\n",
                destination.eco_certifications.join(", ")
            ));
        }

        text.push_str(
            "\nWould you like to know about sustainable activities here or its specific sustainability record?",
        );
        text
    }

    /// Activities at a destination, grouped by category, top three each.
    pub fn activities(&self, destination: &Destination, activities: &[&Activity]) -> String {
        if activities.is_empty() {
            return format!(
                "I don't have specific activities on file for {} yet. Its {} landscape is well \
                 suited to low-impact experiences with local guides.",
                destination.name,
                destination.landscape_type.to_lowercase()
            );
        }

        let mut by_category: BTreeMap<&str, Vec<&Activity>> = BTreeMap::new();
        for activity in activities {
            by_category.entry(activity.category.as_str()).or_default().push(activity);
        }

        let mut text = format!("Sustainable activities in {}:\n\n", destination.name);
        for (category, group) in by_category {
            text.push_str(&format!("{}:\n", category));
            for activity in group.iter().take(3) {
                text.push_str(&format!(
                    "- {} (eco-friendly rating: {:.1}/10)\n",
                    activity.name, activity.eco_friendliness
                ));
            }
            text.push('\n');
        }
        text.push_str("Would you like more specific information about any of these activities?");
        text
    }

    /// Confirm the preferences accumulated so far.
    pub fn preference_confirmation(&self, state: &DialogueState) -> String {
        let mut text = String::from("I've updated your preferences. ");

        if !state.interests.is_empty() {
            text.push_str(&format!("You're interested in {}. ", state.interests.join(", ")));
        }
        if let Some(preference) = state.sustainability_preference {
            let level = if preference > 9.0 {
                "very high"
            } else if preference > 7.0 {
                "high"
            } else if preference > 5.0 {
                "medium"
            } else {
                "low"
            };
            text.push_str(&format!("I've noted your {} interest in sustainability. ", level));
        }
        if let Some(budget) = state.budget_level {
            let tier = if budget >= 5 {
                "luxury"
            } else if budget >= 3 {
                "mid-range"
            } else {
                "budget"
            };
            text.push_str(&format!("You're looking for {} options. ", tier));
        }
        if let Some(style) = &state.travel_style {
            text.push_str(&format!("You prefer {} travel. ", style));
        }

        text.push_str("\nWould you like me to recommend some destinations based on these preferences?");
        text
    }
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new()
    }
}
