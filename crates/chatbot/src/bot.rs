//! The chatbot itself: classify, extract, resolve, dispatch.
//!
//! Each message runs through the intent classifier and entity extractor,
//! updates the dialogue state, and is routed to the recommend/explain calls.
//! Everything comes back as plain text; recommender errors are phrased as
//! conversational replies rather than surfaced to the user.

use crate::dialogue::DialogueState;
use crate::entities::EntityExtractor;
use crate::intent::{Intent, IntentClassifier};
use crate::responses::ResponseGenerator;
use data_loader::{DestinationId, TravelIndex, UserId};
use engine::HybridRecommender;
use recommenders::RecommendError;
use regex::Regex;
use std::sync::Arc;
use sustainability::RecommendationExplainer;
use tracing::debug;

/// How many destinations a recommendation turn asks the engine for.
const RECOMMENDATION_COUNT: usize = 5;

/// Conversational front-end over the hybrid recommender and explainer.
///
/// The hybrid must be fitted before the first recommendation turn; an
/// untrained model is reported conversationally, not as an error.
pub struct TourismChatbot {
    index: Arc<TravelIndex>,
    hybrid: HybridRecommender,
    explainer: RecommendationExplainer,
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    responses: ResponseGenerator,
    state: DialogueState,
    /// Matches "number 2" / "option 2" references to the last shown list
    reference_pattern: Regex,
    turn: usize,
}

impl TourismChatbot {
    pub fn new(index: Arc<TravelIndex>, hybrid: HybridRecommender, user_id: UserId) -> Self {
        Self {
            explainer: RecommendationExplainer::new(index.clone()),
            classifier: IntentClassifier::new(),
            extractor: EntityExtractor::new(),
            responses: ResponseGenerator::new(),
            state: DialogueState::for_user(user_id),
            reference_pattern: Regex::new(r"\b(?:number|option)\s+(\d+)\b")
                .expect("hard-coded reference pattern"),
            hybrid,
            index,
            turn: 0,
        }
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    /// Process one user message and produce the reply.
    pub fn process_message(&mut self, message: &str) -> String {
        let turn = self.turn;
        self.turn += 1;

        let intent = self.classifier.classify(message);
        debug!("Turn {}: classified intent {:?}", turn, intent);

        let entities = self.extractor.extract(message);
        self.state.absorb(&entities);

        match intent {
            Intent::Greeting => self.responses.greeting(turn),
            Intent::Farewell => self.responses.farewell(turn),
            Intent::ThankYou => self.responses.thank_you(turn),
            Intent::Help => self.responses.help(),
            Intent::Reset => {
                self.state.reset();
                self.responses.reset_confirmation()
            }
            Intent::GetRecommendations => self.recommendation_turn(),
            Intent::AskSustainability => self.sustainability_turn(message),
            Intent::CompareDestinations => self.comparison_turn(message),
            Intent::AskDestination => self.destination_turn(message),
            Intent::AskActivities => self.activities_turn(message),
            Intent::SetPreference => self.responses.preference_confirmation(&self.state),
            Intent::GeneralQuery => self.responses.fallback(turn),
        }
    }

    fn recommendation_turn(&mut self) -> String {
        let Some(user_id) = self.state.user_id else {
            return self.responses.fallback(self.turn);
        };

        // A stated eco preference steers the weight knob; otherwise the
        // engine default applies.
        let weight = self
            .state
            .sustainability_preference
            .map(|preference| (preference / 10.0).clamp(0.0, 1.0))
            .unwrap_or(self.hybrid.config().default_sustainability_weight);

        match self
            .hybrid
            .recommend_weighted(user_id, RECOMMENDATION_COUNT, true, weight)
        {
            Ok(recommendations) => {
                let reply = self.responses.recommendations(&recommendations);
                self.state.last_destination =
                    recommendations.first().map(|r| r.destination_id);
                self.state.last_recommendations = recommendations;
                reply
            }
            Err(error) => self.phrase_error(&error),
        }
    }

    fn sustainability_turn(&mut self, message: &str) -> String {
        let Some(destination_id) = self.resolve_destination(message) else {
            return self.responses.general_sustainability();
        };
        self.state.last_destination = Some(destination_id);

        match self.explainer.explain_sustainability(destination_id) {
            Ok(profile) => self.responses.sustainability_profile(&profile),
            Err(_) => self.responses.general_sustainability(),
        }
    }

    fn comparison_turn(&mut self, message: &str) -> String {
        let mut mentioned = self.mentioned_destinations(message);

        // With nothing named, compare the top two of the last shown list
        if mentioned.len() < 2 && !self.state.last_recommendations.is_empty() {
            for rec in &self.state.last_recommendations {
                if mentioned.len() >= 2 {
                    break;
                }
                if !mentioned.contains(&rec.destination_id) {
                    mentioned.push(rec.destination_id);
                }
            }
        }

        match mentioned.as_slice() {
            [first, second, ..] => {
                let (Some(a), Some(b)) =
                    (self.index.destination(*first), self.index.destination(*second))
                else {
                    return self.responses.fallback(self.turn);
                };
                let scorer = self.explainer.scorer();
                self.responses
                    .comparison(a, scorer.score_destination(a), b, scorer.score_destination(b))
            }
            // One destination in context: show the better alternative instead
            [only] => match self.explainer.generate_counterfactual(*only) {
                Ok(result) => self.responses.counterfactual(&result),
                Err(_) => self.responses.fallback(self.turn),
            },
            [] => "I'd need at least two destinations to compare. \
                   Would you like me to recommend some options first?"
                .to_string(),
        }
    }

    fn destination_turn(&mut self, message: &str) -> String {
        let Some(destination_id) = self.resolve_destination(message) else {
            return "Which destination would you like to know more about? \
                    You can refer to one of my recommendations."
                .to_string();
        };
        self.state.last_destination = Some(destination_id);

        let Some(destination) = self.index.destination(destination_id) else {
            return self.responses.fallback(self.turn);
        };
        let score = self.explainer.scorer().score_destination(destination);
        self.responses.destination_details(destination, score)
    }

    fn activities_turn(&mut self, message: &str) -> String {
        let Some(destination_id) = self.resolve_destination(message) else {
            return "Which destination's activities would you like to know about? \
                    You can refer to one of my recommendations."
                .to_string();
        };
        self.state.last_destination = Some(destination_id);

        let Some(destination) = self.index.destination(destination_id) else {
            return self.responses.fallback(self.turn);
        };
        let activities = self.index.activities_for(destination_id);
        self.responses.activities(destination, &activities)
    }

    /// Resolve the destination a message refers to: an explicit name, a
    /// "number N" reference to the last list, or the one already in context.
    fn resolve_destination(&self, message: &str) -> Option<DestinationId> {
        if let Some(&id) = self.mentioned_destinations(message).first() {
            return Some(id);
        }

        if let Some(captures) = self.reference_pattern.captures(&message.to_lowercase()) {
            if let Ok(position) = captures[1].parse::<usize>() {
                if (1..=self.state.last_recommendations.len()).contains(&position) {
                    return Some(self.state.last_recommendations[position - 1].destination_id);
                }
            }
        }

        self.state.last_destination
    }

    /// Catalog destinations named in the message, in mention order.
    fn mentioned_destinations(&self, message: &str) -> Vec<DestinationId> {
        let message = message.to_lowercase();
        let mut found: Vec<(usize, DestinationId)> = self
            .index
            .destinations()
            .iter()
            .filter_map(|destination| {
                message
                    .find(&destination.name.to_lowercase())
                    .map(|position| (position, destination.id))
            })
            .collect();
        found.sort();
        found.into_iter().map(|(_, id)| id).collect()
    }

    fn phrase_error(&self, error: &RecommendError) -> String {
        match error {
            RecommendError::ModelNotTrained => {
                "I'm still preparing the recommendation models. Please try again in a moment."
                    .to_string()
            }
            RecommendError::UnknownUser(_) => {
                "I couldn't find your traveler profile. Could you tell me about your \
                 interests so I can recommend from scratch?"
                    .to_string()
            }
            RecommendError::NoRecommendations => {
                "I couldn't find any destinations to recommend right now.".to_string()
            }
            other => {
                debug!("Recommendation failed: {}", other);
                "Something went wrong while looking for recommendations. Please try again."
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Activity, Destination, SustainabilityMetrics, User};
    use engine::HybridConfig;
    use recommenders::{NeuralCfConfig, Recommender};

    fn destination(id: u32, name: &str, country: &str, eco: f32) -> Destination {
        Destination {
            id,
            name: name.to_string(),
            country: country.to_string(),
            region: String::new(),
            climate: "Temperate".to_string(),
            landscape_type: "Beach".to_string(),
            category: "Nature".to_string(),
            metrics: SustainabilityMetrics {
                carbon_footprint: Some(eco),
                water_consumption: Some(eco),
                waste_management: Some(eco),
                biodiversity_impact: Some(eco),
                local_economy_support: Some(eco),
            },
            overall_sustainability_score: None,
            transportation_options: vec![],
            eco_certifications: vec![],
        }
    }

    fn build_bot() -> TourismChatbot {
        let mut index = TravelIndex::new();
        index.insert_destination(destination(1, "Costa Verde", "Costa Rica", 9.0));
        index.insert_destination(destination(2, "Gray Harbor", "Norway", 4.0));
        index.insert_destination(destination(3, "Kyoto Hills", "Japan", 7.0));
        index.insert_user(User {
            id: 1,
            age_group: "25-34".to_string(),
            interests: vec!["nature".to_string()],
            sustainability_preference: 8.0,
            travel_style: "Eco-conscious".to_string(),
            budget_level: 3,
            travel_history: vec![3],
        });
        index.insert_user(User {
            id: 2,
            age_group: "35-44".to_string(),
            interests: vec![],
            sustainability_preference: 5.0,
            travel_style: "Budget".to_string(),
            budget_level: 2,
            travel_history: vec![1, 2],
        });
        index.insert_activity(Activity {
            id: 1,
            name: "Canopy Walk".to_string(),
            description: String::new(),
            category: "Nature".to_string(),
            destination_id: 1,
            eco_friendliness: 9.0,
        });
        index.build_secondary_indices();
        index.build_interactions();
        let index = Arc::new(index);

        let neural_config = NeuralCfConfig {
            embedding_dim: 4,
            hidden_layers: vec![8],
            epochs: 20,
            learning_rate: 0.05,
            seed: 3,
        };
        let mut hybrid =
            HybridRecommender::with_configs(index.clone(), HybridConfig::default(), neural_config);
        hybrid.fit().unwrap();
        TourismChatbot::new(index, hybrid, 1)
    }

    #[test]
    fn test_greeting_turn() {
        let mut bot = build_bot();
        let reply = bot.process_message("Hello!");
        assert!(reply.contains("sustainable"));
    }

    #[test]
    fn test_recommendation_turn_excludes_visited() {
        let mut bot = build_bot();
        let reply = bot.process_message("Can you recommend somewhere to travel?");

        assert!(reply.contains("recommend"));
        assert!(
            !bot.state().last_recommendations.iter().any(|r| r.destination_id == 3),
            "visited destination must not be recommended"
        );
        assert!(!bot.state().last_recommendations.is_empty());
    }

    #[test]
    fn test_sustainability_question_about_named_destination() {
        let mut bot = build_bot();
        let reply = bot.process_message("How sustainable is Costa Verde?");
        assert!(reply.contains("Costa Verde"));
        assert!(reply.contains("Carbon Footprint"));
    }

    #[test]
    fn test_sustainability_question_without_context_is_general() {
        let mut bot = build_bot();
        let reply = bot.process_message("what does eco-friendly even mean");
        assert!(reply.contains("Sustainable tourism"));
    }

    #[test]
    fn test_number_reference_resolves_against_last_list() {
        let mut bot = build_bot();
        bot.process_message("recommend me something");
        let first_id = bot.state().last_recommendations[0].destination_id;
        let first_name = bot.state().last_recommendations[0].name.clone();

        let reply = bot.process_message("tell me more about number 1");
        assert!(reply.contains(&first_name));
        assert_eq!(bot.state().last_destination, Some(first_id));
    }

    #[test]
    fn test_comparison_of_two_named_destinations() {
        let mut bot = build_bot();
        let reply = bot.process_message("compare Costa Verde vs Gray Harbor");
        assert!(reply.contains("Costa Verde is more sustainable"));
    }

    #[test]
    fn test_comparison_without_context_asks_for_destinations() {
        let mut bot = build_bot();
        let reply = bot.process_message("which one is better?");
        assert!(reply.contains("at least two destinations"));
    }

    #[test]
    fn test_activities_turn() {
        let mut bot = build_bot();
        let reply = bot.process_message("what are the activities at Costa Verde?");
        assert!(reply.contains("Canopy Walk"));
    }

    #[test]
    fn test_preferences_accumulate_and_confirm() {
        let mut bot = build_bot();
        // Entities are absorbed on every turn, whatever the intent
        bot.process_message("are there eco-friendly options?");
        let reply = bot.process_message("I prefer cheap trips");

        assert!(reply.contains("updated your preferences"));
        assert_eq!(bot.state().sustainability_preference, Some(8.0));
        assert_eq!(bot.state().budget_level, Some(1));
    }

    #[test]
    fn test_reset_clears_context() {
        let mut bot = build_bot();
        bot.process_message("recommend me something");
        assert!(!bot.state().last_recommendations.is_empty());

        let reply = bot.process_message("start over please");
        assert!(reply.contains("reset"));
        assert!(bot.state().last_recommendations.is_empty());
        assert_eq!(bot.state().user_id, Some(1), "session user survives a reset");
    }
}
