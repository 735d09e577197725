//! Per-session conversation state.
//!
//! Accumulates preferences across turns and remembers what was last shown so
//! follow-up questions ("how sustainable is it?") can resolve against the
//! conversation instead of requiring the destination name again.

use crate::entities::ExtractedEntities;
use data_loader::{DestinationId, UserId};
use engine::Recommendation;

/// Mutable state of one chat session.
#[derive(Debug, Clone, Default)]
pub struct DialogueState {
    /// Known catalog user, when the session is authenticated
    pub user_id: Option<UserId>,
    pub interests: Vec<String>,
    pub sustainability_preference: Option<f32>,
    pub budget_level: Option<u8>,
    pub travel_style: Option<String>,
    pub season: Option<String>,
    pub duration_days: Option<u32>,
    /// Most recent recommendation list shown to the user
    pub last_recommendations: Vec<Recommendation>,
    /// Destination the conversation is currently about
    pub last_destination: Option<DestinationId>,
}

impl DialogueState {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Merge newly extracted entities; existing values only change when the
    /// new message provides that slot.
    pub fn absorb(&mut self, entities: &ExtractedEntities) {
        for interest in &entities.interests {
            if !self.interests.contains(interest) {
                self.interests.push(interest.clone());
            }
        }
        if entities.sustainability_preference.is_some() {
            self.sustainability_preference = entities.sustainability_preference;
        }
        if entities.budget_level.is_some() {
            self.budget_level = entities.budget_level;
        }
        if entities.travel_style.is_some() {
            self.travel_style = entities.travel_style.clone();
        }
        if entities.season.is_some() {
            self.season = entities.season.clone();
        }
        if entities.duration_days.is_some() {
            self.duration_days = entities.duration_days;
        }
    }

    /// Forget accumulated preferences and conversation context; the session
    /// user survives a reset.
    pub fn reset(&mut self) {
        let user_id = self.user_id;
        *self = Self::default();
        self.user_id = user_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_merges_without_clobbering() {
        let mut state = DialogueState::default();

        state.absorb(&ExtractedEntities {
            interests: vec!["beach".to_string()],
            sustainability_preference: Some(8.0),
            ..ExtractedEntities::default()
        });
        state.absorb(&ExtractedEntities {
            interests: vec!["beach".to_string(), "food".to_string()],
            budget_level: Some(1),
            ..ExtractedEntities::default()
        });

        assert_eq!(state.interests, vec!["beach", "food"]);
        assert_eq!(state.sustainability_preference, Some(8.0), "kept from turn one");
        assert_eq!(state.budget_level, Some(1));
    }

    #[test]
    fn test_reset_keeps_user() {
        let mut state = DialogueState::for_user(7);
        state.interests.push("nature".to_string());
        state.last_destination = Some(3);

        state.reset();

        assert_eq!(state.user_id, Some(7));
        assert!(state.interests.is_empty());
        assert!(state.last_destination.is_none());
    }
}
