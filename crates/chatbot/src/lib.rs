//! # Chatbot Crate
//!
//! Rule-based conversational front-end over the recommendation engine.
//!
//! The pipeline per message is deliberately simple: keyword intent
//! classification, slot-style entity extraction, dialogue-state update, then
//! dispatch to the recommend/explain calls and template-based response text.
//! There is no language model here; the chatbot's job is routing
//! conversational requests to the engine, not understanding prose.
//!
//! ## Example Usage
//!
//! ```ignore
//! use chatbot::TourismChatbot;
//!
//! let mut bot = TourismChatbot::new(index, fitted_hybrid, user_id);
//! let reply = bot.process_message("recommend an eco-friendly beach trip");
//! ```

pub mod bot;
pub mod dialogue;
pub mod entities;
pub mod intent;
pub mod responses;

// Re-export commonly used types
pub use bot::TourismChatbot;
pub use dialogue::DialogueState;
pub use entities::{EntityExtractor, ExtractedEntities};
pub use intent::{Intent, IntentClassifier};
pub use responses::ResponseGenerator;
