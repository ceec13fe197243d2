// src/flow/mod.rs — Guided intake flow
//
// A small state machine that walks a new user through room type, space
// photo, inspiration styles, and budget before opening free-form chat.
// All transitions are synchronous local state updates driven by the UI;
// the only side effect is the session created on the budget -> chat edge.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::infra::config::FlowConfig;
use crate::session::repository::SessionRepository;
use crate::session::{ChatContextEntry, ChatSession};
use crate::util::format_usd;

/// Room catalog shown in the first step.
pub struct RoomType {
    pub name: &'static str,
    pub description: &'static str,
}

pub const ROOM_TYPES: &[RoomType] = &[
    RoomType {
        name: "Living Room",
        description: "Create a welcoming space for relaxation",
    },
    RoomType {
        name: "Bedroom",
        description: "Design your perfect sleep sanctuary",
    },
    RoomType {
        name: "Kitchen",
        description: "Build a functional culinary workspace",
    },
    RoomType {
        name: "Bathroom",
        description: "Transform into a spa-like retreat",
    },
    RoomType {
        name: "Dining Room",
        description: "Create memorable dining experiences",
    },
    RoomType {
        name: "Hallway",
        description: "Make a striking first impression",
    },
    RoomType {
        name: "Guest Room",
        description: "Welcome visitors in comfort",
    },
    RoomType {
        name: "Children's Room",
        description: "Create a playful learning environment",
    },
    RoomType {
        name: "Outdoor Deck",
        description: "Extend your living space outdoors",
    },
];

/// Inspiration styles offered in the multi-select step.
pub const INSPIRATION_STYLES: &[&str] = &[
    "Scandinavian",
    "Mid-century Modern",
    "Industrial",
    "Bohemian",
    "Japandi",
    "Coastal",
    "Minimalist",
    "Rustic Farmhouse",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    RoomSelection,
    SpaceUpload,
    Inspiration,
    Budget,
    Chat,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FlowError {
    #[error("Pick a room type to continue")]
    RoomRequired,

    #[error("Upload a photo of your space to continue")]
    SpaceImageRequired,

    #[error("'{action}' is not available in this step")]
    OutOfStep { action: &'static str },
}

/// Result of advancing the flow.
#[derive(Debug)]
pub enum Advance {
    /// Moved to (or stayed in) the given step.
    Step(FlowStep),
    /// The intake completed: a fresh session with the synthesized welcome
    /// message was persisted and chat is open.
    ChatReady(ChatSession),
}

pub struct FlowState {
    step: FlowStep,
    selected_room: Option<String>,
    space_image: Option<String>,
    selected_inspiration: BTreeSet<usize>,
    budget: u32,
    config: FlowConfig,
}

impl FlowState {
    pub fn new(config: FlowConfig) -> Self {
        let budget = config.default_budget;
        Self {
            step: FlowStep::RoomSelection,
            selected_room: None,
            space_image: None,
            selected_inspiration: BTreeSet::new(),
            budget,
            config,
        }
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn selected_room(&self) -> Option<&str> {
        self.selected_room.as_deref()
    }

    /// The uploaded space photo as a data URL, carried into the first
    /// chat prompt.
    pub fn space_image(&self) -> Option<&str> {
        self.space_image.as_deref()
    }

    pub fn inspiration_count(&self) -> usize {
        self.selected_inspiration.len()
    }

    pub fn is_inspiration_selected(&self, index: usize) -> bool {
        self.selected_inspiration.contains(&index)
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// room-selection --select(room)--> space-upload
    pub fn select_room(&mut self, room: &str) -> Result<FlowStep, FlowError> {
        if self.step != FlowStep::RoomSelection {
            return Err(FlowError::OutOfStep {
                action: "select room",
            });
        }
        self.selected_room = Some(room.to_string());
        self.step = FlowStep::SpaceUpload;
        Ok(self.step)
    }

    pub fn attach_space_image(&mut self, data_url: String) {
        self.space_image = Some(data_url);
    }

    pub fn remove_space_image(&mut self) {
        self.space_image = None;
    }

    /// Toggle one inspiration style. Multi-select, no minimum.
    pub fn toggle_inspiration(&mut self, index: usize) {
        if !self.selected_inspiration.remove(&index) {
            self.selected_inspiration.insert(index);
        }
    }

    /// Budget is clamped to the configured minimum; there is no upper
    /// clamp (custom amounts above the slider range are legitimate).
    pub fn set_budget(&mut self, amount: u32) {
        self.budget = amount.max(self.config.min_budget);
    }

    /// Advance to the next step. On the budget -> chat edge this creates
    /// and persists the first session with its welcome message.
    pub fn next(&mut self, repo: &SessionRepository) -> Result<Advance, FlowError> {
        match self.step {
            FlowStep::RoomSelection => Err(FlowError::RoomRequired),
            FlowStep::SpaceUpload => {
                if self.space_image.is_none() {
                    return Err(FlowError::SpaceImageRequired);
                }
                self.step = FlowStep::Inspiration;
                Ok(Advance::Step(self.step))
            }
            FlowStep::Inspiration => {
                self.step = FlowStep::Budget;
                Ok(Advance::Step(self.step))
            }
            FlowStep::Budget => {
                let mut session = ChatSession::new("New Chat");
                session
                    .conversation
                    .push(ChatContextEntry::assistant(self.welcome_message()));
                repo.upsert(session.clone());
                self.step = FlowStep::Chat;
                Ok(Advance::ChatReady(session))
            }
            FlowStep::Chat => Ok(Advance::Step(self.step)),
        }
    }

    /// Step back one stage. A no-op at the ends of the flow.
    pub fn back(&mut self) -> FlowStep {
        self.step = match self.step {
            FlowStep::SpaceUpload => FlowStep::RoomSelection,
            FlowStep::Inspiration => FlowStep::SpaceUpload,
            FlowStep::Budget => FlowStep::Inspiration,
            other => other,
        };
        self.step
    }

    /// chat --new-chat--> room-selection, resetting all flow-local state.
    pub fn new_chat(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
    }

    fn welcome_message(&self) -> String {
        let room = self.selected_room.as_deref().unwrap_or("space");
        let budget = format_usd(self.budget);
        let styles = match self.selected_inspiration.len() {
            1 => "1 inspiration style".to_string(),
            n => format!("{n} inspiration styles"),
        };
        format!(
            "Let's design your {room}! I have your photo, a {budget} budget, \
             and {styles} to work from. Tell me about the look you're going \
             for, or ask me for product ideas to get started."
        )
    }
}

/// Named budget bracket for display next to the slider value.
pub fn budget_range_label(amount: u32, config: &FlowConfig) -> &'static str {
    if amount <= 1_000 {
        "Budget-friendly"
    } else if amount <= 5_000 {
        "Mid-range"
    } else if amount <= config.max_budget {
        "Premium"
    } else {
        "Luxury"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemoryKvStore;
    use std::sync::Arc;

    fn flow() -> FlowState {
        FlowState::new(FlowConfig::default())
    }

    fn repo() -> SessionRepository {
        SessionRepository::new(Arc::new(MemoryKvStore::new()))
    }

    #[test]
    fn test_initial_state() {
        let flow = flow();
        assert_eq!(flow.step(), FlowStep::RoomSelection);
        assert!(flow.selected_room().is_none());
        assert_eq!(flow.budget(), 1_500);
    }

    #[test]
    fn test_next_from_room_selection_requires_a_room() {
        let mut flow = flow();
        assert_eq!(flow.next(&repo()).unwrap_err(), FlowError::RoomRequired);
    }

    #[test]
    fn test_space_upload_gated_on_photo() {
        let mut flow = flow();
        flow.select_room("Bedroom").unwrap();

        let repo = repo();
        assert_eq!(
            flow.next(&repo).unwrap_err(),
            FlowError::SpaceImageRequired
        );

        flow.attach_space_image("data:image/jpeg;base64,AAAA".into());
        assert!(matches!(
            flow.next(&repo).unwrap(),
            Advance::Step(FlowStep::Inspiration)
        ));
    }

    #[test]
    fn test_back_walks_the_chain() {
        let mut flow = flow();
        flow.select_room("Kitchen").unwrap();
        flow.attach_space_image("data:image/png;base64,BBBB".into());
        let repo = repo();
        flow.next(&repo).unwrap(); // inspiration
        flow.next(&repo).unwrap(); // budget

        assert_eq!(flow.back(), FlowStep::Inspiration);
        assert_eq!(flow.back(), FlowStep::SpaceUpload);
        assert_eq!(flow.back(), FlowStep::RoomSelection);
        // no further back
        assert_eq!(flow.back(), FlowStep::RoomSelection);
    }

    #[test]
    fn test_inspiration_is_a_toggle_set() {
        let mut flow = flow();
        flow.toggle_inspiration(2);
        flow.toggle_inspiration(5);
        assert_eq!(flow.inspiration_count(), 2);
        assert!(flow.is_inspiration_selected(2));

        flow.toggle_inspiration(2);
        assert_eq!(flow.inspiration_count(), 1);
        assert!(!flow.is_inspiration_selected(2));
    }

    #[test]
    fn test_budget_clamped_to_minimum() {
        let mut flow = flow();
        flow.set_budget(50);
        assert_eq!(flow.budget(), 300);
        flow.set_budget(25_000);
        assert_eq!(flow.budget(), 25_000);
    }

    #[test]
    fn test_new_chat_resets_everything() {
        let mut flow = flow();
        flow.select_room("Bedroom").unwrap();
        flow.attach_space_image("data:image/png;base64,CCCC".into());
        flow.toggle_inspiration(1);
        flow.set_budget(4_000);

        flow.new_chat();
        assert_eq!(flow.step(), FlowStep::RoomSelection);
        assert!(flow.selected_room().is_none());
        assert!(flow.space_image().is_none());
        assert_eq!(flow.inspiration_count(), 0);
        assert_eq!(flow.budget(), 1_500);
    }

    #[test]
    fn test_budget_range_labels() {
        let config = FlowConfig::default();
        assert_eq!(budget_range_label(300, &config), "Budget-friendly");
        assert_eq!(budget_range_label(2_500, &config), "Mid-range");
        assert_eq!(budget_range_label(9_999, &config), "Premium");
        assert_eq!(budget_range_label(15_000, &config), "Luxury");
    }
}
