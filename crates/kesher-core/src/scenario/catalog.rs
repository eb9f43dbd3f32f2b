//! Built-in scenario catalog.
//!
//! The catalog is a finite, stable-order list of compiled-in scenarios.
//! All lookups and filters are pure; there is no I/O here.

use super::model::{Difficulty, Scenario};
use crate::error::{KesherError, Result};

/// A queryable, in-memory list of scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Creates a catalog from an explicit scenario list.
    ///
    /// Order is preserved; `list()` always returns scenarios in the order
    /// they were given here.
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// The catalog of scenarios that ships with the simulator.
    pub fn builtin() -> Self {
        Self::new(builtin_scenarios())
    }

    /// Returns all scenarios in stable order.
    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Looks up a scenario by id.
    ///
    /// # Errors
    ///
    /// Returns `KesherError::NotFound` if no scenario carries the id.
    pub fn get(&self, id: &str) -> Result<&Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| KesherError::not_found("scenario", id))
    }

    /// Returns the scenarios matching a difficulty tier.
    pub fn filter_by_difficulty(&self, tier: Difficulty) -> Vec<&Scenario> {
        self.scenarios
            .iter()
            .filter(|s| s.difficulty == tier)
            .collect()
    }

    /// Returns the scenarios matching a category tag.
    pub fn filter_by_category(&self, tag: &str) -> Vec<&Scenario> {
        self.scenarios
            .iter()
            .filter(|s| s.category == tag)
            .collect()
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "first-date-coffee".to_string(),
            title: "First Date at a Coffee Shop".to_string(),
            description: "You are on a first date at a quiet neighborhood coffee shop. \
                          You matched online last week and this is the first time you meet in person."
                .to_string(),
            difficulty: Difficulty::Easy,
            category: "first-date".to_string(),
            goal: "Build rapport and keep the conversation warm and mutual; \
                   leave your date wanting a second meeting."
                .to_string(),
            opening_message: "Hi! I'm so glad we finally get to meet. \
                              Did you find the place okay?"
                .to_string(),
            max_turns: 8,
        },
        Scenario {
            id: "texting-after-match".to_string(),
            title: "Opening Messages After a Match".to_string(),
            description: "You just matched with someone whose profile mentions hiking, \
                          baking, and a dog named Luna. You are texting for the first time."
                .to_string(),
            difficulty: Difficulty::Easy,
            category: "texting".to_string(),
            goal: "Start a conversation that feels personal rather than generic \
                   and ends with agreeing to meet."
                .to_string(),
            opening_message: "Hey, thanks for the like! Your travel photos are great \
                              - where was that beach one taken?"
                .to_string(),
            max_turns: 10,
        },
        Scenario {
            id: "awkward-silence".to_string(),
            title: "Recovering From an Awkward Silence".to_string(),
            description: "Mid-way through a dinner date the conversation has stalled. \
                          Your date is politely looking at the menu for the third time."
                .to_string(),
            difficulty: Difficulty::Medium,
            category: "first-date".to_string(),
            goal: "Restart the conversation naturally without forcing it; \
                   show genuine curiosity about your date."
                .to_string(),
            opening_message: "...so. This place has really good reviews, apparently."
                .to_string(),
            max_turns: 6,
        },
        Scenario {
            id: "disagreement-plans".to_string(),
            title: "Disagreeing About Plans".to_string(),
            description: "You have been seeing each other for a month. Your partner is \
                          upset that you cancelled a weekend plan at the last minute."
                .to_string(),
            difficulty: Difficulty::Hard,
            category: "conflict".to_string(),
            goal: "Acknowledge their feelings, take responsibility where due, \
                   and repair the mood without becoming defensive."
                .to_string(),
            opening_message: "I honestly rearranged my whole weekend for that. \
                              It would've been nice to know earlier."
                .to_string(),
            max_turns: 8,
        },
    ]
}
