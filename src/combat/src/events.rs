// src/combat/src/events.rs
//! The narrow contract between the rule engine and the host's
//! presentation layer. The session appends events while it resolves an
//! action; the host drains them and plays them back however it likes.
//! Rule state never waits on any of this.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Transient text, optionally anchored to a board slot.
    FloatingText { text: String, index: Option<usize> },
    /// Sound effect by key.
    PlaySound { key: String },
    /// Named animation on a board slot.
    PlayAnimation { index: usize, name: String },
    /// Ask the host to remove a card's visual after a cosmetic delay. The
    /// slot itself is already empty.
    DelayedRemove { index: usize, delay_ms: u32 },
    /// A card flipped face-up.
    CardRevealed { index: usize },
}

impl SessionEvent {
    pub fn text(text: impl Into<String>) -> Self {
        SessionEvent::FloatingText {
            text: text.into(),
            index: None,
        }
    }

    pub fn text_at(index: usize, text: impl Into<String>) -> Self {
        SessionEvent::FloatingText {
            text: text.into(),
            index: Some(index),
        }
    }

    pub fn sound(key: impl Into<String>) -> Self {
        SessionEvent::PlaySound { key: key.into() }
    }
}
