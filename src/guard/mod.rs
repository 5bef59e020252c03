//! Boolean-expression guards attached to `If` nodes and `Cond` outputs.
//!
//! A guard is either free text (passed through verbatim to the runtime) or a
//! structured conjunction of catalogued options. The core never parses or
//! evaluates the expression text.

pub mod catalog;

pub use catalog::{ExpressionCatalog, ExpressionOption};

use crate::id::GuardId;
use crate::text::BoundedText;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// How a guard's expression is authored. The discriminants are the persisted
/// mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum GuardMode {
    FreeText = 0,
    #[default]
    Structured = 1,
}

impl GuardMode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(GuardMode::FreeText),
            1 => Some(GuardMode::Structured),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    id: GuardId,
    mode: GuardMode,
    text: BoundedText,
    options: BTreeMap<String, Arc<ExpressionOption>>,
}

impl Guard {
    pub fn new(id: GuardId) -> Self {
        Self {
            id,
            mode: GuardMode::default(),
            text: BoundedText::default(),
            options: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> GuardId {
        self.id
    }

    pub fn mode(&self) -> GuardMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GuardMode) {
        self.mode = mode;
    }

    /// The free-text buffer. Kept even while the guard is in structured mode.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.set(text);
    }

    /// Selected options, ordered by shorthand.
    pub fn options(&self) -> impl Iterator<Item = &Arc<ExpressionOption>> {
        self.options.values()
    }

    pub fn has_option(&self, shorthand: &str) -> bool {
        self.options.contains_key(shorthand)
    }

    pub fn insert_option(&mut self, option: Arc<ExpressionOption>) {
        self.options.insert(option.shorthand.clone(), option);
    }

    pub fn remove_option(&mut self, shorthand: &str) -> bool {
        self.options.remove(shorthand).is_some()
    }

    /// Selects `option` if it is not selected yet, deselects it otherwise.
    /// Returns whether the option is selected afterwards.
    pub fn toggle_option(&mut self, option: Arc<ExpressionOption>) -> bool {
        if self.remove_option(&option.shorthand) {
            false
        } else {
            self.insert_option(option);
            true
        }
    }

    pub fn clear_options(&mut self) {
        self.options.clear();
    }

    /// The expression handed to the runtime: free text verbatim, or the
    /// selected options' expressions joined with `and`.
    pub fn as_expression_text(&self) -> String {
        match self.mode {
            GuardMode::FreeText => self.text.to_string(),
            GuardMode::Structured => self
                .options
                .values()
                .map(|option| option.expression.as_str())
                .join(" and "),
        }
    }

    /// Short human-readable form: the selected shorthands in structured mode.
    pub fn preview(&self) -> String {
        match self.mode {
            GuardMode::FreeText => self.text.to_string(),
            GuardMode::Structured => self.options.keys().join(" and "),
        }
    }

    /// Copies mode, text and options from `other`. The guard keeps its own id.
    pub fn copy_config_from(&mut self, other: &Guard) {
        self.mode = other.mode;
        self.text = other.text.clone();
        self.options = other.options.clone();
    }

    /// Two guards carry the same configuration, ignoring their ids.
    pub fn same_config(&self, other: &Guard) -> bool {
        self.mode == other.mode && self.text == other.text && self.options == other.options
    }
}
