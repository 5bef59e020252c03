//! Line-oriented text form of an export, one statement per line:
//!
//! ```text
//! <id> state <name>
//! <id> expr <expression> <on_true> <on_false>
//! ```
//!
//! A missing branch target is written as [`NONE_SENTINEL`]. Line breaks inside
//! a name or an expression are written as spaces.

use super::Statement;
use crate::id::{Id, MAX_ID};
use std::fmt;

/// Stands in for "no target". One above [`MAX_ID`], so it never names an entity.
pub const NONE_SENTINEL: u64 = MAX_ID + 1;

fn target(id: Option<Id>) -> u64 {
    id.map_or(NONE_SENTINEL, Id::raw)
}

struct OneLine<'a>(&'a str);

impl fmt::Display for OneLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.contains(['\r', '\n']) {
            f.write_str(&self.0.replace(['\r', '\n'], " "))
        } else {
            f.write_str(self.0)
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::State { id, name } => write!(f, "{} state {}", id, OneLine(name)),
            Statement::Branch {
                id,
                expression,
                on_true,
                on_false,
            } => write!(
                f,
                "{} expr {} {} {}",
                id,
                OneLine(expression),
                target(*on_true),
                target(*on_false)
            ),
        }
    }
}

/// Formats a statement list, each line terminated by a newline.
pub fn render(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|statement| format!("{}\n", statement))
        .collect()
}

