use std::fmt;
use std::ops::Deref;

/// Capacity of the fixed text buffers used by state names and guard text,
/// terminator included.
pub const TEXT_CAPACITY: usize = 4096;

/// Longest text payload that fits in a buffer of [`TEXT_CAPACITY`] bytes.
pub const MAX_TEXT_LEN: usize = TEXT_CAPACITY - 1;

/// A UTF-8 string that never exceeds [`MAX_TEXT_LEN`] bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BoundedText(String);

impl BoundedText {
    pub fn new(text: &str) -> Self {
        let mut bounded = Self::default();
        bounded.set(text);
        bounded
    }

    /// Replaces the contents, truncating on a character boundary if needed.
    pub fn set(&mut self, text: &str) {
        self.0.clear();
        self.0.push_str(truncate(text, MAX_TEXT_LEN));
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for BoundedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoundedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn truncate(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
