use std::time::{Duration, Instant};

/// The orders search box. Typing schedules a search once input has been
/// idle for the debounce delay; Enter submits straight away.
#[derive(Debug, Default)]
pub struct SearchBox {
    text: String,
    editing: bool,
    edited_at: Option<Instant>,
    last_submitted: String,
}

impl SearchBox {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
    }

    pub fn stop_editing(&mut self) {
        self.editing = false;
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.text.push(c);
        self.edited_at = Some(now);
    }

    pub fn pop(&mut self, now: Instant) {
        if self.text.pop().is_some() {
            self.edited_at = Some(now);
        }
    }

    pub fn submit(&mut self) -> String {
        self.edited_at = None;
        self.editing = false;
        self.last_submitted = self.text.clone();
        self.text.clone()
    }

    /// Returns the text to search for once the debounce delay has passed,
    /// unless it matches what was last submitted.
    pub fn due(&mut self, now: Instant, delay: Duration) -> Option<String> {
        let edited_at = self.edited_at?;
        if now.duration_since(edited_at) < delay {
            return None;
        }
        self.edited_at = None;
        if self.text == self.last_submitted {
            return None;
        }
        self.last_submitted = self.text.clone();
        Some(self.text.clone())
    }

    /// Forgets the text, as when another restaurant is selected.
    pub fn clear(&mut self) {
        self.text.clear();
        self.last_submitted.clear();
        self.edited_at = None;
        self.editing = false;
    }
}
