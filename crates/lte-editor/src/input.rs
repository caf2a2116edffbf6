//! Text input surfaces that feed edits.
//!
//! Both fields follow the same contract: the text can hold anything while
//! it is being typed, but a commit either produces a valid value or reverts
//! the text to the last valid one. Invalid input never reaches the document.

use lte_core::{RgbaColor, parse_hex_rgb};

// ─── HexField ────────────────────────────────────────────────────────────

/// A `#rrggbb` text box bound to the selected shape's color.
#[derive(Debug, Clone, PartialEq)]
pub struct HexField {
    text: String,
    last_valid: String,
    focused: bool,
}

impl HexField {
    pub fn new(color: RgbaColor) -> Self {
        let hex = color.to_hex();
        Self {
            text: hex.clone(),
            last_valid: hex,
            focused: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Follow an external color change. Ignored while the user is typing.
    pub fn sync(&mut self, color: RgbaColor) {
        if !self.focused {
            *self = Self::new(color);
        }
    }

    pub fn focus(&mut self, current: RgbaColor) {
        *self = Self::new(current);
        self.focused = true;
    }

    pub fn edit(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Parse the typed text. On success the new color keeps `current`'s
    /// alpha and the text is normalized; on failure the text reverts and
    /// `None` is returned.
    pub fn commit(&mut self, current: RgbaColor) -> Option<RgbaColor> {
        self.focused = false;
        match parse_hex_rgb(&self.text) {
            Some(rgb) => {
                let color = current.with_rgb(rgb);
                *self = Self::new(color);
                Some(color)
            }
            None => {
                log::debug!("hex input `{}` rejected", self.text);
                self.text = self.last_valid.clone();
                None
            }
        }
    }

    /// Escape: drop the typed text.
    pub fn cancel(&mut self) {
        self.focused = false;
        self.text = self.last_valid.clone();
    }
}

// ─── NumberField ─────────────────────────────────────────────────────────

/// A whole-number text box (width, height, frame rate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberField {
    text: String,
    value: u32,
    min: u32,
}

impl NumberField {
    pub fn new(value: u32) -> Self {
        Self {
            text: value.to_string(),
            value,
            min: 0,
        }
    }

    /// Reject committed values below `min`.
    pub fn with_min(mut self, min: u32) -> Self {
        self.min = min;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn edit(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Parse the typed text as a base-10 integer. Anything else reverts.
    pub fn commit(&mut self) -> Option<u32> {
        let parsed = self
            .text
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|v| *v >= self.min);
        match parsed {
            Some(value) => {
                self.value = value;
                self.text = value.to_string();
                Some(value)
            }
            None => {
                log::debug!("number input `{}` rejected", self.text);
                self.text = self.value.to_string();
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.text = self.value.to_string();
    }
}
