//! Image slots of the main window.
//!
//! The main window shows two slots side by side: the original image on
//! the left and the most recent blur result on the right.

use std::fmt;

/// Identifier for an image slot in the main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    /// The image as opened from disk.
    Original,
    /// The most recent blur result.
    Processed,
}

impl ImageSlot {
    /// All slots in left-to-right display order.
    pub const ALL: [Self; 2] = [Self::Original, Self::Processed];

    /// Display label for the slot.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Processed => "Processed",
        }
    }

    /// Text shown in the slot while it has no image.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Original => "Open an image to begin",
            Self::Processed => "Process the image to see the result",
        }
    }
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_contains_every_variant() {
        // If you add a variant to ImageSlot, update ALL and this count.
        assert_eq!(ImageSlot::ALL.len(), 2);
        let mut seen = std::collections::HashSet::new();
        for slot in ImageSlot::ALL {
            assert!(seen.insert(slot), "Duplicate slot in ALL: {slot}");
        }
    }

    #[test]
    fn original_is_shown_first() {
        assert_eq!(ImageSlot::ALL[0], ImageSlot::Original);
    }

    #[test]
    fn display_matches_label() {
        for slot in ImageSlot::ALL {
            assert_eq!(slot.to_string(), slot.label());
            assert!(!slot.placeholder().is_empty());
        }
    }
}
