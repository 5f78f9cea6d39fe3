//! Ordered screen sequence.

use super::model::ScreenImage;
use crate::error::{ProtolabError, Result};
use serde::{Deserialize, Serialize};

/// The ordered, user-editable list of screens.
///
/// Order is semantically meaningful: index 0 is the entry screen of the
/// generated application and each following screen is reachable from the
/// previous one.
///
/// Invariants:
/// - no two screens share an `id`
/// - order only changes through [`append`](Self::append),
///   [`remove`](Self::remove) and [`reorder`](Self::reorder)
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSequence {
    screens: Vec<ScreenImage>,
}

impl ScreenSequence {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends screens to the end of the sequence, preserving their
    /// relative order.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any incoming id is already held; in
    /// that case the sequence is left unchanged.
    pub fn append(&mut self, screens: Vec<ScreenImage>) -> Result<()> {
        for screen in &screens {
            if self.contains(&screen.id) {
                return Err(ProtolabError::validation(format!(
                    "Duplicate screen id: {}",
                    screen.id
                )));
            }
        }

        self.screens.extend(screens);
        Ok(())
    }

    /// Removes the screen with the given id.
    ///
    /// Returns `true` if a screen was removed; an absent id is a no-op,
    /// not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.screens.len();
        self.screens.retain(|screen| screen.id != id);
        self.screens.len() != before
    }

    /// Moves the screen at `from` to position `to`, shifting the screens
    /// in between.
    ///
    /// A move onto the same position is a no-op and leaves the sequence
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either index is outside `[0, len)`.
    /// The drag surface only hands over indices of screens it displays,
    /// but out-of-range values are still rejected here.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.screens.len();
        if from >= len || to >= len {
            return Err(ProtolabError::validation(format!(
                "Reorder out of range: {} -> {} (length {})",
                from, to, len
            )));
        }

        if from == to {
            return Ok(());
        }

        let screen = self.screens.remove(from);
        self.screens.insert(to, screen);
        Ok(())
    }

    /// Empties the sequence.
    pub fn clear(&mut self) {
        self.screens.clear();
    }

    /// Returns the screens in order.
    pub fn screens(&self) -> &[ScreenImage] {
        &self.screens
    }

    /// Returns the ordered `src` payloads, the shape the synthesis
    /// service is invoked with.
    pub fn sources(&self) -> Vec<String> {
        self.screens.iter().map(|s| s.src.clone()).collect()
    }

    /// Whether a screen with the given id is held.
    pub fn contains(&self, id: &str) -> bool {
        self.screens.iter().any(|screen| screen.id == id)
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(name: &str) -> ScreenImage {
        ScreenImage::from_bytes(name, "image/png", name.as_bytes())
    }

    fn ids(sequence: &ScreenSequence) -> Vec<String> {
        sequence.screens().iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_append_preserves_relative_order() {
        let mut sequence = ScreenSequence::new();
        let batch = vec![screen("a"), screen("b"), screen("c")];
        let expected: Vec<String> = batch.iter().map(|s| s.id.clone()).collect();

        sequence.append(batch).unwrap();

        assert_eq!(ids(&sequence), expected);
    }

    #[test]
    fn test_append_rejects_duplicate_id() {
        let mut sequence = ScreenSequence::new();
        let first = screen("a");
        let duplicate = first.clone();
        sequence.append(vec![first]).unwrap();

        let err = sequence.append(vec![duplicate]).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let mut sequence = ScreenSequence::new();
        sequence.append(vec![screen("a")]).unwrap();

        assert!(!sequence.remove("no-such-id"));
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn test_membership_tracks_appends_minus_removals() {
        let mut sequence = ScreenSequence::new();
        let batch = vec![screen("a"), screen("b"), screen("c"), screen("d")];
        let all: Vec<String> = batch.iter().map(|s| s.id.clone()).collect();
        sequence.append(batch).unwrap();

        assert!(sequence.remove(&all[1]));
        sequence.reorder(2, 0).unwrap();
        assert!(sequence.remove(&all[0]));

        let mut remaining = ids(&sequence);
        remaining.sort();
        let mut expected = vec![all[2].clone(), all[3].clone()];
        expected.sort();
        assert_eq!(remaining, expected);
    }

    #[test]
    fn test_reorder_moves_and_shifts() {
        let mut sequence = ScreenSequence::new();
        let batch = vec![screen("a"), screen("b"), screen("c")];
        let original: Vec<String> = batch.iter().map(|s| s.id.clone()).collect();
        sequence.append(batch).unwrap();

        sequence.reorder(0, 2).unwrap();

        assert_eq!(
            ids(&sequence),
            vec![original[1].clone(), original[2].clone(), original[0].clone()]
        );
    }

    #[test]
    fn test_reorder_roundtrip_restores_order() {
        let mut sequence = ScreenSequence::new();
        sequence
            .append(vec![screen("a"), screen("b"), screen("c"), screen("d")])
            .unwrap();
        let original = ids(&sequence);

        sequence.reorder(1, 3).unwrap();
        sequence.reorder(3, 1).unwrap();

        assert_eq!(ids(&sequence), original);
    }

    #[test]
    fn test_reorder_same_position_is_noop() {
        let mut sequence = ScreenSequence::new();
        sequence.append(vec![screen("a"), screen("b")]).unwrap();
        let before = sequence.clone();

        sequence.reorder(1, 1).unwrap();

        assert_eq!(sequence, before);
    }

    #[test]
    fn test_reorder_out_of_range_is_rejected() {
        let mut sequence = ScreenSequence::new();
        sequence.append(vec![screen("a"), screen("b")]).unwrap();
        let before = ids(&sequence);

        assert!(sequence.reorder(0, 2).unwrap_err().is_validation());
        assert!(sequence.reorder(5, 0).unwrap_err().is_validation());
        assert_eq!(ids(&sequence), before);
    }

    #[test]
    fn test_clear_empties_sequence() {
        let mut sequence = ScreenSequence::new();
        sequence.append(vec![screen("a"), screen("b")]).unwrap();

        sequence.clear();

        assert!(sequence.is_empty());
        assert!(sequence.sources().is_empty());
    }

    #[test]
    fn test_sources_follow_sequence_order() {
        let mut sequence = ScreenSequence::new();
        sequence.append(vec![screen("a"), screen("b")]).unwrap();
        sequence.reorder(0, 1).unwrap();

        let sources = sequence.sources();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0], sequence.screens()[0].src);
        assert_eq!(sources[1], sequence.screens()[1].src);
    }
}
