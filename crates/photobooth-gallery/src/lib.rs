#![warn(missing_docs)]
//! # photobooth-gallery
//!
//! ## Purpose
//! Keeps a capped history of every photo taken, independent of slots.
//!
//! ## Responsibilities
//! - Append each composited photo, fresh capture or retake alike.
//! - Evict the oldest entry once capacity is exceeded.
//! - Hand out most-recent-first snapshots for browsing and download.
//!
//! ## Data flow
//! Successful capture -> [`GalleryLog::append`] -> [`GalleryLog::list`]
//! snapshot rendered by the UI.
//!
//! ## Ownership and lifetimes
//! Entries hold cheap [`Bitmap`] clones, so a photo later retaken out of its
//! slot remains visible here.
//!
//! ## Error model
//! Only a zero capacity is rejected ([`GalleryError::InvalidCapacity`]).

use std::collections::VecDeque;

use log::debug;
use photobooth_core::Bitmap;
use thiserror::Error;

/// Default number of photos kept in the history.
pub const GALLERY_CAPACITY: usize = 12;

/// One historical capture.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryEntry {
    /// Capture timestamp in Unix epoch milliseconds.
    pub id: u64,
    /// 1-based position in capture order; unique even when timestamps collide.
    pub sequence: u64,
    /// Composited photo.
    pub image: Bitmap,
}

impl GalleryEntry {
    /// Download name for this entry.
    pub fn suggested_filename(&self) -> String {
        format!("webcam-photo-{}.png", self.sequence)
    }
}

/// Append-only capture history with oldest-first eviction.
#[derive(Debug, Clone)]
pub struct GalleryLog {
    capacity: usize,
    // Front is the most recent entry.
    entries: VecDeque<GalleryEntry>,
    next_sequence: u64,
}

impl GalleryLog {
    /// Creates an empty log with [`GALLERY_CAPACITY`].
    pub fn new() -> Self {
        Self {
            capacity: GALLERY_CAPACITY,
            entries: VecDeque::with_capacity(GALLERY_CAPACITY + 1),
            next_sequence: 1,
        }
    }

    /// Creates an empty log holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns [`GalleryError::InvalidCapacity`] when `capacity == 0`.
    pub fn with_capacity(capacity: usize) -> Result<Self, GalleryError> {
        if capacity == 0 {
            return Err(GalleryError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            entries: VecDeque::with_capacity(capacity + 1),
            next_sequence: 1,
        })
    }

    /// Adds `image` as the newest entry, evicting the oldest when over capacity.
    pub fn append(&mut self, image: Bitmap, captured_at_ms: u64) -> &GalleryEntry {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.entries.push_front(GalleryEntry {
            id: captured_at_ms,
            sequence,
            image,
        });

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                debug!("gallery evicted photo #{}", evicted.sequence);
            }
        }

        &self.entries[0]
    }

    /// Snapshot of all entries, most recent first.
    pub fn list(&self) -> Vec<GalleryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Looks up an entry by its sequence number.
    pub fn get(&self, sequence: u64) -> Option<&GalleryEntry> {
        self.entries.iter().find(|entry| entry.sequence == sequence)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry; sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for GalleryLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Gallery configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GalleryError {
    /// Capacity must be positive.
    #[error("gallery capacity must be greater than zero")]
    InvalidCapacity,
}

#[cfg(test)]
mod tests {
    //! Unit tests for append order and eviction.

    use super::*;

    fn photo(tag: u8) -> Bitmap {
        Bitmap::from_rgba(1, 1, vec![tag, 0, 0, 255]).expect("valid bitmap")
    }

    #[test]
    fn thirteen_appends_keep_twelve_and_evict_the_first() {
        let mut log = GalleryLog::new();
        for tag in 1..=13_u8 {
            log.append(photo(tag), 1_000 + u64::from(tag));
        }

        let entries = log.list();
        assert_eq!(entries.len(), 12);
        assert!(log.get(1).is_none());
        assert_eq!(entries[0].sequence, 13);
        assert_eq!(entries[0].image, photo(13));
        assert_eq!(entries[11].sequence, 2);
    }

    #[test]
    fn list_is_a_snapshot() {
        let mut log = GalleryLog::new();
        log.append(photo(1), 10);
        let snapshot = log.list();
        log.append(photo(2), 20);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn entries_suggest_sequence_based_filenames() {
        let mut log = GalleryLog::new();
        let entry = log.append(photo(1), 10).clone();
        assert_eq!(entry.suggested_filename(), "webcam-photo-1.png");
        assert_eq!(entry.id, 10);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            GalleryLog::with_capacity(0).err(),
            Some(GalleryError::InvalidCapacity)
        );
    }
}
