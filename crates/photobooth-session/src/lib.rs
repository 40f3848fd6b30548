#![warn(missing_docs)]
//! # photobooth-session
//!
//! ## Purpose
//! Implements the slot state machine backing one in-progress photo strip.
//!
//! ## Responsibilities
//! - Own exactly N slots and keep the filled count in lockstep with them.
//! - Pick the next capture target: the pending retake, else the lowest empty
//!   slot.
//! - Accept commits, distinguishing fresh fills from retakes.
//! - Fuse target selection and commit into one borrow for capture paths.
//!
//! ## Data flow
//! Capture request -> [`SlotSession::capture_into`] chooses a
//! [`CaptureTarget`] -> caller composites a photo -> the photo is committed
//! -> collage assembly reads the slots.
//!
//! ## Ownership and lifetimes
//! The session owns its slot bitmaps. Readers borrow them immutably; every
//! write goes through [`SlotSession::commit`] or [`SlotSession::reset`].
//!
//! ## Error model
//! Invalid retake targets, full sessions and out-of-range indices return
//! [`SlotError`] without touching state.
//!
//! ## Retake policy
//! Empty slots are never targeted directly; they fill in index order. A
//! retake may only target an occupied slot, and while one is pending every
//! capture goes to it. It is released by a commit to that slot,
//! [`SlotSession::cancel_retake`], or [`SlotSession::reset`].
//!
//! ## Example
//! ```rust
//! use photobooth_core::{Bitmap, SlotIndex};
//! use photobooth_session::SlotSession;
//!
//! let mut session = SlotSession::default();
//! let target = session.next_capture_target().unwrap();
//! assert_eq!(target.slot, SlotIndex::new(0));
//! session.commit(target.slot, Bitmap::from_rgba(1, 1, vec![0; 4]).unwrap()).unwrap();
//! assert_eq!(session.filled_count(), 1);
//! ```

use log::{debug, info};
use photobooth_core::{Bitmap, SlotIndex};
use thiserror::Error;

/// Slot count of a standard three-photo strip.
pub const DEFAULT_SLOT_COUNT: usize = 3;

/// One capture position in a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot {
    image: Option<Bitmap>,
}

impl Slot {
    /// Returns `true` when a composited photo is stored.
    pub fn is_occupied(&self) -> bool {
        self.image.is_some()
    }

    /// Stored photo, if any.
    pub fn image(&self) -> Option<&Bitmap> {
        self.image.as_ref()
    }
}

/// Why a slot was chosen for the next capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Lowest empty slot.
    Fresh,
    /// Occupied slot explicitly marked for retake.
    Retake,
}

/// Slot chosen for the next capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTarget {
    /// Target slot.
    pub slot: SlotIndex,
    /// Selection reason.
    pub kind: TargetKind,
}

/// Result of one commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Slot written.
    pub slot: SlotIndex,
    /// `true` when an existing photo was overwritten.
    pub replaced: bool,
}

/// Slot state machine for one photo strip.
#[derive(Debug, Clone)]
pub struct SlotSession {
    slots: Vec<Slot>,
    filled_count: usize,
    pending_retake: Option<SlotIndex>,
}

impl SlotSession {
    /// Creates a session with `slot_count` empty slots.
    ///
    /// # Errors
    /// Returns [`SlotError::InvalidSlotCount`] when `slot_count == 0`.
    pub fn new(slot_count: usize) -> Result<Self, SlotError> {
        if slot_count == 0 {
            return Err(SlotError::InvalidSlotCount);
        }
        Ok(Self::with_empty_slots(slot_count))
    }

    fn with_empty_slots(slot_count: usize) -> Self {
        Self {
            slots: vec![Slot::default(); slot_count],
            filled_count: 0,
            pending_retake: None,
        }
    }

    /// Number of slots (N).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn filled_count(&self) -> usize {
        self.filled_count
    }

    /// Returns `true` when every slot is occupied.
    pub fn is_complete(&self) -> bool {
        self.filled_count == self.slots.len()
    }

    /// Retake target awaiting its capture, if any.
    pub fn pending_retake(&self) -> Option<SlotIndex> {
        self.pending_retake
    }

    /// Borrows one slot.
    pub fn slot(&self, slot: SlotIndex) -> Option<&Slot> {
        self.slots.get(slot.index())
    }

    /// Iterates slots in index order.
    pub fn slots(&self) -> impl Iterator<Item = (SlotIndex, &Slot)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (SlotIndex::new(index), slot))
    }

    /// Indices of occupied slots in ascending order.
    pub fn occupied_indices(&self) -> Vec<SlotIndex> {
        self.slots()
            .filter(|(_, slot)| slot.is_occupied())
            .map(|(index, _)| index)
            .collect()
    }

    /// Marks an occupied slot for retake, replacing any earlier target.
    ///
    /// # Errors
    /// - [`SlotError::SlotOutOfRange`] for an index outside the session.
    /// - [`SlotError::SlotNotOccupied`] when the slot is empty.
    pub fn begin_retake(&mut self, slot: SlotIndex) -> Result<(), SlotError> {
        let occupied = self.checked_slot(slot)?.is_occupied();
        if !occupied {
            return Err(SlotError::SlotNotOccupied(slot));
        }

        if let Some(previous) = self.pending_retake.replace(slot)
            && previous != slot
        {
            debug!("retake target moved from {previous} to {slot}");
        }
        info!("retake pending for {slot}");
        Ok(())
    }

    /// Drops the pending retake target, if any.
    pub fn cancel_retake(&mut self) -> Option<SlotIndex> {
        self.pending_retake.take()
    }

    /// Chooses where the next capture lands without changing state.
    ///
    /// # Errors
    /// Returns [`SlotError::SessionFull`] when all slots are occupied and no
    /// retake is pending.
    pub fn next_capture_target(&self) -> Result<CaptureTarget, SlotError> {
        if let Some(slot) = self.pending_retake {
            return Ok(CaptureTarget {
                slot,
                kind: TargetKind::Retake,
            });
        }

        self.slots
            .iter()
            .position(|slot| !slot.is_occupied())
            .map(|index| CaptureTarget {
                slot: SlotIndex::new(index),
                kind: TargetKind::Fresh,
            })
            .ok_or(SlotError::SessionFull)
    }

    /// Stores a composited photo in `slot`.
    ///
    /// The filled count only grows when the slot was empty, and a pending
    /// retake for this slot is consumed.
    ///
    /// # Errors
    /// Returns [`SlotError::SlotOutOfRange`] for an index outside the session.
    pub fn commit(&mut self, slot: SlotIndex, image: Bitmap) -> Result<CommitOutcome, SlotError> {
        let entry = self.checked_slot_mut(slot)?;
        let replaced = entry.image.replace(image).is_some();

        if !replaced {
            self.filled_count += 1;
        }
        if self.pending_retake == Some(slot) {
            self.pending_retake = None;
        }

        debug_assert_eq!(
            self.filled_count,
            self.slots.iter().filter(|slot| slot.is_occupied()).count()
        );
        info!(
            "committed {slot} (replaced={replaced}, filled={}/{})",
            self.filled_count,
            self.slots.len()
        );
        Ok(CommitOutcome { slot, replaced })
    }

    /// Picks a target, produces its photo and commits it in one step.
    ///
    /// Holding `&mut self` across both steps means no second capture can
    /// claim the same slot in between. When `produce` fails the session is
    /// left untouched, including any pending retake.
    ///
    /// # Errors
    /// Propagates [`SlotError`] (converted into `E`) and any `produce` error.
    pub fn capture_into<E, F>(&mut self, produce: F) -> Result<CommitOutcome, E>
    where
        E: From<SlotError>,
        F: FnOnce(CaptureTarget) -> Result<Bitmap, E>,
    {
        let target = self.next_capture_target()?;
        let image = produce(target)?;
        Ok(self.commit(target.slot, image)?)
    }

    /// Empties every slot and clears the pending retake.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.image = None;
        }
        self.filled_count = 0;
        self.pending_retake = None;
        info!("session reset ({} slots)", self.slots.len());
    }

    fn checked_slot(&self, slot: SlotIndex) -> Result<&Slot, SlotError> {
        let slot_count = self.slots.len();
        self.slots.get(slot.index()).ok_or(SlotError::SlotOutOfRange {
            index: slot.index(),
            slot_count,
        })
    }

    fn checked_slot_mut(&mut self, slot: SlotIndex) -> Result<&mut Slot, SlotError> {
        let slot_count = self.slots.len();
        self.slots
            .get_mut(slot.index())
            .ok_or(SlotError::SlotOutOfRange {
                index: slot.index(),
                slot_count,
            })
    }
}

impl Default for SlotSession {
    fn default() -> Self {
        Self::with_empty_slots(DEFAULT_SLOT_COUNT)
    }
}

/// Errors produced by slot transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Retake requested for an empty slot.
    #[error("{0} has no photo to retake")]
    SlotNotOccupied(SlotIndex),
    /// Every slot is filled and no retake is pending.
    #[error("all slots are filled")]
    SessionFull,
    /// Index outside `0..slot_count`.
    #[error("slot index {index} is out of range for {slot_count} slots")]
    SlotOutOfRange {
        /// Requested index.
        index: usize,
        /// Slots in the session.
        slot_count: usize,
    },
    /// Sessions need at least one slot.
    #[error("a session needs at least one slot")]
    InvalidSlotCount,
}
