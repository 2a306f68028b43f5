//! Shop opening hours and the daily slot grid.
//!
//! A [`ShopSchedule`] is a list of open blocks sharing one slot granularity.
//! [`ShopSchedule::generate_slots`] turns it into the ordered sequence of
//! bookable start times. The grid does not look at reservations; that is the
//! job of [`super::availability`].

use chrono::{NaiveDate, NaiveTime, TimeDelta, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

/// Default slot granularity in minutes.
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

/// Errors raised while building a [`ShopSchedule`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// Slot granularity must be at least one minute.
    #[error("slot granularity must be positive")]
    ZeroGranularity,

    /// A block's last slot starts before its first slot.
    #[error("block {first} -> {last} is inverted")]
    InvertedBlock {
        /// First slot start of the block.
        first: NaiveTime,
        /// Last slot start of the block.
        last: NaiveTime,
    },

    /// A block's span is not a whole number of slots.
    #[error("block {first} -> {last} is not aligned to {granularity} minutes")]
    MisalignedBlock {
        /// First slot start of the block.
        first: NaiveTime,
        /// Last slot start of the block.
        last: NaiveTime,
        /// Slot granularity in minutes.
        granularity: u32,
    },

    /// Two blocks overlap or are out of order.
    #[error("block starting at {0} overlaps the previous block")]
    OverlappingBlocks(NaiveTime),
}

/// One open interval of the day, given by its first and last slot starts.
///
/// Both bounds are slot starts and both are bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OpenBlock {
    /// Start time of the first slot in the block.
    #[schema(value_type = String, example = "08:00:00")]
    pub first_slot: NaiveTime,
    /// Start time of the last slot in the block.
    #[schema(value_type = String, example = "12:30:00")]
    pub last_slot: NaiveTime,
}

impl OpenBlock {
    /// Creates a block from hour/minute pairs. Returns `None` on an invalid
    /// time of day.
    #[must_use]
    pub fn from_hm(first: (u32, u32), last: (u32, u32)) -> Option<Self> {
        Some(Self {
            first_slot: NaiveTime::from_hms_opt(first.0, first.1, 0)?,
            last_slot: NaiveTime::from_hms_opt(last.0, last.1, 0)?,
        })
    }
}

/// Shop opening hours: ordered open blocks and a fixed slot granularity.
///
/// Time outside the blocks, including the break between them, is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShopSchedule {
    blocks: Vec<OpenBlock>,
    slot_minutes: u32,
}

impl ShopSchedule {
    /// Builds a validated schedule.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] if the granularity is zero, a block is
    /// inverted or misaligned, or blocks overlap.
    pub fn new(blocks: Vec<OpenBlock>, slot_minutes: u32) -> Result<Self, ScheduleError> {
        if slot_minutes == 0 {
            return Err(ScheduleError::ZeroGranularity);
        }
        let step_secs = i64::from(slot_minutes) * 60;
        let mut previous_end: Option<i64> = None;
        for block in &blocks {
            if block.last_slot < block.first_slot {
                return Err(ScheduleError::InvertedBlock {
                    first: block.first_slot,
                    last: block.last_slot,
                });
            }
            let span = (block.last_slot - block.first_slot).num_seconds();
            if span % step_secs != 0 {
                return Err(ScheduleError::MisalignedBlock {
                    first: block.first_slot,
                    last: block.last_slot,
                    granularity: slot_minutes,
                });
            }
            let first = i64::from(block.first_slot.num_seconds_from_midnight());
            if let Some(end) = previous_end
                && first < end
            {
                return Err(ScheduleError::OverlappingBlocks(block.first_slot));
            }
            previous_end = Some(i64::from(block.last_slot.num_seconds_from_midnight()) + step_secs);
        }
        Ok(Self {
            blocks,
            slot_minutes,
        })
    }

    /// The open blocks, in order.
    #[must_use]
    pub fn blocks(&self) -> &[OpenBlock] {
        &self.blocks
    }

    /// Slot granularity in minutes.
    #[must_use]
    pub const fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// Produces the ordered slot start times for `date`.
    ///
    /// The grid is the same for every date; the argument keeps the call
    /// shape of a per-day calendar so weekday-specific hours can be added
    /// without touching callers.
    #[must_use]
    pub fn generate_slots(&self, _date: NaiveDate) -> Vec<NaiveTime> {
        let step = TimeDelta::minutes(i64::from(self.slot_minutes));
        let mut slots = Vec::new();
        for block in &self.blocks {
            let mut current = block.first_slot;
            loop {
                slots.push(current);
                if current >= block.last_slot {
                    break;
                }
                let (next, wrapped) = current.overflowing_add_signed(step);
                if wrapped != 0 || next > block.last_slot {
                    break;
                }
                current = next;
            }
        }
        slots
    }

    /// Returns `true` if `time` is a slot start on the grid.
    #[must_use]
    pub fn is_slot_start(&self, time: NaiveTime) -> bool {
        let step_secs = i64::from(self.slot_minutes) * 60;
        self.blocks.iter().any(|block| {
            time >= block.first_slot
                && time <= block.last_slot
                && (time - block.first_slot).num_seconds() % step_secs == 0
        })
    }
}

impl Default for ShopSchedule {
    /// Morning block 08:00 → 12:30 and evening block 13:00 → 20:30, every
    /// 30 minutes: 26 slots a day.
    fn default() -> Self {
        let blocks = [((8, 0), (12, 30)), ((13, 0), (20, 30))]
            .into_iter()
            .filter_map(|(first, last)| OpenBlock::from_hm(first, last))
            .collect();
        Self {
            blocks,
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}
