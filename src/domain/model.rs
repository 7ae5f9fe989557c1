use crate::domain::participant::Participant;
use crate::utils::error::{RaffleError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 看板固定的號碼數量 (00-99)
pub const BOARD_SIZE: usize = 100;

/// A slot number that is known to lie in `0..BOARD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct SlotIndex(u8);

impl SlotIndex {
    pub fn new(value: i64) -> Result<Self> {
        value.into_slot()
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }

    /// Every slot on the board, in ascending order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..BOARD_SIZE as u8).map(SlotIndex)
    }

    pub(crate) fn from_position(position: usize) -> Self {
        debug_assert!(position < BOARD_SIZE);
        SlotIndex(position as u8)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl From<SlotIndex> for u8 {
    fn from(slot: SlotIndex) -> Self {
        slot.0
    }
}

impl TryFrom<i64> for SlotIndex {
    type Error = RaffleError;

    fn try_from(value: i64) -> Result<Self> {
        value.into_slot()
    }
}

fn out_of_range(value: impl fmt::Display) -> RaffleError {
    RaffleError::SlotOutOfRange {
        value: value.to_string(),
    }
}

/// Raw slot input coming from an untrusted caller.
///
/// 看板的每個操作都先透過這個 trait 轉換號碼，確保超出範圍或非整數的輸入
/// 在修改狀態之前就被拒絕。
pub trait IntoSlot {
    fn into_slot(self) -> Result<SlotIndex>;
}

impl IntoSlot for SlotIndex {
    fn into_slot(self) -> Result<SlotIndex> {
        Ok(self)
    }
}

macro_rules! int_into_slot {
    ($($t:ty),*) => {
        $(
            impl IntoSlot for $t {
                fn into_slot(self) -> Result<SlotIndex> {
                    u8::try_from(self)
                        .ok()
                        .filter(|n| usize::from(*n) < BOARD_SIZE)
                        .map(SlotIndex)
                        .ok_or_else(|| out_of_range(self))
                }
            }
        )*
    };
}

int_into_slot!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

impl IntoSlot for f64 {
    fn into_slot(self) -> Result<SlotIndex> {
        if !self.is_finite() || self.fract() != 0.0 || !(0.0..BOARD_SIZE as f64).contains(&self) {
            return Err(out_of_range(self));
        }
        (self as i64).into_slot()
    }
}

impl IntoSlot for &str {
    fn into_slot(self) -> Result<SlotIndex> {
        let trimmed = self.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(out_of_range(format!("'{}'", self)));
        }
        trimmed
            .parse::<u32>()
            .map_err(|_| out_of_range(format!("'{}'", self)))?
            .into_slot()
    }
}

impl IntoSlot for &String {
    fn into_slot(self) -> Result<SlotIndex> {
        self.as_str().into_slot()
    }
}

impl IntoSlot for String {
    fn into_slot(self) -> Result<SlotIndex> {
        self.as_str().into_slot()
    }
}

impl std::str::FromStr for SlotIndex {
    type Err = RaffleError;

    fn from_str(s: &str) -> Result<Self> {
        s.into_slot()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub slot: SlotIndex,
    pub participant_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DrawResult {
    Winner {
        slot: SlotIndex,
        participant: Participant,
    },
    Vacant {
        slot: SlotIndex,
    },
}

impl DrawResult {
    pub fn winner(&self) -> Option<&Participant> {
        match self {
            DrawResult::Winner { participant, .. } => Some(participant),
            DrawResult::Vacant { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardStats {
    pub occupied: usize,
    pub free: usize,
    pub unique_participants: usize,
    pub occupancy_percent: f64,
}

/// One cell of the rendered board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView<'a> {
    pub slot: SlotIndex,
    pub label: String,
    pub occupant: Option<&'a Participant>,
}

impl SlotView<'_> {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}
