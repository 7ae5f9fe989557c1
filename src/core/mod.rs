pub mod board;
pub mod persistence;

pub use crate::domain::model::{Assignment, BoardStats, DrawResult, IntoSlot, SlotIndex, SlotView};
pub use crate::domain::participant::{Participant, ParticipantData};
pub use crate::domain::ports::{ConfigProvider, StateStore};
pub use crate::utils::error::Result;
