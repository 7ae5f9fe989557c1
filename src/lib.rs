pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{FileStorage, MemoryStorage};
pub use config::BoardConfig;
pub use crate::core::{
    board::RaffleBoard,
    persistence::{BoardRepository, DEFAULT_STATE_KEY},
};
pub use domain::model::{Assignment, BoardStats, DrawResult, IntoSlot, SlotIndex, SlotView};
pub use domain::participant::{Participant, ParticipantData};
pub use domain::ports::{ConfigProvider, StateStore};
pub use utils::error::{RaffleError, Result};
