use crate::domain::model::SlotIndex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RaffleError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Duplicate participant: {message}")]
    DuplicateParticipant { message: String },

    #[error("Participant not found: {id}")]
    ParticipantNotFound { id: String },

    #[error("Slot {slot} is already occupied")]
    AlreadyOccupied { slot: SlotIndex },

    #[error("Slot {slot} is not occupied")]
    NotOccupied { slot: SlotIndex },

    #[error("Slot must be an integer between 0 and 99, got {value}")]
    SlotOutOfRange { value: String },

    /// 槽位記錄了不存在的參與者，屬於資料損毀而非使用者錯誤
    #[error("Inconsistent board: slot {slot} references unknown participant {participant_id}")]
    Inconsistency {
        slot: SlotIndex,
        participant_id: String,
    },

    #[error("Stored state is corrupted: {reason}")]
    StateCorrupted { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 呼叫端輸入錯誤：欄位、email 格式、號碼範圍
    Input,
    /// 業務規則衝突：重複 email、號碼已佔用等
    Conflict,
    Internal,
    Storage,
    Configuration,
}

impl RaffleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::SlotOutOfRange { .. } => ErrorCategory::Input,
            Self::DuplicateParticipant { .. }
            | Self::ParticipantNotFound { .. }
            | Self::AlreadyOccupied { .. }
            | Self::NotOccupied { .. } => ErrorCategory::Conflict,
            Self::Inconsistency { .. } => ErrorCategory::Internal,
            Self::StateCorrupted { .. } | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Storage
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    /// Whether the caller can fix the problem by changing its input or re-querying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Input | ErrorCategory::Conflict | ErrorCategory::Configuration
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::DuplicateParticipant { message } => message.clone(),
            Self::ParticipantNotFound { .. } => "Participant not found.".to_string(),
            Self::AlreadyOccupied { slot } => format!("Number {} is already taken.", slot),
            Self::NotOccupied { slot } => format!("Number {} is not taken.", slot),
            Self::SlotOutOfRange { .. } => "Enter a number between 00 and 99.".to_string(),
            Self::Inconsistency { .. } => {
                "The raffle board is in an inconsistent state.".to_string()
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                format!("Invalid configuration: {}", self)
            }
            _ => format!("Storage problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the entered values and try again",
            ErrorCategory::Conflict => "Review the current board state before retrying",
            ErrorCategory::Internal => "The stored state may be damaged; run `reset` to start over",
            ErrorCategory::Storage => "Check that the data directory exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, RaffleError>;
