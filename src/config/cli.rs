use crate::config::toml_config::BoardConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "raffle-board")]
#[command(about = "A 100-slot numbered raffle board (00-99)")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Directory holding the stored board state")]
    pub data_dir: Option<String>,

    #[arg(long, help = "Key under which the board state is stored")]
    pub state_key: Option<String>,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Register a new participant
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// List participants in registration order
    List,
    /// Reserve a slot for a participant
    Assign { slot: String, participant_id: String },
    /// Release a reserved slot
    Free { slot: String },
    /// Show who holds a slot
    Owner { slot: String },
    /// Show the slots held by a participant
    SlotsOf { participant_id: String },
    /// Look up the winner for a drawn number
    Draw { slot: String },
    /// Show occupancy statistics
    Stats,
    /// Print the whole board
    Board,
    /// Start over with an empty board
    Reset {
        #[arg(long, help = "Delete the stored state instead of saving an empty board")]
        purge: bool,
    },
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(&self) -> Result<BoardConfig> {
        let mut config = match &self.config {
            Some(path) => BoardConfig::from_file(path)?,
            None => BoardConfig::default(),
        };

        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
        if let Some(state_key) = &self.state_key {
            config.storage.state_key = state_key.clone();
        }

        Ok(config)
    }
}
