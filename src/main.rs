use clap::Parser;
use raffle_board::config::LogFormat;
use raffle_board::utils::error::ErrorCategory;
use raffle_board::utils::{logger, validation::Validate};
use raffle_board::{
    BoardRepository, CliConfig, Command, ConfigProvider, DrawResult, FileStorage, Participant,
    ParticipantData, RaffleBoard, RaffleError,
};

fn describe(p: &Participant) -> String {
    match p.phone() {
        Some(phone) => format!("{} <{}> tel. {} [{}]", p.name(), p.email(), phone, p.id()),
        None => format!("{} <{}> [{}]", p.name(), p.email(), p.id()),
    }
}

fn run(board: &mut RaffleBoard<FileStorage>, command: Command) -> raffle_board::Result<()> {
    match command {
        Command::Register {
            name,
            email,
            phone,
            id,
        } => {
            let data = ParticipantData {
                id,
                name,
                email,
                phone,
            };
            let p = board.register_participant(data)?;
            println!("✅ Participant {} registered with id {}", p.name(), p.id());
        }
        Command::List => {
            let participants = board.list_participants();
            if participants.is_empty() {
                println!("No participants registered yet");
            }
            for p in participants {
                println!("{}", describe(p));
            }
        }
        Command::Assign {
            slot,
            participant_id,
        } => {
            let assignment = board.assign_slot(&slot, &participant_id)?;
            println!(
                "✅ Slot {} reserved for {}",
                assignment.slot, assignment.participant_id
            );
        }
        Command::Free { slot } => {
            let assignment = board.free_slot(&slot)?;
            println!(
                "✅ Slot {} released (was held by {})",
                assignment.slot, assignment.participant_id
            );
        }
        Command::Owner { slot } => match board.slot_owner(&slot)? {
            Some(p) => println!("{}", describe(p)),
            None => println!("Slot is free"),
        },
        Command::SlotsOf { participant_id } => {
            let slots = board.slots_of(&participant_id)?;
            let labels: Vec<String> = slots.iter().map(ToString::to_string).collect();
            println!("{}", labels.join(" "));
        }
        Command::Draw { slot } => match board.draw_result(&slot)? {
            DrawResult::Winner { participant, .. } => {
                println!(
                    "🎉 Winner: {} - Email: {}",
                    participant.name(),
                    participant.email()
                );
            }
            DrawResult::Vacant { slot } => {
                println!("Vacant: nobody held number {}", slot);
            }
        },
        Command::Stats => {
            let stats = board.statistics();
            println!("Occupied: {}", stats.occupied);
            println!("Free: {}", stats.free);
            println!("Participants: {}", stats.unique_participants);
            println!("Occupancy: {:.2}%", stats.occupancy_percent);
        }
        Command::Board => {
            for row in board.board()?.chunks(10) {
                let cells: Vec<String> = row
                    .iter()
                    .map(|cell| match cell.occupant {
                        Some(p) => format!("[{}:{:<8.8}]", cell.label, p.name()),
                        None => format!("[{}:{:<8}]", cell.label, ""),
                    })
                    .collect();
                println!("{}", cells.join(""));
            }
        }
        Command::Reset { purge } => {
            board.reset_empty_board();
            if purge {
                board.repository().clear()?;
                println!("🧹 Stored raffle state deleted");
            } else {
                board.save();
                println!("🧹 Board reset to empty");
            }
        }
    }
    Ok(())
}

fn exit_code(e: &RaffleError) -> i32 {
    match e.category() {
        ErrorCategory::Input | ErrorCategory::Configuration => 2,
        ErrorCategory::Conflict => 3,
        ErrorCategory::Storage | ErrorCategory::Internal => 1,
    }
}

fn main() {
    let cli = CliConfig::parse();

    let config = match cli.resolve().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    let level = config.logging.level.as_deref();
    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose, level),
        LogFormat::Json => logger::init_json_logger(cli.verbose, level),
    }

    tracing::debug!("Resolved config: {:?}", config);

    let storage = FileStorage::new(config.data_dir());
    let repository = BoardRepository::with_key(storage, config.state_key());
    let mut board = RaffleBoard::new(repository);

    if let Err(e) = run(&mut board, cli.command) {
        tracing::error!("Command failed: {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }
}
