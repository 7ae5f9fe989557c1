use crate::core::persistence::{BoardRepository, BoardState};
use crate::domain::model::{
    Assignment, BoardStats, DrawResult, IntoSlot, SlotIndex, SlotView, BOARD_SIZE,
};
use crate::domain::participant::{Participant, ParticipantData};
use crate::domain::ports::StateStore;
use crate::utils::error::{RaffleError, Result};
use std::collections::HashMap;

/// The raffle board aggregate: participant registry plus the 100-slot table.
///
/// 每個成功的變更指令（登記、劃位、釋放）之後都會立即寫入完整狀態；
/// 查詢不會觸發儲存。
pub struct RaffleBoard<S: StateStore> {
    repository: BoardRepository<S>,
    participants: Vec<Participant>,
    index: HashMap<String, usize>,
    slots: Vec<Option<String>>,
}

impl<S: StateStore> RaffleBoard<S> {
    /// Loads prior state from the repository, or starts empty when nothing
    /// usable is stored. Never fails.
    pub fn new(repository: BoardRepository<S>) -> Self {
        let mut board = Self {
            repository,
            participants: Vec::new(),
            index: HashMap::new(),
            slots: vec![None; BOARD_SIZE],
        };

        match board.repository.load() {
            Ok(Some(state)) => {
                board.restore(state);
                tracing::info!(
                    "Loaded raffle state: {} participants, {} slots taken",
                    board.participants.len(),
                    board.reserved_count()
                );
            }
            Ok(None) => {
                tracing::debug!(
                    "No stored state under '{}', starting with an empty board",
                    board.repository.key()
                );
            }
            Err(e) => {
                tracing::error!("Discarding stored raffle state: {}", e);
                board.reset_empty_board();
            }
        }

        board
    }

    fn restore(&mut self, state: BoardState) {
        self.reset_empty_board();
        for participant in state.participants {
            self.insert(participant);
        }
        self.slots = state.slots;
    }

    fn insert(&mut self, participant: Participant) {
        self.index
            .insert(participant.id().to_string(), self.participants.len());
        self.participants.push(participant);
    }

    fn persist(&self) {
        self.repository.save(&self.participants, &self.slots);
    }

    pub fn repository(&self) -> &BoardRepository<S> {
        &self.repository
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.index.get(id).map(|&i| &self.participants[i])
    }

    pub fn register_participant(&mut self, data: ParticipantData) -> Result<Participant> {
        if data.name.is_empty() || data.email.is_empty() {
            return Err(RaffleError::validation("name and email are required"));
        }

        if let Some(existing) = self.participants.iter().find(|p| p.has_email(&data.email)) {
            return Err(RaffleError::DuplicateParticipant {
                message: format!(
                    "a participant with email {} already exists",
                    existing.email()
                ),
            });
        }

        if let Some(id) = data.id.as_deref() {
            if self.index.contains_key(id) {
                return Err(RaffleError::DuplicateParticipant {
                    message: format!("a participant with id {} already exists", id),
                });
            }
        }

        let participant = Participant::new(data)?;
        tracing::debug!("Registered participant {} ({})", participant.id(), participant.email());
        self.insert(participant.clone());
        self.persist();
        Ok(participant)
    }

    /// Participants in registration order.
    pub fn list_participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn assign_slot(&mut self, slot: impl IntoSlot, participant_id: &str) -> Result<Assignment> {
        let slot = slot.into_slot()?;
        if !self.index.contains_key(participant_id) {
            return Err(RaffleError::ParticipantNotFound {
                id: participant_id.to_string(),
            });
        }

        let cell = &mut self.slots[slot.as_usize()];
        if cell.is_some() {
            return Err(RaffleError::AlreadyOccupied { slot });
        }
        *cell = Some(participant_id.to_string());

        tracing::debug!("Assigned slot {} to {}", slot, participant_id);
        self.persist();
        Ok(Assignment {
            slot,
            participant_id: participant_id.to_string(),
        })
    }

    /// Frees a slot and returns the assignment that was removed.
    pub fn free_slot(&mut self, slot: impl IntoSlot) -> Result<Assignment> {
        let slot = slot.into_slot()?;
        let participant_id = self.slots[slot.as_usize()]
            .take()
            .ok_or(RaffleError::NotOccupied { slot })?;

        tracing::debug!("Freed slot {} (was {})", slot, participant_id);
        self.persist();
        Ok(Assignment {
            slot,
            participant_id,
        })
    }

    fn occupant(&self, slot: SlotIndex) -> Result<Option<&Participant>> {
        match &self.slots[slot.as_usize()] {
            None => Ok(None),
            Some(id) => self
                .participant(id)
                .map(Some)
                .ok_or_else(|| RaffleError::Inconsistency {
                    slot,
                    participant_id: id.clone(),
                }),
        }
    }

    pub fn slot_owner(&self, slot: impl IntoSlot) -> Result<Option<&Participant>> {
        self.occupant(slot.into_slot()?)
    }

    /// Slots held by a participant, ascending.
    pub fn slots_of(&self, participant_id: &str) -> Result<Vec<SlotIndex>> {
        if !self.index.contains_key(participant_id) {
            return Err(RaffleError::ParticipantNotFound {
                id: participant_id.to_string(),
            });
        }

        Ok(SlotIndex::all()
            .filter(|slot| self.slots[slot.as_usize()].as_deref() == Some(participant_id))
            .collect())
    }

    pub fn draw_result(&self, slot: impl IntoSlot) -> Result<DrawResult> {
        let slot = slot.into_slot()?;
        let result = match self.occupant(slot)? {
            None => DrawResult::Vacant { slot },
            Some(participant) => DrawResult::Winner {
                slot,
                participant: participant.clone(),
            },
        };
        tracing::info!("Draw for {}: {:?}", slot, result.winner().map(Participant::id));
        Ok(result)
    }

    pub fn reserved_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn statistics(&self) -> BoardStats {
        let occupied = self.reserved_count();
        let percent = occupied as f64 / BOARD_SIZE as f64 * 100.0;
        BoardStats {
            occupied,
            free: BOARD_SIZE - occupied,
            unique_participants: self.participants.len(),
            occupancy_percent: (percent * 100.0).round() / 100.0,
        }
    }

    /// All slots in order, with their occupants resolved.
    pub fn board(&self) -> Result<Vec<SlotView<'_>>> {
        SlotIndex::all()
            .map(|slot| {
                Ok(SlotView {
                    slot,
                    label: slot.to_string(),
                    occupant: self.occupant(slot)?,
                })
            })
            .collect()
    }

    /// Clears both tables. Does not persist; call [`RaffleBoard::save`] for that.
    pub fn reset_empty_board(&mut self) {
        self.participants.clear();
        self.index.clear();
        self.slots = vec![None; BOARD_SIZE];
    }

    pub fn save(&self) {
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStorage;

    fn empty_board() -> RaffleBoard<MemoryStorage> {
        RaffleBoard::new(BoardRepository::new(MemoryStorage::new()))
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = empty_board();
        assert_eq!(board.reserved_count(), 0);
        assert!(board.list_participants().is_empty());
        assert_eq!(board.board().unwrap().len(), BOARD_SIZE);
    }

    #[test]
    fn test_register_rejects_raw_empty_fields() {
        let mut board = empty_board();
        let err = board
            .register_participant(ParticipantData::new("", "a@test.com"))
            .unwrap_err();
        assert!(matches!(err, RaffleError::Validation { .. }));
    }

    #[test]
    fn test_register_rejects_duplicate_explicit_id() {
        let mut board = empty_board();
        board
            .register_participant(ParticipantData::new("A", "a@test.com").with_id("p1"))
            .unwrap();
        let err = board
            .register_participant(ParticipantData::new("B", "b@test.com").with_id("p1"))
            .unwrap_err();
        assert!(matches!(err, RaffleError::DuplicateParticipant { .. }));
        assert_eq!(board.list_participants().len(), 1);
    }

    #[test]
    fn test_duplicate_check_ignores_surrounding_whitespace() {
        let mut board = empty_board();
        board
            .register_participant(ParticipantData::new("A", "a@test.com"))
            .unwrap();
        assert!(board
            .register_participant(ParticipantData::new("B", " A@TEST.COM "))
            .is_err());
    }

    #[test]
    fn test_board_view_labels() {
        let mut board = empty_board();
        let p = board
            .register_participant(ParticipantData::new("Paco", "paco@test.com"))
            .unwrap();
        board.assign_slot(7, p.id()).unwrap();

        let view = board.board().unwrap();
        assert_eq!(view[7].label, "07");
        assert!(view[7].is_occupied());
        assert_eq!(view[7].occupant.map(Participant::name), Some("Paco"));
        assert!(!view[8].is_occupied());
    }

    #[test]
    fn test_statistics_rounding() {
        let mut board = empty_board();
        let p = board
            .register_participant(ParticipantData::new("Paco", "paco@test.com"))
            .unwrap();
        for slot in 0..33 {
            board.assign_slot(slot, p.id()).unwrap();
        }
        let stats = board.statistics();
        assert_eq!(stats.occupied, 33);
        assert_eq!(stats.free, 67);
        assert_eq!(stats.occupancy_percent, 33.0);
    }
}
