//! Saving and loading the whole board as one JSON blob under a fixed key.

use crate::domain::model::{SlotIndex, BOARD_SIZE};
use crate::domain::participant::{Participant, ParticipantData};
use crate::domain::ports::StateStore;
use crate::utils::error::{RaffleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_STATE_KEY: &str = "raffleState";

/// Wire format: `{"participants": [[id, {...}]], "slots": [[index, id|null]]}`
#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    participants: Vec<(String, ParticipantData)>,
    slots: Vec<(i64, Option<String>)>,
}

/// Board contents restored from storage. `slots` always has `BOARD_SIZE`
/// entries and every occupant refers to one of `participants`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub participants: Vec<Participant>,
    pub slots: Vec<Option<String>>,
}

fn corrupted(reason: impl Into<String>) -> RaffleError {
    RaffleError::StateCorrupted {
        reason: reason.into(),
    }
}

impl PersistedState {
    fn from_board(participants: &[Participant], slots: &[Option<String>]) -> Self {
        Self {
            participants: participants
                .iter()
                .map(|p| (p.id().to_string(), ParticipantData::from(p)))
                .collect(),
            slots: slots
                .iter()
                .enumerate()
                .map(|(i, occupant)| (i as i64, occupant.clone()))
                .collect(),
        }
    }

    fn into_state(self) -> Result<BoardState> {
        let mut participants = Vec::with_capacity(self.participants.len());
        let mut ids = HashSet::new();
        let mut emails = HashSet::new();

        for (key, mut data) in self.participants {
            let id = data.id.get_or_insert_with(|| key.clone());
            if *id != key {
                return Err(corrupted(format!(
                    "participant entry '{}' carries id '{}'",
                    key, id
                )));
            }

            let participant = Participant::new(data)
                .map_err(|e| corrupted(format!("participant '{}': {}", key, e)))?;

            if !ids.insert(participant.id().to_string()) {
                return Err(corrupted(format!("duplicate participant id '{}'", key)));
            }
            if !emails.insert(participant.email().to_lowercase()) {
                return Err(corrupted(format!(
                    "duplicate participant email '{}'",
                    participant.email()
                )));
            }
            participants.push(participant);
        }

        if self.slots.len() != BOARD_SIZE {
            return Err(corrupted(format!(
                "expected {} slots, found {}",
                BOARD_SIZE,
                self.slots.len()
            )));
        }

        let mut slots: Vec<Option<String>> = vec![None; BOARD_SIZE];
        let mut seen = [false; BOARD_SIZE];
        for (index, occupant) in self.slots {
            let slot = SlotIndex::new(index).map_err(|e| corrupted(e.to_string()))?;
            if std::mem::replace(&mut seen[slot.as_usize()], true) {
                return Err(corrupted(format!("slot {} listed twice", slot)));
            }
            if let Some(id) = &occupant {
                if !ids.contains(id) {
                    return Err(corrupted(format!(
                        "slot {} references unknown participant '{}'",
                        slot, id
                    )));
                }
            }
            slots[slot.as_usize()] = occupant;
        }

        Ok(BoardState {
            participants,
            slots,
        })
    }
}

/// Persists board state through a [`StateStore`].
pub struct BoardRepository<S: StateStore> {
    store: S,
    key: String,
}

impl<S: StateStore> BoardRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STATE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 儲存失敗只記錄警告，不影響已完成的記憶體內操作
    pub fn save(&self, participants: &[Participant], slots: &[Option<String>]) {
        if let Err(e) = self.try_save(participants, slots) {
            tracing::warn!("Failed to persist raffle state under '{}': {}", self.key, e);
        }
    }

    pub fn try_save(&self, participants: &[Participant], slots: &[Option<String>]) -> Result<()> {
        let state = PersistedState::from_board(participants, slots);
        let blob = serde_json::to_string(&state)?;
        self.store.set_item(&self.key, &blob)?;
        tracing::debug!(
            "Saved raffle state: {} participants, {} bytes",
            participants.len(),
            blob.len()
        );
        Ok(())
    }

    /// `Ok(None)` when nothing is stored; an error when the stored blob cannot
    /// be trusted. Partial state is never returned.
    pub fn load(&self) -> Result<Option<BoardState>> {
        let Some(raw) = self.store.get_item(&self.key)? else {
            return Ok(None);
        };

        let persisted: PersistedState = serde_json::from_str(&raw)
            .map_err(|e| corrupted(format!("malformed JSON: {}", e)))?;

        persisted.into_state().map(Some)
    }

    /// Deletes the stored blob.
    pub fn clear(&self) -> Result<()> {
        self.store.remove_item(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStorage;
    use serde_json::json;

    fn empty_slots() -> Vec<serde_json::Value> {
        (0..BOARD_SIZE).map(|i| json!([i, null])).collect()
    }

    fn repository_with(blob: serde_json::Value) -> BoardRepository<MemoryStorage> {
        let store = MemoryStorage::new();
        store
            .set_item(DEFAULT_STATE_KEY, &blob.to_string())
            .unwrap();
        BoardRepository::new(store)
    }

    #[test]
    fn test_load_without_stored_state() {
        let repository = BoardRepository::new(MemoryStorage::new());
        assert_eq!(repository.load().unwrap(), None);
    }

    #[test]
    fn test_load_valid_state() {
        let mut slots = empty_slots();
        slots[42] = json!([42, "p1"]);
        let repository = repository_with(json!({
            "participants": [["p1", {"id": "p1", "name": "Test", "email": "t@t.com"}]],
            "slots": slots,
        }));

        let state = repository.load().unwrap().unwrap();
        assert_eq!(state.participants.len(), 1);
        assert_eq!(state.participants[0].name(), "Test");
        assert_eq!(state.slots[42].as_deref(), Some("p1"));
        assert_eq!(state.slots.iter().filter(|s| s.is_some()).count(), 1);
    }

    #[test]
    fn test_participant_id_falls_back_to_entry_key() {
        let repository = repository_with(json!({
            "participants": [["p1", {"name": "Test", "email": "t@t.com"}]],
            "slots": empty_slots(),
        }));
        let state = repository.load().unwrap().unwrap();
        assert_eq!(state.participants[0].id(), "p1");
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let store = MemoryStorage::new();
        store
            .set_item(DEFAULT_STATE_KEY, r#"{"participants": "malformado""#)
            .unwrap();
        let repository = BoardRepository::new(store);
        assert!(matches!(
            repository.load(),
            Err(RaffleError::StateCorrupted { .. })
        ));
    }

    #[test]
    fn test_inconsistent_states_are_rejected() {
        let mut short = empty_slots();
        short.pop();

        let mut dangling = empty_slots();
        dangling[3] = json!([3, "ghost"]);

        let mut repeated = empty_slots();
        repeated[1] = json!([0, null]);

        let mut out_of_range = empty_slots();
        out_of_range[99] = json!([100, null]);

        let participant = json!(["p1", {"id": "p1", "name": "Test", "email": "t@t.com"}]);
        let blobs = [
            json!({"participants": [], "slots": short}),
            json!({"participants": [], "slots": dangling}),
            json!({"participants": [], "slots": repeated}),
            json!({"participants": [], "slots": out_of_range}),
            json!({"participants": [participant, participant], "slots": empty_slots()}),
            json!({"participants": [["p1", {"id": "p1", "name": "X", "email": "bad"}]], "slots": empty_slots()}),
            json!({"participants": [["p1", {"id": "p2", "name": "X", "email": "x@t.com"}]], "slots": empty_slots()}),
        ];

        for blob in blobs {
            let repository = repository_with(blob.clone());
            assert!(
                matches!(repository.load(), Err(RaffleError::StateCorrupted { .. })),
                "blob should be rejected: {}",
                blob
            );
        }
    }

    #[test]
    fn test_saved_format() {
        let store = MemoryStorage::new();
        let repository = BoardRepository::with_key(store.clone(), "custom");
        let p = Participant::new(ParticipantData::new("Paco", "paco@test.com").with_id("p1")).unwrap();
        let mut slots = vec![None; BOARD_SIZE];
        slots[15] = Some("p1".to_string());

        repository.save(&[p], &slots);

        let raw = store.get_item("custom").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value["participants"],
            json!([["p1", {"id": "p1", "name": "Paco", "email": "paco@test.com"}]])
        );
        assert_eq!(value["slots"].as_array().unwrap().len(), BOARD_SIZE);
        assert_eq!(value["slots"][15], json!([15, "p1"]));
        assert_eq!(value["slots"][16], json!([16, null]));
    }

    #[test]
    fn test_clear_removes_blob() {
        let store = MemoryStorage::new();
        let repository = BoardRepository::new(store.clone());
        repository.save(&[], &vec![None; BOARD_SIZE]);
        assert!(store.get_item(DEFAULT_STATE_KEY).unwrap().is_some());

        repository.clear().unwrap();
        assert_eq!(repository.load().unwrap(), None);
    }
}
