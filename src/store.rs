//! Arena-style relational store and its transaction primitive.
//!
//! Every entity lives in one flat collection and refers to others by id, so
//! bracket links (match -> next match -> ... -> final) never form ownership
//! cycles. [`Database`] wraps a [`Store`] behind a revision counter: a
//! transaction works on a private copy and commits only if nobody else
//! committed in between.

use crate::error::{TournamentError, TournamentResult};
use crate::models::{
    Court, CourtId, GameMatch, Group, GroupId, GroupPlacement, MatchId, MatchSlot, Modality,
    ModalityId, Registration, RegistrationId, SlotId, SlotStatus, Tournament, TournamentId,
};
use serde::Serialize;
use std::sync::RwLock;

/// All persisted scheduling state. Collections keep insertion order, which
/// doubles as creation order for deterministic tie-breaks.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Store {
    pub tournaments: Vec<Tournament>,
    pub modalities: Vec<Modality>,
    pub courts: Vec<Court>,
    pub slots: Vec<MatchSlot>,
    pub registrations: Vec<Registration>,
    pub groups: Vec<Group>,
    pub placements: Vec<GroupPlacement>,
    pub matches: Vec<GameMatch>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tournament(&self, id: TournamentId) -> TournamentResult<&Tournament> {
        self.tournaments
            .iter()
            .find(|t| t.id == id)
            .ok_or(TournamentError::not_found("tournament", id))
    }

    pub fn tournament_mut(&mut self, id: TournamentId) -> TournamentResult<&mut Tournament> {
        self.tournaments
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TournamentError::not_found("tournament", id))
    }

    pub fn modality(&self, id: ModalityId) -> TournamentResult<&Modality> {
        self.modalities
            .iter()
            .find(|m| m.id == id)
            .ok_or(TournamentError::not_found("modality", id))
    }

    pub fn modalities_of(&self, tournament_id: TournamentId) -> impl Iterator<Item = &Modality> {
        self.modalities
            .iter()
            .filter(move |m| m.tournament_id == tournament_id)
    }

    pub fn court(&self, id: CourtId) -> TournamentResult<&Court> {
        self.courts
            .iter()
            .find(|c| c.id == id)
            .ok_or(TournamentError::not_found("court", id))
    }

    pub fn courts_of(&self, tournament_id: TournamentId) -> impl Iterator<Item = &Court> {
        self.courts
            .iter()
            .filter(move |c| c.tournament_id == tournament_id)
    }

    pub fn slot(&self, id: SlotId) -> TournamentResult<&MatchSlot> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .ok_or(TournamentError::not_found("slot", id))
    }

    pub fn slot_mut(&mut self, id: SlotId) -> TournamentResult<&mut MatchSlot> {
        self.slots
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(TournamentError::not_found("slot", id))
    }

    pub fn slots_of_court(&self, court_id: CourtId) -> impl Iterator<Item = &MatchSlot> {
        self.slots.iter().filter(move |s| s.court_id == court_id)
    }

    pub fn registration(&self, id: RegistrationId) -> TournamentResult<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.id == id)
            .ok_or(TournamentError::not_found("registration", id))
    }

    pub fn registrations_of(&self, modality_id: ModalityId) -> impl Iterator<Item = &Registration> {
        self.registrations
            .iter()
            .filter(move |r| r.modality_id == modality_id)
    }

    pub fn group(&self, id: GroupId) -> TournamentResult<&Group> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or(TournamentError::not_found("group", id))
    }

    /// Groups of a modality sorted by their display order.
    pub fn groups_of(&self, modality_id: ModalityId) -> Vec<&Group> {
        let mut groups: Vec<_> = self
            .groups
            .iter()
            .filter(|g| g.modality_id == modality_id)
            .collect();
        groups.sort_by_key(|g| g.order);
        groups
    }

    /// Placements of a group sorted by in-group seed.
    pub fn placements_of(&self, group_id: GroupId) -> Vec<&GroupPlacement> {
        let mut placements: Vec<_> = self
            .placements
            .iter()
            .filter(|p| p.group_id == group_id)
            .collect();
        placements.sort_by_key(|p| p.seed);
        placements
    }

    pub fn game(&self, id: MatchId) -> TournamentResult<&GameMatch> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(TournamentError::not_found("match", id))
    }

    pub fn game_mut(&mut self, id: MatchId) -> TournamentResult<&mut GameMatch> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(TournamentError::not_found("match", id))
    }

    pub fn matches_of_modality(&self, modality_id: ModalityId) -> impl Iterator<Item = &GameMatch> {
        self.matches
            .iter()
            .filter(move |m| m.modality_id == modality_id)
    }

    pub fn matches_of_group(&self, group_id: GroupId) -> impl Iterator<Item = &GameMatch> {
        self.matches
            .iter()
            .filter(move |m| m.group_id() == Some(group_id))
    }

    /// Tournament that a modality belongs to.
    pub fn tournament_of_modality(&self, modality_id: ModalityId) -> TournamentResult<&Tournament> {
        let modality = self.modality(modality_id)?;
        self.tournament(modality.tournament_id)
    }

    /// Status-gated claim: the slot becomes Assigned to `match_id` only if it is still Available.
    pub fn claim_slot(&mut self, slot_id: SlotId, match_id: MatchId) -> TournamentResult<()> {
        let slot = self.slot_mut(slot_id)?;
        if slot.status != SlotStatus::Available {
            return Err(TournamentError::AlreadyScheduled(format!(
                "slot {slot_id} is {:?}, not available",
                slot.status
            )));
        }
        slot.status = SlotStatus::Assigned;
        slot.match_id = Some(match_id);
        Ok(())
    }

    /// Return an Assigned slot to the pool. No-op for slots in any other state.
    pub fn release_slot(&mut self, slot_id: SlotId) -> TournamentResult<()> {
        let slot = self.slot_mut(slot_id)?;
        if slot.status == SlotStatus::Assigned {
            slot.status = SlotStatus::Available;
            slot.match_id = None;
        }
        Ok(())
    }
}

/// Versioned store: the revision increases on every commit.
#[derive(Debug, Default)]
struct Versioned {
    revision: u64,
    store: Store,
}

/// Shared handle to the store with all-or-nothing, optimistically checked transactions.
#[derive(Debug)]
pub struct Database {
    state: RwLock<Versioned>,
    max_retries: u32,
}

impl Database {
    pub fn new(max_retries: u32) -> Self {
        Self::with_store(Store::new(), max_retries)
    }

    pub fn with_store(store: Store, max_retries: u32) -> Self {
        Self {
            state: RwLock::new(Versioned { revision: 0, store }),
            max_retries: max_retries.max(1),
        }
    }

    /// Number of commits so far.
    pub fn revision(&self) -> TournamentResult<u64> {
        let guard = self.state.read().map_err(|_| poisoned())?;
        Ok(guard.revision)
    }

    /// Run `f` against the latest committed state without modifying it.
    pub fn read<T>(&self, f: impl FnOnce(&Store) -> TournamentResult<T>) -> TournamentResult<T> {
        let guard = self.state.read().map_err(|_| poisoned())?;
        f(&guard.store)
    }

    /// Run `f` against a private copy of the store and commit the copy if `f` succeeds.
    ///
    /// If another transaction committed while `f` was running, the copy is thrown
    /// away and `f` runs again on fresh state, up to `max_retries` times. An `Err`
    /// from `f` discards every change it made.
    pub fn transaction<T>(
        &self,
        mut f: impl FnMut(&mut Store) -> TournamentResult<T>,
    ) -> TournamentResult<T> {
        for attempt in 1..=self.max_retries {
            let (revision, mut working) = {
                let guard = self.state.read().map_err(|_| poisoned())?;
                (guard.revision, guard.store.clone())
            };

            let out = f(&mut working)?;

            let mut guard = self.state.write().map_err(|_| poisoned())?;
            if guard.revision != revision {
                log::debug!(
                    "transaction lost race at revision {} (attempt {}/{})",
                    revision,
                    attempt,
                    self.max_retries
                );
                continue;
            }
            guard.store = working;
            guard.revision += 1;
            return Ok(out);
        }
        Err(TournamentError::TransactionConflict {
            attempts: self.max_retries,
        })
    }
}

fn poisoned() -> TournamentError {
    TournamentError::Storage("store lock poisoned".to_string())
}
