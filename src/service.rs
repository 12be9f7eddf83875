//! Organizer actions, each run as one atomic transaction against the shared store.

use crate::config::SchedulingConfig;
use crate::error::{TournamentError, TournamentResult};
use crate::logic::{
    self, Advancement, BracketReport, GeneratedGroup, GroupBounds, Qualification, ResultOutcome,
    ResultPayload, ScheduleReport, SlotReport, Standing,
};
use crate::models::{
    ClubId, Court, CourtAvailability, CourtId, GameMatch, Group, GroupId, GroupPlacement, MatchId,
    MatchSlot, Modality, ModalityId, PaymentStatus, PlayerId, Registration, RegistrationId,
    SlotId, SlotStatus, Tournament, TournamentId, TournamentStatus,
};
use crate::store::{Database, Store};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Team entry request (already validated by the caller's schema layer).
#[derive(Clone, Debug, Deserialize)]
pub struct RegistrationRequest {
    pub players: [PlayerId; 2],
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub payment: PaymentStatus,
    #[serde(default)]
    pub admin_override: bool,
}

/// Everything persisted under one tournament.
#[derive(Clone, Debug, Serialize)]
pub struct TournamentView {
    pub tournament: Tournament,
    pub modalities: Vec<Modality>,
    pub courts: Vec<Court>,
    pub slots: Vec<MatchSlot>,
    pub registrations: Vec<Registration>,
    pub groups: Vec<Group>,
    pub placements: Vec<GroupPlacement>,
    pub matches: Vec<GameMatch>,
}

pub struct TournamentService {
    db: Database,
    config: SchedulingConfig,
}

impl TournamentService {
    pub fn new(db: Database, config: SchedulingConfig) -> Self {
        Self { db, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn create_tournament(
        &self,
        club_id: ClubId,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> TournamentResult<Tournament> {
        let tournament = Tournament::new(club_id, name.trim(), start_date, end_date)?;
        self.db.transaction(|store| {
            store.tournaments.push(tournament.clone());
            Ok(())
        })?;
        log::info!("tournament {} created for club {club_id}", tournament.id);
        Ok(tournament)
    }

    pub fn delete_tournament(&self, tournament_id: TournamentId) -> TournamentResult<()> {
        self.db
            .transaction(|store| logic::delete_tournament(store, tournament_id))?;
        log::info!("tournament {tournament_id} deleted");
        Ok(())
    }

    pub fn add_modality(
        &self,
        tournament_id: TournamentId,
        discipline: &str,
        category: &str,
        max_pairs: Option<u32>,
    ) -> TournamentResult<Modality> {
        self.db.transaction(|store| {
            logic::ensure_status(
                store,
                tournament_id,
                &[TournamentStatus::Draft, TournamentStatus::Open],
                "add modality",
            )?;
            let modality = Modality::new(tournament_id, discipline, category, max_pairs);
            store.modalities.push(modality.clone());
            Ok(modality)
        })
    }

    pub fn add_court(
        &self,
        tournament_id: TournamentId,
        name: &str,
        indoor: bool,
        availability: Vec<CourtAvailability>,
    ) -> TournamentResult<Court> {
        self.db.transaction(|store| {
            store.tournament(tournament_id)?;
            let court = Court::new(tournament_id, name, indoor, availability.clone());
            store.courts.push(court.clone());
            Ok(court)
        })
    }

    pub fn register_team(
        &self,
        modality_id: ModalityId,
        request: &RegistrationRequest,
    ) -> TournamentResult<Registration> {
        self.db.transaction(|store| {
            let modality = store.modality(modality_id)?.clone();
            logic::ensure_status(
                store,
                modality.tournament_id,
                &[TournamentStatus::Draft, TournamentStatus::Open],
                "register teams",
            )?;
            if request.players[0] == request.players[1] {
                return Err(TournamentError::InvalidConfiguration(
                    "a team needs two different players".to_string(),
                ));
            }
            let count = store.registrations_of(modality_id).count();
            if store
                .registrations_of(modality_id)
                .any(|r| r.is_same_team(&request.players))
            {
                return Err(TournamentError::InvalidConfiguration(
                    "team already registered in this modality".to_string(),
                ));
            }
            if let Some(cap) = modality.max_pairs {
                if count >= cap as usize {
                    return Err(TournamentError::InvalidConfiguration(format!(
                        "modality is full ({cap} pairs)"
                    )));
                }
            }
            let mut registration = Registration::new(modality_id, request.players, request.seed);
            registration.payment = request.payment;
            registration.admin_override = request.admin_override;
            store.registrations.push(registration.clone());
            Ok(registration)
        })
    }

    pub fn withdraw_registration(&self, registration_id: RegistrationId) -> TournamentResult<()> {
        self.db
            .transaction(|store| logic::withdraw_registration(store, registration_id))
    }

    pub fn transition(&self, tournament_id: TournamentId, to: TournamentStatus) -> TournamentResult<()> {
        let from = self
            .db
            .transaction(|store| logic::transition(store, tournament_id, to))?;
        log::info!("tournament {tournament_id}: {from} -> {to}");
        Ok(())
    }

    pub fn generate_slots(&self, tournament_id: TournamentId) -> TournamentResult<SlotReport> {
        let report = self
            .db
            .transaction(|store| logic::generate_slots(store, tournament_id, &self.config))?;
        log::info!(
            "tournament {tournament_id}: {} slot(s) created over {} court(s), {} already present",
            report.created,
            report.courts,
            report.existing
        );
        Ok(report)
    }

    pub fn generate_court_slots(&self, court_id: CourtId) -> TournamentResult<SlotReport> {
        self.db
            .transaction(|store| logic::generate_court_slots(store, court_id, &self.config))
    }

    pub fn set_slot_blocked(&self, slot_id: SlotId, blocked: bool) -> TournamentResult<SlotStatus> {
        self.db
            .transaction(|store| logic::set_slot_blocked(store, slot_id, blocked))
    }

    pub fn generate_groups(
        &self,
        modality_id: ModalityId,
        group_count: Option<usize>,
    ) -> TournamentResult<Vec<GeneratedGroup>> {
        let bounds = GroupBounds::from(&self.config);
        let groups = self
            .db
            .transaction(|store| logic::generate_groups(store, modality_id, bounds, group_count))?;
        log::info!("modality {modality_id}: {} group(s) generated", groups.len());
        Ok(groups)
    }

    pub fn clear_groups(&self, modality_id: ModalityId) -> TournamentResult<usize> {
        let removed = self
            .db
            .transaction(|store| logic::clear_groups(store, modality_id))?;
        log::info!("modality {modality_id}: {removed} group(s) cleared");
        Ok(removed)
    }

    pub fn swap_placements(&self, first: RegistrationId, second: RegistrationId) -> TournamentResult<()> {
        self.db
            .transaction(|store| logic::swap_placements(store, first, second))
    }

    pub fn allocate_schedule(&self, tournament_id: TournamentId) -> TournamentResult<ScheduleReport> {
        let report = self
            .db
            .transaction(|store| logic::allocate_schedule(store, tournament_id))?;
        log::info!(
            "tournament {tournament_id}: {} scheduled, {} unscheduled ({} new group matches)",
            report.scheduled,
            report.unscheduled,
            report.created_matches
        );
        Ok(report)
    }

    pub fn unassign_match(&self, match_id: MatchId) -> TournamentResult<Option<SlotId>> {
        self.db
            .transaction(|store| logic::unassign_match(store, match_id))
    }

    /// `None` falls back to the configured top-N-per-group rule when the
    /// modality has groups, and to direct seeding otherwise.
    pub fn generate_bracket(
        &self,
        tournament_id: TournamentId,
        modality_id: ModalityId,
        qualification: Option<Qualification>,
    ) -> TournamentResult<BracketReport> {
        let report = self.db.transaction(|store| {
            let rule = qualification.unwrap_or_else(|| self.default_qualification(store, modality_id));
            logic::generate_bracket(store, tournament_id, modality_id, rule, Utc::now())
        })?;
        log::info!(
            "modality {modality_id}: bracket of {} with {} qualifier(s), {} bye(s)",
            report.size,
            report.qualifiers,
            report.byes
        );
        Ok(report)
    }

    fn default_qualification(&self, store: &Store, modality_id: ModalityId) -> Qualification {
        if store.groups_of(modality_id).is_empty() {
            Qualification::Direct
        } else {
            Qualification::FromGroups {
                per_group: self.config.qualifiers_per_group,
                wildcards: self.config.wildcards,
            }
        }
    }

    pub fn group_standings(&self, group_id: GroupId) -> TournamentResult<Vec<Standing>> {
        self.db.read(|store| logic::group_standings(store, group_id))
    }

    pub fn record_result(&self, match_id: MatchId, payload: &ResultPayload) -> TournamentResult<ResultOutcome> {
        let outcome = self
            .db
            .transaction(|store| logic::record_result(store, match_id, payload, Utc::now()))?;
        if outcome.recorded {
            log::info!("match {match_id}: result recorded, {:?} won", payload.winner);
        }
        if outcome.tournament_completable {
            log::info!("match {match_id}: every final decided, ranking update due");
        }
        Ok(outcome)
    }

    pub fn advance_winner(&self, match_id: MatchId) -> TournamentResult<Advancement> {
        self.db
            .transaction(|store| logic::advance_winner(store, match_id))
    }

    pub fn tournament_view(&self, tournament_id: TournamentId) -> TournamentResult<TournamentView> {
        self.db.read(|store| {
            let tournament = store.tournament(tournament_id)?.clone();
            let modalities: Vec<Modality> = store.modalities_of(tournament_id).cloned().collect();
            let modality_ids: Vec<ModalityId> = modalities.iter().map(|m| m.id).collect();
            let courts: Vec<Court> = store.courts_of(tournament_id).cloned().collect();
            let court_ids: Vec<CourtId> = courts.iter().map(|c| c.id).collect();
            let groups: Vec<Group> = store
                .groups
                .iter()
                .filter(|g| modality_ids.contains(&g.modality_id))
                .cloned()
                .collect();
            let group_ids: Vec<GroupId> = groups.iter().map(|g| g.id).collect();
            Ok(TournamentView {
                tournament,
                slots: store
                    .slots
                    .iter()
                    .filter(|s| court_ids.contains(&s.court_id))
                    .cloned()
                    .collect(),
                registrations: store
                    .registrations
                    .iter()
                    .filter(|r| modality_ids.contains(&r.modality_id))
                    .cloned()
                    .collect(),
                placements: store
                    .placements
                    .iter()
                    .filter(|p| group_ids.contains(&p.group_id))
                    .cloned()
                    .collect(),
                matches: store
                    .matches
                    .iter()
                    .filter(|m| modality_ids.contains(&m.modality_id))
                    .cloned()
                    .collect(),
                modalities,
                courts,
                groups,
            })
        })
    }
}
