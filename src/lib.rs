//! Padel tournament scheduling: library with models, store and scheduling / bracket logic.

pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::{ConfigError, SchedulingConfig, ServerConfig};
pub use error::{TournamentError, TournamentResult};
pub use logic::{
    Advancement, BracketReport, GeneratedGroup, PhaseOutcome, Qualification, Qualifier, ResultOutcome,
    ResultPayload, ScheduleReport, SlotReport, Standing,
};
pub use models::{
    ClubId, Court, CourtAvailability, CourtId, GameMatch, Group, GroupId, GroupPlacement, MatchId,
    MatchPhase, MatchSlot, Modality, ModalityId, NextMatch, PaymentStatus, PlayerId, Recurrence,
    Registration, RegistrationId, SetScore, Side, SlotId, SlotStatus, Tournament, TournamentId,
    TournamentStatus,
};
pub use service::{RegistrationRequest, TournamentService, TournamentView};
pub use store::{Database, Store};
