//! Data structures for padel tournaments: tournaments, courts and slots, teams, groups, matches.

mod court;
mod game;
mod group;
mod registration;
mod tournament;

pub use court::{Court, CourtAvailability, CourtId, MatchSlot, Recurrence, SlotId, SlotStatus};
pub use game::{GameMatch, MatchId, MatchPhase, NextMatch, SetScore, Side};
pub use group::{Group, GroupId, GroupPlacement};
pub use registration::{PaymentStatus, PlayerId, Registration, RegistrationId};
pub use tournament::{ClubId, Modality, ModalityId, Tournament, TournamentId, TournamentStatus};
