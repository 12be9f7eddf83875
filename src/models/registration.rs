//! Registration: a doubles team entered in one modality.

use crate::models::tournament::ModalityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player.
pub type PlayerId = Uuid;

/// Unique identifier for a registration (team entry).
pub type RegistrationId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub modality_id: ModalityId,
    /// The two players of the team (order irrelevant).
    pub players: [PlayerId; 2],
    pub payment: PaymentStatus,
    /// Admin let the team in regardless of payment.
    pub admin_override: bool,
    /// Lower is stronger; unseeded teams rank after all seeded ones.
    pub seed: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(modality_id: ModalityId, players: [PlayerId; 2], seed: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            modality_id,
            players,
            payment: PaymentStatus::Pending,
            admin_override: false,
            seed,
            created_at: Utc::now(),
        }
    }

    /// Confirmed payment, or let in by an admin.
    pub fn is_eligible(&self) -> bool {
        self.payment == PaymentStatus::Confirmed || self.admin_override
    }

    /// Same pair of players, in either order.
    pub fn is_same_team(&self, players: &[PlayerId; 2]) -> bool {
        let [a, b] = self.players;
        (a == players[0] && b == players[1]) || (a == players[1] && b == players[0])
    }
}
