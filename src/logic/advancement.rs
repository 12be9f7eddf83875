//! Winner advancement: copy a decided knockout match's winner into its successor's seat.

use crate::error::{TournamentError, TournamentResult};
use crate::models::{MatchId, Side};
use crate::store::Store;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Advancement {
    /// Winner written into `successor`'s `side` seat.
    Advanced {
        successor: MatchId,
        side: Side,
        /// Successor now has both teams and can be scheduled.
        successor_ready: bool,
    },
    /// The same winner was already in place.
    Unchanged {
        successor: MatchId,
        side: Side,
        successor_ready: bool,
    },
    /// The match was the final; nothing to propagate.
    Final,
}

/// One hop of propagation. Never cascades beyond the successor.
pub fn advance_winner(store: &mut Store, match_id: MatchId) -> TournamentResult<Advancement> {
    let m = store.game(match_id)?;
    if !m.is_knockout() {
        return Err(TournamentError::InvalidConfiguration(
            "group-stage matches feed standings, not the bracket".to_string(),
        ));
    }
    let winner = m.winning_team().ok_or_else(|| {
        TournamentError::InvalidResult(format!("match {match_id} has no winner yet"))
    })?;
    let Some(next) = m.next_match() else {
        return Ok(Advancement::Final);
    };

    let successor = store.game_mut(next.match_id)?;
    let seat = successor.team_mut(next.side);
    let changed = match *seat {
        None => {
            *seat = Some(winner);
            true
        }
        Some(current) if current == winner => false,
        Some(current) => {
            return Err(TournamentError::AdvancementConflict(format!(
                "match {} already holds {current} in seat {:?}; refusing to overwrite with {winner}",
                next.match_id, next.side
            )))
        }
    };
    let successor_ready = successor.has_both_teams();

    Ok(if changed {
        log::info!("match {match_id}: winner {winner} advanced to {}", next.match_id);
        Advancement::Advanced {
            successor: next.match_id,
            side: next.side,
            successor_ready,
        }
    } else {
        Advancement::Unchanged {
            successor: next.match_id,
            side: next.side,
            successor_ready,
        }
    })
}
