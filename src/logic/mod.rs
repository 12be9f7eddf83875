//! Tournament business logic: slots, groups, scheduling, brackets, standings, advancement, lifecycle.

mod advancement;
mod bracket;
mod groups;
mod lifecycle;
mod results;
mod schedule;
mod slots;
mod standings;

pub use advancement::{advance_winner, Advancement};
pub use bracket::{
    avoid_group_rematches, bracket_size, generate_bracket, place_qualifiers, round_name,
    seed_positions, BracketReport, BracketRound, Qualification, Qualifier,
};
pub use groups::{
    choose_group_count, clear_groups, generate_groups, seeded_registrations, serpentine_assignment,
    swap_placements, withdraw_registration, GeneratedGroup, GroupBounds,
};
pub use lifecycle::{
    delete_tournament, ensure_status, final_match, is_completable, is_listed_transition, transition,
};
pub use results::{record_result, PhaseOutcome, ResultOutcome, ResultPayload, MAX_SETS};
pub use schedule::{
    allocate_schedule, materialize_round_robin, round_robin_pairs, unassign_match, ScheduleReport,
};
pub use slots::{generate_court_slots, generate_slots, set_slot_blocked, slice_window, SlotReport};
pub use standings::{compute_standings, group_standings, Standing, POINTS_PER_WIN};
