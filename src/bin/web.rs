//! Single binary web server: JSON API over the tournament scheduling core.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, and the
//! scheduling knobs documented in `config.rs` (an optional `.env` file is read first).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use padel_scheduler::{
    ClubId, CourtAvailability, CourtId, Database, GroupId, MatchId, ModalityId, Qualification,
    RegistrationId, RegistrationRequest, ResultPayload, ServerConfig, SlotId, TournamentError,
    TournamentId, TournamentService, TournamentStatus,
};
use serde::{Deserialize, Serialize};

type AppState = Data<TournamentService>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
    revision: Option<u64>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    club_id: ClubId,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Deserialize)]
struct CreateModalityBody {
    discipline: String,
    category: String,
    #[serde(default)]
    max_pairs: Option<u32>,
}

#[derive(Deserialize)]
struct CreateCourtBody {
    name: String,
    #[serde(default)]
    indoor: bool,
    availability: Vec<CourtAvailability>,
}

#[derive(Deserialize)]
struct StatusBody {
    status: TournamentStatus,
}

#[derive(Deserialize, Default)]
struct GenerateGroupsBody {
    #[serde(default)]
    group_count: Option<usize>,
}

#[derive(Deserialize, Default)]
struct GenerateBracketBody {
    tournament_id: Option<TournamentId>,
    #[serde(default)]
    qualification: Option<Qualification>,
}

#[derive(Deserialize)]
struct BlockedBody {
    blocked: bool,
}

#[derive(Deserialize)]
struct SwapBody {
    first: RegistrationId,
    second: RegistrationId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct ModalityPath {
    id: ModalityId,
}

#[derive(Deserialize)]
struct GroupPath {
    id: GroupId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct CourtPath {
    id: CourtId,
}

#[derive(Deserialize)]
struct SlotPath {
    id: SlotId,
}

#[derive(Deserialize)]
struct RegistrationPath {
    id: RegistrationId,
}

/// Map a core error onto an HTTP status with `{ "error", "kind" }` body.
fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
    match e {
        TournamentError::NotFound { .. } => HttpResponse::NotFound().json(body),
        TournamentError::AlreadyGenerated(_)
        | TournamentError::AlreadyScheduled(_)
        | TournamentError::AdvancementConflict(_)
        | TournamentError::IllegalTransition { .. }
        | TournamentError::InvalidState { .. }
        | TournamentError::TransactionConflict { .. } => HttpResponse::Conflict().json(body),
        TournamentError::Storage(_) => HttpResponse::InternalServerError().json(body),
        TournamentError::InvalidConfiguration(_)
        | TournamentError::InsufficientTeams { .. }
        | TournamentError::OddQualificationCount(_)
        | TournamentError::NoSlotsAvailable(_)
        | TournamentError::InvalidResult(_) => HttpResponse::UnprocessableEntity().json(body),
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health(state: AppState) -> impl Responder {
    let revision = state.database().revision();
    HttpResponse::Ok().json(HealthResponse {
        ok: revision.is_ok(),
        service: "padel-scheduler",
        revision: revision.ok(),
    })
}

#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    respond(state.create_tournament(body.club_id, &body.name, body.start_date, body.end_date))
}

/// Full snapshot of a tournament: modalities, courts, slots, groups, matches.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournament_view(path.id))
}

/// Delete a tournament (Draft only).
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.delete_tournament(path.id))
}

#[post("/api/tournaments/{id}/status")]
async fn api_transition(state: AppState, path: Path<TournamentPath>, body: Json<StatusBody>) -> HttpResponse {
    respond(state.transition(path.id, body.status).and_then(|()| state.tournament_view(path.id)))
}

#[post("/api/tournaments/{id}/modalities")]
async fn api_add_modality(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<CreateModalityBody>,
) -> HttpResponse {
    respond(state.add_modality(path.id, &body.discipline, &body.category, body.max_pairs))
}

#[post("/api/tournaments/{id}/courts")]
async fn api_add_court(state: AppState, path: Path<TournamentPath>, body: Json<CreateCourtBody>) -> HttpResponse {
    let body = body.into_inner();
    respond(state.add_court(path.id, &body.name, body.indoor, body.availability))
}

#[post("/api/modalities/{id}/registrations")]
async fn api_register_team(
    state: AppState,
    path: Path<ModalityPath>,
    body: Json<RegistrationRequest>,
) -> HttpResponse {
    respond(state.register_team(path.id, &body))
}

/// Expand court availability into match slots (additive).
#[post("/api/tournaments/{id}/slots/generate")]
async fn api_generate_slots(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.generate_slots(path.id))
}

#[delete("/api/registrations/{id}")]
async fn api_withdraw_registration(state: AppState, path: Path<RegistrationPath>) -> HttpResponse {
    respond(state.withdraw_registration(path.id))
}

/// Slots for one court added after the others were generated.
#[post("/api/courts/{id}/slots/generate")]
async fn api_generate_court_slots(state: AppState, path: Path<CourtPath>) -> HttpResponse {
    respond(state.generate_court_slots(path.id))
}

#[put("/api/slots/{id}/blocked")]
async fn api_set_slot_blocked(state: AppState, path: Path<SlotPath>, body: Json<BlockedBody>) -> HttpResponse {
    respond(state.set_slot_blocked(path.id, body.blocked))
}

#[post("/api/modalities/{id}/groups")]
async fn api_generate_groups(
    state: AppState,
    path: Path<ModalityPath>,
    body: Option<Json<GenerateGroupsBody>>,
) -> HttpResponse {
    let group_count = body.and_then(|b| b.group_count);
    respond(state.generate_groups(path.id, group_count))
}

#[delete("/api/modalities/{id}/groups")]
async fn api_clear_groups(state: AppState, path: Path<ModalityPath>) -> HttpResponse {
    respond(state.clear_groups(path.id))
}

#[post("/api/modalities/{id}/groups/swap")]
async fn api_swap_placements(state: AppState, path: Path<ModalityPath>, body: Json<SwapBody>) -> HttpResponse {
    let result = state
        .database()
        .read(|store| {
            for reg in [body.first, body.second] {
                if store.registration(reg)?.modality_id != path.id {
                    return Err(TournamentError::not_found("registration", reg));
                }
            }
            Ok(())
        })
        .and_then(|()| state.swap_placements(body.first, body.second));
    respond(result)
}

/// Materialize round-robin matches and assign schedulable matches to slots.
#[post("/api/tournaments/{id}/schedule")]
async fn api_allocate_schedule(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.allocate_schedule(path.id))
}

#[post("/api/modalities/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    path: Path<ModalityPath>,
    body: Option<Json<GenerateBracketBody>>,
) -> HttpResponse {
    let body = body.map(Json::into_inner).unwrap_or_default();
    let tournament_id = match body.tournament_id {
        Some(id) => id,
        None => match state.database().read(|store| Ok(store.modality(path.id)?.tournament_id)) {
            Ok(id) => id,
            Err(e) => return error_response(e),
        },
    };
    respond(state.generate_bracket(tournament_id, path.id, body.qualification))
}

#[get("/api/groups/{id}/standings")]
async fn api_group_standings(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    respond(state.group_standings(path.id))
}

/// Record a result; group matches return fresh standings, knockout matches advance the winner.
#[put("/api/matches/{id}/result")]
async fn api_record_result(state: AppState, path: Path<MatchPath>, body: Json<ResultPayload>) -> HttpResponse {
    respond(state.record_result(path.id, &body))
}

/// Take an unplayed match off its slot.
#[delete("/api/matches/{id}/slot")]
async fn api_unassign_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    respond(state.unassign_match(path.id))
}

/// Re-run one advancement hop (repairs a seat after a manual fix).
#[post("/api/matches/{id}/advance")]
async fn api_advance_winner(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    respond(state.advance_winner(path.id))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env().map_err(|e| {
        log::error!("{e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    log::info!("Starting server at http://{}:{}", config.host, config.port);
    log::info!("Scheduling policy: {:?}", config.scheduling);

    let service = TournamentService::new(Database::new(config.tx_max_retries), config.scheduling.clone());
    let state = Data::new(service);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_transition)
            .service(api_add_modality)
            .service(api_add_court)
            .service(api_register_team)
            .service(api_withdraw_registration)
            .service(api_generate_slots)
            .service(api_generate_court_slots)
            .service(api_set_slot_blocked)
            .service(api_generate_groups)
            .service(api_clear_groups)
            .service(api_swap_placements)
            .service(api_allocate_schedule)
            .service(api_unassign_match)
            .service(api_generate_bracket)
            .service(api_group_standings)
            .service(api_record_result)
            .service(api_advance_winner)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
