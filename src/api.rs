// HTTP surface - route table and thin handlers over the services

use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    error::AppResult,
    models::{FilmDto, FilmId, FilmRequest, Genre, GenreId, Mpa, MpaId, UserDto, UserId, UserRequest},
    services::DEFAULT_POPULAR_COUNT,
};

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub count: Option<usize>,
}

// Films

pub async fn list_films_handler(State(state): State<AppState>) -> AppResult<Json<Vec<FilmDto>>> {
    Ok(Json(state.films.list_films().await?))
}

pub async fn create_film_handler(
    State(state): State<AppState>,
    body: Result<Json<FilmRequest>, JsonRejection>,
) -> AppResult<Json<FilmDto>> {
    let Json(req) = body?;
    Ok(Json(state.films.create_film(req).await?))
}

pub async fn update_film_handler(
    State(state): State<AppState>,
    body: Result<Json<FilmRequest>, JsonRejection>,
) -> AppResult<Json<FilmDto>> {
    let Json(req) = body?;
    Ok(Json(state.films.update_film(req).await?))
}

pub async fn get_film_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<FilmId>,
) -> AppResult<Json<FilmDto>> {
    Ok(Json(state.films.get_film(id).await?))
}

pub async fn add_like_handler(
    State(state): State<AppState>,
    AxumPath((id, user_id)): AxumPath<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    state.films.add_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_like_handler(
    State(state): State<AppState>,
    AxumPath((id, user_id)): AxumPath<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    state.films.remove_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn popular_films_handler(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<Vec<FilmDto>>> {
    let count = params.count.unwrap_or(DEFAULT_POPULAR_COUNT);
    Ok(Json(state.films.most_liked(count).await?))
}

// Users

pub async fn list_users_handler(State(state): State<AppState>) -> AppResult<Json<Vec<UserDto>>> {
    Ok(Json(state.users.list_users().await?))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> AppResult<Json<UserDto>> {
    let Json(req) = body?;
    Ok(Json(state.users.create_user(req).await?))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> AppResult<Json<UserDto>> {
    let Json(req) = body?;
    Ok(Json(state.users.update_user(req).await?))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<UserId>,
) -> AppResult<Json<UserDto>> {
    Ok(Json(state.users.get_user(id).await?))
}

pub async fn add_friend_handler(
    State(state): State<AppState>,
    AxumPath((id, friend_id)): AxumPath<(UserId, UserId)>,
) -> AppResult<StatusCode> {
    state.friendships.add_friend(id, friend_id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_friend_handler(
    State(state): State<AppState>,
    AxumPath((id, friend_id)): AxumPath<(UserId, UserId)>,
) -> AppResult<StatusCode> {
    state.friendships.remove_friend(id, friend_id).await?;
    Ok(StatusCode::OK)
}

pub async fn list_friends_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<UserId>,
) -> AppResult<Json<Vec<UserDto>>> {
    Ok(Json(state.users.friends_of(id).await?))
}

pub async fn common_friends_handler(
    State(state): State<AppState>,
    AxumPath((id, other_id)): AxumPath<(UserId, UserId)>,
) -> AppResult<Json<Vec<UserDto>>> {
    Ok(Json(state.users.mutual_friends(id, other_id).await?))
}

// Reference data

pub async fn list_genres_handler(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.reference.list_genres())
}

pub async fn get_genre_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<GenreId>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.reference.get_genre(id)?))
}

pub async fn list_mpa_handler(State(state): State<AppState>) -> Json<Vec<Mpa>> {
    Json(state.reference.list_mpa())
}

pub async fn get_mpa_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<MpaId>,
) -> AppResult<Json<Mpa>> {
    Ok(Json(state.reference.get_mpa(id)?))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Films
        .route(
            "/films",
            get(list_films_handler)
                .post(create_film_handler)
                .put(update_film_handler),
        )
        .route("/films/popular", get(popular_films_handler))
        .route("/films/{id}", get(get_film_handler))
        .route(
            "/films/{id}/like/{user_id}",
            put(add_like_handler).delete(remove_like_handler),
        )
        // Users
        .route(
            "/users",
            get(list_users_handler)
                .post(create_user_handler)
                .put(update_user_handler),
        )
        .route("/users/{id}", get(get_user_handler))
        .route("/users/{id}/friends", get(list_friends_handler))
        .route(
            "/users/{id}/friends/{friend_id}",
            put(add_friend_handler).delete(remove_friend_handler),
        )
        .route(
            "/users/{id}/friends/common/{other_id}",
            get(common_friends_handler),
        )
        // Reference data
        .route("/genres", get(list_genres_handler))
        .route("/genres/{id}", get(get_genre_handler))
        .route("/mpa", get(list_mpa_handler))
        .route("/mpa/{id}", get(get_mpa_handler))
        .with_state(state)
}
