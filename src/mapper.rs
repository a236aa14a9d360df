// Conversions between request/response shapes and stored entities

use std::collections::BTreeSet;

use crate::error::{AppError, AppResult};
use crate::models::user::display_name;
use crate::models::{
    Film, FilmDto, FilmRequest, Genre, Mpa, NewFilm, NewUser, User, UserDto, UserRequest,
};

/// Resolve the request's MPA and genre ids against the reference tables.
/// Any unknown id fails the whole request with `NotFound`.
pub fn new_film(request: &FilmRequest) -> AppResult<NewFilm> {
    let mpa_id = request
        .mpa
        .ok_or_else(|| AppError::Validation("mpa: mpa is required".to_string()))?
        .id;
    let mpa = Mpa::by_id(mpa_id)
        .ok_or_else(|| AppError::NotFound(format!("MPA rating {} not found", mpa_id)))?;

    let genre_ids = request
        .genres
        .iter()
        .map(|genre| {
            Genre::by_id(genre.id)
                .map(|g| g.id)
                .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", genre.id)))
        })
        .collect::<AppResult<BTreeSet<_>>>()?;

    Ok(NewFilm {
        name: request.name.clone(),
        description: request.description.clone(),
        duration: request.duration,
        release_date: request.release_date,
        mpa_id: mpa.id,
        genre_ids,
    })
}

pub fn film_dto(film: &Film, likes: Vec<String>) -> AppResult<FilmDto> {
    let mpa = Mpa::by_id(film.mpa_id).ok_or_else(|| {
        AppError::Internal(format!("Film {} has unknown rating {}", film.id, film.mpa_id))
    })?;

    let genres = film
        .genre_ids
        .iter()
        .map(|id| {
            Genre::by_id(*id).ok_or_else(|| {
                AppError::Internal(format!("Film {} has unknown genre {}", film.id, id))
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(FilmDto {
        id: film.id,
        name: film.name.clone(),
        description: film.description.clone(),
        duration: film.duration,
        release_date: film.release_date,
        mpa,
        genres,
        likes,
    })
}

/// A blank or missing name is replaced by the login.
pub fn new_user(request: &UserRequest) -> NewUser {
    NewUser {
        email: request.email.clone(),
        login: request.login.clone(),
        name: display_name(request.name.as_deref(), &request.login),
        birthday: request.birthday,
    }
}

pub fn user_dto(user: &User, email_friends: Vec<String>) -> UserDto {
    UserDto {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        login: user.login.clone(),
        birthday: user.birthday,
        email_friends,
    }
}
