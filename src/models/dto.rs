// Wire shapes - request bodies (validated) and response DTOs

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::models::film::FilmId;
use crate::models::reference::{Genre, Mpa};
use crate::models::user::UserId;

/// Earliest accepted release date: the first public film screening.
const FIRST_SCREENING: (i32, u32, u32) = (1895, 12, 28);

static LOGIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+$").expect("login pattern compiles"));

/// `{"id": N}` reference used for MPA and genre fields in film requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

/// Body of `POST /films` and `PUT /films`. `id` is ignored on create and
/// required on update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FilmRequest {
    #[serde(default)]
    pub id: Option<FilmId>,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "description must be at most 200 characters"))]
    pub description: String,
    #[validate(range(min = 1, message = "duration must be positive"))]
    pub duration: i32,
    #[validate(custom(function = "not_before_first_screening"))]
    pub release_date: NaiveDate,
    #[validate(required(message = "mpa is required"))]
    pub mpa: Option<IdRef>,
    #[serde(default)]
    pub genres: Vec<IdRef>,
}

/// Body of `POST /users` and `PUT /users`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(default)]
    pub id: Option<UserId>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(custom(function = "login_without_whitespace"))]
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[validate(custom(function = "not_in_future"))]
    pub birthday: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmDto {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub duration: i32,
    pub release_date: NaiveDate,
    pub mpa: Mpa,
    pub genres: Vec<Genre>,
    /// Names of the users who liked the film.
    pub likes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub login: String,
    pub birthday: NaiveDate,
    pub email_friends: Vec<String>,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "name must not be blank"));
    }
    Ok(())
}

fn not_before_first_screening(date: &NaiveDate) -> Result<(), ValidationError> {
    if (date.year(), date.month(), date.day()) < FIRST_SCREENING {
        return Err(invalid(
            "release_date_too_early",
            "releaseDate must not be before 1895-12-28",
        ));
    }
    Ok(())
}

fn login_without_whitespace(login: &str) -> Result<(), ValidationError> {
    if !LOGIN_PATTERN.is_match(login) {
        return Err(invalid(
            "login_format",
            "login must be non-empty and contain no whitespace",
        ));
    }
    Ok(())
}

fn not_in_future(birthday: &NaiveDate) -> Result<(), ValidationError> {
    if *birthday > Utc::now().date_naive() {
        return Err(invalid("birthday_in_future", "birthday must not be in the future"));
    }
    Ok(())
}
