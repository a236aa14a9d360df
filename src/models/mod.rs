// Domain model - films, users and the fixed reference tables they point at

pub mod dto;
pub mod film;
pub mod reference;
pub mod user;

pub use dto::{FilmDto, FilmRequest, IdRef, UserDto, UserRequest};
pub use film::{Film, FilmId, NewFilm};
pub use reference::{Genre, GenreId, Mpa, MpaId, GENRES, MPA_RATINGS};
pub use user::{NewUser, User, UserId};
