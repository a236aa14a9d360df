// Application services - orchestrate storage calls behind the HTTP handlers

pub mod film_service;
pub mod friendship_service;
pub mod reference_service;
pub mod user_service;

pub use film_service::{FilmService, DEFAULT_POPULAR_COUNT};
pub use friendship_service::FriendshipService;
pub use reference_service::ReferenceService;
pub use user_service::UserService;
