use chrono::NaiveDate;
use std::collections::BTreeSet;

pub type UserId = i64;

/// A stored user. `friends` holds the targets of this user's outgoing
/// friendship edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
    pub friends: BTreeSet<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
}

impl NewUser {
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            email: self.email,
            login: self.login,
            name: self.name,
            birthday: self.birthday,
            friends: BTreeSet::new(),
        }
    }
}

/// Blank or missing names fall back to the login.
pub fn display_name(name: Option<&str>, login: &str) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => login.to_string(),
    }
}
