use thiserror::Error;

pub type ProfileResult<T> = Result<T, ProfileError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("missing fields")]
    MissingFields,

    #[error("display name `{0}` already taken")]
    DisplayNameTaken(String),

    #[error("no user matches identifier `{0}`")]
    UserNotFound(String),

    #[error("user `{0}` has no auth email")]
    NoAuthEmail(String),

    #[error("auth account `{0}` already exists")]
    EmailInUse(String),

    #[error("invalid credentials for `{0}`")]
    InvalidCredentials(String),

    #[error("no profile for uid `{0}`")]
    UnknownUser(String),

    #[error("profile store error: {0}")]
    Store(String),
}

impl ProfileError {
    /// Text shown to the person using the form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields => "missing fields".to_owned(),
            Self::DisplayNameTaken(_) => "Display name already taken.".to_owned(),
            Self::UserNotFound(_) => "User not found".to_owned(),
            Self::NoAuthEmail(_) => "User has no auth email".to_owned(),
            Self::EmailInUse(_) => "An account with this contact already exists.".to_owned(),
            Self::InvalidCredentials(_) => "Wrong password or identifier.".to_owned(),
            Self::UnknownUser(_) => "Profile not found.".to_owned(),
            Self::Store(_) => "Something went wrong, please try again.".to_owned(),
        }
    }
}
