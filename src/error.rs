use log::{error, warn};
use mongodb::bson::{de::Error as BsonDeError, ser::Error as BsonSerError};
use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

use crate::model::common::hint::HintKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    BsonSer(#[from] BsonSerError),
    #[error(transparent)]
    BsonDe(#[from] BsonDeError),
    #[error("Invalid answer key: '{0}'")]
    InvalidKey(String),
    #[error("Hint already used: {0}")]
    HintAlreadyUsed(HintKind),
    #[error("Broken game question: {0}")]
    Integrity(String),
    #[error("{0} was changed by another request")]
    Conflict(String),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: String) -> Self {
        Self::Status(Status::NotFound, format!("{what} not found"))
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidKey(_) => Status::BadRequest,
            Self::HintAlreadyUsed(_) => Status::UnprocessableEntity,
            Self::Conflict(_) => Status::Conflict,
            Self::Db(_) | Self::BsonSer(_) | Self::BsonDe(_) | Self::Integrity(_) => {
                Status::InternalServerError
            }
            Self::Status(status, _) => *status,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("{self}");
        } else {
            warn!("{self}");
        }
        Err(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(Error::InvalidKey("z".into()).status(), Status::BadRequest);
        assert_eq!(
            Error::HintAlreadyUsed(HintKind::FriendCall).status(),
            Status::UnprocessableEntity
        );
        assert_eq!(
            Error::Integrity("no correct key".into()).status(),
            Status::InternalServerError
        );
        assert_eq!(
            Error::Conflict("Game question with ID 'x'".into()).status(),
            Status::Conflict
        );

        let missing = Error::not_found("Game question with ID 'x'".to_string());
        assert_eq!(missing.status(), Status::NotFound);
        assert_eq!(missing.to_string(), "Game question with ID 'x' not found");
    }
}
