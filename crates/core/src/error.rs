//! Domain failures shared by the server, the client and the seed tool.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A numeric lookup (user, skill) matched no row.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: DbId },

    /// Input rejected before touching storage; the message is shown to
    /// the operator as is.
    #[error("{0}")]
    Validation(String),

    #[error("conflicting update: {0}")]
    Conflict(String),

    #[error("not signed in: {0}")]
    Unauthorized(String),

    #[error("not permitted: {0}")]
    Forbidden(String),

    #[error("unexpected failure: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_shown_unprefixed() {
        let err = CoreError::validation("name must not be empty");
        assert_eq!(err.to_string(), "name must not be empty");
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = CoreError::NotFound { entity: "Skill", id: 7 };
        assert_eq!(err.to_string(), "Skill 7 does not exist");
    }
}
