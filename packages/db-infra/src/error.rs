use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbInfraError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The live catalog could not be inspected; startup must not continue.
    #[error("catalog query failed for {object}: {source}")]
    Catalog {
        object: String,
        #[source]
        source: DbErr,
    },

    /// A DDL statement was rejected for a reason outside the benign allowlist.
    #[error("schema statement failed ({what}): {source}")]
    Statement {
        what: String,
        #[source]
        source: DbErr,
    },
}

impl DbInfraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn catalog(object: impl Into<String>, source: DbErr) -> Self {
        Self::Catalog {
            object: object.into(),
            source,
        }
    }

    pub fn statement(what: impl Into<String>, source: DbErr) -> Self {
        Self::Statement {
            what: what.into(),
            source,
        }
    }
}
