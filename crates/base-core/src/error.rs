/// Failure to materialize `Settings`. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("missing required setting `{field}`")]
    Missing { field: String },
    #[error("invalid setting value: {reason}")]
    Invalid { reason: String },
    #[error("failed to read configuration source {source_name}: {reason}")]
    Source { source_name: String, reason: String },
}

impl ConfigurationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "MISSING",
            Self::Invalid { .. } => "INVALID",
            Self::Source { .. } => "SOURCE",
        }
    }
}

impl From<envy::Error> for ConfigurationError {
    fn from(e: envy::Error) -> Self {
        match e {
            envy::Error::MissingValue(field) => Self::Missing {
                field: field.to_string(),
            },
            envy::Error::Custom(reason) => Self::Invalid { reason },
        }
    }
}
