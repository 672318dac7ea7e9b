use crate::error::Error;
use std::fmt;
use std::sync::Arc;

/// Environment variable holding the region for [`StoreConfig::from_env`]
pub const REGION_ENV: &str = "AWS_DEFAULT_REGION";

/// Secondary region variable consulted when [`REGION_ENV`] is unset
pub const FALLBACK_REGION_ENV: &str = "AWS_REGION";

/// Optional endpoint override, e.g. for DynamoDB Local
pub const ENDPOINT_ENV: &str = "DYNASTORE_DYNAMODB_ENDPOINT";

/// A static credential tuple
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl StaticCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// Produces a credential tuple on demand.
///
/// Consulted once, when a [`Store`](crate::Store) is connected.
pub trait CredentialSource: Send + Sync + fmt::Debug {
    fn credentials(&self) -> Result<StaticCredentials, Error>;
}

impl CredentialSource for StaticCredentials {
    fn credentials(&self) -> Result<StaticCredentials, Error> {
        Ok(self.clone())
    }
}

/// Parameters needed to connect a [`Store`](crate::Store)
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Table every operation targets
    pub table_name: String,
    /// AWS region; `None` defers to the SDK's region chain
    pub region: Option<String>,
    /// Explicit credentials; `None` defers to the SDK's default chain
    pub credentials: Option<Arc<dyn CredentialSource>>,
    /// Endpoint override
    pub endpoint_url: Option<String>,
}

impl StoreConfig {
    /// Configuration bound to a region and a static key pair
    pub fn new(
        table_name: impl Into<String>,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            region: Some(region.into()),
            credentials: Some(Arc::new(StaticCredentials::new(
                access_key_id,
                secret_access_key,
            ))),
            endpoint_url: None,
        }
    }

    /// Configuration taken from the process environment.
    ///
    /// Credentials are left to the SDK's default chain.
    pub fn from_env(table_name: impl Into<String>) -> Result<Self, Error> {
        Self::from_env_with(table_name, |name| std::env::var(name).ok())
    }

    /// Like [`StoreConfig::from_env`], reading variables through `lookup`
    pub fn from_env_with<F>(table_name: impl Into<String>, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let region = non_empty(REGION_ENV)
            .or_else(|| non_empty(FALLBACK_REGION_ENV))
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "neither {REGION_ENV} nor {FALLBACK_REGION_ENV} is set"
                ))
            })?;

        let config = Self {
            table_name: table_name.into(),
            region: Some(region),
            credentials: None,
            endpoint_url: non_empty(ENDPOINT_ENV),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.table_name.trim().is_empty() {
            return Err(Error::Configuration("table name is empty".to_string()));
        }

        if self.region.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(Error::Configuration("region is empty".to_string()));
        }

        Ok(())
    }
}
