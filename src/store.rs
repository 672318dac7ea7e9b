use crate::codec;
use crate::config::StoreConfig;
use crate::dynamodb::DynamoDbPersistence;
use crate::error::Error;
use crate::persistence::{Persistence, ScanRequest};
use crate::record::{Item, Key, Record, SCAN_PAGE_LIMIT};
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{debug, info, instrument};

// No-op macros when tracing is disabled
#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {{}};
}
#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($tt:tt)*) => {{}};
}

/// Name reported by credentials handed to the SDK
const CREDENTIALS_PROVIDER_NAME: &str = "dynastore";

/// Typed access to a single table.
///
/// Every operation is one request to the underlying [`Persistence`]. The store
/// keeps no records in memory and can be cloned and shared across tasks.
#[derive(Clone)]
pub struct Store {
    persistence: Arc<dyn Persistence>,
}

impl Store {
    /// Create a store over an existing persistence
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self { persistence }
    }

    /// Create a store over an already configured DynamoDB client
    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self::new(Arc::new(DynamoDbPersistence::new(client, table_name.into())))
    }

    /// Build an authenticated DynamoDB client from `config` and bind it to the table.
    ///
    /// Fails with [`Error::Configuration`] when the configuration is invalid,
    /// the credential source cannot produce credentials, or no region can be
    /// resolved.
    #[cfg_attr(feature = "tracing", instrument(skip(config), fields(table = %config.table_name)))]
    pub async fn connect(config: StoreConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut loader = aws_config::from_env();

        if let Some(region) = config.region.clone() {
            loader = loader.region(Region::new(region));
        }

        if let Some(source) = &config.credentials {
            let credentials = source.credentials().map_err(|e| {
                Error::Configuration(format!("credential source failed: {e}"))
            })?;
            loader = loader.credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
                credentials.access_key_id,
                credentials.secret_access_key,
                credentials.session_token,
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }

        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = loader.load().await;

        if sdk_config.region().is_none() {
            return Err(Error::Configuration("no AWS region could be resolved".to_string()));
        }

        info!("Connected store");
        Ok(Self::from_client(Client::new(&sdk_config), config.table_name))
    }

    pub fn table_name(&self) -> &str {
        self.persistence.table_name()
    }

    /// Upsert `record` as a full item.
    ///
    /// The item is the record's full encoding with `Pk`/`Sk` taken from
    /// [`Record::pk`] and [`Record::sk`]; any existing item with that key is
    /// replaced. Returns the replaced item's attributes, if there was one.
    #[cfg_attr(feature = "tracing", instrument(skip(self, record), fields(table = %self.table_name())))]
    pub async fn save<R>(&self, record: &R) -> Result<Option<Item>, Error>
    where
        R: Record + Serialize + ?Sized,
    {
        let item = codec::to_item(record)?;
        debug!(pk = %record.pk(), sk = %record.sk(), "Saving item");

        let previous = self.persistence.put_item(item).await?;

        if previous.is_some() {
            debug!("Replaced existing item");
        }

        Ok(previous)
    }

    /// Fetch the raw item stored under (`pk`, `sk`).
    ///
    /// An absent item is `Ok(None)`, never an error.
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(table = %self.table_name())))]
    pub async fn get_item(&self, pk: &str, sk: &str) -> Result<Option<Item>, Error> {
        let item = self.persistence.get_item(&Key::new(pk, sk)).await?;

        if item.is_none() {
            debug!("Item not found");
        }

        Ok(item)
    }

    /// Fetch and decode the item stored under (`pk`, `sk`).
    ///
    /// `Ok(None)` means no such item; an item that does not decode into `T`
    /// is [`Error::Decoding`].
    pub async fn get_by_key<T>(&self, pk: &str, sk: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
    {
        self.get_item(pk, sk)
            .await?
            .map(codec::from_item)
            .transpose()
    }

    /// Scan one page of raw items matching `filter_expression`.
    ///
    /// `values` binds the expression's `:placeholder`s. At most
    /// [`SCAN_PAGE_LIMIT`] items are returned and no continuation is made, so
    /// matching items beyond the first page are not visited. An empty
    /// `filter_expression` scans without a filter.
    #[cfg_attr(feature = "tracing", instrument(skip(self, values), fields(table = %self.table_name())))]
    pub async fn scan_items(
        &self,
        filter_expression: &str,
        values: HashMap<String, AttributeValue>,
    ) -> Result<Vec<Item>, Error> {
        self.scan_page(ScanRequest::new(filter_expression, values)).await
    }

    /// Scan one page of items matching `filter_expression`, decoded into `T`
    pub async fn scan<T>(
        &self,
        filter_expression: &str,
        values: HashMap<String, AttributeValue>,
    ) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
    {
        codec::from_items(self.scan_items(filter_expression, values).await?)
    }

    /// List one unfiltered page of the table, decoded into `T`
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(table = %self.table_name())))]
    pub async fn scan_all<T>(&self) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
    {
        codec::from_items(self.scan_page(ScanRequest::unfiltered()).await?)
    }

    async fn scan_page(&self, request: ScanRequest) -> Result<Vec<Item>, Error> {
        let mut items = self.persistence.scan(request).await?;

        let limit = SCAN_PAGE_LIMIT as usize;
        if items.len() > limit {
            debug!(returned = items.len(), "Truncating scan page");
            items.truncate(limit);
        }

        debug!(count = items.len(), "Scanned items");
        Ok(items)
    }
}
