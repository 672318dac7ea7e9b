//! Dynastore - A typed record store over DynamoDB
//!
//! Dynastore stores application records in a single DynamoDB table keyed by a
//! string partition key (`Pk`) and sort key (`Sk`). Records are encoded into
//! DynamoDB attribute maps through their `serde` representation; the key pair
//! is always written from the record's [`Record`] accessors, so it can never be
//! corrupted by a field that happens to share its name.
//!
//! Every operation is a single request to DynamoDB. Consistency, retries,
//! credential resolution and transport are left to the AWS SDK.
//!
//! # Example
//!
//! ```no_run
//! use dynastore::{Record, Store, StoreConfig};
//! use serde::{Deserialize, Serialize};
//! use std::collections::HashMap;
//!
//! #[derive(Debug, Serialize, Deserialize, Record)]
//! struct Profile {
//!     #[partition_key]
//!     user_id: String,
//!     #[sort_key]
//!     kind: String,
//!     display_name: String,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::connect(StoreConfig::new(
//!     "records",
//!     "eu-west-1",
//!     "AKIDEXAMPLE",
//!     "secret",
//! ))
//! .await?;
//!
//! let profile = Profile {
//!     user_id: "USER#1".to_string(),
//!     kind: "PROFILE".to_string(),
//!     display_name: "Ada".to_string(),
//! };
//! store.save(&profile).await?;
//!
//! let found: Option<Profile> = store.get_by_key("USER#1", "PROFILE").await?;
//!
//! let values = HashMap::from([(
//!     ":display_name".to_string(),
//!     dynastore::codec::to_attribute_value("Ada")?,
//! )]);
//! let named: Vec<Profile> = store.scan("display_name = :display_name", values).await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod dynamodb;
pub mod error;
pub mod persistence;
pub mod record;
pub mod store;

// Re-export commonly used types
pub use config::{CredentialSource, StaticCredentials, StoreConfig};
pub use dynamodb::DynamoDbPersistence;
pub use dynastore_macros::Record;
pub use error::Error;
pub use persistence::{Persistence, ScanRequest};
pub use record::{Item, Key, Record, PK_ATTRIBUTE, SCAN_PAGE_LIMIT, SK_ATTRIBUTE};
pub use store::Store;
