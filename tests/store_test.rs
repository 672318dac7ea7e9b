use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use dynastore::{
    CredentialSource, Error, Item, Key, Persistence, Record, ScanRequest, StaticCredentials,
    Store, StoreConfig, PK_ATTRIBUTE, SCAN_PAGE_LIMIT, SK_ATTRIBUTE,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

// In-process persistence that keeps items by key and records scan requests.
// Scans return the configured page verbatim; filtering is the server's job.
#[derive(Default)]
struct RecordingPersistence {
    items: Mutex<BTreeMap<Key, Item>>,
    scan_page: Mutex<Vec<Item>>,
    scan_requests: Mutex<Vec<ScanRequest>>,
    fail_with: Option<String>,
}

impl RecordingPersistence {
    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn with_scan_page(items: Vec<Item>) -> Self {
        Self {
            scan_page: Mutex::new(items),
            ..Default::default()
        }
    }

    fn insert_raw(&self, key: Key, item: Item) {
        self.items.lock().unwrap().insert(key, item);
    }

    fn check(&self) -> Result<(), Error> {
        match &self.fail_with {
            Some(message) => Err(Error::DynamoDb(message.clone())),
            None => Ok(()),
        }
    }
}

fn key_of(item: &Item) -> Key {
    let string = |name: &str| match item.get(name) {
        Some(AttributeValue::S(value)) => value.clone(),
        other => panic!("Expected string attribute {name}, got {other:?}"),
    };
    Key::new(string(PK_ATTRIBUTE), string(SK_ATTRIBUTE))
}

#[async_trait]
impl Persistence for RecordingPersistence {
    fn table_name(&self) -> &str {
        "recording"
    }

    async fn put_item(&self, item: Item) -> Result<Option<Item>, Error> {
        self.check()?;
        Ok(self.items.lock().unwrap().insert(key_of(&item), item))
    }

    async fn get_item(&self, key: &Key) -> Result<Option<Item>, Error> {
        self.check()?;
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    async fn scan(&self, request: ScanRequest) -> Result<Vec<Item>, Error> {
        self.check()?;
        self.scan_requests.lock().unwrap().push(request);
        Ok(self.scan_page.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
struct Profile {
    #[partition_key]
    #[serde(rename = "Pk")]
    pk: String,
    #[sort_key]
    #[serde(rename = "Sk")]
    sk: String,
    name: String,
    visits: u32,
}

// Fields named Pk/Sk hold stale values; the accessors compute the real key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Membership {
    #[serde(rename = "Pk")]
    stale_pk: String,
    #[serde(rename = "Sk")]
    stale_sk: String,
    team: String,
    member: String,
}

impl Record for Membership {
    fn pk(&self) -> String {
        format!("TEAM#{}", self.team)
    }

    fn sk(&self) -> String {
        format!("MEMBER#{}", self.member)
    }
}

#[derive(Debug, Deserialize)]
struct Strict {
    #[allow(dead_code)]
    required: u64,
}

#[derive(Debug)]
struct BrokenSource;

impl CredentialSource for BrokenSource {
    fn credentials(&self) -> Result<StaticCredentials, Error> {
        Err(Error::Configuration("vault unavailable".to_string()))
    }
}

fn profile(n: u32) -> Profile {
    Profile {
        pk: format!("USER#{n}"),
        sk: "PROFILE".to_string(),
        name: format!("user-{n}"),
        visits: n,
    }
}

fn recording_store() -> (Arc<RecordingPersistence>, Store) {
    let persistence = Arc::new(RecordingPersistence::default());
    let store = Store::new(persistence.clone());
    (persistence, store)
}

#[tokio::test]
async fn test_save_then_get_by_key_round_trips() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let (_, store) = recording_store();
    let original = profile(1);

    store.save(&original).await.unwrap();
    let found: Option<Profile> = store.get_by_key("USER#1", "PROFILE").await.unwrap();

    assert_eq!(found, Some(original));
}

#[tokio::test]
async fn test_save_returns_previous_attributes() {
    let (_, store) = recording_store();

    let first = store.save(&profile(1)).await.unwrap();
    assert!(first.is_none());

    let mut updated = profile(1);
    updated.visits = 99;
    let previous = store.save(&updated).await.unwrap().unwrap();

    assert_eq!(previous.get("visits"), Some(&AttributeValue::N("1".to_string())));
}

#[tokio::test]
async fn test_save_replaces_whole_item() {
    let (persistence, store) = recording_store();
    let key = Key::of(&profile(1));

    let mut stale = dynastore::codec::to_item(&profile(1)).unwrap();
    stale.insert("legacy".to_string(), AttributeValue::Bool(true));
    persistence.insert_raw(key.clone(), stale);

    store.save(&profile(1)).await.unwrap();

    let item = store.get_item(&key.pk, &key.sk).await.unwrap().unwrap();
    assert!(!item.contains_key("legacy"));
}

#[tokio::test]
async fn test_repeated_save_is_idempotent() {
    let (persistence, store) = recording_store();
    let record = profile(7);

    store.save(&record).await.unwrap();
    let after_first = store.get_item("USER#7", "PROFILE").await.unwrap();

    store.save(&record).await.unwrap();
    store.save(&record).await.unwrap();
    let after_third = store.get_item("USER#7", "PROFILE").await.unwrap();

    assert_eq!(after_first, after_third);
    assert_eq!(persistence.items.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_key_accessors_win_over_colliding_fields() {
    let (_, store) = recording_store();
    let membership = Membership {
        stale_pk: "corrupt".to_string(),
        stale_sk: "corrupt".to_string(),
        team: "core".to_string(),
        member: "ada".to_string(),
    };

    store.save(&membership).await.unwrap();

    let stale: Option<Membership> = store.get_by_key("corrupt", "corrupt").await.unwrap();
    assert!(stale.is_none());

    let found: Membership = store
        .get_by_key("TEAM#core", "MEMBER#ada")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.stale_pk, "TEAM#core");
    assert_eq!(found.stale_sk, "MEMBER#ada");
    assert_eq!(found.member, "ada");
}

#[tokio::test]
async fn test_get_absent_key_is_none_not_error() {
    let (_, store) = recording_store();

    let raw = store.get_item("USER#404", "PROFILE").await.unwrap();
    assert!(raw.is_none());

    let typed: Option<Profile> = store.get_by_key("USER#404", "PROFILE").await.unwrap();
    assert!(typed.is_none());
}

#[tokio::test]
async fn test_get_undecodable_item_is_decoding_error() {
    let (_, store) = recording_store();
    store.save(&profile(3)).await.unwrap();

    let result: Result<Option<Strict>, Error> = store.get_by_key("USER#3", "PROFILE").await;
    assert!(matches!(result, Err(Error::Decoding(_))));
}

#[tokio::test]
async fn test_scan_passes_filter_and_values() {
    let persistence = Arc::new(RecordingPersistence::with_scan_page(vec![
        dynastore::codec::to_item(&profile(1)).unwrap(),
    ]));
    let store = Store::new(persistence.clone());

    let values = HashMap::from([(
        ":min".to_string(),
        dynastore::codec::to_attribute_value(1u32).unwrap(),
    )]);
    let found: Vec<Profile> = store.scan("visits >= :min", values.clone()).await.unwrap();

    assert_eq!(found, vec![profile(1)]);

    let requests = persistence.scan_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].filter_expression.as_deref(), Some("visits >= :min"));
    assert_eq!(requests[0].values, values);
    assert_eq!(requests[0].limit, SCAN_PAGE_LIMIT);
}

#[tokio::test]
async fn test_scan_never_returns_more_than_one_page() {
    let items = (0..150)
        .map(|n| dynastore::codec::to_item(&profile(n)).unwrap())
        .collect();
    let store = Store::new(Arc::new(RecordingPersistence::with_scan_page(items)));

    let found: Vec<Profile> = store.scan("visits >= :zero", HashMap::new()).await.unwrap();

    assert_eq!(found.len(), SCAN_PAGE_LIMIT as usize);
    assert_eq!(found[0], profile(0));
    assert_eq!(found[99], profile(99));
}

#[tokio::test]
async fn test_scan_with_no_matches_is_empty() {
    let (_, store) = recording_store();

    let values = HashMap::from([(":name".to_string(), AttributeValue::S("nobody".to_string()))]);
    let found: Vec<Profile> = store.scan("#n = :name", values).await.unwrap();

    assert!(found.is_empty());
}

#[tokio::test]
async fn test_scan_decoding_failure_is_error() {
    let store = Store::new(Arc::new(RecordingPersistence::with_scan_page(vec![
        dynastore::codec::to_item(&profile(1)).unwrap(),
    ])));

    let result: Result<Vec<Strict>, Error> = store.scan("", HashMap::new()).await;
    assert!(matches!(result, Err(Error::Decoding(_))));
}

#[tokio::test]
async fn test_scan_all_is_unfiltered() {
    let persistence = Arc::new(RecordingPersistence::with_scan_page(vec![
        dynastore::codec::to_item(&profile(1)).unwrap(),
        dynastore::codec::to_item(&profile(2)).unwrap(),
    ]));
    let store = Store::new(persistence.clone());

    let all: Vec<Profile> = store.scan_all().await.unwrap();

    assert_eq!(all, vec![profile(1), profile(2)]);
    assert_eq!(
        persistence.scan_requests.lock().unwrap()[0],
        ScanRequest::unfiltered()
    );
}

#[tokio::test]
async fn test_persistence_failures_are_returned() {
    let store = Store::new(Arc::new(RecordingPersistence::failing("throttled")));

    assert!(matches!(store.save(&profile(1)).await, Err(Error::DynamoDb(_))));
    assert!(matches!(
        store.get_by_key::<Profile>("USER#1", "PROFILE").await,
        Err(Error::DynamoDb(_))
    ));
    assert!(matches!(
        store.scan::<Profile>("", HashMap::new()).await,
        Err(Error::DynamoDb(_))
    ));
}

#[tokio::test]
async fn test_store_is_shareable_across_tasks() {
    let (persistence, store) = recording_store();

    let mut handles = vec![];
    for n in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.save(&profile(n)).await }));
    }

    let results = futures::future::join_all(handles).await;
    for result in results {
        assert!(result.unwrap().is_ok());
    }

    assert_eq!(persistence.items.lock().unwrap().len(), 20);
}

#[tokio::test]
async fn test_connect_rejects_empty_table_name() {
    let result = Store::connect(StoreConfig::new("", "eu-west-1", "id", "secret")).await;
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[tokio::test]
async fn test_connect_surfaces_credential_failure() {
    let config = StoreConfig::new("records", "eu-west-1", "id", "secret")
        .with_credentials(Arc::new(BrokenSource));

    let result = Store::connect(config).await;
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[tokio::test]
async fn test_connect_with_static_credentials() {
    let config = StoreConfig::new("records", "eu-west-1", "AKIDEXAMPLE", "secret")
        .with_endpoint_url("http://localhost:8000");

    let store = Store::connect(config).await.unwrap();
    assert_eq!(store.table_name(), "records");
}
