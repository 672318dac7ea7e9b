//! Conversion between typed records and DynamoDB attribute maps.
//!
//! Field-to-attribute naming follows the record's `serde` representation,
//! so `#[serde(rename = "...")]` and friends control the wire names.

use crate::error::Error;
use crate::record::{Item, Record, PK_ATTRIBUTE, SK_ATTRIBUTE};
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{de::DeserializeOwned, Serialize};

/// Encode a record into a full item.
///
/// The `Pk` and `Sk` attributes are always written from the record's key
/// accessors after the generic encoding, replacing whatever the record's own
/// fields produced under those names.
pub fn to_item<R>(record: &R) -> Result<Item, Error>
where
    R: Record + Serialize + ?Sized,
{
    let mut item: Item = serde_dynamo::aws_sdk_dynamodb_1::to_item(record)
        .map_err(|e| Error::Encoding(e.to_string()))?;

    item.insert(PK_ATTRIBUTE.to_string(), AttributeValue::S(record.pk()));
    item.insert(SK_ATTRIBUTE.to_string(), AttributeValue::S(record.sk()));

    Ok(item)
}

/// Decode a single item into the caller's type
pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T, Error> {
    serde_dynamo::aws_sdk_dynamodb_1::from_item(item).map_err(|e| Error::Decoding(e.to_string()))
}

/// Decode a page of items, failing on the first item that does not fit `T`
pub fn from_items<T: DeserializeOwned>(items: Vec<Item>) -> Result<Vec<T>, Error> {
    serde_dynamo::aws_sdk_dynamodb_1::from_items(items)
        .map_err(|e| Error::Decoding(e.to_string()))
}

/// Encode a single value, typically a scan filter placeholder
pub fn to_attribute_value<V: Serialize>(value: V) -> Result<AttributeValue, Error> {
    serde_dynamo::aws_sdk_dynamodb_1::to_attribute_value(value)
        .map_err(|e| Error::Encoding(e.to_string()))
}
