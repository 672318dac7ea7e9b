use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use std::fmt;

/// Attribute name holding the partition key of every persisted item
pub const PK_ATTRIBUTE: &str = "Pk";

/// Attribute name holding the sort key of every persisted item
pub const SK_ATTRIBUTE: &str = "Sk";

/// Maximum number of items a single scan returns
pub const SCAN_PAGE_LIMIT: i32 = 100;

/// The store's native representation of one item
pub type Item = HashMap<String, AttributeValue>;

/// An entity that can be persisted in a [`Store`](crate::Store).
///
/// The only structural requirement is a string-valued partition key and
/// sort key. Both are written to the reserved `Pk`/`Sk` attributes on save,
/// taking precedence over any same-named field the record serializes.
pub trait Record {
    fn pk(&self) -> String;

    fn sk(&self) -> String;
}

impl<R: Record + ?Sized> Record for &R {
    fn pk(&self) -> String {
        (**self).pk()
    }

    fn sk(&self) -> String {
        (**self).sk()
    }
}

/// Composite key identifying a single item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    pub pk: String,
    pub sk: String,
}

impl Key {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    pub fn of<R: Record + ?Sized>(record: &R) -> Self {
        Self {
            pk: record.pk(),
            sk: record.sk(),
        }
    }

    /// The key as the attribute map expected by `GetItem`
    pub fn to_item(&self) -> Item {
        HashMap::from([
            (PK_ATTRIBUTE.to_string(), AttributeValue::S(self.pk.clone())),
            (SK_ATTRIBUTE.to_string(), AttributeValue::S(self.sk.clone())),
        ])
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}
