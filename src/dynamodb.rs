use crate::error::Error;
use crate::persistence::{Persistence, ScanRequest};
use crate::record::{Item, Key};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::ReturnValue;
use aws_sdk_dynamodb::Client;

/// DynamoDB-backed persistence implementation
#[derive(Debug, Clone)]
pub struct DynamoDbPersistence {
    client: Client,
    table_name: String,
}

impl DynamoDbPersistence {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl Persistence for DynamoDbPersistence {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn put_item(&self, item: Item) -> Result<Option<Item>, Error> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| Error::DynamoDb(e.to_string()))?;

        Ok(result.attributes.filter(|attributes| !attributes.is_empty()))
    }

    async fn get_item(&self, key: &Key) -> Result<Option<Item>, Error> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key.to_item()))
            .send()
            .await
            .map_err(|e| Error::DynamoDb(e.to_string()))?;

        Ok(result.item.filter(|item| !item.is_empty()))
    }

    async fn scan(&self, request: ScanRequest) -> Result<Vec<Item>, Error> {
        let ScanRequest {
            filter_expression,
            values,
            limit,
        } = request;

        // DynamoDB rejects an empty ExpressionAttributeValues map.
        let values = (!values.is_empty()).then_some(values);

        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .set_filter_expression(filter_expression)
            .set_expression_attribute_values(values)
            .limit(limit)
            .send()
            .await
            .map_err(|e| Error::DynamoDb(e.to_string()))?;

        Ok(result.items.unwrap_or_default())
    }
}
