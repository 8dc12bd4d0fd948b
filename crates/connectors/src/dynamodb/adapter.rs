use crate::{
    dynamodb::{
        convert::{attribute_from_value, item_from_key, key_from_item, record_from_item},
        error::store_error,
    },
    error::StoreError,
    requests::ScanRequest,
    store::{RecordStore, TableInfo, UpdateOutcome},
};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    error::SdkError,
    operation::update_item::UpdateItemError,
    types::{AttributeValue, KeyType},
};
use aws_smithy_types::timeout::TimeoutConfig;
use model::{
    core::{
        key::{KeySchema, PrimaryKey},
        value::Value,
    },
    pagination::page::Page,
};
use std::time::Duration;
use tracing::{debug, info};

const UPDATE_EXPRESSION: &str = "SET #attr = :value";
const UNSET_CONDITION: &str =
    "attribute_exists(#pk) AND (attribute_not_exists(#attr) OR attribute_type(#attr, :null))";

/// Connection settings for a DynamoDB table.
#[derive(Debug, Clone, Default)]
pub struct DynamoDbConfig {
    pub table_name: String,
    /// AWS region (uses the SDK default chain if not specified)
    pub region: Option<String>,
    /// Endpoint override, e.g. DynamoDB Local
    pub endpoint: Option<String>,
    /// Per-operation timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

#[derive(Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DynamoDbStore {
    /// Loads the shared AWS configuration (credentials, region chain, retry
    /// settings) and applies the overrides from `config`.
    pub async fn connect(config: DynamoDbConfig) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);

        if let Some(region) = config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region));
        }

        if let Some(endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if let Some(timeout_ms) = config.timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        let client = Client::from_conf(builder.build());
        info!(table = %config.table_name, "DynamoDB client configured");

        Self {
            client,
            table_name: config.table_name,
        }
    }

    /// Create from a pre-built client
    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn is_conditional_check_failed(err: &SdkError<UpdateItemError>) -> bool {
        match err {
            SdkError::ServiceError(service_err) => matches!(
                service_err.err(),
                UpdateItemError::ConditionalCheckFailedException(_)
            ),
            _ => false,
        }
    }
}

#[async_trait]
impl RecordStore for DynamoDbStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn describe(&self) -> Result<TableInfo, StoreError> {
        let output = self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| store_error("DescribeTable", &self.table_name, e))?;

        let table = output.table().ok_or_else(|| {
            StoreError::InvalidResponse("DescribeTable returned no table description".into())
        })?;

        let mut partition_key = None;
        let mut sort_key = None;
        for element in table.key_schema() {
            match element.key_type() {
                KeyType::Hash => partition_key = Some(element.attribute_name().to_string()),
                KeyType::Range => sort_key = Some(element.attribute_name().to_string()),
                _ => {}
            }
        }

        let partition_key = partition_key.ok_or_else(|| {
            StoreError::InvalidResponse(format!("table '{}' has no HASH key", self.table_name))
        })?;

        Ok(TableInfo {
            name: self.table_name.clone(),
            key_schema: KeySchema {
                partition_key,
                sort_key,
            },
            status: table.table_status().map(|s| s.as_str().to_string()),
            item_count: table.item_count(),
        })
    }

    async fn scan_page(&self, request: &ScanRequest) -> Result<Page, StoreError> {
        let mut scan = self
            .client
            .scan()
            .table_name(&self.table_name)
            .consistent_read(request.consistent_read);

        if let Some(key) = request.cursor.start_key() {
            scan = scan.set_exclusive_start_key(Some(item_from_key(key)));
        }

        if let Some(limit) = request.limit {
            scan = scan.limit(i32::try_from(limit).unwrap_or(i32::MAX));
        }

        // Placeholders keep reserved words (e.g. `name`, `status`) usable.
        if !request.projection.is_empty() {
            let mut placeholders = Vec::with_capacity(request.projection.len());
            for (i, attribute) in request.projection.iter().enumerate() {
                let placeholder = format!("#p{i}");
                scan = scan.expression_attribute_names(placeholder.clone(), attribute.clone());
                placeholders.push(placeholder);
            }
            scan = scan.projection_expression(placeholders.join(", "));
        }

        let output = scan
            .send()
            .await
            .map_err(|e| store_error("Scan", &self.table_name, e))?;

        let records = output
            .items()
            .iter()
            .map(record_from_item)
            .collect::<Result<Vec<_>, _>>()?;

        let last_key = match output.last_evaluated_key() {
            Some(key) if !key.is_empty() => Some(key_from_item(key)?),
            _ => None,
        };

        debug!(
            table = %self.table_name,
            returned = records.len(),
            scanned = output.scanned_count(),
            more = last_key.is_some(),
            "Scan page fetched"
        );

        Ok(Page::new(records, last_key))
    }

    async fn set_if_unset(
        &self,
        key: &PrimaryKey,
        attribute: &str,
        value: &Value,
    ) -> Result<UpdateOutcome, StoreError> {
        let partition_attr = key.attributes().keys().next().ok_or_else(|| {
            StoreError::InvalidResponse(format!("empty key for update of '{attribute}'"))
        })?;

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(item_from_key(key)))
            .update_expression(UPDATE_EXPRESSION)
            .condition_expression(UNSET_CONDITION)
            .expression_attribute_names("#pk", partition_attr.clone())
            .expression_attribute_names("#attr", attribute)
            .expression_attribute_values(":value", attribute_from_value(value))
            .expression_attribute_values(":null", AttributeValue::S("NULL".to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(UpdateOutcome::Updated),
            Err(e) if Self::is_conditional_check_failed(&e) => {
                debug!(table = %self.table_name, key = %key, "Update condition failed");
                Ok(UpdateOutcome::ConditionFailed)
            }
            Err(e) => Err(store_error("UpdateItem", &self.table_name, e)),
        }
    }
}
