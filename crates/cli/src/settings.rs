use crate::{
    commands::{BackfillArgs, TableArgs},
    env::EnvManager,
    error::CliError,
};
use connectors::dynamodb::DynamoDbConfig;
use engine_core::{config::BackfillConfig, retry::RetryPolicy};
use model::{core::key::KeySchema, pagination::cursor::Cursor};
use std::str::FromStr;

pub const TABLE_NAME_VAR: &str = "BACKFILL_TABLE_NAME";
pub const REGION_VAR: &str = "BACKFILL_REGION";
pub const ENDPOINT_VAR: &str = "BACKFILL_ENDPOINT";
pub const TIMEOUT_MS_VAR: &str = "BACKFILL_TIMEOUT_MS";
pub const ATTRIBUTE_VAR: &str = "BACKFILL_ATTRIBUTE";
pub const DEFAULT_VALUE_VAR: &str = "BACKFILL_DEFAULT_VALUE";
pub const PARTITION_KEY_VAR: &str = "BACKFILL_PARTITION_KEY";
pub const SORT_KEY_VAR: &str = "BACKFILL_SORT_KEY";
pub const PAGE_SIZE_VAR: &str = "BACKFILL_PAGE_SIZE";
pub const MAX_ATTEMPTS_VAR: &str = "BACKFILL_MAX_ATTEMPTS";

/// Process environment, overlaid with the env file when one is given.
pub fn load_env(env_file: Option<&str>) -> Result<EnvManager, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = env_file {
        env.load_from_file(path)?;
    }
    Ok(env)
}

fn string_setting(flag: Option<&String>, env: &EnvManager, var: &str) -> Option<String> {
    flag.cloned().or_else(|| env.get(var).map(str::to_string))
}

fn parsed_setting<T: FromStr + Clone>(
    flag: Option<&T>,
    env: &EnvManager,
    var: &'static str,
) -> Result<Option<T>, CliError> {
    if let Some(value) = flag {
        return Ok(Some(value.clone()));
    }

    env.get(var)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| CliError::InvalidSetting {
                name: var,
                value: raw.to_string(),
            })
        })
        .transpose()
}

pub fn store_config(args: &TableArgs, env: &EnvManager) -> Result<DynamoDbConfig, CliError> {
    let table_name = string_setting(args.table.as_ref(), env, TABLE_NAME_VAR)
        .ok_or(CliError::MissingSetting("table name (--table or BACKFILL_TABLE_NAME)"))?;

    // The SDK only sees the process environment, so a region from the env
    // file has to be passed explicitly.
    let region = string_setting(args.region.as_ref(), env, REGION_VAR)
        .or_else(|| env.get("AWS_REGION").map(str::to_string));

    Ok(DynamoDbConfig {
        table_name,
        region,
        endpoint: string_setting(args.endpoint.as_ref(), env, ENDPOINT_VAR),
        timeout_ms: parsed_setting(args.timeout_ms.as_ref(), env, TIMEOUT_MS_VAR)?,
    })
}

pub fn backfill_config(
    args: &BackfillArgs,
    env: &EnvManager,
    store: &DynamoDbConfig,
    dry_run: bool,
) -> Result<BackfillConfig, CliError> {
    let mut config = BackfillConfig::new(store.table_name.clone())
        .with_consistent_read(args.consistent_read)
        .with_dry_run(dry_run);
    config.region = store.region.clone();

    if let Some(attribute) = string_setting(args.attribute.as_ref(), env, ATTRIBUTE_VAR) {
        config = config.with_target_attribute(attribute);
    }

    if let Some(value) = parsed_setting(args.default_value.as_ref(), env, DEFAULT_VALUE_VAR)? {
        config = config.with_default_value(value);
    }

    if let Some(page_size) = parsed_setting(args.page_size.as_ref(), env, PAGE_SIZE_VAR)? {
        config = config.with_page_size(page_size);
    }

    if let Some(attempts) = parsed_setting(args.max_attempts.as_ref(), env, MAX_ATTEMPTS_VAR)? {
        config = config.with_retry(RetryPolicy::for_database().with_max_attempts(attempts));
    }

    let partition_key = string_setting(args.partition_key.as_ref(), env, PARTITION_KEY_VAR);
    let sort_key = string_setting(args.sort_key.as_ref(), env, SORT_KEY_VAR);
    match (partition_key, sort_key) {
        (Some(pk), Some(sk)) => config = config.with_key_schema(KeySchema::new(pk).with_sort_key(sk)),
        (Some(pk), None) => config = config.with_key_schema(KeySchema::new(pk)),
        (None, Some(_)) => {
            return Err(CliError::MissingSetting(
                "partition key (required when a sort key is given)",
            ));
        }
        (None, None) => {}
    }

    if let Some(token) = &args.resume_from {
        let cursor: Cursor = serde_json::from_str(token).map_err(CliError::InvalidResumeToken)?;
        config = config.with_resume_from(cursor);
    }

    Ok(config)
}
