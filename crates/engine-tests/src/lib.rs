#![allow(dead_code)]

use aws_sdk_dynamodb::{
    Client,
    config::{Credentials, Region},
};

pub mod dynamodb_local;
pub mod utils;

// DynamoDB Local, e.g. `docker run -p 8000:8000 amazon/dynamodb-local`
const TEST_DYNAMODB_ENDPOINT: &str = "http://localhost:8000";
const TEST_REGION: &str = "us-east-1";

async fn local_client() -> Client {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .endpoint_url(TEST_DYNAMODB_ENDPOINT)
        .credentials_provider(Credentials::new("local", "local", None, None, "engine-tests"))
        .load()
        .await;
    Client::new(&sdk_config)
}
