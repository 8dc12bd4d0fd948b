//! Runs the backfill against DynamoDB Local. Ignored by default.
