// file: src/index/schema.rs
// description: expected Arrow schema for the dataset index tables
// reference: https://docs.rs/lancedb

use crate::error::Result;
use crate::index::client::IndexClient;
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;
use tracing::{info, warn};

/// Read-side schema checks. The index tables are written by an external
/// builder; this crate never creates or drops them.
pub struct SchemaManager<'a> {
    client: &'a IndexClient,
}

impl<'a> SchemaManager<'a> {
    pub fn new(client: &'a IndexClient) -> Self {
        Self { client }
    }

    /// Checks that the table exists and its Arrow schema carries every
    /// column the search path reads, with the expected types.
    pub async fn verify(&self, table_name: &str, embedding_dim: usize) -> Result<bool> {
        if !self.client.table_exists(table_name).await? {
            warn!("Index table '{}' does not exist", table_name);
            return Ok(false);
        }

        let actual = self.client.table_schema(table_name).await?;
        let expected = Self::dataset_schema(embedding_dim);

        if !schema_matches(&expected, &actual) {
            warn!("Index table '{}' has an unexpected schema", table_name);
            return Ok(false);
        }

        info!("Index table '{}' exists with the expected schema", table_name);
        Ok(true)
    }

    /// The Arrow schema the index builder writes for each dataset table.
    pub fn dataset_schema(embedding_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("accession", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("summary", DataType::Utf8, false),
            Field::new("organism", DataType::Utf8, false),
            Field::new("platform", DataType::Utf8, false),
            Field::new("num_samples", DataType::UInt64, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    embedding_dim as i32,
                ),
                false,
            ),
        ]))
    }
}

/// Every expected column must be present with the expected type. Extra
/// columns in the table are allowed so an enriched index stays usable.
pub(crate) fn schema_matches(expected: &Schema, actual: &Schema) -> bool {
    for field in expected.fields() {
        match actual.field_with_name(field.name()) {
            Ok(actual_field) if actual_field.data_type() == field.data_type() => {}
            Ok(actual_field) => {
                warn!(
                    "Column '{}' has type {:?}, expected {:?}",
                    field.name(),
                    actual_field.data_type(),
                    field.data_type()
                );
                return false;
            }
            Err(_) => {
                warn!("Missing column '{}'", field.name());
                return false;
            }
        }
    }

    true
}
