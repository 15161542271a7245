//! JSONB Codec
//!
//! `jsonb` columns are read and written through `serde_json`, the same
//! serializer used everywhere else in the bot.

use serde_json::Value;
use sqlx::postgres::types::Oid;
use sqlx::postgres::PgConnection;

/// Catalog-qualified name of the column type the codec targets.
pub const JSONB_TYPE: &str = "pg_catalog.jsonb";

/// A structured value stored in a `jsonb` column.
pub type Jsonb = sqlx::types::Json<Value>;

/// Encode a structured value to its textual `jsonb` form.
pub fn encode_jsonb(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Decode the textual `jsonb` form back into a structured value.
pub fn decode_jsonb(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// Register the codec on a freshly opened connection.
///
/// Resolves the `jsonb` type in the catalog so a connection to a server
/// without it fails at checkout instead of at first use.
pub async fn register(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    let oid: Option<Oid> = sqlx::query_scalar("SELECT to_regtype('pg_catalog.jsonb')::oid")
        .fetch_one(&mut *conn)
        .await?;

    match oid {
        Some(oid) => {
            tracing::trace!(oid = oid.0, "Registered jsonb codec");
            Ok(())
        }
        None => Err(sqlx::Error::TypeNotFound {
            type_name: JSONB_TYPE.to_string(),
        }),
    }
}
