// lakeseed-core/src/domain/sql.rs

// Statement rendering per engine. Pure string building, no I/O.

use serde::{Deserialize, Serialize};

use crate::domain::namespace::{RawNamespace, quote_ident, quote_literal};
use crate::domain::table::{ColumnType, TableBatch, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Trino,
    DuckDB,
}

impl Dialect {
    /// DuckDB is single-catalog: the catalog component is dropped.
    pub fn qualify_schema(&self, ns: &RawNamespace) -> String {
        match (self, &ns.catalog) {
            (Dialect::Trino, Some(catalog)) => {
                format!("{}.{}", quote_ident(catalog), quote_ident(&ns.schema))
            }
            _ => quote_ident(&ns.schema),
        }
    }

    pub fn qualify_table(&self, ns: &RawNamespace, table: &str) -> String {
        format!("{}.{}", self.qualify_schema(ns), quote_ident(table))
    }

    pub fn qualify_object(&self, catalog: &str, schema: &str, name: &str) -> String {
        match self {
            Dialect::Trino => format!(
                "{}.{}.{}",
                quote_ident(catalog),
                quote_ident(schema),
                quote_ident(name)
            ),
            Dialect::DuckDB => format!("{}.{}", quote_ident(schema), quote_ident(name)),
        }
    }

    pub fn drop_schema(&self, ns: &RawNamespace) -> String {
        format!("DROP SCHEMA IF EXISTS {} CASCADE", self.qualify_schema(ns))
    }

    pub fn create_schema(&self, ns: &RawNamespace) -> String {
        match self {
            Dialect::Trino => format!(
                "CREATE SCHEMA {} WITH (location = {})",
                self.qualify_schema(ns),
                quote_literal(&ns.location)
            ),
            Dialect::DuckDB => format!("CREATE SCHEMA {}", self.qualify_schema(ns)),
        }
    }

    pub fn column_type(&self, data_type: ColumnType) -> &'static str {
        match (self, data_type) {
            (_, ColumnType::BigInt) => "BIGINT",
            (_, ColumnType::Double) => "DOUBLE",
            (_, ColumnType::Boolean) => "BOOLEAN",
            (_, ColumnType::Varchar) => "VARCHAR",
            (Dialect::Trino, ColumnType::Timestamp) => "TIMESTAMP(3) WITH TIME ZONE",
            (Dialect::DuckDB, ColumnType::Timestamp) => "TIMESTAMPTZ",
        }
    }

    pub fn drop_table(&self, ns: &RawNamespace, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.qualify_table(ns, table))
    }

    pub fn create_table(&self, ns: &RawNamespace, batch: &TableBatch) -> String {
        let columns: Vec<String> = batch
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), self.column_type(c.data_type)))
            .collect();
        format!(
            "CREATE TABLE {} ({})",
            self.qualify_table(ns, &batch.name),
            columns.join(", ")
        )
    }

    /// Multi-row INSERTs of at most `chunk_size` rows each, preserving row order.
    pub fn insert_statements(
        &self,
        ns: &RawNamespace,
        batch: &TableBatch,
        chunk_size: usize,
    ) -> Vec<String> {
        let target = self.qualify_table(ns, &batch.name);
        let column_list: Vec<String> = batch.columns.iter().map(|c| quote_ident(&c.name)).collect();
        let column_list = column_list.join(", ");

        batch
            .rows
            .chunks(chunk_size.max(1))
            .map(|chunk| {
                let tuples: Vec<String> = chunk
                    .iter()
                    .map(|row| {
                        let values: Vec<String> = row.iter().map(|v| self.literal(v)).collect();
                        format!("({})", values.join(", "))
                    })
                    .collect();
                format!(
                    "INSERT INTO {} ({}) VALUES {}",
                    target,
                    column_list,
                    tuples.join(", ")
                )
            })
            .collect()
    }

    pub fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            // NaN and infinities have no portable literal
            Value::Float(f) if !f.is_finite() => "NULL".to_string(),
            Value::Float(f) => format!("{:?}", f),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Text(s) => quote_literal(s),
            Value::Timestamp(ts) => {
                let rendered = ts.format("%Y-%m-%d %H:%M:%S%.3f");
                match self {
                    Dialect::Trino => format!("TIMESTAMP '{} UTC'", rendered),
                    Dialect::DuckDB => format!("TIMESTAMPTZ '{}+00'", rendered),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::table::Column;
    use chrono::{TimeZone, Utc};

    fn ns() -> RawNamespace {
        RawNamespace::new(Some("lake"), "demo_raw", "s3://b/demo_raw/")
    }

    #[test]
    fn test_schema_statements_per_dialect() {
        assert_eq!(
            Dialect::Trino.drop_schema(&ns()),
            "DROP SCHEMA IF EXISTS \"lake\".\"demo_raw\" CASCADE"
        );
        assert_eq!(
            Dialect::Trino.create_schema(&ns()),
            "CREATE SCHEMA \"lake\".\"demo_raw\" WITH (location = 's3://b/demo_raw/')"
        );
        assert_eq!(
            Dialect::DuckDB.create_schema(&ns()),
            "CREATE SCHEMA \"demo_raw\""
        );
    }

    #[test]
    fn test_insert_chunks_preserve_row_order() {
        let batch = TableBatch::new(
            "orders",
            vec![
                Column::new("id", ColumnType::BigInt),
                Column::new("note", ColumnType::Varchar),
            ],
        )
        .with_rows(vec![
            vec![1i64.into(), "a".into()],
            vec![2i64.into(), Value::Null],
            vec![3i64.into(), "it's".into()],
        ]);

        let stmts = Dialect::Trino.insert_statements(&ns(), &batch, 2);
        assert_eq!(stmts.len(), 2);
        assert_eq!(
            stmts[0],
            "INSERT INTO \"lake\".\"demo_raw\".\"orders\" (\"id\", \"note\") VALUES (1, 'a'), (2, NULL)"
        );
        assert_eq!(
            stmts[1],
            "INSERT INTO \"lake\".\"demo_raw\".\"orders\" (\"id\", \"note\") VALUES (3, 'it''s')"
        );
    }

    #[test]
    fn test_create_table_maps_types() {
        let batch = TableBatch::new(
            "events",
            vec![
                Column::new("at", ColumnType::Timestamp),
                Column::new("ok", ColumnType::Boolean),
            ],
        );
        assert_eq!(
            Dialect::DuckDB.create_table(&ns(), &batch),
            "CREATE TABLE \"demo_raw\".\"events\" (\"at\" TIMESTAMPTZ, \"ok\" BOOLEAN)"
        );
        assert_eq!(
            Dialect::Trino.create_table(&ns(), &batch),
            "CREATE TABLE \"lake\".\"demo_raw\".\"events\" (\"at\" TIMESTAMP(3) WITH TIME ZONE, \"ok\" BOOLEAN)"
        );
    }

    #[test]
    fn test_literals() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(
            Dialect::Trino.literal(&Value::Timestamp(ts)),
            "TIMESTAMP '2024-05-01 12:30:00.000 UTC'"
        );
        assert_eq!(Dialect::Trino.literal(&Value::Float(f64::NAN)), "NULL");
        assert_eq!(Dialect::Trino.literal(&Value::Float(2.5)), "2.5");
        assert_eq!(Dialect::DuckDB.literal(&Value::Bool(false)), "FALSE");
    }
}
