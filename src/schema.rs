//! Schema introspection: connect to the target database and render every
//! table as a DDL-like fragment the generation prompt can embed verbatim.
//!
//! The inspector is a trait so the generator stays testable without a live
//! database. The shipped implementation reads `information_schema` through
//! sqlx and supports MySQL and PostgreSQL; Oracle and SQL Server have no
//! sqlx driver and are rejected up front.

use std::collections::BTreeMap;

use async_trait::async_trait;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, Connection, Row};
use tracing::{debug, info};

use crate::dialect::Dialect;
use crate::error::{Result, Text2SqlError};

/// Table name -> DDL-like definition fragment. BTreeMap keeps prompt
/// rendering deterministic across invocations.
pub type SchemaMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub dialect: Dialect,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

#[async_trait]
pub trait SchemaInspector {
    async fn fetch_schema(&self, params: &ConnectionParams) -> Result<SchemaMap>;
}

#[derive(Debug, Clone)]
struct ColumnInfo {
    table: String,
    name: String,
    data_type: String,
    nullable: bool,
    primary_key: bool,
}

/// `information_schema`-backed inspector for MySQL and PostgreSQL.
pub struct SqlxInspector;

#[async_trait]
impl SchemaInspector for SqlxInspector {
    async fn fetch_schema(&self, params: &ConnectionParams) -> Result<SchemaMap> {
        let columns = match params.dialect {
            Dialect::MySql => fetch_mysql_columns(params).await?,
            Dialect::PostgreSql => fetch_postgres_columns(params).await?,
            other => {
                return Err(Text2SqlError::UnsupportedDatabase(other.name().to_string()));
            }
        };

        let schema = render_schema(columns);
        info!(
            "Found {} tables: {}",
            schema.len(),
            schema.keys().join(", ")
        );
        Ok(schema)
    }
}

fn render_schema(columns: Vec<ColumnInfo>) -> SchemaMap {
    // Columns arrive ordered by (table, ordinal_position); grouping keeps
    // that order within each table.
    let mut by_table: BTreeMap<String, Vec<ColumnInfo>> = BTreeMap::new();
    for col in columns {
        by_table.entry(col.table.clone()).or_default().push(col);
    }
    debug!("Rendering {} tables", by_table.len());

    by_table
        .into_iter()
        .map(|(table, cols)| {
            let body = cols
                .iter()
                .map(|c| {
                    let mut line = format!("  {} {}", c.name, c.data_type);
                    if !c.nullable {
                        line.push_str(" NOT NULL");
                    }
                    if c.primary_key {
                        line.push_str(" PRIMARY KEY");
                    }
                    line
                })
                .join(",\n");
            let ddl = format!("CREATE TABLE {} (\n{}\n);", table, body);
            (table, ddl)
        })
        .collect()
}

fn schema_err(e: impl std::fmt::Display) -> Text2SqlError {
    Text2SqlError::Schema(e.to_string())
}

// The pk subquery must stay filtered to the introspected schema and
// deduplicated; a same-named table+column in another schema would otherwise
// fan out the join and repeat column lines in the rendered DDL.
const PG_COLUMNS_QUERY: &str = r#"
        SELECT c.table_name AS table_name,
               c.column_name AS column_name,
               c.data_type AS data_type,
               c.is_nullable AS is_nullable,
               (pk.column_name IS NOT NULL) AS is_primary
        FROM information_schema.columns c
        LEFT JOIN (
            SELECT DISTINCT kcu.table_name, kcu.column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = 'public'
        ) pk ON pk.table_name = c.table_name AND pk.column_name = c.column_name
        WHERE c.table_schema = 'public'
        ORDER BY c.table_name, c.ordinal_position
        "#;

async fn fetch_postgres_columns(params: &ConnectionParams) -> Result<Vec<ColumnInfo>> {
    let options = PgConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .username(&params.username)
        .password(&params.password)
        .database(&params.database);

    info!(
        "Introspecting PostgreSQL schema at {}:{}/{}",
        params.host, params.port, params.database
    );

    let mut conn = options
        .connect()
        .await
        .map_err(|e| Text2SqlError::Schema(format!("PostgreSQL connection failed: {}", e)))?;

    let rows = sqlx::query(PG_COLUMNS_QUERY)
        .fetch_all(&mut conn)
        .await
        .map_err(|e| Text2SqlError::Schema(format!("PostgreSQL introspection failed: {}", e)))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let is_nullable: String = row.try_get("is_nullable").map_err(schema_err)?;
        columns.push(ColumnInfo {
            table: row.try_get("table_name").map_err(schema_err)?,
            name: row.try_get("column_name").map_err(schema_err)?,
            data_type: row
                .try_get::<String, _>("data_type")
                .map_err(schema_err)?
                .to_uppercase(),
            nullable: is_nullable.eq_ignore_ascii_case("yes"),
            primary_key: row.try_get("is_primary").unwrap_or(false),
        });
    }

    if let Err(e) = conn.close().await {
        debug!("Connection close failed: {}", e);
    }
    Ok(columns)
}

async fn fetch_mysql_columns(params: &ConnectionParams) -> Result<Vec<ColumnInfo>> {
    let options = MySqlConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .username(&params.username)
        .password(&params.password)
        .database(&params.database);

    info!(
        "Introspecting MySQL schema at {}:{}/{}",
        params.host, params.port, params.database
    );

    let mut conn = options
        .connect()
        .await
        .map_err(|e| Text2SqlError::Schema(format!("MySQL connection failed: {}", e)))?;

    let rows = sqlx::query(
        r#"
        SELECT table_name AS table_name,
               column_name AS column_name,
               column_type AS column_type,
               is_nullable AS is_nullable,
               column_key AS column_key
        FROM information_schema.columns
        WHERE table_schema = ?
        ORDER BY table_name, ordinal_position
        "#,
    )
    .bind(&params.database)
    .fetch_all(&mut conn)
    .await
    .map_err(|e| Text2SqlError::Schema(format!("MySQL introspection failed: {}", e)))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let is_nullable: String = row.try_get("is_nullable").map_err(schema_err)?;
        let column_key: String = row.try_get("column_key").unwrap_or_default();
        columns.push(ColumnInfo {
            table: row.try_get("table_name").map_err(schema_err)?,
            name: row.try_get("column_name").map_err(schema_err)?,
            data_type: row
                .try_get::<String, _>("column_type")
                .map_err(schema_err)?
                .to_uppercase(),
            nullable: is_nullable.eq_ignore_ascii_case("yes"),
            primary_key: column_key.eq_ignore_ascii_case("pri"),
        });
    }

    if let Err(e) = conn.close().await {
        debug!("Connection close failed: {}", e);
    }
    Ok(columns)
}
