//! SQLite persistence for harvested records.
//!
//! A [`PersistenceGateway`] owns exactly one connection for the life of a
//! run. It is released either by [`PersistenceGateway::close`] or, on error
//! paths, by dropping the gateway.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS "<table>" (
//!     id           INTEGER PRIMARY KEY AUTOINCREMENT,
//!     category     TEXT,
//!     titles       TEXT,
//!     date         TEXT,
//!     descriptions TEXT,
//!     urls         TEXT
//! );
//! ```
//!
//! The table is append-only from the harvester's point of view: there is no
//! uniqueness constraint, so harvesting the same category twice stores the
//! overlap twice.

use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::{debug, info, instrument};

use crate::config::StorageConfig;
use crate::error::{HarvestError, Result};
use crate::models::Record;

/// A stored column that filters and updates can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Category,
    Title,
    Date,
    Description,
    Url,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Category => "category",
            Column::Title => "titles",
            Column::Date => "date",
            Column::Description => "descriptions",
            Column::Url => "urls",
        }
    }

    /// Columns a stored record can never leave blank.
    pub fn is_required(self) -> bool {
        matches!(self, Column::Category | Column::Title | Column::Description)
    }
}

/// Row predicate over stored columns.
///
/// Comparisons follow SQL semantics, so `Ne` and the ordering operators never
/// match a `NULL` value; use [`Filter::IsNull`] for that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(Column, String),
    Ne(Column, String),
    Lt(Column, String),
    Gt(Column, String),
    IsNull(Column),
    IsNotNull(Column),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    pub fn and(self, other: Filter) -> Filter {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Filter) -> Filter {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Render as a parameterised SQL expression, pushing bound values onto `params`.
    fn to_sql(&self, params: &mut Vec<Option<String>>) -> String {
        match self {
            Filter::Eq(c, v) => compare(params, *c, "=", v),
            Filter::Ne(c, v) => compare(params, *c, "!=", v),
            Filter::Lt(c, v) => compare(params, *c, "<", v),
            Filter::Gt(c, v) => compare(params, *c, ">", v),
            Filter::IsNull(c) => format!("{} IS NULL", c.name()),
            Filter::IsNotNull(c) => format!("{} IS NOT NULL", c.name()),
            Filter::And(a, b) => format!("({} AND {})", a.to_sql(params), b.to_sql(params)),
            Filter::Or(a, b) => format!("({} OR {})", a.to_sql(params), b.to_sql(params)),
        }
    }
}

fn compare(params: &mut Vec<Option<String>>, column: Column, op: &str, value: &str) -> String {
    params.push(Some(value.to_string()));
    format!("{} {} ?", column.name(), op)
}

/// Durable store of [`Record`]s for one run.
#[derive(Debug)]
pub struct PersistenceGateway {
    conn: Connection,
    table: String,
}

impl PersistenceGateway {
    /// Open the configured database.
    ///
    /// # Arguments
    ///
    /// * `config` - Database location (a path, `:memory:` or `sqlite:///path`)
    ///   and table name
    ///
    /// # Errors
    ///
    /// A configuration error when the location or table name is missing or
    /// invalid; a storage error when SQLite cannot open the file.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let gateway = PersistenceGateway::open(&StorageConfig::new(":memory:", "inshorts"))?;
    /// gateway.create_table()?;
    /// ```
    #[instrument(level = "info", skip_all)]
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let path = config.database_path()?;
        let table = config.table_name()?;
        let conn = Connection::open(&path)?;
        info!(%path, %table, "Opened storage");
        Ok(Self { conn, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the backing table if it does not exist yet.
    pub fn create_table(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                category     TEXT,
                titles       TEXT,
                date         TEXT,
                descriptions TEXT,
                urls         TEXT
            );"#,
            self.table
        ))?;
        debug!(table = %self.table, "Ensured table exists");
        Ok(())
    }

    /// Append every record in a single transaction.
    ///
    /// Either all of `records` become visible or, on any failure, none do.
    /// Returns the number of rows written.
    #[instrument(level = "info", skip_all, fields(table = %self.table, count = records.len()))]
    pub fn insert_all(&mut self, records: &[Record]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                r#"INSERT INTO "{}" (category, titles, date, descriptions, urls) VALUES (?1, ?2, ?3, ?4, ?5)"#,
                self.table
            ))?;
            for record in records {
                stmt.execute(params![
                    record.category,
                    record.title,
                    record.date,
                    record.description,
                    record.url,
                ])?;
            }
        }
        tx.commit()?;
        info!("Inserted records");
        Ok(records.len())
    }

    /// Rows matching `filter` (all rows when `None`), in insertion order.
    pub fn read_all(&self, filter: Option<&Filter>) -> Result<Vec<Record>> {
        let mut params = Vec::new();
        let mut sql = format!(
            r#"SELECT category, titles, date, descriptions, urls FROM "{}""#,
            self.table
        );
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.to_sql(&mut params));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(params.iter()), record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = records.len(), "Read records");
        Ok(records)
    }

    /// Assign `values` on every row matching `filter` (all rows when `None`).
    ///
    /// # Arguments
    ///
    /// * `filter` - Rows to touch; `None` touches every row
    /// * `values` - Column assignments; `None` stores SQL `NULL`
    ///
    /// # Returns
    ///
    /// The number of rows changed. An empty `values` is a no-op returning `0`.
    ///
    /// # Errors
    ///
    /// [`HarvestError::InvalidRecord`] when a required column would be set to
    /// `NULL` or blank text; nothing is written in that case.
    #[instrument(level = "info", skip_all, fields(table = %self.table))]
    pub fn update_matching(
        &mut self,
        filter: Option<&Filter>,
        values: &[(Column, Option<String>)],
    ) -> Result<usize> {
        if values.is_empty() {
            debug!("No assignments given; nothing to update");
            return Ok(0);
        }
        if let Some((column, _)) = values.iter().find(|(column, value)| {
            column.is_required() && value.as_deref().is_none_or(|v| v.trim().is_empty())
        }) {
            return Err(HarvestError::InvalidRecord(format!(
                "column '{}' cannot be set to NULL or blank",
                column.name()
            )));
        }

        let mut params: Vec<Option<String>> = Vec::with_capacity(values.len());
        let assignments = values
            .iter()
            .map(|(column, value)| {
                params.push(value.clone());
                format!("{} = ?", column.name())
            })
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!(r#"UPDATE "{}" SET {}"#, self.table, assignments);
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.to_sql(&mut params));
        }

        let tx = self.conn.transaction()?;
        let changed = tx.execute(&sql, params_from_iter(params.iter()))?;
        tx.commit()?;
        info!(changed, "Updated records");
        Ok(changed)
    }

    /// Remove every row. Irreversible.
    #[instrument(level = "info", skip_all, fields(table = %self.table))]
    pub fn delete_all(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute(&format!(r#"DELETE FROM "{}""#, self.table), [])?;
        tx.commit()?;
        info!(removed, "Deleted all records");
        Ok(removed)
    }

    /// Release the connection.
    pub fn close(self) -> Result<()> {
        let table = self.table;
        self.conn.close().map_err(|(_, e)| e)?;
        debug!(%table, "Closed storage");
        Ok(())
    }
}

/// Required columns must hold text; a `NULL` there surfaces as a type error.
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        category: row.get(0)?,
        title: row.get(1)?,
        date: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        description: row.get(3)?,
        url: row.get(4)?,
    })
}
