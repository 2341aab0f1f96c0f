//! SQL statement builders.
//!
//! Every builder validates column names against the model's column table
//! before emitting SQL, quotes identifiers and binds all values.

use crate::dao::{Changes, Filters, OrderBy};
use crate::model::ModelMeta;
use crate::value::Value;
use sqlx::{Postgres, QueryBuilder};
use tessera_core::{TesseraError, TesseraResult};

pub(crate) type Statement = QueryBuilder<'static, Postgres>;

/// Bind parameters PostgreSQL accepts in one statement.
pub(crate) const MAX_BIND_PARAMETERS: usize = u16::MAX as usize;

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn returning(meta: &ModelMeta) -> String {
    let columns: Vec<String> = meta.column_names().map(quote).collect();
    format!(" RETURNING {}", columns.join(", "))
}

fn push_value(qb: &mut Statement, value: &Value) {
    match value {
        Value::Null => {
            qb.push("NULL");
        }
        Value::Bool(v) => {
            qb.push_bind(*v);
        }
        Value::Int(v) => {
            qb.push_bind(*v);
        }
        Value::Float(v) => {
            qb.push_bind(*v);
        }
        Value::Text(v) => {
            qb.push_bind(v.clone());
        }
        Value::Uuid(v) => {
            qb.push_bind(*v);
        }
        Value::Timestamp(v) => {
            qb.push_bind(*v);
        }
        Value::Json(v) => {
            qb.push_bind(sqlx::types::Json(v.clone()));
        }
    }
}

fn push_condition(qb: &mut Statement, column: &str, value: &Value) {
    qb.push(quote(column));
    if value.is_null() {
        qb.push(" IS NULL");
    } else {
        qb.push(" = ");
        push_value(qb, value);
    }
}

fn push_where(qb: &mut Statement, meta: &ModelMeta, filters: &Filters) -> TesseraResult<()> {
    for (index, (column, value)) in filters.iter().enumerate() {
        let column = meta.column(column)?;
        qb.push(if index == 0 { " WHERE " } else { " AND " });
        push_condition(qb, column.name, value);
    }
    Ok(())
}

fn bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `SELECT … FROM … [WHERE …] [ORDER BY …] [LIMIT …] [OFFSET …]`
pub(crate) fn select(
    meta: &ModelMeta,
    filters: &Filters,
    order_by: Option<&OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
) -> TesseraResult<Statement> {
    let columns: Vec<String> = meta.column_names().map(quote).collect();
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", columns.join(", "), quote(meta.table)));

    push_where(&mut qb, meta, filters)?;

    if let Some(order_by) = order_by {
        let column = meta.column(&order_by.column)?;
        let direction = if order_by.descending { "DESC" } else { "ASC" };
        qb.push(format!(" ORDER BY {} {}", quote(column.name), direction));
        // Primary key breaks ties so paging is stable.
        if let Ok(key) = meta.primary_key() {
            if key.name != column.name {
                qb.push(format!(", {} ASC", quote(key.name)));
            }
        }
    }

    if let Some(limit) = limit {
        qb.push(" LIMIT ");
        qb.push_bind(bound(limit));
    }
    if let Some(offset) = offset {
        qb.push(" OFFSET ");
        qb.push_bind(bound(offset));
    }

    Ok(qb)
}

/// `SELECT COUNT(*) FROM … [WHERE …]`
pub(crate) fn count(meta: &ModelMeta, filters: &Filters) -> TesseraResult<Statement> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", quote(meta.table)));
    push_where(&mut qb, meta, filters)?;
    Ok(qb)
}

/// Most rows one `INSERT` can carry without exceeding the bind limit.
pub(crate) fn insert_batch_size(meta: &ModelMeta) -> usize {
    (MAX_BIND_PARAMETERS / meta.columns.len().max(1)).max(1)
}

/// Multi-row `INSERT … VALUES … RETURNING …`.
///
/// Each row holds one value per column in declaration order. `NULL` in a
/// generated column is written as `DEFAULT`.
pub(crate) fn insert(meta: &ModelMeta, rows: &[Vec<Value>]) -> TesseraResult<Statement> {
    if rows.is_empty() {
        return Err(TesseraError::internal("insert statement requires at least one row"));
    }

    let columns: Vec<String> = meta.column_names().map(quote).collect();
    let mut qb = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) VALUES ",
        quote(meta.table),
        columns.join(", ")
    ));

    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != meta.columns.len() {
            return Err(TesseraError::internal(format!(
                "{} insert row has {} values for {} columns",
                meta.name,
                row.len(),
                meta.columns.len()
            )));
        }
        if row_index > 0 {
            qb.push(", ");
        }
        qb.push("(");
        for (index, (column, value)) in meta.columns.iter().zip(row).enumerate() {
            if index > 0 {
                qb.push(", ");
            }
            if column.generated && value.is_null() {
                qb.push("DEFAULT");
            } else {
                push_value(&mut qb, value);
            }
        }
        qb.push(")");
    }

    qb.push(returning(meta));
    Ok(qb)
}

/// `UPDATE … SET … WHERE pk = key RETURNING …`
pub(crate) fn update(meta: &ModelMeta, key: &Value, changes: &Changes) -> TesseraResult<Statement> {
    let primary_key = meta.primary_key()?;
    if changes.is_empty() {
        return Err(TesseraError::internal("update statement requires at least one change"));
    }

    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", quote(meta.table)));
    for (index, (column, value)) in changes.iter().enumerate() {
        let column = meta.column(column)?;
        if index > 0 {
            qb.push(", ");
        }
        qb.push(format!("{} = ", quote(column.name)));
        push_value(&mut qb, value);
    }
    qb.push(" WHERE ");
    push_condition(&mut qb, primary_key.name, key);
    qb.push(returning(meta));
    Ok(qb)
}

/// `DELETE FROM … WHERE pk = key RETURNING …`
pub(crate) fn delete(meta: &ModelMeta, key: &Value) -> TesseraResult<Statement> {
    let primary_key = meta.primary_key()?;
    let mut qb = QueryBuilder::new(format!("DELETE FROM {} WHERE ", quote(meta.table)));
    push_condition(&mut qb, primary_key.name, key);
    qb.push(returning(meta));
    Ok(qb)
}
