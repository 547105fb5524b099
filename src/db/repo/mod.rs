//! Generic repository over the SQLite row store.
//!
//! Every collection is a typed record implementing [`Entity`]; callers go
//! through [`Repo`] for get/list/insert/update/delete instead of writing SQL.

mod entities;
mod query;

pub use entities::{date_value, time_value};
pub use query::{Order, Query};

use crate::errors::AppResult;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use std::marker::PhantomData;

/// A flat record stored in one table with an integer `id` primary key.
pub trait Entity: Sized {
    const TABLE: &'static str;
    /// Stored columns, excluding `id`, in the order of [`Entity::values`].
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
    fn values(&self) -> Vec<Value>;
}

pub struct Repo<'c, E> {
    conn: &'c Connection,
    _entity: PhantomData<E>,
}

impl<'c, E: Entity> Repo<'c, E> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    fn select_sql() -> String {
        format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
    }

    pub fn get(&self, id: i64) -> AppResult<Option<E>> {
        let sql = format!("{} WHERE id = ?1", Self::select_sql());
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.query_row([id], E::from_row).optional()?)
    }

    pub fn list(&self, query: &Query) -> AppResult<Vec<E>> {
        let (tail, params) = query.render::<E>()?;
        let sql = format!("{}{}", Self::select_sql(), tail);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), E::from_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn first(&self, query: &Query) -> AppResult<Option<E>> {
        Ok(self.list(&query.clone().limit(1))?.into_iter().next())
    }

    pub fn count(&self, query: &Query) -> AppResult<i64> {
        let (tail, params) = query.render::<E>()?;
        let sql = format!("SELECT COUNT(*) FROM {}{}", E::TABLE, tail);
        let n = self
            .conn
            .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(n)
    }

    pub fn exists(&self, query: &Query) -> AppResult<bool> {
        Ok(self.count(query)? > 0)
    }

    /// Insert a new row (the entity's `id` is ignored) and return its id.
    pub fn insert(&self, entity: &E) -> AppResult<i64> {
        let slots: Vec<String> = (1..=E::COLUMNS.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            E::COLUMNS.join(", "),
            slots.join(", ")
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(entity.values()))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite every stored column of the row with the entity's id.
    /// Returns false when no such row exists.
    pub fn update(&self, entity: &E) -> AppResult<bool> {
        let sets: Vec<String> = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ?{}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            E::TABLE,
            sets.join(", "),
            E::COLUMNS.len() + 1
        );
        let mut values = entity.values();
        values.push(Value::Integer(entity.id()));
        let changed = self
            .conn
            .prepare_cached(&sql)?
            .execute(params_from_iter(values))?;
        Ok(changed > 0)
    }

    /// Insert, or update the non-key columns of the row matching `conflict`
    /// (which must be backed by a UNIQUE index). Returns the row id.
    pub fn upsert(&self, entity: &E, conflict: &[&str]) -> AppResult<i64> {
        for c in conflict {
            query::check_column::<E>(c)?;
        }
        let slots: Vec<String> = (1..=E::COLUMNS.len()).map(|i| format!("?{i}")).collect();
        let updates: Vec<String> = E::COLUMNS
            .iter()
            .filter(|c| !conflict.contains(c))
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})
             ON CONFLICT({}) DO UPDATE SET {}
             RETURNING id",
            E::TABLE,
            E::COLUMNS.join(", "),
            slots.join(", "),
            conflict.join(", "),
            updates.join(", ")
        );
        let id = self
            .conn
            .prepare_cached(&sql)?
            .query_row(params_from_iter(entity.values()), |row| row.get(0))?;
        Ok(id)
    }

    /// Set the given columns on every row matching `query`.
    pub fn update_where(&self, set: &[(&str, Value)], query: &Query) -> AppResult<usize> {
        let (tail, mut params) = query.render::<E>()?;
        // Filter placeholders are ?1..?n; shift SET placeholders after them.
        let offset = params.len();
        let mut sets = Vec::with_capacity(set.len());
        for (i, (column, value)) in set.iter().enumerate() {
            query::check_column::<E>(column)?;
            sets.push(format!("{column} = ?{}", offset + i + 1));
            params.push(value.clone());
        }
        let sql = format!("UPDATE {} SET {}{}", E::TABLE, sets.join(", "), tail);
        let changed = self.conn.execute(&sql, params_from_iter(params.iter()))?;
        Ok(changed)
    }

    pub fn delete(&self, id: i64) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);
        let changed = self.conn.prepare_cached(&sql)?.execute([id])?;
        Ok(changed > 0)
    }
}
