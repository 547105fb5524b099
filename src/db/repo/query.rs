//! Typed filter/order builder for repository reads.
//!
//! Column names are checked against the entity's column list before any SQL
//! is produced, so user-facing code never formats identifiers directly.

use super::Entity;
use crate::errors::{AppError, AppResult};
use rusqlite::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
enum Predicate {
    Cmp(&'static str, Value),
    IsNull,
    NotNull,
    In(Vec<Value>),
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(String, Predicate)>,
    order: Vec<(String, Order)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn cmp(mut self, column: &str, op: &'static str, value: impl Into<Value>) -> Self {
        self.filters
            .push((column.to_string(), Predicate::Cmp(op, value.into())));
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.cmp(column, "=", value)
    }

    pub fn ne(self, column: &str, value: impl Into<Value>) -> Self {
        self.cmp(column, "<>", value)
    }

    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.cmp(column, "<", value)
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.cmp(column, "<=", value)
    }

    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.cmp(column, ">", value)
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.cmp(column, ">=", value)
    }

    /// Inclusive range on one column.
    pub fn between(self, column: &str, lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        self.gte(column, lo).lte(column, hi)
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.filters.push((column.to_string(), Predicate::IsNull));
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        self.filters.push((column.to_string(), Predicate::NotNull));
        self
    }

    pub fn any_of<V: Into<Value>>(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filters.push((column.to_string(), Predicate::In(values)));
        self
    }

    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        self.order.push((column.to_string(), order));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Render `WHERE … ORDER BY … LIMIT …` for entity `E`, numbering
    /// placeholders from `?1`.
    pub(crate) fn render<E: Entity>(&self) -> AppResult<(String, Vec<Value>)> {
        let mut sql = String::new();
        let mut params: Vec<Value> = Vec::new();
        let mut conditions = Vec::new();

        for (column, predicate) in &self.filters {
            check_column::<E>(column)?;
            match predicate {
                Predicate::Cmp(op, value) => {
                    params.push(value.clone());
                    conditions.push(format!("{column} {op} ?{}", params.len()));
                }
                Predicate::IsNull => conditions.push(format!("{column} IS NULL")),
                Predicate::NotNull => conditions.push(format!("{column} IS NOT NULL")),
                Predicate::In(values) if values.is_empty() => {
                    // IN () is not valid SQL; an empty set matches nothing.
                    conditions.push("0 = 1".to_string());
                }
                Predicate::In(values) => {
                    let mut slots = Vec::with_capacity(values.len());
                    for v in values {
                        params.push(v.clone());
                        slots.push(format!("?{}", params.len()));
                    }
                    conditions.push(format!("{column} IN ({})", slots.join(", ")));
                }
            }
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !self.order.is_empty() {
            let mut parts = Vec::with_capacity(self.order.len());
            for (column, order) in &self.order {
                check_column::<E>(column)?;
                let dir = match order {
                    Order::Asc => "ASC",
                    Order::Desc => "DESC",
                };
                parts.push(format!("{column} {dir}"));
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }

        if let Some(n) = self.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        Ok((sql, params))
    }
}

pub(crate) fn check_column<E: Entity>(column: &str) -> AppResult<()> {
    if column == "id" || E::COLUMNS.contains(&column) {
        Ok(())
    } else {
        Err(AppError::UnknownColumn {
            table: E::TABLE,
            column: column.to_string(),
        })
    }
}
