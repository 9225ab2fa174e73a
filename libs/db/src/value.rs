//! Typed SQL parameter values.
//!
//! `SqlValue` carries a bindable value together with its Postgres type, so a
//! statement can be assembled first and bound later without losing the type.
//! A typed NULL (`SqlValue::Date(None)`) is a real value: it clears a column,
//! which is different from not mentioning the column at all.

use chrono::NaiveDate;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Uuid(Uuid),
    Text(String),
    Int(i32),
    BigInt(i64),
    Date(Option<NaiveDate>),
}

impl SqlValue {
    /// Bind this value as the next positional parameter of `query`.
    pub fn bind_to<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlValue::Uuid(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::BigInt(v) => query.bind(*v),
            SqlValue::Date(v) => query.bind(*v),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Date(None))
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_owned())
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::BigInt(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(Some(v))
    }
}

impl From<Option<NaiveDate>> for SqlValue {
    fn from(v: Option<NaiveDate>) -> Self {
        SqlValue::Date(v)
    }
}
