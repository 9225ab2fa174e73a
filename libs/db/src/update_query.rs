//! Partial `UPDATE` statement builder.
//!
//! Fields are declared in call order with an optional value. Unset fields are
//! skipped entirely: no clause and no placeholder. Placeholder `$1` always
//! belongs to the WHERE value, so the first set field is bound as `$2`.
//!
//! ```
//! use db::{SqlValue, UpdateQuery};
//!
//! let stmt = UpdateQuery::new()
//!     .set("price", Some(500))
//!     .set("service_name", None::<String>)
//!     .build("subscriptions", "id", 7_i64)
//!     .expect("one field is set");
//!
//! assert_eq!(
//!     stmt.sql,
//!     "UPDATE subscriptions SET price = $2, updated_at = NOW() WHERE id = $1"
//! );
//! assert_eq!(stmt.params, vec![SqlValue::BigInt(7), SqlValue::Int(500)]);
//! ```

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

use crate::value::SqlValue;

/// Column stamped on every non-empty update.
pub const UPDATED_AT_CLAUSE: &str = "updated_at = NOW()";

/// Ordered list of `(column, value)` pairs waiting to be rendered.
///
/// Column and table names are `&'static str`: they come from code, never from
/// request data. Values only ever travel as bound parameters.
#[derive(Debug, Default, Clone)]
pub struct UpdateQuery {
    fields: Vec<(&'static str, SqlValue)>,
}

/// A rendered statement with its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl UpdateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a column. `None` leaves the column untouched.
    pub fn set<V: Into<SqlValue>>(mut self, field: &'static str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.fields.push((field, v.into()));
        }
        self
    }

    /// Number of columns that will be written.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render the statement.
    ///
    /// Returns `None` when no column was set: an update that would only touch
    /// `updated_at` is never produced.
    pub fn build(
        self,
        table: &'static str,
        where_field: &'static str,
        where_value: impl Into<SqlValue>,
    ) -> Option<UpdateStatement> {
        if self.fields.is_empty() {
            return None;
        }

        let mut params = Vec::with_capacity(self.fields.len() + 1);
        params.push(where_value.into());

        let mut clauses = Vec::with_capacity(self.fields.len() + 1);
        for (field, value) in self.fields {
            params.push(value);
            clauses.push(format!("{field} = ${}", params.len()));
        }
        clauses.push(UPDATED_AT_CLAUSE.to_string());

        let sql = format!(
            "UPDATE {table} SET {} WHERE {where_field} = $1",
            clauses.join(", ")
        );
        tracing::trace!(%sql, params = params.len(), "built partial update");

        Some(UpdateStatement { sql, params })
    }
}

impl UpdateStatement {
    /// Number of set clauses excluding the timestamp clause.
    pub fn assignments(&self) -> usize {
        self.params.len().saturating_sub(1)
    }

    /// Whether any assignment writes a NULL.
    pub fn clears_any(&self) -> bool {
        self.params.iter().skip(1).any(SqlValue::is_null)
    }

    /// Build a sqlx query with every parameter bound in order.
    pub fn to_query(&self) -> Query<'_, Postgres, PgArguments> {
        self.params
            .iter()
            .fold(sqlx::query(&self.sql), |q, v| v.bind_to(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn id() -> Uuid {
        Uuid::parse_str("60601fee-2bf1-4721-ae6f-7636e79a0cba").unwrap()
    }

    #[test]
    fn empty_update_yields_no_statement() {
        let stmt = UpdateQuery::new()
            .set("price", None::<i32>)
            .set("service_name", None::<String>)
            .set("end_date", None::<Option<NaiveDate>>)
            .build("public.subscriptions", "id", id());
        assert!(stmt.is_none());
    }

    #[test]
    fn single_field_renders_one_clause_and_two_params() {
        let stmt = UpdateQuery::new()
            .set("user_id", None::<Uuid>)
            .set("price", Some(500))
            .set("service_name", None::<String>)
            .build("public.subscriptions", "id", id())
            .unwrap();

        assert_eq!(
            stmt.sql,
            "UPDATE public.subscriptions SET price = $2, updated_at = NOW() WHERE id = $1"
        );
        assert_eq!(stmt.params, vec![SqlValue::Uuid(id()), SqlValue::Int(500)]);
        assert_eq!(stmt.assignments(), 1);
    }

    #[test]
    fn placeholders_follow_declaration_order_and_skip_gaps() {
        let user = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let stmt = UpdateQuery::new()
            .set("user_id", Some(user))
            .set("price", None::<i32>)
            .set("service_name", Some("Yandex Plus"))
            .set("start_date", Some(start))
            .set("end_date", None::<Option<NaiveDate>>)
            .build("public.subscriptions", "id", id())
            .unwrap();

        assert_eq!(
            stmt.sql,
            "UPDATE public.subscriptions SET user_id = $2, service_name = $3, start_date = $4, \
             updated_at = NOW() WHERE id = $1"
        );
        assert_eq!(
            stmt.params,
            vec![
                SqlValue::Uuid(id()),
                SqlValue::Uuid(user),
                SqlValue::Text("Yandex Plus".into()),
                SqlValue::Date(Some(start)),
            ]
        );
        assert!(!stmt.clears_any());
    }

    #[test]
    fn typed_null_is_a_set_field() {
        let stmt = UpdateQuery::new()
            .set("end_date", Some(None::<NaiveDate>))
            .build("public.subscriptions", "id", id())
            .unwrap();

        assert_eq!(
            stmt.sql,
            "UPDATE public.subscriptions SET end_date = $2, updated_at = NOW() WHERE id = $1"
        );
        assert_eq!(stmt.params[1], SqlValue::Date(None));
        assert!(stmt.clears_any());
    }

    #[test]
    fn len_counts_only_set_fields() {
        let q = UpdateQuery::new()
            .set("price", Some(1))
            .set("service_name", None::<String>);
        assert_eq!(q.len(), 1);
        assert!(!q.is_empty());
        assert!(UpdateQuery::new().is_empty());
    }
}
