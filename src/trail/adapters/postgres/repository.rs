//! `PostgreSQL` repository implementation for trails.
//!
//! Every operation runs in its own transaction that first publishes the
//! caller as the transaction-local setting `app.caller_id` (empty for
//! anonymous callers), so row-level-security policies can refer to it.

use super::{
    models::{NewTrailRow, TrailChangeset, TrailRow},
    schema::trails,
};
use crate::trail::{
    access::Caller,
    domain::{Trail, TrailContent, TrailId, TrailPatch},
    ports::{TrailRepository, TrailRepositoryError, TrailRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by trail adapters.
pub type TrailPgPool = Pool<ConnectionManager<PgConnection>>;

/// Session setting carrying the caller's principal identifier.
const CALLER_SETTING: &str = "app.caller_id";

/// `PostgreSQL`-backed trail repository.
#[derive(Debug, Clone)]
pub struct PostgresTrailRepository {
    pool: TrailPgPool,
}

impl PostgresTrailRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TrailPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TrailRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TrailRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TrailRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TrailRepositoryError::persistence)?
    }
}

#[async_trait]
impl TrailRepository for PostgresTrailRepository {
    async fn create(&self, caller: &Caller, content: &TrailContent) -> TrailRepositoryResult<Trail> {
        let caller_value = caller_setting_value(caller);
        let new_row = NewTrailRow::from(content);

        self.run_blocking(move |connection| {
            let row = in_caller_session(connection, &caller_value, |conn| {
                diesel::insert_into(trails::table)
                    .values(&new_row)
                    .returning(TrailRow::as_returning())
                    .get_result::<TrailRow>(conn)
            })
            .map_err(map_write_error)?;
            Ok(Trail::from(row))
        })
        .await
    }

    async fn find_by_id(&self, caller: &Caller, id: TrailId) -> TrailRepositoryResult<Option<Trail>> {
        let caller_value = caller_setting_value(caller);

        self.run_blocking(move |connection| {
            let row = in_caller_session(connection, &caller_value, |conn| {
                trails::table
                    .filter(trails::id.eq(id.into_inner()))
                    .select(TrailRow::as_select())
                    .first::<TrailRow>(conn)
                    .optional()
            })
            .map_err(TrailRepositoryError::persistence)?;
            Ok(row.map(Trail::from))
        })
        .await
    }

    async fn list_recent(&self, caller: &Caller, limit: usize) -> TrailRepositoryResult<Vec<Trail>> {
        let caller_value = caller_setting_value(caller);
        let row_limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.run_blocking(move |connection| {
            let rows = in_caller_session(connection, &caller_value, |conn| {
                trails::table
                    .order((trails::created_at.desc(), trails::id.desc()))
                    .limit(row_limit)
                    .select(TrailRow::as_select())
                    .load::<TrailRow>(conn)
            })
            .map_err(TrailRepositoryError::persistence)?;
            Ok(rows.into_iter().map(Trail::from).collect())
        })
        .await
    }

    async fn update(
        &self,
        caller: &Caller,
        id: TrailId,
        patch: &TrailPatch,
    ) -> TrailRepositoryResult<Trail> {
        let caller_value = caller_setting_value(caller);
        let changeset = (!patch.is_empty()).then(|| TrailChangeset::from(patch));

        self.run_blocking(move |connection| {
            let row = in_caller_session(connection, &caller_value, |conn| {
                let target = trails::table.filter(trails::id.eq(id.into_inner()));
                match &changeset {
                    Some(changes) => diesel::update(target)
                        .set(changes)
                        .returning(TrailRow::as_returning())
                        .get_result::<TrailRow>(conn)
                        .optional(),
                    None => target
                        .select(TrailRow::as_select())
                        .first::<TrailRow>(conn)
                        .optional(),
                }
            })
            .map_err(map_write_error)?;
            row.map(Trail::from)
                .ok_or(TrailRepositoryError::NotFound(id))
        })
        .await
    }

    async fn delete(&self, caller: &Caller, id: TrailId) -> TrailRepositoryResult<bool> {
        let caller_value = caller_setting_value(caller);

        self.run_blocking(move |connection| {
            let deleted = in_caller_session(connection, &caller_value, |conn| {
                diesel::delete(trails::table.filter(trails::id.eq(id.into_inner()))).execute(conn)
            })
            .map_err(TrailRepositoryError::persistence)?;
            Ok(deleted > 0)
        })
        .await
    }
}

/// Runs `f` in a transaction that has the caller setting applied.
fn in_caller_session<T, F>(
    connection: &mut PgConnection,
    caller_value: &str,
    f: F,
) -> Result<T, DieselError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, DieselError>,
{
    connection.transaction(|conn| {
        diesel::sql_query("SELECT set_config($1, $2, true)")
            .bind::<diesel::sql_types::Text, _>(CALLER_SETTING)
            .bind::<diesel::sql_types::Text, _>(caller_value)
            .execute(conn)?;
        f(conn)
    })
}

fn caller_setting_value(caller: &Caller) -> String {
    caller
        .principal_id()
        .map(|id| id.to_string())
        .unwrap_or_default()
}

/// Maps constraint violations raised by writes to semantic errors.
fn map_write_error(err: DieselError) -> TrailRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TrailRepositoryError::DuplicateTrail
        }
        DieselError::DatabaseError(DatabaseErrorKind::NotNullViolation, ref info) => {
            TrailRepositoryError::MissingRequiredField(
                info.column_name().unwrap_or("unknown").to_owned(),
            )
        }
        _ => TrailRepositoryError::persistence(err),
    }
}
