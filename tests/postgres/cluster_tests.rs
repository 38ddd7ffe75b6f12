//! Tests for the shared cluster harness.

use crate::postgres::cluster::{WORKER_BINARY, launch_env_changes};
use crate::postgres::helpers::{PostgresCluster, postgres_cluster};
use diesel::prelude::*;
use diesel::sql_types::Integer;
use pg_embedded_setup_unpriv::{ExecutionPrivileges, detect_execution_privileges};
use rstest::rstest;
use std::path::Path;

#[derive(QueryableByName)]
struct One {
    #[diesel(sql_type = Integer)]
    one: i32,
}

#[rstest]
fn cluster_answers_queries(postgres_cluster: PostgresCluster) {
    let mut conn = postgres_cluster
        .admin_connection()
        .expect("admin connection");

    let row = diesel::sql_query("SELECT 1 AS one")
        .get_result::<One>(&mut conn)
        .expect("query runs");

    assert_eq!(row.one, 1);
}

#[rstest]
fn worker_binary_is_built_with_the_tests() {
    assert!(Path::new(WORKER_BINARY).is_file(), "missing {WORKER_BINARY}");
}

#[rstest]
fn root_launches_name_the_worker() {
    let changes = launch_env_changes().expect("launch environment");
    let worker = changes
        .iter()
        .find(|(key, _)| key == "PG_EMBEDDED_WORKER")
        .and_then(|(_, value)| value.as_deref());

    let is_root = matches!(detect_execution_privileges(), ExecutionPrivileges::Root);
    if is_root && std::env::var_os("PG_EMBEDDED_WORKER").is_none() {
        assert_eq!(worker, Some(WORKER_BINARY));
    } else {
        assert_eq!(worker, None);
    }
}
