//! CRUD tests for the `PostgreSQL` trail repository.

use crate::postgres::helpers::{TestDatabase, test_database};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::sql_types::Text;
use rstest::rstest;
use serde_json::{Value, json};
use std::collections::HashSet;
use trails::config::TrailsConfig;
use trails::trail::{
    access::Caller,
    domain::{TrailContent, TrailId, TrailPatch},
    ports::{TrailRepository, TrailRepositoryError},
};
use uuid::Uuid;

fn nested_graph() -> Value {
    json!([
        {
            "id": "n1",
            "label": "Rust",
            "metadata": {"tags": ["systems", {"deep": [1, 2.5, {"deeper": [null, true]}]}]}
        },
        {"id": "n2", "label": "Go", "metadata": {}}
    ])
}

#[rstest]
fn create_with_only_query_uses_column_defaults(test_database: TestDatabase) {
    let db = test_database;

    let trail = db
        .rt
        .block_on(db.repo.create(&Caller::Anonymous, &TrailContent::new("rust vs go")))
        .expect("create should succeed");

    assert!(!trail.id().into_inner().is_nil());
    assert_eq!(trail.query(), "rust vs go");
    let drift = (Utc::now() - trail.created_at()).abs();
    assert!(drift < Duration::minutes(1), "created_at drifted by {drift}");
    assert!(trail.synthesis().is_none());
    assert!(trail.nodes().is_none());
    assert!(trail.edges().is_none());
}

#[rstest]
fn repeated_creates_generate_distinct_ids(test_database: TestDatabase) {
    let db = test_database;

    let ids: HashSet<TrailId> = (0..20)
        .map(|n| {
            db.rt
                .block_on(db.repo.create(&Caller::Anonymous, &TrailContent::new(format!("q{n}"))))
                .expect("create should succeed")
                .id()
        })
        .collect();

    assert_eq!(ids.len(), 20);
}

#[rstest]
fn graph_payloads_round_trip_unchanged(test_database: TestDatabase) {
    let db = test_database;
    let nodes = nested_graph();
    let edges = json!([{"source": "n1", "target": "n2", "weight": 0.75, "relation": "compared_with"}]);

    let created = db
        .rt
        .block_on(db.repo.create(
            &Caller::Anonymous,
            &TrailContent::new("graphs")
                .with_synthesis("summary")
                .with_nodes(nodes.clone())
                .with_edges(edges.clone()),
        ))
        .expect("create should succeed");
    let found = db
        .rt
        .block_on(db.repo.find_by_id(&Caller::Anonymous, created.id()))
        .expect("lookup should succeed")
        .expect("trail should exist");

    assert_eq!(found, created);
    assert_eq!(found.nodes().map(|payload| payload.as_value()), Some(&nodes));
    assert_eq!(found.edges().map(|payload| payload.as_value()), Some(&edges));
}

#[derive(QueryableByName)]
struct InsertedId {
    #[diesel(sql_type = Text)]
    id: String,
}

fn insert_raw_nodes(db: &TestDatabase, nodes: &str) -> TrailId {
    let mut conn = db.connect().expect("direct connection");
    let row = diesel::sql_query(
        "INSERT INTO trails (query, nodes) VALUES ('written elsewhere', $1::json) \
         RETURNING id::text AS id",
    )
    .bind::<Text, _>(nodes)
    .get_result::<InsertedId>(&mut conn)
    .expect("raw insert");
    TrailId::from_uuid(Uuid::parse_str(&row.id).expect("uuid text"))
}

#[rstest]
#[case::wide_integer("[123456789012345678901234567890]")]
#[case::long_decimal("[0.10000000000000000000000001]")]
fn externally_written_numbers_read_back_exactly(
    test_database: TestDatabase,
    #[case] nodes: &str,
) {
    let db = test_database;
    let id = insert_raw_nodes(&db, nodes);

    let found = db
        .rt
        .block_on(db.repo.find_by_id(&Caller::Anonymous, id))
        .expect("lookup should succeed")
        .expect("trail should exist");

    assert_eq!(
        found.nodes().map(|payload| payload.as_value().to_string()),
        Some(nodes.to_owned())
    );
}

#[rstest]
fn out_of_range_number_does_not_break_listing(test_database: TestDatabase) {
    let db = test_database;
    let id = insert_raw_nodes(&db, "[1e400]");
    db.rt
        .block_on(db.repo.create(&Caller::Anonymous, &TrailContent::new("ordinary")))
        .expect("create should succeed");

    let recent = db
        .rt
        .block_on(db.repo.list_recent(&Caller::principal(Uuid::new_v4()), 10))
        .expect("listing should succeed");

    let stored = recent
        .iter()
        .find(|trail| trail.id() == id)
        .expect("raw row listed");
    let first = stored
        .nodes()
        .and_then(|payload| payload.as_value().get(0))
        .expect("one node");
    assert!(first.is_number());
    assert!(first.as_f64().is_none());
    assert_eq!(recent.len(), 2);
}

#[rstest]
fn update_is_visible_to_other_callers(test_database: TestDatabase) {
    let db = test_database;
    let writer = Caller::principal(Uuid::new_v4());
    let created = db
        .rt
        .block_on(db.repo.create(&Caller::Anonymous, &TrailContent::new("rust vs go")))
        .expect("create should succeed");

    let updated = db
        .rt
        .block_on(db.repo.update(
            &writer,
            created.id(),
            &TrailPatch::new()
                .with_synthesis("both are fast")
                .with_nodes(nested_graph()),
        ))
        .expect("update should succeed");
    let reread = db
        .rt
        .block_on(db.repo.find_by_id(&Caller::Anonymous, created.id()))
        .expect("lookup should succeed")
        .expect("trail should exist");

    assert_eq!(reread, updated);
    assert_eq!(reread.synthesis(), Some("both are fast"));
    assert!(reread.edges().is_none());
    assert_eq!(reread.created_at(), created.created_at());
}

#[rstest]
fn empty_patch_returns_current_row(test_database: TestDatabase) {
    let db = test_database;
    let created = db
        .rt
        .block_on(db.repo.create(&Caller::Anonymous, &TrailContent::new("q").with_synthesis("s")))
        .expect("create should succeed");

    let unchanged = db
        .rt
        .block_on(db.repo.update(&Caller::Anonymous, created.id(), &TrailPatch::new()))
        .expect("update should succeed");

    assert_eq!(unchanged, created);
}

#[rstest]
#[case(TrailPatch::new().with_synthesis("s"))]
#[case(TrailPatch::new())]
fn update_missing_trail_is_not_found(
    test_database: TestDatabase,
    #[case] patch: TrailPatch,
) {
    let db = test_database;
    let id = TrailId::new();

    let result = db.rt.block_on(db.repo.update(&Caller::Anonymous, id, &patch));

    assert!(matches!(result, Err(TrailRepositoryError::NotFound(missing)) if missing == id));
}

#[rstest]
fn delete_reports_whether_a_row_was_removed(test_database: TestDatabase) {
    let db = test_database;
    let created = db
        .rt
        .block_on(db.repo.create(&Caller::Anonymous, &TrailContent::new("q")))
        .expect("create should succeed");

    let first = db
        .rt
        .block_on(db.repo.delete(&Caller::principal(Uuid::new_v4()), created.id()))
        .expect("delete should succeed");
    let second = db
        .rt
        .block_on(db.repo.delete(&Caller::Anonymous, created.id()))
        .expect("delete should succeed");

    assert!(first);
    assert!(!second);
}

#[rstest]
fn list_recent_orders_newest_first_with_limit(test_database: TestDatabase) {
    let db = test_database;
    for query in ["first", "second", "third"] {
        db.rt
            .block_on(db.repo.create(&Caller::Anonymous, &TrailContent::new(query)))
            .expect("create should succeed");
    }

    let recent = db
        .rt
        .block_on(db.repo.list_recent(&Caller::Anonymous, 2))
        .expect("listing should succeed");
    let queries: Vec<&str> = recent.iter().map(|trail| trail.query()).collect();

    assert_eq!(queries, vec!["third", "second"]);
}

#[rstest]
fn service_end_to_end_over_postgres(test_database: TestDatabase) {
    let db = test_database;
    let config = TrailsConfig::from_toml_str(&format!(
        "[database]\nurl = \"{}\"\nmax_connections = 2\n\n[trails]\nrecent_limit = 5\n",
        db.url
    ))
    .expect("config parses");
    let service = config.postgres_service().expect("service builds");
    assert_eq!(service.recent_limit(), 5);

    let recorded = db
        .rt
        .block_on(service.record(&Caller::Anonymous, TrailContent::new("rust vs go")))
        .expect("record should succeed");
    db.rt
        .block_on(service.annotate(
            &Caller::principal(Uuid::new_v4()),
            recorded.id(),
            TrailPatch::new()
                .with_synthesis("both compile to native code")
                .with_nodes(json!([{"id": "rust"}, {"id": "go"}])),
        ))
        .expect("annotate should succeed");
    let listed = db
        .rt
        .block_on(service.list_recent(&Caller::principal(Uuid::new_v4())))
        .expect("listing should succeed");

    let first = listed.first().expect("one trail listed");
    assert_eq!(first.id(), recorded.id());
    assert_eq!(first.synthesis(), Some("both compile to native code"));

    db.rt
        .block_on(service.delete(&Caller::Anonymous, recorded.id()))
        .expect("delete should succeed");
    let gone = db
        .rt
        .block_on(service.find(&Caller::Anonymous, recorded.id()))
        .expect("lookup should succeed");
    assert!(gone.is_none());
}
