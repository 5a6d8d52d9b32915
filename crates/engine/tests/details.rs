use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{CreateDocumentCmd, DetailInput, Document, Engine, EngineError, Money};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn money(value: &str) -> Money {
    value.parse().unwrap()
}

async fn new_document(engine: &Engine, number: &str, details: &[(&str, &str)]) -> Document {
    let mut cmd = CreateDocumentCmd::new(number);
    for (name, sum) in details {
        cmd = cmd.detail(DetailInput::new(*name, money(sum)));
    }
    engine.create_document(cmd).await.unwrap()
}

async fn assert_consistent(engine: &Engine, document_id: i64) -> Document {
    let doc = engine.document_with_details(document_id).await.unwrap();
    assert_eq!(doc.details_sum(), Some(doc.total_sum));
    doc
}

#[tokio::test]
async fn create_remove_update_walkthrough() {
    let (engine, _db) = engine_with_db().await;
    let doc = new_document(&engine, "DOC-1", &[("Item A", "100"), ("Item B", "200")]).await;
    assert_eq!(doc.total_sum, money("300"));

    let item_a = doc.details[0].id;
    let item_b = doc.details[1].id;

    engine.remove_detail(doc.id, item_a).await.unwrap();
    let doc = assert_consistent(&engine, doc.id).await;
    assert_eq!(doc.total_sum, money("200"));
    assert_eq!(doc.details.len(), 1);

    let updated = engine
        .update_detail(doc.id, item_b, DetailInput::new("Item B", money("250")))
        .await
        .unwrap();
    assert_eq!(updated.id, item_b);
    assert_eq!(updated.item_sum, Some(money("250")));

    let doc = assert_consistent(&engine, doc.id).await;
    assert_eq!(doc.total_sum, money("250"));
}

#[tokio::test]
async fn add_then_remove_returns_total_to_zero() {
    let (engine, _db) = engine_with_db().await;
    let doc = new_document(&engine, "DOC-200", &[]).await;

    let detail = engine
        .add_detail(doc.id, DetailInput::new("Item A", money("100")))
        .await
        .unwrap();
    assert!(detail.id > 0);
    assert_eq!(detail.document_id, doc.id);

    let loaded = assert_consistent(&engine, doc.id).await;
    assert_eq!(loaded.total_sum, money("100"));
    assert_eq!(loaded.details, vec![detail.clone()]);

    engine.remove_detail(doc.id, detail.id).await.unwrap();
    let loaded = assert_consistent(&engine, doc.id).await;
    assert_eq!(loaded.total_sum, Money::ZERO);
    assert!(loaded.details.is_empty());
}

#[tokio::test]
async fn update_detail_moves_total_by_difference() {
    let (engine, _db) = engine_with_db().await;
    let doc = new_document(
        &engine,
        "DOC-201",
        &[("Other 1", "10"), ("Item C", "300"), ("Other 2", "20.25")],
    )
    .await;
    let before = doc.total_sum;
    let item_c = doc.details[1].id;

    let updated = engine
        .update_detail(doc.id, item_c, DetailInput::new("Item C Updated", money("500")))
        .await
        .unwrap();
    assert_eq!(updated.item_name, "Item C Updated");

    let doc = assert_consistent(&engine, doc.id).await;
    assert_eq!(doc.total_sum, before.checked_add(money("200")).unwrap());
    assert_eq!(doc.details.len(), 3);
}

#[tokio::test]
async fn unpriced_details_count_as_zero() {
    let (engine, _db) = engine_with_db().await;
    let doc = new_document(&engine, "DOC-1", &[("Item A", "40")]).await;

    let free = engine
        .add_detail(doc.id, DetailInput::unpriced("Free"))
        .await
        .unwrap();
    assert_eq!(free.item_sum, None);
    assert_eq!(assert_consistent(&engine, doc.id).await.total_sum, money("40"));

    engine
        .update_detail(doc.id, free.id, DetailInput::new("Free", money("2")))
        .await
        .unwrap();
    assert_eq!(assert_consistent(&engine, doc.id).await.total_sum, money("42"));

    let item_a = doc.details[0].id;
    let cleared = engine
        .update_detail(doc.id, item_a, DetailInput::unpriced("Item A"))
        .await
        .unwrap();
    assert_eq!(cleared.item_sum, None);
    assert_eq!(assert_consistent(&engine, doc.id).await.total_sum, money("2"));
}

#[tokio::test]
async fn single_detail_changes_do_not_rescan_the_collection() {
    let (engine, db) = engine_with_db().await;
    let doc = new_document(&engine, "DOC-1", &[("Item A", "100")]).await;

    // Put the stored total out of step with the details on purpose.
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE documents SET total_sum_minor = ? WHERE id = ?",
        vec![100_000i64.into(), doc.id.into()],
    ))
    .await
    .unwrap();

    engine
        .add_detail(doc.id, DetailInput::new("Item B", money("1")))
        .await
        .unwrap();
    let loaded = engine.document_with_details(doc.id).await.unwrap();
    assert_eq!(loaded.total_sum, money("1001"));
}

#[tokio::test]
async fn missing_document_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let missing = EngineError::NotFound("404".to_string());

    assert_eq!(
        engine
            .add_detail(404, DetailInput::new("Item", money("1")))
            .await
            .unwrap_err(),
        missing
    );
    assert_eq!(engine.remove_detail(404, 1).await.unwrap_err(), missing);
    assert_eq!(
        engine
            .update_detail(404, 1, DetailInput::new("Item", money("1")))
            .await
            .unwrap_err(),
        missing
    );
    assert_eq!(engine.detail(404, 1).await.unwrap_err(), missing);
}

#[tokio::test]
async fn missing_detail_is_detail_not_found() {
    let (engine, _db) = engine_with_db().await;
    let doc = new_document(&engine, "DOC-1", &[("Item A", "100")]).await;
    let other = new_document(&engine, "DOC-2", &[("Item X", "5")]).await;
    let foreign = other.details[0].id;

    assert_eq!(
        engine.remove_detail(doc.id, 9_999).await.unwrap_err(),
        EngineError::DetailNotFound("9999".to_string())
    );
    assert_eq!(
        engine
            .update_detail(doc.id, foreign, DetailInput::new("Stolen", money("1")))
            .await
            .unwrap_err(),
        EngineError::DetailNotFound(foreign.to_string())
    );
    assert_eq!(
        engine.detail(doc.id, foreign).await.unwrap_err(),
        EngineError::DetailNotFound(foreign.to_string())
    );

    assert_eq!(assert_consistent(&engine, doc.id).await.total_sum, money("100"));
    assert_eq!(assert_consistent(&engine, other.id).await.total_sum, money("5"));
}

#[tokio::test]
async fn detail_lookup_returns_owned_detail() {
    let (engine, _db) = engine_with_db().await;
    let doc = new_document(&engine, "DOC-1", &[("Item A", "1.99")]).await;

    let found = engine.detail(doc.id, doc.details[0].id).await.unwrap();
    assert_eq!(found, doc.details[0]);
}

#[tokio::test]
async fn blank_item_name_is_rejected_and_total_kept() {
    let (engine, _db) = engine_with_db().await;
    let doc = new_document(&engine, "DOC-1", &[("Item A", "10")]).await;

    let err = engine
        .add_detail(doc.id, DetailInput::new("  ", money("5")))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("item name must not be empty".to_string())
    );

    let err = engine
        .update_detail(doc.id, doc.details[0].id, DetailInput::new("", money("5")))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("item name must not be empty".to_string())
    );

    let loaded = assert_consistent(&engine, doc.id).await;
    assert_eq!(loaded, doc);
}
