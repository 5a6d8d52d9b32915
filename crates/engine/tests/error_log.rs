use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    CreateDocumentCmd, DetailInput, Engine, EngineError, ErrorCategory, ErrorLogRecorder, Money,
};
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

fn file_db_url() -> (String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());
    (url, path)
}

async fn document_count(db: &DatabaseConnection) -> i64 {
    db.query_one(Statement::from_string(
        db.get_database_backend(),
        "SELECT COUNT(*) AS count FROM documents",
    ))
    .await
    .unwrap()
    .unwrap()
    .try_get::<i64>("", "count")
    .unwrap()
}

#[tokio::test]
async fn failures_are_logged_with_their_category() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_document(CreateDocumentCmd::new("DOC-1"))
        .await
        .unwrap();

    let _ = engine
        .create_document(CreateDocumentCmd::new("DOC-1"))
        .await
        .unwrap_err();
    let _ = engine.document_with_details(42).await.unwrap_err();

    let entries = engine.error_log().entries(10).await.unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].category, ErrorCategory::DocNotFound);
    assert_eq!(entries[0].message, "Document not found: 42");
    assert_eq!(entries[1].category, ErrorCategory::DocNumberDuplicate);
    assert_eq!(
        entries[1].message,
        "Document with number DOC-1 already exists"
    );
    assert!(entries[0].recorded_at >= entries[1].recorded_at);
}

#[tokio::test]
async fn successful_operations_leave_no_entries() {
    let (engine, _db) = engine_with_db().await;
    let doc = engine
        .create_document(
            CreateDocumentCmd::new("DOC-1").detail(DetailInput::new("Item", Money::new(100))),
        )
        .await
        .unwrap();
    engine
        .add_detail(doc.id, DetailInput::unpriced("Free"))
        .await
        .unwrap();
    engine.documents().await.unwrap();

    assert!(engine.error_log().entries(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn detail_and_validation_failures_are_logged() {
    let (engine, _db) = engine_with_db().await;
    let doc = engine
        .create_document(CreateDocumentCmd::new("DOC-1"))
        .await
        .unwrap();

    let _ = engine.remove_detail(doc.id, 77).await.unwrap_err();
    let _ = engine
        .add_detail(doc.id, DetailInput::unpriced(""))
        .await
        .unwrap_err();

    let categories: Vec<_> = engine
        .error_log()
        .entries(10)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.category)
        .collect();
    assert_eq!(
        categories,
        [ErrorCategory::Validation, ErrorCategory::DetailNotFound]
    );
}

#[tokio::test]
async fn entries_are_limited_newest_first() {
    let (engine, _db) = engine_with_db().await;
    for id in 1..=5 {
        let _ = engine.delete_document(id).await.unwrap_err();
    }

    let entries = engine.error_log().entries(3).await.unwrap();
    let messages: Vec<_> = entries.iter().map(|entry| entry.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "Document not found: 5",
            "Document not found: 4",
            "Document not found: 3"
        ]
    );
}

#[tokio::test]
async fn log_entry_survives_rollback_of_the_failed_operation() {
    let (url, path) = file_db_url();
    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let log_db = Database::connect(&url).await.unwrap();

    let engine = Engine::builder()
        .database(db.clone())
        .error_log(ErrorLogRecorder::new(log_db.clone()))
        .build()
        .await
        .unwrap();

    engine
        .create_document(
            CreateDocumentCmd::new("DOC-1").detail(DetailInput::new("Item A", Money::new(100))),
        )
        .await
        .unwrap();
    let err = engine
        .create_document(
            CreateDocumentCmd::new("DOC-1").detail(DetailInput::new("Item B", Money::new(200))),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::DuplicateKey("DOC-1".to_string()));

    db.close().await.unwrap();
    log_db.close().await.unwrap();

    let reopened = Database::connect(&url).await.unwrap();
    assert_eq!(document_count(&reopened).await, 1);
    let entries = ErrorLogRecorder::new(reopened.clone())
        .entries(10)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].category, ErrorCategory::DocNumberDuplicate);

    reopened.close().await.unwrap();
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn recorder_failure_does_not_mask_the_original_error() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    // No migrations here: every insert into `error_log` fails.
    let broken_log = Database::connect("sqlite::memory:").await.unwrap();

    let engine = Engine::builder()
        .database(db)
        .error_log(ErrorLogRecorder::new(broken_log))
        .build()
        .await
        .unwrap();

    let err = engine.document_with_details(7).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("7".to_string()));

    let err = engine
        .create_document(CreateDocumentCmd::new(""))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("doc number must not be empty".to_string())
    );
}
