use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Attachment, DatabasePersistence, Employee, EmployeeDraft, EngineError, IncomingLetter,
    IncomingLetterDraft, LocalObjectStorage, MoneyCents, Ordering, OutgoingLetter,
    OutgoingLetterDraft, PersistenceError, Query, RecordStore, Transaction, TransactionDraft,
    accounts::{Accounts, Registration},
    attachments::resolve_storage_path,
    ledger,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn store_with_files() -> (RecordStore, tempfile::TempDir) {
    let files = tempfile::tempdir().unwrap();
    let store = RecordStore::builder()
        .persistence(Arc::new(DatabasePersistence::new(database().await)))
        .storage(Arc::new(LocalObjectStorage::new(
            files.path(),
            "http://localhost:3000",
        )))
        .build()
        .unwrap();
    (store, files)
}

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

fn letter(number: &str, day: &str) -> IncomingLetterDraft {
    IncomingLetterDraft {
        letter_number: number.to_string(),
        sender: "Dinas Kesehatan".to_string(),
        date: date(day),
        subject: "Undangan".to_string(),
    }
}

#[tokio::test]
async fn letters_round_trip_through_sqlite_and_disk() {
    let (store, files) = store_with_files().await;
    let scan = Attachment::new("scan.pdf", b"%PDF".to_vec());

    let created: IncomingLetter = store
        .create(letter("001/2024", "2024-01-02"), Some(scan))
        .await
        .unwrap();
    store
        .create::<IncomingLetter>(letter("002/2024", "2024-03-04"), None)
        .await
        .unwrap();

    let url = created.file_url.clone().unwrap();
    let path = resolve_storage_path("documents", &url).unwrap();
    assert!(path.starts_with("incoming-letters/"));
    assert!(files.path().join("documents").join(&path).exists());

    let listed: Vec<IncomingLetter> = store.list(None).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].letter_number, "002/2024");
    assert_eq!(listed[1], created);

    store.remove::<IncomingLetter>(created.id).await.unwrap();
    assert!(!files.path().join("documents").join(&path).exists());
    assert_eq!(store.count::<IncomingLetter>().await.unwrap(), 1);
}

#[tokio::test]
async fn update_preserves_attachment_and_creation_time() {
    let (store, _files) = store_with_files().await;
    let draft = OutgoingLetterDraft {
        letter_number: "010/OUT".to_string(),
        recipient: "Camat".to_string(),
        date: date("2024-06-01"),
        subject: "Laporan".to_string(),
    };
    let created: OutgoingLetter = store
        .create(draft.clone(), Some(Attachment::new("laporan.pdf", vec![7])))
        .await
        .unwrap();

    let updated: OutgoingLetter = store
        .update(
            created.id,
            OutgoingLetterDraft {
                subject: "Laporan akhir".to_string(),
                ..draft
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(updated.subject, "Laporan akhir");
    assert_eq!(updated.file_url, created.file_url);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.id, created.id);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (store, _files) = store_with_files().await;
    let id = Uuid::new_v4();

    let err = store
        .update::<Employee>(
            id,
            EmployeeDraft {
                name: "Ani".to_string(),
                badge_number: "1".to_string(),
                job_title: "Staf".to_string(),
                work_unit: "Umum".to_string(),
                contact: "ani@kantor.go.id".to_string(),
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(store.remove::<Employee>(id).await.unwrap_err().is_not_found());
    assert_eq!(store.find::<Employee>(id).await.unwrap(), None);
}

#[tokio::test]
async fn transactions_filter_and_summarize() {
    let (store, _files) = store_with_files().await;
    for (day, category, amount) in [
        ("2024-01-05", "income", "100000"),
        ("2024-01-20", "pengeluaran", "40000"),
        ("2024-02-01", "income", "50000.25"),
    ] {
        let draft = TransactionDraft::parse(day, category, amount, "kas kantor").unwrap();
        store.create::<Transaction>(draft, None).await.unwrap();
    }

    let all: Vec<Transaction> = store.list(None).await.unwrap();
    assert_eq!(all.len(), 3);
    let total = ledger::summarize(&all);
    assert_eq!(total.income, MoneyCents::new(15_000_025));
    assert_eq!(total.balance, total.income - total.expense);

    let january = ledger::summary_for_month(&all, "2024-01");
    assert_eq!(january.balance, MoneyCents::from_units(60_000));

    let expenses: Vec<Transaction> = store
        .query(Query::ordered(Ordering::asc("date")).eq("category", "expense"))
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount_minor, MoneyCents::from_units(40_000));
}

#[tokio::test]
async fn unknown_order_column_is_rejected_by_the_database() {
    let (store, _files) = store_with_files().await;
    let err = store
        .list::<Employee>(Some(Ordering::asc("salary")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Persistence(PersistenceError::UnknownColumn(_))
    ));
}

#[tokio::test]
async fn overview_over_sqlite() {
    let (store, _files) = store_with_files().await;
    store
        .create::<IncomingLetter>(letter("001", "2024-01-01"), None)
        .await
        .unwrap();

    let overview = store.overview().await.unwrap();
    assert_eq!(overview.incoming_letters, 1);
    assert_eq!(overview.recent_activity.len(), 1);
    assert_eq!(overview.recent_activity[0].description, "Undangan");
}

#[tokio::test]
async fn accounts_register_and_authenticate() {
    let accounts = Accounts::new(database().await);
    let form = Registration {
        email: "Admin@Kantor.go.id".to_string(),
        password: "rahasia".to_string(),
        confirm_password: "rahasia".to_string(),
    };

    accounts.register(&form).await.unwrap();
    assert!(matches!(
        accounts.register(&form).await,
        Err(EngineError::Conflict(_))
    ));

    assert!(accounts.authenticate("admin@kantor.go.id", "rahasia").await.unwrap());
    assert!(!accounts.authenticate("admin@kantor.go.id", "salah").await.unwrap());
    assert!(!accounts.authenticate("nobody@kantor.go.id", "rahasia").await.unwrap());
}
