use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use engine::{
    Archive, ArchiveDraft, Attachment, Category, Collection, Employee, EmployeeDraft, EngineError,
    IncomingLetter, IncomingLetterDraft, MemoryObjectStorage, MemoryPersistence, MoneyCents,
    ObjectStorage, Ordering, Persistence, PersistenceError, Query, RecordStore, Transaction,
    TransactionDraft,
    attachments::resolve_storage_path, ledger, search_default,
};
use uuid::Uuid;

struct Harness {
    store: RecordStore,
    persistence: Arc<MemoryPersistence>,
    storage: Arc<MemoryObjectStorage>,
}

fn harness_with(best_effort_cleanup: bool) -> Harness {
    let persistence = Arc::new(MemoryPersistence::new());
    let storage = Arc::new(MemoryObjectStorage::new("http://files.test"));
    let store = RecordStore::builder()
        .persistence(persistence.clone())
        .storage(storage.clone())
        .best_effort_cleanup(best_effort_cleanup)
        .build()
        .unwrap();
    Harness {
        store,
        persistence,
        storage,
    }
}

fn harness() -> Harness {
    harness_with(true)
}

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

fn employee(name: &str) -> EmployeeDraft {
    EmployeeDraft {
        name: name.to_string(),
        badge_number: "198501012010011001".to_string(),
        job_title: "Analis".to_string(),
        work_unit: "Sekretariat".to_string(),
        contact: "0812000000".to_string(),
    }
}

fn archive(title: &str) -> ArchiveDraft {
    ArchiveDraft {
        title: title.to_string(),
        document_type: "SK".to_string(),
        date: date("2024-03-01"),
        notes: "rak 2".to_string(),
    }
}

fn pdf(name: &str) -> Attachment {
    Attachment::new(name, b"%PDF-1.7".to_vec()).with_content_type("application/pdf")
}

#[tokio::test]
async fn create_then_list_keeps_fields_and_assigns_id() {
    let h = harness();
    let created: Employee = h.store.create(employee("Budi"), None).await.unwrap();

    assert_eq!(created.name, "Budi");
    assert_eq!(created.photo_url, None);

    let listed: Vec<Employee> = h.store.list(None).await.unwrap();
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn create_uploads_attachment_into_slot_folder() {
    let h = harness();
    let photo = Attachment::new("budi.PNG", vec![1, 2, 3]);
    let created: Employee = h.store.create(employee("Budi"), Some(photo)).await.unwrap();

    let url = created.photo_url.unwrap();
    assert!(url.starts_with("http://files.test/storage/v1/object/public/photos/employees/"));
    assert!(url.ends_with(".PNG"));

    let path = resolve_storage_path("photos", &url).unwrap();
    assert_eq!(h.storage.get("photos", &path).await, Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn failed_upload_never_inserts() {
    let h = harness();
    h.storage.fail_uploads(true);

    let err = h
        .store
        .create::<Archive>(archive("SK Mutasi"), Some(pdf("sk.pdf")))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Upload(_)));
    assert_eq!(h.store.count::<Archive>().await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_drafts_fail_before_any_upload() {
    let h = harness();

    let err = h
        .store
        .create::<Archive>(archive("  "), Some(pdf("sk.pdf")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = h
        .store
        .create::<Archive>(archive("SK"), Some(pdf("sk.docx")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let draft = TransactionDraft::parse("2024-01-05", "income", "10", "Dana").unwrap();
    let err = h
        .store
        .create::<Transaction>(draft, Some(pdf("nota.pdf")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert!(h.storage.is_empty().await);
    assert_eq!(h.persistence.count(Collection::Archives).await.unwrap(), 0);
}

#[tokio::test]
async fn update_without_attachment_keeps_reference() {
    let h = harness();
    let created: Archive = h.store.create(archive("SK"), Some(pdf("sk.pdf"))).await.unwrap();

    let updated: Archive = h
        .store
        .update(created.id, archive("SK revisi"), None)
        .await
        .unwrap();

    assert_eq!(updated.title, "SK revisi");
    assert_eq!(updated.file_url, created.file_url);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(h.storage.len().await, 1);
}

#[tokio::test]
async fn update_with_attachment_replaces_old_object() {
    let h = harness();
    let created: Archive = h.store.create(archive("SK"), Some(pdf("v1.pdf"))).await.unwrap();
    let old_path = resolve_storage_path("documents", created.file_url.as_deref().unwrap()).unwrap();

    let updated: Archive = h
        .store
        .update(created.id, archive("SK"), Some(pdf("v2.pdf")))
        .await
        .unwrap();

    assert_ne!(updated.file_url, created.file_url);
    assert_eq!(h.storage.get("documents", &old_path).await, None);
    assert_eq!(h.storage.len().await, 1);
}

#[tokio::test]
async fn update_unknown_id_is_not_found_and_uploads_nothing() {
    let h = harness();
    let err = h
        .store
        .update::<Archive>(Uuid::new_v4(), archive("SK"), Some(pdf("sk.pdf")))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(h.storage.is_empty().await);
}

#[tokio::test]
async fn remove_discards_attachment_then_record() {
    let h = harness();
    let created: Archive = h.store.create(archive("SK"), Some(pdf("sk.pdf"))).await.unwrap();

    h.store.remove::<Archive>(created.id).await.unwrap();

    assert!(h.storage.is_empty().await);
    assert_eq!(h.store.find::<Archive>(created.id).await.unwrap(), None);
    assert!(h.store.remove::<Archive>(created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn remove_with_malformed_reference_still_deletes() {
    let h = harness();
    let row = json!({
        "title": "Lama",
        "document_type": "SK",
        "date": "2020-01-01",
        "notes": "",
        "file_url": "https://elsewhere.test/lama.pdf",
    });
    let serde_json::Value::Object(row) = row else {
        unreachable!()
    };
    let stored = h.persistence.insert(Collection::Archives, row).await.unwrap();
    let id = Uuid::parse_str(stored["id"].as_str().unwrap()).unwrap();

    h.store.remove::<Archive>(id).await.unwrap();
    assert_eq!(h.store.count::<Archive>().await.unwrap(), 0);
}

#[tokio::test]
async fn storage_failure_on_remove_follows_cleanup_policy() {
    let lenient = harness();
    let created: Archive = lenient
        .store
        .create(archive("SK"), Some(pdf("sk.pdf")))
        .await
        .unwrap();
    lenient.storage.fail_removals(true);
    lenient.store.remove::<Archive>(created.id).await.unwrap();
    assert_eq!(lenient.store.count::<Archive>().await.unwrap(), 0);

    let strict = harness_with(false);
    let created: Archive = strict
        .store
        .create(archive("SK"), Some(pdf("sk.pdf")))
        .await
        .unwrap();
    strict.storage.fail_removals(true);
    let err = strict.store.remove::<Archive>(created.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Storage(_)));
    assert_eq!(strict.store.count::<Archive>().await.unwrap(), 1);
}

#[tokio::test]
async fn failed_cleanup_of_replaced_attachment_keeps_the_update() {
    let h = harness_with(false);
    let created: Archive = h.store.create(archive("SK"), Some(pdf("v1.pdf"))).await.unwrap();
    let old_url = created.file_url.clone().unwrap();
    let old_path = resolve_storage_path("documents", &old_url).unwrap();

    h.storage.fail_removals(true);
    let updated: Archive = h
        .store
        .update(created.id, archive("SK revisi"), Some(pdf("v2.pdf")))
        .await
        .unwrap();

    let found: Archive = h.store.find(created.id).await.unwrap().unwrap();
    assert_eq!(found, updated);
    assert_eq!(found.title, "SK revisi");
    assert_ne!(found.file_url.as_deref(), Some(old_url.as_str()));

    assert!(h.storage.get("documents", &old_path).await.is_some());
    let orphans = h.store.orphaned_objects().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].path, old_path);
}

#[tokio::test]
async fn failed_insert_after_upload_leaves_an_orphan() {
    let h = harness();
    h.persistence.fail_writes(true);

    let err = h
        .store
        .create::<Archive>(archive("SK"), Some(pdf("sk.pdf")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Persistence(PersistenceError::Unavailable(_))
    ));

    assert_eq!(h.store.count::<Archive>().await.unwrap(), 0);
    assert_eq!(h.storage.len().await, 1);
    let orphans = h.store.orphaned_objects().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].bucket, "documents");
    assert!(orphans[0].path.starts_with("archives/"));
    assert!(h.storage.get("documents", &orphans[0].path).await.is_some());
}

#[tokio::test]
async fn failed_update_after_upload_keeps_the_row_and_leaves_an_orphan() {
    let h = harness();
    let created: Archive = h.store.create(archive("SK"), Some(pdf("v1.pdf"))).await.unwrap();
    let old_path = resolve_storage_path("documents", created.file_url.as_deref().unwrap()).unwrap();

    h.persistence.fail_writes(true);
    let err = h
        .store
        .update::<Archive>(created.id, archive("SK revisi"), Some(pdf("v2.pdf")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Persistence(_)));

    let found: Archive = h.store.find(created.id).await.unwrap().unwrap();
    assert_eq!(found, created);
    assert!(h.storage.get("documents", &old_path).await.is_some());

    let orphans = h.store.orphaned_objects().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_ne!(orphans[0].path, old_path);
}

#[tokio::test]
async fn list_uses_default_or_requested_order() {
    let h = harness();
    for name in ["Citra", "Ani", "Budi"] {
        h.store.create::<Employee>(employee(name), None).await.unwrap();
    }

    let names = |records: Vec<Employee>| records.into_iter().map(|e| e.name).collect::<Vec<_>>();
    assert_eq!(names(h.store.list(None).await.unwrap()), ["Ani", "Budi", "Citra"]);
    assert_eq!(
        names(h.store.list(Some(Ordering::desc("name"))).await.unwrap()),
        ["Citra", "Budi", "Ani"]
    );

    let err = h
        .store
        .list::<Employee>(Some(Ordering::asc("name; --")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = h
        .store
        .list::<Employee>(Some(Ordering::asc("salary")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Persistence(PersistenceError::UnknownColumn(_))
    ));
}

#[tokio::test]
async fn month_summary_over_stored_ledger() {
    let h = harness();
    for (day, category, amount) in [
        ("2024-01-05", "income", "100000"),
        ("2024-01-20", "expense", "40000"),
        ("2024-02-01", "income", "50000"),
    ] {
        let draft = TransactionDraft::parse(day, category, amount, "kas").unwrap();
        h.store.create::<Transaction>(draft, None).await.unwrap();
    }

    let transactions: Vec<Transaction> = h.store.list(None).await.unwrap();
    assert_eq!(transactions[0].date, date("2024-02-01"));

    let january = ledger::summary_for_month(&transactions, "2024-01");
    assert_eq!(january.income, MoneyCents::from_units(100_000));
    assert_eq!(january.expense, MoneyCents::from_units(40_000));
    assert_eq!(january.balance, MoneyCents::from_units(60_000));

    let incomes: Vec<Transaction> = h
        .store
        .query(Query::default().eq("category", Category::Income.as_str()))
        .await
        .unwrap();
    assert_eq!(incomes.len(), 2);
}

#[tokio::test]
async fn search_over_listed_records() {
    let h = harness();
    for (number, sender, subject) in [
        ("001/UND/2024", "Dinas Pendidikan", "Undangan rapat"),
        ("002/PEM/2024", "Kecamatan", "Pemberitahuan"),
    ] {
        let draft = IncomingLetterDraft {
            letter_number: number.to_string(),
            sender: sender.to_string(),
            date: date("2024-04-01"),
            subject: subject.to_string(),
        };
        h.store.create::<IncomingLetter>(draft, None).await.unwrap();
    }

    let letters: Vec<IncomingLetter> = h.store.list(None).await.unwrap();
    assert_eq!(search_default(&letters, "").len(), 2);

    let found = search_default(&letters, "dinas");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].letter_number, "001/UND/2024");
}

#[tokio::test]
async fn orphaned_objects_are_reported_and_pruned() {
    let h = harness();
    let kept: Archive = h.store.create(archive("SK"), Some(pdf("sk.pdf"))).await.unwrap();
    h.storage
        .upload("documents", "archives/stray.pdf", vec![0], None)
        .await
        .unwrap();

    let orphans = h.store.orphaned_objects().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].bucket, "documents");
    assert_eq!(orphans[0].path, "archives/stray.pdf");

    assert_eq!(h.store.prune_orphans().await.unwrap(), orphans);
    assert!(h.store.orphaned_objects().await.unwrap().is_empty());

    let path = resolve_storage_path("documents", kept.file_url.as_deref().unwrap()).unwrap();
    assert!(h.storage.get("documents", &path).await.is_some());
}

#[tokio::test]
async fn overview_counts_and_recent_letters() {
    let h = harness();
    h.store.create::<Employee>(employee("Ani"), None).await.unwrap();
    for i in 0..7 {
        let draft = IncomingLetterDraft {
            letter_number: format!("{i:03}/2024"),
            sender: "Bupati".to_string(),
            date: date("2024-05-01"),
            subject: format!("Perihal {i}"),
        };
        h.store.create::<IncomingLetter>(draft, None).await.unwrap();
    }
    let draft = TransactionDraft::parse("2024-05-02", "expense", "2500,50", "ATK").unwrap();
    h.store.create::<Transaction>(draft, None).await.unwrap();

    let overview = h.store.overview().await.unwrap();
    assert_eq!(overview.employees, 1);
    assert_eq!(overview.incoming_letters, 7);
    assert_eq!(overview.outgoing_letters, 0);
    assert_eq!(overview.archives, 0);
    assert_eq!(overview.ledger.expense, MoneyCents::new(250_050));
    assert_eq!(overview.ledger.balance, MoneyCents::new(-250_050));
    assert_eq!(overview.recent_activity.len(), 5);
    assert!(
        overview
            .recent_activity
            .windows(2)
            .all(|pair| pair[0].at >= pair[1].at)
    );
}

#[tokio::test]
async fn builder_requires_both_capabilities() {
    let err = RecordStore::builder()
        .persistence(Arc::new(MemoryPersistence::new()))
        .build()
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig(_)));
}
