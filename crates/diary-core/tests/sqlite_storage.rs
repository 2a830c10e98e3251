use chrono::{TimeZone, Utc};
use uuid::Uuid;

use diary_core::storage::{
    Diary, DiaryFilter, DiaryRecordStore, Importance, NewTask, NewUser, NotificationSettings,
    NotificationSettingsStore, SqliteStorage, StorageEngine, TaskFilter, TaskStore,
    UserCredentialStore,
};
use diary_core::DiaryError;

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.to_string(),
        email: Some(format!("{}@example.com", name)),
        hashed_password: "$argon2id$v=19$fixture".to_string(),
        diary_encryption_salt: "AAAAAAAAAAAAAAAAAAAAAA==".to_string(),
    }
}

fn diary_on(owner_id: Uuid, day: u32, content: &str) -> Diary {
    let date = Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap();
    Diary {
        id: Uuid::new_v4(),
        owner_id,
        title: None,
        content: content.to_string(),
        is_encrypted: false,
        entry_date: date,
        daily_rating: None,
        created_at: date,
        updated_at: None,
    }
}

#[test]
fn test_file_database_persists_across_opens() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("diary.db");

    let user_id = {
        let storage = SqliteStorage::open(&path).expect("open should succeed");
        let user = storage.create_user(&new_user("alice")).expect("create user");
        storage
            .insert_diary(&diary_on(user.id, 1, "kept"))
            .expect("insert diary");
        user.id
    };

    let storage = SqliteStorage::open(&path).expect("reopen should succeed");
    let diaries = storage.all_diaries(&user_id).expect("list");
    assert_eq!(diaries.len(), 1);
    assert_eq!(diaries[0].content, "kept");
    storage.check_integrity().expect("integrity");
}

#[test]
fn test_duplicate_username_and_email_conflict() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.create_user(&new_user("alice")).unwrap();

    let err = storage.create_user(&new_user("alice")).unwrap_err();
    assert!(matches!(err, DiaryError::Conflict(_)));

    let mut same_email = new_user("alice2");
    same_email.email = Some("ALICE@example.com".to_string());
    let err = storage.create_user(&same_email).unwrap_err();
    assert!(matches!(err, DiaryError::Conflict(_)));
}

#[test]
fn test_user_lookups_and_credentials() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let user = storage.create_user(&new_user("bob")).unwrap();

    let by_name = storage.get_user_by_username("bob").unwrap().unwrap();
    assert_eq!(by_name.id, user.id);
    let by_email = storage
        .get_user_by_email("Bob@Example.com")
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);
    assert!(storage.get_user_by_username("nobody").unwrap().is_none());

    let creds = storage.get_user_credentials(&user.id).unwrap();
    assert_eq!(creds.diary_encryption_salt, "AAAAAAAAAAAAAAAAAAAAAA==");

    let err = storage.get_user_credentials(&Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, DiaryError::UserNotFound(_)));
}

#[test]
fn test_diary_rows_are_owner_scoped() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let alice = storage.create_user(&new_user("alice")).unwrap();
    let mallory = storage.create_user(&new_user("mallory")).unwrap();

    let diary = diary_on(alice.id, 2, "mine");
    storage.insert_diary(&diary).unwrap();

    assert!(storage.get_diary(&diary.id, &alice.id).unwrap().is_some());
    assert!(storage.get_diary(&diary.id, &mallory.id).unwrap().is_none());
    assert!(!storage.delete_diary(&diary.id, &mallory.id).unwrap());

    let mut stolen = diary.clone();
    stolen.owner_id = mallory.id;
    let err = storage.save_diary(&stolen).unwrap_err();
    assert!(matches!(err, DiaryError::RecordNotFound(_)));

    assert!(storage.delete_diary(&diary.id, &alice.id).unwrap());
    assert!(storage.get_diary(&diary.id, &alice.id).unwrap().is_none());
}

#[test]
fn test_diary_round_trip_preserves_fields() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let user = storage.create_user(&new_user("carol")).unwrap();

    let mut diary = diary_on(user.id, 3, "body");
    diary.title = Some("Friday".to_string());
    diary.daily_rating = Some("4".to_string());
    diary.entry_date = Utc::now();
    storage.insert_diary(&diary).unwrap();

    let loaded = storage.get_diary(&diary.id, &user.id).unwrap().unwrap();
    assert_eq!(loaded, diary);
}

#[test]
fn test_list_filters_by_inclusive_date_range_and_pages() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let user = storage.create_user(&new_user("dave")).unwrap();

    for day in [5, 1, 3, 2, 4] {
        storage
            .insert_diary(&diary_on(user.id, day, &format!("day {}", day)))
            .unwrap();
    }

    let all = storage
        .list_diaries(&user.id, &DiaryFilter::default())
        .unwrap();
    let contents: Vec<_> = all.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, ["day 1", "day 2", "day 3", "day 4", "day 5"]);

    let ranged = storage
        .list_diaries(
            &user.id,
            &DiaryFilter::new()
                .since(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap())
                .until(Utc.with_ymd_and_hms(2024, 5, 4, 9, 0, 0).unwrap()),
        )
        .unwrap();
    assert_eq!(ranged.len(), 3);

    let page = storage
        .list_diaries(&user.id, &DiaryFilter::new().skip(1).limit(2))
        .unwrap();
    let contents: Vec<_> = page.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, ["day 2", "day 3"]);
}

#[test]
fn test_oversized_title_rejected() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let user = storage.create_user(&new_user("erin")).unwrap();
    let mut diary = diary_on(user.id, 1, "x");
    diary.title = Some("t".repeat(300));

    let err = storage.insert_diary(&diary).unwrap_err();
    assert!(matches!(err, DiaryError::Validation(_)));
}

#[test]
fn test_tasks_order_and_filters() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let user = storage.create_user(&new_user("frank")).unwrap();

    let undated = storage
        .insert_task(&user.id, &NewTask::new("someday"))
        .unwrap();
    let later = storage
        .insert_task(
            &user.id,
            &NewTask::new("later")
                .with_importance(Importance::High)
                .with_due_date(Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap()),
        )
        .unwrap();
    let sooner = storage
        .insert_task(
            &user.id,
            &NewTask::new("sooner").with_due_date(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
        )
        .unwrap();

    let ids: Vec<_> = storage
        .list_tasks(&user.id, &TaskFilter::default())
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, [sooner.id, later.id, undated.id]);

    let high = storage
        .list_tasks(&user.id, &TaskFilter::new().importance(Importance::High))
        .unwrap();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].id, later.id);

    let mut done = sooner.clone();
    done.completed = true;
    storage.save_task(&done).unwrap();
    let completed = storage
        .list_tasks(&user.id, &TaskFilter::new().completed(true))
        .unwrap();
    assert_eq!(completed.len(), 1);

    assert!(storage.delete_task(&undated.id, &user.id).unwrap());
    assert!(storage.get_task(&undated.id, &user.id).unwrap().is_none());
}

#[test]
fn test_notification_settings_upsert() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let user = storage.create_user(&new_user("gina")).unwrap();

    assert!(storage.get_notification_settings(&user.id).unwrap().is_none());

    let mut settings = NotificationSettings::disabled(user.id);
    settings.telegram_enabled = true;
    settings.telegram_chat_id = Some("42".to_string());
    storage.upsert_notification_settings(&settings).unwrap();

    settings.email_enabled = true;
    settings.email_address = Some("gina@example.com".to_string());
    storage.upsert_notification_settings(&settings).unwrap();

    let loaded = storage.get_notification_settings(&user.id).unwrap().unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_email_notifications_need_address() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let user = storage.create_user(&new_user("hank")).unwrap();

    let mut settings = NotificationSettings::disabled(user.id);
    settings.email_enabled = true;
    let err = storage.upsert_notification_settings(&settings).unwrap_err();
    assert!(matches!(err, DiaryError::Validation(_)));
}
