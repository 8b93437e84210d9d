use imagegen_core::NewHistoryEntry;
use imagegen_engine::{AuthSession, HistoryStore, Identity, InMemoryHistoryStore, StoreError};

fn identity(user_id: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        email: None,
        access_token: format!("token-{user_id}"),
    }
}

fn entry(owner: &str, prompt: &str) -> NewHistoryEntry {
    NewHistoryEntry {
        prompt: prompt.to_string(),
        image_ref: format!("https://cdn/{prompt}.png"),
        owner_id: Some(owner.to_string()),
    }
}

#[tokio::test]
async fn select_is_newest_first_limited_and_owner_scoped() {
    let auth = AuthSession::anonymous();
    let store = InMemoryHistoryStore::new(auth.clone());

    auth.set(Some(identity("u1")));
    for prompt in ["one", "two", "three"] {
        store.insert(entry("u1", prompt)).await.unwrap();
    }
    auth.set(Some(identity("u2")));
    store.insert(entry("u2", "other")).await.unwrap();

    auth.set(Some(identity("u1")));
    let rows = store.select_recent(Some("u1"), Some(2)).await.unwrap();
    let prompts: Vec<_> = rows.iter().map(|row| row.prompt.as_str()).collect();
    assert_eq!(prompts, vec!["three", "two"]);
    assert!(rows[0].created_at > rows[1].created_at);

    // Reading someone else's rows yields nothing.
    assert!(store.select_recent(Some("u2"), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_for_another_owner_is_forbidden() {
    let auth = AuthSession::anonymous();
    auth.set(Some(identity("u1")));
    let store = InMemoryHistoryStore::new(auth.clone());

    let err = store.insert(entry("u2", "sneaky")).await.unwrap_err();
    assert_eq!(err, StoreError::Forbidden);

    auth.set(Some(identity("u2")));
    assert!(store.select_recent(Some("u2"), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_is_idempotent_and_cannot_touch_other_owners() {
    let auth = AuthSession::anonymous();
    let store = InMemoryHistoryStore::new(auth.clone());

    auth.set(Some(identity("u1")));
    let mine = store.insert(entry("u1", "mine")).await.unwrap();
    auth.set(Some(identity("u2")));
    let theirs = store.insert(entry("u2", "theirs")).await.unwrap();

    auth.set(Some(identity("u1")));
    store.delete_by_id(&theirs.id).await.unwrap();
    store.delete_by_id(&mine.id).await.unwrap();
    store.delete_by_id(&mine.id).await.unwrap();
    assert!(store.select_recent(Some("u1"), None).await.unwrap().is_empty());

    auth.set(Some(identity("u2")));
    let remaining = store.select_recent(Some("u2"), None).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, theirs.id);
}

#[tokio::test]
async fn anonymous_rows_have_no_owner() {
    let store = InMemoryHistoryStore::new(AuthSession::anonymous());
    let row = store
        .insert(NewHistoryEntry {
            prompt: "p".to_string(),
            image_ref: "i".to_string(),
            owner_id: None,
        })
        .await
        .unwrap();
    assert_eq!(row.owner_id, None);
    assert_eq!(store.select_recent(None, None).await.unwrap(), vec![row]);
}
