use chrono::{TimeZone, Utc};
use imagegen_core::{
    update, AppState, CoreConfig, Effect, HistoryCache, HistoryEntry, HistoryLimit, HistoryQuery,
    Msg, Notification, RefreshOutcome, RemoveOutcome,
};
use pretty_assertions::assert_eq;

fn entry(id: &str, minute: u32) -> HistoryEntry {
    HistoryEntry {
        id: id.to_string(),
        owner_id: Some("u1".to_string()),
        prompt: format!("prompt {id}"),
        image_ref: format!("https://cdn/{id}.png"),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
    }
}

fn ids(cache: &HistoryCache) -> Vec<&str> {
    cache.items().iter().map(|e| e.id.as_str()).collect()
}

fn fetch_query(effects: &[Effect]) -> HistoryQuery {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchHistory(query) => Some(query.clone()),
            _ => None,
        })
        .expect("fetch effect")
}

#[test]
fn refresh_replaces_items_newest_first_within_limit() {
    let mut cache = HistoryCache::new(HistoryLimit::Recent(2));
    let query = cache.begin_refresh(Some("u1".into()));
    assert_eq!(query.limit, HistoryLimit::Recent(2));

    let outcome = cache.apply_refresh(
        query.ticket,
        Ok(vec![entry("old", 1), entry("new", 3), entry("mid", 2)]),
    );
    assert_eq!(outcome, RefreshOutcome::Applied { count: 2 });
    assert_eq!(ids(&cache), vec!["new", "mid"]);
}

#[test]
fn failed_refresh_leaves_items_untouched() {
    let mut cache = HistoryCache::new(HistoryLimit::All);
    let first = cache.begin_refresh(None);
    cache.apply_refresh(first.ticket, Ok(vec![entry("a", 1)]));

    let second = cache.begin_refresh(None);
    let outcome = cache.apply_refresh(second.ticket, Err("timeout".into()));
    assert_eq!(outcome, RefreshOutcome::Failed("timeout".into()));
    assert_eq!(ids(&cache), vec!["a"]);
}

#[test]
fn older_refresh_landing_late_is_discarded() {
    let mut cache = HistoryCache::new(HistoryLimit::All);
    let older = cache.begin_refresh(None);
    let newer = cache.begin_refresh(None);

    cache.apply_refresh(newer.ticket, Ok(vec![entry("b", 2), entry("a", 1)]));
    let outcome = cache.apply_refresh(older.ticket, Ok(vec![entry("a", 1)]));
    assert_eq!(outcome, RefreshOutcome::Stale);
    assert_eq!(ids(&cache), vec!["b", "a"]);
}

#[test]
fn failure_of_a_superseded_refresh_is_silent() {
    let mut cache = HistoryCache::new(HistoryLimit::All);
    let older = cache.begin_refresh(None);
    let newer = cache.begin_refresh(None);

    let outcome = cache.apply_refresh(older.ticket, Err("connection reset".into()));
    assert_eq!(outcome, RefreshOutcome::Stale);

    let outcome = cache.apply_refresh(newer.ticket, Ok(vec![entry("a", 1)]));
    assert_eq!(outcome, RefreshOutcome::Applied { count: 1 });
}

#[test]
fn loading_stays_set_until_the_latest_refresh_settles() {
    let (state, effects) = update(AppState::new(), Msg::IdentityChanged(Some("u1".into())));
    let first = fetch_query(&effects);
    let (state, effects) = update(state, Msg::RefreshRequested);
    let second = fetch_query(&effects);

    let (state, effects) = update(
        state,
        Msg::HistoryFetched {
            ticket: first.ticket,
            result: Err("connection reset".into()),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().history_loading);
    assert_eq!(state.view().last_notification, None);

    let (state, _) = update(
        state,
        Msg::HistoryFetched {
            ticket: second.ticket,
            result: Ok(vec![entry("a", 1)]),
        },
    );
    assert!(!state.view().history_loading);
    assert_eq!(state.history().items().len(), 1);
}

#[test]
fn older_refresh_applied_first_keeps_loading_for_the_newer_one() {
    let (state, effects) = update(AppState::new(), Msg::IdentityChanged(Some("u1".into())));
    let first = fetch_query(&effects);
    let (state, _) = update(state, Msg::RefreshRequested);

    let (state, _) = update(
        state,
        Msg::HistoryFetched {
            ticket: first.ticket,
            result: Ok(vec![entry("a", 1)]),
        },
    );
    assert_eq!(state.history().items().len(), 1);
    assert!(state.view().history_loading);
}

#[test]
fn remove_is_by_id_and_idempotent() {
    let mut cache = HistoryCache::new(HistoryLimit::All);
    let q = cache.begin_refresh(None);
    cache.apply_refresh(q.ticket, Ok(vec![entry("b", 2), entry("a", 1)]));

    assert_eq!(cache.apply_remove("a", Ok(())), RemoveOutcome::Removed);
    assert_eq!(cache.apply_remove("a", Ok(())), RemoveOutcome::AlreadyAbsent);
    assert_eq!(cache.apply_remove("zzz", Ok(())), RemoveOutcome::AlreadyAbsent);
    assert_eq!(ids(&cache), vec!["b"]);
}

#[test]
fn failed_remove_keeps_entry() {
    let mut cache = HistoryCache::new(HistoryLimit::All);
    let q = cache.begin_refresh(None);
    cache.apply_refresh(q.ticket, Ok(vec![entry("a", 1)]));

    assert_eq!(
        cache.apply_remove("a", Err("forbidden".into())),
        RemoveOutcome::Failed("forbidden".into())
    );
    assert_eq!(ids(&cache), vec!["a"]);
}

#[test]
fn delete_acknowledged_mid_refresh_does_not_resurrect() {
    let mut cache = HistoryCache::new(HistoryLimit::All);
    let q = cache.begin_refresh(None);
    cache.apply_refresh(q.ticket, Ok(vec![entry("b", 2), entry("a", 1)]));

    // Refresh goes out, then the delete is acknowledged before it returns.
    let racing = cache.begin_refresh(None);
    cache.apply_remove("a", Ok(()));
    cache.apply_refresh(racing.ticket, Ok(vec![entry("b", 2), entry("a", 1)]));
    assert_eq!(ids(&cache), vec!["b"]);

    // A refresh issued after the acknowledgement is trusted as-is.
    let later = cache.begin_refresh(None);
    cache.apply_refresh(later.ticket, Ok(vec![entry("b", 2)]));
    assert_eq!(ids(&cache), vec!["b"]);
}

#[test]
fn append_success_triggers_refresh_and_new_entry_lands_first() {
    let (state, _) = update(AppState::new(), Msg::IdentityChanged(Some("u1".into())));
    let (state, effects) = update(state, Msg::Mounted);
    let initial = fetch_query(&effects);
    let (state, _) = update(
        state,
        Msg::HistoryFetched {
            ticket: initial.ticket,
            result: Ok(vec![entry("a", 1)]),
        },
    );

    let (state, effects) = update(
        state,
        Msg::HistoryInserted {
            result: Ok(entry("fresh", 9)),
        },
    );
    assert_eq!(effects[0], Effect::Notify(Notification::Saved));
    let query = fetch_query(&effects);
    assert_eq!(query.owner.as_deref(), Some("u1"));
    // Not spliced locally; the server copy arrives with the refresh.
    assert_eq!(state.history().items().len(), 1);

    let (state, _) = update(
        state,
        Msg::HistoryFetched {
            ticket: query.ticket,
            result: Ok(vec![entry("a", 1), entry("fresh", 9)]),
        },
    );
    assert_eq!(ids(state.history()), vec!["fresh", "a"]);
}

#[test]
fn failed_append_keeps_displayed_image() {
    let (state, _) = update(AppState::new(), Msg::IdentityChanged(Some("u1".into())));
    let (state, _) = update(state, Msg::PromptEdited("dog".into()));
    let (state, effects) = update(state, Msg::SubmitClicked);
    let request_id = match &effects[0] {
        Effect::Generate(request) => request.request_id,
        other => panic!("unexpected {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::GenerationFinished {
            request_id,
            result: Ok("dog.png".into()),
        },
    );

    let (state, effects) = update(
        state,
        Msg::HistoryInserted {
            result: Err("permission denied".into()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::SaveFailed {
            reason: "permission denied".into()
        })]
    );
    assert_eq!(state.view().result_image_ref.as_deref(), Some("dog.png"));
    assert!(state.view().error_message.is_none());
}

#[test]
fn identity_change_clears_gallery_and_rekeys_refresh() {
    let (state, effects) = update(AppState::new(), Msg::IdentityChanged(Some("u1".into())));
    let q1 = fetch_query(&effects);
    let (state, _) = update(
        state,
        Msg::HistoryFetched {
            ticket: q1.ticket,
            result: Ok(vec![entry("a", 1)]),
        },
    );

    let (state, effects) = update(state, Msg::IdentityChanged(Some("u2".into())));
    assert!(state.history().items().is_empty());
    let q2 = fetch_query(&effects);
    assert_eq!(q2.owner.as_deref(), Some("u2"));

    // u1's late answer must not show up for u2.
    let (state, effects) = update(
        state,
        Msg::HistoryFetched {
            ticket: q1.ticket,
            result: Ok(vec![entry("a", 1)]),
        },
    );
    assert!(effects.is_empty());
    assert!(state.history().items().is_empty());

    let (state, effects) = update(state, Msg::IdentityChanged(None));
    assert!(effects.is_empty());
    assert!(state.view().owner.is_none());
}

#[test]
fn anonymous_history_mode_fetches_without_owner() {
    let config = CoreConfig {
        anonymous_history: true,
        history_limit: HistoryLimit::All,
        ..CoreConfig::default()
    };
    let (_, effects) = update(AppState::with_config(config), Msg::Mounted);
    let query = fetch_query(&effects);
    assert_eq!(query.owner, None);
    assert_eq!(query.limit, HistoryLimit::All);
}

#[test]
fn selecting_history_item_loads_prompt_and_image_together() {
    let (state, effects) = update(AppState::new(), Msg::IdentityChanged(Some("u1".into())));
    let q = fetch_query(&effects);
    let (state, _) = update(
        state,
        Msg::HistoryFetched {
            ticket: q.ticket,
            result: Ok(vec![entry("a", 1)]),
        },
    );
    let (state, _) = update(state, Msg::PromptEdited("half typed".into()));

    let (state, effects) = update(state, Msg::HistoryItemSelected { id: "a".into() });
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.prompt_draft, "prompt a");
    assert_eq!(view.result_image_ref.as_deref(), Some("https://cdn/a.png"));
    assert_eq!(view.history[0].created_date, "2024-05-01");

    let (state, _) = update(state, Msg::HistoryItemSelected { id: "missing".into() });
    assert_eq!(state.view().prompt_draft, "prompt a");
}

#[test]
fn delete_and_download_flow_through_effects() {
    let (state, effects) = update(AppState::new(), Msg::IdentityChanged(Some("u1".into())));
    let q = fetch_query(&effects);
    let (state, _) = update(
        state,
        Msg::HistoryFetched {
            ticket: q.ticket,
            result: Ok(vec![entry("a", 1)]),
        },
    );

    let (state, effects) = update(state, Msg::DeleteClicked { id: "a".into() });
    assert_eq!(effects, vec![Effect::DeleteHistory { id: "a".into() }]);
    assert_eq!(state.history().items().len(), 1);

    let (state, effects) = update(
        state,
        Msg::HistoryDeleted {
            id: "a".into(),
            result: Err("network error".into()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::DeleteFailed {
            reason: "network error".into()
        })]
    );
    assert_eq!(state.history().items().len(), 1);

    let (state, effects) = update(state, Msg::DownloadClicked { id: Some("a".into()) });
    assert_eq!(
        effects,
        vec![Effect::Download {
            image_ref: "https://cdn/a.png".into()
        }]
    );
    assert!(state.view().download_pending);

    let (state, effects) = update(
        state,
        Msg::DownloadFinished {
            result: Ok("/tmp/image-1.png".into()),
        },
    );
    assert!(!state.view().download_pending);
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::Downloaded {
            location: "/tmp/image-1.png".into()
        })]
    );

    // Nothing generated yet: downloading the current result is a no-op.
    let (_, effects) = update(state, Msg::DownloadClicked { id: None });
    assert!(effects.is_empty());
}
