use chirp::auth::{login, logout, user_from_auth};
use chirp::config::{AUTHS_KEY, LATEST_USERS_COUNT};
use chirp::store::{KvStore, MemoryStore};
use chirp::users::{latest_users, load_user, register, user_by_name};
use chirp::FeedError;

#[test]
fn register_assigns_sequential_ids_and_indexes() {
    let store = MemoryStore::new();
    let alice = register(&store, "alice", "secret").unwrap();
    let bob = register(&store, "bob", "secret").unwrap();

    assert_eq!(alice.id, "1");
    assert_eq!(bob.id, "2");
    assert_ne!(alice.password, "secret");
    assert_eq!(user_by_name(&store, "bob").unwrap().id, "2");
    assert_eq!(store.hget(AUTHS_KEY, &alice.auth).unwrap().as_deref(), Some("1"));
    assert_eq!(load_user(&store, "1").unwrap().username, "alice");
}

#[test]
fn duplicate_name_is_rejected() {
    let store = MemoryStore::new();
    register(&store, "alice", "secret").unwrap();
    let err = register(&store, "alice", "other").unwrap_err();
    assert!(matches!(err, FeedError::InvalidOperation(_)));
}

#[test]
fn empty_fields_are_rejected() {
    let store = MemoryStore::new();
    assert!(matches!(register(&store, "", "pw"), Err(FeedError::InvalidOperation(_))));
    assert!(matches!(register(&store, "name", ""), Err(FeedError::InvalidOperation(_))));
}

#[test]
fn markup_is_stripped_from_names() {
    let store = MemoryStore::new();
    let user = register(&store, "<b>carol</b>", "secret").unwrap();
    assert_eq!(user.username, "carol");
}

#[test]
fn ampersand_names_are_stored_literally() {
    let store = MemoryStore::new();
    let user = register(&store, "tom&jerry", "secret").unwrap();
    assert_eq!(user.username, "tom&jerry");
    assert_eq!(store.hget("users", "tom&jerry").unwrap().as_deref(), Some(user.id.as_str()));

    assert_eq!(user_by_name(&store, "tom&jerry").unwrap().id, user.id);
    assert_eq!(login(&store, "tom&jerry", "secret").unwrap().id, user.id);
}

#[test]
fn escaped_markup_in_names_is_rejected() {
    let store = MemoryStore::new();
    let err = register(&store, "&lt;b&gt;", "secret").unwrap_err();
    assert!(matches!(err, FeedError::InvalidOperation(_)));
}

#[test]
fn concurrent_registrations_claim_a_name_once() {
    let store = MemoryStore::new();
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| register(&store, "racer", "secret")))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    let indexed = user_by_name(&store, "racer").unwrap();
    assert_eq!(indexed.id, winners[0].id);
    assert_eq!(login(&store, "racer", "secret").unwrap().auth, winners[0].auth);
}

#[test]
fn login_checks_password() {
    let store = MemoryStore::new();
    let alice = register(&store, "alice", "secret").unwrap();

    let logged_in = login(&store, "alice", "secret").unwrap();
    assert_eq!(logged_in.id, alice.id);
    assert_eq!(logged_in.auth, alice.auth);

    assert!(matches!(login(&store, "alice", "wrong"), Err(FeedError::NotFound(_))));
    assert!(matches!(login(&store, "nobody", "secret"), Err(FeedError::NotFound(_))));
}

#[test]
fn logout_rotates_token() {
    let store = MemoryStore::new();
    let alice = register(&store, "alice", "secret").unwrap();
    assert_eq!(user_from_auth(&store, &alice.auth).unwrap().id, alice.id);

    let fresh = logout(&store, &alice.id).unwrap();
    assert_ne!(fresh, alice.auth);
    assert!(user_from_auth(&store, &alice.auth).is_err());
    assert_eq!(user_from_auth(&store, &fresh).unwrap().id, alice.id);
    assert_eq!(store.hget(AUTHS_KEY, &alice.auth).unwrap(), None);
}

#[test]
fn unknown_or_empty_token_is_rejected() {
    let store = MemoryStore::new();
    assert!(matches!(user_from_auth(&store, ""), Err(FeedError::NotFound(_))));
    assert!(matches!(user_from_auth(&store, "deadbeef"), Err(FeedError::NotFound(_))));
}

#[test]
fn latest_users_newest_first() {
    let store = MemoryStore::new();
    store.zadd("users_by_time", 10, "old").unwrap();
    store.zadd("users_by_time", 30, "newest").unwrap();
    store.zadd("users_by_time", 20, "middle").unwrap();

    assert_eq!(
        latest_users(&store, LATEST_USERS_COUNT).unwrap(),
        vec!["newest", "middle", "old"]
    );
    assert_eq!(latest_users(&store, 1).unwrap(), vec!["newest"]);
    assert!(latest_users(&store, 0).unwrap().is_empty());
}
