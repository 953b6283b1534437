use crate::core::errors::FeedResult;
use crate::fanout::publish;
use crate::follow::follow;
use crate::store::KvStore;
use crate::users::{register, user_by_name};

const DEMO_USERS: [(&str, &str, &[&str]); 3] = [
    ("test", "test", &["This is my first post!"]),
    (
        "alice",
        "alice",
        &[
            "Welcome to my board! Excited to share thoughts here.",
            "Just finished an amazing project. Feeling productive today!",
        ],
    ),
    (
        "bob",
        "bob",
        &["Hey everyone! Just joined, looking forward to connecting with you all."],
    ),
];

/// Seeds the demo accounts `test`, `alice` and `bob` with a few posts, and
/// makes `test` follow `bob`. Accounts that already exist are left alone.
pub fn init_test_data(store: &dyn KvStore) -> FeedResult<()> {
    for (username, password, posts) in DEMO_USERS {
        if user_by_name(store, username).is_ok() {
            continue;
        }
        let user = register(store, username, password)?;
        for body in posts {
            publish(store, &user.id, body)?;
        }
    }

    let test = user_by_name(store, "test")?;
    let bob = user_by_name(store, "bob")?;
    follow(store, &test.id, &bob.id)?;

    tracing::info!("demo data ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::is_following;
    use crate::store::MemoryStore;
    use crate::timeline::{page, TimelineKey};

    #[test]
    fn seeding_is_idempotent() {
        let store = MemoryStore::new();
        init_test_data(&store).unwrap();
        init_test_data(&store).unwrap();

        let test = user_by_name(&store, "test").unwrap();
        let bob = user_by_name(&store, "bob").unwrap();
        assert!(is_following(&store, &test.id, &bob.id));

        let global = page(&store, &TimelineKey::Global, 0, 50).unwrap();
        assert_eq!(global.posts.len(), 4);
    }
}
