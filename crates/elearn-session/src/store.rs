use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use elearn_storage::StorageBackend;
use elearn_types::{Session, UserProfile};

pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    pub const ROLE: &str = "role";
    pub const USERNAME: &str = "username";
}

/// Every key that makes up a session; `clear` removes all of them.
pub const SESSION_KEYS: [&str; 4] = [keys::TOKEN, keys::USER, keys::ROLE, keys::USERNAME];

/// Trim a stored value and drop the ones that mean "nothing".
///
/// Empty strings and the literals `null`/`undefined` are what a careless
/// stringify of a missing value leaves behind; they must never pass for a
/// real token.
pub fn normalize(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" {
        return None;
    }
    Some(trimmed.to_string())
}

/// Dual-backend session store.
#[derive(Clone)]
pub struct SessionStore {
    durable: Arc<dyn StorageBackend>,
    ephemeral: Arc<dyn StorageBackend>,
}

impl SessionStore {
    pub fn new(durable: Arc<dyn StorageBackend>, ephemeral: Arc<dyn StorageBackend>) -> Self {
        Self { durable, ephemeral }
    }

    /// First usable value, durable store first.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = normalize(self.durable.get_item(key)?) {
            return Ok(Some(value));
        }
        Ok(normalize(self.ephemeral.get_item(key)?))
    }

    /// Write `value` to one backend and drop `key` from the other.
    pub fn set(&self, key: &str, value: &str, durable: bool) -> Result<()> {
        let (target, other) = if durable {
            (&self.durable, &self.ephemeral)
        } else {
            (&self.ephemeral, &self.durable)
        };
        other.remove_item(key)?;
        target.set_item(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.durable.remove_item(key)?;
        self.ephemeral.remove_item(key)
    }

    pub fn clear(&self) -> Result<()> {
        for key in SESSION_KEYS {
            self.remove(key)?;
        }
        info!("Session cleared");
        Ok(())
    }

    // -- Typed accessors --

    pub fn token(&self) -> Result<Option<String>> {
        self.get(keys::TOKEN)
    }

    pub fn set_token(&self, token: &str, remember: bool) -> Result<()> {
        self.set(keys::TOKEN, token, remember)
    }

    pub fn user(&self) -> Result<Option<UserProfile>> {
        match self.get(keys::USER)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_user(&self, user: &UserProfile, remember: bool) -> Result<()> {
        let raw = serde_json::to_string(user)?;
        self.set(keys::USER, &raw, remember)
    }

    pub fn role(&self) -> Result<Option<String>> {
        self.get(keys::ROLE)
    }

    pub fn set_role(&self, role: &str, remember: bool) -> Result<()> {
        self.set(keys::ROLE, role, remember)
    }

    pub fn username(&self) -> Result<Option<String>> {
        self.get(keys::USERNAME)
    }

    pub fn set_username(&self, username: &str, remember: bool) -> Result<()> {
        self.set(keys::USERNAME, username, remember)
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }

    // -- Whole sessions --

    pub fn save(&self, session: &Session, remember: bool) -> Result<()> {
        self.set_token(&session.token, remember)?;
        self.set_user(&session.user, remember)?;
        self.set_role(&session.role, remember)?;
        self.set_username(&session.username, remember)?;

        debug!(
            "Session for {} saved to {} storage",
            session.username,
            if remember { "durable" } else { "ephemeral" }
        );
        Ok(())
    }

    /// The stored session, or `None` unless all four parts are present.
    pub fn load(&self) -> Result<Option<Session>> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };
        let (Some(raw_user), Some(role), Some(username)) =
            (self.get(keys::USER)?, self.role()?, self.username()?)
        else {
            warn!("Incomplete session in storage, treating as logged out");
            return Ok(None);
        };

        let user = match serde_json::from_str::<UserProfile>(&raw_user) {
            Ok(user) => user,
            Err(e) => {
                warn!("Stored user profile is unreadable, treating as logged out: {}", e);
                return Ok(None);
            }
        };

        Ok(Some(Session {
            token,
            user,
            role,
            username,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elearn_storage::MemoryStorage;

    struct Fixture {
        durable: Arc<MemoryStorage>,
        ephemeral: Arc<MemoryStorage>,
        store: SessionStore,
    }

    fn fixture() -> Fixture {
        let durable = Arc::new(MemoryStorage::new());
        let ephemeral = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(durable.clone(), ephemeral.clone());
        Fixture {
            durable,
            ephemeral,
            store,
        }
    }

    fn sample_session() -> Session {
        let user: UserProfile = serde_json::from_str(
            r#"{"id_user":12,"username":"dosen01","email":"dosen01@kampus.ac.id","role":"admin","nama":"Dr. Sari"}"#,
        )
        .unwrap();
        Session {
            token: "eyJhbGciOi.payload.sig".into(),
            role: user.role.clone(),
            username: user.username.clone(),
            user,
        }
    }

    #[test]
    fn get_returns_what_was_set_in_either_backend() {
        let f = fixture();
        for durable in [true, false] {
            f.store.set("token", "abc", durable).unwrap();
            assert_eq!(f.store.get("token").unwrap().as_deref(), Some("abc"));
        }
    }

    #[test]
    fn placeholder_values_read_as_absent() {
        let f = fixture();
        for junk in ["", "   ", "null", "undefined", " null "] {
            for durable in [true, false] {
                f.store.set("token", junk, durable).unwrap();
                assert_eq!(f.store.get("token").unwrap(), None, "value {:?}", junk);
            }
        }
    }

    #[test]
    fn values_are_trimmed() {
        let f = fixture();
        f.store.set("role", "  admin\n", false).unwrap();
        assert_eq!(f.store.get("role").unwrap().as_deref(), Some("admin"));
    }

    #[test]
    fn durable_wins_over_ephemeral() {
        let f = fixture();
        f.ephemeral.set_item("username", "tab").unwrap();
        f.durable.set_item("username", "disk").unwrap();
        assert_eq!(f.store.get("username").unwrap().as_deref(), Some("disk"));
    }

    #[test]
    fn junk_in_durable_falls_through_to_ephemeral() {
        let f = fixture();
        f.durable.set_item("token", "undefined").unwrap();
        f.ephemeral.set_item("token", "real").unwrap();
        assert_eq!(f.store.get("token").unwrap().as_deref(), Some("real"));
    }

    #[test]
    fn set_leaves_key_in_exactly_one_backend() {
        let f = fixture();

        f.store.set("token", "a", false).unwrap();
        f.store.set("token", "b", true).unwrap();
        assert_eq!(f.durable.get_item("token").unwrap().as_deref(), Some("b"));
        assert_eq!(f.ephemeral.get_item("token").unwrap(), None);

        f.store.set("token", "c", false).unwrap();
        assert_eq!(f.ephemeral.get_item("token").unwrap().as_deref(), Some("c"));
        assert_eq!(f.durable.get_item("token").unwrap(), None);
    }

    #[test]
    fn remove_clears_both_backends() {
        let f = fixture();
        f.durable.set_item("role", "admin").unwrap();
        f.ephemeral.set_item("role", "admin").unwrap();

        f.store.remove("role").unwrap();
        assert_eq!(f.durable.get_item("role").unwrap(), None);
        assert_eq!(f.ephemeral.get_item("role").unwrap(), None);
    }

    #[test]
    fn clear_removes_every_session_key_from_both_backends() {
        let f = fixture();
        for key in SESSION_KEYS {
            f.durable.set_item(key, "x").unwrap();
            f.ephemeral.set_item(key, "y").unwrap();
        }
        f.durable.set_item("fcm_token", "device").unwrap();

        f.store.clear().unwrap();

        for key in SESSION_KEYS {
            assert_eq!(f.store.get(key).unwrap(), None, "key {}", key);
        }
        assert!(f.ephemeral.is_empty());
        // Non-session keys survive a logout.
        assert_eq!(f.durable.get_item("fcm_token").unwrap().as_deref(), Some("device"));
    }

    #[test]
    fn save_then_load_round_trips_whole_session() {
        let f = fixture();
        let session = sample_session();

        f.store.save(&session, true).unwrap();
        assert_eq!(f.store.load().unwrap(), Some(session.clone()));
        assert!(f.ephemeral.is_empty());
        assert!(f.store.is_authenticated().unwrap());

        f.store.save(&session, false).unwrap();
        assert_eq!(f.store.load().unwrap(), Some(session));
        assert!(f.durable.is_empty());
    }

    #[test]
    fn partial_session_loads_as_none() {
        let f = fixture();
        f.store.set_token("tok", false).unwrap();
        f.store.set_role("admin", false).unwrap();

        assert_eq!(f.store.load().unwrap(), None);
        // The token alone still counts for the cheap check.
        assert!(f.store.is_authenticated().unwrap());
    }

    #[test]
    fn unreadable_user_loads_as_none() {
        let f = fixture();
        let session = sample_session();
        f.store.save(&session, true).unwrap();
        f.store.set("user", "{not json", true).unwrap();

        assert_eq!(f.store.load().unwrap(), None);
        assert!(f.store.user().is_err());
    }

    #[test]
    fn user_is_stored_as_json() {
        let f = fixture();
        let session = sample_session();
        f.store.set_user(&session.user, false).unwrap();

        let raw = f.ephemeral.get_item("user").unwrap().unwrap();
        assert!(raw.contains("\"nama\":\"Dr. Sari\""));
        assert_eq!(f.store.user().unwrap(), Some(session.user));
    }

    struct FullDisk;

    impl StorageBackend for FullDisk {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow::anyhow!("quota exceeded"))
        }
        fn remove_item(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn backend_failures_propagate() {
        let store = SessionStore::new(Arc::new(FullDisk), Arc::new(MemoryStorage::new()));
        let err = store.set_token("tok", true).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
