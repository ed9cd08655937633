use indexmap::IndexMap;

use crate::profile::error::{ProfileError, ProfileResult};
use crate::profile::model::{UserIndexEntry, UserProfile};

/// Signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub uid: String,
    pub auth_email: String,
}

/// Email/password account service.
pub trait AuthProvider {
    /// Creates an account and returns its uid.
    fn create_user(
        &mut self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> ProfileResult<String>;

    fn sign_in(&self, email: &str, password: &str) -> ProfileResult<AuthSession>;
}

/// Document store for profiles and lookup index entries.
pub trait ProfileStore {
    fn get_profile(&self, uid: &str) -> ProfileResult<Option<UserProfile>>;
    fn put_profile(&mut self, uid: &str, profile: UserProfile) -> ProfileResult<()>;
    /// Applies `update` to an existing profile; unknown uids fail.
    fn update_profile(
        &mut self,
        uid: &str,
        update: &mut dyn FnMut(&mut UserProfile),
    ) -> ProfileResult<()>;
    /// First profile whose display name equals `display_name` exactly.
    fn find_by_display_name(&self, display_name: &str)
    -> ProfileResult<Option<(String, UserProfile)>>;
    /// First profile listing `phone` among its contact phones.
    fn find_by_phone(&self, phone: &str) -> ProfileResult<Option<(String, UserProfile)>>;
    fn get_index(&self, key: &str) -> ProfileResult<Option<UserIndexEntry>>;
    fn put_index(&mut self, key: &str, entry: UserIndexEntry) -> ProfileResult<()>;
}

/// In-process auth accounts, for tests and local tooling.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthProvider {
    accounts: IndexMap<String, (String, String)>,
    next_uid: u64,
}

impl MemoryAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AuthProvider for MemoryAuthProvider {
    fn create_user(
        &mut self,
        email: &str,
        password: &str,
        _display_name: &str,
    ) -> ProfileResult<String> {
        let key = email.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(ProfileError::EmailInUse(email.to_owned()));
        }
        self.next_uid += 1;
        let uid = format!("uid_{:06}", self.next_uid);
        self.accounts
            .insert(key, (uid.clone(), password.to_owned()));
        Ok(uid)
    }

    fn sign_in(&self, email: &str, password: &str) -> ProfileResult<AuthSession> {
        match self.accounts.get(&email.to_lowercase()) {
            Some((uid, stored)) if stored == password => Ok(AuthSession {
                uid: uid.clone(),
                auth_email: email.to_owned(),
            }),
            _ => Err(ProfileError::InvalidCredentials(email.to_owned())),
        }
    }
}

/// In-process profile documents and index entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profiles: IndexMap<String, UserProfile>,
    index: IndexMap<String, UserIndexEntry>,
    reject_index_writes: bool,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every index write fail, like a store whose rules forbid it.
    #[must_use]
    pub fn with_index_writes_rejected(mut self) -> Self {
        self.reject_index_writes = true;
        self
    }

    #[must_use]
    pub fn profiles(&self) -> &IndexMap<String, UserProfile> {
        &self.profiles
    }

    #[must_use]
    pub fn index_len(&self) -> usize {
        self.index.len()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get_profile(&self, uid: &str) -> ProfileResult<Option<UserProfile>> {
        Ok(self.profiles.get(uid).cloned())
    }

    fn put_profile(&mut self, uid: &str, profile: UserProfile) -> ProfileResult<()> {
        self.profiles.insert(uid.to_owned(), profile);
        Ok(())
    }

    fn update_profile(
        &mut self,
        uid: &str,
        update: &mut dyn FnMut(&mut UserProfile),
    ) -> ProfileResult<()> {
        let profile = self
            .profiles
            .get_mut(uid)
            .ok_or_else(|| ProfileError::UnknownUser(uid.to_owned()))?;
        update(profile);
        Ok(())
    }

    fn find_by_display_name(
        &self,
        display_name: &str,
    ) -> ProfileResult<Option<(String, UserProfile)>> {
        Ok(self
            .profiles
            .iter()
            .find(|(_, p)| p.display_name == display_name)
            .map(|(uid, p)| (uid.clone(), p.clone())))
    }

    fn find_by_phone(&self, phone: &str) -> ProfileResult<Option<(String, UserProfile)>> {
        Ok(self
            .profiles
            .iter()
            .find(|(_, p)| p.contacts.phones.iter().any(|ph| ph == phone))
            .map(|(uid, p)| (uid.clone(), p.clone())))
    }

    fn get_index(&self, key: &str) -> ProfileResult<Option<UserIndexEntry>> {
        Ok(self.index.get(key).cloned())
    }

    fn put_index(&mut self, key: &str, entry: UserIndexEntry) -> ProfileResult<()> {
        if self.reject_index_writes {
            return Err(ProfileError::Store(format!("index write to `{key}` rejected")));
        }
        self.index.insert(key.to_owned(), entry);
        Ok(())
    }
}
