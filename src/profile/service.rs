use chrono::Utc;
use tracing::{debug, info, warn};

use crate::profile::error::{ProfileError, ProfileResult};
use crate::profile::model::{
    Contacts, IndexKind, UserIndexEntry, UserProfile, array_remove, array_union,
    display_name_index_key, is_email, phone_index_key, phone_to_synthetic_email, sanitize_phone,
};
use crate::profile::store::{AuthProvider, AuthSession, ProfileStore};

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub uid: String,
    pub profile: UserProfile,
}

/// Account, profile and contact operations over an auth provider and a
/// profile store.
#[derive(Debug, Clone)]
pub struct ProfileService<A, S> {
    auth: A,
    store: S,
}

impl<A: AuthProvider, S: ProfileStore> ProfileService<A, S> {
    #[must_use]
    pub fn new(auth: A, store: S) -> Self {
        Self { auth, store }
    }

    #[must_use]
    pub fn auth(&self) -> &A {
        &self.auth
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an account from a display name and an email or phone contact.
    ///
    /// A phone contact signs in through a synthetic email. Index entries for
    /// the display name (and phone) are best effort: a failed write is
    /// logged and the sign-up still succeeds.
    pub fn sign_up(
        &mut self,
        display_name: &str,
        contact: &str,
        password: &str,
    ) -> ProfileResult<SignUpOutcome> {
        let display_name = display_name.trim();
        let contact = contact.trim();
        if display_name.is_empty() || contact.is_empty() || password.is_empty() {
            return Err(ProfileError::MissingFields);
        }

        let contact_is_email = is_email(contact);
        let phone = sanitize_phone(contact);
        if !contact_is_email && phone.is_empty() {
            return Err(ProfileError::MissingFields);
        }
        let auth_email = if contact_is_email {
            contact.to_owned()
        } else {
            phone_to_synthetic_email(&phone)
        };

        let name_key = display_name_index_key(display_name);
        if self.store.find_by_display_name(display_name)?.is_some()
            || self.store.get_index(&name_key)?.is_some()
        {
            return Err(ProfileError::DisplayNameTaken(display_name.to_owned()));
        }

        let uid = self.auth.create_user(&auth_email, password, display_name)?;
        let profile = UserProfile {
            auth_email: auth_email.clone(),
            display_name: display_name.to_owned(),
            contacts: if contact_is_email {
                Contacts {
                    emails: vec![contact.to_owned()],
                    phones: Vec::new(),
                }
            } else {
                Contacts {
                    emails: Vec::new(),
                    phones: vec![phone.clone()],
                }
            },
            notification_locations: Vec::new(),
            created_at: Utc::now(),
        };
        self.store.put_profile(&uid, profile.clone())?;

        let mut index = vec![(name_key, IndexKind::DisplayName)];
        if !contact_is_email {
            index.push((phone_index_key(&phone), IndexKind::Phone));
        }
        for (key, kind) in index {
            let entry = UserIndexEntry {
                uid: uid.clone(),
                auth_email: auth_email.clone(),
                kind,
            };
            if let Err(err) = self.store.put_index(&key, entry) {
                warn!(key = %key, error = %err, "user index write failed");
            }
        }

        info!(uid = %uid, "user signed up");
        Ok(SignUpOutcome { uid, profile })
    }

    /// Signs in with an email, a display name or a phone number.
    pub fn sign_in_flexible(&self, identifier: &str, password: &str) -> ProfileResult<AuthSession> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(ProfileError::MissingFields);
        }
        if is_email(identifier) {
            return self.auth.sign_in(identifier, password);
        }
        let auth_email = self.resolve_auth_email(identifier)?;
        debug!(identifier, "resolved sign-in identifier");
        self.auth.sign_in(&auth_email, password)
    }

    /// Display name first, then phone; index entries before profile scans.
    fn resolve_auth_email(&self, identifier: &str) -> ProfileResult<String> {
        let phone = sanitize_phone(identifier);

        if let Some(entry) = self.store.get_index(&display_name_index_key(identifier))? {
            return non_empty_email(entry.auth_email, identifier);
        }
        if let Some((_, profile)) = self.store.find_by_display_name(identifier)? {
            return non_empty_email(profile.auth_email, identifier);
        }
        if !phone.is_empty() {
            if let Some(entry) = self.store.get_index(&phone_index_key(&phone))? {
                return non_empty_email(entry.auth_email, identifier);
            }
            if let Some((_, profile)) = self.store.find_by_phone(&phone)? {
                return non_empty_email(profile.auth_email, identifier);
            }
        }
        Err(ProfileError::UserNotFound(identifier.to_owned()))
    }

    pub fn profile(&self, uid: &str) -> ProfileResult<Option<UserProfile>> {
        self.store.get_profile(uid)
    }

    pub fn add_contact_email(&mut self, uid: &str, email: &str) -> ProfileResult<()> {
        let email = required(email)?;
        self.update(uid, |p| {
            array_union(&mut p.contacts.emails, email);
        })
    }

    pub fn remove_contact_email(&mut self, uid: &str, email: &str) -> ProfileResult<()> {
        let email = required(email)?;
        self.update(uid, |p| {
            array_remove(&mut p.contacts.emails, email);
        })
    }

    pub fn add_contact_phone(&mut self, uid: &str, phone: &str) -> ProfileResult<()> {
        let phone = sanitize_phone(required(phone)?);
        self.update(uid, |p| {
            array_union(&mut p.contacts.phones, &phone);
        })
    }

    pub fn remove_contact_phone(&mut self, uid: &str, phone: &str) -> ProfileResult<()> {
        let phone = sanitize_phone(required(phone)?);
        self.update(uid, |p| {
            array_remove(&mut p.contacts.phones, &phone);
        })
    }

    /// Subscribes or unsubscribes the user from a location's alerts.
    pub fn set_notification_location(
        &mut self,
        uid: &str,
        location_id: &str,
        enabled: bool,
    ) -> ProfileResult<()> {
        let location_id = required(location_id)?;
        self.update(uid, |p| {
            if enabled {
                array_union(&mut p.notification_locations, location_id);
            } else {
                array_remove(&mut p.notification_locations, location_id);
            }
        })
    }

    pub fn overwrite_notification_locations(
        &mut self,
        uid: &str,
        locations: Vec<String>,
    ) -> ProfileResult<()> {
        let mut locations = Some(locations);
        self.update(uid, |p| {
            p.notification_locations = locations.take().unwrap_or_default();
        })
    }

    fn update<F>(&mut self, uid: &str, mut apply: F) -> ProfileResult<()>
    where
        F: FnMut(&mut UserProfile),
    {
        if uid.trim().is_empty() {
            return Err(ProfileError::MissingFields);
        }
        self.store.update_profile(uid, &mut apply)
    }
}

fn required(value: &str) -> ProfileResult<&str> {
    let value = value.trim();
    if value.is_empty() {
        Err(ProfileError::MissingFields)
    } else {
        Ok(value)
    }
}

fn non_empty_email(auth_email: String, identifier: &str) -> ProfileResult<String> {
    if auth_email.trim().is_empty() {
        Err(ProfileError::NoAuthEmail(identifier.to_owned()))
    } else {
        Ok(auth_email)
    }
}
