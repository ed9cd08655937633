//! User profiles, contact lists and flexible sign-in.

pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::{ProfileError, ProfileResult};
pub use model::{
    Contacts, IndexKind, UserIndexEntry, UserProfile, display_name_index_key, is_email,
    phone_index_key, phone_to_synthetic_email, sanitize_phone,
};
pub use service::{ProfileService, SignUpOutcome};
pub use store::{AuthProvider, AuthSession, MemoryAuthProvider, MemoryProfileStore, ProfileStore};
