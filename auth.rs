use crate::error::Result;
use crate::identity::{AuthSubscription, Identity, IdentityProvider};
use crate::models::UserProfile;
use crate::store::ProfileStore;
use crate::AppState;

/// Creates the account and its default profile in one step; the profile row
/// exists before this returns.
pub fn sign_up(state: &AppState, email: &str, password: &str) -> Result<Identity> {
    let identity = state.identity.sign_up(email, password)?;
    let profile = UserProfile {
        user_id: identity.uid.clone(),
        username: default_username(&identity.uid),
        bio: String::new(),
        profile_picture_url: String::new(),
        created_at: chrono::Utc::now().timestamp_millis(),
    };
    state.profiles.create_profile(&profile)?;
    log::info!("Created account and profile for {}", identity.uid);
    Ok(identity)
}

pub fn sign_in(state: &AppState, email: &str, password: &str) -> Result<Identity> {
    state.identity.sign_in(email, password)
}

pub fn sign_out(state: &AppState) {
    state.identity.sign_out();
}

/// Auth-change stream for view sessions that track the signed-in user.
pub fn on_auth_change(state: &AppState) -> AuthSubscription {
    state.identity.on_auth_change()
}

fn default_username(uid: &str) -> String {
    let prefix: String = uid.chars().take(6).collect();
    format!("User{prefix}")
}
