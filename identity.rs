use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Shortest password the identity service accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// An authenticated user's session handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

type SubscriberList = Vec<(u64, Sender<Option<Identity>>)>;

/// Stream of auth-state changes. The state at subscription time is delivered
/// immediately; every later sign-in and sign-out follows. Dropping the
/// subscription (or calling [`AuthSubscription::unsubscribe`]) deregisters
/// the listener.
pub struct AuthSubscription {
    id: u64,
    receiver: Receiver<Option<Identity>>,
    subscribers: Arc<Mutex<SubscriberList>>,
}

impl AuthSubscription {
    pub fn receiver(&self) -> &Receiver<Option<Identity>> {
        &self.receiver
    }

    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|(id, _)| *id != self.id);
    }
}

/// The remote identity service, consumed through sign-up/sign-in/sign-out
/// plus a change subscription.
pub trait IdentityProvider: Send + Sync {
    fn sign_up(&self, email: &str, password: &str) -> Result<Identity>;

    fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    fn sign_out(&self);

    fn current_user(&self) -> Option<Identity>;

    fn on_auth_change(&self) -> AuthSubscription;
}

struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
struct ProviderState {
    accounts: HashMap<String, Account>,
    current: Option<Identity>,
}

/// In-memory stand-in for the hosted identity service, for development and
/// tests. Applies the service's visible rules (unique email, minimum
/// password length) and keeps sessions per instance; production code injects
/// a client for the real service instead.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    state: Mutex<ProviderState>,
    subscribers: Arc<Mutex<SubscriberList>>,
    next_subscription_id: AtomicU64,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn broadcast(&self, current: Option<Identity>) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|(_, tx)| tx.send(current.clone()).is_ok());
    }
}

fn validate_email(email: &str) -> Result<()> {
    let (local, domain) = email.split_once('@').ok_or(Error::InvalidCredentials)?;
    if local.is_empty() || domain.is_empty() {
        return Err(Error::InvalidCredentials);
    }
    Ok(())
}

impl IdentityProvider for MemoryIdentityProvider {
    fn sign_up(&self, email: &str, password: &str) -> Result<Identity> {
        validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::WeakPassword(MIN_PASSWORD_LEN));
        }

        let identity = {
            let mut state = self.state.lock().unwrap();
            if state.accounts.contains_key(email) {
                return Err(Error::EmailInUse);
            }
            let identity = Identity {
                uid: Uuid::new_v4().to_string(),
                email: email.to_string(),
            };
            state.accounts.insert(
                email.to_string(),
                Account {
                    uid: identity.uid.clone(),
                    password: password.to_string(),
                },
            );
            // Signing up also signs the new user in.
            state.current = Some(identity.clone());
            identity
        };

        self.broadcast(Some(identity.clone()));
        Ok(identity)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let identity = {
            let mut state = self.state.lock().unwrap();
            let account = state.accounts.get(email).ok_or(Error::InvalidCredentials)?;
            if account.password != password {
                return Err(Error::InvalidCredentials);
            }
            let identity = Identity {
                uid: account.uid.clone(),
                email: email.to_string(),
            };
            state.current = Some(identity.clone());
            identity
        };

        self.broadcast(Some(identity.clone()));
        Ok(identity)
    }

    fn sign_out(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.current.is_none() {
                return;
            }
            state.current = None;
        }
        self.broadcast(None);
    }

    fn current_user(&self) -> Option<Identity> {
        self.state.lock().unwrap().current.clone()
    }

    fn on_auth_change(&self) -> AuthSubscription {
        let (tx, rx) = unbounded();
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        let current = self.current_user();
        // Deliver the current state before any change can race in.
        let _ = tx.send(current);
        self.subscribers.lock().unwrap().push((id, tx));
        AuthSubscription {
            id,
            receiver: rx,
            subscribers: self.subscribers.clone(),
        }
    }
}
