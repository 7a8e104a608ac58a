//! Identity provider implementations

use async_trait::async_trait;
use parking_lot::Mutex;

use thread_core::{AuthCallback, IdentityProvider, Profile, RepoResult, SignIn};

/// Identity provider backed by a fixed profile.
///
/// Configured with `Some(profile)` it completes every sign-in with that
/// profile; configured with `None` it cancels every sign-in. Auth-change
/// callbacks fire on both sign-in and sign-out.
#[derive(Default)]
pub struct StaticIdentityProvider {
    profile: Option<Profile>,
    current: Mutex<Option<Profile>>,
    callbacks: Mutex<Vec<AuthCallback>>,
}

impl StaticIdentityProvider {
    pub fn new(profile: Option<Profile>) -> Self {
        Self {
            profile,
            current: Mutex::new(None),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Currently signed-in profile, if any
    pub fn current(&self) -> Option<Profile> {
        self.current.lock().clone()
    }

    fn notify(&self, profile: Option<&Profile>) {
        for callback in self.callbacks.lock().iter() {
            callback(profile.cloned());
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in(&self) -> RepoResult<SignIn> {
        match &self.profile {
            Some(profile) => {
                *self.current.lock() = Some(profile.clone());
                self.notify(Some(profile));
                Ok(SignIn::Completed(profile.clone()))
            }
            None => Ok(SignIn::Cancelled),
        }
    }

    async fn sign_out(&self) -> RepoResult<()> {
        *self.current.lock() = None;
        self.notify(None);
        Ok(())
    }

    fn on_auth_change(&self, callback: AuthCallback) {
        self.callbacks.lock().push(callback);
    }
}
