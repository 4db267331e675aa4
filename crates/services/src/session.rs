//! Session state and the staleness guard for overlapping async fetches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use academy_core::model::{LearnerId, Role};
use storage::repository::ProfileRepository;

//
// ─── GENERATIONS ───────────────────────────────────────────────────────────────
//

/// Token captured when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Monotonically increasing request-generation counter guarding any async
/// fetch whose response lands in shared state.
///
/// Rapid navigation can leave several fetches in flight at once; the rule is
/// "last request issued wins", not "last response received wins". A response
/// whose token is no longer current is discarded silently — staleness is not
/// an error.
#[derive(Debug, Default)]
pub struct Generations {
    current: AtomicU64,
}

impl Generations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new generation, superseding every earlier one.
    pub fn begin(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while `token` is still the latest issued generation.
    #[must_use]
    pub fn is_current(&self, token: Generation) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }
}

//
// ─── SESSION CONTEXT ───────────────────────────────────────────────────────────
//

/// Explicit, injectable session state: who is signed in and what they may
/// see.
///
/// Gating functions take the privileged flag from here instead of consulting
/// ambient global auth state, so every bypass flows through one auditable
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionContext {
    learner: Option<LearnerId>,
    role: Role,
}

impl SessionContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn learner_id(&self) -> Option<LearnerId> {
        self.learner
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

//
// ─── SESSION SERVICE ───────────────────────────────────────────────────────────
//

/// Tracks the signed-in learner and resolves their role from the auth
/// collaborator.
pub struct SessionService {
    profiles: Arc<dyn ProfileRepository>,
    generations: Generations,
    context: Mutex<SessionContext>,
}

impl SessionService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            profiles,
            generations: Generations::new(),
            context: Mutex::new(SessionContext::anonymous()),
        }
    }

    fn context_guard(&self) -> MutexGuard<'_, SessionContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn context(&self) -> SessionContext {
        *self.context_guard()
    }

    /// Signs a learner in and resolves their role.
    ///
    /// The learner is visible immediately with the restrictive default role;
    /// the role fetch then upgrades it asynchronously. Overlapping sign-ins
    /// are generation-guarded, and a fetch failure degrades to
    /// `Role::Learner` rather than failing the sign-in.
    pub async fn sign_in(&self, learner: LearnerId) -> SessionContext {
        let token = self.generations.begin();
        self.commit(
            token,
            SessionContext {
                learner: Some(learner),
                role: Role::Learner,
            },
        );

        let role = match self.profiles.get_role(learner).await {
            Ok(role) => role,
            Err(err) => {
                tracing::warn!(%learner, error = %err, "role fetch failed, defaulting to learner");
                Role::Learner
            }
        };

        if !self.commit(
            token,
            SessionContext {
                learner: Some(learner),
                role,
            },
        ) {
            tracing::debug!(%learner, "discarding stale role fetch");
        }

        self.context()
    }

    /// Clears the session and supersedes any in-flight role fetch.
    pub fn sign_out(&self) {
        let token = self.generations.begin();
        self.commit(token, SessionContext::anonymous());
    }

    fn commit(&self, token: Generation, context: SessionContext) -> bool {
        if !self.generations.is_current(token) {
            return false;
        }
        *self.context_guard() = context;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use storage::repository::StorageError;

    #[test]
    fn newer_generation_supersedes_older() {
        let generations = Generations::new();
        let first = generations.begin();
        assert!(generations.is_current(first));

        let second = generations.begin();
        assert!(!generations.is_current(first));
        assert!(generations.is_current(second));
    }

    struct FixedRoles(Role);

    #[async_trait]
    impl ProfileRepository for FixedRoles {
        async fn upsert_profile(
            &self,
            _learner_id: LearnerId,
            _role: Role,
        ) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get_role(&self, _learner_id: LearnerId) -> Result<Role, StorageError> {
            Ok(self.0)
        }
    }

    struct FailingRoles;

    #[async_trait]
    impl ProfileRepository for FailingRoles {
        async fn upsert_profile(
            &self,
            _learner_id: LearnerId,
            _role: Role,
        ) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get_role(&self, _learner_id: LearnerId) -> Result<Role, StorageError> {
            Err(StorageError::Connection("down".into()))
        }
    }

    #[tokio::test]
    async fn sign_in_resolves_privileged_role() {
        let service = SessionService::new(Arc::new(FixedRoles(Role::Privileged)));
        let context = service.sign_in(LearnerId::from_u128(1)).await;
        assert_eq!(context.learner_id(), Some(LearnerId::from_u128(1)));
        assert!(context.is_privileged());
    }

    #[tokio::test]
    async fn role_fetch_failure_defaults_to_learner() {
        let service = SessionService::new(Arc::new(FailingRoles));
        let context = service.sign_in(LearnerId::from_u128(1)).await;
        assert_eq!(context.learner_id(), Some(LearnerId::from_u128(1)));
        assert!(!context.is_privileged());
    }

    #[tokio::test]
    async fn sign_out_clears_the_session() {
        let service = SessionService::new(Arc::new(FixedRoles(Role::Privileged)));
        service.sign_in(LearnerId::from_u128(1)).await;
        service.sign_out();
        assert_eq!(service.context(), SessionContext::anonymous());
    }
}
