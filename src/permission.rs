//! # Permission: a one-way-revocable delivery gate.
//!
//! A [`Permission`] decides whether callbacks of one cycle may still fire.
//! It combines two inputs:
//!
//! - a user **policy** closure, re-evaluated fresh on every [`granted`](Permission::granted)
//!   call (never memoized), so external conditions can gate delivery dynamically;
//! - a one-way **revocation** bit, flipped by [`deny`](Permission::deny) and
//!   never cleared.
//!
//! The scheduler creates a fresh `Permission` per cycle and denies it on
//! `stop()`. An in-flight asynchronous action cannot be cancelled, but its
//! eventual callback delivery runs through this gate, which closes the race
//! between late completions and cancellation.
//!
//! ## Example
//! ```rust
//! use recur::Permission;
//!
//! let perm = Permission::unrestricted();
//! assert!(perm.granted());
//!
//! perm.deny();
//! assert!(!perm.granted()); // permanent, policy no longer consulted
//! ```

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Shared permission policy: `true` while delivery is allowed.
pub type PermitFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// One-way-revocable boolean gate for callback delivery.
///
/// Cheap to clone; all clones share the same policy and revocation state,
/// so denying any clone denies them all. Revocation rides on a
/// [`CancellationToken`], which makes [`deny`](Permission::deny) idempotent
/// and safe across threads.
#[derive(Clone)]
pub struct Permission {
    inner: Arc<Inner>,
}

struct Inner {
    policy: PermitFn,
    revoked: CancellationToken,
}

impl Permission {
    /// Creates a permission gated by the given policy.
    pub fn new(policy: PermitFn) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                revoked: CancellationToken::new(),
            }),
        }
    }

    /// Creates a permission whose policy always grants.
    ///
    /// Delivery is then controlled by [`deny`](Permission::deny) alone.
    pub fn unrestricted() -> Self {
        Self::new(Arc::new(|| true))
    }

    /// Returns whether delivery is currently allowed.
    ///
    /// `false` forever once [`deny`](Permission::deny) has been called;
    /// otherwise the policy is evaluated anew on each call.
    pub fn granted(&self) -> bool {
        if self.inner.revoked.is_cancelled() {
            return false;
        }
        (self.inner.policy)()
    }

    /// Revokes the permission. Idempotent and irreversible.
    pub fn deny(&self) {
        self.inner.revoked.cancel();
    }

    /// Wraps a callback so it only runs while this permission is granted.
    ///
    /// The gate is checked at **call time**, not at wrap time: a callback
    /// wrapped while granted becomes a silent no-op once the permission is
    /// denied. This is how the scheduler suppresses late asynchronous
    /// deliveries without cancelling the underlying future.
    pub fn wrap<A, F>(&self, f: F) -> impl Fn(&A) + Send + Sync
    where
        A: ?Sized,
        F: Fn(&A) + Send + Sync + 'static,
    {
        let gate = self.clone();
        move |arg: &A| {
            if gate.granted() {
                f(arg);
            }
        }
    }
}

impl fmt::Debug for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permission")
            .field("revoked", &self.inner.revoked.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    #[test]
    fn test_granted_tracks_live_policy() {
        let flag = Arc::new(AtomicBool::new(true));
        let probe = flag.clone();
        let perm = Permission::new(Arc::new(move || probe.load(Ordering::SeqCst)));

        assert!(perm.granted());
        flag.store(false, Ordering::SeqCst);
        assert!(!perm.granted(), "policy must be re-evaluated per call");
        flag.store(true, Ordering::SeqCst);
        assert!(perm.granted());
    }

    #[test]
    fn test_deny_is_permanent_even_when_policy_grants() {
        let perm = Permission::unrestricted();
        perm.deny();
        perm.deny(); // idempotent
        assert!(!perm.granted());
    }

    #[test]
    fn test_deny_through_clone() {
        let perm = Permission::unrestricted();
        let clone = perm.clone();
        clone.deny();
        assert!(!perm.granted(), "clones share revocation state");
    }

    #[test]
    fn test_wrap_gates_invocation() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();

        let perm = Permission::unrestricted();
        let wrapped = perm.wrap(move |n: &u32| {
            counter.fetch_add(*n, Ordering::SeqCst);
        });

        wrapped(&2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        perm.deny();
        wrapped(&5);
        assert_eq!(hits.load(Ordering::SeqCst), 2, "denied wrap must be a no-op");
    }
}
