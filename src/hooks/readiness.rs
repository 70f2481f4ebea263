//! Process-wide "player framework loaded" flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Default)]
struct Flags {
    ready: AtomicBool,
    injected: AtomicBool,
}

/// Readiness of the player framework.
///
/// Starts out not ready and flips to ready exactly once, when the framework
/// invokes its load callback. It is never reset. Clones share state, so the
/// object handed to a scheduler and the one wired to the load callback are
/// the same flag.
///
/// The flag also remembers whether the framework script was already
/// injected, so concurrent attaches before the framework loads only inject
/// it once.
///
/// Use [`ApiReadiness::global`] for the page-wide instance and
/// [`ApiReadiness::new`] for an isolated one (tests, simulations).
#[derive(Debug, Clone, Default)]
pub struct ApiReadiness {
    flags: Arc<Flags>,
}

impl ApiReadiness {
    /// Create an isolated, not-yet-ready flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide instance.
    pub fn global() -> &'static ApiReadiness {
        static GLOBAL: OnceLock<ApiReadiness> = OnceLock::new();
        GLOBAL.get_or_init(ApiReadiness::new)
    }

    /// Whether the framework has finished loading.
    pub fn is_ready(&self) -> bool {
        self.flags.ready.load(Ordering::Acquire)
    }

    /// Record that the framework finished loading.
    ///
    /// Returns true on the not-ready to ready transition, false if it was
    /// already ready.
    pub fn mark_ready(&self) -> bool {
        let transitioned = !self.flags.ready.swap(true, Ordering::AcqRel);
        if transitioned {
            tracing::info!("player API ready");
        }
        transitioned
    }

    /// Claim the single script injection. Returns true for the first caller.
    pub(crate) fn claim_injection(&self) -> bool {
        !self.flags.injected.swap(true, Ordering::AcqRel)
    }

    /// Whether the framework script has been injected.
    pub fn script_injected(&self) -> bool {
        self.flags.injected.load(Ordering::Acquire)
    }
}
