//! SIGINT/SIGTERM handling while a converter runs.
//!
//! Without a handler, Ctrl-C kills mdmerge on the spot and the transient input
//! file is never dropped. [`InterruptGuard`] swaps in a handler that only
//! records the signal; the wait loop notices it, kills the converter and
//! unwinds through the normal error path so every cleanup runs.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Whether a signal arrived since the current guard was installed.
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

#[cfg(unix)]
mod imp {
    use super::INTERRUPTED;
    use nix::libc::c_int;
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use std::sync::atomic::Ordering;
    use tracing::warn;

    const SIGNALS: [Signal; 2] = [Signal::SIGINT, Signal::SIGTERM];

    extern "C" fn record_signal(_: c_int) {
        INTERRUPTED.store(true, Ordering::SeqCst);
    }

    pub struct Handlers {
        previous: Vec<(Signal, SigAction)>,
    }

    impl Handlers {
        pub fn install() -> Self {
            let action = SigAction::new(
                SigHandler::Handler(record_signal),
                SaFlags::SA_RESTART,
                SigSet::empty(),
            );
            let mut previous = Vec::with_capacity(SIGNALS.len());
            for signal in SIGNALS {
                // SAFETY: the handler only stores to an atomic.
                match unsafe { sigaction(signal, &action) } {
                    Ok(old) => previous.push((signal, old)),
                    Err(e) => warn!("Failed to install {} handler: {}", signal, e),
                }
            }
            Self { previous }
        }
    }

    impl Drop for Handlers {
        fn drop(&mut self) {
            for (signal, old) in self.previous.drain(..) {
                // SAFETY: restores the disposition that was active before install.
                if let Err(e) = unsafe { sigaction(signal, &old) } {
                    warn!("Failed to restore {} handler: {}", signal, e);
                }
            }
        }
    }
}

#[cfg(not(unix))]
mod imp {
    pub struct Handlers;

    impl Handlers {
        pub fn install() -> Self {
            Handlers
        }
    }
}

/// Records SIGINT/SIGTERM for as long as it is alive, then restores the
/// previous dispositions.
///
/// Caught handlers reset to the default across `exec`, so child processes
/// still die on Ctrl-C as usual.
pub struct InterruptGuard {
    _handlers: imp::Handlers,
}

impl InterruptGuard {
    pub fn install() -> Self {
        INTERRUPTED.store(false, Ordering::SeqCst);
        Self {
            _handlers: imp::Handlers::install(),
        }
    }
}
