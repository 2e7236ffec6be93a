//! app::interrupt
//!
//! Signal-driven cancellation.
//!
//! A single process-wide handler for SIGINT and SIGTERM is installed the first
//! time [`handle`] is called. On a signal, every live context returned by
//! [`handle`] is cancelled. If no such context is alive, or a second signal
//! arrives while the first is still being handled, the process exits with
//! status 130 like an unhandled interrupt would.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError, Weak};

use super::context::{Context, Inner};

const INTERRUPTED_EXIT_CODE: i32 = 130;

static LISTENERS: Mutex<Vec<Weak<Inner>>> = Mutex::new(Vec::new());
static SIGNALS: AtomicUsize = AtomicUsize::new(0);
static INSTALLED: OnceLock<()> = OnceLock::new();

/// Derive a context from `ctx` that is cancelled on interrupt.
pub fn handle(ctx: &Context) -> Context {
    install();
    let child = ctx.with_cancel();
    let mut listeners = LISTENERS.lock().unwrap_or_else(PoisonError::into_inner);
    listeners.retain(|l| l.strong_count() > 0);
    listeners.push(child.downgrade());
    child
}

fn install() {
    INSTALLED.get_or_init(|| {
        if let Err(err) = ctrlc::set_handler(on_signal) {
            log::warn!("interrupt handler not installed: {err}");
        }
    });
}

fn on_signal() {
    let previous = SIGNALS.fetch_add(1, Ordering::SeqCst);
    let listeners = LISTENERS.lock().unwrap_or_else(PoisonError::into_inner);
    let mut cancelled = 0;
    for listener in listeners.iter().filter_map(Weak::upgrade) {
        listener.cancel();
        cancelled += 1;
    }
    log::debug!("interrupt received, cancelled {cancelled} context(s)");
    if cancelled == 0 || previous > 0 {
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_derives_live_child() {
        let parent = Context::background();
        let child = handle(&parent);
        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
