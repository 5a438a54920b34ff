//! Debug-gated diagnostics
//!
//! Production behavior is silent-degrade: nothing is emitted unless the
//! caller opted in via `Options::debug`. Enabled diagnostics go through
//! `tracing` under the `scrollkeep` target.

/// Diagnostic logger created from the `debug` option.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Diag {
    enabled: bool,
}

impl Diag {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub(crate) fn log(&self, message: &str) {
        if self.enabled {
            tracing::debug!(target: "scrollkeep", "{message}");
        }
    }

    pub(crate) fn warn(&self, message: &str) {
        if self.enabled {
            tracing::warn!(target: "scrollkeep", "{message}");
        }
    }

    pub(crate) fn error(&self, message: &str) {
        if self.enabled {
            tracing::error!(target: "scrollkeep", "{message}");
        }
    }
}
