// src/utils/progress_bars/progress_callback.rs - Phase callbacks for long-running stages

use indicatif::ProgressBar;
use std::sync::Arc;

/// Type alias for progress callback functions
/// Takes phase name and optional detailed progress information
pub type ProgressCallback = Arc<dyn Fn(String, Option<String>) + Send + Sync>;

/// Callback that mirrors phase updates onto a progress bar's message.
pub fn bar_callback(bar: ProgressBar) -> ProgressCallback {
    Arc::new(move |phase: String, details: Option<String>| match details {
        Some(details) => bar.set_message(format!("{}: {}", phase, details)),
        None => bar.set_message(phase),
    })
}

/// Convenience macro for updating progress
#[macro_export]
macro_rules! update_progress {
    ($callback:expr, $phase:expr) => {
        if let Some(ref cb) = $callback {
            cb($phase.to_string(), None);
        }
    };
    ($callback:expr, $phase:expr, $details:expr) => {
        if let Some(ref cb) = $callback {
            cb($phase.to_string(), Some($details.to_string()));
        }
    };
}

/// Convenience macro for updating progress with detailed information
#[macro_export]
macro_rules! update_detailed_progress {
    ($callback:expr, $phase:expr, $current:expr, $total:expr) => {
        if let Some(ref cb) = $callback {
            let details = format!("{}/{}", $current, $total);
            cb($phase.to_string(), Some(details));
        }
    };
    ($callback:expr, $phase:expr, $current:expr, $total:expr, $extra:expr) => {
        if let Some(ref cb) = $callback {
            let details = format!("{}/{} ({})", $current, $total, $extra);
            cb($phase.to_string(), Some(details));
        }
    };
}
