//! Panic and error boundary around user callbacks.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// How a guarded callback failed.
#[derive(Debug)]
pub(crate) enum CallbackFailure {
    /// The callback returned an error.
    Error(anyhow::Error),
    /// The callback panicked; holds the panic message.
    Panic(String),
}

impl std::fmt::Display for CallbackFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error(e) => write!(f, "{e:#}"),
            Self::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// Runs `callback`, turning both an `Err` return and a panic into a
/// [`CallbackFailure`].
pub(crate) fn run_guarded<F>(callback: F) -> Result<(), CallbackFailure>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(CallbackFailure::Error(e)),
        Err(payload) => Err(CallbackFailure::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload.downcast_ref::<&str>().map_or_else(
        || {
            payload.downcast_ref::<String>().map_or_else(
                || "Unknown panic".to_string(),
                std::string::ToString::to_string,
            )
        },
        std::string::ToString::to_string,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through() {
        assert!(run_guarded(|| Ok(())).is_ok());
    }

    #[test]
    fn test_error_is_captured() {
        let failure = run_guarded(|| Err(anyhow::anyhow!("bad payload"))).unwrap_err();
        assert!(matches!(failure, CallbackFailure::Error(_)));
        assert_eq!(failure.to_string(), "bad payload");
    }

    #[test]
    fn test_panic_is_captured() {
        let failure = run_guarded(|| panic!("boom")).unwrap_err();
        assert_eq!(failure.to_string(), "panicked: boom");

        let code = 7;
        let failure = run_guarded(|| panic!("code {code}")).unwrap_err();
        assert_eq!(failure.to_string(), "panicked: code 7");
    }
}
