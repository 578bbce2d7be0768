//! Reactions to illegal container operations
//!
//! Popping an empty buffer, removing past the end, or using a released buffer
//! are fatal conditions. Each container carries an [`IllegalOpPolicy`] chosen
//! at construction that decides what happens next: report and abort the
//! process (the default), panic, or log and continue with a default result.

use crate::error::{ContainerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::str::FromStr;
use std::sync::Arc;

/// What a container does after an illegal operation is detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultAction {
    /// Report the condition on stderr and the log, then abort the process
    #[default]
    Terminate,
    /// Panic with the error message
    Panic,
    /// Log a warning and continue, returning a default value
    ReturnDefault,
}

impl FaultAction {
    /// Name used in configuration files and environment variables
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Terminate => "terminate",
            Self::Panic => "panic",
            Self::ReturnDefault => "return_default",
        }
    }
}

impl fmt::Display for FaultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultAction {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminate" | "abort" => Ok(Self::Terminate),
            "panic" => Ok(Self::Panic),
            "return_default" | "default" | "continue" => Ok(Self::ReturnDefault),
            other => Err(ContainerError::configuration(format!(
                "unknown illegal-operation action '{}', expected terminate, panic or return_default",
                other
            ))),
        }
    }
}

type Handler = dyn Fn(&ContainerError) -> FaultAction + Send + Sync;

/// Policy consulted once per illegal operation
///
/// Either a fixed [`FaultAction`] or a caller-supplied handler that inspects
/// the error and picks the action. Handlers are shared, so cloning a policy
/// (for example into every bucket of a map) is cheap.
///
/// ```rust
/// use growmap::{GrowableBuffer, IllegalOpPolicy};
///
/// let mut buf: GrowableBuffer<u32> =
///     GrowableBuffer::with_policy(IllegalOpPolicy::return_default());
/// assert_eq!(buf.pop(), 0);
/// assert_eq!(buf.size(), 0);
/// ```
#[derive(Clone)]
pub enum IllegalOpPolicy {
    /// Always take the same action
    Action(FaultAction),
    /// Let a callback decide per error
    Handler(Arc<Handler>),
}

impl IllegalOpPolicy {
    /// Abort the process after reporting
    pub fn terminate() -> Self {
        Self::Action(FaultAction::Terminate)
    }

    /// Panic with the error message
    pub fn panic() -> Self {
        Self::Action(FaultAction::Panic)
    }

    /// Continue with a default result
    pub fn return_default() -> Self {
        Self::Action(FaultAction::ReturnDefault)
    }

    /// Invoke `f` for every illegal operation and follow the action it returns
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&ContainerError) -> FaultAction + Send + Sync + 'static,
    {
        Self::Handler(Arc::new(f))
    }

    /// Resolve the action for `err` and carry it out
    ///
    /// Returns only when the action is [`FaultAction::ReturnDefault`]; the
    /// caller then produces its default result.
    #[track_caller]
    pub fn raise(&self, err: ContainerError) {
        let action = match self {
            Self::Action(action) => *action,
            Self::Handler(handler) => handler(&err),
        };
        let location = Location::caller();

        match action {
            FaultAction::Terminate => {
                log::error!("{}:{}: fatal container condition: {}", location.file(), location.line(), err);
                eprintln!("{}:{}: die: {} !", location.file(), location.line(), err);
                std::process::abort();
            }
            FaultAction::Panic => panic!("{}", err),
            FaultAction::ReturnDefault => {
                log::warn!(
                    "{}:{}: illegal {} operation ignored: {}",
                    location.file(),
                    location.line(),
                    err.category(),
                    err
                );
            }
        }
    }
}

impl Default for IllegalOpPolicy {
    fn default() -> Self {
        Self::Action(FaultAction::default())
    }
}

impl From<FaultAction> for IllegalOpPolicy {
    fn from(action: FaultAction) -> Self {
        Self::Action(action)
    }
}

impl fmt::Debug for IllegalOpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_is_terminate() {
        assert_eq!(FaultAction::default(), FaultAction::Terminate);
        assert!(matches!(
            IllegalOpPolicy::default(),
            IllegalOpPolicy::Action(FaultAction::Terminate)
        ));
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!("terminate".parse::<FaultAction>().unwrap(), FaultAction::Terminate);
        assert_eq!("PANIC".parse::<FaultAction>().unwrap(), FaultAction::Panic);
        assert_eq!(
            " return_default ".parse::<FaultAction>().unwrap(),
            FaultAction::ReturnDefault
        );
        assert!("explode".parse::<FaultAction>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for action in [FaultAction::Terminate, FaultAction::Panic, FaultAction::ReturnDefault] {
            assert_eq!(action.to_string().parse::<FaultAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_return_default_continues() {
        let policy = IllegalOpPolicy::return_default();
        policy.raise(ContainerError::empty_container("pop"));
    }

    #[test]
    #[should_panic(expected = "Empty container")]
    fn test_panic_action() {
        IllegalOpPolicy::panic().raise(ContainerError::empty_container("pop"));
    }

    #[test]
    fn test_handler_sees_every_error() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let policy = IllegalOpPolicy::handler(move |err| {
            assert!(err.is_illegal_operation());
            counter.fetch_add(1, Ordering::SeqCst);
            FaultAction::ReturnDefault
        });

        policy.raise(ContainerError::index_out_of_range(4, 2));
        policy.clone().raise(ContainerError::empty_container("pop"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", IllegalOpPolicy::panic()), "Action(Panic)");
        let handler = IllegalOpPolicy::handler(|_| FaultAction::ReturnDefault);
        assert_eq!(format!("{:?}", handler), "Handler(..)");
    }
}
