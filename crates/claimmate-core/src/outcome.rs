//! Result of a best-effort call to an external model.
//!
//! Model-backed features never fail the request that triggered them. Instead
//! they return either the model's answer or a deterministic fallback together
//! with the reason the model could not be used, so callers and tests can tell
//! the two apart.

use std::fmt;

/// Value produced by a model call, or a fallback standing in for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The model answered and the answer was usable.
    Ok(T),
    /// The model was unavailable or its answer unusable; `value` is the fallback.
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, reason: impl fmt::Display) -> Self {
        Outcome::Degraded {
            value,
            reason: reason.to_string(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// The fallback reason, if degraded.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Degraded { value, reason } => Outcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_is_not_degraded() {
        let outcome = Outcome::Ok(3);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.reason(), None);
        assert_eq!(outcome.into_inner(), 3);
    }

    #[test]
    fn test_degraded_keeps_value_and_reason() {
        let outcome = Outcome::degraded("fallback", "no API key");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.reason(), Some("no API key"));
        assert_eq!(*outcome.value(), "fallback");
    }

    #[test]
    fn test_map_preserves_variant() {
        let outcome = Outcome::degraded(2, "timeout").map(|v| v * 10);
        assert_eq!(
            outcome,
            Outcome::Degraded {
                value: 20,
                reason: "timeout".to_string()
            }
        );
    }
}
