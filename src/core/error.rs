// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Timing or route configuration is inconsistent.
    ///
    /// Examples:
    /// - countdown starts before the prompt
    /// - countdown window does not end at the sign-out deadline
    InvalidConfig(ConfigError),

    /// An event was rejected because it is invalid in the current state.
    ///
    /// Examples:
    /// - manual prompt requested on a non-kiosk route
    InvalidState(StateError),

    /// An event carried unusable input.
    InvalidEvent(EventError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `countdown_after` must be strictly later than `prompt_after`.
    CountdownNotAfterPrompt,

    /// `sign_out_after` must not be earlier than `countdown_after`.
    SignOutBeforeCountdown,

    /// The visible countdown must end exactly at the sign-out deadline.
    CountdownWindowMismatch { expected_ms: u64, actual_ms: u64 },

    /// Countdown is displayed in whole seconds.
    FractionalCountdown,

    EmptyHomeRoute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    NotKioskContext,
    SignOutInProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    EmptyRoute,
    EmptySessionId,
    NoActiveSession,
}

// ---------------- Display ----------------

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(e) => write!(f, "{e}"),
            Error::InvalidState(e) => write!(f, "{e}"),
            Error::InvalidEvent(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::CountdownNotAfterPrompt =>
                write!(f, "countdown_after must be later than prompt_after"),
            ConfigError::SignOutBeforeCountdown =>
                write!(f, "sign_out_after must not be earlier than countdown_after"),
            ConfigError::CountdownWindowMismatch { expected_ms, actual_ms } =>
                write!(
                    f,
                    "countdown duration is {actual_ms}ms but sign_out_after - countdown_after is {expected_ms}ms"
                ),
            ConfigError::FractionalCountdown =>
                write!(f, "countdown duration must be a whole number of seconds"),
            ConfigError::EmptyHomeRoute =>
                write!(f, "home route must not be empty"),
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::NotKioskContext =>
                write!(f, "not on a kiosk route"),
            StateError::SignOutInProgress =>
                write!(f, "sign-out already in progress"),
        }
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::EmptyRoute =>
                write!(f, "route path is empty"),
            EventError::EmptySessionId =>
                write!(f, "session id is empty"),
            EventError::NoActiveSession =>
                write!(f, "no active session"),
        }
    }
}

impl std::error::Error for Error {}
