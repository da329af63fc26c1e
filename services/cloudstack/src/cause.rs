use stacksign_core::{Error, ErrorKind};

/// Stable cause of a CloudStack failure.
///
/// CloudStack reports several distinct conditions only through the wording
/// of `errortext`. Match on this enum instead of on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCause {
    /// Nothing changed since the last snapshot, so none was taken.
    NotModified,
    /// The account is not allowed to run the command.
    PermissionDenied,
    /// The account behind the keys does not exist.
    AccountNotFound,
    /// The keys were rejected.
    Unauthorized,
    /// Anything else.
    Other,
}

// The only place where errortext wording is matched. Lower-case needles.
const MESSAGE_CAUSES: &[(&str, ErrorCause)] = &[
    ("no change since last snapshot", ErrorCause::NotModified),
    ("does not have permission", ErrorCause::PermissionDenied),
    ("unable to find account", ErrorCause::AccountNotFound),
];

impl ErrorCause {
    /// Classify an error.
    pub fn of(err: &Error) -> Self {
        match err.kind() {
            ErrorKind::AuthenticationFailed => return ErrorCause::Unauthorized,
            ErrorKind::ServiceError => {}
            _ => return ErrorCause::Other,
        }

        let message = err.message().to_lowercase();
        if let Some((_, cause)) = MESSAGE_CAUSES
            .iter()
            .find(|(needle, _)| message.contains(needle))
        {
            return *cause;
        }

        match err.code() {
            Some(531) => ErrorCause::AccountNotFound,
            _ => ErrorCause::Other,
        }
    }
}
