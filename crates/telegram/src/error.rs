//! Mapping of Bot API failures onto registry errors.

use {
    botmux_channels::Error,
    teloxide::{ApiError, RequestError},
};

/// Wrap a failed request, keeping the provider error as the source.
pub(crate) fn request(context: &str, err: RequestError) -> Error {
    Error::transport(context, err)
}

/// `getMe` failures: a rejected token becomes an authentication error.
pub(crate) fn identity(err: RequestError) -> Error {
    match err {
        RequestError::Api(ApiError::InvalidToken) => {
            Error::authentication_failed(ApiError::InvalidToken)
        },
        other => request("getMe", other),
    }
}

/// Another process is long-polling the same token.
pub(crate) fn is_conflict(err: &RequestError) -> bool {
    matches!(err, RequestError::Api(ApiError::TerminatedByOtherGetUpdates))
}
