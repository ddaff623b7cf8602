use converse_core::{Error as CoreError, ErrorKind as CoreErrorKind};

use super::{Error, ErrorKind};

impl From<CoreError> for Error<'static> {
    fn from(error: CoreError) -> Self {
        let kind = match error.kind() {
            CoreErrorKind::InvalidInput => ErrorKind::BadRequest,
            CoreErrorKind::Authorization => ErrorKind::Forbidden,
            CoreErrorKind::NotFound => ErrorKind::NotFound,
            CoreErrorKind::Unknown => ErrorKind::Unhandled,
            CoreErrorKind::NetworkError
            | CoreErrorKind::Timeout
            | CoreErrorKind::Serialization
            | CoreErrorKind::ExternalError
            | CoreErrorKind::InternalError
            | CoreErrorKind::Configuration => ErrorKind::InternalServerError,
        };

        // Client errors carry a message written for the caller. Server errors
        // keep theirs out of the envelope.
        let message = error.message().to_owned();
        let context = error.source.as_ref().map(|source| source.to_string());
        let converted = if kind.status_code().is_client_error() && !message.is_empty() {
            kind.with_message(message)
        } else if message.is_empty() {
            kind.into_error()
        } else {
            kind.with_context(message)
        };

        let converted = match context {
            Some(source) if converted.context().is_none() => converted.with_context(source),
            Some(source) => {
                let joined = format!("{}: {source}", converted.context().unwrap_or_default());
                converted.with_context(joined)
            }
            None => converted,
        };

        converted.with_resource(error.kind_str())
    }
}
