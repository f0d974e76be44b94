use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn validation(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Validation {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_date_format(format: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidDateFormat {
                format: format.into(),
            }
            .into(),
        )
    }

    pub fn unsupported_constraint(
        field: impl Into<String>,
        value_type: impl Into<String>,
    ) -> Error {
        Error(
            ErrorKind::UnsupportedConstraint {
                field: field.into(),
                value_type: value_type.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    /// Returns `true` for the errors a caller caused by supplying a malformed
    /// request (bad constraint value, unknown date format, constraint over a
    /// non-comparable type).
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation { .. }
                | ErrorKind::InvalidDateFormat { .. }
                | ErrorKind::UnsupportedConstraint { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid format [{format}]")]
    InvalidDateFormat { format: String },

    #[error("field [{field}] of type [{value_type}] does not support index constraints")]
    UnsupportedConstraint { field: String, value_type: String },

    #[error("invalid wire format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("IO error for '{context}': {source}'")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date_format_message() {
        let err = Error::invalid_date_format("xyz");
        assert_eq!(err.to_string(), "Invalid format [xyz]");
        assert!(err.is_validation());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io.into();
        assert!(matches!(err.kind(), ErrorKind::Io { .. }));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_into_kind() {
        let err = Error::unsupported_constraint("location", "geo_point");
        match err.into_kind() {
            ErrorKind::UnsupportedConstraint { field, value_type } => {
                assert_eq!(field, "location");
                assert_eq!(value_type, "geo_point");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }
}
