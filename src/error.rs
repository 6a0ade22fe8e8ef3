#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the card renderer."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the GitHub fetchers, the compositor and the
/// CLI.
///
/// Transport and status failures abort a run. Decode failures on paginated
/// sources never reach the caller: the page walkers log them and stop early.
#[derive(Debug, masterror::Error)]
pub enum Error
{
    /// Wraps I/O errors that occur while reading or writing local files.
    #[error("failed to access {path:?}: {source}")]
    Io {
        /// Location of the file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error,
    },
    /// Returned when the configuration or CLI input violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String,
    },
    /// Wraps serialization errors when writing JSON output.
    #[error("failed to serialize output: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error,
    },
    /// Request construction, connection, body read or deadline failures.
    #[error("transport error: {message}")]
    Transport {
        /// Human readable message describing the transport failure.
        message: String,
    },
    /// The API answered with a non-success HTTP status.
    #[error("{operation} returned HTTP {status}")]
    HttpStatus {
        /// Request that produced the status.
        operation: String,
        /// Numeric HTTP status code.
        status:    u16,
    },
    /// A non-paginated response body could not be decoded.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// Description of the payload being decoded.
        context: String,
        /// Underlying decoding error.
        source:  serde_json::Error,
    },
    /// Surface that exists in the API but is deliberately not implemented.
    #[error("{operation} is not supported yet")]
    Unsupported {
        /// Name of the unsupported operation.
        operation: &'static str,
    },
    /// PNG decoding or encoding failed.
    #[error("image error: {message}")]
    Image {
        /// Human readable message describing the image failure.
        message: String,
    },
    /// Font data could not be parsed.
    #[error("font error: {message}")]
    Font {
        /// Human readable message describing the font failure.
        message: String,
    },
}

impl Error
{
    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M,>(message: M,) -> Self
    where
        M: Into<String,>,
    {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Constructs a transport error from the provided displayable value.
    pub fn transport<M,>(message: M,) -> Self
    where
        M: Into<String,>,
    {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Constructs a decode error for the described payload.
    pub fn decode<C,>(context: C, source: serde_json::Error,) -> Self
    where
        C: Into<String,>,
    {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Constructs an image error from the provided displayable value.
    pub fn image<M,>(message: M,) -> Self
    where
        M: Into<String,>,
    {
        Self::Image {
            message: message.into(),
        }
    }

    /// Returns `true` when repeating the request may succeed.
    ///
    /// Transport failures and server-side statuses (5xx) are retryable;
    /// everything else is deterministic and fails immediately.
    pub fn is_retryable(&self,) -> bool
    {
        match self {
            Self::Transport {
                ..
            } => true,
            Self::HttpStatus {
                status, ..
            } => *status >= 500,
            _ => false,
        }
    }

    /// Formats the error for diagnostics without the variant name.
    pub fn to_display_string(&self,) -> String
    {
        format!("{self}")
    }
}

impl From<serde_yaml::Error,> for Error
{
    fn from(source: serde_yaml::Error,) -> Self
    {
        Self::Parse {
            source,
        }
    }
}

impl From<serde_json::Error,> for Error
{
    fn from(source: serde_json::Error,) -> Self
    {
        Self::Serialize {
            source,
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error,) -> Error
{
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests
{
    use super::Error;

    #[test]
    fn validation_constructor_populates_message()
    {
        let error = Error::validation("something went wrong",);
        match error {
            Error::Validation {
                ref message,
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn to_display_string_matches_display()
    {
        let error = Error::transport("connection reset",);
        assert_eq!(error.to_string(), error.to_display_string());
        assert_eq!(error.to_string(), "transport error: connection reset");
    }

    #[test]
    fn io_error_helper_wraps_path_and_source()
    {
        let path = std::path::Path::new("/tmp/base_image.png",);
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing",);
        let error = super::io_error(path, io_error,);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source,
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn serde_yaml_conversion_maps_to_parse_variant()
    {
        let error = serde_yaml::from_str::<usize,>("not-a-number",).unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::Parse { .. }));
    }

    #[test]
    fn retryable_errors_cover_transport_and_server_statuses()
    {
        assert!(Error::transport("timeout").is_retryable());
        assert!(
            Error::HttpStatus {
                operation: "GET /user/repos".to_owned(),
                status:    502,
            }
            .is_retryable()
        );
        assert!(
            !Error::HttpStatus {
                operation: "GET /user/repos".to_owned(),
                status:    401,
            }
            .is_retryable()
        );
        assert!(!Error::validation("bad").is_retryable());
        assert!(
            !Error::Unsupported {
                operation: "public repository listing",
            }
            .is_retryable()
        );
    }

    #[test]
    fn unsupported_message_names_operation()
    {
        let error = Error::Unsupported {
            operation: "public repository listing",
        };
        assert_eq!(error.to_string(), "public repository listing is not supported yet");
    }
}
