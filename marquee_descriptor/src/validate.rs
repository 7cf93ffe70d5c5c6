// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::borrow::ToOwned;
use alloc::string::String;

use crate::resolve::has_stage_prefix;

/// Why an emission request was rejected.
///
/// These are usage errors: callers log them and treat the emission as a no-op.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    /// The name is empty or carries a stage prefix, which cannot be emitted.
    #[error("cannot emit `{name}`: event names must be non-empty and carry no `before`, `after` or `_` prefix")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
    /// The emitter did not identify itself.
    #[error("cannot emit `{name}`: an emitter id is required")]
    MissingId {
        /// The name that was being emitted.
        name: String,
    },
}

/// Check an emission request.
///
/// The name is checked first, so a request with both a bad name and a missing
/// id reports [`EmitError::InvalidName`].
///
/// ```
/// use marquee_descriptor::{EmitError, validate_emission};
///
/// assert!(validate_emission("danmaku", "play").is_ok());
/// assert!(matches!(validate_emission("", "play"), Err(EmitError::MissingId { .. })));
/// assert!(matches!(validate_emission("danmaku", "beforePlay"), Err(EmitError::InvalidName { .. })));
/// ```
pub fn validate_emission(id: &str, name: &str) -> Result<(), EmitError> {
    if name.is_empty() || has_stage_prefix(name) {
        return Err(EmitError::InvalidName {
            name: name.to_owned(),
        });
    }
    if id.is_empty() {
        return Err(EmitError::MissingId {
            name: name.to_owned(),
        });
    }
    Ok(())
}
