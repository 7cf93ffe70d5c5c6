// Copyright 2025 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

/// A malformed subscription request.
///
/// This indicates a defect in the calling code; the binder state is left
/// untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// The subscription carried no callable handler.
    #[error("a callable handler is required to bind event `{event}`")]
    MissingHandler {
        /// The event name as the caller wrote it.
        event: String,
    },
}
