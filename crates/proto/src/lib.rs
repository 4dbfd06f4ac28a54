//! Shared wire types for tandem clients and servers.
//!
//! Messages travel as one JSON object per line. Operations use the compact
//! array encoding from [`tandem_primitives`] and selections the
//! `{"ranges": [...]}` object form.

#![warn(missing_docs)]

pub mod codec;
pub mod types;

pub use codec::{CodecError, MAX_FRAME_LEN, read_message, write_message};
pub use types::*;
