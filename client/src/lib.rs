//! Client for the student, staff and administrator portal.
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - [`domain`] holds the request gateway, endpoint wrappers, session cache
//!   and the [`domain::Portal`] facade, written against the ports in
//!   [`domain::ports`].
//! - [`outbound`] implements those ports with `reqwest` and the local
//!   state directory.
//! - [`inbound`] drives the facade from the `portal` command line.

pub mod domain;
pub mod inbound;
pub mod outbound;

mod config;

pub use config::{InvalidOriginError, PortalSettings};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
