//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod http_transport;
mod snapshot_store;

#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{
    HttpMethod, HttpTransport, TransportError, TransportRequest, TransportResponse,
};
#[cfg(test)]
pub use snapshot_store::MockSnapshotStore;
pub use snapshot_store::{SESSION_SNAPSHOT_KEY, SnapshotStore, SnapshotStoreError};
