//! Public API for the remote point layer

pub use crate::point::error::{PointError, PointResult};
pub use crate::point::memory::MemoryServer;
pub use crate::point::traits::{
    ConnectionCallback, ConnectionSubscription, PointProvider, RemotePoint,
};
pub use crate::point::value::PointValue;
