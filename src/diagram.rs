//! PlantUML diagrams: source files, the URL token encoding, and the remote
//! renderer client.

/// The deflate + radix-64 token encoding used in render URLs.
pub mod encode;
pub use encode::{DecodeError, decode, encode};

/// The remote render client and its fallback.
pub mod render;
pub use render::{
    FallbackReason, HttpTransport, RenderClient, RenderResult, Response, Transport,
    TransportError,
};

mod source;
pub use source::DiagramSource;
