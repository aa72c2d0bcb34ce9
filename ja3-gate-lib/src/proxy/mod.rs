pub mod connection;
pub mod forwarding;
pub mod handler;
pub mod http_result;
pub mod server;
pub mod synthetic_response;

pub use connection::{ConnectionGuard, ConnectionInfo};
pub use handler::{handle_request, respond, ProxyContext};
pub use http_result::HttpError;
pub use server::{run, serve};
