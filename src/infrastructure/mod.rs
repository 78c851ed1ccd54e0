//! Infrastructure layer - External concerns and adapters
//!
//! Concrete gateway, datastore and token adapters plus the HTTP surface.

pub mod adapters;
pub mod http;

pub use adapters::{AuthenticationAdapter, MemoryStore, RazorpayAdapter, Repositories, SupabaseStore};
pub use http::HttpServer;
