pub mod cache;
pub mod database;
pub mod headers;

pub use cache::{FingerprintCache, MemoryCache};
pub use database::{FingerprintDatabase, BUILTIN_FINGERPRINTS};
pub use headers::{forwarded, names};
