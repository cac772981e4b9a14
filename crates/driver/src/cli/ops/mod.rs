pub mod access;
pub mod bucket;
pub mod health;
pub mod serve;
pub mod version;

pub use access::Access;
pub use bucket::Bucket;
pub use health::Health;
pub use serve::Serve;
pub use version::Version;
