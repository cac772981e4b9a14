pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Access, Bucket, Health, Serve, Version};
