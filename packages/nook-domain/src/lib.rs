pub mod codec;
pub mod memory_policy;
pub mod ttl;
