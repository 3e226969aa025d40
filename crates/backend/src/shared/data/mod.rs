pub mod artifact_store;
pub mod ttl_cache;
