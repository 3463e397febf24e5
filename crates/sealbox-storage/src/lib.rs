//! sealbox-storage: OpenDAL-backed remote object store

pub mod operator;
pub mod store;

pub use operator::{build_operator, build_operator_from_env, StorageConfig};
pub use store::RemoteStore;
