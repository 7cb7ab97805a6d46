//! Model zoo: the fixed set of trainable configurations.

pub mod registry;

pub use registry::{ModelConfig, ModelDescriptor, ModelKey, ModelRegistry, ModelZoo};
