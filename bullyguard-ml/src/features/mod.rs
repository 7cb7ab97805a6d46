//! Feature extraction from text into sparse vectors.

pub mod vectorizer;

pub use vectorizer::{SparseVector, Vectorizer, VectorizerKind};
