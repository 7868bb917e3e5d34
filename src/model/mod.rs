//! Siamese LSTM similarity model.
//!
//! One recurrent encoder and one attention block are shared by four input branches
//! (student answer plus three references). Each branch is flattened, subtracted from the
//! anchor, scored by its own sigmoid head, and the three scores are fused into one
//! probability.
//!
//! The network is described by an explicit [`Topology`] of named nodes whose shapes are
//! checked at construction, and which is persisted next to the weights.

pub mod attention;
pub mod config;
pub mod error;
pub mod graph;
pub mod persistence;
pub mod siamese;

#[cfg(test)]
mod tests;

pub use attention::AttentionBlock;
pub use config::SiameseConfig;
pub use error::ModelError;
pub use graph::{GraphNode, NodeKind, Topology};
pub use persistence::{TOPOLOGY_FILENAME, WEIGHTS_FILENAME};
pub use siamese::{SiameseInputs, SiameseModel};
