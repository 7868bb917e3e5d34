//! Word-vector lookup and compute-device selection.
//!
//! - [`table`] holds the immutable token → vector mapping and its GloVe-text loader.
//! - [`device`] picks the candle device the model runs on.

/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Token → vector lookup table.
pub mod table;

#[cfg(test)]
mod tests;

pub use device::{DevicePreference, device_label, select_device};
pub use error::EmbeddingError;
pub use table::EmbeddingTable;
