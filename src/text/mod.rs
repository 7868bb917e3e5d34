//! Text → vector → padded-tensor pipeline.
//!
//! [`Tokenizer`] splits raw answers into word tokens, [`Vectorizer`] turns tokens into
//! word vectors (dropping punctuation and out-of-vocabulary tokens), and [`pad_sequences`]
//! unifies variable-length vector sequences into one `(batch, L, D)` block.

pub mod error;
pub mod padding;
pub mod tokenizer;
pub mod vectorizer;


pub use error::TextError;
pub use padding::{PaddedTensor, pad_sequences};
pub use tokenizer::Tokenizer;
pub use vectorizer::{VectorSequence, VectorizedSplit, Vectorizer, max_sequence_len};
