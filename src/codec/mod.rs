//! Text encoding of parameter values.
//!
//! Every value is written as whitespace separated tokens and numbers use the
//! shortest representation that parses back to the exact same float, so a decoded
//! value is identical to the encoded one.

mod error;
mod reader;
mod text;

pub use error::{DecodeErr, Result};
pub use reader::TokenReader;
pub use text::{Serialize, deserialize_dense, deserialize_sparse};
