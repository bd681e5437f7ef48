pub mod entities;
pub mod errors;
pub mod ports;
pub mod text;

pub use entities::*;
pub use errors::{DomainError, Result};
pub use text::{chunk_text, truncate_to_bytes, Chunks, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_BYTES};
