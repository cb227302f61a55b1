//! Wire cursors for PostgreSQL binary field encoding/decoding
//!
//! All multi-byte integers use network byte order. A cursor is bound to a
//! single in-flight message and is never shared between threads.

mod read;
mod write;

pub use read::ReadBuffer;
pub use write::WriteBuffer;
