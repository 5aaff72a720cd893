//! Commonly used items from nvisy-core.
//!
//! This prelude module exports the most commonly used types and traits to
//! simplify imports in consuming crates.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::fs::{ContentKind, ContentMetadata};
pub use crate::io::{AsyncContentRead, AsyncContentWrite, Content, ContentBytes, ContentData};
pub use crate::path::ContentSource;
