#![doc = include_str!("../README.md")]

mod error;
mod memory;
mod model;
mod traits;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::{InMemoryRepository, DEFAULT_QUOTA_BYTES};
pub use model::{
    BatchRecord, BatchRecordStatus, FileRecord, FileVersionRecord, QuotaRecord, ShareLinkRecord,
};
pub use traits::{
    BatchRepository, FileRepository, QuotaRepository, Repository, ShareLinkRepository,
    VersionRepository,
};
