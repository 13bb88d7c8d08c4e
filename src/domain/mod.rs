pub mod article;
pub mod snapshot;

pub use article::{Article, RawArticle, SourceRef};
pub use snapshot::{decode_snapshot, encode_snapshot};
