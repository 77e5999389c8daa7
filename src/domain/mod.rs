pub mod block;
pub mod page;
pub mod post;

pub use self::block::Block;
pub use self::page::PageRecord;
pub use self::post::ExtractedPost;
