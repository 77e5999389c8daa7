pub mod export;
pub mod images;

pub use self::export::ExportService;
