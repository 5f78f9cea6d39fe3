pub mod ingest;
pub mod packager;
pub mod prototype_usecase;

pub use ingest::{IngestFailure, IngestReport, ScreenCollector, UploadedFile};
pub use packager::{ARCHIVE_FILE_NAME, PrototypeArchive, package};
pub use prototype_usecase::{IngestOutcome, PrototypeUseCase};
