pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;

pub use handle::{delete_file, get_file, upload_file};
pub use model::{NewFile, UploadConfig};
pub use repository::FileRepository;
pub use repository_pg::FilePgRepository;
pub use schema::{FileEntity, FileUploadResponse};
pub use service::FileUploadService;
