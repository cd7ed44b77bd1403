use uuid::Uuid;

use crate::{
    api::error,
    modules::file_upload::{model::NewFile, schema::FileEntity},
};

#[async_trait::async_trait]
pub trait FileRepository {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError>;

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError>;

    async fn delete(&self, file_id: &Uuid) -> Result<(), error::SystemError>;
}
