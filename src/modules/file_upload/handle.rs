use actix_multipart::Multipart;
use actix_web::web;
use futures_util::TryStreamExt;
use uuid::Uuid;

use crate::api::success::Success;
use crate::api::{error, success};
use crate::middlewares::get_claims;
use crate::modules::file_upload::schema::FileUploadResponse;
use crate::modules::file_upload::service::FileUploadService;

/// Append a multipart chunk to the buffer, rejecting as soon as the
/// accumulated size would exceed the cap
fn accumulate_chunk(
    bytes: &mut Vec<u8>,
    chunk: &[u8],
    max_file_size: usize,
) -> Result<(), error::Error> {
    if bytes.len() + chunk.len() > max_file_size {
        return Err(error::Error::bad_request(format!(
            "File size exceeds maximum allowed size of {} bytes",
            max_file_size
        )));
    }
    bytes.extend_from_slice(chunk);
    Ok(())
}

/// Upload file handler
pub async fn upload_file<R>(
    mut payload: Multipart,
    req: actix_web::HttpRequest,
    service: web::Data<FileUploadService<R>>,
) -> Result<success::Success<FileUploadResponse>, error::Error>
where
    R: crate::modules::file_upload::repository::FileRepository + Send + Sync + 'static,
{
    let user_id = get_claims(&req)?.sub;

    // Process multipart form data
    if let Some(mut field) = payload.try_next().await.map_err(|_| error::Error::InternalServer)? {
        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| error::Error::bad_request("Missing content disposition"))?;

        let filename = content_disposition
            .get_filename()
            .ok_or_else(|| error::Error::bad_request("Missing filename"))?
            .to_string();

        // MIME từ field header, fallback đoán theo extension
        let mime_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| mime_guess::from_path(&filename).first_or_octet_stream().to_string());

        // Read file bytes, enforcing the size cap while streaming so an
        // oversized upload is rejected before it is fully buffered
        let max_file_size = service.config().max_file_size;
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|_| error::Error::InternalServer)? {
            accumulate_chunk(&mut bytes, &chunk, max_file_size)?;
        }

        let result = service.upload_file(filename, bytes, mime_type, user_id).await?;

        return Ok(Success::ok(Some(result)).message("File uploaded successfully"));
    }

    Err(error::Error::bad_request("No file found in request"))
}

/// Get file metadata handler
pub async fn get_file<R>(
    file_id: web::Path<Uuid>,
    service: web::Data<FileUploadService<R>>,
) -> Result<success::Success<crate::modules::file_upload::schema::FileEntity>, error::Error>
where
    R: crate::modules::file_upload::repository::FileRepository + Send + Sync + 'static,
{
    let file_id = file_id.into_inner();

    match service.get_file(&file_id).await {
        Ok(Some(file)) => Ok(Success::ok(Some(file))),
        Ok(None) => Err(error::Error::not_found("File not found")),
        Err(e) => Err(error::Error::from(e)),
    }
}

/// Delete file handler
pub async fn delete_file<R>(
    file_id: web::Path<Uuid>,
    req: actix_web::HttpRequest,
    service: web::Data<FileUploadService<R>>,
) -> Result<success::Success<String>, error::Error>
where
    R: crate::modules::file_upload::repository::FileRepository + Send + Sync + 'static,
{
    let file_id = file_id.into_inner();
    let user_id = get_claims(&req)?.sub;

    // Get file to check ownership
    match service.get_file(&file_id).await {
        Ok(Some(file)) => {
            if file.uploaded_by != user_id {
                return Err(error::Error::forbidden(
                    "You don't have permission to delete this file",
                ));
            }

            service.delete_file(&file_id).await?;
            Ok(Success::ok(Some("File deleted successfully".to_string()))
                .message("File deleted successfully"))
        }
        Ok(None) => Err(error::Error::not_found("File not found")),
        Err(e) => Err(error::Error::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_chunk_rejects_when_cap_exceeded() {
        let mut bytes = Vec::new();

        accumulate_chunk(&mut bytes, &[0u8; 4], 10).unwrap();
        accumulate_chunk(&mut bytes, &[0u8; 4], 10).unwrap();
        assert_eq!(bytes.len(), 8);

        // Third chunk would push the total past the cap: reject, no growth
        assert!(accumulate_chunk(&mut bytes, &[0u8; 4], 10).is_err());
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn test_accumulate_chunk_allows_exact_cap() {
        let mut bytes = Vec::new();
        accumulate_chunk(&mut bytes, &[0u8; 10], 10).unwrap();
        assert_eq!(bytes.len(), 10);
    }
}
