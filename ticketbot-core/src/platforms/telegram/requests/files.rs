// File: ticketbot-core/src/platforms/telegram/requests/files.rs

use serde::Deserialize;
use serde_json::json;
use crate::platforms::telegram::client::{transport_error, TelegramClient};
use crate::Error;

#[derive(Debug, Deserialize)]
pub struct RemoteFile {
    pub file_id: String,
    pub file_size: Option<u64>,
    pub file_path: Option<String>,
}

pub async fn get_file(client: &TelegramClient, file_id: &str) -> Result<RemoteFile, Error> {
    client.call("getFile", &json!({ "file_id": file_id })).await
}

/// getFile, then fetch the bytes from the file endpoint.
pub async fn download(client: &TelegramClient, file_id: &str) -> Result<Vec<u8>, Error> {
    let remote = get_file(client, file_id).await?;
    let file_path = remote
        .file_path
        .ok_or_else(|| Error::Platform(format!("getFile returned no path for {}", file_id)))?;

    let resp = client
        .http_client()
        .get(client.file_url(&file_path))
        .send()
        .await
        .map_err(|e| transport_error("file download", e))?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Platform(format!("file download: HTTP {} => {}", status, body)));
    }
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| transport_error("file download", e))?;
    Ok(bytes.to_vec())
}
