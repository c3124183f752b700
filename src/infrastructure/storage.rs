use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    primitives::ByteStream,
    Client as S3Client,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::utils::config::DocumentStorageConfig;
use crate::utils::error::{AppError, Result};

/// Stockage des justificatifs professionnels
#[derive(Clone)]
pub enum DocumentStorage {
    Local { root: PathBuf },
    S3 { client: S3Client, bucket: String },
}

impl DocumentStorage {
    pub fn from_config(config: &DocumentStorageConfig) -> Self {
        match config {
            DocumentStorageConfig::Local { root } => {
                info!("📁 Stockage local des documents: {}", root.display());
                DocumentStorage::Local { root: root.clone() }
            }
            DocumentStorageConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                bucket,
                region,
            } => {
                info!("☁️  Stockage S3 des documents, bucket: {}", bucket);
                DocumentStorage::S3 {
                    client: Self::create_s3_client(endpoint, access_key, secret_key, region),
                    bucket: bucket.clone(),
                }
            }
        }
    }

    /// Créer le client S3
    fn create_s3_client(endpoint: &str, access_key: &str, secret_key: &str, region: &str) -> S3Client {
        let creds = Credentials::new(access_key, secret_key, None, None, "static");

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(creds)
            .endpoint_url(endpoint)
            .region(Region::new(region.to_string()))
            .force_path_style(true)
            .build();

        S3Client::from_conf(config)
    }

    /// Enregistrer un document sous la clé donnée
    pub async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        match self {
            DocumentStorage::Local { root } => {
                let path = local_path(root, key)?;
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(&path, data).await?;
            }
            DocumentStorage::S3 { client, bucket } => {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(key)
                    .content_type(content_type)
                    .body(ByteStream::from(data.to_vec()))
                    .send()
                    .await
                    .map_err(|e| AppError::StorageError(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Lire un document
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        match self {
            DocumentStorage::Local { root } => {
                let path = local_path(root, key)?;
                fs::read(&path).await.map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => AppError::NotFound(format!("Document {}", key)),
                    _ => AppError::StorageError(e.to_string()),
                })
            }
            DocumentStorage::S3 { client, bucket } => {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|e| AppError::StorageError(e.to_string()))?;

                let body = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::StorageError(e.to_string()))?;
                Ok(body.into_bytes().to_vec())
            }
        }
    }
}

/// Résout une clé sous la racine en refusant toute remontée de répertoire
fn local_path(root: &Path, key: &str) -> Result<PathBuf> {
    if key.split('/').any(|part| part.is_empty() || part == "..") {
        return Err(AppError::StorageError(format!("Clé de stockage invalide: {}", key)));
    }
    Ok(root.join(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_put_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DocumentStorage::Local {
            root: dir.path().to_path_buf(),
        };

        storage
            .put("pro/abc/kbis.pdf", b"%PDF-1.4", "application/pdf")
            .await
            .unwrap();
        let data = storage.get("pro/abc/kbis.pdf").await.unwrap();
        assert_eq!(data, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_local_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DocumentStorage::Local {
            root: dir.path().to_path_buf(),
        };
        assert!(matches!(storage.get("absent.pdf").await, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_rejects_traversal() {
        assert!(local_path(Path::new("/data"), "../etc/passwd").is_err());
        assert!(local_path(Path::new("/data"), "pro//x").is_err());
        assert!(local_path(Path::new("/data"), "pro/x/kbis.pdf").is_ok());
    }
}
