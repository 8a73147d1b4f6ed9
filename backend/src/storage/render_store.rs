use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use hex;
use sha2::{Digest, Sha256};

/// S3-backed store for generated preview renders (recolors and cutouts).
/// Keys are derived from the source image hash so identical requests
/// overwrite rather than accumulate.
#[derive(Clone)]
pub struct RenderStore {
    client: Client,
    bucket_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderStoreError {
    #[error("S3 error: {0}")]
    S3(String),
    #[error("File too large")]
    FileTooLarge,
}

impl RenderStore {
    pub fn new(client: Client, bucket_name: String) -> Self {
        Self {
            client,
            bucket_name,
        }
    }

    pub fn source_hash(image_data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(image_data);
        hex::encode(hasher.finalize())
    }

    pub fn recolor_key(source_hash: &str, color: &str, finish: &str) -> String {
        format!("renders/{source_hash}/{color}-{finish}.png")
    }

    pub fn cutout_key(source_hash: &str) -> String {
        format!("renders/{source_hash}/cutout.png")
    }

    pub fn validate_render_size(render_data: &[u8]) -> Result<(), RenderStoreError> {
        const MAX_SIZE: usize = 50 * 1024 * 1024;
        if render_data.len() > MAX_SIZE {
            return Err(RenderStoreError::FileTooLarge);
        }
        Ok(())
    }

    pub async fn store_render(&self, render_data: &[u8], key: &str) -> Result<(), RenderStoreError> {
        RenderStore::validate_render_size(render_data)?;

        let body = ByteStream::from(render_data.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(body)
            .content_type("image/png")
            .send()
            .await
            .map_err(|e| RenderStoreError::S3(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_stable_per_source_and_options() {
        let hash = RenderStore::source_hash(b"same bytes");
        assert_eq!(hash, RenderStore::source_hash(b"same bytes"));
        assert_eq!(
            RenderStore::recolor_key(&hash, "brown", "glossy"),
            format!("renders/{hash}/brown-glossy.png")
        );
        assert_eq!(
            RenderStore::cutout_key(&hash),
            format!("renders/{hash}/cutout.png")
        );
    }

    #[test]
    fn oversized_renders_are_rejected() {
        let data = vec![0u8; 50 * 1024 * 1024 + 1];
        assert!(matches!(
            RenderStore::validate_render_size(&data),
            Err(RenderStoreError::FileTooLarge)
        ));
    }
}
