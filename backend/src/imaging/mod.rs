pub mod classifier;
pub mod segmentation;
pub mod transform;

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("image decode error: {0}")]
    Decode(String),
    #[error("image encode error: {0}")]
    Encode(String),
    #[error("classifier error: {0}")]
    Classifier(String),
}
