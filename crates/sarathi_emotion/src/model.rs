use async_trait::async_trait;

/// The black-box multi-label text classifier behind the detector.
///
/// Implementations return raw `(label, score)` pairs in any order; the
/// [`crate::EmotionDetector`] adapter owns thresholding, display metadata
/// and the neutral fallback.
#[async_trait]
pub trait EmotionModel: Send + Sync {
    async fn classify(&self, text: &str) -> anyhow::Result<Vec<(String, f32)>>;
}
