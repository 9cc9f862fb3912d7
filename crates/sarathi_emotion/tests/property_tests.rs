//! Property tests for detector totality: any input text and any classifier
//! behavior still yields a non-empty, well-formed result.

use async_trait::async_trait;
use proptest::prelude::*;
use sarathi_emotion::{EmotionDetector, EmotionModel, LexiconModel};
use std::sync::Arc;

struct ArbitraryModel {
    scores: Vec<(String, f32)>,
    fail: bool,
}

#[async_trait]
impl EmotionModel for ArbitraryModel {
    async fn classify(&self, _text: &str) -> anyhow::Result<Vec<(String, f32)>> {
        if self.fail {
            anyhow::bail!("induced failure")
        }
        Ok(self.scores.clone())
    }
}

proptest! {
    #[test]
    fn detect_is_total_for_any_text(text in "\\PC{0,200}") {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let detector = EmotionDetector::new(Arc::new(LexiconModel::new()));
            let emotions = detector.detect(&text, 0.3).await;
            prop_assert!(!emotions.is_empty());
            for e in &emotions {
                prop_assert!((0.0..=1.0).contains(&e.confidence));
                prop_assert!(!e.label.is_empty());
                prop_assert!(!e.emoji.is_empty());
            }
            Ok(())
        })?;
    }

    #[test]
    fn detect_is_total_for_any_classifier_output(
        scores in proptest::collection::vec(("[a-z]{1,12}", -2.0f32..2.0f32), 0..8),
        fail in any::<bool>(),
        threshold in 0.0f32..1.0f32,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let model = Arc::new(ArbitraryModel { scores, fail });
            let detector = EmotionDetector::new(model);
            let emotions = detector.detect("input", threshold).await;

            prop_assert!(!emotions.is_empty());
            // Sorted descending by confidence, all bounded.
            for pair in emotions.windows(2) {
                prop_assert!(pair[0].confidence >= pair[1].confidence);
            }
            for e in &emotions {
                prop_assert!((0.0..=1.0).contains(&e.confidence));
            }
            let dominant = EmotionDetector::dominant(&emotions);
            prop_assert!((0.0..=1.0).contains(&dominant.confidence));
            Ok(())
        })?;
    }
}
