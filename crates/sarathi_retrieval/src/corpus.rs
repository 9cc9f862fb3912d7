//! The verse corpus: immutable reference data loaded once at startup.

use anyhow::{Context, Result};
use sarathi_core::Verse;
use std::collections::HashMap;
use std::path::Path;

/// In-memory corpus with id lookup. The JSON file is an array of verse
/// records (one per shloka) with the same fields as [`Verse`].
pub struct Corpus {
    verses: Vec<Verse>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read corpus file: {}", path.as_ref().display()))?;
        let verses: Vec<Verse> =
            serde_json::from_str(&content).context("Failed to parse corpus JSON")?;
        tracing::info!("Loaded {} verses from corpus", verses.len());
        Ok(Self::from_verses(verses))
    }

    pub fn from_verses(verses: Vec<Verse>) -> Self {
        let by_id = verses
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id.clone(), i))
            .collect();
        Self { verses, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Verse> {
        self.by_id.get(id).map(|&i| &self.verses[i])
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Verse> {
        self.verses.iter()
    }
}

/// The fixed substitute verse surfaced when retrieval comes back empty
/// (BG 2.47, the karma-yoga verse). The pipeline guarantees the user never
/// sees zero verses.
pub fn default_fallback_verse() -> Verse {
    Verse {
        id: "BG2.47".to_string(),
        chapter: 2,
        verse: 47,
        shloka: "कर्मण्येवाधिकारस्ते मा फलेषु कदाचन। मा कर्मफलहेतुर्भूर्मा ते सङ्गोऽस्त्वकर्मणि॥"
            .to_string(),
        transliteration: Some(
            "karmaṇy-evādhikāras te mā phaleṣhu kadāchana mā karma-phala-hetur bhūr mā te saṅgo 'stv akarmaṇi"
                .to_string(),
        ),
        eng_meaning: "You have a right to perform your prescribed duty, but not to the fruits of action. Never consider yourself the cause of the results of your activities, and never be attached to not doing your duty."
            .to_string(),
        hin_meaning: Some(
            "तुम्हारा अधिकार केवल कर्म करने में है, फल में नहीं। इसलिए तुम कर्म के फल के हेतु मत बनो और न ही तुम्हारी अकर्म में आसक्ति हो।"
                .to_string(),
        ),
        word_meaning: None,
        themes: vec!["detachment".to_string(), "karma-yoga".to_string(), "duty".to_string()],
    }
}
