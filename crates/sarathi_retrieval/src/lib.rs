pub mod corpus;
pub mod embedding;
pub mod index;
pub mod repository;
pub mod retriever;

pub use corpus::{default_fallback_verse, Corpus};
pub use embedding::{cosine_similarity, EmbeddingModel};
pub use index::{SqliteVectorIndex, VectorIndex};
pub use repository::VerseRepository;
pub use retriever::{RerankStrategy, ScoreOrder, ThemeAlignment, VerseRetriever};
