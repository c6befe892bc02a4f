//! Tokenization, scoring, fusion and result assembly.

pub mod assembler;
pub mod hybrid_search;
pub mod lexical;
pub mod semantic;
pub mod tokenizer;
pub mod weights;

pub use assembler::{ResultAssembler, SearchResponse, SearchResult, SimilarResponse};
pub use hybrid_search::{
    HybridRanker, RankedCandidates, ScoredCandidate, SearchMode, SearchRequest,
};
pub use lexical::{LexicalHit, LexicalOutcome, LexicalScorer, LexicalStrategy, TokenizedDocument};
pub use semantic::{SemanticHit, SemanticOutcome, VectorScorer, cosine_similarity};
pub use tokenizer::tokenize;
pub use weights::RankingWeights;
