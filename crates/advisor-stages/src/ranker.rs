//! Context ranking by query-vocabulary overlap
//!
//! A document's relevance is the fraction of distinct query words that also
//! occur in the document. Documents at or below the threshold are dropped,
//! survivors are ordered best first and the list is cut to `max_documents`.

use advisor_core::{ContextDocument, PipelineState, Stage, StageError};
use advisor_in::word_set;
use std::collections::HashSet;

pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_MAX_DOCUMENTS: usize = 3;

#[derive(Debug, Clone)]
pub struct ContextRanker {
    threshold: f64,
    max_documents: usize,
}

impl Default for ContextRanker {
    fn default() -> Self {
        Self::new(DEFAULT_RELEVANCE_THRESHOLD, DEFAULT_MAX_DOCUMENTS)
    }
}

impl ContextRanker {
    pub fn new(threshold: f64, max_documents: usize) -> Self {
        Self {
            threshold,
            max_documents,
        }
    }

    /// Fraction of distinct query words present in `content`; 0 for an empty query
    pub fn relevance(query: &str, content: &str) -> f64 {
        Self::score(&word_set(query), content)
    }

    fn score(query_words: &HashSet<String>, content: &str) -> f64 {
        if query_words.is_empty() {
            return 0.0;
        }

        let doc_words = word_set(content);
        let overlap = query_words.intersection(&doc_words).count();
        overlap as f64 / query_words.len() as f64
    }

    /// Score, filter, sort (best first, ties keep input order) and truncate
    pub fn rank(&self, documents: Vec<ContextDocument>, query: &str) -> Vec<ContextDocument> {
        let query_words = word_set(query);

        let mut ranked: Vec<ContextDocument> = documents
            .into_iter()
            .filter_map(|mut doc| {
                let score = Self::score(&query_words, &doc.content);
                doc.relevance_score = Some(score);
                (score > self.threshold).then_some(doc)
            })
            .collect();

        ranked.sort_by(|a, b| {
            let a = a.relevance_score.unwrap_or_default();
            let b = b.relevance_score.unwrap_or_default();
            b.total_cmp(&a)
        });
        ranked.truncate(self.max_documents);
        ranked
    }
}

/// Re-ranks `state.retrieved_context` against the user message
#[derive(Default)]
pub struct RankContextStage {
    ranker: ContextRanker,
}

impl RankContextStage {
    pub fn new(ranker: ContextRanker) -> Self {
        Self { ranker }
    }
}

impl Stage for RankContextStage {
    fn id(&self) -> &'static str {
        "rank.context.v1"
    }

    fn run(&self, mut state: PipelineState) -> Result<PipelineState, StageError> {
        let documents = std::mem::take(&mut state.retrieved_context);
        state.retrieved_context = self.ranker.rank(documents, state.user_message());
        Ok(state)
    }
}
