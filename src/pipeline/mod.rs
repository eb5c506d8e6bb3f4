
use tracing::{debug, info};

use crate::cache::{CacheProbe, CacheRecord, CacheStore};
use crate::chat::{CompletionClient, build_system_prompt};
use crate::config::Config;
use crate::dataset::{DatasetClient, corpus_texts};
use crate::embeddings::EmbeddingClient;
use crate::retrieval::rank;
use crate::{ChatError, Result};

/// Currently loaded corpus: the texts, their embedding matrix, and when the
/// matrix was last (re)built. Row `i` of the matrix embeds `texts[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusState {
    pub texts: Vec<String>,
    pub matrix: Vec<Vec<f32>>,
    pub timestamp: String,
}

/// Wires fetcher, embedding client, cache store, ranker, and completion
/// client into the two user-facing actions: refresh embeddings and answer a
/// message. Stateless per request; the only persistent state is the cache
/// record on disk.
pub struct Chatbot {
    dataset: DatasetClient,
    embeddings: EmbeddingClient,
    completion: CompletionClient,
    cache: CacheStore,
    top_k: usize,
    context_token_budget: usize,
}

impl Chatbot {
    #[inline]
    pub fn new(config: &Config, api_key: String) -> Result<Self> {
        let dataset_url = config
            .retrieval
            .dataset_url()
            .map_err(|e| ChatError::Config(e.to_string()))?;

        Ok(Self {
            dataset: DatasetClient::new(dataset_url),
            embeddings: EmbeddingClient::new(&config.openai, api_key.clone())?,
            completion: CompletionClient::new(&config.openai, api_key)?,
            cache: CacheStore::new(config.cache_blob_path(), config.cache_timestamp_path()),
            top_k: config.retrieval.top_k,
            context_token_budget: config.retrieval.context_token_budget,
        })
    }

    /// Serve the cached corpus, or run the full fetch → normalize → embed →
    /// persist chain when forced or when no cache exists. `on_progress`
    /// receives the embedding progress fraction during a rebuild.
    #[inline]
    pub fn load_corpus(
        &self,
        force: bool,
        mut on_progress: impl FnMut(f32),
    ) -> Result<CorpusState> {
        let (record, timestamp) = self.cache.load_or_build(force, || {
            let items = self.dataset.fetch_items()?;
            let texts = corpus_texts(&items);
            info!("Embedding {} corpus texts", texts.len());
            let matrix = self.embeddings.embed_batches(&texts, &mut on_progress)?;
            Ok(CacheRecord { texts, matrix })
        })?;

        Ok(CorpusState {
            texts: record.texts,
            matrix: record.matrix,
            timestamp,
        })
    }

    /// Load the persisted corpus without ever triggering a rebuild. Returns
    /// `None` when nothing has been embedded yet.
    #[inline]
    pub fn cached_corpus(&self) -> Result<Option<CorpusState>> {
        match self.cache.probe() {
            CacheProbe::Missing => Ok(None),
            CacheProbe::Fresh => {
                let (record, timestamp) = self.cache.load()?;
                Ok(Some(CorpusState {
                    texts: record.texts,
                    matrix: record.matrix,
                    timestamp,
                }))
            }
        }
    }

    /// Embed the query as a one-item batch and return the top-K corpus
    /// texts by cosine similarity, most similar first.
    #[inline]
    pub fn retrieve(&self, state: &CorpusState, query: &str) -> Result<Vec<String>> {
        let query_vector = self.embeddings.embed_one(query)?;
        let indices = rank(&query_vector, &state.matrix, self.top_k);

        debug!("Retrieved indices {:?} for query", indices);
        Ok(indices
            .into_iter()
            .map(|i| state.texts[i].clone())
            .collect())
    }

    /// Full answer pipeline for one user message: retrieve context, compose
    /// the grounding prompt, and delegate to the completion service.
    #[inline]
    pub fn answer(&self, state: &CorpusState, question: &str) -> Result<String> {
        let context = self.retrieve(state, question)?;
        let system_prompt = build_system_prompt(&context, self.context_token_budget);
        self.completion.complete(&system_prompt, question)
    }
}
