//! Retrieval-augmented knowledge base for program questions.
//!
//! Loads a plain-text Q&A corpus, splits it into paragraph-packed chunks,
//! and answers questions by handing the best-matching chunks to the LLM
//! together with a fixed program-assistant prompt. The capability is
//! injected into the response router at construction time; there is no
//! process-wide handle.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{LlmError, RagError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::profile::Tier;

/// Opaque "ask the knowledge base" capability consumed by the response
/// router. Failures are returned, never panicked; the router converts them
/// into fallback text.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Answer a free-form question for a lead of the given tier.
    async fn answer(&self, tier: Tier, message: &str) -> Result<String, RagError>;
}

/// Target chunk size in characters.
const CHUNK_SIZE: usize = 1000;
/// Number of chunks handed to the LLM per question.
const TOP_K: usize = 4;
/// Cap on the answer length.
const MAX_ANSWER_TOKENS: u32 = 512;

const SYSTEM_PROMPT: &str = "You are an intelligent assistant for the Ambassador Fellowship Program. \
Your goal is to educate high-level IT professionals (CIOs, CTOs) about the program. \
Use the following pieces of retrieved context to answer the question. \
If the answer is not in the context, say that you don't have that specific information \
and offer to connect them with a mentor. \
Keep answers professional, warm, and concise.";

/// Knowledge base backed by a text corpus and an LLM.
pub struct ProgramKnowledgeBase {
    llm: Arc<dyn LlmProvider>,
    chunks: Vec<String>,
}

impl ProgramKnowledgeBase {
    /// Load the corpus from a plain-text file.
    pub fn load(path: &Path, llm: Arc<dyn LlmProvider>) -> Result<Self, RagError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RagError::Corpus(format!("{}: {e}", path.display())))?;
        let kb = Self::from_text(&text, llm)?;
        tracing::info!(
            chunks = kb.chunks.len(),
            path = %path.display(),
            "Knowledge corpus loaded"
        );
        Ok(kb)
    }

    /// Build a knowledge base directly from corpus text.
    pub fn from_text(text: &str, llm: Arc<dyn LlmProvider>) -> Result<Self, RagError> {
        let chunks = chunk_text(text, CHUNK_SIZE);
        if chunks.is_empty() {
            return Err(RagError::Corpus("corpus is empty".to_string()));
        }
        Ok(Self { llm, chunks })
    }

    /// Rank chunks by lexical overlap with the query and return the top
    /// matches.
    fn retrieve(&self, query: &str) -> Vec<&str> {
        let query_words = words(query);
        let mut scored: Vec<(usize, &String)> = self
            .chunks
            .iter()
            .map(|chunk| (overlap_score(&query_words, chunk), chunk))
            .collect();
        // Stable sort keeps corpus order among equally scored chunks.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(TOP_K)
            .map(|(_, chunk)| chunk.as_str())
            .collect()
    }
}

#[async_trait]
impl KnowledgeBase for ProgramKnowledgeBase {
    async fn answer(&self, tier: Tier, message: &str) -> Result<String, RagError> {
        let context = self.retrieve(message).join("\n\n");
        let mut system = format!("{SYSTEM_PROMPT}\n\n{context}");
        if tier == Tier::Potential {
            system.push_str(
                "\n\nThe person asking is on the Rising Leaders track; where relevant, \
point them at resources that build toward full Ambassador eligibility.",
            );
        }

        let request = CompletionRequest::new(vec![
            ChatMessage::system(system),
            ChatMessage::user(message),
        ])
        .with_max_tokens(MAX_ANSWER_TOKENS)
        .with_temperature(0.3);

        let response = self.llm.complete(request).await?;
        let answer = response.content.trim();
        if answer.is_empty() {
            return Err(RagError::Llm(LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: "empty completion".to_string(),
            }));
        }
        Ok(answer.to_string())
    }
}

/// Pack paragraphs into chunks of roughly `target` characters.
fn chunk_text(text: &str, target: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for para in text.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        if !current.is_empty() && current.len() + para.len() + 2 > target {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(para);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Lowercased alphanumeric words of a text.
fn words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Number of query words that appear in the chunk.
fn overlap_score(query_words: &HashSet<String>, chunk: &str) -> usize {
    let chunk_words = words(chunk);
    query_words.iter().filter(|w| chunk_words.contains(*w)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionResponse;

    /// Provider double that records the last request and returns canned
    /// text.
    struct StubLlm {
        reply: String,
        last_system: std::sync::Mutex<Option<String>>,
    }

    impl StubLlm {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                last_system: std::sync::Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let system = request
                .messages
                .iter()
                .find(|m| m.role == crate::llm::Role::System)
                .map(|m| m.content.clone());
            *self.last_system.lock().unwrap() = system;
            Ok(CompletionResponse {
                content: self.reply.clone(),
            })
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    const CORPUS: &str = "\
The Ambassador Fellowship Program runs for twelve months and pairs each \
Ambassador with a dedicated Program Mentor.

Membership pricing: the fellowship itself is free for accepted Ambassadors; \
travel to the annual summit is reimbursed.

Ambassadors keep their current jobs. The program is designed around a few \
hours per week of community and content work.";

    #[test]
    fn chunking_packs_paragraphs() {
        let chunks = chunk_text(CORPUS, 1000);
        assert_eq!(chunks.len(), 1);

        let chunks = chunk_text(CORPUS, 120);
        assert!(chunks.len() >= 2);
        assert!(chunks[0].contains("twelve months"));
    }

    #[test]
    fn chunking_skips_blank_paragraphs() {
        let chunks = chunk_text("\n\n  \n\nonly paragraph\n\n", 100);
        assert_eq!(chunks, vec!["only paragraph".to_string()]);
    }

    #[test]
    fn retrieval_ranks_matching_chunk_first() {
        let llm = StubLlm::new("ok");
        let mut kb = ProgramKnowledgeBase::from_text(CORPUS, llm).unwrap();
        // Force one chunk per paragraph.
        kb.chunks = chunk_text(CORPUS, 10);

        let top = kb.retrieve("what is the membership pricing?");
        assert!(top[0].contains("pricing"));
    }

    #[tokio::test]
    async fn answer_includes_context_in_the_prompt() {
        let llm = StubLlm::new("It runs for twelve months.");
        let kb = ProgramKnowledgeBase::from_text(CORPUS, llm.clone()).unwrap();

        let answer = kb
            .answer(Tier::Qualified, "How long does the program run?")
            .await
            .unwrap();
        assert_eq!(answer, "It runs for twelve months.");

        let system = llm.last_system.lock().unwrap().clone().unwrap();
        assert!(system.contains("Ambassador Fellowship Program"));
        assert!(system.contains("twelve months"));
        assert!(!system.contains("Rising Leaders"));
    }

    #[tokio::test]
    async fn potential_tier_gets_rising_leaders_framing() {
        let llm = StubLlm::new("Sure.");
        let kb = ProgramKnowledgeBase::from_text(CORPUS, llm.clone()).unwrap();

        kb.answer(Tier::Potential, "What should I work on?")
            .await
            .unwrap();

        let system = llm.last_system.lock().unwrap().clone().unwrap();
        assert!(system.contains("Rising Leaders"));
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let llm = StubLlm::new("   ");
        let kb = ProgramKnowledgeBase::from_text(CORPUS, llm).unwrap();
        let result = kb.answer(Tier::Qualified, "anything").await;
        assert!(result.is_err());
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let llm = StubLlm::new("ok");
        assert!(ProgramKnowledgeBase::from_text("  \n\n  ", llm).is_err());
    }
}
