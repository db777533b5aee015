//! Cached text of local knowledge documents with keyword lookup.
//!
//! The cache starts empty and is filled by an indexing pass that usually runs
//! in a background task. Each document is published as soon as it has been
//! extracted, so lookups see an empty, partial or complete cache.

use agri_core::{Document, DocumentCache, DocumentExcerpt, Error, IndexingResult, Result};
use async_trait::async_trait;
use pulldown_cmark::{Event, Parser, TagEnd};
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::text::truncate_chars;

/// Characters kept per document
pub const MAX_DOCUMENT_CHARS: usize = 50_000;
/// Documents shorter than this are skipped
pub const MIN_DOCUMENT_CHARS: usize = 100;

const EXCERPT_LINES: usize = 5;
const EXCERPT_CHARS: usize = 500;
const FALLBACK_EXCERPT_CHARS: usize = 300;

const HTML_SELECTORS: &str = "h1, h2, h3, h4, h5, h6, p, li, td, th, blockquote, pre";

/// Supported document formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Markdown,
    Html,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

struct CachedDocument {
    document: Document,
    lower: String,
}

/// Directory-backed document cache
pub struct LocalDocumentCache {
    root: PathBuf,
    documents: RwLock<Vec<CachedDocument>>,
    indexing_complete: AtomicBool,
}

impl LocalDocumentCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            documents: RwLock::new(Vec::new()),
            indexing_complete: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True once an indexing pass has finished
    pub fn is_ready(&self) -> bool {
        self.indexing_complete.load(Ordering::Acquire)
    }

    /// Run one indexing pass on a background task
    pub fn spawn_indexing(self: &Arc<Self>) -> JoinHandle<Result<IndexingResult>> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let result = cache.index_directory().await;
            match &result {
                Ok(r) => info!(
                    indexed = r.documents_indexed,
                    skipped = r.documents_skipped,
                    errors = r.errors.len(),
                    "Background document indexing finished"
                ),
                Err(e) => warn!(error = %e, "Background document indexing failed"),
            }
            result
        })
    }

    /// Scan the knowledge directory and cache every supported document
    pub async fn index_directory(&self) -> Result<IndexingResult> {
        let mut result = IndexingResult::default();

        if !tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            warn!(root = %self.root.display(), "Knowledge directory not found");
            self.indexing_complete.store(true, Ordering::Release);
            return Ok(result);
        }

        let mut pending = vec![self.root.clone()];
        let mut files = Vec::new();
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    record_error(&mut result, &dir, e);
                    continue;
                }
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        record_error(&mut result, &dir, e);
                        break;
                    }
                };
                let path = entry.path();
                match entry.file_type().await {
                    Ok(file_type) if file_type.is_dir() => pending.push(path),
                    Ok(_) => {
                        if let Some(format) = DocumentFormat::from_path(&path) {
                            files.push((path, format));
                        }
                    }
                    Err(e) => record_error(&mut result, &path, e),
                }
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        for (path, format) in files {
            match self.index_file(&path, format).await {
                Ok(true) => result.documents_indexed += 1,
                Ok(false) => result.documents_skipped += 1,
                Err(e) => record_error(&mut result, &path, e),
            }
        }

        self.indexing_complete.store(true, Ordering::Release);
        Ok(result)
    }

    async fn index_file(&self, path: &Path, format: DocumentFormat) -> Result<bool> {
        // Undecodable bytes are dropped rather than failing the document
        let bytes = tokio::fs::read(path).await?;
        let raw = String::from_utf8_lossy(&bytes).replace(char::REPLACEMENT_CHARACTER, "");
        let text = truncate_chars(extract_text(&raw, format).trim(), MAX_DOCUMENT_CHARS);

        if text.chars().count() < MIN_DOCUMENT_CHARS {
            debug!(path = %path.display(), "Skipping short document");
            return Ok(false);
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| relative.display().to_string());

        let document = Document {
            id: format!("{:x}", md5::compute(relative.to_string_lossy().as_bytes())),
            source_id,
            word_count: text.split_whitespace().count(),
            text,
        };
        self.insert(document)?;
        Ok(true)
    }

    /// Publish one document
    pub fn insert(&self, document: Document) -> Result<()> {
        let cached = CachedDocument {
            lower: document.text.to_lowercase(),
            document,
        };
        let mut documents = self
            .documents
            .write()
            .map_err(|e| Error::DocumentCache(format!("Lock error: {}", e)))?;
        documents.retain(|d| d.document.id != cached.document.id);
        documents.push(cached);
        Ok(())
    }
}

fn record_error(result: &mut IndexingResult, path: &Path, error: impl std::fmt::Display) {
    warn!(path = %path.display(), error = %error, "Failed to index document");
    result.errors.push(format!("{}: {}", path.display(), error));
}

/// Plain text of a document, one logical block per line
pub fn extract_text(raw: &str, format: DocumentFormat) -> String {
    match format {
        DocumentFormat::Text => raw.to_string(),
        DocumentFormat::Markdown => markdown_to_text(raw),
        DocumentFormat::Html => html_to_text(raw),
    }
}

fn markdown_to_text(raw: &str) -> String {
    let mut out = String::new();
    for event in Parser::new(raw) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak
            | Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::CodeBlock) => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn html_to_text(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let Ok(selector) = Selector::parse(HTML_SELECTORS) else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|element| {
            element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First lines mentioning any of the words, or the document opening
fn excerpt(document: &Document, words: &[String]) -> String {
    let relevant: Vec<&str> = document
        .text
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            words.iter().any(|w| lower.contains(w.as_str()))
        })
        .take(EXCERPT_LINES)
        .collect();

    if relevant.is_empty() {
        truncate_chars(&document.text, FALLBACK_EXCERPT_CHARS)
    } else {
        truncate_chars(&relevant.join(" "), EXCERPT_CHARS)
    }
}

#[async_trait]
impl DocumentCache for LocalDocumentCache {
    async fn lookup_by_keywords(&self, words: &[String], top_k: usize) -> Result<Vec<DocumentExcerpt>> {
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self
            .documents
            .read()
            .map_err(|e| Error::DocumentCache(format!("Lock error: {}", e)))?;

        let mut hits: Vec<DocumentExcerpt> = documents
            .iter()
            .filter_map(|cached| {
                let score = words.iter().filter(|w| cached.lower.contains(w.as_str())).count();
                (score > 0).then(|| DocumentExcerpt {
                    excerpt: excerpt(&cached.document, words),
                    source_id: cached.document.source_id.clone(),
                    score,
                })
            })
            .collect();

        // Stable sort keeps indexing order among equal scores
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn document_count(&self) -> Result<usize> {
        let documents = self
            .documents
            .read()
            .map_err(|e| Error::DocumentCache(format!("Lock error: {}", e)))?;
        Ok(documents.len())
    }
}
