//! Near-duplicate suppression over snippet bodies.
//!
//! Records fetched from multiple sources often repeat the same press release
//! or abstract. Bodies are embedded as TF-IDF vectors and compared with
//! cosine similarity; a greedy pass in input order keeps the first member of
//! each similarity cluster.

use std::collections::{HashMap, HashSet};

/// Cosine similarity above which two bodies are the same document.
pub const SIMILARITY_THRESHOLD: f32 = 0.85;
/// Vocabulary cap; the most document-frequent terms are kept.
pub const MAX_VOCABULARY: usize = 5000;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "being", "below", "between", "both", "but", "by", "can",
    "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his",
    "how", "if", "in", "into", "is", "it", "its", "just", "more", "most", "my", "no", "nor",
    "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "out", "over",
    "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// Select the indices of texts to keep, dropping near-duplicates.
///
/// The pass is greedy in input order: an index survives if its body is not
/// more than [`SIMILARITY_THRESHOLD`] similar to any already-kept body, and
/// selection stops once `max_keep` indices survive. When no usable
/// vocabulary exists (all bodies empty or stop words only) the first
/// `max_keep` indices are returned unchanged.
pub fn semantic_dedup(texts: &[String], max_keep: usize) -> Vec<usize> {
    if texts.is_empty() || max_keep == 0 {
        return Vec::new();
    }

    let token_docs: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for doc in &token_docs {
        let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
        for term in unique {
            *doc_freq.entry(term).or_insert(0) += 1;
        }
    }
    if doc_freq.is_empty() {
        return (0..texts.len().min(max_keep)).collect();
    }

    let vocab = build_vocabulary(&doc_freq);
    let n_docs = texts.len() as f32;
    let idf: Vec<f32> = {
        let mut idf = vec![0.0; vocab.len()];
        for (term, &idx) in &vocab {
            let df = doc_freq[term.as_str()] as f32;
            idf[idx] = ((n_docs + 1.0) / (df + 1.0)).ln() + 1.0;
        }
        idf
    };

    let vectors: Vec<Vec<f32>> = token_docs
        .iter()
        .map(|doc| {
            let mut vec = vec![0.0f32; vocab.len()];
            for term in doc {
                if let Some(&idx) = vocab.get(term) {
                    vec[idx] += 1.0;
                }
            }
            for (idx, value) in vec.iter_mut().enumerate() {
                *value *= idf[idx];
            }
            vec
        })
        .collect();

    let mut kept: Vec<usize> = Vec::new();
    for i in 0..texts.len() {
        if kept.len() >= max_keep {
            break;
        }
        let duplicate = kept
            .iter()
            .any(|&j| cosine_similarity(&vectors[i], &vectors[j]) > SIMILARITY_THRESHOLD);
        if !duplicate {
            kept.push(i);
        }
    }
    kept
}

/// Lowercased alphanumeric tokens of at least two characters, stop words
/// removed.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2 && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Cap the vocabulary at [`MAX_VOCABULARY`] terms, keeping the terms that
/// appear in the most documents. Ties break alphabetically so the mapping
/// is deterministic.
fn build_vocabulary(doc_freq: &HashMap<&str, usize>) -> HashMap<String, usize> {
    let mut terms: Vec<(&str, usize)> = doc_freq.iter().map(|(t, &df)| (*t, df)).collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    terms.truncate(MAX_VOCABULARY);
    terms
        .into_iter()
        .enumerate()
        .map(|(idx, (term, _))| (term.to_string(), idx))
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a * norm_b).max(1e-12)
}
