//! Recursive character text splitter

use std::collections::VecDeque;

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::DomainError;
use crate::domain::ingestion::{ChunkingConfig, TextSplitter};

/// Separator levels, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Literal(&'static str),
    Sentence,
    Grapheme,
}

const SEPARATORS: [Separator; 5] = [
    Separator::Literal("\n\n"),
    Separator::Literal("\n"),
    Separator::Sentence,
    Separator::Literal(" "),
    Separator::Grapheme,
];

impl Separator {
    fn applies_to(&self, text: &str) -> bool {
        match self {
            Self::Literal(sep) => text.contains(sep),
            Self::Sentence => text.split_sentence_bounds().nth(1).is_some(),
            Self::Grapheme => true,
        }
    }

    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let pieces: Vec<&str> = match self {
            Self::Literal(sep) => text.split(sep).collect(),
            Self::Sentence => text.split_sentence_bounds().collect(),
            Self::Grapheme => text.graphemes(true).collect(),
        };
        pieces.into_iter().filter(|p| !p.is_empty()).collect()
    }

    /// String placed between pieces when merging them back together
    fn joiner(&self) -> &'static str {
        match self {
            Self::Literal(sep) => sep,
            Self::Sentence | Self::Grapheme => "",
        }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits on the coarsest separator that occurs, recursing into pieces that
/// are still too long, then greedily merges small pieces back up to the
/// chunk size with overlap.
///
/// Splitting order: paragraphs -> lines -> sentences -> words -> characters.
/// Sizes are counted in Unicode scalar values.
#[derive(Debug, Clone, Default)]
pub struct RecursiveTextSplitter;

impl RecursiveTextSplitter {
    pub fn new() -> Self {
        Self
    }

    fn split_recursive(text: &str, level: usize, config: &ChunkingConfig) -> Vec<String> {
        let Some(offset) = SEPARATORS[level..]
            .iter()
            .position(|sep| sep.applies_to(text))
        else {
            return vec![text.to_string()];
        };
        let level = level + offset;
        let separator = SEPARATORS[level];
        let has_finer = level + 1 < SEPARATORS.len();

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in separator.split(text) {
            if char_len(piece) < config.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(Self::merge_splits(&fitting, separator.joiner(), config));
                fitting.clear();
            }

            if has_finer {
                chunks.extend(Self::split_recursive(piece, level + 1, config));
            } else {
                chunks.push(piece.to_string());
            }
        }

        if !fitting.is_empty() {
            chunks.extend(Self::merge_splits(&fitting, separator.joiner(), config));
        }

        chunks
    }

    /// Greedily join pieces up to `chunk_size`, keeping up to
    /// `chunk_overlap` characters of trailing pieces for the next chunk.
    fn merge_splits(splits: &[&str], joiner: &str, config: &ChunkingConfig) -> Vec<String> {
        let joiner_len = char_len(joiner);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);
            let join_cost = if current.is_empty() { 0 } else { joiner_len };

            if total + len + join_cost > config.chunk_size && !current.is_empty() {
                Self::push_chunk(&mut chunks, &current, joiner);

                while total > config.chunk_overlap
                    || (total > 0
                        && total + len + (if current.is_empty() { 0 } else { joiner_len })
                            > config.chunk_size)
                {
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    let removed_join = if current.is_empty() { 0 } else { joiner_len };
                    total = total.saturating_sub(char_len(front) + removed_join);
                }
            }

            let join_cost = if current.is_empty() { 0 } else { joiner_len };
            current.push_back(piece);
            total += len + join_cost;
        }

        Self::push_chunk(&mut chunks, &current, joiner);
        chunks
    }

    fn push_chunk(chunks: &mut Vec<String>, parts: &VecDeque<&str>, joiner: &str) {
        let joined = parts.iter().copied().collect::<Vec<_>>().join(joiner);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }
}

impl TextSplitter for RecursiveTextSplitter {
    fn split_text(&self, text: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
        config.validate()?;

        let text = text.trim();

        if text.is_empty() {
            return Ok(Vec::new());
        }

        if char_len(text) <= config.chunk_size {
            return Ok(vec![text.to_string()]);
        }

        let chunks = Self::split_recursive(text, 0, config)
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge_base::SourceDocument;

    fn split(text: &str, size: usize, overlap: usize) -> Vec<String> {
        RecursiveTextSplitter::new()
            .split_text(text, &ChunkingConfig::new(size, overlap))
            .unwrap()
    }

    #[test]
    fn test_empty_content() {
        assert!(split("", 1000, 200).is_empty());
        assert!(split("   \n\n  ", 1000, 200).is_empty());
    }

    #[test]
    fn test_small_content_single_chunk() {
        let chunks = split("  LFG offers services in web development.  ", 1000, 200);

        assert_eq!(chunks, vec!["LFG offers services in web development."]);
    }

    #[test]
    fn test_split_by_paragraphs() {
        let content = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";

        let chunks = split(content, 30, 0);

        assert_eq!(
            chunks,
            vec![
                "First paragraph here.",
                "Second paragraph here.",
                "Third paragraph here."
            ]
        );
    }

    #[test]
    fn test_split_by_sentences() {
        let content = "LFG builds websites. LFG runs clouds. LFG trains models.";

        let chunks = split(content, 40, 0);

        assert_eq!(
            chunks,
            vec!["LFG builds websites. LFG runs clouds.", "LFG trains models."]
        );
    }

    #[test]
    fn test_overlap_between_word_chunks() {
        let chunks = split("a b c d e f g h i j", 5, 2);

        assert_eq!(chunks, vec!["a b c", "c d e", "e f g", "g h i", "i j"]);
    }

    #[test]
    fn test_long_word_falls_back_to_characters() {
        let chunks = split("abcdefghij", 4, 0);

        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_sizes_counted_in_characters() {
        let text = "é".repeat(10);

        let chunks = split(&text, 5, 0);

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() == 5));
    }

    #[test]
    fn test_chunks_never_exceed_size() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n".repeat(40);

        let chunks = split(&text, 100, 20);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        assert!(chunks.iter().all(|c| !c.trim().is_empty()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = RecursiveTextSplitter::new().split_text("text", &ChunkingConfig::new(10, 10));

        assert!(result.is_err());
    }

    #[test]
    fn test_split_document_labels_chunks() {
        let document = SourceDocument::new("one two three four", "https://lfg.example");

        let chunks = RecursiveTextSplitter::new()
            .split_document(&document, &ChunkingConfig::new(10, 0))
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content(), "one two");
        assert_eq!(chunks[1].content(), "three four");
        assert_eq!(chunks[1].source(), "https://lfg.example");
        assert_eq!(chunks[1].chunk_index(), 1);
    }
}
