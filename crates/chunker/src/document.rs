use crate::types::DocumentChunk;
use regex::Regex;

/// Default byte budget for document chunks
pub const DEFAULT_DOC_BUDGET: usize = 1024;

/// Lexical chunker for loosely structured markdown/FAQ documents.
///
/// Splits on major-section delimiter lines (3+ repeated `=`/`-`), then on
/// bold `Q:` markers into question/answer pairs and narrative blocks, and
/// finally merges adjacent small chunks up to the budget. Malformed
/// documents degrade to one narrative chunk per fragment; there is no hard
/// failure mode on this path.
pub struct DocumentChunker {
    content: String,
    file_name: String,
    budget: usize,
    section_re: Regex,
}

impl DocumentChunker {
    /// Create a new chunker over already-decoded document text
    pub fn new(content: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            file_name: file_name.into(),
            budget: DEFAULT_DOC_BUDGET,
            section_re: Regex::new(r"\n[=\-]{3,}\n").expect("valid section delimiter pattern"),
        }
    }

    /// Builder: override the byte budget
    #[must_use]
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Get the configured byte budget
    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }

    /// Create all chunks for this document: section/Q&A extraction
    /// followed by the greedy merge pass.
    pub fn create_chunks(&self) -> Vec<DocumentChunk> {
        let extracted = self.extract_sections();
        let merged = self.merge_small_chunks(extracted);
        log::debug!(
            "Extracted {} document chunks from {}",
            merged.len(),
            self.file_name
        );
        merged
    }

    /// Split the document into major sections and each section into Q&A
    /// pairs and narrative blocks.
    fn extract_sections(&self) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();

        for section in self.section_re.split(&self.content) {
            if section.trim().is_empty() {
                continue;
            }

            // The section's first line, stripped of heading markers, labels
            // any narrative content found within it.
            let title = section
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .trim_matches(|c: char| c == '#' || c == ' ')
                .to_string();

            for fragment in section.split("**Q:") {
                if fragment.trim().is_empty() {
                    continue;
                }

                if fragment.contains("**") {
                    chunks.push(Self::qa_chunk(fragment));
                } else {
                    self.push_narrative(&title, fragment.trim(), &mut chunks);
                }
            }
        }

        chunks
    }

    /// Build a Q&A chunk: the question runs to the closing bold marker,
    /// the answer is everything after it with remaining markers removed.
    /// Q&A pairs carry no size cap; an overlong pair is an oversized unit
    /// emitted verbatim.
    fn qa_chunk(fragment: &str) -> DocumentChunk {
        let mut parts = fragment.split("**");
        let question = parts.next().unwrap_or("").trim();
        let rest = parts.collect::<Vec<_>>().join("");
        let answer = rest.trim();
        let answer = answer
            .strip_prefix("A:")
            .map_or(answer, str::trim_start);

        DocumentChunk::new(
            format!("Q: {question}"),
            format!("Q: {question}\nA: {answer}"),
        )
    }

    /// Emit a narrative fragment under the current section title. A
    /// fragment at or over budget is force-split into sub-budget pieces
    /// rather than dropped.
    fn push_narrative(&self, title: &str, body: &str, chunks: &mut Vec<DocumentChunk>) {
        if body.len() < self.budget {
            chunks.push(DocumentChunk::new(title, body));
            return;
        }

        log::debug!(
            "Force-splitting {}-byte narrative fragment in {}",
            body.len(),
            self.file_name
        );
        for piece in force_split(body, self.budget) {
            chunks.push(DocumentChunk::new(title, piece));
        }
    }

    /// Greedy left-to-right merge: absorb the next chunk's content into the
    /// running accumulator (blank-line separated) while the combined
    /// content length stays at or below budget. A merged run keeps the
    /// title of its first member. Idempotent on already-merged sequences.
    fn merge_small_chunks(&self, chunks: Vec<DocumentChunk>) -> Vec<DocumentChunk> {
        let mut merged = Vec::new();
        let mut current: Option<DocumentChunk> = None;

        for chunk in chunks {
            match current.as_mut() {
                None => current = Some(chunk),
                Some(acc) => {
                    if acc.content.len() + chunk.content.len() <= self.budget {
                        acc.content.push_str("\n\n");
                        acc.content.push_str(&chunk.content);
                    } else {
                        merged.push(std::mem::replace(acc, chunk));
                    }
                }
            }
        }

        if let Some(acc) = current {
            merged.push(acc);
        }

        merged
    }
}

/// Mechanically split text into pieces strictly below the budget,
/// preferring line boundaries and falling back to character boundaries for
/// single overlong lines. A character wider than the budget is emitted
/// whole; characters are never split.
fn force_split(text: &str, budget: usize) -> Vec<String> {
    let max = budget.saturating_sub(1).max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.len() > max {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            let mut rest = line;
            while rest.len() > max {
                let mut cut = max;
                while !rest.is_char_boundary(cut) {
                    cut -= 1;
                }
                if cut == 0 {
                    // The budget is narrower than the first character;
                    // take it whole to keep making progress.
                    cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
                }
                pieces.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
            current.push_str(rest);
            continue;
        }

        let extra = if current.is_empty() {
            line.len()
        } else {
            line.len() + 1
        };
        if current.len() + extra > max && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
