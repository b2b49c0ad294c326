//! Line breaking for subtitle text.
//!
//! The break-point rules live here as data (an ordered priority of break
//! classes plus a list of forbidden patterns) and are shared by the timing
//! splitter, so both break-finding paths behave identically.

/// Break quality of a token boundary, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BreakClass {
    /// Plain whitespace between two ordinary words.
    Whitespace,
    /// After a preposition.
    Preposition,
    /// After a coordinating conjunction.
    Conjunction,
    /// After clause punctuation (`,` `;` `:`).
    ClausePunctuation,
    /// After sentence-final punctuation (`.` `!` `?`).
    SentencePunctuation,
}

const SENTENCE_PUNCTUATION: &[char] = &['.', '!', '?'];
const CLAUSE_PUNCTUATION: &[char] = &[',', ';', ':'];
const CONJUNCTIONS: &[&str] = &["and", "but", "or", "nor", "yet", "so", "for"];
const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "to", "of", "for", "with", "by", "from", "about", "into", "over", "after",
    "under",
];

// Boundaries that must never be chosen, even when nothing better exists
// nearby: a leading article or a short intensifier stranded at a line end
// reads badly, and personal names should stay on one line.
const LEADING_ARTICLES: &[&str] = &["the", "a", "an"];
const INTENSIFIERS: &[&str] = &["very", "really", "quite"];

/// A boundary between two whitespace-separated tokens.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenBoundary {
    /// Index of the token to the left of the boundary.
    pub left_token: usize,
    /// Offset of the right-hand token in user-perceived characters.
    pub char_offset: usize,
    /// Byte offset matching `char_offset`.
    pub byte_offset: usize,
    /// Break quality, or `None` when the boundary is forbidden.
    pub class: Option<BreakClass>,
}

/// A text split into whitespace-separated tokens with classified boundaries.
#[derive(Debug, Clone)]
pub(crate) struct Tokenized<'a> {
    pub tokens: Vec<&'a str>,
    pub boundaries: Vec<TokenBoundary>,
}

pub(crate) fn tokenize(text: &str) -> Tokenized<'_> {
    let mut tokens = Vec::new();
    let mut starts = Vec::new();

    let mut token_start: Option<(usize, usize)> = None;
    let mut char_offset = 0usize;
    for (byte_offset, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some((start_byte, start_char)) = token_start.take() {
                tokens.push(&text[start_byte..byte_offset]);
                starts.push((start_char, start_byte));
            }
        } else if token_start.is_none() {
            token_start = Some((byte_offset, char_offset));
        }
        char_offset += 1;
    }
    if let Some((start_byte, start_char)) = token_start {
        tokens.push(&text[start_byte..]);
        starts.push((start_char, start_byte));
    }

    let mut boundaries = Vec::new();
    for i in 1..tokens.len() {
        let (char_offset, byte_offset) = starts[i];
        boundaries.push(TokenBoundary {
            left_token: i - 1,
            char_offset,
            byte_offset,
            class: classify_boundary(tokens[i - 1], tokens[i]),
        });
    }

    Tokenized { tokens, boundaries }
}

/// Classify the boundary after `left`, or return `None` when breaking there
/// is forbidden.
fn classify_boundary(left: &str, right: &str) -> Option<BreakClass> {
    let last = left.chars().last()?;
    if SENTENCE_PUNCTUATION.contains(&last) {
        return Some(BreakClass::SentencePunctuation);
    }
    if CLAUSE_PUNCTUATION.contains(&last) {
        return Some(BreakClass::ClausePunctuation);
    }

    let lower = left.to_lowercase();
    if LEADING_ARTICLES.contains(&lower.as_str()) || INTENSIFIERS.contains(&lower.as_str()) {
        return None;
    }
    // Adjacent capitalized tokens with no intervening punctuation look like
    // a personal name.
    if starts_uppercase(left) && starts_uppercase(right) {
        return None;
    }

    if CONJUNCTIONS.contains(&lower.as_str()) {
        return Some(BreakClass::Conjunction);
    }
    if PREPOSITIONS.contains(&lower.as_str()) {
        return Some(BreakClass::Preposition);
    }
    Some(BreakClass::Whitespace)
}

fn starts_uppercase(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Pick the best boundary from `candidates`, where each entry carries the
/// boundary and its position on the axis being searched (characters for line
/// breaking, milliseconds for timing splits).
///
/// Highest break class wins, then smallest distance to `target`, then the
/// earlier position.
pub(crate) fn select_boundary(
    candidates: &[(TokenBoundary, u64)],
    target: u64,
) -> Option<TokenBoundary> {
    let mut best: Option<(TokenBoundary, BreakClass, u64, u64)> = None;

    for &(boundary, position) in candidates {
        let Some(class) = boundary.class else {
            continue;
        };
        let distance = position.abs_diff(target);

        let better = match best {
            None => true,
            Some((_, best_class, best_distance, best_position)) => {
                class > best_class
                    || (class == best_class && distance < best_distance)
                    || (class == best_class && distance == best_distance
                        && position < best_position)
            }
        };
        if better {
            best = Some((boundary, class, distance, position));
        }
    }

    best.map(|(boundary, _, _, _)| boundary)
}

/// Outcome of wrapping one cue's text.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedText {
    pub lines: Vec<String>,
    /// False when a line exceeds the limit and has multiple tokens, meaning
    /// the text needs to be carried by more than one cue.
    pub fits: bool,
    /// True when an over-long single token was cut down to the line limit.
    pub truncated: bool,
}

/// Wraps cue text into at most two display lines, preferring linguistically
/// sound break points near the midpoint.
#[derive(Debug, Clone)]
pub struct LineBreaker {
    max_chars_per_line: usize,
    max_lines: usize,
}

impl LineBreaker {
    pub fn new(max_chars_per_line: usize, max_lines: usize) -> Self {
        Self {
            max_chars_per_line,
            max_lines,
        }
    }

    /// Total characters a single cue can carry across all its lines.
    pub fn max_total_chars(&self) -> usize {
        self.max_chars_per_line * self.max_lines
    }

    /// True when `text` cannot be represented by a single cue regardless of
    /// line breaking, and must be carried by multiple consecutive cues.
    pub fn needs_split(&self, text: &str) -> bool {
        text.trim().chars().count() > self.max_total_chars()
    }

    /// Wrap `text` into display lines.
    pub fn segment(&self, text: &str) -> SegmentedText {
        let text = text.trim();
        let char_count = text.chars().count();

        if char_count <= self.max_chars_per_line {
            return SegmentedText {
                lines: vec![text.to_string()],
                fits: true,
                truncated: false,
            };
        }

        let tokenized = tokenize(text);
        if tokenized.tokens.len() < 2 {
            // One over-long token: cut it down rather than overflow the line.
            return SegmentedText {
                lines: vec![truncate_token(text, self.max_chars_per_line)],
                fits: true,
                truncated: true,
            };
        }

        if self.max_lines < 2 {
            return SegmentedText {
                lines: vec![text.to_string()],
                fits: false,
                truncated: false,
            };
        }

        let target = char_count / 2;
        let Some(boundary) = self.best_boundary(text, &tokenized, target) else {
            return SegmentedText {
                lines: vec![text.to_string()],
                fits: false,
                truncated: false,
            };
        };

        let first = text[..boundary.byte_offset].trim_end();
        let second = text[boundary.byte_offset..].trim_start();

        let mut fits = true;
        let mut truncated = false;
        let mut lines = Vec::with_capacity(2);
        for part in [first, second] {
            if part.chars().count() <= self.max_chars_per_line {
                lines.push(part.to_string());
            } else if part.split_whitespace().count() < 2 {
                lines.push(truncate_token(part, self.max_chars_per_line));
                truncated = true;
            } else {
                lines.push(part.to_string());
                fits = false;
            }
        }

        SegmentedText {
            lines,
            fits,
            truncated,
        }
    }

    /// Find the character offset to break `text` at, aiming for `target`.
    pub fn find_break(&self, text: &str, target: usize) -> Option<usize> {
        let tokenized = tokenize(text);
        self.best_boundary(text, &tokenized, target)
            .map(|b| b.char_offset)
    }

    fn best_boundary(
        &self,
        text: &str,
        tokenized: &Tokenized<'_>,
        target: usize,
    ) -> Option<TokenBoundary> {
        if tokenized.boundaries.is_empty() {
            return None;
        }

        let char_count = text.chars().count();
        let window = char_count * 2 / 5;
        let low = target.saturating_sub(window);
        let high = target + window;

        let feasible = |b: &TokenBoundary| {
            let left = text[..b.byte_offset].trim_end().chars().count();
            let right = char_count - b.char_offset;
            left <= self.max_chars_per_line && right <= self.max_chars_per_line
        };

        // Pass 1: classified boundaries inside the window that leave both
        // lines within the limit.
        let candidates: Vec<(TokenBoundary, u64)> = tokenized
            .boundaries
            .iter()
            .filter(|b| b.char_offset >= low && b.char_offset <= high && feasible(b))
            .map(|b| (*b, b.char_offset as u64))
            .collect();
        if let Some(boundary) = select_boundary(&candidates, target as u64) {
            return Some(boundary);
        }

        // Pass 2: widen to any feasible boundary in the text.
        let candidates: Vec<(TokenBoundary, u64)> = tokenized
            .boundaries
            .iter()
            .filter(|b| feasible(b))
            .map(|b| (*b, b.char_offset as u64))
            .collect();
        if let Some(boundary) = select_boundary(&candidates, target as u64) {
            return Some(boundary);
        }

        // Last resort: the whitespace nearest the target, forbidden or not.
        tokenized
            .boundaries
            .iter()
            .min_by_key(|b| b.char_offset.abs_diff(target))
            .copied()
    }
}

/// Cut a token down to `max_chars`, marking the cut with an ellipsis.
fn truncate_token(token: &str, max_chars: usize) -> String {
    let mut result: String = token.chars().take(max_chars.saturating_sub(1)).collect();
    result.push('…');
    result
}
