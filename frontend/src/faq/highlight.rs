/// A run of question text, either untouched or matching the search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Match(&'a str),
}

/// Splits `text` around every case-insensitive, non-overlapping occurrence of
/// `query`. `query` must already be lowercase. The query is matched literally
/// against `str::to_lowercase` of the text, the same lowering the search
/// filter uses. Segments borrow from `text`, so the original casing is kept.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    if text.is_empty() {
        return Vec::new();
    }
    if query.is_empty() {
        return vec![Segment::Plain(text)];
    }

    let lowered = text.to_lowercase();
    let Some(boundaries) = lowered_boundaries(text, lowered.len()) else {
        return vec![Segment::Plain(text)];
    };

    let mut segments = Vec::new();
    let mut plain_start = 0;
    for (lowered_start, matched) in lowered.match_indices(query) {
        let start = original_floor(&boundaries, lowered_start).max(plain_start);
        let end = original_ceil(&boundaries, lowered_start + matched.len());
        if start >= end {
            continue;
        }
        if plain_start < start {
            segments.push(Segment::Plain(&text[plain_start..start]));
        }
        segments.push(Segment::Match(&text[start..end]));
        plain_start = end;
    }

    if plain_start < text.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }
    segments
}

// Pairs of (lowered offset, original offset) at every char boundary of `text`,
// ending with both lengths. `None` if the lowered lengths don't line up.
fn lowered_boundaries(text: &str, lowered_len: usize) -> Option<Vec<(usize, usize)>> {
    let mut boundaries = Vec::with_capacity(text.len() + 1);
    let mut lowered_offset = 0;
    for (offset, ch) in text.char_indices() {
        boundaries.push((lowered_offset, offset));
        // Final sigma lowers to `ς` in context and `σ` alone; both are two bytes.
        lowered_offset += ch.to_lowercase().map(char::len_utf8).sum::<usize>();
    }
    if lowered_offset != lowered_len {
        return None;
    }
    boundaries.push((lowered_len, text.len()));
    Some(boundaries)
}

// Start of the original char whose lowered form contains `lowered_offset`.
fn original_floor(boundaries: &[(usize, usize)], lowered_offset: usize) -> usize {
    let i = boundaries.partition_point(|&(l, _)| l <= lowered_offset);
    boundaries[i.saturating_sub(1)].1
}

// End of the original char whose lowered form contains `lowered_offset`.
fn original_ceil(boundaries: &[(usize, usize)], lowered_offset: usize) -> usize {
    let i = boundaries.partition_point(|&(l, _)| l < lowered_offset);
    boundaries[i.min(boundaries.len() - 1)].1
}
