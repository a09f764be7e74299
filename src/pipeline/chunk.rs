/// Lazily slices text into chunks of at most `lines_per_chunk` consecutive lines.
///
/// Chunks never overlap and ignore record boundaries, so a member record that
/// spans lines can end up split across two chunks.
pub struct LineChunks<'a> {
    lines: Vec<&'a str>,
    lines_per_chunk: usize,
    next: usize,
}

impl<'a> LineChunks<'a> {
    /// A `lines_per_chunk` of zero is treated as one line per chunk
    pub fn new(text: &'a str, lines_per_chunk: usize) -> Self {
        Self {
            lines: text.split('\n').collect(),
            lines_per_chunk: lines_per_chunk.max(1),
            next: 0,
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.lines.len().div_ceil(self.lines_per_chunk)
    }
}

impl<'a> Iterator for LineChunks<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next >= self.lines.len() {
            return None;
        }
        let end = (self.next + self.lines_per_chunk).min(self.lines.len());
        let chunk = self.lines[self.next..end].join("\n");
        self.next = end;
        Some(chunk)
    }
}

/// Rough token count: characters divided by `chars_per_token`
pub fn estimate_tokens(text: &str, chars_per_token: usize) -> usize {
    text.chars().count() / chars_per_token.max(1)
}
