//! Splits message blocks into chat-sized chunks on line boundaries.
//!
//! Lengths are counted in chars. A single line longer than the limit is
//! passed through whole.

/// Chunk `blocks` so no chunk crosses `limit` unless one line alone does.
///
/// Lines accumulate into a buffer, each followed by `\n`. Before a line is
/// added, the buffer is flushed (minus its trailing `\n`) if
/// `len(buffer) + len(line) >= limit`. Each non-empty block ends with a
/// flush, so chunks never mix blocks.
pub fn chunk<S: AsRef<str>>(blocks: &[S], limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    for block in blocks {
        let block = block.as_ref();
        if block.is_empty() {
            continue;
        }

        for line in block.split('\n') {
            let line_len = line.chars().count();
            if buffer_len + line_len >= limit && !buffer.is_empty() {
                buffer.pop();
                chunks.push(std::mem::take(&mut buffer));
                buffer_len = 0;
            }
            buffer.push_str(line);
            buffer.push('\n');
            buffer_len += line_len + 1;
        }

        buffer.pop();
        chunks.push(std::mem::take(&mut buffer));
        buffer_len = 0;
    }

    chunks
}
