//! Code/prose segmentation.
//!
//! Splits a Markdown document into `Code` and `Prose` spans so that link
//! rewriting never touches code. Two kinds of code are recognized:
//!
//! - **Fenced blocks**: a line of three or more identical fence characters
//!   (`` ` `` or `~`), content, and a closing line holding exactly the same
//!   fence. The opening line must follow a blank line and the closing line
//!   must be followed by one (start and end of text count as blank).
//! - **Inline spans**: a run of N backticks closed by the next run of exactly
//!   N backticks on the same line. Runs of a different length inside the span
//!   are part of its content. An unmatched run is plain prose.
//!
//! Concatenating the segment texts always reproduces the input.

/// Kind of a document segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Fenced code block or inline code span.
    Code,
    /// Everything else.
    Prose,
}

/// A borrowed slice of the document tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

impl<'a> Segment<'a> {
    const fn code(text: &'a str) -> Self {
        Self { kind: SegmentKind::Code, text }
    }

    const fn prose(text: &'a str) -> Self {
        Self { kind: SegmentKind::Prose, text }
    }

    /// Whether this segment is code.
    #[must_use]
    pub fn is_code(&self) -> bool {
        self.kind == SegmentKind::Code
    }
}

/// Split `text` into code and prose segments.
///
/// Empty segments are dropped; the concatenation of all segment texts
/// equals `text`.
#[must_use]
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut prose_start = 0;

    for (start, end) in fenced_blocks(text) {
        split_inline(&text[prose_start..start], &mut segments);
        segments.push(Segment::code(&text[start..end]));
        prose_start = end;
    }
    split_inline(&text[prose_start..], &mut segments);

    segments
}

/// A physical line: byte offsets of its content.
#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    /// End of content, excluding the line terminator.
    end: usize,
}

fn lines(text: &str) -> Vec<Line> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;

    while start < bytes.len() {
        let mut end = start;
        while end < bytes.len() && bytes[end] != b'\n' && bytes[end] != b'\r' {
            end += 1;
        }
        let next = match bytes.get(end) {
            Some(b'\r') if bytes.get(end + 1) == Some(&b'\n') => end + 2,
            Some(_) => end + 1,
            None => end,
        };
        lines.push(Line { start, end });
        start = next;
    }

    lines
}

fn is_blank(text: &str, line: Line) -> bool {
    text[line.start..line.end].trim().is_empty()
}

/// Opening fence of a line, if the line is one: the fence run itself.
fn opening_fence(content: &str) -> Option<&str> {
    let trimmed = content.trim_start();
    let fence_char = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.len() - trimmed.trim_start_matches(fence_char).len();
    if run < 3 {
        return None;
    }
    // A backtick fence's info string may not contain backticks; otherwise
    // "```code```" at the start of a line would open a block.
    if fence_char == '`' && trimmed[run..].contains('`') {
        return None;
    }
    Some(&trimmed[..run])
}

/// Byte ranges of all fenced code blocks, from the opening fence line to the
/// end of the closing fence line (terminator excluded).
fn fenced_blocks(text: &str) -> Vec<(usize, usize)> {
    let lines = lines(text);
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let preceded_by_blank = i == 0 || is_blank(text, lines[i - 1]);
        let fence = if preceded_by_blank {
            opening_fence(&text[lines[i].start..lines[i].end])
        } else {
            None
        };

        let Some(fence) = fence else {
            i += 1;
            continue;
        };

        let closing = (i + 1..lines.len()).find(|&j| {
            let closes = text[lines[j].start..lines[j].end].trim() == fence;
            let followed_by_blank = j + 1 == lines.len() || is_blank(text, lines[j + 1]);
            closes && followed_by_blank
        });

        match closing {
            Some(j) => {
                blocks.push((lines[i].start, lines[j].end));
                i = j + 1;
            }
            None => i += 1,
        }
    }

    blocks
}

/// Split a prose region on inline code spans and append the pieces.
fn split_inline<'a>(text: &'a str, out: &mut Vec<Segment<'a>>) {
    let bytes = text.as_bytes();
    let mut prose_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let open_len = backtick_run(bytes, i);
        match closing_run(bytes, i + open_len, open_len) {
            Some(close_end) => {
                if prose_start < i {
                    out.push(Segment::prose(&text[prose_start..i]));
                }
                out.push(Segment::code(&text[i..close_end]));
                prose_start = close_end;
                i = close_end;
            }
            None => i += open_len,
        }
    }

    if prose_start < bytes.len() {
        out.push(Segment::prose(&text[prose_start..]));
    }
}

fn backtick_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|b| **b == b'`').count()
}

/// Find the end of the next run of exactly `len` backticks on this line.
fn closing_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' | b'\r' => return None,
            b'`' => {
                let run = backtick_run(bytes, i);
                if run == len {
                    return Some(i + run);
                }
                i += run;
            }
            _ => i += 1,
        }
    }
    None
}
