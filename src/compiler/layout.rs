//! Line-per-word rendering of generated shell text.
//!
//! Every word sits on its own line, indented two spaces per nesting depth,
//! and lines are joined with a backslash continuation. The result is both a
//! valid shell command and stable enough to diff.

use std::fmt;

const INDENT: &str = "  ";
const CONTINUATION: &str = " \\\n";

/// One rendered line: a word (or raw shell fragment) at a nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    depth: usize,
    text: String,
}

impl Line {
    /// Nesting depth of the line.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}

/// Shell text assembled line by line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandText {
    lines: Vec<Line>,
}

impl CommandText {
    /// Creates empty command text.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Appends a single shell word, quoting it if needed.
    pub fn push_word(&mut self, depth: usize, word: &str) {
        self.push_raw(depth, quote_word(word));
    }

    /// Appends several words on one line, each quoted independently.
    pub fn push_words<I, S>(&mut self, depth: usize, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = words
            .into_iter()
            .map(|word| quote_word(word.as_ref()))
            .collect::<Vec<_>>()
            .join(" ");
        self.push_raw(depth, joined);
    }

    /// Appends shell syntax verbatim.
    pub fn push_raw(&mut self, depth: usize, text: impl Into<String>) {
        self.lines.push(Line {
            depth,
            text: text.into(),
        });
    }

    /// Appends `other`, nesting each of its lines `shift` levels deeper.
    pub fn append_nested(&mut self, other: Self, shift: usize) {
        self.lines
            .extend(other.lines.into_iter().map(|line| Line {
                depth: line.depth + shift,
                text: line.text,
            }));
    }

    /// Rendered lines in order.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Renders the text with indentation and line continuations.
    #[must_use]
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}{}", INDENT.repeat(line.depth), line.text))
            .collect::<Vec<_>>()
            .join(CONTINUATION)
    }
}

impl fmt::Display for CommandText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Bytes that never need quoting in a POSIX shell word.
const fn is_shell_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'@' | b'%' | b'+' | b'=' | b':' | b',' | b'.' | b'/' | b'-' | b'_'
        )
}

/// Quotes `word` for the shell unless it consists only of safe bytes.
///
/// NUL bytes cannot appear in a shell word and are dropped.
#[must_use]
pub fn quote_word(word: &str) -> String {
    if !word.is_empty() && word.bytes().all(is_shell_safe) {
        return word.to_owned();
    }
    let without_nul = word.replace('\0', "");
    shlex::try_quote(&without_nul).map_or_else(|_| format!("'{without_nul}'"), |q| q.into_owned())
}
