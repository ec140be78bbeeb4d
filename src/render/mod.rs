//! Incremental markdown sanitizer
//!
//! Converts the accumulating assistant text into safe HTML. The function is
//! pure and runs on every mutation of the message, so it must accept any
//! truncated prefix of a valid document without failing.
//!
//! Pipeline order is load-bearing: the whole input is HTML-escaped before
//! any structural pass, so model-controlled text can never reach the output
//! as markup. Fenced code blocks are lifted into placeholders next, then a
//! line-classification pass builds block structure, an inline pass formats
//! spans inside non-code lines, and the code blocks are substituted back.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```([\w-]*)\n((?s).*?)```").expect("valid fence regex"));

static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid inline code regex"));

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"));

static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("valid italic regex"));

// Only http(s) targets become hyperlinks; any other scheme stays literal
// escaped text.
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\((https?://[^\s)]+)\)").expect("valid link regex"));

const CODE_PLACEHOLDER_PREFIX: &str = "@@CODE_BLOCK_";

/// Escape text for the HTML output grammar.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Format inline spans within one already-escaped line.
fn format_inline(line: &str) -> String {
    let line = INLINE_CODE.replace_all(line, "<code>${1}</code>");
    let line = BOLD.replace_all(&line, "<strong>${1}</strong>");
    let line = ITALIC.replace_all(&line, "<em>${1}</em>");
    let line = LINK.replace_all(
        &line,
        "<a href=\"${2}\" target=\"_blank\" rel=\"noreferrer\">${1}</a>",
    );
    line.into_owned()
}

/// Classified shape of one trimmed line
enum LineClass<'a> {
    Blank,
    CodePlaceholder(&'a str),
    Heading(usize, &'a str),
    OrderedItem(&'a str),
    UnorderedItem(&'a str),
    Paragraph(&'a str),
}

fn classify_line(text: &str) -> LineClass<'_> {
    if text.is_empty() {
        return LineClass::Blank;
    }
    if text.starts_with(CODE_PLACEHOLDER_PREFIX) {
        return LineClass::CodePlaceholder(text);
    }

    let hashes = text.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        if let Some(rest) = text[hashes..].strip_prefix(' ') {
            return LineClass::Heading(hashes, rest);
        }
    }

    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = text[digits..].strip_prefix(". ") {
            return LineClass::OrderedItem(rest);
        }
    }

    if let Some(rest) = text
        .strip_prefix("- ")
        .or_else(|| text.strip_prefix("* "))
    {
        return LineClass::UnorderedItem(rest);
    }

    LineClass::Paragraph(text)
}

/// Line-oriented structural pass.
///
/// Consecutive same-type list items merge into one enclosing list;
/// switching item types closes the previous list first, as does any
/// non-item line.
struct BlockBuilder {
    parts: Vec<String>,
    in_ul: bool,
    in_ol: bool,
}

impl BlockBuilder {
    fn new() -> Self {
        Self {
            parts: Vec::new(),
            in_ul: false,
            in_ol: false,
        }
    }

    fn close_lists(&mut self) {
        if self.in_ul {
            self.parts.push("</ul>".to_string());
            self.in_ul = false;
        }
        if self.in_ol {
            self.parts.push("</ol>".to_string());
            self.in_ol = false;
        }
    }

    fn push_line(&mut self, line: &str) {
        match classify_line(line.trim()) {
            LineClass::Blank => self.close_lists(),
            LineClass::CodePlaceholder(placeholder) => {
                self.close_lists();
                self.parts.push(placeholder.to_string());
            }
            LineClass::Heading(level, rest) => {
                self.close_lists();
                self.parts
                    .push(format!("<h{level}>{}</h{level}>", format_inline(rest)));
            }
            LineClass::OrderedItem(rest) => {
                if self.in_ul {
                    self.parts.push("</ul>".to_string());
                    self.in_ul = false;
                }
                if !self.in_ol {
                    self.parts.push("<ol>".to_string());
                    self.in_ol = true;
                }
                self.parts.push(format!("<li>{}</li>", format_inline(rest)));
            }
            LineClass::UnorderedItem(rest) => {
                if self.in_ol {
                    self.parts.push("</ol>".to_string());
                    self.in_ol = false;
                }
                if !self.in_ul {
                    self.parts.push("<ul>".to_string());
                    self.in_ul = true;
                }
                self.parts.push(format!("<li>{}</li>", format_inline(rest)));
            }
            LineClass::Paragraph(text) => {
                self.close_lists();
                self.parts.push(format!("<p>{}</p>", format_inline(text)));
            }
        }
    }

    fn finish(mut self) -> String {
        self.close_lists();
        self.parts.concat()
    }
}

/// Render accumulating markdown text as sanitized HTML.
///
/// An unterminated trailing fence is left as literal text until the closing
/// fence arrives in a later increment.
pub fn markdown_to_safe_html(markdown: &str) -> String {
    let normalized = escape_html(&markdown.replace("\r\n", "\n"));

    let mut code_blocks: Vec<String> = Vec::new();
    let with_placeholders = CODE_FENCE.replace_all(&normalized, |caps: &Captures| {
        let lang = &caps[1];
        let code = caps[2].trim();
        let block = if lang.is_empty() {
            format!("<pre><code>{code}</code></pre>")
        } else {
            format!("<pre><code class=\"language-{lang}\">{code}</code></pre>")
        };
        let placeholder = format!("{CODE_PLACEHOLDER_PREFIX}{}@@", code_blocks.len());
        code_blocks.push(block);
        placeholder
    });

    let mut builder = BlockBuilder::new();
    for line in with_placeholders.split('\n') {
        builder.push_line(line);
    }

    let mut html = builder.finish();
    for (index, block) in code_blocks.iter().enumerate() {
        html = html.replace(&format!("{CODE_PLACEHOLDER_PREFIX}{index}@@"), block);
    }
    html
}
