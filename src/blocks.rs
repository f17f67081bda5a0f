//! Block-editor content model and a parser for its comment-delimiter grammar.
//!
//! Block content is ordinary HTML interleaved with delimiters:
//!
//! ```text
//! <!-- wp:gallery {"ids":[1,2]} -->
//! <figure class="wp-block-gallery">
//!   <!-- wp:image {"id":3} /-->
//! </figure>
//! <!-- /wp:gallery -->
//! ```
//!
//! A block's `inner_html` is the markup between its own delimiters with the
//! markup of nested blocks removed; nested blocks are in `inner_blocks`.

use crate::store::{AttachmentId, BlockParser};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::trace;

static DELIMITER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^\s*(/)?wp:([a-z][a-z0-9_-]*(?:/[a-z][a-z0-9_-]*)?)\s*(\{.*\})?\s*(/)?\s*$",
    )
    .unwrap()
});

const BLOCK_MARKER: &str = "<!-- wp:";

/// A node of the post content tree
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block {
    /// `None` for freeform HTML between blocks
    pub name: Option<String>,
    pub attrs: Map<String, Value>,
    pub inner_html: String,
    pub inner_blocks: Vec<Block>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn freeform(html: impl Into<String>) -> Self {
        Self {
            inner_html: html.into(),
            ..Self::default()
        }
    }

    /// Set attributes from a JSON object; other values leave attributes empty
    pub fn with_attrs(mut self, attrs: Value) -> Self {
        if let Value::Object(map) = attrs {
            self.attrs = map;
        }
        self
    }

    pub fn with_inner_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = html.into();
        self
    }

    pub fn with_inner_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.inner_blocks = blocks;
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Positive attachment id stored under `key`, as a number or numeric string
    pub fn attr_id(&self, key: &str) -> Option<AttachmentId> {
        self.attrs.get(key).and_then(attachment_id_from_value)
    }

    /// Positive attachment ids from a list attribute, in order
    pub fn attr_ids(&self, key: &str) -> Vec<AttachmentId> {
        match self.attrs.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(attachment_id_from_value).collect(),
            _ => Vec::new(),
        }
    }
}

fn attachment_id_from_value(value: &Value) -> Option<AttachmentId> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
}

/// Whether stored content was authored in the block editor
pub fn has_blocks(content: &str) -> bool {
    content.contains(BLOCK_MARKER)
}

/// Parser for the block-editor delimiter grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct WpBlockParser;

impl BlockParser for WpBlockParser {
    fn parse_blocks(&self, html: &str) -> Vec<Block> {
        if !has_blocks(html) {
            return Vec::new();
        }
        parse(html)
    }
}

enum Delimiter {
    Open { block: Block, void: bool },
    Close { name: String },
}

/// Parse block content into a tree.
///
/// Malformed attribute JSON yields empty attributes, stray closers are
/// dropped, and blocks still open at the end of input are closed there.
pub fn parse(html: &str) -> Vec<Block> {
    let mut output = Vec::new();
    let mut stack: Vec<Block> = Vec::new();
    let mut pos = 0;

    while let Some((start, end, delimiter)) = next_delimiter(html, pos) {
        push_text(&mut stack, &mut output, &html[pos..start]);
        pos = end;

        match delimiter {
            Delimiter::Open { block, void: true } => attach(&mut stack, &mut output, block),
            Delimiter::Open { block, void: false } => stack.push(block),
            Delimiter::Close { name } => {
                let Some(depth) = stack.iter().rposition(|b| b.is(&name)) else {
                    trace!(name = %name, "closer without opener");
                    continue;
                };
                while stack.len() > depth {
                    if let Some(block) = stack.pop() {
                        attach(&mut stack, &mut output, block);
                    }
                }
            }
        }
    }

    push_text(&mut stack, &mut output, &html[pos..]);
    while let Some(block) = stack.pop() {
        attach(&mut stack, &mut output, block);
    }

    output
}

fn push_text(stack: &mut [Block], output: &mut Vec<Block>, text: &str) {
    if text.is_empty() {
        return;
    }
    match stack.last_mut() {
        Some(open) => open.inner_html.push_str(text),
        None if !text.trim().is_empty() => output.push(Block::freeform(text)),
        None => {}
    }
}

fn attach(stack: &mut [Block], output: &mut Vec<Block>, block: Block) {
    match stack.last_mut() {
        Some(parent) => parent.inner_blocks.push(block),
        None => output.push(block),
    }
}

/// Find the next block delimiter at or after `from`, skipping plain comments
fn next_delimiter(html: &str, from: usize) -> Option<(usize, usize, Delimiter)> {
    let mut pos = from;
    loop {
        let start = pos + html[pos..].find("<!--")?;
        let body_start = start + "<!--".len();
        let body_len = html[body_start..].find("-->")?;
        let end = body_start + body_len + "-->".len();

        if let Some(delimiter) = parse_delimiter(&html[body_start..body_start + body_len]) {
            return Some((start, end, delimiter));
        }
        pos = end;
    }
}

fn parse_delimiter(body: &str) -> Option<Delimiter> {
    let caps = DELIMITER_RE.captures(body)?;
    let name = qualified_name(&caps[2]);

    if caps.get(1).is_some() {
        return Some(Delimiter::Close { name });
    }

    let attrs = caps
        .get(3)
        .map(|json| match serde_json::from_str::<Map<String, Value>>(json.as_str()) {
            Ok(attrs) => attrs,
            Err(err) => {
                trace!(block = %name, error = %err, "unparseable block attributes");
                Map::new()
            }
        })
        .unwrap_or_default();

    Some(Delimiter::Open {
        block: Block {
            name: Some(name),
            attrs,
            ..Block::default()
        },
        void: caps.get(4).is_some(),
    })
}

fn qualified_name(name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("core/{name}")
    }
}
