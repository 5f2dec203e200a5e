//! Block model: one unit of structured article content.
//!
//! A [`Block`] carries a stable id, its position in the document, and a
//! typed payload. Payloads are plain data (strings, numbers, vectors)
//! so snapshot deep copies are plain `Clone`s and never carry handles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a block. Unique within a document, never reused
/// after deletion; used for selection and diffing across edits.
pub type BlockId = Uuid;

/// The kind tag of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading,
    Paragraph,
    Image,
    Quote,
    List,
    Divider,
}

/// Type-specific payload of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockData {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Image {
        url: String,
        alt: Option<String>,
        caption: Option<String>,
    },
    Quote {
        text: String,
        attribution: Option<String>,
    },
    List {
        ordered: bool,
        items: Vec<String>,
    },
    Divider,
}

impl BlockData {
    /// The kind tag this payload belongs to.
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockData::Heading { .. } => BlockKind::Heading,
            BlockData::Paragraph { .. } => BlockKind::Paragraph,
            BlockData::Image { .. } => BlockKind::Image,
            BlockData::Quote { .. } => BlockKind::Quote,
            BlockData::List { .. } => BlockKind::List,
            BlockData::Divider => BlockKind::Divider,
        }
    }
}

/// Partial update merged into a block's payload.
///
/// Fields that do not apply to the target payload kind are ignored; the
/// block's kind and order are never touched by a patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockPatch {
    pub text: Option<String>,
    pub level: Option<u8>,
    pub url: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub attribution: Option<String>,
    pub ordered: Option<bool>,
    pub items: Option<Vec<String>>,
}

/// One unit of structured article content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Dense 0-based position within the document. Maintained by
    /// [`Document`](crate::document::Document), not by callers.
    pub order: usize,
    pub data: BlockData,
}

impl Block {
    /// Create a block with a fresh id. The order is assigned by the
    /// document on insertion.
    pub fn new(data: BlockData) -> Self {
        Self {
            id: Uuid::new_v4(),
            order: 0,
            data,
        }
    }

    /// The kind tag of this block.
    pub fn kind(&self) -> BlockKind {
        self.data.kind()
    }

    /// Merge a patch into the payload. Irrelevant patch fields are
    /// ignored; `id`, `order`, and the payload kind are untouched.
    pub fn apply_patch(&mut self, patch: &BlockPatch) {
        match &mut self.data {
            BlockData::Heading { level, text } => {
                if let Some(l) = patch.level {
                    *level = l;
                }
                if let Some(t) = &patch.text {
                    *text = t.clone();
                }
            }
            BlockData::Paragraph { text } => {
                if let Some(t) = &patch.text {
                    *text = t.clone();
                }
            }
            BlockData::Image { url, alt, caption } => {
                if let Some(u) = &patch.url {
                    *url = u.clone();
                }
                if let Some(a) = &patch.alt {
                    *alt = Some(a.clone());
                }
                if let Some(c) = &patch.caption {
                    *caption = Some(c.clone());
                }
            }
            BlockData::Quote { text, attribution } => {
                if let Some(t) = &patch.text {
                    *text = t.clone();
                }
                if let Some(a) = &patch.attribution {
                    *attribution = Some(a.clone());
                }
            }
            BlockData::List { ordered, items } => {
                if let Some(o) = patch.ordered {
                    *ordered = o;
                }
                if let Some(i) = &patch.items {
                    *items = i.clone();
                }
            }
            BlockData::Divider => {}
        }
    }
}
