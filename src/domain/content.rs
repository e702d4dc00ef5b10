//! Blog body assembly: one ordered sequence of typed content blocks.
//!
//! A blog body is persisted as a single JSON array of [`ContentBlock`]s. Each
//! block carries an explicit integer `position`; the array is the source of
//! truth for rendering order once [`normalize`] has run. The authoring client
//! historically edited six independent per-type lists and interleaved them
//! with per-type position formulas at save time. [`BlockCollections`] accepts
//! that shape (and the matching object-of-arrays JSON) and linearizes it into
//! the canonical sequence, while [`disassemble`] projects a stored sequence
//! back into per-type lists for editing.

use foglio_api_types::ContentBlock;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Interleaving offsets used by the per-type authoring lists. Paragraphs are
/// numbered by list index; code and quote blocks spread out with a stride so
/// short lists slot between paragraphs. Collisions between formulas are
/// resolved by [`normalize`]'s stable ordering, never by the formulas
/// themselves.
const CODE_STRIDE: i32 = 5;
const CODE_OFFSET: i32 = 2;
const QUOTE_STRIDE: i32 = 6;
const QUOTE_OFFSET: i32 = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Content must be a non-empty array")]
    Empty,
    #[error("Content must be valid JSON array")]
    InvalidJson,
}

/// Parse raw request content into the canonical block sequence.
///
/// Accepted input shapes:
/// - a JSON array of tagged blocks (the canonical wire form),
/// - a JSON string containing an encoded array (form-field submissions),
/// - an object of per-type lists (the grouped authoring shape).
///
/// Entries with an unknown `type` are dropped silently. Blank paragraphs and
/// quotes are filtered out. An input that is not an array (or decodes to
/// nothing) is a validation error.
pub fn parse_content(raw: &Value) -> Result<Vec<ContentBlock>, ContentError> {
    let items = match raw {
        Value::Array(items) => items.clone(),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => items,
            Ok(_) | Err(_) => return Err(ContentError::InvalidJson),
        },
        Value::Object(_) => {
            let collections: BlockCollections =
                serde_json::from_value(raw.clone()).map_err(|_| ContentError::InvalidJson)?;
            let blocks = collections.assemble();
            return if blocks.is_empty() {
                Err(ContentError::Empty)
            } else {
                Ok(blocks)
            };
        }
        _ => return Err(ContentError::InvalidJson),
    };

    if items.is_empty() {
        return Err(ContentError::Empty);
    }

    let blocks: Vec<ContentBlock> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    let blocks = normalize(blocks);
    if blocks.is_empty() {
        return Err(ContentError::Empty);
    }
    Ok(blocks)
}

/// Linearize a block sequence into canonical form.
///
/// Blank paragraphs and quotes are removed, blocks are stable-sorted on
/// `position` (ties keep their input order), and positions are reassigned
/// contiguously from zero so the stored array and the `position` fields agree.
pub fn normalize(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    let mut blocks: Vec<ContentBlock> = blocks.into_iter().filter(|b| !is_blank(b)).collect();
    blocks.sort_by_key(ContentBlock::position);
    for (index, block) in blocks.iter_mut().enumerate() {
        block.set_position(index as i32);
    }
    blocks
}

/// Sanitize user-authored rich text in place. Paragraphs and quotes come from
/// a contentEditable surface and may carry arbitrary HTML.
pub fn sanitize(blocks: &mut [ContentBlock]) {
    for block in blocks {
        match block {
            ContentBlock::Paragraph { value, .. } | ContentBlock::Quote { value, .. } => {
                *value = ammonia::clean(value);
            }
            _ => {}
        }
    }
}

fn is_blank(block: &ContentBlock) -> bool {
    match block {
        ContentBlock::Paragraph { value, .. } | ContentBlock::Quote { value, .. } => {
            value.trim().is_empty()
        }
        _ => false,
    }
}

/// An image or video entry in the authoring collections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaItem {
    #[serde(alias = "value")]
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
}

/// A code entry in the authoring collections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CodeItem {
    #[serde(alias = "code")]
    pub value: String,
    #[serde(default = "CodeItem::default_language")]
    pub language: String,
    #[serde(default)]
    pub position: Option<i32>,
}

impl CodeItem {
    fn default_language() -> String {
        "javascript".to_string()
    }
}

/// A file attachment entry in the authoring collections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileItem {
    #[serde(alias = "value")]
    pub url: String,
    pub name: String,
    #[serde(rename = "fileType", alias = "type")]
    pub file_type: String,
    #[serde(default)]
    pub position: Option<i32>,
}

/// The grouped authoring shape: one independently-edited list per block type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockCollections {
    pub paragraphs: Vec<String>,
    pub images: Vec<MediaItem>,
    pub videos: Vec<MediaItem>,
    pub code_blocks: Vec<CodeItem>,
    pub quotes: Vec<String>,
    pub files: Vec<FileItem>,
}

impl BlockCollections {
    /// Merge the per-type lists into one canonical ordered sequence.
    ///
    /// Paragraphs are numbered by list index; images, videos and files keep
    /// the position recorded when they were inserted relative to the
    /// paragraph flow (falling back to their list index); code and quote
    /// blocks spread with their strides. The combined list is then
    /// [`normalize`]d, which makes the ordering total even where the
    /// formulas collide.
    pub fn assemble(&self) -> Vec<ContentBlock> {
        let mut blocks = Vec::with_capacity(
            self.paragraphs.len()
                + self.images.len()
                + self.videos.len()
                + self.code_blocks.len()
                + self.quotes.len()
                + self.files.len(),
        );

        for (index, value) in self.paragraphs.iter().enumerate() {
            blocks.push(ContentBlock::Paragraph {
                value: value.clone(),
                position: index as i32,
            });
        }
        for (index, image) in self.images.iter().enumerate() {
            blocks.push(ContentBlock::Image {
                value: image.url.clone(),
                name: image.name.clone(),
                position: image.position.unwrap_or(index as i32),
            });
        }
        for (index, video) in self.videos.iter().enumerate() {
            blocks.push(ContentBlock::Video {
                value: video.url.clone(),
                name: video.name.clone(),
                position: video.position.unwrap_or(index as i32),
            });
        }
        for (index, code) in self.code_blocks.iter().enumerate() {
            blocks.push(ContentBlock::Code {
                value: code.value.clone(),
                language: code.language.clone(),
                position: code
                    .position
                    .unwrap_or(index as i32 * CODE_STRIDE + CODE_OFFSET),
            });
        }
        for (index, file) in self.files.iter().enumerate() {
            blocks.push(ContentBlock::File {
                value: file.url.clone(),
                name: file.name.clone(),
                file_type: file.file_type.clone(),
                position: file.position.unwrap_or(index as i32),
            });
        }
        for (index, value) in self.quotes.iter().enumerate() {
            blocks.push(ContentBlock::Quote {
                value: value.clone(),
                position: index as i32 * QUOTE_STRIDE + QUOTE_OFFSET,
            });
        }

        normalize(blocks)
    }
}

/// Project a stored sequence back into per-type editing lists.
///
/// Order within each type follows the stored order. Image, video and file
/// positions are retained so the interleaving can be replayed; code and quote
/// blocks are renumbered from list order on the next assembly, which loses
/// their cross-type placement; the authoring model accepts that.
pub fn disassemble(blocks: &[ContentBlock]) -> BlockCollections {
    let mut collections = BlockCollections::default();

    for block in blocks {
        match block {
            ContentBlock::Paragraph { value, .. } => collections.paragraphs.push(value.clone()),
            ContentBlock::Image {
                value,
                name,
                position,
            } => collections.images.push(MediaItem {
                url: value.clone(),
                name: name.clone(),
                position: Some(*position),
            }),
            ContentBlock::Video {
                value,
                name,
                position,
            } => collections.videos.push(MediaItem {
                url: value.clone(),
                name: name.clone(),
                position: Some(*position),
            }),
            ContentBlock::Code {
                value, language, ..
            } => collections.code_blocks.push(CodeItem {
                value: value.clone(),
                language: language.clone(),
                position: None,
            }),
            ContentBlock::Quote { value, .. } => collections.quotes.push(value.clone()),
            ContentBlock::File {
                value,
                name,
                file_type,
                position,
            } => collections.files.push(FileItem {
                url: value.clone(),
                name: name.clone(),
                file_type: file_type.clone(),
                position: Some(*position),
            }),
        }
    }

    collections
}
