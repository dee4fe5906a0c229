//! Front matter extraction.
//!
//! A document may open with a metadata block:
//!
//! ```text
//! ---
//! title: Getting started
//! head:
//!   - [meta, { name: description, content: First steps }]
//! ---
//! # Body starts here
//! ```
//!
//! YAML blocks are fenced by `---` lines, TOML blocks by `+++` lines. Values
//! are kept as a generic JSON tree so arbitrary nested metadata survives
//! untouched into the page data.

use serde_json::{Map, Value};

/// Metadata mapping of a document.
pub type Metadata = Map<String, Value>;

/// Document split into its metadata block and body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontMatter<'a> {
    /// Parsed metadata block, empty when the document has none.
    pub metadata: Metadata,
    /// Text after the closing delimiter line.
    pub body: &'a str,
}

/// Error parsing a front matter block.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// Opening delimiter without a closing one.
    #[error("front matter opened with `{0}` is never closed")]
    Unterminated(&'static str),
    /// Block is not valid YAML.
    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Block is not valid TOML.
    #[error("invalid TOML front matter: {0}")]
    Toml(#[from] toml::de::Error),
    /// Block parsed to something other than a mapping.
    #[error("front matter must be a mapping")]
    NotAMapping,
}

#[derive(Clone, Copy)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }

    fn parse(self, block: &str) -> Result<Metadata, FrontMatterError> {
        if block.trim().is_empty() {
            return Ok(Metadata::new());
        }
        match self {
            Self::Yaml => match serde_yaml::from_str::<Value>(block)? {
                Value::Object(map) => Ok(map),
                Value::Null => Ok(Metadata::new()),
                _ => Err(FrontMatterError::NotAMapping),
            },
            Self::Toml => Ok(toml::from_str::<Metadata>(block)?),
        }
    }
}

/// Split `text` into front matter and body.
///
/// Text without an opening delimiter on its first line yields empty metadata
/// and the whole text as body.
///
/// # Errors
///
/// Returns [`FrontMatterError`] for an unterminated or unparsable block.
pub fn extract(text: &str) -> Result<FrontMatter<'_>, FrontMatterError> {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(FrontMatter {
            metadata: Metadata::new(),
            body: text,
        });
    };

    let format = match first.trim_end() {
        "---" => Format::Yaml,
        "+++" => Format::Toml,
        _ => {
            return Ok(FrontMatter {
                metadata: Metadata::new(),
                body: text,
            });
        }
    };

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == format.delimiter() {
            let metadata = format.parse(&text[block_start..offset])?;
            return Ok(FrontMatter {
                metadata,
                body: &text[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated(format.delimiter()))
}
