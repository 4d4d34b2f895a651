//! Multi-file gists as playground stories.
//!
//! Every file in a story gist is named `<index>~<title>`, e.g. `0~Intro.md`
//! or `1 ~ setup.ts`. Code files become editor blocks, markdown files become
//! rendered html, and unused indices become separators.

use std::fmt;

use crate::directive::{is_code_extension, Directive};
use crate::gist::GistFiles;
use crate::markdown::MarkdownRenderer;
use crate::options::CompilerOptions;

/// Highest index a story file may claim.
pub const MAX_STORY_INDEX: usize = 10_000;

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoryContent {
    Code {
        code: String,
        params: CompilerOptions,
        title: String,
    },
    Html {
        html: String,
        title: String,
    },
    #[serde(rename = "hr")]
    Separator,
}

/// Why a gist could not be turned into a story. Only the first problem found
/// is reported.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub display: String,
}

impl ValidationError {
    fn new(display: String) -> Self {
        ValidationError { display }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl std::error::Error for ValidationError {}

/// A story file name split into its position and the rest of the name.
#[derive(Debug, PartialEq)]
struct IndexedKey<'a> {
    index: usize,
    label: &'a str,
}

impl<'a> IndexedKey<'a> {
    fn parse(name: &'a str) -> Result<Self, ValidationError> {
        let (prefix, label) = match name.split_once('~') {
            Some(parts) => parts,
            None => {
                return Err(ValidationError::new(format!(
                    "The file '{}' does not start with an index and ~ - e.g. '1~'",
                    name
                )))
            }
        };

        let not_a_number = || {
            ValidationError::new(format!(
                "The file '{}' does not start with a number before the '~'",
                name
            ))
        };
        let number: f64 = prefix.trim().parse().map_err(|_| not_a_number())?;
        if !number.is_finite() || number < 0.0 || number.fract() != 0.0 {
            return Err(not_a_number());
        }
        if number > MAX_STORY_INDEX as f64 {
            return Err(ValidationError::new(format!(
                "The file '{}' has an index above {}",
                name, MAX_STORY_INDEX
            )));
        }

        Ok(IndexedKey {
            index: number as usize,
            label,
        })
    }

    fn title(&self) -> &'a str {
        self.label.split('~').next().unwrap_or("").trim()
    }

    fn extension(&self) -> Option<&'a str> {
        self.label.trim().rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// Builds the story for a multi-file gist.
///
/// Files are handled in name order and the first invalid one aborts the
/// whole story. Markdown is rendered one file at a time.
pub async fn build_story(
    files: &GistFiles,
    renderer: &dyn MarkdownRenderer,
) -> Result<Vec<StoryContent>, ValidationError> {
    let mut placed: Vec<Option<StoryContent>> = Vec::new();

    for (name, file) in files {
        let key = IndexedKey::parse(name)?;

        let content = file.text();
        if content.is_empty() {
            return Err(ValidationError::new(format!("The file '{}' is empty", name)));
        }

        let title = key.title().to_string();
        let entry = match key.extension() {
            Some(ext) if is_code_extension(ext) => {
                let directive = Directive::parse_lenient(ext, content);
                StoryContent::Code {
                    code: directive.code,
                    params: directive.compiler_options,
                    title,
                }
            }
            Some("md") => match renderer.render(content).await {
                Some(html) => StoryContent::Html { html, title },
                None => {
                    return Err(ValidationError::new(format!(
                        "The markdown for '{}' could not be rendered by the GitHub Markdown API",
                        name
                    )))
                }
            },
            _ => {
                return Err(ValidationError::new(format!(
                    "Can't do anything with the file '{}'. It needs to be a markdown file, or something the playground supports",
                    name
                )))
            }
        };

        if placed.len() <= key.index {
            placed.resize(key.index + 1, None);
        }
        if placed[key.index].is_some() {
            warn!(file = %name, index = key.index, "story index used twice, keeping the later file");
        }
        placed[key.index] = Some(entry);
    }

    Ok(placed
        .into_iter()
        .map(|slot| slot.unwrap_or(StoryContent::Separator))
        .collect())
}
