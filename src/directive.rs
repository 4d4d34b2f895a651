//! Directive headers in playground source files.
//!
//! A file may open with a single line such as
//!
//! ```text
//! //// { compiler: { strictFunctionTypes: false } }
//! ```
//!
//! whose `compiler` members become options for the playground compiler. The
//! line is removed from the code handed to the front end.

use serde_json::Value;

use crate::errors::{ErrorKind, Result};
use crate::literal::parse_literal;
use crate::options::CompilerOptions;

const MARKER: &str = "////";

/// Extensions the playground can run.
pub const CODE_EXTENSIONS: &[&str] = &["ts", "js", "jsx", "tsx", "mjs", "cjs"];

/// Extensions the playground treats as plain JavaScript.
const JS_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs"];

pub fn is_code_extension(extension: &str) -> bool {
    CODE_EXTENSIONS.contains(&extension)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub code: String,
    pub compiler_options: CompilerOptions,
}

struct Split<'a> {
    literal: Option<(usize, &'a str)>,
    code: &'a str,
}

/// Separates a leading directive line from the code after it.
fn split_header(contents: &str) -> Split {
    let no_directive = Split {
        literal: None,
        code: contents,
    };
    let rest = match contents.strip_prefix(MARKER) {
        Some(rest) => rest,
        None => return no_directive,
    };
    let header_len = contents.find('\n').unwrap_or_else(|| contents.len());
    let after_marker = rest.trim_start_matches(|c| c == ' ' || c == '\t');
    if !after_marker.starts_with('{') {
        return no_directive;
    }

    let literal_start = contents.len() - after_marker.len();
    let literal = contents[literal_start..header_len].trim_end();
    let code = contents.get(header_len + 1..).unwrap_or("");
    Split {
        literal: Some((literal_start, literal)),
        code,
    }
}

fn read_compiler_options(offset: usize, literal: &str) -> Result<CompilerOptions> {
    if !literal.ends_with('}') {
        return Err(ErrorKind::MalformedDirective(
            offset + literal.len(),
            "directive does not close with '}'".to_string(),
        )
        .into());
    }
    let parsed = parse_literal(literal).map_err(|err| {
        if let ErrorKind::MalformedDirective(at, reason) = err.kind() {
            return ErrorKind::MalformedDirective(offset + at, reason.clone()).into();
        }
        err
    })?;

    match parsed {
        Value::Object(mut header) => match header.remove("compiler") {
            Some(Value::Object(compiler)) => Ok(compiler.into()),
            Some(_) => Err(ErrorKind::MalformedDirective(
                offset,
                "'compiler' must be an object".to_string(),
            )
            .into()),
            None => Ok(CompilerOptions::new()),
        },
        _ => Err(ErrorKind::MalformedDirective(offset, "directive must be an object".to_string()).into()),
    }
}

fn with_filetype(extension: &str, mut options: CompilerOptions) -> CompilerOptions {
    if JS_EXTENSIONS.contains(&extension) {
        options.insert("filetype", "js");
    }
    options
}

/// Parses the directive at the head of `contents`, failing on a malformed
/// literal.
pub fn parse_directive(extension: &str, contents: &str) -> Result<Directive> {
    let contents = contents.replace("\r\n", "\n");
    let split = split_header(&contents);
    let options = match split.literal {
        Some((offset, literal)) => read_compiler_options(offset, literal)?,
        None => CompilerOptions::new(),
    };

    Ok(Directive {
        code: split.code.to_string(),
        compiler_options: with_filetype(extension, options),
    })
}

impl Directive {
    /// Like [`parse_directive`], but a malformed header only costs the
    /// declared options: the header line is still dropped and the code
    /// still comes back.
    pub fn parse_lenient(extension: &str, contents: &str) -> Directive {
        let normalized = contents.replace("\r\n", "\n");
        let split = split_header(&normalized);
        let options = match split.literal {
            Some((offset, literal)) => read_compiler_options(offset, literal).unwrap_or_else(|err| {
                warn!(error = %err, "ignoring malformed directive");
                CompilerOptions::new()
            }),
            None => CompilerOptions::new(),
        };

        Directive {
            code: split.code.to_string(),
            compiler_options: with_filetype(extension, options),
        }
    }
}
