//! Destination path pattern.
//!
//! A pattern is plain text with `%`-directives:
//!
//! | Directive | Value |
//! |-----------|-------|
//! | `%Y` | year, 4 digits |
//! | `%m` | month, 2 digits |
//! | `%d` | day, 2 digits |
//! | `%H` | hour, 2 digits |
//! | `%M` | minute, 2 digits |
//! | `%S` | second, 2 digits |
//! | `%W` | week of year (Monday first), 2 digits |
//! | `%n` | sequence counter |
//! | `%f` | original file name without extension |
//! | `%e` | original extension without the dot |
//! | `%%` | a literal `%` |
//!
//! Every other character, including `/`, is copied as is.

use crate::core::timestamp::CalendarTimestamp;
use crate::models::config::PatternMode;
use crate::Result;
use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

/// Directive marker.
pub const MARKER: char = '%';

/// A placeholder substituted at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Week,
    Counter,
    BaseName,
    Extension,
}

impl Directive {
    fn from_code(code: char) -> Option<Self> {
        let directive = match code {
            'Y' => Directive::Year,
            'm' => Directive::Month,
            'd' => Directive::Day,
            'H' => Directive::Hour,
            'M' => Directive::Minute,
            'S' => Directive::Second,
            'W' => Directive::Week,
            'n' => Directive::Counter,
            'f' => Directive::BaseName,
            'e' => Directive::Extension,
            _ => return None,
        };
        Some(directive)
    }
}

/// Compiled pattern token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Directive(Directive),
}

/// Values a template is rendered with.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    /// Timestamp in the configured basis.
    pub timestamp: &'a CalendarTimestamp,
    /// Original file name without extension.
    pub base_name: &'a str,
    /// Original extension without the dot.
    pub extension: &'a str,
    /// Sequence counter for `%n`; rendered empty when `None`.
    pub counter: Option<u64>,
}

/// Compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pattern: String,
    tokens: Vec<Token>,
    counter_width: usize,
}

impl Template {
    /// Compile a pattern string.
    ///
    /// A trailing lone `%` is always an error. Unknown directives are kept
    /// as literal text in lenient mode and rejected in strict mode.
    pub fn compile(pattern: &str, mode: PatternMode) -> Result<Self> {
        if pattern.is_empty() {
            return Err(crate::Error::EmptyPattern);
        }

        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.char_indices();

        while let Some((position, c)) = chars.next() {
            if c != MARKER {
                literal.push(c);
                continue;
            }

            let Some((_, code)) = chars.next() else {
                return Err(crate::Error::UnterminatedDirective(pattern.to_string()));
            };

            if code == MARKER {
                literal.push(MARKER);
                continue;
            }

            match Directive::from_code(code) {
                Some(directive) => {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Directive(directive));
                }
                None => match mode {
                    PatternMode::Lenient => {
                        tracing::debug!("Unknown directive '%{}' kept as literal", code);
                        literal.push(MARKER);
                        literal.push(code);
                    }
                    PatternMode::Strict => {
                        return Err(crate::Error::UnknownDirective { code, position });
                    }
                },
            }
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            tokens,
            counter_width: 1,
        })
    }

    /// Set the minimum width of the `%n` counter (zero padded).
    pub fn with_counter_width(mut self, width: usize) -> Self {
        self.counter_width = width.max(1);
        self
    }

    /// The original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Compiled tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Whether the pattern uses the `%n` counter.
    pub fn has_counter(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Directive(Directive::Counter)))
    }

    /// Render to a string. Pure: no I/O.
    pub fn render(&self, input: &RenderInput<'_>) -> String {
        let ts = input.timestamp;
        let mut out = String::with_capacity(self.pattern.len() + 16);

        for token in &self.tokens {
            // Writing into a String cannot fail.
            let _ = match token {
                Token::Literal(text) => out.write_str(text),
                Token::Directive(directive) => match directive {
                    Directive::Year => write!(out, "{:04}", ts.year),
                    Directive::Month => write!(out, "{:02}", ts.month),
                    Directive::Day => write!(out, "{:02}", ts.day),
                    Directive::Hour => write!(out, "{:02}", ts.hour),
                    Directive::Minute => write!(out, "{:02}", ts.minute),
                    Directive::Second => write!(out, "{:02}", ts.second),
                    Directive::Week => write!(out, "{:02}", ts.week),
                    Directive::Counter => match input.counter {
                        Some(n) => write!(out, "{:0width$}", n, width = self.counter_width),
                        None => Ok(()),
                    },
                    Directive::BaseName => out.write_str(input.base_name),
                    Directive::Extension => out.write_str(input.extension),
                },
            };
        }

        out
    }

    /// Render to a relative path, rejecting paths that would leave the
    /// destination root.
    pub fn render_path(&self, input: &RenderInput<'_>) -> Result<PathBuf> {
        let rendered = self.render(input);
        if rendered.ends_with('/') || rendered.ends_with(std::path::MAIN_SEPARATOR) {
            return Err(crate::Error::InvalidRenderedPath(rendered));
        }
        validate_relative(Path::new(&rendered))?;
        Ok(PathBuf::from(rendered))
    }
}

/// Check that a rendered path is a non-empty relative path without `..`.
fn validate_relative(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(crate::Error::InvalidRenderedPath("empty path".to_string()));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(crate::Error::InvalidRenderedPath(path.display().to_string()));
            }
        }
    }
    if path.file_name().is_none() {
        return Err(crate::Error::InvalidRenderedPath(path.display().to_string()));
    }
    Ok(())
}

/// Insert `_k` before the extension of the last path component.
///
/// `2023/IMG.jpg` becomes `2023/IMG_1.jpg`; a name without extension gets
/// the suffix appended.
pub fn with_suffix(path: &Path, suffix: usize) -> PathBuf {
    let Some(file_name) = path.file_name() else {
        return path.to_path_buf();
    };
    let name = file_name.to_string_lossy();
    let new_name = match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy();
            let stem = &name[..name.len() - ext.len() - 1];
            format!("{}_{}.{}", stem, suffix, ext)
        }
        None => format!("{}_{}", name, suffix),
    };
    path.with_file_name(new_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> CalendarTimestamp {
        CalendarTimestamp {
            year: 2023,
            month: 5,
            day: 1,
            hour: 9,
            minute: 5,
            second: 7,
            week: 18,
        }
    }

    fn input<'a>(ts: &'a CalendarTimestamp, counter: Option<u64>) -> RenderInput<'a> {
        RenderInput {
            timestamp: ts,
            base_name: "IMG_0042",
            extension: "jpg",
            counter,
        }
    }

    #[test]
    fn test_compile_tokens() {
        let template = Template::compile("%Y/%m-x", PatternMode::Lenient).unwrap();
        assert_eq!(
            template.tokens(),
            &[
                Token::Directive(Directive::Year),
                Token::Literal("/".to_string()),
                Token::Directive(Directive::Month),
                Token::Literal("-x".to_string()),
            ]
        );
    }

    #[test]
    fn test_render_zero_padded() {
        let ts = ts();
        let template = Template::compile("%Y%m%d_%H%M%S_w%W", PatternMode::Lenient).unwrap();
        assert_eq!(template.render(&input(&ts, None)), "20230501_090507_w18");
    }

    #[test]
    fn test_render_filename_parts() {
        let ts = ts();
        let template = Template::compile("%Y/%f.%e", PatternMode::Lenient).unwrap();
        assert_eq!(template.render(&input(&ts, None)), "2023/IMG_0042.jpg");
    }

    #[test]
    fn test_render_no_directives_verbatim() {
        let ts = ts();
        let template = Template::compile("fixed/name.bin", PatternMode::Lenient).unwrap();
        assert_eq!(template.render(&input(&ts, Some(3))), "fixed/name.bin");
        assert!(!template.has_counter());
    }

    #[test]
    fn test_render_counter_width() {
        let ts = ts();
        let template = Template::compile("%n", PatternMode::Lenient)
            .unwrap()
            .with_counter_width(3);
        assert_eq!(template.render(&input(&ts, Some(7))), "007");
        assert_eq!(template.render(&input(&ts, Some(1234))), "1234");
        assert_eq!(template.render(&input(&ts, None)), "");
    }

    #[test]
    fn test_counter_default_width_has_no_padding() {
        let ts = ts();
        let template = Template::compile("a_%n", PatternMode::Lenient).unwrap();
        assert!(template.has_counter());
        assert_eq!(template.render(&input(&ts, Some(12))), "a_12");
    }

    #[test]
    fn test_unknown_directive_lenient() {
        let ts = ts();
        let template = Template::compile("%Y-%q", PatternMode::Lenient).unwrap();
        assert_eq!(template.render(&input(&ts, None)), "2023-%q");
    }

    #[test]
    fn test_unknown_directive_strict() {
        let result = Template::compile("%Y-%q", PatternMode::Strict);
        assert!(matches!(
            result,
            Err(crate::Error::UnknownDirective { code: 'q', position: 3 })
        ));
    }

    #[test]
    fn test_escaped_marker() {
        let ts = ts();
        let template = Template::compile("100%%_%Y", PatternMode::Strict).unwrap();
        assert_eq!(template.render(&input(&ts, None)), "100%_2023");
    }

    #[test]
    fn test_unterminated_directive() {
        for mode in [PatternMode::Lenient, PatternMode::Strict] {
            assert!(matches!(
                Template::compile("%Y/%", mode),
                Err(crate::Error::UnterminatedDirective(_))
            ));
        }
    }

    #[test]
    fn test_empty_pattern() {
        assert!(matches!(
            Template::compile("", PatternMode::Lenient),
            Err(crate::Error::EmptyPattern)
        ));
    }

    #[test]
    fn test_render_path_rejects_escape() {
        let ts = ts();
        for pattern in ["../%Y", "/abs/%Y", "a/../../b", "x/"] {
            let template = Template::compile(pattern, PatternMode::Lenient).unwrap();
            assert!(
                template.render_path(&input(&ts, None)).is_err(),
                "pattern {} should be rejected",
                pattern
            );
        }
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("2023/05/IMG.jpg"), 1),
            PathBuf::from("2023/05/IMG_1.jpg")
        );
        assert_eq!(
            with_suffix(Path::new("2023/archive.tar.gz"), 2),
            PathBuf::from("2023/archive.tar_2.gz")
        );
        assert_eq!(with_suffix(Path::new("README"), 3), PathBuf::from("README_3"));
    }
}
