use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

pub const APP_TITLE: &str = "Pandoc In-Memory Converter with HTML Preview";
pub const WINDOW_SIZE: [f32; 2] = [950.0, 700.0];

// External converter
pub const CONVERTER_PROGRAM: &str = "pandoc";
pub const FALLBACK_DIAGNOSTIC: &str = "Pandoc conversion failed";

// Status bar
pub const STATUS_READY: &str = "Ready";
pub const STATUS_CONVERTING: &str = "Converting...";
pub const STATUS_SUCCESS: &str = "Conversion successful.";
pub const STATUS_ERROR: &str = "Error";
pub const STATUS_COPIED: &str = "Output copied to clipboard.";

// User notices
pub const EMPTY_INPUT_NOTICE: &str = "Input is empty.";
pub const NO_OUTPUT_NOTICE: &str = "There is no output to copy.";
pub const ERROR_DIALOG_TITLE: &str = "Conversion Error";
pub const PREVIEW_PLACEHOLDER: &str = "<p>Preview only available for HTML output.</p>";

pub const MISSING_CONVERTER_TITLE: &str = "Pandoc Not Found";
pub const MISSING_CONVERTER_MESSAGE: &str = "Pandoc executable was not found on your system.\n\
    Please install Pandoc and ensure it is available in your PATH.";

/// Document formats understood by pandoc that the UI offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Markdown,
    MarkdownStrict,
    Commonmark,
    Html,
    Latex,
    Rst,
    Org,
    Plain,
    Asciidoc,
    Mediawiki,
}

impl Format {
    pub const ALL: [Format; 10] = [
        Format::Markdown,
        Format::MarkdownStrict,
        Format::Commonmark,
        Format::Html,
        Format::Latex,
        Format::Rst,
        Format::Org,
        Format::Plain,
        Format::Asciidoc,
        Format::Mediawiki,
    ];

    /// Identifier passed to pandoc's `-f` / `-t` flags.
    pub fn pandoc_name(&self) -> &'static str {
        match self {
            Format::Markdown => "markdown",
            Format::MarkdownStrict => "markdown_strict",
            Format::Commonmark => "commonmark",
            Format::Html => "html",
            Format::Latex => "latex",
            Format::Rst => "rst",
            Format::Org => "org",
            Format::Plain => "plain",
            Format::Asciidoc => "asciidoc",
            Format::Mediawiki => "mediawiki",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Markdown => "Markdown",
            Format::MarkdownStrict => "Markdown (strict)",
            Format::Commonmark => "CommonMark",
            Format::Html => "HTML",
            Format::Latex => "LaTeX",
            Format::Rst => "reStructuredText",
            Format::Org => "Org",
            Format::Plain => "Plain text",
            Format::Asciidoc => "AsciiDoc",
            Format::Mediawiki => "MediaWiki",
        }
    }

    pub fn is_html(&self) -> bool {
        *self == Format::Html
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pandoc_name())
    }
}

impl FromStr for Format {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .iter()
            .copied()
            .find(|format| format.pandoc_name() == s)
            .ok_or_else(|| AppError::UnknownFormat(s.to_string()))
    }
}

pub const DEFAULT_FROM_FORMAT: Format = Format::Markdown;
pub const DEFAULT_TO_FORMAT: Format = Format::MarkdownStrict;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_pandoc_name() {
        for format in Format::ALL {
            assert_eq!(format.pandoc_name().parse::<Format>().unwrap(), format);
        }
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "docx".parse::<Format>().unwrap_err();
        assert!(matches!(err, AppError::UnknownFormat(ref name) if name == "docx"));
        assert!("HTML".parse::<Format>().is_err());
    }

    #[test]
    fn defaults_are_first_two_formats() {
        assert_eq!(DEFAULT_FROM_FORMAT, Format::ALL[0]);
        assert_eq!(DEFAULT_TO_FORMAT, Format::ALL[1]);
    }

    #[test]
    fn only_html_is_html() {
        let html: Vec<_> = Format::ALL.iter().filter(|f| f.is_html()).collect();
        assert_eq!(html, vec![&Format::Html]);
        assert_eq!(Format::Html.to_string(), "html");
    }
}
