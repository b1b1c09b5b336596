//! Syntax highlighting for fenced code blocks.

use log::debug;
use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

/// Turns source text into highlighted HTML markup.
///
/// Implementations must never fail: when nothing better is possible the
/// escaped source is returned as-is.
pub trait Highlight {
    fn highlight(&self, source: &str, language: Option<&str>) -> String;
}

/// Keyword signatures used to guess the language of unlabelled code. Each
/// matching needle adds one point; the highest score wins.
const SIGNATURES: &[(&str, &[&str])] = &[
    ("rs", &["fn ", "let mut ", "impl ", "pub fn ", "use std::", "println!", "::new("]),
    ("py", &["def ", "import ", "elif ", "self.", "print(", "__init__"]),
    ("js", &["function ", "const ", "=> ", "console.log", "require(", "let "]),
    ("go", &["package ", "func ", ":= ", "fmt."]),
    ("java", &["public class ", "public static void", "System.out", "private "]),
    ("c", &["#include", "int main", "printf(", "->"]),
    ("sh", &["#!/bin/", "echo ", "export ", "$(", "fi\n", "sudo "]),
    ("sql", &["SELECT ", "INSERT INTO", "CREATE TABLE", "WHERE ", "FROM "]),
    ("html", &["<!DOCTYPE", "<html", "<div", "<body", "</"]),
    ("json", &["{\n  \"", "\": ", "[{"]),
    ("yaml", &["---\n", ": |", "\n- "]),
];

/// Each scope atom becomes an `hljs-` class, so `keyword.control.python`
/// renders as `hljs-keyword hljs-control hljs-python`.
const TOKEN_CLASSES: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hljs-" };

pub struct CodeHighlighter {
    syntaxes: SyntaxSet,
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        self.syntaxes.find_syntax_by_token(language)
    }

    fn detect_syntax(&self, source: &str) -> Option<&SyntaxReference> {
        if let Some(syntax) = self.syntaxes.find_syntax_by_first_line(source) {
            return Some(syntax);
        }

        let (token, _) = SIGNATURES
            .iter()
            .map(|(token, needles)| {
                let score = needles.iter().filter(|needle| source.contains(*needle)).count();
                (*token, score)
            })
            .filter(|(_, score)| *score > 0)
            .fold(None, |best: Option<(&str, usize)>, candidate| match best {
                Some(best) if best.1 >= candidate.1 => Some(best),
                _ => Some(candidate),
            })?;

        self.find_syntax(token)
    }

    fn render(&self, syntax: &SyntaxReference, source: &str) -> Result<String, syntect::Error> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, TOKEN_CLASSES);
        for line in LinesWithEndings::from(source) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

impl Highlight for CodeHighlighter {
    fn highlight(&self, source: &str, language: Option<&str>) -> String {
        let syntax = language
            .and_then(|language| self.find_syntax(language))
            .or_else(|| self.detect_syntax(source));

        let Some(syntax) = syntax else {
            return escape_html(source);
        };

        self.render(syntax, source).unwrap_or_else(|error| {
            debug!("Highlighting as {} failed: {error}", syntax.name);
            escape_html(source)
        })
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
