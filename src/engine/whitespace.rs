//! Whitespace handling applied to template sources before the engine sees them.

use regex::Regex;
use std::borrow::Cow;

/// How template whitespace is treated when a source is compiled or loaded.
///
/// Chosen per call, so two targets in the same process can use different modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Whitespace {
    /// Keep the source exactly as written.
    #[default]
    Preserve,
    /// Drop every line break together with the indentation that follows it.
    Minify,
}

impl Whitespace {
    /// Maps the `preserve_whitespace` option to a mode.
    pub const fn from_preserve(preserve: bool) -> Self {
        if preserve {
            Self::Preserve
        } else {
            Self::Minify
        }
    }

    /// Applies the mode to a template source.
    ///
    /// Minifying only touches text between tags. Inside `{{ }}`, `{% %}` and `{# #}`
    /// a line break and its indentation become a single space, so multi-line tags
    /// keep their tokens apart.
    ///
    /// # Examples
    ///
    /// ```
    /// use stencil_cli::engine::Whitespace;
    ///
    /// let source = "<ul>\n  <li>{{ item }}</li>\n</ul>\n";
    /// assert_eq!(Whitespace::Minify.apply(source), "<ul><li>{{ item }}</li></ul>");
    /// assert_eq!(Whitespace::Preserve.apply(source), source);
    /// ```
    pub fn apply<'a>(&self, source: &'a str) -> Cow<'a, str> {
        match self {
            Self::Preserve => Cow::Borrowed(source),
            Self::Minify => minify(source),
        }
    }
}

fn minify(source: &str) -> Cow<'_, str> {
    let (Ok(tag), Ok(line_break)) = (
        Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}|\{#.*?#\}"),
        Regex::new(r"\r?\n[ \t]*"),
    ) else {
        return Cow::Borrowed(source);
    };
    if !line_break.is_match(source) {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for m in tag.find_iter(source) {
        out.push_str(&line_break.replace_all(&source[last..m.start()], ""));
        out.push_str(&line_break.replace_all(m.as_str(), " "));
        last = m.end();
    }
    out.push_str(&line_break.replace_all(&source[last..], ""));
    Cow::Owned(out)
}
