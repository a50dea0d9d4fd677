use hopscope_core::Fragment;
use regex::Regex;

use crate::GraphAlgoError;

/// Optional inner-class qualifier between a class name and its member,
/// e.g. the `$Inner` in `Outer$Inner.run`.
const INNER_CLASS_SUFFIX: &str = r"(?:\$[^.]*)?";

/// Compiled matcher for method labels.
///
/// Matching is an unanchored search, so `Parser.parse` also accepts
/// `org.demo.Parser.parse(java.lang.String)`.
#[derive(Debug, Clone)]
pub struct IdentifierPattern {
    fragment: String,
    regex: Regex,
}

impl IdentifierPattern {
    /// A fragment containing a dot is split at the last dot into class and
    /// method, both escaped, and rejoined with an optional inner-class
    /// suffix. A bare literal fragment is an escaped substring; a bare raw
    /// fragment is compiled as written.
    pub fn compile(fragment: &Fragment) -> Result<Self, GraphAlgoError> {
        let text = fragment.as_str();
        let pattern = match text.rsplit_once('.') {
            Some((class, method)) => qualified_pattern(class, method),
            None if fragment.is_raw() => text.to_owned(),
            None => regex::escape(text),
        };
        Self::from_pattern(text, &pattern)
    }

    /// Matches every member of `class` or of one of its inner classes.
    pub fn class(class: &str) -> Result<Self, GraphAlgoError> {
        let pattern = format!(r"{}{INNER_CLASS_SUFFIX}\.", regex::escape(class));
        Self::from_pattern(class, &pattern)
    }

    /// Matches `method` as a member name: preceded by a dot and followed by
    /// an argument list or the end of the label.
    pub fn method(method: &str) -> Result<Self, GraphAlgoError> {
        let pattern = format!(r"\.{}(?:\(|$)", regex::escape(method));
        Self::from_pattern(method, &pattern)
    }

    pub fn qualified(class: &str, method: &str) -> Result<Self, GraphAlgoError> {
        Self::from_pattern(&format!("{class}.{method}"), &qualified_pattern(class, method))
    }

    fn from_pattern(fragment: &str, pattern: &str) -> Result<Self, GraphAlgoError> {
        let regex = Regex::new(pattern).map_err(|source| GraphAlgoError::InvalidPattern {
            fragment: fragment.to_owned(),
            source,
        })?;
        Ok(Self {
            fragment: fragment.to_owned(),
            regex,
        })
    }

    pub fn is_match(&self, label: &str) -> bool {
        self.regex.is_match(label)
    }

    /// The identifier text this pattern was built from.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn as_regex_str(&self) -> &str {
        self.regex.as_str()
    }
}

fn qualified_pattern(class: &str, method: &str) -> String {
    format!(
        r"{}{INNER_CLASS_SUFFIX}\.{}",
        regex::escape(class),
        regex::escape(method)
    )
}
