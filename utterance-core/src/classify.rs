//! Grapheme classification with bounded lookahead
//!
//! Maps each user-perceived character to a punctuation class or to one of
//! the two in-band control sentinels. Three lookahead rules run before the
//! table lookup: markdown strong-marker pairing, decimal protection, and
//! ellipsis collapse. Lookahead never exceeds two graphemes.

use std::sync::OnceLock;

use regex::Regex;

/// In-band marker for an explicit flush point (zero-width space)
pub const FLUSH: char = '\u{200B}';

/// In-band marker for a non-text special token (invisible separator)
pub const SPECIAL: char = '\u{2063}';

/// Punctuation class of a single grapheme
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphemeClass {
    /// Ordinary text; accumulates into the working buffer
    Literal,
    /// Pause punctuation that permits, but does not force, a boundary
    Soft,
    /// Terminal punctuation, whitespace controls, ellipsis, or emoji
    Hard {
        /// Whether the character is retained verbatim at a limit emission
        kept: bool,
    },
    /// The FLUSH sentinel
    Flush,
    /// The SPECIAL sentinel
    Special,
}

impl GraphemeClass {
    /// Whether this class ends the current buffer run
    pub fn is_boundary(self) -> bool {
        !matches!(self, GraphemeClass::Literal)
    }
}

/// Outcome of classifying one grapheme with its lookahead rules applied
#[derive(Clone, Debug)]
pub(crate) struct Resolution {
    /// The grapheme to record, possibly rewritten by a collapse rule
    pub grapheme: String,
    /// Resolved class
    pub class: GraphemeClass,
    /// Extra lookahead graphemes consumed by a collapse rule
    pub consumed: usize,
}

/// Classify `grapheme` given the previously processed grapheme and up to
/// two graphemes of lookahead.
///
/// Unconsumed lookahead is left for the caller to process next; only the
/// paired `**` and `...` collapses consume beyond the current grapheme.
pub(crate) fn resolve(
    grapheme: &str,
    previous: Option<&str>,
    next: Option<&str>,
    after_next: Option<&str>,
) -> Resolution {
    // Paired "**" is a flush boundary and the markers are never spoken. A
    // lone "*" stays literal.
    if grapheme == "*" && next == Some("*") {
        return Resolution {
            grapheme: FLUSH.to_string(),
            class: GraphemeClass::Flush,
            consumed: 1,
        };
    }

    if (grapheme == "." || grapheme == ",") && previous.is_some_and(is_digit) {
        // Decimal protection: "3.14" and "1,5" stay intact.
        if next.is_some_and(is_digit) {
            return Resolution {
                grapheme: grapheme.to_owned(),
                class: GraphemeClass::Literal,
                consumed: 0,
            };
        }
    } else if grapheme == "." && next == Some(".") && after_next == Some(".") {
        // "..." collapses into a single hard ellipsis.
        return Resolution {
            grapheme: "…".to_owned(),
            class: GraphemeClass::Hard { kept: false },
            consumed: 2,
        };
    }

    Resolution {
        grapheme: grapheme.to_owned(),
        class: classify(grapheme),
        consumed: 0,
    }
}

/// Classify one grapheme against the static punctuation tables
pub fn classify(grapheme: &str) -> GraphemeClass {
    let mut chars = grapheme.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c == FLUSH {
            return GraphemeClass::Flush;
        }
        if c == SPECIAL {
            return GraphemeClass::Special;
        }
        if is_kept_char(c) {
            return GraphemeClass::Hard { kept: true };
        }
        if is_hard_char(c) {
            return GraphemeClass::Hard { kept: false };
        }
        if is_soft_char(c) {
            return GraphemeClass::Soft;
        }
    }
    // Multi-code-point clusters are mostly emoji; those force a boundary so
    // the synthesized speech can split around them.
    if is_extended_pictographic(grapheme) {
        return GraphemeClass::Hard { kept: false };
    }
    GraphemeClass::Literal
}

/// Hard punctuation whose character survives in the emitted text
fn is_kept_char(c: char) -> bool {
    matches!(c, '?' | '？' | '!' | '！')
}

/// Terminal punctuation and whitespace controls
fn is_hard_char(c: char) -> bool {
    matches!(
        c,
        '.' | '。' | '?' | '？' | '!' | '！' | '…' | '⋯' | '～' | '~' | '\n' | '\t' | '\r'
    )
}

/// Pause punctuation: commas, colons, semicolons, quotation brackets, dashes
fn is_soft_char(c: char) -> bool {
    matches!(
        c,
        ',' | '，' | '、' | '–' | '—' | ':' | '：' | ';' | '；' | '《' | '》' | '「' | '」'
    )
}

fn is_digit(grapheme: &str) -> bool {
    !grapheme.is_empty() && grapheme.chars().all(|c| c.is_ascii_digit())
}

fn is_extended_pictographic(grapheme: &str) -> bool {
    static EXTENDED_PICTOGRAPHIC: OnceLock<Regex> = OnceLock::new();
    EXTENDED_PICTOGRAPHIC
        .get_or_init(|| {
            Regex::new(r"\p{Extended_Pictographic}").expect("valid unicode property pattern")
        })
        .is_match(grapheme)
}
