//! Composed expense name codec
//!
//! Expense names are a single opaque string whose segments are joined with
//! `" - "`. Decomposition into display facets is purely presentational: the
//! original string is always carried along verbatim.

/// Separator between name facets in a composed expense name.
pub const FACET_SEPARATOR: &str = " - ";

const CATEGORY_PLACEHOLDER: &str = "(category)";
const SUB_CATEGORY_PLACEHOLDER: &str = "(sub-category)";
const PHASE_PLACEHOLDER: &str = "(phase)";
const DETAILS_PLACEHOLDER: &str = "(details)";

/// Display facets decomposed from a composed expense name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFacets {
    pub category: String,
    pub sub_category: String,
    pub phase: String,
    pub details: String,
    /// The full composed name, preserved verbatim.
    pub original: String,
}

/// Join name parts with the facet separator, skipping empty segments.
pub fn compose_name<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|p| p.as_ref().trim().to_string())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(FACET_SEPARATOR)
}

/// Split a composed name into category / sub-category / phase / details.
///
/// The first three segments map to the named facets; everything after them is
/// re-joined as `details`. Missing segments become fixed placeholder labels
/// rather than empty strings.
pub fn decompose_name(name: &str) -> NameFacets {
    let segments: Vec<&str> = name
        .split(FACET_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let facet = |index: usize, placeholder: &str| -> String {
        segments
            .get(index)
            .map(|s| s.to_string())
            .unwrap_or_else(|| placeholder.to_string())
    };

    let details = if segments.len() > 3 {
        segments[3..].join(FACET_SEPARATOR)
    } else {
        DETAILS_PLACEHOLDER.to_string()
    };

    NameFacets {
        category: facet(0, CATEGORY_PLACEHOLDER),
        sub_category: facet(1, SUB_CATEGORY_PLACEHOLDER),
        phase: facet(2, PHASE_PLACEHOLDER),
        details,
        original: name.to_string(),
    }
}
