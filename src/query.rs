//! Search query composition

/// Join color and category into a marketplace query
///
/// Blank operands are dropped; the color comes first. Two blank operands
/// produce an empty query.
pub fn compose(color_name: &str, category: &str) -> String {
    [color_name, category]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
