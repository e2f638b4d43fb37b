/// Points given to an issue that carries no recognised size label. Large on
/// purpose so mis-tagged issues stand out in the totals.
pub const UNSIZED_POINTS: u32 = 500;

fn size_value(label: &str) -> Option<u32> {
    match label {
        "size-s" => Some(1),
        "size-m" => Some(5),
        "size-l" => Some(10),
        _ => None,
    }
}

/// Estimate the points for an issue from its label names. The first size
/// label wins; several size labels are never summed.
pub fn points_for<'a>(labels: impl IntoIterator<Item = &'a str>) -> u32 {
    labels
        .into_iter()
        .find_map(size_value)
        .unwrap_or(UNSIZED_POINTS)
}
