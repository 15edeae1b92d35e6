/// Left-to-right mark; its presence signals a right-to-left (e.g. Hebrew) title.
pub const LRM: char = '\u{200E}';
/// Right-to-left mark.
pub const RLM: char = '\u{200F}';

/// Strip season/episode qualifiers from an exported title.
///
/// English titles read `"Show: Season 1: Episode 2"` and keep the first
/// colon-separated segment. Right-to-left titles are exported in visual order
/// with `LRM RLM` separators and the show name last, so the separators become
/// colons and the last segment is kept.
pub fn extract_title(title: &str) -> String {
    if title.contains(LRM) || title.contains(RLM) {
        let separator: String = [LRM, RLM].iter().collect();
        title
            .replace(&separator, ":")
            .rsplit(':')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    } else {
        title.split(':').next().unwrap_or_default().trim().to_string()
    }
}
