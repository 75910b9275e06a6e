//! Ambient language detection and initial locale selection.

use tracing::debug;

/// Primary language subtag of a BCP 47 / POSIX tag.
///
/// `"en-US"`, `"en_US.UTF-8"` and `"EN"` all yield `"en"`. Returns `None`
/// for empty input.
pub fn primary_subtag(tag: &str) -> Option<String> {
    let primary = tag
        .trim()
        .split(['-', '_', '.', '@'])
        .next()
        .unwrap_or_default();
    if primary.is_empty() {
        None
    } else {
        Some(primary.to_ascii_lowercase())
    }
}

/// The operating system's preferred language, reduced to its primary subtag.
pub fn ambient_language() -> Option<String> {
    let detected = sys_locale::get_locale().and_then(|tag| primary_subtag(&tag));
    debug!("Ambient language: {:?}", detected);
    detected
}

/// Pick the locale an engine starts with.
///
/// Order: the explicit `requested` locale; the ambient language when it is
/// one of the seeded locales; the first seeded locale; the ambient language;
/// finally `baseline`.
pub fn select_initial_locale<'a>(
    requested: Option<&str>,
    seeded: impl IntoIterator<Item = &'a str>,
    ambient: Option<&str>,
    baseline: &str,
) -> String {
    if let Some(requested) = requested.filter(|l| !l.is_empty()) {
        return requested.to_string();
    }

    let seeded: Vec<&str> = seeded.into_iter().collect();
    if let Some(ambient) = ambient.filter(|a| seeded.contains(a)) {
        return ambient.to_string();
    }

    seeded
        .first()
        .copied()
        .or(ambient)
        .unwrap_or(baseline)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("en-US").as_deref(), Some("en"));
        assert_eq!(primary_subtag("sv_SE.UTF-8").as_deref(), Some("sv"));
        assert_eq!(primary_subtag("FR").as_deref(), Some("fr"));
        assert_eq!(primary_subtag("  de  ").as_deref(), Some("de"));
        assert_eq!(primary_subtag(""), None);
        assert_eq!(primary_subtag("-US"), None);
    }

    #[test]
    fn test_requested_locale_wins() {
        let locale = select_initial_locale(Some("fr"), ["en", "de"], Some("de"), "en");
        assert_eq!(locale, "fr");
    }

    #[test]
    fn test_ambient_used_when_seeded() {
        let locale = select_initial_locale(None, ["en", "de"], Some("de"), "en");
        assert_eq!(locale, "de");
    }

    #[test]
    fn test_first_seeded_when_ambient_unknown() {
        let locale = select_initial_locale(None, ["en"], Some("xx"), "en");
        assert_eq!(locale, "en");

        let locale = select_initial_locale(None, ["pt", "en"], None, "en");
        assert_eq!(locale, "pt");
    }

    #[test]
    fn test_empty_seed_falls_back_to_ambient_then_baseline() {
        let locale = select_initial_locale(None, [], Some("ja"), "en");
        assert_eq!(locale, "ja");

        let locale = select_initial_locale(None, [], None, "en");
        assert_eq!(locale, "en");
    }

    #[test]
    fn test_empty_requested_is_ignored() {
        let locale = select_initial_locale(Some(""), ["es"], None, "en");
        assert_eq!(locale, "es");
    }
}
