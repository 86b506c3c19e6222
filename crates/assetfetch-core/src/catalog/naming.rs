//! Deterministic file names: `page_section_keyword_NN.ext`.

use crate::media::MediaKind;

/// Longest file name component accepted by Linux filesystems.
const NAME_MAX: usize = 255;

/// Lower-cased path component: separators, whitespace, dashes and control
/// characters become `_`, runs of `_` collapse, leading/trailing `_`, `.` and spaces are trimmed.
pub fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_underscore = false;

    for c in raw.chars() {
        let c = if c == '\0' || c == '/' || c == '\\' || c == '-' || c.is_whitespace() || c.is_control()
        {
            '_'
        } else {
            c
        };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.extend(c.to_lowercase());
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');
    truncate_to_boundary(trimmed, NAME_MAX).to_string()
}

fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut take = max;
    while take > 0 && !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}

/// `{page}_{section}_{keyword}_{NN}.{ext}` with every part slugged; `sequence` is 1-based.
pub fn asset_filename(page: &str, section: &str, keyword: &str, sequence: u32, kind: MediaKind) -> String {
    let suffix = format!("_{:02}.{}", sequence, kind.default_extension());
    let stem = [slug(page), slug(section), slug(keyword)]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let stem = truncate_to_boundary(&stem, NAME_MAX - suffix.len());
    format!("{stem}{suffix}")
}

/// Capitalize the first letter of every word, lower-case the rest.
pub fn title_case(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Default title of the `sequence`-th asset for `keyword`, e.g. `Modern Office 2`.
pub fn default_title(keyword: &str, sequence: u32) -> String {
    format!("{} {}", title_case(keyword), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_layout() {
        assert_eq!(
            asset_filename("about-us", "team/leads", "Modern Office", 3, MediaKind::Image),
            "about_us_team_leads_modern_office_03.jpg"
        );
        assert_eq!(
            asset_filename("home", "hero", "city skyline", 12, MediaKind::Video),
            "home_hero_city_skyline_12.mp4"
        );
    }

    #[test]
    fn slug_collapses_and_trims() {
        assert_eq!(slug("  ..Web -- Design..  "), "web_design");
        assert_eq!(slug("a\x00b\\c"), "a_b_c");
        assert_eq!(slug("___"), "");
    }

    #[test]
    fn long_names_fit_name_max() {
        let keyword = "k".repeat(400);
        let name = asset_filename("p", "s", &keyword, 1, MediaKind::Image);
        assert!(name.len() <= 255);
        assert!(name.ends_with("_01.jpg"));
    }

    #[test]
    fn titles() {
        assert_eq!(title_case("modern office"), "Modern Office");
        assert_eq!(title_case("about-us_TEAM"), "About Us Team");
        assert_eq!(default_title("city skyline", 2), "City Skyline 2");
    }
}
