//! Field Normalizers — stateless string transforms applied by the mapper.

use regex::{Captures, Regex, RegexBuilder};

use crate::normalize::keywords::PipelineConfig;

pub const EMPHASIS_OPEN: &str = "<strong>";
pub const EMPHASIS_CLOSE: &str = "</strong>";
pub const RANGE_SEPARATOR: &str = " – ";
pub const ONGOING: &str = "Present";

const MONTHS: [(&str, &str); 12] = [
    ("jan", "01"),
    ("feb", "02"),
    ("mar", "03"),
    ("apr", "04"),
    ("may", "05"),
    ("jun", "06"),
    ("jul", "07"),
    ("aug", "08"),
    ("sep", "09"),
    ("oct", "10"),
    ("nov", "11"),
    ("dec", "12"),
];

pub struct FieldNormalizer {
    canonical_range: Regex,
    date_token: Regex,
    gpa: Regex,
    metric: Regex,
    ongoing_markers: Vec<String>,
    bullet_glyphs: Vec<char>,
}

impl FieldNormalizer {
    pub fn new(config: &PipelineConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            canonical_range: Regex::new(r"\d{2}/\d{4}\s*–\s*(?:\d{2}/\d{4}|Present)")?,
            // month/year | bare year | month-name year, tried in that order
            date_token: Regex::new(r"(\d{1,2})[-/](\d{4})|(\d{4})|([A-Za-z]+)\.?\s+(\d{4})")?,
            gpa: RegexBuilder::new(r"GPA:?\s*(\d\.\d+(?:/\d\.\d+)?)")
                .case_insensitive(true)
                .build()?,
            metric: RegexBuilder::new(r"\b\d+(?:\.\d+)?(?:\s*(?:%|[KMB]\b)\+?|\+)")
                .case_insensitive(true)
                .build()?,
            ongoing_markers: config
                .ongoing_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            bullet_glyphs: config.cosmetic_bullet_glyphs.clone(),
        })
    }

    /// Canonicalises a date or date range to `MM/YYYY – MM/YYYY` or `MM/YYYY – Present`.
    ///
    /// Already-canonical input is returned as is. An ongoing marker ("present")
    /// replaces the end of the range, or completes a lone start date.
    /// Input with no date-shaped token comes back trimmed.
    pub fn normalize_date(&self, input: &str) -> String {
        let cleaned = input.trim();
        if cleaned.is_empty() || self.canonical_range.is_match(cleaned) {
            return cleaned.to_string();
        }

        let tokens: Vec<String> = self
            .date_token
            .captures_iter(cleaned)
            .map(|caps| format_date_token(&caps))
            .collect();
        let lower = cleaned.to_lowercase();
        let ongoing = self.ongoing_markers.iter().any(|m| lower.contains(m.as_str()));

        match (tokens.as_slice(), ongoing) {
            ([], _) => cleaned.to_string(),
            ([start, ..], true) => format!("{start}{RANGE_SEPARATOR}{ONGOING}"),
            ([single], false) => single.clone(),
            ([start, end, ..], false) => format!("{start}{RANGE_SEPARATOR}{end}"),
        }
    }

    /// `GPA: <value>` from the first GPA mention in `text`, or an empty string.
    pub fn extract_gpa(&self, text: &str) -> String {
        self.gpa
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|value| format!("GPA: {}", value.as_str()))
            .unwrap_or_default()
    }

    /// Wraps numbers carrying a %, K, M, B or + suffix in emphasis markup.
    /// Metrics that are already wrapped are left alone.
    pub fn highlight_metrics(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 32);
        let mut last = 0;

        for m in self.metric.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            let wrapped = text[..m.start()].ends_with(EMPHASIS_OPEN)
                && text[m.end()..].starts_with(EMPHASIS_CLOSE);
            if wrapped {
                out.push_str(m.as_str());
            } else {
                out.push_str(EMPHASIS_OPEN);
                out.push_str(m.as_str());
                out.push_str(EMPHASIS_CLOSE);
            }
            last = m.end();
        }

        out.push_str(&text[last..]);
        out
    }

    /// Drops one leading bullet glyph and the whitespace after it.
    pub fn clean_bullet(&self, text: &str) -> String {
        let text = text.trim();
        let stripped = match text.chars().next() {
            Some(first) if self.bullet_glyphs.contains(&first) => &text[first.len_utf8()..],
            _ => text,
        };
        stripped.trim().to_string()
    }
}

pub fn normalize_company_name(name: &str) -> String {
    name.trim().to_uppercase()
}

fn format_date_token(caps: &Captures<'_>) -> String {
    if let (Some(month), Some(year)) = (caps.get(1), caps.get(2)) {
        return format!("{:0>2}/{}", month.as_str(), year.as_str());
    }
    if let Some(year) = caps.get(3) {
        return format!("01/{}", year.as_str());
    }
    if let (Some(month), Some(year)) = (caps.get(4), caps.get(5)) {
        return format!("{}/{}", month_number(month.as_str()), year.as_str());
    }
    caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default()
}

/// First three letters against the month table; unknown names map to January.
fn month_number(name: &str) -> &'static str {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    MONTHS
        .iter()
        .find(|(abbr, _)| *abbr == prefix)
        .map(|(_, number)| *number)
        .unwrap_or("01")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> FieldNormalizer {
        FieldNormalizer::new(&PipelineConfig::default()).unwrap()
    }

    // ── normalize_date ──────────────────────────────────────────────────────

    #[test]
    fn test_bare_year() {
        assert_eq!(normalizer().normalize_date("2020"), "01/2020");
    }

    #[test]
    fn test_month_name_year() {
        assert_eq!(normalizer().normalize_date("Jan 2022"), "01/2022");
        assert_eq!(normalizer().normalize_date("september 2019"), "09/2019");
        assert_eq!(normalizer().normalize_date("Sept. 2019"), "09/2019");
    }

    #[test]
    fn test_unknown_month_name_defaults_to_january() {
        assert_eq!(normalizer().normalize_date("Spring 2021"), "01/2021");
    }

    #[test]
    fn test_start_with_present() {
        assert_eq!(normalizer().normalize_date("06/2022 - Present"), "06/2022 – Present");
        assert_eq!(normalizer().normalize_date("Mar 2021 – present"), "03/2021 – Present");
        assert_eq!(normalizer().normalize_date("2020 - Present"), "01/2020 – Present");
    }

    #[test]
    fn test_words_containing_current_keep_end_date() {
        let n = normalizer();
        assert_eq!(
            n.normalize_date("2019 - 2021 (concurrent roles)"),
            "01/2019 – 01/2021"
        );
        assert_eq!(
            n.normalize_date("06/2018 - 09/2020, currently consulting"),
            "06/2018 – 09/2020"
        );
    }

    #[test]
    fn test_present_overrides_second_token() {
        assert_eq!(
            normalizer().normalize_date("01/2020 - 05/2023 (present role)"),
            "01/2020 – Present"
        );
    }

    #[test]
    fn test_canonical_range_unchanged() {
        assert_eq!(normalizer().normalize_date("03/2019 – 05/2021"), "03/2019 – 05/2021");
        assert_eq!(normalizer().normalize_date(" 03/2019 – Present "), "03/2019 – Present");
    }

    #[test]
    fn test_two_tokens() {
        let n = normalizer();
        assert_eq!(n.normalize_date("2016 - 2019"), "01/2016 – 01/2019");
        assert_eq!(n.normalize_date("Aug 2018 to May 2022"), "08/2018 – 05/2022");
        assert_eq!(n.normalize_date("3/2017-11/2018"), "03/2017 – 11/2018");
    }

    #[test]
    fn test_no_tokens_returns_trimmed_input() {
        assert_eq!(normalizer().normalize_date("  ongoing  "), "ongoing");
        assert_eq!(normalizer().normalize_date(""), "");
    }

    // ── extract_gpa ─────────────────────────────────────────────────────────

    #[test]
    fn test_extract_gpa() {
        let n = normalizer();
        assert_eq!(n.extract_gpa("B.S. CS, GPA: 3.85"), "GPA: 3.85");
        assert_eq!(n.extract_gpa("gpa 3.9/4.0 with honors"), "GPA: 3.9/4.0");
        assert_eq!(n.extract_gpa("Graduated with honors"), "");
    }

    // ── highlight_metrics ───────────────────────────────────────────────────

    #[test]
    fn test_highlight_percentage_not_plain_number() {
        assert_eq!(
            normalizer().highlight_metrics("Improved by 30% using 5 engineers"),
            "Improved by <strong>30%</strong> using 5 engineers"
        );
    }

    #[test]
    fn test_highlight_suffixes() {
        let n = normalizer();
        assert_eq!(n.highlight_metrics("Served 10K+ users"), "Served <strong>10K+</strong> users");
        assert_eq!(n.highlight_metrics("Raised $1.5M"), "Raised $<strong>1.5M</strong>");
        assert_eq!(n.highlight_metrics("Onboarded 200+ clients"), "Onboarded <strong>200+</strong> clients");
        assert_eq!(n.highlight_metrics("Handled 3b requests"), "Handled <strong>3b</strong> requests");
    }

    #[test]
    fn test_highlight_ignores_words_and_identifiers() {
        let n = normalizer();
        assert_eq!(n.highlight_metrics("Shipped in 5 months"), "Shipped in 5 months");
        assert_eq!(n.highlight_metrics("Sold B2B software"), "Sold B2B software");
        assert_eq!(n.highlight_metrics("Upgraded to v2"), "Upgraded to v2");
    }

    #[test]
    fn test_highlight_is_idempotent() {
        let n = normalizer();
        let once = n.highlight_metrics("Cut costs 25% and grew revenue 2M");
        assert_eq!(n.highlight_metrics(&once), once);
    }

    // ── clean_bullet & company ──────────────────────────────────────────────

    #[test]
    fn test_clean_bullet() {
        let n = normalizer();
        assert_eq!(n.clean_bullet("• Led a team of 5"), "Led a team of 5");
        assert_eq!(n.clean_bullet("◦   Wrote docs "), "Wrote docs");
        assert_eq!(n.clean_bullet("▪Tested"), "Tested");
        assert_eq!(n.clean_bullet("No glyph here"), "No glyph here");
    }

    #[test]
    fn test_clean_bullet_idempotent() {
        let n = normalizer();
        let once = n.clean_bullet("• Led a team of 5");
        assert_eq!(n.clean_bullet(&once), once);
    }

    #[test]
    fn test_normalize_company_name() {
        assert_eq!(normalize_company_name("  Acme Corp "), "ACME CORP");
    }
}
