use std::sync::OnceLock;

use regex::Regex;

use crate::types::IdRecord;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Gregorian dates as printed on the card: 4-digit year, 3-letter word month,
// 2-digit day. The Ethiopian-calendar date on the same line is all numeric,
// so the word month is the distinguishing signal.
re!(re_date_gc, r"\d{4}/[A-Za-z]{3}/\d{2}");

// Subscriber numbers: +251 followed by three 3-digit groups, with or without
// separating spaces.
re!(re_phone, r"\+251\s?\d{3}\s?\d{3}\s?\d{3}");

// ── Anchor labels ────────────────────────────────────────────────────────────
//
// Labels come out of the recognizer corrupted more often than not, so each
// anchor is an ordered set of known-good and known-garbled variants matched
// by substring containment. Append new variants as garbles show up in the
// field; values are recovered by line offset, never by re-reading the label.

const TITLE_MARKERS: &[&str] = &["Ethiopian Digital ID Card"];
const DOB_LABELS: &[&str] = &["Date of Birtt", "የትውልድ ቀን"];
const SEX_LABELS: &[&str] = &["Sex", "Pt"];
const EXPIRY_LABELS: &[&str] = &["Date of Expiry"];
const NATIONALITY_LABELS: &[&str] = &["Nationality"];
const ADDRESS_LABELS: &[&str] = &["Address"];

fn contains_any(line: &str, labels: &[&str]) -> bool {
    labels.iter().any(|l| line.contains(l))
}

// ── Extractor ────────────────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Recover identity fields from recognized card lines.
    ///
    /// One linear scan with index-based lookahead: an anchor line names a
    /// field, a fixed offset locates its value. Rules are independent (one
    /// line may trigger several), and a repeated anchor overwrites, so the
    /// last occurrence in reading order wins. Never errors: absent anchors
    /// and failed lookaheads simply leave fields `None`.
    pub fn extract(lines: &[String]) -> IdRecord {
        let mut record = IdRecord::default();

        for (i, raw) in lines.iter().enumerate() {
            let line = raw.trim();

            // The two name lines sit directly under the card title.
            if contains_any(line, TITLE_MARKERS) {
                if let Some(next) = lines.get(i + 1) {
                    record.full_name_amharic = Some(next.trim().to_string());
                }
                if let Some(next) = lines.get(i + 2) {
                    record.full_name_english = Some(next.trim().to_string());
                }
            }

            // The birth-date line carries both calendars; the word-month
            // pattern picks out the Gregorian one.
            if contains_any(line, DOB_LABELS) {
                if let Some(next) = lines.get(i + 1) {
                    if let Some(m) = re_date_gc().find(next) {
                        record.dob_gc = Some(m.as_str().to_string());
                    }
                }
            }

            if contains_any(line, SEX_LABELS) {
                if let Some(next) = lines.get(i + 1) {
                    if next.contains("Male") {
                        record.sex = Some("Male".to_string());
                    } else if next.contains("Female") {
                        record.sex = Some("Female".to_string());
                    }
                }
            }

            if contains_any(line, EXPIRY_LABELS) {
                if let Some(next) = lines.get(i + 1) {
                    if let Some(m) = re_date_gc().find(next) {
                        record.expiry_date_gc = Some(m.as_str().to_string());
                    }
                }
            }

            // The +251 prefix is its own marker, so phone needs no anchor.
            if let Some(m) = re_phone().find(line) {
                record.phone = Some(m.as_str().to_string());
            }

            if contains_any(line, NATIONALITY_LABELS) {
                if let Some(next) = lines.get(i + 2) {
                    if next.contains("Ethiopian") {
                        record.nationality = Some("Ethiopian".to_string());
                    }
                }
            }

            if contains_any(line, ADDRESS_LABELS) {
                if let Some(next) = lines.get(i + 2) {
                    record.region = Some(next.trim().to_string());
                }
            }

            // The FIN value trails its label on the same line.
            if let Some((_, rest)) = line.split_once("FIN") {
                record.fin = Some(rest.replace(',', "").trim().to_string());
            }
        }

        record
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    // ── Names ────────────────────────────────────────────────────────────────

    #[test]
    fn names_follow_the_card_title() {
        let l = lines(&["Ethiopian Digital ID Card", "አበበ ቢቂላ", "Abebe Bikila"]);
        let r = Extractor::extract(&l);
        assert_eq!(r.full_name_amharic.as_deref(), Some("አበበ ቢቂላ"));
        assert_eq!(r.full_name_english.as_deref(), Some("Abebe Bikila"));
    }

    #[test]
    fn name_lines_are_trimmed() {
        let l = lines(&["Ethiopian Digital ID Card", "  አበበ ቢቂላ  ", "  Abebe Bikila "]);
        let r = Extractor::extract(&l);
        assert_eq!(r.full_name_amharic.as_deref(), Some("አበበ ቢቂላ"));
        assert_eq!(r.full_name_english.as_deref(), Some("Abebe Bikila"));
    }

    #[test]
    fn title_on_last_line_leaves_names_absent() {
        let l = lines(&["noise", "Ethiopian Digital ID Card"]);
        let r = Extractor::extract(&l);
        assert_eq!(r.full_name_amharic, None);
        assert_eq!(r.full_name_english, None);
    }

    #[test]
    fn title_on_second_to_last_line_captures_only_first_name() {
        let l = lines(&["Ethiopian Digital ID Card", "አበበ ቢቂላ"]);
        let r = Extractor::extract(&l);
        assert_eq!(r.full_name_amharic.as_deref(), Some("አበበ ቢቂላ"));
        assert_eq!(r.full_name_english, None);
    }

    // ── Dates ────────────────────────────────────────────────────────────────

    #[test]
    fn dob_takes_first_word_month_date() {
        let l = lines(&["Date of Birtt", "25/01/1995 | 2002/Oct/05"]);
        assert_eq!(
            Extractor::extract(&l).dob_gc.as_deref(),
            Some("2002/Oct/05")
        );
    }

    #[test]
    fn dob_anchor_matches_native_script_label() {
        let l = lines(&["የትውልድ ቀን", "2002/Oct/05"]);
        assert_eq!(
            Extractor::extract(&l).dob_gc.as_deref(),
            Some("2002/Oct/05")
        );
    }

    #[test]
    fn expiry_date_extracted_from_next_line() {
        let l = lines(&["Date of Expiry", "2024/03/15 | 2032/Mar/14"]);
        assert_eq!(
            Extractor::extract(&l).expiry_date_gc.as_deref(),
            Some("2032/Mar/14")
        );
    }

    #[test]
    fn numeric_only_date_line_leaves_field_absent() {
        let l = lines(&["Date of Birtt", "25/01/1995"]);
        assert_eq!(Extractor::extract(&l).dob_gc, None);
    }

    // ── Sex ──────────────────────────────────────────────────────────────────

    #[test]
    fn sex_male_from_next_line() {
        let l = lines(&["Sex", "Male"]);
        assert_eq!(Extractor::extract(&l).sex.as_deref(), Some("Male"));
    }

    #[test]
    fn sex_female_not_mistaken_for_male() {
        let l = lines(&["Sex", "Female"]);
        assert_eq!(Extractor::extract(&l).sex.as_deref(), Some("Female"));
    }

    #[test]
    fn garbled_sex_label_still_anchors() {
        let l = lines(&["Pt", "Male"]);
        assert_eq!(Extractor::extract(&l).sex.as_deref(), Some("Male"));
    }

    #[test]
    fn unrecognized_sex_value_leaves_field_absent() {
        let l = lines(&["Sex", "??"]);
        assert_eq!(Extractor::extract(&l).sex, None);
    }

    // ── Phone ────────────────────────────────────────────────────────────────

    #[test]
    fn phone_extracted_from_noisy_line() {
        let l = lines(&["Tel: +251 911 234 567 (mobile)"]);
        assert_eq!(
            Extractor::extract(&l).phone.as_deref(),
            Some("+251 911 234 567")
        );
    }

    #[test]
    fn phone_without_spaces_matches() {
        let l = lines(&["+251911234567"]);
        assert_eq!(
            Extractor::extract(&l).phone.as_deref(),
            Some("+251911234567")
        );
    }

    // ── Nationality / region ─────────────────────────────────────────────────

    #[test]
    fn nationality_found_two_lines_down() {
        let l = lines(&["Nationality", "ኢትዮጵያዊ", "Ethiopian"]);
        assert_eq!(
            Extractor::extract(&l).nationality.as_deref(),
            Some("Ethiopian")
        );
    }

    #[test]
    fn unexpected_nationality_value_leaves_field_absent() {
        let l = lines(&["Nationality", "x", "Kenyan"]);
        assert_eq!(Extractor::extract(&l).nationality, None);
    }

    #[test]
    fn region_taken_verbatim_two_lines_below_address() {
        let l = lines(&["Address", "ኦሮሚያ", "  Oromia  "]);
        assert_eq!(Extractor::extract(&l).region.as_deref(), Some("Oromia"));
    }

    // ── FIN ──────────────────────────────────────────────────────────────────

    #[test]
    fn fin_strips_label_and_surrounding_noise() {
        let l = lines(&["sett | FIN1234-1234-314-13411"]);
        assert_eq!(
            Extractor::extract(&l).fin.as_deref(),
            Some("1234-1234-314-13411")
        );
    }

    #[test]
    fn fin_commas_are_removed() {
        let l = lines(&["FIN 6034-9271,480-08231"]);
        assert_eq!(
            Extractor::extract(&l).fin.as_deref(),
            Some("6034-9271480-08231")
        );
    }

    // ── Degenerate input ─────────────────────────────────────────────────────

    #[test]
    fn empty_sequence_yields_all_absent() {
        assert_eq!(Extractor::extract(&[]), IdRecord::default());
    }

    #[test]
    fn unrelated_lines_leave_every_field_absent() {
        let l = lines(&["lorem", "ipsum", "dolor sit amet"]);
        let r = Extractor::extract(&l);
        assert!(r.is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let l = lines(&["Date of Birtt", "2002/Oct/05", "Tel: +251 911 234 567"]);
        assert_eq!(Extractor::extract(&l), Extractor::extract(&l));
    }

    // ── Repeated anchors ─────────────────────────────────────────────────────

    #[test]
    fn repeated_anchor_last_occurrence_wins() {
        let l = lines(&[
            "Date of Birtt",
            "1990/Jan/01",
            "Date of Birtt",
            "1991/Feb/02",
        ]);
        assert_eq!(Extractor::extract(&l).dob_gc.as_deref(), Some("1991/Feb/02"));
    }

    #[test]
    fn later_anchor_without_value_keeps_earlier_value() {
        let l = lines(&[
            "Date of Birtt",
            "2002/Oct/05",
            "Date of Birtt",
            "no dates here",
        ]);
        assert_eq!(Extractor::extract(&l).dob_gc.as_deref(), Some("2002/Oct/05"));
    }

    // ── Whole card ───────────────────────────────────────────────────────────

    #[test]
    fn full_card_scan_populates_all_nine_fields() {
        let l = lines(&[
            "Ethiopian Digital ID Card",
            "አበበ ቢቂላ",
            "Abebe Bikila",
            "የትውልድ ቀን | Date of Birtt",
            "25/01/1995 | 2002/Oct/05",
            "Sex",
            "Male",
            "Nationality",
            "ኢትዮጵያዊ",
            "Ethiopian",
            "Address",
            "ኦሮሚያ",
            "Oromia",
            "Tel: +251 911 234 567",
            "Date of Expiry",
            "2024/03/15 | 2032/Mar/14",
            "sett | FIN1234-1234-314-13411",
        ]);
        let r = Extractor::extract(&l);
        assert_eq!(r.populated_len(), 9);
        assert_eq!(r.full_name_amharic.as_deref(), Some("አበበ ቢቂላ"));
        assert_eq!(r.full_name_english.as_deref(), Some("Abebe Bikila"));
        assert_eq!(r.dob_gc.as_deref(), Some("2002/Oct/05"));
        assert_eq!(r.sex.as_deref(), Some("Male"));
        assert_eq!(r.expiry_date_gc.as_deref(), Some("2032/Mar/14"));
        assert_eq!(r.phone.as_deref(), Some("+251 911 234 567"));
        assert_eq!(r.nationality.as_deref(), Some("Ethiopian"));
        assert_eq!(r.region.as_deref(), Some("Oromia"));
        assert_eq!(r.fin.as_deref(), Some("1234-1234-314-13411"));
    }
}
