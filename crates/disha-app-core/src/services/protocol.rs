//! Keyword-triggered guidance ("protocols") injected into the system prompt.
//!
//! A cheap stand-in for retrieval: each entry fires when its keyword occurs
//! anywhere in the lower-cased message, including inside longer words.

/// A static keyword → advisory text pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidanceEntry {
    pub keyword: &'static str,
    pub text: &'static str,
}

const FEVER: &str = "PROTOCOL: FEVER/HIGH TEMPERATURE\n\
- Ask: How long? Exact temperature? Any chills or shivering?\n\
- Advise: Hydration, rest, light clothing.\n\
- Warning: If temp > 103F or lasts > 3 days, advise easy doctor consult.";

const HEADACHE: &str = "PROTOCOL: HEADACHE\n\
- Ask: Location (front/back)? Intensity (1-10)? Sensitivity to light?\n\
- Advise: Rest in dark room, hydration, less screen time.\n\
- Warning: If sudden severe pain or vision changes, advise immediate help.";

const STOMACH: &str = "PROTOCOL: STOMACH PAIN/ISSUES\n\
- Ask: Sharp or dull? When did it start? Any food triggers?\n\
- Advise: Light bland food, hydration (ORS if loose motion).\n\
- Warning: If severe pain or blood in stool, see doctor.";

const COLD: &str = "PROTOCOL: COLD/COUGH\n\
- Ask: Dry or wet cough? Sore throat? Runny nose?\n\
- Advise: Warm water gargle, steam inhalation, honey+ginger.\n\
- Warning: If breathing difficulty, advise doctor immediately.";

const REFUND: &str = "PROTOCOL: REFUND POLICY\n\
- Standard: Refunds only processed within 7 days of purchase if service not used.\n\
- Contact: Email support@cure.link for processing.";

/// All entries, in the order their texts are emitted.
pub const PROTOCOLS: &[GuidanceEntry] = &[
    GuidanceEntry { keyword: "fever", text: FEVER },
    GuidanceEntry { keyword: "headache", text: HEADACHE },
    GuidanceEntry { keyword: "stomach", text: STOMACH },
    GuidanceEntry { keyword: "cold", text: COLD },
    GuidanceEntry { keyword: "refund", text: REFUND },
];

/// Guidance for `message`, entries separated by a blank line.
///
/// Returns an empty string when nothing matches. Synonym hits are appended
/// after the literal keyword hits, each gated on its literal keyword being
/// absent so an entry is never emitted twice.
pub fn relevant_protocols(message: &str) -> String {
    let message = message.to_lowercase();

    let mut matched: Vec<&'static str> = PROTOCOLS
        .iter()
        .filter(|entry| message.contains(entry.keyword))
        .map(|entry| entry.text)
        .collect();

    if message.contains("temperature") && !message.contains("fever") {
        matched.push(FEVER);
    }

    if (message.contains("belly") || message.contains("abdomen")) && !message.contains("stomach") {
        matched.push(STOMACH);
    }

    matched.join("\n\n")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn multiple_keywords_follow_declaration_order() {
        let block = relevant_protocols("I have a bad headache and fever");
        assert_eq!(block, format!("{FEVER}\n\n{HEADACHE}"));
    }

    #[test]
    fn belly_is_a_stomach_synonym() {
        assert_eq!(relevant_protocols("my belly hurts"), STOMACH);
        assert_eq!(relevant_protocols("Pain in my ABDOMEN"), STOMACH);
    }

    #[test]
    fn synonym_does_not_duplicate_literal_hit() {
        let block = relevant_protocols("stomach ache, belly feels tight");
        assert_eq!(block, STOMACH);

        let block = relevant_protocols("fever with high temperature");
        assert_eq!(block, FEVER);
    }

    #[test]
    fn temperature_alone_triggers_fever() {
        assert_eq!(relevant_protocols("my temperature is 101"), FEVER);
    }

    #[test]
    fn synonyms_come_after_literal_matches() {
        let block = relevant_protocols("cold and high temperature");
        assert_eq!(block, format!("{COLD}\n\n{FEVER}"));
    }

    #[test]
    fn matching_is_substring_and_case_insensitive() {
        // "cold" inside "scolded" still fires.
        assert_eq!(relevant_protocols("I got SCOLDED"), COLD);
        assert_eq!(relevant_protocols("REFUND please"), REFUND);
    }

    #[test]
    fn no_match_is_empty() {
        assert_eq!(relevant_protocols("hello"), "");
        assert_eq!(relevant_protocols(""), "");
    }

    #[test]
    fn entry_texts_are_multiline_blocks() {
        for entry in PROTOCOLS {
            assert!(entry.text.starts_with("PROTOCOL: "), "{}", entry.keyword);
            assert!(entry.text.lines().skip(1).all(|l| l.starts_with("- ")));
        }
    }
}
