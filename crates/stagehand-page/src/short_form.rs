//! Stage label abbreviations.

const ABBREVIATIONS: [(&str, &str); 13] = [
    ("Applied", "APL"),
    ("ShortList", "SL"),
    ("Submitted", "SBMT"),
    ("Spoken-to", "ST"),
    ("Chase VI", "CVI"),
    ("Booked", "BKD"),
    ("Interview", "INT"),
    ("Hired", "HRD"),
    ("Rejected", "RJD"),
    ("Rejected by client", "RJC"),
    ("Archived", "ARC"),
    ("AI Database", "AID"),
    ("AI Linkedin", "AIL"),
];

/// Abbreviation for a stage label.
///
/// Known labels use the fixed table. Other labels containing a space become
/// the uppercase initials of each space-separated word. Anything else is its
/// first three characters, uppercased.
pub fn short_form(label: &str) -> String {
    if let Some((_, short)) = ABBREVIATIONS.iter().find(|(known, _)| *known == label) {
        return (*short).to_string();
    }

    if label.contains(' ') {
        label
            .split(' ')
            .filter_map(|word| word.chars().next())
            .collect::<String>()
            .to_uppercase()
    } else {
        label.chars().take(3).collect::<String>().to_uppercase()
    }
}
