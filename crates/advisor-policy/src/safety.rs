//! Sensitive-topic screening
//!
//! Messages touching these topics always get a professional referral and
//! high priority, whatever the rest of the plan says.

/// Substring keywords, matched against the lowercased message
pub const SENSITIVE_KEYWORDS: &[&str] = &[
    "abuse",
    "danger",
    "harm",
    "emergency",
    "crisis",
    "suicide",
    "self-harm",
    "violence",
];

/// Every sensitive keyword present in `text`, in table order
pub fn sensitive_topics(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    SENSITIVE_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lowered.contains(k))
        .collect()
}
