//! Query analysis: topic category, complexity, urgency and child age.
//!
//! Each signal is computed independently from the message text. Topic
//! categories are checked in a fixed order and the first match wins.

use crate::normalizer::{normalize, word_count};
use advisor_core::{Complexity, QueryAnalysis, QueryType, Urgency};
use lazy_static::lazy_static;
use regex::Regex;

/// Ordered topic keyword table; earlier rows win ties
const QUERY_TYPE_KEYWORDS: &[(QueryType, &[&str])] = &[
    (QueryType::Behavioral, &["behavior", "discipline", "tantrum"]),
    (QueryType::Developmental, &["development", "milestone", "growth"]),
    (QueryType::Educational, &["school", "learning", "education"]),
    (QueryType::Routine, &["sleep", "eating", "routine"]),
];

/// Word count above which a message is `High` complexity
const HIGH_COMPLEXITY_WORDS: usize = 50;
/// Word count above which a message is `Medium` complexity
const MEDIUM_COMPLEXITY_WORDS: usize = 20;

lazy_static! {
    /// Urgent keywords, matched as whole words so "helps" is not "help"
    static ref URGENT: Regex =
        Regex::new(r"\b(emergency|urgent|immediate|crisis|help)\b").unwrap();

    /// Child age patterns, tried in order
    static ref AGE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(\d+)[\s-]*years?[\s-]*old").unwrap(),
        Regex::new(r"(\d+)[\s-]*months?[\s-]*old").unwrap(),
        Regex::new(r"(\d+)\s*yo\b").unwrap(),
        Regex::new(r"\bage\s*(\d+)").unwrap(),
    ];
}

#[derive(Debug, Default, Clone, Copy)]
pub struct QueryAnalyzer;

impl QueryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, message: &str) -> QueryAnalysis {
        QueryAnalysis {
            query_type: self.classify_query_type(message),
            complexity: self.assess_complexity(message),
            urgency: self.assess_urgency(message),
            child_age: self.extract_child_age(message),
        }
    }

    pub fn classify_query_type(&self, message: &str) -> QueryType {
        let lowered = normalize(message);

        QUERY_TYPE_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(query_type, _)| *query_type)
            .unwrap_or(QueryType::General)
    }

    pub fn assess_complexity(&self, message: &str) -> Complexity {
        let words = word_count(message);
        let questions = message.matches('?').count();

        if words > HIGH_COMPLEXITY_WORDS || questions > 1 {
            Complexity::High
        } else if words > MEDIUM_COMPLEXITY_WORDS {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }

    pub fn assess_urgency(&self, message: &str) -> Urgency {
        if URGENT.is_match(&normalize(message)) {
            Urgency::High
        } else {
            Urgency::Normal
        }
    }

    /// Digits of the first age pattern that matches, if any
    pub fn extract_child_age(&self, message: &str) -> Option<String> {
        let lowered = normalize(message);

        AGE_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(&lowered))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}
