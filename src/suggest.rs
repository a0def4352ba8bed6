//! Heuristic question suggestions derived from page titles.
//!
//! Titles are matched against a fixed keyword table; every matched topic
//! expands into a fixed set of templated QA questions. The tables are static
//! data, so swapping vocabularies never touches the orchestration.

use std::collections::HashSet;

/// Maximum number of suggestions surfaced to the user.
pub const MAX_SUGGESTIONS: usize = 10;

/// Minimum suggestion count; generic fallbacks fill up to this.
const MIN_SUGGESTIONS: usize = 5;

/// Subject clusters recognized in page titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Proctor experiment testing.
    ProctorTest,
    /// Experiment bucket allocation.
    TestBucket,
    /// A/B test design and rollout.
    AbTesting,
    /// Google Tag Manager rollout work.
    GtmImplementation,
    /// Data layer wiring for tag management.
    DataLayer,
    /// Analytics event tracking.
    EventTracking,
    /// Overall QA strategy.
    QaStrategy,
    /// Test case authoring.
    TestCases,
    /// Test automation.
    Automation,
}

impl Topic {
    /// Human-readable name substituted into the question templates.
    pub fn name(self) -> &'static str {
        match self {
            Self::ProctorTest => "Proctor Test",
            Self::TestBucket => "Test Bucket",
            Self::AbTesting => "A/B Testing",
            Self::GtmImplementation => "GTM Implementation",
            Self::DataLayer => "Data Layer",
            Self::EventTracking => "Event Tracking",
            Self::QaStrategy => "QA Strategy",
            Self::TestCases => "Test Cases",
            Self::Automation => "Automation",
        }
    }
}

const PROCTOR_TOPICS: [Topic; 3] = [Topic::ProctorTest, Topic::TestBucket, Topic::AbTesting];
const GTM_TOPICS: [Topic; 3] = [
    Topic::GtmImplementation,
    Topic::DataLayer,
    Topic::EventTracking,
];
const QA_TOPICS: [Topic; 3] = [Topic::QaStrategy, Topic::TestCases, Topic::Automation];

/// Generic questions used when titles yield too few topic matches.
const FALLBACK_QUESTIONS: [&str; 10] = [
    "Create a comprehensive QA testing strategy",
    "What are the key testing phases and their objectives?",
    "How to create effective test cases and test plans",
    "Best practices for test automation",
    "How to implement continuous testing",
    "Common QA challenges and solutions",
    "How to measure QA effectiveness",
    "Best practices for test documentation",
    "What metrics should QA track?",
    "How to improve QA processes",
];

/// Topics detected in a single title, in keyword-group order.
///
/// Matching is case-insensitive substring containment; a title may hit
/// several groups and contributes every matched group in full.
pub fn detect_topics(title: &str) -> Vec<Topic> {
    let lower = title.to_lowercase();
    let mut topics = Vec::new();
    if lower.contains("proctor") {
        topics.extend(PROCTOR_TOPICS);
    }
    if lower.contains("gtm") || lower.contains("tag manager") {
        topics.extend(GTM_TOPICS);
    }
    if lower.contains("qa") || lower.contains("testing") {
        topics.extend(QA_TOPICS);
    }
    topics
}

/// The ten templated questions generated for a matched topic.
fn questions_for(topic: Topic) -> Vec<String> {
    let name = topic.name();
    vec![
        format!("Create a QA testing strategy for {name}"),
        format!("What are the key validation points for {name} testing?"),
        format!("How to create effective test cases for {name}?"),
        format!("Best practices for testing {name}"),
        format!("Common QA challenges in {name} implementation"),
        format!("How to track and report {name} test results"),
        format!("What metrics should QA track for {name} testing?"),
        format!("Best practices for {name} test documentation"),
        format!("How to create a {name} regression test suite"),
        format!("Common issues and troubleshooting for {name} testing"),
    ]
}

/// Build up to [`MAX_SUGGESTIONS`] deduplicated questions for the titles.
///
/// Questions are produced title by title, topic by topic, deduplicated
/// keeping the first occurrence, and capped. When fewer than five survive,
/// entries from the generic fallback list top the result up to five.
pub fn suggest_questions(titles: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();

    for title in titles {
        for topic in detect_topics(title) {
            for question in questions_for(topic) {
                if seen.insert(question.clone()) {
                    suggestions.push(question);
                }
            }
        }
    }
    suggestions.truncate(MAX_SUGGESTIONS);

    if suggestions.len() < MIN_SUGGESTIONS {
        let shortfall = MIN_SUGGESTIONS - suggestions.len();
        suggestions.extend(
            FALLBACK_QUESTIONS
                .iter()
                .take(shortfall)
                .map(|question| (*question).to_string()),
        );
    }

    suggestions
}
