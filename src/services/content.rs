//! Editable home-page document: an in-code default, normalisation of stored
//! copies against it, and section-scoped replacement.

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};
use std::str::FromStr;
use thiserror::Error;

use crate::database::models::SiteContent;
use crate::database::{ContentStore, StoreResult};

pub const HOME_CONTENT_KEY: &str = "home_page";

/// Top-level sections whose whole subtree an admin may replace
pub const EDITABLE_SECTIONS: [&str; 11] = [
    "hero",
    "programs",
    "comparison",
    "problemSolution",
    "flipSteps",
    "professionals",
    "outcomes",
    "journeys",
    "enquiry",
    "faq",
    "footer",
];

#[derive(Debug, Error, PartialEq)]
pub enum ContentError {
    #[error("Unknown sectionId: {0}")]
    UnknownSection(String),

    #[error("{0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Section {
    /// `appMeta.title` and `appMeta.logoUrl`
    Branding,
    Subtree(&'static str),
}

impl FromStr for Section {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "branding" {
            return Ok(Section::Branding);
        }
        EDITABLE_SECTIONS
            .iter()
            .copied()
            .find(|name| *name == s)
            .map(Section::Subtree)
            .ok_or_else(|| ContentError::UnknownSection(s.to_string()))
    }
}

impl Section {
    pub fn id(&self) -> &'static str {
        match self {
            Section::Branding => "branding",
            Section::Subtree(name) => *name,
        }
    }
}

pub static DEFAULT_HOME_CONTENT: Lazy<Value> = Lazy::new(|| {
    json!({
        "appMeta": { "title": "Tuition Centre", "logoUrl": "" },
        "hero": {
            "kicker": "School & Career Guide Program",
            "title": "Board success, competitive foundation, and future-ready skills.",
            "subtitle": "Syllabus excellence, entrance exam foundation, spoken English and AI awareness from school years.",
            "stats": [
                { "label": "Active learners", "value": "1,500+" },
                { "label": "Expert educators", "value": "60+" },
                { "label": "Parent trust score", "value": "4.8/5" }
            ]
        },
        "programs": [
            {
                "title": "Syllabus-Oriented Learning",
                "description": "Complete curriculum coverage for Classes 7-12 across the major boards."
            },
            {
                "title": "Entrance Exam Foundation",
                "description": "Early concept building for students targeting engineering and medical careers."
            },
            {
                "title": "Spoken English & AI Skills",
                "description": "Communication confidence plus AI literacy for academics and career."
            }
        ],
        "comparison": {
            "traditional": [
                "No prior preparation before class",
                "Live class feels heavy and rushed",
                "Doubts appear later without support"
            ],
            "flipped": [
                "Video learning before live class",
                "Live sessions focused on doubt solving",
                "Recordings and notes for long-term retention"
            ]
        },
        "problemSolution": {
            "problem": [
                "Zero preparation before class topics",
                "Unresolved doubts after class"
            ],
            "solution": [
                "Pre-learning through short video lessons",
                "Real-time doubt clarification in class"
            ]
        },
        "flipSteps": [
            { "step": "01", "title": "Video Learning Before Class", "detail": "Short chapter-wise videos give students context before live sessions." },
            { "step": "02", "title": "Live Q&A Focused Class", "detail": "Live time goes to doubt solving and exam patterns." },
            { "step": "03", "title": "Notes and Practice", "detail": "Smart notes and guided practice help students revise quickly." },
            { "step": "04", "title": "Regular Tests", "detail": "Assessments track improvement and show where mentoring is needed." }
        ],
        "professionals": [],
        "outcomes": [
            "Learn on mobile, tablet, laptop and smart TV.",
            "Visual content, live classes, notes and regular tests."
        ],
        "journeys": [],
        "enquiry": {
            "title": "Talk to a Mentor",
            "subtitle": "We will call you with a personalised guidance plan."
        },
        "faq": [
            {
                "question": "How do parents track progress?",
                "answer": "Parents receive periodic updates through test performance and mentor feedback."
            }
        ],
        "footer": {
            "summary": "Board-aligned, bilingual and future-ready learning for Classes 7-12.",
            "note": ""
        }
    })
});

/// Fills missing top-level sections from the default and merges `appMeta`
/// key by key. Anything that is not an object normalises to the default.
pub fn normalize(content: &Value) -> Value {
    let mut merged = default_object();
    let Some(source) = content.as_object() else {
        return Value::Object(merged);
    };

    for (key, value) in source {
        if key == "appMeta" {
            continue;
        }
        merged.insert(key.clone(), value.clone());
    }

    if let Some(source_meta) = source.get("appMeta").and_then(Value::as_object) {
        if let Some(Value::Object(meta)) = merged.get_mut("appMeta") {
            for (key, value) in source_meta {
                meta.insert(key.clone(), value.clone());
            }
        }
    }

    Value::Object(merged)
}

fn default_object() -> Map<String, Value> {
    DEFAULT_HOME_CONTENT.as_object().cloned().unwrap_or_default()
}

/// Section payloads must be JSON objects or arrays
pub fn validate_payload(section: Section, payload: &Value) -> Result<(), ContentError> {
    if !(payload.is_object() || payload.is_array()) {
        return Err(ContentError::InvalidPayload("Payload must be an object".to_string()));
    }
    if section == Section::Branding {
        let has_title = payload
            .get("title")
            .and_then(Value::as_str)
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);
        if !has_title {
            return Err(ContentError::InvalidPayload("Brand title is required".to_string()));
        }
    }
    Ok(())
}

/// Returns the normalised document with one section replaced
pub fn apply_section(content: &Value, section: Section, payload: Value) -> Result<Value, ContentError> {
    validate_payload(section, &payload)?;
    let mut next = normalize(content);

    match section {
        Section::Branding => {
            let title = payload.get("title").and_then(Value::as_str).unwrap_or_default().trim();
            let logo_url = payload.get("logoUrl").and_then(Value::as_str).unwrap_or_default().trim();
            set_app_meta(&mut next, "title", title);
            set_app_meta(&mut next, "logoUrl", logo_url);
        }
        Section::Subtree(name) => {
            if let Some(doc) = next.as_object_mut() {
                doc.insert(name.to_string(), payload);
            }
        }
    }
    Ok(next)
}

pub fn with_logo(content: &Value, logo_url: &str) -> Value {
    let mut next = normalize(content);
    set_app_meta(&mut next, "logoUrl", logo_url);
    next
}

/// The part of the document a section update touched
pub fn section_view(content: &Value, section: Section) -> Value {
    let key = match section {
        Section::Branding => "appMeta",
        Section::Subtree(name) => name,
    };
    content.get(key).cloned().unwrap_or(Value::Null)
}

/// Stored home document, seeding the default on first read
pub async fn load_home<S: ContentStore + ?Sized>(store: &S) -> StoreResult<SiteContent> {
    match store.load_content(HOME_CONTENT_KEY).await? {
        Some(stored) => Ok(stored),
        None => {
            tracing::info!("Seeding default {} content", HOME_CONTENT_KEY);
            store.seed_content(HOME_CONTENT_KEY, DEFAULT_HOME_CONTENT.clone()).await
        }
    }
}

fn set_app_meta(doc: &mut Value, key: &str, value: &str) {
    if let Some(Value::Object(meta)) = doc.get_mut("appMeta") {
        meta.insert(key.to_string(), Value::String(value.to_string()));
    }
}
