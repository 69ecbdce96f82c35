// Prompt text and response schemas for the CV assistant.
// Schemas follow the camelCase CV document shape.

use serde_json::{json, Value};

pub const EXTRACT_SYSTEM: &str =
    "You are a CV extractor. Output strictly valid JSON conforming to the provided schema.";

pub const IMPROVE_SYSTEM: &str =
    "You are a CV editor. Improve clarity and impact, keep facts. JSON only, same schema as input.";

pub const SEED_SYSTEM: &str = "You write concise CV summaries and extract skills. \
    Return JSON with {summary:string, skills:string[]} only. \
    Summary: 2–3 sentences, specific, ATS-friendly. \
    Skills: 5–12 canonical tech or soft skills from the bio/title.";

pub fn extract_prompt(free_text: &str) -> String {
    format!(
        "Convert the user's free text into the CV schema.\n\
         Rules:\n\
         - JSON only (no prose).\n\
         - 2–5 bullets per role, action + result, ≤ 20 words each.\n\
         - Do not invent dates/employers; omit if unknown.\n\
         - Use ISO dates (YYYY or YYYY-MM) when present.\n\n\
         User text:\n\"\"\"{free_text}\"\"\""
    )
}

pub fn improve_prompt(current_cv: &Value, job_text: &str) -> String {
    format!(
        "Improve the following CV JSON for concision and impact. Keep the same keys/shape.\n\
         Current CV:\n{current_cv}\n\n\
         Job (optional, for tailoring):\n\"\"\"{job_text}\"\"\""
    )
}

pub fn seed_prompt(name: &str, title: &str, bio: &str) -> String {
    format!("Name: {name}\nTitle: {title}\nBio: {}\n", bio.trim())
}

fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

/// Schema for the summary and skills generated from a short bio.
pub fn seed_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            "skills": string_list()
        },
        "required": ["summary", "skills"]
    })
}

/// Schema for a whole CV document.
pub fn cv_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "fullName": { "type": "string" },
            "title": { "type": "string" },
            "summary": { "type": "string" },
            "contacts": {
                "type": "object",
                "properties": {
                    "email": { "type": "string" },
                    "phone": { "type": "string" },
                    "location": { "type": "string" },
                    "links": string_list()
                }
            },
            "skills": string_list(),
            "experience": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "role": { "type": "string" },
                        "company": { "type": "string" },
                        "start": { "type": "string" },
                        "end": { "type": "string" },
                        "bullets": string_list(),
                        "tech": string_list()
                    },
                    "required": ["role", "company", "bullets", "tech"]
                }
            },
            "education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "school": { "type": "string" },
                        "program": { "type": "string" },
                        "start": { "type": "string" },
                        "end": { "type": "string" }
                    },
                    "required": ["school", "program"]
                }
            },
            "projects": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "url": { "type": "string" },
                        "bullets": string_list()
                    },
                    "required": ["name", "bullets"]
                }
            },
            "languages": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "level": { "type": "string" }
                    },
                    "required": ["name", "level"]
                }
            }
        },
        "required": [
            "fullName", "title", "summary", "contacts", "skills",
            "experience", "education", "projects", "languages"
        ]
    })
}
