//! The normalized CV schema and the optional-field fragment shape that
//! extraction replies and partial edits arrive in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cv::dates::normalize_date;

pub const UNTITLED_CV: &str = "Untitled CV";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvDocument {
    pub full_name: String,
    pub title: String,
    pub summary: String,
    pub contacts: Contacts,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub languages: Vec<LanguageEntry>,
}

/// Contact details. An empty string means the detail is not known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contacts {
    pub email: String,
    pub phone: String,
    pub location: String,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// `None` means the role is ongoing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub bullets: Vec<String>,
    pub tech: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub school: String,
    pub program: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageEntry {
    pub name: String,
    pub level: String,
}

/// Contacts as they arrive in a fragment: a key is either present or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactsFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
}

/// A partially specified document. Only the merge engine interprets the
/// difference between an absent field and an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<ContactsFragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<ExperienceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<EducationEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LanguageEntry>>,
}

impl CvFragment {
    /// Reads whatever recognisable fields a JSON value carries. Wrong-typed
    /// fields are dropped, unknown fields ignored, non-objects read as empty.
    pub fn from_value(value: &Value) -> Self {
        Self {
            full_name: str_field(value, "fullName"),
            title: str_field(value, "title"),
            summary: str_field(value, "summary"),
            contacts: value.get("contacts").filter(|c| c.is_object()).map(|c| {
                ContactsFragment {
                    email: str_field(c, "email"),
                    phone: str_field(c, "phone"),
                    location: str_field(c, "location"),
                    links: str_list(c, "links"),
                }
            }),
            skills: str_list(value, "skills"),
            experience: entry_list(value, "experience", ExperienceEntry::from_value),
            education: entry_list(value, "education", EducationEntry::from_value),
            projects: entry_list(value, "projects", ProjectEntry::from_value),
            languages: entry_list(value, "languages", LanguageEntry::from_value),
        }
    }
}

impl From<CvDocument> for CvFragment {
    fn from(doc: CvDocument) -> Self {
        Self {
            full_name: Some(doc.full_name),
            title: Some(doc.title),
            summary: Some(doc.summary),
            contacts: Some(ContactsFragment {
                email: Some(doc.contacts.email),
                phone: Some(doc.contacts.phone),
                location: Some(doc.contacts.location),
                links: Some(doc.contacts.links),
            }),
            skills: Some(doc.skills),
            experience: Some(doc.experience),
            education: Some(doc.education),
            projects: Some(doc.projects),
            languages: Some(doc.languages),
        }
    }
}

impl ExperienceEntry {
    fn from_value(v: &Value) -> Option<Self> {
        v.is_object().then(|| Self {
            role: str_field(v, "role").unwrap_or_default(),
            company: str_field(v, "company").unwrap_or_default(),
            start: str_field(v, "start"),
            end: str_field(v, "end"),
            bullets: str_list(v, "bullets").unwrap_or_default(),
            tech: str_list(v, "tech").unwrap_or_default(),
        })
    }

    pub(crate) fn normalized(self) -> Self {
        Self {
            start: normalize_date(self.start.as_deref()),
            end: normalize_date(self.end.as_deref()),
            bullets: normalize_bullets(self.bullets),
            ..self
        }
    }
}

impl EducationEntry {
    fn from_value(v: &Value) -> Option<Self> {
        v.is_object().then(|| Self {
            school: str_field(v, "school").unwrap_or_default(),
            program: str_field(v, "program").unwrap_or_default(),
            start: str_field(v, "start"),
            end: str_field(v, "end"),
        })
    }

    pub(crate) fn normalized(self) -> Self {
        Self {
            start: normalize_date(self.start.as_deref()),
            end: normalize_date(self.end.as_deref()),
            ..self
        }
    }
}

impl ProjectEntry {
    fn from_value(v: &Value) -> Option<Self> {
        v.is_object().then(|| Self {
            name: str_field(v, "name").unwrap_or_default(),
            url: str_field(v, "url"),
            bullets: str_list(v, "bullets").unwrap_or_default(),
        })
    }

    pub(crate) fn normalized(self) -> Self {
        Self {
            url: self
                .url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            bullets: normalize_bullets(self.bullets),
            ..self
        }
    }
}

impl LanguageEntry {
    fn from_value(v: &Value) -> Option<Self> {
        v.is_object().then(|| Self {
            name: str_field(v, "name").unwrap_or_default(),
            level: str_field(v, "level").unwrap_or_default(),
        })
    }
}

/// Fills every absent field with its empty equivalent. Total: any fragment,
/// including the empty one, yields a schema-complete document.
pub fn normalize(fragment: CvFragment) -> CvDocument {
    let contacts = fragment.contacts.unwrap_or_default();
    CvDocument {
        full_name: fragment.full_name.unwrap_or_default(),
        title: fragment.title.unwrap_or_default(),
        summary: fragment.summary.unwrap_or_default(),
        contacts: Contacts {
            email: contacts.email.unwrap_or_default(),
            phone: contacts.phone.unwrap_or_default(),
            location: contacts.location.unwrap_or_default(),
            links: contacts.links.unwrap_or_default(),
        },
        skills: fragment.skills.unwrap_or_default(),
        experience: fragment
            .experience
            .unwrap_or_default()
            .into_iter()
            .map(ExperienceEntry::normalized)
            .collect(),
        education: fragment
            .education
            .unwrap_or_default()
            .into_iter()
            .map(EducationEntry::normalized)
            .collect(),
        projects: fragment
            .projects
            .unwrap_or_default()
            .into_iter()
            .map(ProjectEntry::normalized)
            .collect(),
        languages: fragment.languages.unwrap_or_default(),
    }
}

/// `normalize` for untyped input such as a request body or a model reply.
pub fn normalize_value(value: &Value) -> CvDocument {
    normalize(CvFragment::from_value(value))
}

/// Display name for a document: `"Ann – Engineer"`, `"Ann – CV"` or
/// `"Untitled CV"`.
pub fn title_of(doc: &CvDocument) -> String {
    let name = doc.full_name.trim();
    if name.is_empty() {
        return UNTITLED_CV.to_string();
    }
    let title = doc.title.trim();
    let title = if title.is_empty() { "CV" } else { title };
    format!("{name} – {title}")
}

/// Removes a leading `-` or `•` list marker and surrounding whitespace.
pub fn strip_bullet_marker(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix('-')
        .or_else(|| line.strip_prefix('•'))
        .map(str::trim_start)
        .unwrap_or(line)
}

fn normalize_bullets(bullets: Vec<String>) -> Vec<String> {
    bullets
        .iter()
        .map(|b| strip_bullet_marker(b))
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect()
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

fn str_list(v: &Value, key: &str) -> Option<Vec<String>> {
    v.get(key).and_then(Value::as_array).map(|arr| {
        arr.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

fn entry_list<T>(v: &Value, key: &str, read: fn(&Value) -> Option<T>) -> Option<Vec<T>> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(read).collect())
}
