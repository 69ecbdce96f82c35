//! Form-style edits on the working document.
//!
//! List entries are identified by position. Drafts carry what the form
//! inputs hold (bullets as a textarea, tech as comma separated text) and are
//! validated and cleaned before they become entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::cv::dates::normalize_date;
use crate::cv::model::{
    strip_bullet_marker, CvDocument, EducationEntry, ExperienceEntry, LanguageEntry,
    ProjectEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Experience,
    Education,
    Projects,
    Languages,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Projects => "projects",
            Section::Languages => "languages",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{section} entry requires a non-empty '{field}'")]
    MissingField {
        section: Section,
        field: &'static str,
    },

    #[error("{section} entry {index} does not exist ({len} entries)")]
    IndexOutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },

    #[error("Malformed {section} entry: {message}")]
    Malformed { section: Section, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceDraft {
    pub role: String,
    pub company: String,
    pub start: Option<String>,
    pub end: Option<String>,
    /// One bullet per line.
    pub bullets: String,
    /// Comma separated.
    pub tech: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationDraft {
    pub school: String,
    pub program: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDraft {
    pub name: String,
    pub url: Option<String>,
    pub bullets: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageDraft {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionDraft {
    Experience(ExperienceDraft),
    Education(EducationDraft),
    Project(ProjectDraft),
    Language(LanguageDraft),
}

impl SectionDraft {
    /// Reads a draft for `section` from a request body.
    pub fn from_json(section: Section, value: Value) -> Result<Self, EditError> {
        let malformed = |e: serde_json::Error| EditError::Malformed {
            section,
            message: e.to_string(),
        };
        Ok(match section {
            Section::Experience => Self::Experience(serde_json::from_value(value).map_err(malformed)?),
            Section::Education => Self::Education(serde_json::from_value(value).map_err(malformed)?),
            Section::Projects => Self::Project(serde_json::from_value(value).map_err(malformed)?),
            Section::Languages => Self::Language(serde_json::from_value(value).map_err(malformed)?),
        })
    }

    pub fn section(&self) -> Section {
        match self {
            Self::Experience(_) => Section::Experience,
            Self::Education(_) => Section::Education,
            Self::Project(_) => Section::Projects,
            Self::Language(_) => Section::Languages,
        }
    }
}

impl ExperienceDraft {
    fn into_entry(self) -> Result<ExperienceEntry, EditError> {
        Ok(ExperienceEntry {
            role: required(Section::Experience, "role", &self.role)?,
            company: required(Section::Experience, "company", &self.company)?,
            start: normalize_date(self.start.as_deref()),
            end: normalize_date(self.end.as_deref()),
            bullets: bullets_from_text(&self.bullets),
            tech: split_csv(&self.tech),
        })
    }
}

impl From<&ExperienceEntry> for ExperienceDraft {
    fn from(e: &ExperienceEntry) -> Self {
        Self {
            role: e.role.clone(),
            company: e.company.clone(),
            start: e.start.clone(),
            end: e.end.clone(),
            bullets: bullets_to_text(&e.bullets),
            tech: e.tech.join(", "),
        }
    }
}

impl EducationDraft {
    fn into_entry(self) -> Result<EducationEntry, EditError> {
        Ok(EducationEntry {
            school: required(Section::Education, "school", &self.school)?,
            program: required(Section::Education, "program", &self.program)?,
            start: normalize_date(self.start.as_deref()),
            end: normalize_date(self.end.as_deref()),
        })
    }
}

impl From<&EducationEntry> for EducationDraft {
    fn from(e: &EducationEntry) -> Self {
        Self {
            school: e.school.clone(),
            program: e.program.clone(),
            start: e.start.clone(),
            end: e.end.clone(),
        }
    }
}

impl ProjectDraft {
    fn into_entry(self) -> Result<ProjectEntry, EditError> {
        Ok(ProjectEntry {
            name: required(Section::Projects, "name", &self.name)?,
            url: self
                .url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            bullets: bullets_from_text(&self.bullets),
        })
    }
}

impl From<&ProjectEntry> for ProjectDraft {
    fn from(p: &ProjectEntry) -> Self {
        Self {
            name: p.name.clone(),
            url: p.url.clone(),
            bullets: bullets_to_text(&p.bullets),
        }
    }
}

impl LanguageDraft {
    fn into_entry(self) -> Result<LanguageEntry, EditError> {
        Ok(LanguageEntry {
            name: required(Section::Languages, "name", &self.name)?,
            level: self.level.trim().to_string(),
        })
    }
}

impl From<&LanguageEntry> for LanguageDraft {
    fn from(l: &LanguageEntry) -> Self {
        Self {
            name: l.name.clone(),
            level: l.level.clone(),
        }
    }
}

/// Direct edits of the header fields. Unlike a merge, these can clear a field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicsPatch {
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
}

/// The contact inputs; `links` is comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactsForm {
    pub email: String,
    pub phone: String,
    pub location: String,
    pub links: String,
}

pub fn apply_basics(doc: &mut CvDocument, patch: BasicsPatch) {
    if let Some(v) = patch.full_name {
        doc.full_name = v;
    }
    if let Some(v) = patch.title {
        doc.title = v;
    }
    if let Some(v) = patch.summary {
        doc.summary = v;
    }
}

pub fn set_contacts(doc: &mut CvDocument, form: ContactsForm) {
    doc.contacts.email = form.email.trim().to_string();
    doc.contacts.phone = form.phone.trim().to_string();
    doc.contacts.location = form.location.trim().to_string();
    doc.contacts.links = split_csv(&form.links);
}

pub fn set_skills(doc: &mut CvDocument, csv: &str) {
    doc.skills = split_csv(csv);
}

pub fn add_entry(doc: &mut CvDocument, draft: SectionDraft) -> Result<(), EditError> {
    match draft {
        SectionDraft::Experience(d) => doc.experience.push(d.into_entry()?),
        SectionDraft::Education(d) => doc.education.push(d.into_entry()?),
        SectionDraft::Project(d) => doc.projects.push(d.into_entry()?),
        SectionDraft::Language(d) => doc.languages.push(d.into_entry()?),
    }
    Ok(())
}

pub fn update_entry(
    doc: &mut CvDocument,
    index: usize,
    draft: SectionDraft,
) -> Result<(), EditError> {
    let section = draft.section();
    match draft {
        SectionDraft::Experience(d) => replace_at(&mut doc.experience, section, index, d.into_entry()?),
        SectionDraft::Education(d) => replace_at(&mut doc.education, section, index, d.into_entry()?),
        SectionDraft::Project(d) => replace_at(&mut doc.projects, section, index, d.into_entry()?),
        SectionDraft::Language(d) => replace_at(&mut doc.languages, section, index, d.into_entry()?),
    }
}

pub fn remove_entry(doc: &mut CvDocument, section: Section, index: usize) -> Result<(), EditError> {
    match section {
        Section::Experience => remove_at(&mut doc.experience, section, index),
        Section::Education => remove_at(&mut doc.education, section, index),
        Section::Projects => remove_at(&mut doc.projects, section, index),
        Section::Languages => remove_at(&mut doc.languages, section, index),
    }
}

/// The form contents for an existing entry, ready for editing.
pub fn draft_for(doc: &CvDocument, section: Section, index: usize) -> Result<SectionDraft, EditError> {
    let out_of_range = |len| EditError::IndexOutOfRange {
        section,
        index,
        len,
    };
    Ok(match section {
        Section::Experience => SectionDraft::Experience(
            doc.experience.get(index).ok_or_else(|| out_of_range(doc.experience.len()))?.into(),
        ),
        Section::Education => SectionDraft::Education(
            doc.education.get(index).ok_or_else(|| out_of_range(doc.education.len()))?.into(),
        ),
        Section::Projects => SectionDraft::Project(
            doc.projects.get(index).ok_or_else(|| out_of_range(doc.projects.len()))?.into(),
        ),
        Section::Languages => SectionDraft::Language(
            doc.languages.get(index).ok_or_else(|| out_of_range(doc.languages.len()))?.into(),
        ),
    })
}

/// One bullet per non-blank line, list markers stripped.
pub fn bullets_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_bullet_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// The inverse of [`bullets_from_text`]: `- ` prefixed lines.
pub fn bullets_to_text(bullets: &[String]) -> String {
    bullets
        .iter()
        .map(|b| {
            if b.starts_with("- ") {
                b.clone()
            } else {
                format!("- {b}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn split_csv(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn required(section: Section, field: &'static str, value: &str) -> Result<String, EditError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EditError::MissingField { section, field });
    }
    Ok(value.to_string())
}

fn replace_at<T>(list: &mut [T], section: Section, index: usize, item: T) -> Result<(), EditError> {
    let len = list.len();
    let slot = list.get_mut(index).ok_or(EditError::IndexOutOfRange {
        section,
        index,
        len,
    })?;
    *slot = item;
    Ok(())
}

fn remove_at<T>(list: &mut Vec<T>, section: Section, index: usize) -> Result<(), EditError> {
    if index >= list.len() {
        return Err(EditError::IndexOutOfRange {
            section,
            index,
            len: list.len(),
        });
    }
    list.remove(index);
    Ok(())
}
