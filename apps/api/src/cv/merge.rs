//! Field merge engine.
//!
//! Combines the working document with an incoming fragment, field by field:
//! - scalars keep a non-empty previous value; an incoming value only fills a
//!   blank, and an empty incoming string counts as absent
//! - contacts are overwritten key by key whenever the key is present
//! - sequences are replaced wholesale when the incoming one is non-empty,
//!   never concatenated
//!
//! Merge cannot clear a scalar. Clearing goes through direct editing.

use crate::cv::model::{
    Contacts, ContactsFragment, CvDocument, CvFragment, EducationEntry,
    ExperienceEntry, ProjectEntry,
};

pub fn merge(prev: &CvDocument, incoming: CvFragment) -> CvDocument {
    // Sequence entries go through the same cleanup `normalize` applies.
    let CvFragment {
        full_name,
        title,
        summary,
        contacts,
        skills,
        experience,
        education,
        projects,
        languages,
    } = incoming;

    CvDocument {
        full_name: merge_scalar(&prev.full_name, full_name),
        title: merge_scalar(&prev.title, title),
        summary: merge_scalar(&prev.summary, summary),
        contacts: merge_contacts(&prev.contacts, contacts),
        skills: replace_if_nonempty(&prev.skills, skills),
        experience: replace_if_nonempty(
            &prev.experience,
            experience.map(|v| v.into_iter().map(ExperienceEntry::normalized).collect()),
        ),
        education: replace_if_nonempty(
            &prev.education,
            education.map(|v| v.into_iter().map(EducationEntry::normalized).collect()),
        ),
        projects: replace_if_nonempty(
            &prev.projects,
            projects.map(|v| v.into_iter().map(ProjectEntry::normalized).collect()),
        ),
        languages: replace_if_nonempty(&prev.languages, languages),
    }
}

fn merge_scalar(prev: &str, incoming: Option<String>) -> String {
    if !prev.is_empty() {
        return prev.to_string();
    }
    incoming
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| prev.to_string())
}

fn merge_contacts(prev: &Contacts, incoming: Option<ContactsFragment>) -> Contacts {
    let Some(incoming) = incoming else {
        return prev.clone();
    };
    Contacts {
        email: incoming.email.unwrap_or_else(|| prev.email.clone()),
        phone: incoming.phone.unwrap_or_else(|| prev.phone.clone()),
        location: incoming.location.unwrap_or_else(|| prev.location.clone()),
        links: incoming.links.unwrap_or_else(|| prev.links.clone()),
    }
}

fn replace_if_nonempty<T: Clone>(prev: &[T], incoming: Option<Vec<T>>) -> Vec<T> {
    match incoming {
        Some(items) if !items.is_empty() => items,
        _ => prev.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::model::{normalize_value, LanguageEntry};
    use serde_json::json;

    fn with_summary(summary: &str) -> CvDocument {
        CvDocument {
            summary: summary.to_string(),
            ..Default::default()
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scalar_keeps_nonempty_prev() {
        let prev = with_summary("A");
        for incoming in [Some("B".to_string()), Some(String::new()), None] {
            let frag = CvFragment {
                summary: incoming,
                ..Default::default()
            };
            assert_eq!(merge(&prev, frag).summary, "A");
        }
    }

    #[test]
    fn test_scalar_fills_empty_prev() {
        let prev = with_summary("");
        let frag = CvFragment {
            summary: Some("B".to_string()),
            ..Default::default()
        };
        assert_eq!(merge(&prev, frag).summary, "B");
        assert_eq!(merge(&prev, CvFragment::default()).summary, "");
    }

    #[test]
    fn test_empty_incoming_scalar_is_absent() {
        let frag = CvFragment {
            full_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(merge(&CvDocument::default(), frag).full_name, "");
    }

    #[test]
    fn test_sequence_kept_when_incoming_empty() {
        let prev = CvDocument {
            skills: strings(&["x"]),
            ..Default::default()
        };
        let frag = CvFragment {
            skills: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(merge(&prev, frag).skills, strings(&["x"]));
        assert_eq!(merge(&prev, CvFragment::default()).skills, strings(&["x"]));
    }

    #[test]
    fn test_sequence_replaced_not_concatenated() {
        let prev = CvDocument {
            skills: strings(&["x"]),
            ..Default::default()
        };
        let frag = CvFragment {
            skills: Some(strings(&["y", "z"])),
            ..Default::default()
        };
        assert_eq!(merge(&prev, frag).skills, strings(&["y", "z"]));
    }

    #[test]
    fn test_entry_sequences_replaced() {
        let prev = normalize_value(&json!({
            "languages": [{ "name": "English", "level": "C2" }],
            "experience": [{ "role": "Dev", "company": "A" }]
        }));
        let frag = CvFragment::from_value(&json!({
            "languages": [{ "name": "Swedish", "level": "B1" }],
            "experience": []
        }));
        let merged = merge(&prev, frag);
        assert_eq!(
            merged.languages,
            vec![LanguageEntry {
                name: "Swedish".to_string(),
                level: "B1".to_string()
            }]
        );
        assert_eq!(merged.experience, prev.experience);
    }

    #[test]
    fn test_contacts_overwrite_by_key() {
        let prev = normalize_value(&json!({
            "contacts": { "email": "a@x.com", "phone": "1" }
        }));
        let frag = CvFragment::from_value(&json!({ "contacts": { "email": "b@x.com" } }));
        let merged = merge(&prev, frag);
        assert_eq!(merged.contacts.email, "b@x.com");
        assert_eq!(merged.contacts.phone, "1");
    }

    #[test]
    fn test_contacts_links_replaced_not_unioned() {
        let prev = normalize_value(&json!({ "contacts": { "links": ["gh/a"] } }));
        let frag = CvFragment::from_value(&json!({ "contacts": { "links": ["li/a"] } }));
        assert_eq!(merge(&prev, frag).contacts.links, strings(&["li/a"]));
    }

    #[test]
    fn test_incoming_entries_cleaned() {
        let frag = CvFragment::from_value(&json!({
            "experience": [{ "role": "Dev", "company": "A", "end": "someday", "bullets": ["- Did"] }]
        }));
        let merged = merge(&CvDocument::default(), frag);
        assert_eq!(merged.experience[0].end, None);
        assert_eq!(merged.experience[0].bullets, strings(&["Did"]));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let empty = CvDocument::default();
        let first = CvFragment::from_value(&json!({ "fullName": "Ann", "skills": ["Go", "SQL"] }));
        let mut doc = merge(&empty, first);
        assert_eq!(doc.full_name, "Ann");
        assert_eq!(doc.skills, strings(&["Go", "SQL"]));
        assert_eq!(doc.summary, "");
        assert_eq!(doc.contacts, Contacts::default());
        assert!(doc.experience.is_empty());

        doc.summary = "Backend engineer".to_string();
        let second = CvFragment::from_value(&json!({ "summary": "", "skills": ["Rust"] }));
        let doc = merge(&doc, second);
        assert_eq!(doc.summary, "Backend engineer");
        assert_eq!(doc.skills, strings(&["Rust"]));
        assert_eq!(doc.full_name, "Ann");
    }
}
