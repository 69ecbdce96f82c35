//! Printable Markdown rendering of a document. Empty sections are left out.

use crate::cv::dates::format_span;
use crate::cv::model::CvDocument;

pub fn render_markdown(doc: &CvDocument) -> String {
    let name = if doc.full_name.trim().is_empty() {
        "Your Name"
    } else {
        doc.full_name.trim()
    };
    let mut md = format!("# {name}\n\n");
    if !doc.title.trim().is_empty() {
        md.push_str(&format!("**{}**\n\n", doc.title.trim()));
    }

    let c = &doc.contacts;
    let contact_lines: Vec<String> = [("Phone", &c.phone), ("Email", &c.email), ("Location", &c.location)]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(label, v)| format!("- {label}: {v}"))
        .chain(c.links.iter().map(|l| format!("- {l}")))
        .collect();
    if !contact_lines.is_empty() {
        md.push_str("## Contact\n\n");
        md.push_str(&contact_lines.join("\n"));
        md.push_str("\n\n");
    }

    if !doc.summary.trim().is_empty() {
        md.push_str(&format!("## Profile\n\n{}\n\n", doc.summary.trim()));
    }

    if !doc.experience.is_empty() {
        md.push_str("## Work Experience\n\n");
        for e in &doc.experience {
            md.push_str(&format!(
                "### {} · {}\n*{}*\n\n",
                e.role,
                e.company,
                format_span(e.start.as_deref(), e.end.as_deref())
            ));
            push_bullets(&mut md, &e.bullets);
            if !e.tech.is_empty() {
                md.push_str(&format!("Tech: {}\n\n", e.tech.join(", ")));
            }
        }
    }

    if !doc.education.is_empty() {
        md.push_str("## Education\n\n");
        for e in &doc.education {
            md.push_str(&format!(
                "### {}\n{}  \n*{}*\n\n",
                e.school,
                e.program,
                format_span(e.start.as_deref(), e.end.as_deref())
            ));
        }
    }

    if !doc.projects.is_empty() {
        md.push_str("## Projects\n\n");
        for p in &doc.projects {
            match &p.url {
                Some(url) => md.push_str(&format!("### [{}]({url})\n\n", p.name)),
                None => md.push_str(&format!("### {}\n\n", p.name)),
            }
            push_bullets(&mut md, &p.bullets);
        }
    }

    if !doc.skills.is_empty() {
        md.push_str("## Skills\n\n");
        push_bullets(&mut md, &doc.skills);
    }

    if !doc.languages.is_empty() {
        md.push_str("## Languages\n\n");
        for l in &doc.languages {
            if l.level.is_empty() {
                md.push_str(&format!("- {}\n", l.name));
            } else {
                md.push_str(&format!("- {} ({})\n", l.name, l.level));
            }
        }
        md.push('\n');
    }

    md
}

fn push_bullets(md: &mut String, bullets: &[String]) {
    if bullets.is_empty() {
        return;
    }
    for b in bullets {
        md.push_str(&format!("- {b}\n"));
    }
    md.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::model::normalize_value;
    use serde_json::json;

    #[test]
    fn test_empty_document_placeholder_name() {
        let md = render_markdown(&CvDocument::default());
        assert_eq!(md, "# Your Name\n\n");
    }

    #[test]
    fn test_ongoing_role_shows_present() {
        let doc = normalize_value(&json!({
            "fullName": "Ann",
            "experience": [{ "role": "Dev", "company": "Acme", "start": "2020-01", "bullets": ["Shipped"] }]
        }));
        let md = render_markdown(&doc);
        assert!(md.contains("### Dev · Acme\n*2020-01 – Present*"));
        assert!(md.contains("- Shipped\n"));
        assert!(!md.contains("## Education"));
    }

    #[test]
    fn test_unknown_start_dash() {
        let doc = normalize_value(&json!({
            "education": [{ "school": "KTH", "program": "CS", "end": "2019" }]
        }));
        assert!(render_markdown(&doc).contains("*— – 2019*"));
    }

    #[test]
    fn test_contacts_and_languages() {
        let doc = normalize_value(&json!({
            "contacts": { "email": "a@x.com", "links": ["github.com/ann"] },
            "languages": [{ "name": "Swedish", "level": "Native" }, { "name": "English", "level": "" }]
        }));
        let md = render_markdown(&doc);
        assert!(md.contains("- Email: a@x.com\n- github.com/ann"));
        assert!(!md.contains("Phone"));
        assert!(md.contains("- Swedish (Native)\n- English\n"));
    }

    #[test]
    fn test_project_link() {
        let doc = normalize_value(&json!({
            "projects": [{ "name": "Mock API", "url": "https://x.dev", "bullets": [] }]
        }));
        assert!(render_markdown(&doc).contains("### [Mock API](https://x.dev)"));
    }
}
