use incr_list_core::{strip_tags, truncate_preview, ListItem, MarkupSanitizer, Query};
use serde::{Deserialize, Serialize};

/// A job posting as served by the listing endpoint or a local JSON dump.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct JobPost {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    /// Server-supplied markup.
    #[serde(default)]
    pub description: String,
}

impl ListItem for JobPost {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }

    fn sanitize_content(&mut self, sanitizer: &dyn MarkupSanitizer) {
        self.description = sanitizer.sanitize(&self.description);
    }
}

impl JobPost {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "company" => Some(&self.company),
            "location" => Some(&self.location),
            _ => None,
        }
    }

    /// Search is a case-insensitive substring match over title, company and
    /// description; every filter must equal its field (case-insensitive).
    /// A filter on an unknown field matches nothing.
    pub fn matches(&self, query: &Query) -> bool {
        let needle = query.search.to_lowercase();
        let searched = needle.is_empty()
            || [&self.title, &self.company, &self.description]
                .iter()
                .any(|text| text.to_lowercase().contains(&needle));
        searched
            && query.filters.iter().all(|(key, value)| {
                self.field(key).is_some_and(|field| field.eq_ignore_ascii_case(value))
            })
    }
}

/// What the CLI prints for one rendered row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct RowView {
    pub index: usize,
    pub id: u64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub preview: String,
}

impl RowView {
    pub fn render(job: &JobPost, index: usize, preview_length: usize) -> Self {
        Self {
            index,
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            preview: truncate_preview(&strip_tags(&job.description), preview_length).into_owned(),
        }
    }
}
