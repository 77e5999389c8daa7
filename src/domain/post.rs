use chrono::NaiveDate;
use derive_more::derive::Display;

// the header block of a post, lines are always emitted in the order of the fields below
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub published: NaiveDate,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub draft: bool,
    pub slug: String,
    pub image: Option<String>,
}

impl FrontMatter {
    /// Ordered `(key, value)` pairs as they appear between the `---` delimiters.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            ("title", self.title.clone()),
            ("published", self.published.format("%Y-%m-%d").to_string()),
            ("description", self.description.clone()),
            ("category", self.category.clone()),
            ("tags", format!("[{}]", self.tags.join(", "))),
            ("draft", self.draft.to_string()),
            ("slug", self.slug.clone()),
        ];

        if let Some(image) = &self.image {
            entries.push(("image", format!("\"{}\"", image)));
        }

        entries
    }

    pub fn render(&self) -> String {
        let mut lines = vec!["---".to_string()];
        for (key, value) in self.entries() {
            lines.push(format!("{}: {}", key, value));
        }
        lines.push("---".to_string());
        lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{}.md", filename)]
pub struct ExtractedPost {
    pub filename: String,
    pub front_matter: FrontMatter,
    pub body: String,
}

impl ExtractedPost {
    pub fn file_name(&self) -> String {
        self.to_string()
    }

    // front matter, one blank line, then the body exactly as converted
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.front_matter.render(), self.body)
    }
}
