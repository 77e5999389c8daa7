use serde::Deserialize;
use std::collections::HashMap;

// a page row as returned by a database query, properties are kept keyed by their column name
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl PageRecord {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

// the property kinds the exporter reads. anything else decodes to Unsupported
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        title: Vec<RichText>,
    },
    RichText {
        rich_text: Vec<RichText>,
    },
    Date {
        date: Option<DateValue>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    Checkbox {
        checkbox: bool,
    },
    Files {
        files: Vec<FileObject>,
    },
    #[serde(other)]
    Unsupported,
}

impl PropertyValue {
    /// Text segments of a `title` or `rich_text` property.
    pub fn text_segments(&self) -> Option<&[RichText]> {
        match self {
            PropertyValue::Title { title } => Some(title),
            PropertyValue::RichText { rich_text } => Some(rich_text),
            _ => None,
        }
    }

    /// Plain text of the first segment, the way the blog reads single-line fields.
    pub fn first_plain_text(&self) -> Option<&str> {
        self.text_segments()
            .and_then(|segments| segments.first())
            .map(|segment| segment.plain_text.as_str())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl RichText {
    pub fn plain(text: &str) -> Self {
        Self {
            plain_text: text.to_string(),
            kind: Some("text".to_string()),
            ..Default::default()
        }
    }

    pub fn is_equation(&self) -> bool {
        self.kind.as_deref() == Some("equation")
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub code: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DateValue {
    pub start: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub name: String,
}

// both hosted uploads and external links show up in file lists and media blocks
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FileObject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub external: Option<FileUrl>,
}

impl FileObject {
    pub fn url(&self) -> Option<&str> {
        self.file
            .as_ref()
            .or(self.external.as_ref())
            .map(|f| f.url.as_str())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FileUrl {
    pub url: String,
}
