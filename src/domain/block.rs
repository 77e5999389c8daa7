use crate::domain::page::{FileObject, RichText};
use serde::Deserialize;

// one node of a page's content tree. children are filled in by the client after the
// node itself has been listed, they are never part of the listing payload
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub content: BlockContent,
    #[serde(skip)]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(id: &str, content: BlockContent) -> Self {
        Self {
            id: id.to_string(),
            has_children: false,
            content,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self
    }

    // child pages and databases are exported on their own, their trees are not inlined
    pub fn descends_inline(&self) -> bool {
        self.has_children
            && !matches!(
                self.content,
                BlockContent::ChildPage { .. } | BlockContent::ChildDatabase { .. }
            )
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    Paragraph {
        paragraph: TextBlock,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: TextBlock,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: TextBlock,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: TextBlock,
    },
    BulletedListItem {
        bulleted_list_item: TextBlock,
    },
    NumberedListItem {
        numbered_list_item: TextBlock,
    },
    ToDo {
        to_do: ToDoBlock,
    },
    Toggle {
        toggle: TextBlock,
    },
    Quote {
        quote: TextBlock,
    },
    Callout {
        callout: CalloutBlock,
    },
    Code {
        code: CodeBlock,
    },
    Divider {},
    Image {
        image: MediaBlock,
    },
    Video {
        video: MediaBlock,
    },
    File {
        file: MediaBlock,
    },
    Pdf {
        pdf: MediaBlock,
    },
    Audio {
        audio: MediaBlock,
    },
    Bookmark {
        bookmark: LinkBlock,
    },
    Embed {
        embed: LinkBlock,
    },
    LinkPreview {
        link_preview: LinkBlock,
    },
    Equation {
        equation: EquationBlock,
    },
    Table {
        table: TableBlock,
    },
    TableRow {
        table_row: TableRowBlock,
    },
    ColumnList {},
    Column {},
    ChildPage {
        child_page: TitledBlock,
    },
    ChildDatabase {
        child_database: TitledBlock,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

impl TextBlock {
    pub fn plain(text: &str) -> Self {
        Self {
            rich_text: vec![RichText::plain(text)],
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ToDoBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CalloutBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<Icon>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Icon {
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CodeBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MediaBlock {
    #[serde(flatten)]
    pub source: FileObject,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LinkBlock {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EquationBlock {
    #[serde(default)]
    pub expression: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TableBlock {
    #[serde(default)]
    pub has_column_header: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TableRowBlock {
    #[serde(default)]
    pub cells: Vec<Vec<RichText>>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TitledBlock {
    #[serde(default)]
    pub title: String,
}
