use crate::domain::block::{Block, BlockContent, MediaBlock};
use crate::domain::page::RichText;

const INDENT: &str = "  ";

// converts a page's content tree into a markdown document
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    render_blocks(blocks)
}

fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut previous_was_list = false;
    let mut number = 0;

    for block in blocks {
        let is_list = is_list_item(&block.content);

        // numbered items count up within an unbroken run
        if matches!(block.content, BlockContent::NumberedListItem { .. }) {
            number += 1;
        } else {
            number = 0;
        }

        let rendered = match render_block(block, number) {
            Some(text) if !text.is_empty() => text,
            _ => continue,
        };

        if !out.is_empty() {
            out.push_str(if previous_was_list && is_list { "\n" } else { "\n\n" });
        }
        out.push_str(&rendered);
        previous_was_list = is_list;
    }

    out
}

fn is_list_item(content: &BlockContent) -> bool {
    matches!(
        content,
        BlockContent::BulletedListItem { .. }
            | BlockContent::NumberedListItem { .. }
            | BlockContent::ToDo { .. }
    )
}

fn render_block(block: &Block, number: usize) -> Option<String> {
    let own = match &block.content {
        BlockContent::Paragraph { paragraph } => render_rich_text(&paragraph.rich_text),
        BlockContent::Heading1 { heading_1 } => format!("# {}", render_rich_text(&heading_1.rich_text)),
        BlockContent::Heading2 { heading_2 } => format!("## {}", render_rich_text(&heading_2.rich_text)),
        BlockContent::Heading3 { heading_3 } => format!("### {}", render_rich_text(&heading_3.rich_text)),
        BlockContent::BulletedListItem { bulleted_list_item } => {
            format!("- {}", render_rich_text(&bulleted_list_item.rich_text))
        }
        BlockContent::NumberedListItem { numbered_list_item } => {
            format!("{}. {}", number, render_rich_text(&numbered_list_item.rich_text))
        }
        BlockContent::ToDo { to_do } => format!(
            "- [{}] {}",
            if to_do.checked { "x" } else { " " },
            render_rich_text(&to_do.rich_text)
        ),
        BlockContent::Quote { quote } => quote_lines(&render_rich_text(&quote.rich_text)),
        BlockContent::Callout { callout } => {
            let text = render_rich_text(&callout.rich_text);
            let text = match callout.icon.as_ref().and_then(|i| i.emoji.as_deref()) {
                Some(emoji) => format!("{} {}", emoji, text),
                None => text,
            };
            quote_lines(&text)
        }
        BlockContent::Code { code } => {
            let language = match code.language.as_deref() {
                Some("plain text") | None => "text",
                Some(lang) => lang,
            };
            format!("```{}\n{}\n```", language, plain_text(&code.rich_text))
        }
        BlockContent::Divider {} => "---".to_string(),
        BlockContent::Equation { equation } => format!("$$\n{}\n$$", equation.expression),
        BlockContent::Image { image } => {
            let url = image.source.url()?;
            format!("![{}]({})", plain_text(&image.caption), url)
        }
        BlockContent::Video { video: media }
        | BlockContent::File { file: media }
        | BlockContent::Pdf { pdf: media }
        | BlockContent::Audio { audio: media } => render_media_link(media)?,
        BlockContent::Bookmark { bookmark: link }
        | BlockContent::Embed { embed: link }
        | BlockContent::LinkPreview { link_preview: link } => {
            if link.url.is_empty() {
                return None;
            }
            let caption = plain_text(&link.caption);
            let label = if caption.is_empty() { link.url.as_str() } else { caption.as_str() };
            format!("[{}]({})", label, link.url)
        }
        // containers whose children carry the content
        BlockContent::Toggle { toggle } => {
            return Some(format!(
                "<details>\n<summary>{}</summary>\n\n{}\n\n</details>",
                render_rich_text(&toggle.rich_text),
                render_blocks(&block.children)
            ));
        }
        BlockContent::Table { .. } => return render_table(&block.children),
        BlockContent::ColumnList {} | BlockContent::Column {} => {
            return Some(render_blocks(&block.children));
        }
        BlockContent::TableRow { .. }
        | BlockContent::ChildPage { .. }
        | BlockContent::ChildDatabase { .. }
        | BlockContent::Unsupported => return None,
    };

    if block.children.is_empty() {
        return Some(own);
    }

    let nested = indent(&render_blocks(&block.children));
    if own.is_empty() {
        Some(nested)
    } else {
        Some(format!("{}\n{}", own, nested))
    }
}

fn render_media_link(media: &MediaBlock) -> Option<String> {
    let url = media.source.url()?;
    let caption = plain_text(&media.caption);
    let label = if !caption.is_empty() {
        caption
    } else {
        media.source.name.clone().unwrap_or_else(|| url.to_string())
    };
    Some(format!("[{}]({})", label, url))
}

fn render_table(rows: &[Block]) -> Option<String> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .filter_map(|row| match &row.content {
            BlockContent::TableRow { table_row } => Some(
                table_row
                    .cells
                    .iter()
                    .map(|cell| render_rich_text(cell).replace('|', "\\|"))
                    .collect(),
            ),
            _ => None,
        })
        .collect();

    let (header, body) = cells.split_first()?;
    let mut lines = vec![
        format!("| {} |", header.join(" | ")),
        format!("|{}|", vec![" --- "; header.len()].join("|")),
    ];
    for row in body {
        lines.push(format!("| {} |", row.join(" | ")));
    }
    Some(lines.join("\n"))
}

fn quote_lines(text: &str) -> String {
    text.lines()
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn plain_text(segments: &[RichText]) -> String {
    segments.iter().map(|s| s.plain_text.as_str()).collect()
}

// renders annotated text segments as inline markdown
pub fn render_rich_text(segments: &[RichText]) -> String {
    segments.iter().map(render_segment).collect()
}

fn render_segment(segment: &RichText) -> String {
    if segment.is_equation() {
        return format!("${}$", segment.plain_text);
    }

    // markers have to hug the text, surrounding whitespace stays outside of them
    let text = segment.plain_text.as_str();
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];

    let mut styled = core.to_string();
    let annotations = &segment.annotations;
    if annotations.code {
        styled = format!("`{}`", styled);
    }
    if annotations.strikethrough {
        styled = format!("~~{}~~", styled);
    }
    if annotations.italic {
        styled = format!("_{}_", styled);
    }
    if annotations.bold {
        styled = format!("**{}**", styled);
    }
    if let Some(href) = &segment.href {
        styled = format!("[{}]({})", styled, href);
    }

    format!("{}{}{}", leading, styled, trailing)
}
