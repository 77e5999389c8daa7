use crate::domain::page::{PageRecord, PropertyValue};
use crate::domain::post::FrontMatter;
use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

// builds the header block from a page's properties. `image` is the already localized
// cover link, if the page has one
pub fn build_front_matter(
    page: &PageRecord,
    filename: &str,
    image: Option<String>,
) -> Result<FrontMatter> {
    let title = required(page, "title")?
        .first_plain_text()
        .ok_or_else(|| anyhow!("Property 'title' of page {} is empty", page.id))?
        .to_string();

    let published = match required(page, "date")? {
        PropertyValue::Date { date: Some(date) } => parse_start_date(&date.start)
            .with_context(|| format!("Property 'date' of page {} is not a date", page.id))?,
        _ => bail!("Property 'date' of page {} has no start date", page.id),
    };

    let description = page
        .property("description")
        .and_then(|p| p.first_plain_text())
        .unwrap_or_default()
        .to_string();

    let category = match required(page, "category")? {
        PropertyValue::Select { select: Some(option) } => option.name.clone(),
        _ => bail!("Property 'category' of page {} has no selection", page.id),
    };

    let tags = match page.property("tags") {
        Some(PropertyValue::MultiSelect { multi_select }) => {
            multi_select.iter().map(|tag| tag.name.clone()).collect()
        }
        _ => Vec::new(),
    };

    // the checkbox called `published` decides the draft flag, the date above is only
    // labelled `published` in the header
    let draft = match page.property("published") {
        Some(PropertyValue::Checkbox { checkbox }) => !checkbox,
        _ => true,
    };

    let slug = slug_text(page).unwrap_or(filename).to_string();

    Ok(FrontMatter {
        title,
        published,
        description,
        category,
        tags,
        draft,
        slug,
        image,
    })
}

fn required<'a>(page: &'a PageRecord, name: &str) -> Result<&'a PropertyValue> {
    page.property(name)
        .ok_or_else(|| anyhow!("Page {} is missing the '{}' property", page.id, name))
}

/// The slug text when the page has a non-empty one.
pub fn slug_text(page: &PageRecord) -> Option<&str> {
    page.property("slug")
        .and_then(|p| p.first_plain_text())
        .filter(|slug| !slug.is_empty())
}

/// Output file stem of a page: its slug, or its id when it has none.
pub fn resolve_filename(page: &PageRecord) -> String {
    slug_text(page).unwrap_or(&page.id).to_string()
}

/// URL of the first file in the `image` property.
pub fn cover_image_url(page: &PageRecord) -> Option<&str> {
    match page.property("image") {
        Some(PropertyValue::Files { files }) => files.first().and_then(|f| f.url()),
        _ => None,
    }
}

// the calendar day of the start instant in UTC
pub fn parse_start_date(start: &str) -> Result<NaiveDate> {
    // tier 1: full timestamp with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(start) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }

    // tier 2: plain date
    if let Ok(date) = NaiveDate::parse_from_str(start, "%Y-%m-%d") {
        return Ok(date);
    }

    // tier 3: timestamp without offset, read as UTC
    NaiveDateTime::parse_from_str(start, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .with_context(|| format!("Unrecognised date '{}'", start))
}
