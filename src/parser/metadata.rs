use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{Html, Selector};

use super::stripped_text;

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".title-line2").unwrap());
static RED_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("font.red").unwrap());
static INFO_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul.list li").unwrap());

/// Descriptive attributes of a stage. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageMetadata {
    pub finish: Option<String>,
    pub distance_km: Option<f64>,
    pub profile: Option<String>,
    pub date: Option<NaiveDate>,
}

pub fn extract(doc: &Html) -> StageMetadata {
    let mut meta = StageMetadata::default();

    // Title line: first red marker is the finish town, second the distance.
    if let Some(title) = doc.select(&TITLE_SEL).next() {
        let mut reds = title.select(&RED_SEL).map(|el| stripped_text(el, ""));
        meta.finish = reds.next().filter(|t| !t.is_empty());
        meta.distance_km = reds.next().as_deref().and_then(parse_distance);
    }

    let items: Vec<String> = doc.select(&INFO_SEL).map(|li| stripped_text(li, " ")).collect();
    meta.profile = labelled(&items, "Type").map(str::to_string);
    meta.date = labelled(&items, "Date").and_then(parse_date);

    meta
}

/// `(181.8 km)` → 181.8
fn parse_distance(text: &str) -> Option<f64> {
    let text = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim_end()
        .trim_end_matches("km")
        .trim();
    text.parse::<f64>().ok().filter(|d| d.is_finite())
}

/// Value of the first item starting with `label`, label and colon stripped.
fn labelled<'a>(items: &'a [String], label: &str) -> Option<&'a str> {
    items.iter().find_map(|item| {
        let rest = item.strip_prefix(label)?;
        let value = rest.trim_start().trim_start_matches(':').trim();
        (!value.is_empty()).then_some(value)
    })
}

/// `4 July 2023, 13:25` → 2023-07-04
fn parse_date(text: &str) -> Option<NaiveDate> {
    let day = text.split(',').next()?.trim();
    NaiveDate::parse_from_str(day, "%d %B %Y").ok()
}
