pub mod gc;
pub mod metadata;

use scraper::ElementRef;

/// Descendant text nodes, each trimmed, empties dropped, joined by `sep`.
pub fn stripped_text(el: ElementRef, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn stripped_text_joins_nested_nodes() {
        let html = Html::parse_fragment(
            "<p>  <span>POGAČAR</span>\n   Tadej  <b> </b></p>",
        );
        let p = html.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert_eq!(stripped_text(p, " "), "POGAČAR Tadej");
        assert_eq!(stripped_text(p, ""), "POGAČARTadej");
    }
}
