use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::stripped_text;
use crate::duration;
use crate::error::{FetchError, RowError};
use crate::fetch::PageSource;
use crate::settings::RaceEdition;
use crate::stages::StageReference;

static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#resultsCont div.general table.results tbody tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static FULL_TIME_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.hide").unwrap());

const MIN_CELLS: usize = 13;
const RANK_CELL: usize = 0;
const GAP_CELL: usize = 2;
const RIDER_CELL: usize = 7;
const TEAM_CELL: usize = 8;
const TIME_CELL: usize = 12;

/// One ranked rider in a GC table.
#[derive(Debug, Clone, PartialEq)]
pub struct GcRow {
    pub rank: u32,
    pub rider: String,
    pub team: String,
    pub gap_raw: String,
    pub gap_seconds: u64,
    pub overall_time: String,
}

/// Race-level `gc` page for the final stage, `<stage>-gc` otherwise.
pub fn gc_path(edition: &RaceEdition, stage: &StageReference, is_final: bool) -> String {
    if is_final {
        format!("{}/gc", edition.path())
    } else {
        stage.gc_path()
    }
}

/// Fetch the GC page that applies after `stage` and keep at most `top_n` rows.
pub fn extract(
    source: &impl PageSource,
    edition: &RaceEdition,
    stage: &StageReference,
    is_final: bool,
    top_n: usize,
) -> Result<Vec<GcRow>, FetchError> {
    let doc = source.fetch(&gc_path(edition, stage, is_final))?;
    Ok(parse_table(&doc, top_n))
}

/// Parse the first `top_n` table rows. Malformed rows are dropped, not fatal.
pub fn parse_table(doc: &Html, top_n: usize) -> Vec<GcRow> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for (i, tr) in doc.select(&ROW_SEL).take(top_n).enumerate() {
        let parsed = parse_row(tr).and_then(|row| {
            if seen.insert(row.rank) {
                Ok(row)
            } else {
                Err(RowError::DuplicateRank(row.rank))
            }
        });
        match parsed {
            Ok(row) => rows.push(row),
            Err(e) => debug!(row = i, "GC row dropped: {}", e),
        }
    }

    rows
}

fn parse_row(tr: ElementRef) -> Result<GcRow, RowError> {
    let cells: Vec<ElementRef> = tr.select(&CELL_SEL).collect();
    if cells.len() < MIN_CELLS {
        return Err(RowError::TooFewCells(cells.len()));
    }

    let rank_text = stripped_text(cells[RANK_CELL], "");
    let rank = rank_text
        .parse::<u32>()
        .map_err(|_| RowError::BadRank(rank_text.clone()))?;

    let gap_raw = stripped_text(cells[GAP_CELL], "");
    let time_cell = cells[TIME_CELL];
    let overall_time = time_cell
        .select(&FULL_TIME_SEL)
        .next()
        .map(|span| stripped_text(span, ""))
        .unwrap_or_else(|| stripped_text(time_cell, ""));

    Ok(GcRow {
        rank,
        rider: stripped_text(cells[RIDER_CELL], " "),
        team: stripped_text(cells[TEAM_CELL], " "),
        gap_seconds: duration::to_seconds(&gap_raw),
        gap_raw,
        overall_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::FixtureSource;
    use crate::settings::Settings;

    fn parse(fixture: &str) -> Html {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
        Html::parse_document(&html)
    }

    fn stage(n: u32) -> StageReference {
        StageReference {
            index: n as usize,
            number: n,
            path: format!("race/tour-de-france/2023/stage-{}", n),
        }
    }

    #[test]
    fn stage_gc_table() {
        let rows = parse_table(&parse("stage_gc"), 10);
        let ranks: Vec<u32> = rows.iter().map(|r| r.rank).collect();
        // row 3 is an ad spacer, row 5 has a non-numeric rank
        assert_eq!(ranks, vec![1, 2, 3, 5, 6, 7, 8, 9]);

        let leader = &rows[0];
        assert_eq!(leader.rider, "VINGEGAARD Jonas");
        assert_eq!(leader.team, "Jumbo-Visma");
        assert_eq!(leader.gap_raw, "");
        assert_eq!(leader.gap_seconds, 0);
        assert_eq!(leader.overall_time, "17:24:43");

        let second = &rows[1];
        assert_eq!(second.rider, "POGAČAR Tadej");
        assert_eq!(second.gap_raw, "+0:25");
        assert_eq!(second.gap_seconds, 25);
        assert_eq!(second.overall_time, "17:25:08");

        let third = &rows[2];
        assert_eq!(third.gap_raw, "+4:39");
        assert_eq!(third.gap_seconds, 279);
    }

    #[test]
    fn visible_cell_text_when_no_full_precision_span() {
        let rows = parse_table(&parse("stage_gc"), 10);
        let seventh = rows.iter().find(|r| r.rank == 7).unwrap();
        assert_eq!(seventh.overall_time, "17:31:10");
        assert_eq!(seventh.gap_seconds, 6 * 60 + 27);
    }

    #[test]
    fn top_n_counts_raw_rows() {
        // first four rows include the spacer
        let rows = parse_table(&parse("stage_gc"), 4);
        let ranks: Vec<u32> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_rank_is_dropped() {
        let rows = parse_table(&parse("stage_gc"), 20);
        let ranks: Vec<u32> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn rows_outside_results_container_are_ignored() {
        let doc = Html::parse_document(
            "<table class=\"results\"><tbody><tr>\
             <td>1</td><td></td><td></td><td></td><td></td><td></td><td></td>\
             <td>Rider</td><td>Team</td><td></td><td></td><td></td><td>1:00:00</td>\
             </tr></tbody></table>",
        );
        assert!(parse_table(&doc, 10).is_empty());
    }

    #[test]
    fn short_row_error() {
        let doc = Html::parse_document(
            "<table><tbody><tr><td>1</td><td>x</td></tr></tbody></table>",
        );
        let tr = doc.select(&Selector::parse("tr").unwrap()).next().unwrap();
        assert_eq!(parse_row(tr), Err(RowError::TooFewCells(2)));
    }

    #[test]
    fn final_stage_uses_race_gc_page() {
        let edition = Settings::default().edition("tdf", 2023).unwrap();
        assert_eq!(gc_path(&edition, &stage(21), true), "race/tour-de-france/2023/gc");
        assert_eq!(
            gc_path(&edition, &stage(20), false),
            "race/tour-de-france/2023/stage-20-gc"
        );
    }

    #[test]
    fn extract_fetches_selected_page() {
        let html = std::fs::read_to_string("tests/fixtures/stage_gc.html").unwrap();
        let source = FixtureSource::default().with_page("race/tour-de-france/2023/gc", html);
        let edition = Settings::default().edition("tdf", 2023).unwrap();

        let rows = extract(&source, &edition, &stage(21), true, 10).unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(source.requested(), vec!["race/tour-de-france/2023/gc"]);

        let err = extract(&source, &edition, &stage(5), false, 10).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
