//! Table and JSON output formatting

use serde::Serialize;
use spectrohash_core::MatchResult;

#[derive(Serialize)]
struct MatchOutput<'a> {
    query: &'a [String],
    /// Share of the first clip in the mix, in `[0, 1]`
    weight: f64,
    matches: usize,
    results: &'a [MatchResult],
}

/// Ranked results as a two-column table
pub fn render_table(results: &[MatchResult]) -> String {
    const HEADERS: [&str; 2] = ["Found Matches", "Percentage"];

    let id_width = results
        .iter()
        .map(|r| r.id.chars().count())
        .chain(std::iter::once(HEADERS[0].len()))
        .max()
        .unwrap_or(0);

    let mut table = format!("{:<id_width$}  {}\n", HEADERS[0], HEADERS[1]);
    table.push_str(&format!("{}  {}\n", "-".repeat(id_width), "-".repeat(HEADERS[1].len())));
    for result in results {
        table.push_str(&format!("{:<id_width$}  {:>10.2}\n", result.id, result.score));
    }
    table
}

/// Print ranked results as a table
pub fn print_table(results: &[MatchResult]) {
    print!("{}", render_table(results));
}

/// Print ranked results with per-kind scores and distances as JSON
pub fn print_json_results(query: &[String], weight: f64, results: &[MatchResult]) {
    let output = MatchOutput {
        query,
        weight,
        matches: results.len(),
        results,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}
