//! Search result printer

use crate::search::SearchResponse;

/// Prints a search response to stdout
///
/// Highlight tags are stripped for terminal display; the full detail
/// (facets, analysis, score breakdowns) is available via JSON output.
pub fn print_search(response: &SearchResponse) {
    println!("=== Results for \"{}\" ===\n", response.query);

    if response.results.is_empty() {
        println!("No results.\n");
    }
    let first_rank = (response.page as usize - 1) * response.per_page as usize;
    for (i, result) in response.results.iter().enumerate() {
        let title = result.title.as_deref().unwrap_or(&result.url);
        println!("{}. {}", first_rank + i + 1, title);
        println!("   {}", result.url);
        let snippet = plain_text(&result.snippet);
        if !snippet.is_empty() {
            println!("   {}", snippet);
        }
        println!(
            "   {} | {} | score {} | {}",
            result.content_type,
            result.domain,
            result.score_breakdown.relevance,
            result.reading_time.text
        );
        println!();
    }

    println!(
        "{} results, page {}/{} ({} ms)",
        response.total_results, response.page, response.total_pages, response.elapsed_ms
    );
    if !response.suggestions.is_empty() {
        println!("Suggestions: {}", response.suggestions.join(", "));
    }
}

fn plain_text(highlighted: &str) -> String {
    highlighted.replace("<mark>", "").replace("</mark>", "")
}
