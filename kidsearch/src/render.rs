//! Plain-text rendering of search results for the command line.

use std::fmt::Write;

use crate::api::v1::dto::{ComparisonResponse, SearchResponse};
use crate::models::{Comparison, SearchOutcome, STORAGE_LABEL};

const COMPARISON_NAME_CHARS: usize = 40;

/// Metrics header followed by one block per product.
pub fn render_outcome(outcome: &SearchOutcome) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Query:   {}", outcome.query);
    let _ = writeln!(
        out,
        "Latency: {}ms | Results: {} | Method: {} | Storage: {}",
        outcome.latency_ms,
        outcome.results.len(),
        outcome.method,
        STORAGE_LABEL
    );

    if outcome.results.is_empty() {
        let _ = writeln!(out, "\nNo products found.");
        return out;
    }

    for hit in &outcome.results {
        let p = &hit.product;
        let _ = writeln!(out, "\n{}. {}", hit.rank, p.name);
        let _ = writeln!(
            out,
            "   Brand: {} | Price: {} | Category: {} | Score: {:.3}",
            p.brand_label(),
            p.price_label(),
            p.category_label(),
            hit.score
        );
        if let Some(url) = &p.image_url {
            let _ = writeln!(out, "   Image: {url}");
        }
    }

    out
}

/// One section per method, in comparison order, with truncated names.
pub fn render_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Method comparison for \"{}\"", comparison.query);

    for outcome in &comparison.outcomes {
        let _ = writeln!(
            out,
            "\n[{}] {}ms",
            outcome.method.short_label(),
            outcome.latency_ms
        );
        if outcome.results.is_empty() {
            let _ = writeln!(out, "  (no results)");
        }
        for hit in &outcome.results {
            let _ = writeln!(
                out,
                "  {}. {} {}",
                hit.rank,
                hit.product.short_name(COMPARISON_NAME_CHARS),
                hit.product.price_label()
            );
        }
    }

    let _ = writeln!(out, "\nFull Pipeline reranks for maximum relevance.");
    out
}

/// Pretty JSON in the same shape as the HTTP API.
pub fn outcome_json(outcome: SearchOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SearchResponse::from(outcome))
}

pub fn comparison_json(comparison: Comparison) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ComparisonResponse::from(comparison))
}
