//! Plain-text statistics handed to the chat model as its context prompt.

use crate::data::aggregate::{grade_counts, mean_known, sum_known, top_by_revenue, type_breakdown};
use crate::data::model::Dataset;

/// Companies listed in the ranking section of the context.
pub const CONTEXT_TOP_N: usize = 5;

/// Build the statistical context block for `dataset`.
pub fn context_block(dataset: &Dataset) -> String {
    let revenue = || dataset.records.iter().map(|r| r.total_revenue);
    let capital = dataset.records.iter().map(|r| r.registered_capital);

    let mut out = String::new();
    out.push_str(
        "You are an analyst for a construction-contractor customer registry. Always answer in Thai.\n",
    );
    out.push_str(&format!("Summary of {} companies:\n", dataset.len()));

    let types: Vec<String> = type_breakdown(dataset)
        .into_iter()
        .filter(|t| t.count > 0)
        .map(|t| format!("{}: {}", t.entity_type.label(), t.count))
        .collect();
    out.push_str(&format!("- Entity types: {}\n", types.join(", ")));

    let grades = match grade_counts(dataset) {
        Some(counts) => counts
            .into_iter()
            .map(|(g, n)| format!("{g}: {n}"))
            .collect::<Vec<_>>()
            .join(", "),
        None => "N/A".to_string(),
    };
    out.push_str(&format!("- Grades: {grades}\n"));
    out.push_str(&format!("- Total revenue: {:.0} million\n", sum_known(revenue())));
    out.push_str(&format!("- Mean revenue: {} million\n", fmt_mean(mean_known(revenue()))));
    out.push_str(&format!(
        "- Mean registered capital: {} million\n",
        fmt_mean(mean_known(capital))
    ));

    out.push_str(&format!("Top {CONTEXT_TOP_N} by revenue:\n"));
    for r in top_by_revenue(dataset, CONTEXT_TOP_N) {
        out.push_str(&format!(
            "  {} | {:.1}\n",
            r.company_name,
            r.total_revenue.unwrap_or_default()
        ));
    }
    out
}

/// Prefix the context block to a user question.
pub fn prompt(context: &str, question: &str) -> String {
    format!("{context}\nQuestion: {}", question.trim())
}

fn fmt_mean(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "N/A".to_string())
}
