// Colored terminal output for similarity scores and the result table.
//
// A failed computation is always shown as an error line, never as a 0.000
// score, so the two cannot be confused on screen.

use colored::Colorize;

use crate::dataset::BatchScores;
use crate::error::SimilarityError;
use crate::neighbors::traits::NeighborSet;
use crate::results::ResultTable;
use crate::similarity::bag::Bag;
use crate::similarity::pipeline::PairKind;
use crate::stats::CorrelationResult;

const BAR_WIDTH: usize = 20;

/// Display the similarity of a word or sentence pair.
pub fn display_similarity(kind: PairKind, a: &str, b: &str, score: f64) {
    let label = match kind {
        PairKind::Words => "Word similarity",
        PairKind::Sentences => "Sentence similarity",
    };
    println!("\n{}", format!("=== {label} ===").bold());
    println!("  A: {}", super::truncate_chars(a, 100));
    println!("  B: {}", super::truncate_chars(b, 100));
    println!("  {} {:.3}", colorize_score_bar(score), score);
}

/// Display a failure in place of a score.
pub fn display_error(context: &str, err: &SimilarityError) {
    println!("\n  {} {}: {}", "ERROR".red().bold(), context, err);
    if let SimilarityError::Lookup { .. } = err {
        println!("  {}", "No score was computed (this is not a 0.0 similarity).".dimmed());
    }
}

/// Display a term's neighbor set, sorted for readability.
pub fn display_neighbors(term: &str, neighbors: &NeighborSet) {
    println!(
        "\n{}",
        format!("=== Neighbors of '{}' ({}) ===", term, neighbors.len()).bold()
    );
    if neighbors.is_empty() {
        println!("  {}", "(none)".dimmed());
        return;
    }
    println!("  {}", sorted_words(neighbors).join(", "));
}

/// Display the two bags behind a sentence score, with shared words highlighted.
pub fn display_bags(bag_a: &Bag, bag_b: &Bag) {
    let shared: Vec<&str> = sorted_words(bag_a)
        .into_iter()
        .filter(|word| bag_b.contains(*word))
        .collect();
    println!(
        "\n  Bag A: {} words  |  Bag B: {} words  |  Shared: {}",
        bag_a.len(),
        bag_b.len(),
        shared.len()
    );
    if !shared.is_empty() {
        println!("  Shared: {}", shared.join(", ").green());
    }
}

/// Display the outcome of a dataset run.
pub fn display_batch_summary(name: &str, batch: &BatchScores, result: &CorrelationResult) {
    println!("\n{}", format!("=== Dataset '{name}' ===").bold());
    println!("  Pairs scored: {}", batch.scored());
    if !batch.skipped.is_empty() {
        println!(
            "  {} {} pairs skipped:",
            "!".yellow(),
            batch.skipped.len()
        );
        for skipped in &batch.skipped {
            println!(
                "    line {}: {} / {} ({})",
                skipped.line,
                super::truncate_chars(&skipped.first, 40),
                super::truncate_chars(&skipped.second, 40),
                skipped.error.to_string().dimmed()
            );
        }
    }
    println!("  Pearson r: {:.4}", result.statistic);
    println!("  p-value:   {}", format_pvalue(result.pvalue));
}

/// Display the stored result table in its display order.
pub fn display_result_table(table: &ResultTable) {
    if table.is_empty() {
        println!("No stored results. Run `lexsim dataset <file> --name <name> --save` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Pearson statistic and p-values ({} datasets) ===", table.len()).bold()
    );
    println!();
    println!(
        "  {:<28} {:<22} {:>8}  {:>10}",
        "Dataset".dimmed(),
        "r".dimmed(),
        "".dimmed(),
        "p-value".dimmed(),
    );
    println!("  {}", "-".repeat(72).dimmed());

    for (name, result) in table.iter() {
        let bar = statistic_bar(result.statistic, BAR_WIDTH);
        let colored_bar = if result.statistic >= 0.0 {
            bar.bright_blue()
        } else {
            bar.bright_red()
        };
        let pvalue = format_pvalue(result.pvalue);
        let colored_p = if result.pvalue < 0.05 {
            pvalue.green()
        } else {
            pvalue.yellow()
        };
        println!(
            "  {:<28} {} {:>8.4}  {:>10}",
            super::truncate_chars(name, 25),
            colored_bar,
            result.statistic,
            colored_p,
        );
    }
    println!();
}

/// Bar for a statistic in [-1, 1]: filled proportionally to |r|.
pub fn statistic_bar(statistic: f64, width: usize) -> String {
    let magnitude = statistic.abs().min(1.0);
    let filled = (magnitude * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}

/// Scientific notation for tiny p-values, fixed for the rest.
pub fn format_pvalue(pvalue: f64) -> String {
    if pvalue < 1e-4 {
        format!("{pvalue:.2e}")
    } else {
        format!("{pvalue:.4}")
    }
}

fn colorize_score_bar(score: f64) -> colored::ColoredString {
    let bar = statistic_bar(score, BAR_WIDTH);
    if score >= 0.5 {
        bar.bright_green()
    } else if score >= 0.2 {
        bar.bright_yellow()
    } else {
        bar.bright_blue()
    }
}

fn sorted_words(set: &std::collections::HashSet<String>) -> Vec<&str> {
    let mut words: Vec<&str> = set.iter().map(String::as_str).collect();
    words.sort_unstable();
    words
}
