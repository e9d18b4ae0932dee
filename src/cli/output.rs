//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a document with its page count.
    pub fn document_info(title: &str, source: &str, pages: usize) {
        println!(
            "  {} {} ({}, {} pages)",
            style("*").cyan(),
            style(title).bold(),
            style(source).dim(),
            pages
        );
    }

    /// Print a ranked page.
    pub fn search_result(title: &str, page: u32, score: f32, content: &str) {
        println!(
            "\n{} {} p.{} (score: {:.2})",
            style(">>").green(),
            style(title).bold(),
            style(page).cyan(),
            score
        );
        println!("   {}", content_preview(content, 200));
    }

    /// Print a source tag with its page.
    pub fn source(id: &str, title: &str, page: u32, score: f32) {
        println!(
            "  {} {} p.{} {}",
            style(format!("[{}]", id)).cyan(),
            style(title).bold(),
            page,
            style(format!("(score: {:.2})", score)).dim()
        );
    }

    /// Print a sentence with its citation tags.
    pub fn cited_sentence(text: &str, citations: &[String]) {
        let tags = if citations.is_empty() {
            style("(no valid citation)".to_string()).yellow()
        } else {
            style(citations.join(", ")).cyan()
        };
        println!("  {} {}\n    {}", style("*").cyan(), text, tags);
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("#>-"));
        }
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Collapse newlines and truncate with ellipsis on a char boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview_multibyte() {
        let text = "€".repeat(10);
        assert_eq!(content_preview(&text, 3), "€€€...");
        assert_eq!(content_preview("a\nb", 10), "a b");
    }
}
