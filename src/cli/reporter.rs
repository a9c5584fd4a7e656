// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::report::ExtractionReport;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a finished extraction run
    pub fn report_extraction(file: &str, report: &ExtractionReport) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Extracted:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());

        if report.cancelled {
            println!("{} {}", "⚠️ ".yellow(), "Run was cancelled, counts are partial".yellow().bold());
        } else if report.batching.dropped.is_empty() {
            println!("{} {}", "✅".green(), "All leaves emitted".green().bold());
        } else {
            println!(
                "{} {}",
                "❌".red(),
                format!("{} leaves dropped by the sink", report.batching.dropped.len())
                    .red()
                    .bold()
            );
        }

        println!("\n{}", "Leaves:".bold());
        Self::print_count("Total", report.total_leaves, false);
        Self::print_count("Valid", report.valid, false);
        Self::print_count("Surface only", report.surface_only, report.surface_only > 0);
        Self::print_count("Degenerate", report.degenerate, report.degenerate > 0);

        if report.degenerate > 0 {
            println!("\n{}", "Fallback:".bold());
            let tiers = &report.fallback_tier_counts;
            Self::print_count("Edges", tiers.edges, false);
            Self::print_count("Tessellation", tiers.tessellation, false);
            Self::print_count("Marker", tiers.marker, tiers.marker > 0);
        }

        println!("\n{}", "Traversal:".bold());
        Self::print_count("Instances", report.instances_visited, false);
        Self::print_count("Max depth", report.max_depth as usize, false);
        Self::print_count("Rejected transforms", report.rejected_transforms, report.rejected_transforms > 0);
        Self::print_count("Unresolved refs", report.unresolved_references, report.unresolved_references > 0);
        Self::print_count("Cyclic refs", report.cyclic_references, report.cyclic_references > 0);

        println!("\n{}", "Output:".bold());
        Self::print_count("Groups", report.groups_found, false);
        let batching = &report.batching;
        println!(
            "  {} {}",
            "Batch mode:".bright_black(),
            batching.mode.to_string().cyan()
        );
        Self::print_count("Objects", batching.objects_created, false);
        Self::print_count("Sink calls", batching.sink_calls, false);
        Self::print_count("Rejected calls", batching.rejected_calls, batching.rejected_calls > 0);

        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(report.elapsed).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_count(name: &str, value: usize, flagged: bool) {
        let value = value.to_string();
        let formatted = if flagged { value.yellow() } else { value.cyan() };
        println!("  {} {}", format!("{}:", name).bright_black(), formatted);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}
