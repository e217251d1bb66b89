//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use mnemon_domain::{ItemId, MemoryItem};
use mnemon_maintenance::MaintenanceOutcome;
use mnemon_monitor::MemoryMetrics;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const VALUE_DISPLAY_WIDTH: usize = 48;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a list of items.
    pub fn format_items(&self, items: &[MemoryItem]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_items_json(items),
            OutputFormat::Table => self.format_items_table(items),
            OutputFormat::Quiet => self.format_items_quiet(items),
        }
    }

    /// Format a single item.
    pub fn format_item(&self, item: &MemoryItem) -> Result<String> {
        self.format_items(std::slice::from_ref(item))
    }

    /// Format items as JSON.
    fn format_items_json(&self, items: &[MemoryItem]) -> Result<String> {
        Ok(serde_json::to_string_pretty(items)?)
    }

    /// Format items as a table.
    fn format_items_table(&self, items: &[MemoryItem]) -> Result<String> {
        if items.is_empty() {
            return Ok(self.colorize("No items found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Key", "Value", "Created"]);

        for item in items {
            let id = item.id.to_string();
            let value = truncate(&item.value, VALUE_DISPLAY_WIDTH);
            let created = item.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
            builder.push_record([
                // UUID text is ASCII, a fixed-width prefix is safe
                &id[..8],
                item.key.as_str(),
                value.as_str(),
                created.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(table.to_string())
    }

    /// Format items in quiet mode (IDs only).
    fn format_items_quiet(&self, items: &[MemoryItem]) -> Result<String> {
        let ids: Vec<String> = items.iter().map(|i| i.id.to_string()).collect();
        Ok(ids.join("\n"))
    }

    /// Format a metrics snapshot.
    pub fn format_metrics(&self, metrics: &MemoryMetrics, detailed: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(metrics)?),
            _ => {
                if detailed {
                    Ok(metrics.detailed_report())
                } else {
                    Ok(metrics.summary())
                }
            }
        }
    }

    /// Format an item count.
    pub fn format_count(&self, count: usize) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &serde_json::json!({ "count": count }),
            )?),
            OutputFormat::Quiet => Ok(count.to_string()),
            OutputFormat::Table => Ok(self.info(&format!("{} item(s) stored", count))),
        }
    }

    /// Format a maintenance cycle outcome.
    pub fn format_outcome(&self, outcome: &MaintenanceOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
            OutputFormat::Quiet => Ok(outcome.total_removed().to_string()),
            OutputFormat::Table => Ok(self.success(&format!(
                "Maintenance complete: pruned {}, deduplicated {}, evicted {}",
                outcome.pruned, outcome.deduplicated, outcome.evicted
            ))),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format a store result.
    pub fn item_stored(&self, id: &ItemId) -> String {
        match self.format {
            OutputFormat::Quiet => id.to_string(),
            _ => self.success(&format!("Stored: {}", id)),
        }
    }

    /// Format a bulk operation result.
    pub fn bulk_result(&self, operation: &str, count: usize) -> String {
        match self.format {
            OutputFormat::Quiet => count.to_string(),
            _ => self.success(&format!("{} {} item(s)", operation, count)),
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Shorten long values for table display.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max).collect();
        format!("{}...", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_item() -> MemoryItem {
        MemoryItem::new("region", "eu-west-1", None)
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let items = vec![create_test_item()];

        let output = formatter.format_items(&items).unwrap();

        assert!(output.contains("\"key\": \"region\""));
        assert!(output.contains("\"value\": \"eu-west-1\""));
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let items = vec![create_test_item()];

        let output = formatter.format_items(&items).unwrap();

        assert!(output.contains("Key"));
        assert!(output.contains("region"));
        assert!(output.contains("eu-west-1"));
    }

    #[test]
    fn test_quiet_format_is_ids_only() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let item = create_test_item();

        let output = formatter.format_items(&[item.clone()]).unwrap();

        assert_eq!(output, item.id.to_string());
    }

    #[test]
    fn test_empty_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_items(&[]).unwrap();
        assert!(output.contains("No items found"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }

    #[test]
    fn test_format_metrics_summary_and_detailed() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let metrics = MemoryMetrics {
            total_items: 3,
            configured_max_items: 100,
            ..Default::default()
        };

        let summary = formatter.format_metrics(&metrics, false).unwrap();
        assert!(summary.contains("3/100"));

        let detailed = formatter.format_metrics(&metrics, true).unwrap();
        assert!(detailed.contains("=== Memory Metrics Report ==="));
    }

    #[test]
    fn test_format_metrics_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let metrics = MemoryMetrics::default();

        let output = formatter.format_metrics(&metrics, false).unwrap();

        assert!(output.contains("\"total_items\""));
    }

    #[test]
    fn test_format_count_per_mode() {
        let metrics_count = 5;

        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(quiet.format_count(metrics_count).unwrap(), "5");

        let table = Formatter::new(OutputFormat::Table, false);
        assert_eq!(table.format_count(metrics_count).unwrap(), "ℹ 5 item(s) stored");

        let json = Formatter::new(OutputFormat::Json, false);
        assert!(json.format_count(metrics_count).unwrap().contains("\"count\": 5"));
    }

    #[test]
    fn test_format_outcome() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let outcome = MaintenanceOutcome {
            pruned: 2,
            deduplicated: 1,
            evicted: 0,
        };

        let output = formatter.format_outcome(&outcome).unwrap();

        assert!(output.contains("pruned 2"));
        assert!(output.contains("deduplicated 1"));
    }

    #[test]
    fn test_truncate_long_values() {
        let long = "x".repeat(100);
        let shortened = truncate(&long, 10);
        assert_eq!(shortened, format!("{}...", "x".repeat(10)));
        assert_eq!(truncate("short", 10), "short");
    }
}
