//! Table and JSON rendering.

use clap::ValueEnum;
use serde::Serialize;
use strata::RepositorySummary;
use tabled::Tabled;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Print `items` as a rounded table or a pretty JSON array.
pub(crate) fn print_items<T: Tabled + Serialize>(
    items: Vec<T>,
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Table => {
            let mut table = tabled::Table::new(items);
            table.with(tabled::settings::Style::rounded());
            println!("{}", table);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }
    Ok(())
}

/// A sampled repository for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct Repository {
    #[tabled(rename = "Repository")]
    pub full_name: String,
    #[tabled(rename = "Stars")]
    pub stars: u64,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "URL")]
    pub url: String,
}

impl From<&RepositorySummary> for Repository {
    fn from(repo: &RepositorySummary) -> Self {
        let full_name = repo.full_name();
        let url = repo
            .html_url
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{full_name}"));
        Self {
            full_name,
            stars: repo.stars,
            language: repo.language.clone().unwrap_or_else(|| "-".to_string()),
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(html_url: Option<&str>) -> RepositorySummary {
        RepositorySummary {
            id: 7,
            owner: "apache".to_string(),
            name: "maven".to_string(),
            stars: 4200,
            language: None,
            default_branch: Some("master".to_string()),
            description: None,
            html_url: html_url.map(str::to_string),
            updated_at: None,
        }
    }

    #[test]
    fn output_format_default_is_table() {
        assert!(matches!(OutputFormat::default(), OutputFormat::Table));
    }

    #[test]
    fn repository_row_uses_html_url() {
        let row = Repository::from(&summary(Some("https://example.test/apache/maven")));
        assert_eq!(row.full_name, "apache/maven");
        assert_eq!(row.stars, 4200);
        assert_eq!(row.url, "https://example.test/apache/maven");
    }

    #[test]
    fn repository_row_fills_missing_fields() {
        let row = Repository::from(&summary(None));
        assert_eq!(row.url, "https://github.com/apache/maven");
        assert_eq!(row.language, "-");
    }

    #[test]
    fn repository_row_serializes_flat() {
        let row = Repository::from(&summary(None));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["full_name"], "apache/maven");
        assert_eq!(json["stars"], 4200);
    }
}
