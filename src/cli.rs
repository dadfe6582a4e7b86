use clap::{Args, Parser, Subcommand};

use catalog_editor::models::Field;

#[derive(Parser)]
#[command(name = "catalog-editor")]
#[command(about = "Add and edit catalog items with validated forms")]
#[command(version)]
pub struct Cli {
    /// Base URL of the catalog service (overrides CATALOG_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the terminal UI
    Tui,

    /// Print every item in the catalog
    List,

    /// Create a new item
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Update an existing item; omitted fields keep their current value
    Edit {
        /// Identifier of the item to update
        #[arg(long)]
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },
}

/// Raw field input, validated by the same schema the TUI uses
#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Character name
    #[arg(long)]
    pub name: Option<String>,

    /// Image URL
    #[arg(long)]
    pub image_url: Option<String>,

    /// Number in line
    #[arg(long)]
    pub sequence_number: Option<String>,

    /// Year released
    #[arg(long)]
    pub year_released: Option<String>,

    /// Source (publisher, franchise, ...)
    #[arg(long)]
    pub source: Option<String>,
}

impl FieldArgs {
    /// Supplied values paired with the field they set, in form order
    pub fn entries(&self) -> Vec<(Field, &str)> {
        [
            (Field::Name, &self.name),
            (Field::ImageUrl, &self.image_url),
            (Field::Source, &self.source),
            (Field::YearReleased, &self.year_released),
            (Field::SequenceNumber, &self.sequence_number),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "catalog-editor",
            "add",
            "--name",
            "Batman",
            "--sequence-number",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Add { fields } => {
                assert_eq!(
                    fields.entries(),
                    vec![(Field::Name, "Batman"), (Field::SequenceNumber, "5")]
                );
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_edit_with_global_url() {
        let cli = Cli::try_parse_from([
            "catalog-editor",
            "edit",
            "--id",
            "42",
            "--source",
            "DC",
            "--api-url",
            "http://127.0.0.1:9000",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        match cli.command {
            Commands::Edit { id, fields } => {
                assert_eq!(id, "42");
                assert_eq!(fields.entries(), vec![(Field::Source, "DC")]);
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_edit_requires_id() {
        assert!(Cli::try_parse_from(["catalog-editor", "edit", "--name", "x"]).is_err());
    }
}
