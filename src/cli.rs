use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_CATALOG, DEFAULT_LOG_FILE};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional command to run; opens the picker when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Product catalog: a JSON file path or an http(s) URL
    #[arg(long, global = true, env = "ROUTINE_PICKER_CATALOG", default_value = DEFAULT_CATALOG)]
    pub catalog: String,

    /// Chat model to use
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Where to write logs
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the beauty advisor a one-off question
    Ask {
        /// The message to send
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// List products, optionally filtered
    Products {
        /// Only show this exact category
        #[arg(short, long, default_value = "")]
        category: String,

        /// Case-insensitive text to look for in name, brand and description
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Show how assistant text is split into headings, lists and paragraphs
    Format {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,

        /// Print the blocks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a routine for the named products
    Routine {
        /// Exact product names
        #[arg(required = true)]
        products: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_opens_picker() {
        let cli = Cli::parse_from(["routine-picker"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_products_arguments() {
        let cli = Cli::parse_from([
            "routine-picker",
            "products",
            "--category",
            "cleanser",
            "--catalog",
            "data/catalog.json",
        ]);
        assert_eq!(cli.catalog, "data/catalog.json");
        match cli.command {
            Some(Commands::Products { category, search }) => {
                assert_eq!(category, "cleanser");
                assert_eq!(search, "");
            }
            _ => panic!("expected products command"),
        }
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["routine-picker", "ask", "is", "niacinamide", "ok?"]);
        match cli.command {
            Some(Commands::Ask { message }) => assert_eq!(message.join(" "), "is niacinamide ok?"),
            _ => panic!("expected ask command"),
        }
    }
}
