use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use libfood::search::CategoryGroup;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub(crate) struct Cli {
    #[arg(
        short,
        long,
        env = "FOODCTL_SERVER",
        default_value = "http://localhost:8080",
        help = "Base URL of the food map server"
    )]
    pub(crate) server: String,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Args, Debug)]
pub(crate) struct OutputOptions {
    #[arg(short, long, help = "Show all location properties")]
    pub(crate) full: bool,
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Output format"
    )]
    pub(crate) format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    #[command(about = "List locations, optionally narrowed down by a search")]
    List {
        #[arg(help = "Only show locations whose name or category contains this text")]
        query: Option<String>,
        #[arg(short, long, default_value_t = CategoryGroup::All, help = "Only show locations in this category group")]
        group: CategoryGroup,
        #[command(flatten)]
        output: OutputOptions,
    },
    #[command(about = "Show a single location")]
    Show {
        id: i64,
        #[command(flatten)]
        output: OutputOptions,
    },
    #[command(about = "Add a new location to the map")]
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        icon: Option<String>,
        #[arg(short, long)]
        brand: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
        #[arg(short, long = "tag", help = "A tag for the location. May be repeated")]
        tags: Vec<String>,
    },
    #[command(about = "List the category groups and the categories they contain")]
    Groups,
}
