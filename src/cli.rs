use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "podshelf",
    version,
    about = "Browse, play and track podcasts from the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the dashboard (default).
    Tui {
        /// Start at a route: /, /shows, /show/{id}, /favorites, /completed
        #[arg(long)]
        route: Option<String>,
    },
    /// Print the catalog.
    Shows {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        genre: Option<u32>,
        #[arg(long, value_enum, default_value_t = SortArg::TitleAsc)]
        sort: SortArg,
    },
    /// Print the seasons and episodes of one show.
    Show { id: String },
    Favorites,
    History,
    /// Toggle between the light and dark theme.
    Theme,
    /// Clear listening history and saved positions.
    ResetHistory {
        /// Required; there is no undo.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    TitleAsc,
    TitleDesc,
    Newest,
    Oldest,
}
