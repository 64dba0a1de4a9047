//! CLI argument definitions for the binderkit binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Operate on binders stored in a local JSON document file
#[derive(Parser, Debug)]
#[command(name = "binderkit")]
#[command(about = "binderkit: arrange trading cards in paginated binders")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where binders are read from and pushed to.
#[derive(clap::Args, Debug)]
pub struct StoreArgs {
    /// Data directory holding binders.json
    #[arg(short = 'D', long, global = true, env = "BINDERKIT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Owner whose binders are listed and edited
    #[arg(
        short,
        long,
        global = true,
        default_value = "local",
        env = "BINDERKIT_OWNER"
    )]
    pub owner: String,

    /// Grid size for newly created binders
    #[arg(long, global = true, default_value = "3x3", env = "BINDERKIT_GRID")]
    pub grid: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty binder
    Create(CreateArgs),
    /// List the owner's binders
    List,
    /// Show the cards of a binder
    Show(ShowArgs),
    /// Put a card into a binder
    Add(AddArgs),
    /// Take the card out of a slot
    Remove(RemoveArgs),
    /// Move one card to another slot
    Move(MoveArgs),
    /// Close the gaps on a page or across the whole binder
    Compact(CompactArgs),
    /// List the registered grid sizes
    Grids,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Display name of the binder
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Binder id
    pub binder: String,

    /// Only show this binder page (0 is the cover)
    #[arg(long)]
    pub page: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Binder id
    pub binder: String,

    /// Catalogue id of the card
    pub card_id: String,

    /// Display name; defaults to the card id
    #[arg(long)]
    pub name: Option<String>,

    /// Printing variant (foil, reverse holo, ...)
    #[arg(long)]
    pub variant: Option<String>,

    /// Slot to insert at; later cards shift right
    #[arg(long, conflicts_with = "page")]
    pub position: Option<i64>,

    /// First free slot on this binder page
    #[arg(long)]
    pub page: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Binder id
    pub binder: String,

    /// Slot to empty
    pub position: i64,
}

/// How a moved card treats the card already at the target
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MoveModeArg {
    /// Exchange the two cards
    Swap,
    /// Slide the cards in between by one slot
    Shift,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Binder id
    pub binder: String,

    /// Source slot
    pub from: i64,

    /// Target slot
    pub to: i64,

    #[arg(short, long, default_value = "swap")]
    pub mode: MoveModeArg,
}

#[derive(clap::Args, Debug)]
pub struct CompactArgs {
    /// Binder id
    pub binder: String,

    /// Only compact this binder page
    #[arg(long)]
    pub page: Option<usize>,
}
