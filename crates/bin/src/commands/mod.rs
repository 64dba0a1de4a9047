pub mod binder;
pub mod card;
pub mod grids;

use crate::{cli::Commands, output::OutputFormat, session::Session};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Run a command that works on the document file.
pub async fn dispatch(session: &mut Session, command: Commands, format: OutputFormat) -> CommandResult {
    match command {
        Commands::Create(args) => binder::create(session, args, format).await,
        Commands::List => binder::list(session, format).await,
        Commands::Show(args) => binder::show(session, args, format).await,
        Commands::Compact(args) => binder::compact(session, args, format).await,
        Commands::Add(args) => card::add(session, args, format).await,
        Commands::Remove(args) => card::remove(session, args, format).await,
        Commands::Move(args) => card::move_card(session, args, format).await,
        Commands::Grids => grids::run(format),
    }
}
