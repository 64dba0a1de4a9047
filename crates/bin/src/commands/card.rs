//! Card-level commands: add, remove, move.

use binderkit::{
    CardData, CardEntry, MoveMode, Placement,
    grid::checked_position,
};

use super::CommandResult;
use crate::{
    cli::{AddArgs, MoveArgs, MoveModeArg, RemoveArgs},
    output::{OutputFormat, print_json},
    session::Session,
};

pub async fn add(session: &mut Session, args: AddArgs, format: OutputFormat) -> CommandResult {
    let mut data = CardData::named(args.name.unwrap_or_else(|| args.card_id.clone()));
    if let Some(variant) = args.variant {
        data = data.with_variant(variant);
    }
    let entry = CardEntry::new(args.card_id, data);

    let binder = session.checkout(&args.binder).await?;
    let (position, instance) = {
        let mut binder = binder.lock().await;
        let instance = entry.instance_id();
        let position = match (args.position, args.page) {
            (Some(raw), _) => binder.add_card(entry, Placement::At(checked_position(raw)?))?,
            (None, Some(page)) => binder.add_to_page(entry, page)?,
            (None, None) => binder.add_card(entry, Placement::FirstEmpty)?,
        };
        (position, instance)
    };
    let outcome = session.commit(&binder).await?;

    match format {
        OutputFormat::Human => println!(
            "Added card at position {position} (revision {})",
            outcome.revision
        ),
        OutputFormat::Json => print_json(&serde_json::json!({
            "position": position,
            "instanceId": instance,
            "revision": outcome.revision,
        }))?,
    }
    Ok(())
}

pub async fn remove(session: &mut Session, args: RemoveArgs, format: OutputFormat) -> CommandResult {
    let position = checked_position(args.position)?;
    let binder = session.checkout(&args.binder).await?;
    let removed = binder.lock().await.remove_card(position)?;
    let outcome = session.commit(&binder).await?;

    match format {
        OutputFormat::Human => println!(
            "Removed {} from position {position} (revision {})",
            removed.name(),
            outcome.revision
        ),
        OutputFormat::Json => print_json(&serde_json::json!({
            "position": position,
            "card": removed,
            "revision": outcome.revision,
        }))?,
    }
    Ok(())
}

pub async fn move_card(session: &mut Session, args: MoveArgs, format: OutputFormat) -> CommandResult {
    let from = checked_position(args.from)?;
    let to = checked_position(args.to)?;
    let mode = match args.mode {
        MoveModeArg::Swap => MoveMode::Swap,
        MoveModeArg::Shift => MoveMode::Shift,
    };

    let binder = session.checkout(&args.binder).await?;
    binder.lock().await.move_card(from, to, mode)?;
    let outcome = session.commit(&binder).await?;

    match format {
        OutputFormat::Human => println!(
            "Moved {from} -> {to} (revision {})",
            outcome.revision
        ),
        OutputFormat::Json => print_json(&serde_json::json!({
            "from": from,
            "to": to,
            "mode": mode,
            "revision": outcome.revision,
        }))?,
    }
    Ok(())
}
