//! Binder-level commands: create, list, show, compact.

use binderkit::{
    Binder, SharedBinder,
    clock::format_millis,
    grid::Side,
};

use super::CommandResult;
use crate::{
    cli::{CompactArgs, CreateArgs, ShowArgs},
    output::{OutputFormat, print_json, print_table},
    session::Session,
};

fn summary(binder: &Binder) -> serde_json::Value {
    serde_json::json!({
        "id": binder.id(),
        "name": binder.name(),
        "gridSize": binder.settings().grid_size,
        "pages": binder.page_count(),
        "cards": binder.store().len(),
        "status": binder.status(),
    })
}

pub async fn create(session: &mut Session, args: CreateArgs, format: OutputFormat) -> CommandResult {
    let binder = session.workspace_mut().create_binder(args.name, None)?;
    let outcome = session.commit(&binder).await?;
    let binder = binder.lock().await;

    match format {
        OutputFormat::Human => println!(
            "Created binder {} \"{}\" ({} grid, revision {})",
            binder.id(),
            binder.name(),
            binder.settings().grid_size,
            outcome.revision
        ),
        OutputFormat::Json => print_json(&summary(&binder))?,
    }
    Ok(())
}

pub async fn list(session: &Session, format: OutputFormat) -> CommandResult {
    let documents = session.documents().await?;

    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = documents
                .iter()
                .map(|doc| {
                    vec![
                        doc.id.to_string(),
                        doc.metadata.name.clone(),
                        doc.settings.grid_size.clone(),
                        doc.cards.len().to_string(),
                        doc.sync
                            .remote
                            .as_ref()
                            .map(|m| m.revision.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        format_millis(doc.metadata.updated_at),
                    ]
                })
                .collect();
            print_table(
                &["ID", "NAME", "GRID", "CARDS", "REVISION", "UPDATED"],
                &rows,
                &format!(
                    "No binders for owner {}",
                    session.workspace().config().owner_id
                ),
            );
        }
        OutputFormat::Json => print_json(&documents)?,
    }
    Ok(())
}

pub async fn show(session: &mut Session, args: ShowArgs, format: OutputFormat) -> CommandResult {
    let binder = session.checkout(&args.binder).await?;
    let binder = binder.lock().await;

    let page_count = binder.page_count();
    let pages = match args.page {
        Some(page) if page >= page_count => {
            return Err(format!("Binder has {page_count} pages (0 is the cover)").into());
        }
        Some(page) => page..page + 1,
        None => 0..page_count,
    };

    let mut cards = Vec::new();
    for page in pages {
        for (position, entry) in binder.cards_on_page(page) {
            cards.push((position, binder.grid().slot_of(position), entry));
        }
    }

    match format {
        OutputFormat::Human => {
            println!(
                "{} \"{}\": {} grid, {} pages, {} cards, {}",
                binder.id(),
                binder.name(),
                binder.settings().grid_size,
                page_count,
                binder.store().len(),
                binder.status()
            );
            let rows: Vec<Vec<String>> = cards
                .iter()
                .map(|(position, slot, entry)| {
                    let side = match slot.side {
                        Side::Left => "L",
                        Side::Right => "R",
                    };
                    vec![
                        position.to_string(),
                        slot.page.to_string(),
                        format!("{side} {},{}", slot.row, slot.col),
                        entry.card_id().to_string(),
                        entry.name().to_string(),
                        entry.variant().unwrap_or("").to_string(),
                    ]
                })
                .collect();
            print_table(
                &["POS", "PAGE", "SLOT", "CARD", "NAME", "VARIANT"],
                &rows,
                "(no cards)",
            );
        }
        OutputFormat::Json => {
            let mut json = summary(&binder);
            json["slots"] = cards
                .iter()
                .map(|(position, slot, entry)| {
                    serde_json::json!({
                        "position": position,
                        "page": slot.page,
                        "row": slot.row,
                        "col": slot.col,
                        "card": entry,
                    })
                })
                .collect();
            print_json(&json)?;
        }
    }
    Ok(())
}

pub async fn compact(session: &mut Session, args: CompactArgs, format: OutputFormat) -> CommandResult {
    let binder: SharedBinder = session.checkout(&args.binder).await?;
    let moved = {
        let mut binder = binder.lock().await;
        match args.page {
            Some(page) => binder.compact_page(page),
            None => binder.compact(),
        }
    };
    if moved > 0 {
        session.commit(&binder).await?;
    }

    match format {
        OutputFormat::Human => println!("Moved {moved} cards"),
        OutputFormat::Json => print_json(&serde_json::json!({ "moved": moved }))?,
    }
    Ok(())
}
