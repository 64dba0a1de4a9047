use binderkit::GridRegistry;

use super::CommandResult;
use crate::output::{OutputFormat, print_json, print_table};

/// List the grid sizes new binders can use.
pub fn run(format: OutputFormat) -> CommandResult {
    let grids = GridRegistry::default();
    let mut sizes = Vec::new();
    for name in grids.names() {
        sizes.push((name.to_string(), grids.get(name)?));
    }

    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = sizes
                .iter()
                .map(|(name, size)| {
                    let default = if name == grids.default_name() { "*" } else { "" };
                    vec![
                        name.clone(),
                        size.rows().to_string(),
                        size.cols().to_string(),
                        size.cards_per_page().to_string(),
                        default.to_string(),
                    ]
                })
                .collect();
            print_table(&["NAME", "ROWS", "COLS", "PER PAGE", "DEFAULT"], &rows, "");
        }
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = sizes
                .iter()
                .map(|(name, size)| {
                    serde_json::json!({
                        "name": name,
                        "rows": size.rows(),
                        "cols": size.cols(),
                        "cardsPerPage": size.cards_per_page(),
                        "default": name == grids.default_name(),
                    })
                })
                .collect();
            print_json(&json)?;
        }
    }
    Ok(())
}
