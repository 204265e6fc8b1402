//! Model catalog listing.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use echochat_core::catalog;

use crate::state::AppState;

/// List the models sessions can use, marking the configured default.
pub fn list_models(state: &AppState, json: bool) -> Result<()> {
    let models = catalog::available_models();
    let default_model = state.controller.default_model();

    if json {
        println!("{}", serde_json::to_string_pretty(models)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Context").fg(Color::White),
        Cell::new("Tags").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for model in models {
        let id_cell = if model.id == default_model {
            Cell::new(format!("{} (default)", model.id)).fg(Color::Green)
        } else {
            Cell::new(&model.id).fg(Color::Cyan)
        };
        table.add_row(vec![
            id_cell,
            Cell::new(&model.name).fg(Color::White),
            Cell::new(
                model
                    .context_length
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            )
            .fg(Color::DarkGrey),
            Cell::new(model.tags.join(", ")).fg(Color::DarkGrey),
            Cell::new(model.description.as_deref().unwrap_or("")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {}",
        style("Switch a chat's model with /model <id>").dim()
    );
    println!();
    Ok(())
}
