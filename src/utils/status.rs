use crate::config::Config;
use crate::models::{fire::Fire, overlay::OverlayKind};
use crate::utils::style::colour_bar;
use comfy_table::{Attribute, Cell, CellAlignment, Table};

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| {
            Cell::new(label)
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center)
        })
        .collect()
}

pub fn print_overlay_summary(config: &Config) {
    let mut table = Table::new();
    table
        .set_header(header(&["Overlay", "Title", "Classes", "Raster", "Colourbar"]))
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    for kind in OverlayKind::ALL {
        let profile = kind.profile();
        table.add_row(vec![
            Cell::new(kind.key()),
            Cell::new(profile.title),
            Cell::new(profile.legend.len()).set_alignment(CellAlignment::Center),
            Cell::new(config.api_url(&kind.raster_path(&config.fire_id))),
            Cell::new(colour_bar(&profile.colour_table)),
        ]);
    }

    println!("\nOverlay summary:\n{}", table);
}

pub fn print_fire_summary(fires: &[Fire], from_fallback: bool) {
    let mut table = Table::new();
    table
        .set_header(header(&["Fire", "Name", "State", "Year", "Acres"]))
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    for fire in fires {
        let year = fire
            .resolved_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&fire.id),
            Cell::new(&fire.name),
            Cell::new(&fire.state).set_alignment(CellAlignment::Center),
            Cell::new(year).set_alignment(CellAlignment::Center),
            Cell::new(format!("{:.0}", fire.acres)).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("\nFire catalog:\n{}", table);

    if from_fallback {
        println!("\nWarnings:");
        println!("  ⚠️ Backend unreachable, showing the built-in fire catalog");
    }

    println!();
}
