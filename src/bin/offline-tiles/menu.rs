use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::io;

use offline_tiles::{Area, BoundingBox, Error, Preset, TileSource, MAX_ZOOM};

/// The area and map types picked in the interactive menu.
pub struct Selection {
    pub name: String,
    pub area: Area,
    pub sources: Vec<TileSource>,
}

/// Asks for an area and the map types to fetch. Returns `None` if the user
/// chose to exit.
pub fn select() -> Result<Option<Selection>> {
    let theme = ColorfulTheme::default();

    let mut items: Vec<&str> = Preset::ALL.iter().map(|preset| preset.title()).collect();
    items.push("Custom area (enter coordinates)");
    items.push("Exit");

    let choice = Select::with_theme(&theme)
        .with_prompt("Select the area to download")
        .items(&items)
        .default(0)
        .interact()
        .map_err(prompt_error)?;

    let (name, area) = match Preset::ALL.get(choice) {
        Some(preset) => (preset.title().to_owned(), preset.area()),
        None if choice == Preset::ALL.len() => ("Custom area".to_owned(), custom_area(&theme)?),
        None => return Ok(None),
    };

    let map_types = ["Terrain", "Satellite", "OpenStreetMap", "All of the above"];
    let map_choice = Select::with_theme(&theme)
        .with_prompt(format!("Map type for {}", name))
        .items(&map_types)
        .default(0)
        .interact()
        .map_err(prompt_error)?;

    let sources = match map_choice {
        0 => vec![TileSource::Terrain],
        1 => vec![TileSource::Satellite],
        2 => vec![TileSource::Osm],
        _ => TileSource::ALL.to_vec(),
    };

    Ok(Some(Selection {
        name,
        area,
        sources,
    }))
}

/// Asks whether a job of `total` tiles should proceed. Any prompt failure
/// counts as "no".
pub fn confirm_large_job(total: usize) -> bool {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "This area covers {} tiles, which is a lot for the tile servers. Continue?",
            total
        ))
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn custom_area(theme: &ColorfulTheme) -> Result<Area> {
    let south = coordinate(theme, "Minimum latitude", 90.0)?;
    let west = coordinate(theme, "Minimum longitude", 180.0)?;
    let north = coordinate(theme, "Maximum latitude", 90.0)?;
    let east = coordinate(theme, "Maximum longitude", 180.0)?;
    let min_zoom = zoom(theme, "Minimum zoom (usually 7-10)", 8)?;
    let max_zoom = zoom(theme, "Maximum zoom (usually 11-14)", 12)?;

    let bounding_box = BoundingBox::new(south, west, north, east)?;
    Area::new(bounding_box, min_zoom, max_zoom).context("invalid zoom range")
}

fn coordinate(theme: &ColorfulTheme, prompt: &str, limit: f64) -> Result<f64> {
    Input::<f64>::with_theme(theme)
        .with_prompt(prompt)
        .validate_with(|v: &f64| {
            if v.abs() <= limit {
                Ok(())
            } else {
                Err(format!("must be within [-{0}, {0}]", limit))
            }
        })
        .interact_text()
        .map_err(prompt_error)
}

fn zoom(theme: &ColorfulTheme, prompt: &str, default: u8) -> Result<u8> {
    Input::<u8>::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .validate_with(|v: &u8| {
            if *v <= MAX_ZOOM {
                Ok(())
            } else {
                Err(format!("must be <= {}", MAX_ZOOM))
            }
        })
        .interact_text()
        .map_err(prompt_error)
}

// Ctrl-C while a prompt owns the terminal surfaces as an interrupted read.
fn prompt_error(e: dialoguer::Error) -> anyhow::Error {
    match e {
        dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => {
            Error::Interrupted.into()
        }
        e => anyhow::Error::new(e).context("failed reading input"),
    }
}
