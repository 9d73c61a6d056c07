use anyhow::{bail, Result};
use clap::{command, Arg, ArgAction, ArgMatches, Command};
use std::{net::IpAddr, path::PathBuf, time::Duration};

use crate::validators::*;
use offline_tiles::{
    serve::DEFAULT_PORT, Area, BoundingBox, Config, Preset, TileSource, DEFAULT_OUTPUT_FOLDER,
};

const FETCH_CMD: &str = "fetch";
const MENU_CMD: &str = "menu";
const SERVE_CMD: &str = "serve";

const ZOOM_ARG: &str = "zoom";
const OUTPUT_DIR_ARG: &str = "output_dir";
const PRESET_ARG: &str = "preset";
const BBOX_NORTH_ARG: &str = "north";
const BBOX_SOUTH_ARG: &str = "south";
const BBOX_WEST_ARG: &str = "west";
const BBOX_EAST_ARG: &str = "east";
const MIN_ZOOM_ARG: &str = "min_zoom";
const MAX_ZOOM_ARG: &str = "max_zoom";
const SOURCE_ARG: &str = "source";
const TIMEOUT_ARG: &str = "timeout";
const DELAY_ARG: &str = "delay";
const DRY_RUN_ARG: &str = "dry_run";
const PARALLEL_FETCHES_ARG: &str = "num_parallel";
const ASSUME_YES_ARG: &str = "assume_yes";
const ROOT_ARG: &str = "root";
const PORT_ARG: &str = "port";
const BIND_ARG: &str = "bind";

/// Parallel fetches and request delay used by the interactive menu.
const MENU_PARALLEL_FETCHES: usize = 3;
const MENU_DELAY: Duration = Duration::from_millis(500);

pub enum Args {
    Fetch(FetchArgs),
    Menu(Config),
    Serve(ServeArgs),
}

pub struct FetchArgs {
    pub config: Config,
    pub area: Area,
    pub sources: Vec<TileSource>,
    pub assume_yes: bool,
    pub dry_run: bool,
}

pub struct ServeArgs {
    pub root: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
}

impl Args {
    pub fn parse() -> Result<Self> {
        let matches = cli().get_matches();

        match matches.subcommand() {
            Some((FETCH_CMD, matches)) => Ok(Args::Fetch(FetchArgs::from_matches(matches)?)),
            Some((SERVE_CMD, matches)) => Ok(Args::Serve(ServeArgs::from_matches(matches))),
            Some((MENU_CMD, matches)) => Ok(Args::Menu(menu_config(matches))),
            // no subcommand drops into the menu
            _ => Ok(Args::Menu(menu_config(&matches))),
        }
    }
}

impl FetchArgs {
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let preset = matches.get_one::<Preset>(PRESET_ARG).copied();

        let bounding_box = match preset {
            // if a preset is specified, construct the bounding box from that
            Some(preset) => preset.bounding_box(),
            // otherwise, parse the 4 coords separately
            None => BoundingBox::new(
                coord(matches, BBOX_SOUTH_ARG),
                coord(matches, BBOX_WEST_ARG),
                coord(matches, BBOX_NORTH_ARG),
                coord(matches, BBOX_EAST_ARG),
            )?,
        };

        let (min_zoom, max_zoom) = match (
            matches.get_one::<u8>(ZOOM_ARG),
            matches.get_one::<u8>(MIN_ZOOM_ARG),
            matches.get_one::<u8>(MAX_ZOOM_ARG),
        ) {
            // if `zoom` is set, use it for both min/max
            (Some(&zoom), _, _) => (zoom, zoom),
            (None, Some(&min), Some(&max)) => (min, max),
            // presets bring their own zoom range
            (None, min, max) => match preset {
                Some(preset) => {
                    let (preset_min, preset_max) = preset.zoom_range();
                    (
                        min.copied().unwrap_or(preset_min),
                        max.copied().unwrap_or(preset_max),
                    )
                }
                None => bail!("either --zoom or both --min-zoom and --max-zoom are required"),
            },
        };

        let mut sources = Vec::new();
        for &source in matches
            .get_many::<Vec<TileSource>>(SOURCE_ARG)
            .into_iter()
            .flatten()
            .flatten()
        {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }

        Ok(Self {
            config: Config {
                output_folder: output_dir(matches),
                max_workers: *matches.get_one::<usize>(PARALLEL_FETCHES_ARG).unwrap_or(&1),
                delay: Duration::from_millis(
                    *matches.get_one::<usize>(DELAY_ARG).unwrap_or(&0) as u64,
                ),
                timeout: Duration::from_secs(
                    *matches.get_one::<usize>(TIMEOUT_ARG).unwrap_or(&0) as u64,
                ),
                ..Config::default()
            },
            area: Area::new(bounding_box, min_zoom, max_zoom)?,
            sources,
            assume_yes: matches.get_flag(ASSUME_YES_ARG),
            dry_run: matches.get_flag(DRY_RUN_ARG),
        })
    }
}

impl ServeArgs {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            root: matches
                .get_one::<PathBuf>(ROOT_ARG)
                .cloned()
                .unwrap_or_else(|| PathBuf::from(".")),
            bind: *matches
                .get_one::<IpAddr>(BIND_ARG)
                .unwrap_or(&IpAddr::from([127, 0, 0, 1])),
            port: *matches.get_one::<u16>(PORT_ARG).unwrap_or(&DEFAULT_PORT),
        }
    }
}

fn menu_config(matches: &ArgMatches) -> Config {
    Config {
        output_folder: output_dir(matches),
        max_workers: MENU_PARALLEL_FETCHES,
        delay: MENU_DELAY,
        ..Config::default()
    }
}

// Required unless a preset is given, which clap enforces.
fn coord(matches: &ArgMatches, id: &str) -> f64 {
    matches.get_one::<f64>(id).copied().unwrap_or_default()
}

fn output_dir(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>(OUTPUT_DIR_ARG)
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FOLDER))
}

fn output_arg() -> Arg {
    Arg::new(OUTPUT_DIR_ARG)
        .help("The folder to store the tile tree in ({source}/{z}/{x}/{y}.ext)")
        .value_parser(clap::value_parser!(PathBuf))
        .default_value(DEFAULT_OUTPUT_FOLDER)
        .global(true)
        .short('o')
        .long("output")
}

fn cli() -> Command {
    command!()
        .arg(output_arg())
        .subcommand(fetch_command())
        .subcommand(
            Command::new(MENU_CMD)
                .about("Pick a preset area or enter one interactively (default)"),
        )
        .subcommand(serve_command())
}

fn fetch_command() -> Command {
    let bbox_arg = |id: &'static str, help: &'static str, short: char| {
        Arg::new(id)
            .help(help)
            .required_unless_present(PRESET_ARG)
            .conflicts_with(PRESET_ARG)
            .allow_hyphen_values(true)
            .short(short)
            .long(id)
    };

    Command::new(FETCH_CMD)
        .about("Fetch the tiles covering an area")
        .arg(
            bbox_arg(BBOX_NORTH_ARG, "Latitude of north bounding box boundary (in degrees)", 'n')
                .value_parser(is_latitude),
        )
        .arg(
            bbox_arg(BBOX_SOUTH_ARG, "Latitude of south bounding box boundary (in degrees)", 's')
                .value_parser(is_latitude),
        )
        .arg(
            bbox_arg(BBOX_EAST_ARG, "Longitude of east bounding box boundary (in degrees)", 'e')
                .value_parser(is_longitude),
        )
        .arg(
            bbox_arg(BBOX_WEST_ARG, "Longitude of west bounding box boundary (in degrees)", 'w')
                .value_parser(is_longitude),
        )
        .arg(
            Arg::new(PRESET_ARG)
                .help("Use a known, named area (altai, altai-large, crimea, baikal)")
                .value_parser(is_preset)
                .short('p')
                .long("preset"),
        )
        .arg(
            Arg::new(SOURCE_ARG)
                .help("The map type to fetch: terrain, satellite, osm or all. May be repeated.")
                .value_parser(is_sources)
                .action(ArgAction::Append)
                .default_value("terrain")
                .short('m')
                .long("source"),
        )
        .arg(
            Arg::new(PARALLEL_FETCHES_ARG)
                .help("The amount of tiles fetched in parallel.")
                .value_parser(is_numeric_min(1))
                .default_value("4")
                .short('r')
                .long("workers")
                .visible_alias("rate"),
        )
        .arg(
            Arg::new(DELAY_ARG)
                .help("Pause (in milliseconds) before each tile request.")
                .value_parser(is_numeric_min(0))
                .default_value("100")
                .short('d')
                .long("delay"),
        )
        .arg(
            Arg::new(TIMEOUT_ARG)
                .help("The timeout (in seconds) for fetching a single tile. Pass 0 for no timeout.")
                .value_parser(is_numeric_min(0))
                .default_value("10")
                .short('t')
                .long("timeout"),
        )
        .arg(
            Arg::new(MIN_ZOOM_ARG)
                .help("The minimum zoom level to fetch")
                .value_parser(is_zoom)
                .long("min-zoom"),
        )
        .arg(
            Arg::new(MAX_ZOOM_ARG)
                .help("The maximum zoom level to fetch")
                .value_parser(is_zoom)
                .long("max-zoom"),
        )
        .arg(
            Arg::new(ZOOM_ARG)
                .help("Only fetch a single zoom level (implies min=x/max=x)")
                .value_parser(is_zoom)
                .conflicts_with_all([MIN_ZOOM_ARG, MAX_ZOOM_ARG])
                .long("zoom")
                .short('z'),
        )
        .arg(
            Arg::new(ASSUME_YES_ARG)
                .help("Don't ask before fetching large areas")
                .action(ArgAction::SetTrue)
                .short('y')
                .long("yes"),
        )
        .arg(
            Arg::new(DRY_RUN_ARG)
                .help("Don't actually fetch anything, just determine how many tiles would be fetched.")
                .action(ArgAction::SetTrue)
                .long("dry-run"),
        )
}

fn serve_command() -> Command {
    Command::new(SERVE_CMD)
        .about("Serve the downloaded tiles over HTTP for offline viewing")
        .arg(
            Arg::new(ROOT_ARG)
                .help("The directory to serve; tiles are expected in its `tiles` folder")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(".")
                .long("root"),
        )
        .arg(
            Arg::new(PORT_ARG)
                .help("The port to listen on")
                .value_parser(clap::value_parser!(u16))
                .default_value("8000")
                .long("port"),
        )
        .arg(
            Arg::new(BIND_ARG)
                .help("The address to listen on")
                .value_parser(clap::value_parser!(IpAddr))
                .default_value("127.0.0.1")
                .long("bind"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn fetch_with_coordinates() {
        let matches = cli()
            .try_get_matches_from([
                "offline-tiles", "fetch", "-s", "50.0", "-w", "86.0", "-n", "51.0", "-e", "87.5",
                "-z", "8", "-m", "osm", "-m", "satellite",
            ])
            .unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        let args = FetchArgs::from_matches(matches).unwrap();

        assert_eq!(args.area.tile_count(), 4);
        assert_eq!(args.sources, vec![TileSource::Osm, TileSource::Satellite]);
        assert_eq!(args.config.max_workers, 4);
        assert_eq!(args.config.delay, Duration::from_millis(100));
        assert!(!args.assume_yes);
    }

    #[test]
    fn fetch_with_preset_uses_its_zoom() {
        let matches = cli()
            .try_get_matches_from(["offline-tiles", "fetch", "--preset", "baikal", "-m", "all"])
            .unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        let args = FetchArgs::from_matches(matches).unwrap();

        assert_eq!((args.area.min_zoom, args.area.max_zoom), (8, 11));
        assert_eq!(args.sources.len(), 3);
    }

    #[test]
    fn fetch_without_zoom_is_rejected() {
        let matches = cli()
            .try_get_matches_from([
                "offline-tiles", "fetch", "-s", "1", "-w", "1", "-n", "2", "-e", "2",
            ])
            .unwrap();
        let (_, matches) = matches.subcommand().unwrap();

        assert!(FetchArgs::from_matches(matches).is_err());
    }

    #[test]
    fn output_is_accepted_before_and_after_the_subcommand() {
        for argv in [
            ["offline-tiles", "-o", "maps", "fetch", "--preset", "crimea"],
            ["offline-tiles", "fetch", "--preset", "crimea", "-o", "maps"],
        ] {
            let matches = cli().try_get_matches_from(argv).unwrap();
            let (_, matches) = matches.subcommand().unwrap();
            let args = FetchArgs::from_matches(matches).unwrap();

            assert_eq!(args.config.output_folder, PathBuf::from("maps"));
        }
    }

    #[test]
    fn menu_uses_global_output() {
        let matches = cli()
            .try_get_matches_from(["offline-tiles", "--output", "maps", "menu"])
            .unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        let config = menu_config(matches);

        assert_eq!(config.output_folder, PathBuf::from("maps"));
        assert_eq!(config.max_workers, MENU_PARALLEL_FETCHES);
    }

    #[test]
    fn preset_conflicts_with_coordinates() {
        assert!(cli()
            .try_get_matches_from(["offline-tiles", "fetch", "--preset", "crimea", "-n", "50"])
            .is_err());
    }
}
