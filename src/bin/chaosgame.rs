// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate chaosgame;
extern crate clap;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate num_cpus;

use chaosgame::{output, presets, CancelToken, ColorMaps, Config, RenderSettings, Renderer};
use clap::{App, Arg, ArgMatches};
use env_logger::Env;
use failure::{format_err, Error};
use std::str::FromStr;
use std::time::Duration;

fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| format_err!("Could not parse {}", name))
}

const CONFIG: &str = "config";
const PRESET: &str = "preset";
const COLORMAPS: &str = "colormaps";
const OUTPUT: &str = "output";
const SIZE: &str = "size";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const SEED: &str = "seed";
const FRAMES: &str = "frames";
const CADENCE: &str = "cadence";

const DEFAULT_PRESET: &str = "leaf";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();
    let presets = presets::names();

    App::new("chaosgame")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Iterated function system renderer")
        .arg(
            Arg::with_name(CONFIG)
                .long(CONFIG)
                .short("c")
                .takes_value(true)
                .conflicts_with(PRESET)
                .help("Scene file to render"),
        )
        .arg(
            Arg::with_name(PRESET)
                .long(PRESET)
                .short("p")
                .takes_value(true)
                .possible_values(&presets)
                .help("Built-in scene to render (the default is 'leaf')"),
        )
        .arg(
            Arg::with_name(COLORMAPS)
                .long(COLORMAPS)
                .short("m")
                .takes_value(true)
                .help("File of color maps the scene can name"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("out.png")
                .help("Output PNG file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("512x512")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of workers (defaults to one per core)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("25000000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u64,
                        100_000_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 100000000000",
                    )
                })
                .help("Iterations per worker, including the fuse"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    u64::from_str(&s)
                        .map(|_| ())
                        .map_err(|_| "Could not parse seed".to_string())
                })
                .help("Random seed for calibration and workers"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        100_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 100000",
                    )
                })
                .help("Preview: rewrite the output this many times while rendering, then stop"),
        )
        .arg(
            Arg::with_name(CADENCE)
                .long(CADENCE)
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u64,
                        3_600_000,
                        "Could not parse cadence",
                        "Cadence must be between 1 and 3600000 milliseconds",
                    )
                })
                .help("Milliseconds between preview frames"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let maps = match matches.value_of(COLORMAPS) {
        Some(path) => ColorMaps::read(path)?,
        None => ColorMaps::default(),
    };
    let config = match matches.value_of(CONFIG) {
        Some(path) => {
            info!("reading scene {}", path);
            Config::read(path, &maps)?
        }
        None => {
            let name = matches.value_of(PRESET).unwrap_or(DEFAULT_PRESET);
            info!("using preset {}", name);
            presets::config(name, &maps)?
        }
    };

    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| format_err!("Could not parse output image size"))?;
    let threads = match matches.value_of(THREADS) {
        Some(_) => value(matches, THREADS)?,
        None => num_cpus::get(),
    };
    let settings = RenderSettings {
        width,
        height,
        threads,
        iterations: value(matches, ITERATIONS)?,
        seed: value(matches, SEED)?,
        cadence: Duration::from_millis(value(matches, CADENCE)?),
    };
    let renderer = Renderer::new(&config, settings)?;
    let output = matches.value_of(OUTPUT).unwrap_or("out.png");

    let frame = match matches.value_of(FRAMES) {
        None => renderer.render()?,
        Some(_) => {
            let frames: u32 = value(matches, FRAMES)?;
            let mut shown = 0;
            let mut preview = |bgra: &[u8], width: usize, height: usize| {
                shown += 1;
                if let Err(e) = output::write_rgb(output, &output::bgra_to_rgb(bgra), width, height)
                {
                    error!("{}", e);
                    return -1;
                }
                info!("wrote preview {} of {}", shown, frames);
                if shown >= frames {
                    -1
                } else {
                    0
                }
            };
            renderer.render_interactive(&mut preview, &CancelToken::new())?
        }
    };

    output::write_png(output, &frame)?;
    info!("wrote {}", output);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run(&args()) {
        eprintln!("chaosgame: {}", e);
        for cause in e.iter_causes() {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}
