// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![allow(clippy::uninlined_format_args)]

use std::path;

use svg2pptx::config::{Config, FontMissingPolicy, OutputTarget};

fn main() {
    if let Err(e) = process() {
        eprintln!("Error: {}.", e);
        std::process::exit(1);
    }
}

fn timed<F, T>(perf: bool, name: &str, mut f: F) -> T
where
    F: FnMut() -> T,
{
    let now = std::time::Instant::now();
    let result = f();
    if perf {
        let elapsed = now.elapsed().as_micros() as f64 / 1000.0;
        println!("{}: {:.2}ms", name, elapsed);
    }
    result
}

fn process() -> Result<(), String> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            println!("{}", HELP);
            return Err(e);
        }
    };

    if !args.quiet {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Warn);
        }
    }

    let svg_data = timed(args.perf, "Reading", || -> Result<Vec<u8>, String> {
        if let InputFrom::File(ref file) = args.in_svg {
            std::fs::read(file).map_err(|_| "failed to open the provided file".to_string())
        } else {
            use std::io::Read;
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(|_| "failed to read stdin".to_string())?;
            Ok(buf)
        }
    })?;

    let result = timed(args.perf, "Converting", || svg2pptx::convert(&svg_data, &args.config))
        .map_err(|e| e.to_string())?;

    if !args.quiet {
        for w in &result.warnings {
            eprintln!("Warning (at {}): {}", w.element_path, w.message);
        }
    }
    if args.perf {
        println!(
            "Elements: {}  Slides: {}  Elapsed: {}ms",
            result.metrics.element_count, result.metrics.slide_count, result.metrics.elapsed_ms
        );
    }

    timed(args.perf, "Writing", || std::fs::write(&args.out_pptx, &result.pptx_bytes))
        .map_err(|_| "failed to write the output file".to_string())?;

    Ok(())
}

const HELP: &str = "\
svg2pptx converts SVG documents into native-vector PowerPoint slides.

USAGE:
  svg2pptx [OPTIONS] <in-svg> <out-pptx>
  svg2pptx [OPTIONS] -                    # read SVG from stdin

  svg2pptx in.svg out.pptx
  svg2pptx --output-target quality in.svg out.pptx

OPTIONS:
      --help                    Prints this help
  -V, --version                 Prints version

      --output-target TARGET    Rendering-fidelity profile
                                [default: balanced] [possible values: speed,
                                balanced, quality, compatibility]
      --dpi DPI                 Sets the default resolution used to resolve
                                physical length units
                                [default: 96]
      --slide-width EMU         Slide width in EMU
                                [default: 9144000]
      --slide-height EMU        Slide height in EMU
                                [default: 6858000]
      --font-missing POLICY     What to do when a referenced font can't be
                                resolved
                                [default: fallback] [possible values: error,
                                fallback, outline]
      --use-fonts-dir PATH      Loads all fonts from the specified directory
                                into the Font Service. Can be set multiple
                                times
      --deterministic           Fixes ZIP timestamps and relationship ids so
                                identical input produces identical output

      --perf                    Prints performance stats
      --quiet                   Disables warnings

ARGS:
  <in-svg>                      Input file, or '-' for stdin
  <out-pptx>                    Output file
";

struct Args {
    in_svg: InputFrom,
    out_pptx: path::PathBuf,
    perf: bool,
    quiet: bool,
    config: Config,
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom {
    Stdin,
    File(path::PathBuf),
}

fn parse_args() -> Result<Args, String> {
    let mut input = pico_args::Arguments::from_env();

    if input.contains("--help") {
        print!("{}", HELP);
        std::process::exit(0);
    }
    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let output_target = input
        .opt_value_from_fn("--output-target", parse_output_target)
        .map_err(|e| e.to_string())?
        .unwrap_or_default();
    let dpi = input.opt_value_from_str("--dpi").map_err(|e| e.to_string())?;
    let slide_width = input.opt_value_from_str("--slide-width").map_err(|e| e.to_string())?;
    let slide_height = input.opt_value_from_str("--slide-height").map_err(|e| e.to_string())?;
    let font_missing = input
        .opt_value_from_fn("--font-missing", parse_font_missing)
        .map_err(|e| e.to_string())?
        .unwrap_or_default();
    let font_dirs: Vec<String> = input.values_from_str("--use-fonts-dir").map_err(|e| e.to_string())?;
    let deterministic = input.contains("--deterministic");
    let perf = input.contains("--perf");
    let quiet = input.contains("--quiet");

    let in_svg: String = input.free_from_str().map_err(|e| e.to_string())?;
    let out_pptx: String = input.free_from_str().map_err(|e| e.to_string())?;

    let mut config = Config { output_target, font_missing, font_sources: font_dirs, deterministic, ..Config::default() };
    if let Some(dpi) = dpi {
        config.default_dpi = dpi;
    }
    if let (Some(w), Some(h)) = (slide_width, slide_height) {
        config.slide_dimensions_emu = (w, h);
    }

    let in_svg = if in_svg == "-" { InputFrom::Stdin } else { InputFrom::File(in_svg.into()) };

    Ok(Args { in_svg, out_pptx: out_pptx.into(), perf, quiet, config })
}

fn parse_output_target(s: &str) -> Result<OutputTarget, String> {
    match s {
        "speed" => Ok(OutputTarget::Speed),
        "balanced" => Ok(OutputTarget::Balanced),
        "quality" => Ok(OutputTarget::Quality),
        "compatibility" => Ok(OutputTarget::Compatibility),
        _ => Err(format!("unknown output target '{}'", s)),
    }
}

fn parse_font_missing(s: &str) -> Result<FontMissingPolicy, String> {
    match s {
        "error" => Ok(FontMissingPolicy::Error),
        "fallback" => Ok(FontMissingPolicy::FallbackFamily("Arial".to_string())),
        "outline" => Ok(FontMissingPolicy::Outline),
        _ => Err(format!("unknown font-missing policy '{}'", s)),
    }
}

/// A simple stderr logger, matching the teacher's CLI logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::LevelFilter::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() { record.target() } else { record.module_path().unwrap_or_default() };
            let line = record.line().unwrap_or(0);
            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, record.args()),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, record.args()),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, record.args()),
            }
        }
    }

    fn flush(&self) {}
}
