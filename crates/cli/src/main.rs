#![deny(unsafe_code)]
//! CLI binary for the huelab color engine.
//!
//! Subcommands:
//! - `convert`, `contrast`, `name`, `harmony`, `tokens`: single-color tools
//! - `extract`, `gradient-map`, `heatmap`: operate on a PNG/JPEG image
//! - `list`: print presets and mode names

mod error;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use error::CliError;
use huelab_core::contrast::{classify, suggest_accessible_color};
use huelab_core::gradient_map::GradientMapJob;
use huelab_core::params::Params;
use huelab_core::{
    algorithmic_color_naming, assign_extraction_roles, contrast_ratio, extract_dominant_colors,
    find_closest_color_names, harmony, parse_color, parse_color_with_alpha, BlendMode,
    ColorDictionary, DesignTokens, Gradient, GradientMapOptions, GradientPreset, HarmonyMode,
    HeatLevel, HeatmapJob, KMeansConfig, Rgb, Xorshift64,
};
use huelab_imaging::{load_image, proportional_strip, write_image};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Rows mapped between progress checks in `gradient-map`.
const ROWS_PER_CHUNK: usize = 64;
/// Grid rows rated between progress checks in `heatmap`.
const GRID_ROWS_PER_CHUNK: usize = 4;
/// k-means++ seed when neither `--seed` nor `--params` sets one.
const DEFAULT_SEED: u64 = 42;

#[derive(Parser)]
#[command(name = "huelab", about = "Color science toolkit", version)]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log engine progress to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum TokenFormat {
    Json,
    Css,
    Tailwind,
}

#[derive(Subcommand)]
enum Command {
    /// Show a color in every supported notation.
    Convert {
        /// Hex, rgb(), rgba(), hsl() or hsla().
        color: String,
    },
    /// WCAG contrast ratio between a foreground and a background.
    Contrast {
        fg: String,
        bg: String,

        /// Also suggest the nearest foreground reaching this ratio.
        #[arg(long)]
        suggest: Option<f64>,
    },
    /// Descriptive and nearest dictionary names for a color.
    Name {
        color: String,

        /// Number of dictionary matches to show.
        #[arg(long, default_value_t = 3)]
        top: usize,

        /// JSON dictionary file (`[{"name": ..., "hex": ...}]`); defaults to
        /// the built-in CSS names.
        #[arg(long)]
        dictionary: Option<PathBuf>,
    },
    /// Derive a color harmony.
    Harmony {
        color: String,

        #[arg(short, long, default_value = "complementary")]
        mode: HarmonyMode,
    },
    /// Extract dominant colors from an image with k-means.
    Extract {
        image: PathBuf,

        /// Number of clusters (1..=32).
        #[arg(short)]
        k: Option<usize>,

        /// Seed for k-means++ initialization [default: 42].
        #[arg(long)]
        seed: Option<u64>,

        /// Sample every n-th pixel.
        #[arg(long)]
        stride: Option<usize>,

        /// Assign brand roles to the extracted colors.
        #[arg(long)]
        brand: bool,

        /// Clustering options as JSON (`k`, `max_iterations`, `epsilon`,
        /// `sample_stride`, `seed`). Flags take precedence.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Write a proportional palette strip to this image file.
        #[arg(long)]
        swatch: Option<PathBuf>,
    },
    /// Recolor an image through a gradient by luminance.
    GradientMap {
        image: PathBuf,

        /// Stop list, e.g. "#000 0%, #f80 40%, #fff".
        #[arg(long, conflicts_with = "preset")]
        stops: Option<String>,

        /// Built-in gradient name (see `list`).
        #[arg(long)]
        preset: Option<String>,

        #[arg(long)]
        blend: Option<BlendMode>,

        /// Mix of the mapped result over the original, 0..1.
        #[arg(long)]
        intensity: Option<f64>,

        /// Use HSL lightness and interpolation instead of LAB.
        #[arg(long)]
        hsl: bool,

        /// Options as JSON (`intensity`, `blend_mode`, `use_lab`). Flags take
        /// precedence.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Output file path (.png or .jpg).
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Grid of text-contrast levels over an image.
    Heatmap {
        image: PathBuf,

        /// Text color to test against each cell.
        #[arg(long)]
        text: String,

        /// Cell size in pixels.
        #[arg(long, default_value_t = 32)]
        grid: usize,
    },
    /// Design tokens derived from a primary color.
    Tokens {
        color: String,

        #[arg(long, value_enum, default_value_t = TokenFormat::Json)]
        format: TokenFormat,
    },
    /// List gradient presets, blend modes and harmony modes.
    List,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_rgb(input: &str) -> Result<Rgb, CliError> {
    Ok(parse_color(input)?.to_rgb())
}

fn parse_params(raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_dictionary(path: Option<&Path>) -> Result<ColorDictionary, CliError> {
    match path {
        None => Ok(ColorDictionary::builtin()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
            Ok(ColorDictionary::from_json(&text)?)
        }
    }
}

fn resolve_gradient(stops: Option<&str>, preset: Option<&str>) -> Result<Gradient, CliError> {
    match (stops, preset) {
        (Some(stops), _) => Ok(Gradient::parse(stops)?),
        (None, Some(name)) => Gradient::preset(name).ok_or_else(|| {
            CliError::Input(format!(
                "unknown preset '{name}' (available: {})",
                GradientPreset::names().join(", ")
            ))
        }),
        (None, None) => Ok(GradientPreset::all()[0].gradient()),
    }
}

fn level_glyph(level: HeatLevel) -> char {
    match level {
        HeatLevel::Low => '.',
        HeatLevel::Medium => '+',
        HeatLevel::High => '#',
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let json_mode = cli.json;
    match cli.command {
        Command::Convert { color } => {
            let (parsed, alpha) = parse_color_with_alpha(&color)?;
            let rgb = parsed.to_rgb();
            let hsl = rgb.to_hsl();
            let name = algorithmic_color_naming(hsl.h, hsl.s, hsl.l);
            if json_mode {
                print_json(&json!({
                    "input": color,
                    "hex": rgb,
                    "rgb": rgb.to_css(),
                    "hsl": hsl.to_css(),
                    "hsl_values": hsl,
                    "lab": rgb.to_lab(),
                    "lch": rgb.to_lch(),
                    "alpha": alpha,
                    "name": name,
                }))?;
            } else {
                let lab = rgb.to_lab();
                let lch = rgb.to_lch();
                println!("hex    {rgb}");
                println!("rgb    {}", rgb.to_css());
                println!("hsl    {}", hsl.to_css());
                println!("lab    {:.2} {:.2} {:.2}", lab.l, lab.a, lab.b);
                println!("lch    {:.2} {:.2} {:.2}", lch.l, lch.c, lch.h);
                if alpha < 1.0 {
                    println!("alpha  {alpha}");
                }
                println!("name   {name}");
            }
        }
        Command::Contrast { fg, bg, suggest } => {
            let fg = parse_rgb(&fg)?;
            let bg = parse_rgb(&bg)?;
            let ratio = contrast_ratio(fg, bg);
            let result = classify(ratio);
            let suggestion = suggest.map(|min| suggest_accessible_color(fg, bg, min));
            if json_mode {
                print_json(&json!({
                    "foreground": fg,
                    "background": bg,
                    "result": result,
                    "suggestion": suggestion,
                }))?;
            } else {
                let mark = |pass: bool| if pass { "pass" } else { "fail" };
                println!("{fg} on {bg}: {ratio:.2}:1");
                println!("  AA normal   {}", mark(result.aa_normal));
                println!("  AA large    {}", mark(result.aa_large));
                println!("  AAA normal  {}", mark(result.aaa_normal));
                println!("  AAA large   {}", mark(result.aaa_large));
                if let Some(s) = suggestion {
                    println!("suggested foreground {s} ({:.2}:1)", contrast_ratio(s, bg));
                }
            }
        }
        Command::Name {
            color,
            top,
            dictionary,
        } => {
            let rgb = parse_rgb(&color)?;
            let dictionary = load_dictionary(dictionary.as_deref())?;
            let hsl = rgb.to_hsl();
            let descriptive = algorithmic_color_naming(hsl.h, hsl.s, hsl.l);
            let matches = find_closest_color_names(rgb, &dictionary, top);
            if json_mode {
                print_json(&json!({
                    "color": rgb,
                    "descriptive": descriptive,
                    "matches": matches,
                }))?;
            } else {
                println!("{rgb}: {descriptive}");
                for m in &matches {
                    println!("  {:<20} {}  ΔE {:.2}", m.name, m.color, m.distance);
                }
            }
        }
        Command::Harmony { color, mode } => {
            let colors = harmony(parse_rgb(&color)?, mode);
            if json_mode {
                print_json(&json!({ "mode": mode, "colors": colors }))?;
            } else {
                let hexes: Vec<String> = colors.iter().map(|c| c.to_hex()).collect();
                println!("{mode}: {}", hexes.join(" "));
            }
        }
        Command::Extract {
            image,
            k,
            seed,
            stride,
            brand,
            params,
            swatch,
        } => {
            let params = parse_params(&params)?;
            let mut config = KMeansConfig::from_json(&params)?;
            let seed = match seed {
                Some(seed) => seed,
                None => Params::new(&params)?.u64("seed", DEFAULT_SEED)?,
            };
            if let Some(k) = k {
                config.k = k;
            }
            if let Some(stride) = stride {
                config.sample_stride = stride;
            }
            let buffer = load_image(&image)?;
            let mut extraction =
                extract_dominant_colors(&buffer, &config, &mut Xorshift64::new(seed), None)?;
            if brand {
                assign_extraction_roles(&mut extraction);
            }
            if let Some(path) = &swatch {
                write_image(&proportional_strip(&extraction.clusters, 400, 60)?, path)?;
            }

            if json_mode {
                print_json(&extraction)?;
            } else {
                for c in &extraction.clusters {
                    let role = c.role.map(|r| format!("  {r}")).unwrap_or_default();
                    println!("{}  {:>6.2}%{role}", c.color, c.percentage);
                }
                if let Some(w) = extraction.warning {
                    eprintln!(
                        "warning: not converged after {} iterations (last shift {:.2})",
                        w.iterations, w.max_shift
                    );
                }
                if let Some(path) = swatch {
                    eprintln!("swatch -> {}", path.display());
                }
            }
        }
        Command::GradientMap {
            image,
            stops,
            preset,
            blend,
            intensity,
            hsl,
            params,
            output,
        } => {
            let gradient = resolve_gradient(stops.as_deref(), preset.as_deref())?;
            let mut options = GradientMapOptions::from_json(&parse_params(&params)?)?;
            if let Some(mode) = blend {
                options.blend_mode = mode;
            }
            if let Some(intensity) = intensity {
                options.intensity = intensity;
            }
            if hsl {
                options.use_lab = false;
            }
            options.validate()?;

            let buffer = load_image(&image)?;
            let mut job = GradientMapJob::new(&buffer, &gradient, options);
            while !job.step(ROWS_PER_CHUNK) {
                tracing::debug!(progress = job.progress(), "gradient map");
            }
            write_image(&job.finish(), &output)?;

            if json_mode {
                print_json(&json!({
                    "input": image.display().to_string(),
                    "output": output.display().to_string(),
                    "width": buffer.width(),
                    "height": buffer.height(),
                    "options": options,
                    "stops": gradient,
                }))?;
            } else {
                eprintln!(
                    "mapped {} ({}x{}, {}, intensity {}) -> {}",
                    image.display(),
                    buffer.width(),
                    buffer.height(),
                    options.blend_mode,
                    options.intensity,
                    output.display()
                );
            }
        }
        Command::Heatmap { image, text, grid } => {
            let text = parse_rgb(&text)?;
            let buffer = load_image(&image)?;
            let mut job = HeatmapJob::new(&buffer, text, grid)?;
            while !job.step(GRID_ROWS_PER_CHUNK) {
                tracing::debug!(progress = job.progress(), "heatmap");
            }
            let heatmap = job.finish();
            if json_mode {
                print_json(&heatmap)?;
            } else {
                for row in 0..heatmap.rows {
                    let line: String = (0..heatmap.columns)
                        .filter_map(|col| heatmap.cell(col, row))
                        .map(|cell| cell.level().map_or(' ', level_glyph))
                        .collect();
                    println!("{line}");
                }
                let (low, medium, high) = heatmap.level_shares();
                println!("low {low:.1}%  medium {medium:.1}%  high {high:.1}%");
            }
        }
        Command::Tokens { color, format } => {
            let tokens = DesignTokens::from_primary(parse_rgb(&color)?);
            match format {
                TokenFormat::Json => print_json(&tokens)?,
                TokenFormat::Css => print!("{}", tokens.to_css_variables()),
                TokenFormat::Tailwind => print!("{}", tokens.to_tailwind_config()),
            }
        }
        Command::List => {
            let presets = GradientPreset::names();
            let blends: Vec<&str> = BlendMode::ALL.iter().map(|m| m.as_str()).collect();
            let harmonies: Vec<&str> = HarmonyMode::ALL.iter().map(|m| m.as_str()).collect();
            if json_mode {
                print_json(&json!({
                    "gradient_presets": presets,
                    "blend_modes": blends,
                    "harmony_modes": harmonies,
                }))?;
            } else {
                println!("Gradient presets:\n  {}", presets.join(", "));
                println!("Blend modes:\n  {}", blends.join(", "));
                println!("Harmony modes:\n  {}", harmonies.join(", "));
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
