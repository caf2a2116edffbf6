use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};

use lte_core::{
    ColorGroup, Document, Edit, LayerInfo, NodePath, RgbaColor, ShapeInfo, ShapeKind,
    group_colors, list_layers, parse_hex_rgb,
};
use lte_editor::input::HexField;
use lte_editor::{EditorConfig, EditorSession, MemoryStore};

#[derive(Parser, Debug)]
#[command(name = "lte", version, about = "Inspect and recolor Lottie animations")]
struct Cli {
    /// Animation JSON file.
    file: PathBuf,

    /// Write edits here instead of overwriting FILE.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty-print written JSON.
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    /// Print listings as JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Canvas size, frame rate and layer counts.
    Info,
    /// Layer tree with shape paths.
    Layers,
    /// Every fill/stroke color, grouped.
    Colors,
    /// Describe the shape at PATH.
    Shape { path: NodePath },
    /// Set the color of the fill/stroke at PATH.
    SetColor {
        path: NodePath,
        hex: String,
        /// Alpha to write; defaults to the shape's current alpha.
        #[arg(long, value_parser = finite_f64)]
        alpha: Option<f64>,
    },
    /// Replace one color everywhere, keyframes included.
    ReplaceColor {
        from: String,
        to: String,
        /// Alpha of the color to match.
        #[arg(long, default_value_t = 1.0, value_parser = finite_f64)]
        alpha: f64,
        /// Alpha to write; defaults to --alpha.
        #[arg(long, value_parser = finite_f64)]
        to_alpha: Option<f64>,
    },
    /// Hide the layer at PATH.
    Hide { path: NodePath },
    /// Show the layer at PATH.
    Show { path: NodePath },
    /// Flip the hidden flag of the layer at PATH.
    Toggle { path: NodePath },
    /// Delete a top-level layer (`layers.<i>`).
    DeleteLayer { path: NodePath },
    /// Set the canvas size.
    Resize { width: u32, height: u32 },
    /// Set the frame rate.
    Framerate {
        #[arg(value_parser = finite_f64)]
        framerate: f64,
    },
    /// Apply a JSON array of edits from a file.
    Apply { edits: PathBuf },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let doc = read_document(&cli.file)?;

    let edits = match &cli.cmd {
        Command::Info => return cmd_info(&doc, cli.json),
        Command::Layers => return cmd_layers(&doc, cli.json),
        Command::Colors => return cmd_colors(&doc, cli.json),
        Command::Shape { path } => return cmd_shape(&doc, path, cli.json),
        Command::SetColor { path, hex, alpha } => {
            vec![set_color_edit(&doc, path, hex, *alpha)?]
        }
        Command::ReplaceColor {
            from,
            to,
            alpha,
            to_alpha,
        } => {
            let from = RgbaColor::new(0, 0, 0, *alpha).with_rgb(hex_arg(from)?);
            let to = RgbaColor::new(0, 0, 0, to_alpha.unwrap_or(*alpha)).with_rgb(hex_arg(to)?);
            vec![Edit::ReplaceColor { from, to }]
        }
        Command::Hide { path } => vec![Edit::SetLayerHidden {
            path: path.clone(),
            hidden: true,
        }],
        Command::Show { path } => vec![Edit::SetLayerHidden {
            path: path.clone(),
            hidden: false,
        }],
        Command::Toggle { path } => vec![Edit::ToggleLayerHidden { path: path.clone() }],
        Command::DeleteLayer { path } => vec![Edit::DeleteLayer { path: path.clone() }],
        Command::Resize { width, height } => vec![Edit::SetDimensions {
            width: *width,
            height: *height,
        }],
        Command::Framerate { framerate } => vec![Edit::SetFramerate {
            framerate: *framerate,
        }],
        Command::Apply { edits } => read_edits(edits)?,
    };

    let edited = apply_edits(doc, edits)?;
    let out = cli.output.as_deref().unwrap_or(&cli.file);
    let text = if cli.pretty {
        edited.to_json_pretty()
    } else {
        edited.to_json()
    };
    std::fs::write(out, text).with_context(|| format!("write '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

// ─── Input ───────────────────────────────────────────────────────────────

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))?;
    Document::from_json(&text).with_context(|| format!("parse '{}'", path.display()))
}

fn read_edits(path: &Path) -> anyhow::Result<Vec<Edit>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse edits '{}'", path.display()))
}

/// `f64::from_str` accepts `inf` and `NaN`, which cannot be written as JSON.
fn finite_f64(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(format!("`{raw}` is not a finite number")),
        Err(e) => Err(e.to_string()),
    }
}

fn hex_arg(raw: &str) -> anyhow::Result<(u8, u8, u8)> {
    parse_hex_rgb(raw).with_context(|| format!("`{raw}` is not a 3- or 6-digit hex color"))
}

fn set_color_edit(
    doc: &Document,
    path: &NodePath,
    hex: &str,
    alpha: Option<f64>,
) -> anyhow::Result<Edit> {
    let shape = lte_core::resolve_shape(doc, path);
    if !matches!(shape.kind, ShapeKind::Fill | ShapeKind::Stroke) {
        bail!("{path} is not a fill or stroke");
    }
    let mut field = HexField::new(shape.color);
    field.focus(shape.color);
    field.edit(hex);
    let Some(mut color) = field.commit(shape.color) else {
        bail!("`{hex}` is not a 3- or 6-digit hex color");
    };
    if let Some(alpha) = alpha {
        color.a = alpha;
    }
    Ok(Edit::SetShapeColor {
        path: path.clone(),
        color,
    })
}

/// Run edits through an editor session so they behave exactly as in an
/// interactive host.
fn apply_edits(doc: Document, edits: Vec<Edit>) -> anyhow::Result<Document> {
    let config = EditorConfig {
        persist_on_edit: false,
        ..EditorConfig::default()
    };
    let mut session = EditorSession::new(MemoryStore::new(), config);
    session.set_document(doc)?;
    for edit in edits {
        let label = edit.description();
        session.apply(edit).with_context(|| label.clone())?;
        log::info!("{label}");
    }
    session
        .document()
        .cloned()
        .context("document was removed during editing")
}

// ─── Listings ────────────────────────────────────────────────────────────

fn cmd_info(doc: &Document, json: bool) -> anyhow::Result<()> {
    let (w, h) = doc.dimensions();
    if json {
        let info = serde_json::json!({
            "width": w,
            "height": h,
            "framerate": doc.framerate(),
            "layers": doc.layers.len(),
            "assets": doc.assets().len(),
        });
        println!("{info:#}");
    } else {
        println!("size       {w}x{h}");
        println!("framerate  {}", doc.framerate());
        println!("layers     {}", doc.layers.len());
        println!("assets     {}", doc.assets().len());
    }
    Ok(())
}

fn cmd_layers(doc: &Document, json: bool) -> anyhow::Result<()> {
    let layers = list_layers(doc);
    if json {
        println!("{}", serde_json::to_string_pretty(&layers)?);
    } else {
        for layer in &layers {
            print_layer(layer, 0);
        }
    }
    Ok(())
}

fn print_layer(layer: &LayerInfo, depth: usize) {
    let hidden = if layer.hidden { " (hidden)" } else { "" };
    println!("{:indent$}{}  {}{hidden}", "", layer.path, layer.name, indent = depth * 2);
    for shape in &layer.shapes {
        print_shape(shape, depth + 1);
    }
    for child in &layer.children {
        print_layer(child, depth + 1);
    }
}

fn print_shape(shape: &ShapeInfo, depth: usize) {
    let detail = match shape.kind {
        ShapeKind::Fill | ShapeKind::Stroke => {
            format!("{:?} {} a={}", shape.kind, shape.color.to_hex(), shape.color.a)
        }
        kind => format!("{kind:?}"),
    };
    println!("{:indent$}{}  {}  [{detail}]", "", shape.path, shape.name, indent = depth * 2);
    for child in &shape.children {
        print_shape(child, depth + 1);
    }
}

fn cmd_colors(doc: &Document, json: bool) -> anyhow::Result<()> {
    let groups: Vec<ColorGroup> = group_colors(doc);
    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }
    for group in &groups {
        println!("{} a={}  x{}", group.color.to_hex(), group.color.a, group.count);
        for path in &group.shape_paths {
            println!("  {path}");
        }
    }
    Ok(())
}

fn cmd_shape(doc: &Document, path: &NodePath, json: bool) -> anyhow::Result<()> {
    let shape = lte_core::resolve_shape(doc, path);
    if json {
        println!("{}", serde_json::to_string_pretty(&shape)?);
    } else {
        print_shape(&shape, 0);
    }
    Ok(())
}
