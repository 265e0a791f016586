use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::Level;

use posterkit::{
    CpuRenderer, DirStore, EditorOpts, EditorSession, ExportArtifact, FontBook, LanczosResampler,
    PlatformRegistry, PosterDoc, Resampler,
};

#[derive(Parser, Debug)]
#[command(name = "posterkit", version)]
struct Cli {
    /// Extra platform as `key=WIDTHxHEIGHT` (repeatable).
    #[arg(long = "platform-def", global = true)]
    platform_defs: Vec<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known platform sizes.
    Platforms,
    /// Center-crop and resample an image to a platform size.
    Fit(FitArgs),
    /// Compose a poster document into a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FitArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Target platform key.
    #[arg(long)]
    platform: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Skip the post-resize unsharp mask.
    #[arg(long, default_value_t = false)]
    no_sharpen: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input poster JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path. Defaults to `<campaign>-<platform>.png` next to the input.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Override the document's platform.
    #[arg(long)]
    platform: Option<String>,

    /// Additional font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Also persist through a directory store and print the resulting URL.
    #[arg(long)]
    store: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let level = std::env::var("POSTERKIT_LOG")
        .ok()
        .and_then(|v| Level::from_str(v.trim()).ok())
        .unwrap_or(Level::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = registry_with(&cli.platform_defs)?;
    match cli.cmd {
        Command::Platforms => cmd_platforms(&registry),
        Command::Fit(args) => cmd_fit(&registry, args),
        Command::Render(args) => cmd_render(registry, args),
    }
}

fn registry_with(defs: &[String]) -> anyhow::Result<PlatformRegistry> {
    let mut registry = PlatformRegistry::builtin();
    for def in defs {
        let (key, size) = def
            .split_once('=')
            .with_context(|| format!("platform def '{def}' must look like key=WIDTHxHEIGHT"))?;
        let (w, h) = size
            .split_once(['x', 'X'])
            .with_context(|| format!("platform size '{size}' must look like WIDTHxHEIGHT"))?;
        let w: u32 = w.trim().parse().with_context(|| format!("bad width in '{def}'"))?;
        let h: u32 = h.trim().parse().with_context(|| format!("bad height in '{def}'"))?;
        registry.register(key.trim(), key.trim(), w, h)?;
    }
    Ok(registry)
}

fn cmd_platforms(registry: &PlatformRegistry) -> anyhow::Result<()> {
    for p in registry.iter() {
        println!("{:<20} {:>5}x{:<5} {}", p.key, p.width, p.height, p.label);
    }
    Ok(())
}

fn cmd_fit(registry: &PlatformRegistry, args: FitArgs) -> anyhow::Result<()> {
    let canvas = registry.size_of(&args.platform)?;
    let src = posterkit::load_image_file(&args.in_path)?;
    let sharpening = if args.no_sharpen {
        None
    } else {
        EditorOpts::from_env().sharpening
    };
    let out = LanczosResampler::new(sharpening).resize_to_fit(&src, canvas.width, canvas.height)?;

    ensure_parent(&args.out)?;
    out.as_image()
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({}x{} from {}x{})",
        args.out.display(),
        out.width(),
        out.height(),
        src.width(),
        src.height()
    );
    Ok(())
}

fn cmd_render(registry: PlatformRegistry, args: RenderArgs) -> anyhow::Result<()> {
    let doc = PosterDoc::from_path(&args.in_path)?;
    let root = args
        .in_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let mut opts = EditorOpts::from_env();
    opts.font_dirs.extend(args.font_dirs.iter().cloned());
    opts.platform = doc.platform.clone();
    let fonts = FontBook::discover(&opts.font_dirs);
    tracing::info!(faces = fonts.len(), "fonts loaded");

    let mut session = EditorSession::new(opts, registry, Box::new(CpuRenderer::new(fonts)))?;
    session.apply_doc(&doc, &root)?;
    if let Some(p) = &args.platform {
        session.set_platform(p)?;
    }

    let artifact = match &args.store {
        Some(dir) => {
            let outcome = session.export(&DirStore::new(dir))?;
            println!("{}", outcome.url);
            outcome.artifact
        }
        None => session.download()?,
    };

    let out = args.out.unwrap_or_else(|| root.join(&artifact.file_name));
    write_artifact(&artifact, &out)?;
    eprintln!(
        "wrote {} ({}x{})",
        out.display(),
        artifact.width,
        artifact.height
    );
    Ok(())
}

fn write_artifact(artifact: &ExportArtifact, out: &Path) -> anyhow::Result<()> {
    ensure_parent(out)?;
    std::fs::write(out, &artifact.png).with_context(|| format!("write png '{}'", out.display()))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
