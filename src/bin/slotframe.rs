use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use slotframe::{
    ByteSource, CancellationToken, ComposeOpts, ComposeRequest, ComposeSession, LayoutType,
    OutputFormat,
};

#[derive(Parser, Debug)]
#[command(name = "slotframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Log debug events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite photos into a frame and write the image.
    Compose(ComposeArgs),
    /// Print the slots a frame would use, as JSON.
    Detect(DetectArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Frame graphic (path or http(s) URL).
    #[arg(long)]
    frame: ByteSource,

    /// Photo (path or http(s) URL), once per slot, top to bottom.
    #[arg(long = "photo", required = true)]
    photos: Vec<ByteSource>,

    /// Layout: 2, 3 or 4 slots.
    #[arg(long)]
    layout: LayoutType,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Compose options JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format, overriding the config file.
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Also write the slot geometry as JSON.
    #[arg(long)]
    slots_json: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DetectArgs {
    /// Frame graphic (path or http(s) URL).
    #[arg(long)]
    frame: ByteSource,

    /// Layout: 2, 3 or 4 slots.
    #[arg(long)]
    layout: LayoutType,

    /// Compose options JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args).await,
        Command::Detect(args) => cmd_detect(args).await,
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_opts(config: Option<&PathBuf>) -> anyhow::Result<ComposeOpts> {
    match config {
        Some(path) => Ok(ComposeOpts::from_path(path)?),
        None => Ok(ComposeOpts::default()),
    }
}

async fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut opts = load_opts(args.config.as_ref())?;
    if let Some(format) = args.format {
        opts.output.format = format;
    }
    let session = ComposeSession::new(opts)?;

    let request = ComposeRequest::new(args.frame, args.photos, args.layout);
    let result = session
        .composite(request, &CancellationToken::new())
        .await?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &result.image)
        .with_context(|| format!("write image '{}'", args.out.display()))?;

    if let Some(path) = &args.slots_json {
        let f = std::fs::File::create(path)
            .with_context(|| format!("create slots json '{}'", path.display()))?;
        serde_json::to_writer_pretty(f, &result)
            .with_context(|| format!("write slots json '{}'", path.display()))?;
    }

    eprintln!(
        "wrote {} ({}x{}, {:?} slots)",
        args.out.display(),
        result.width,
        result.height,
        result.slot_source
    );
    Ok(())
}

async fn cmd_detect(args: DetectArgs) -> anyhow::Result<()> {
    let session = ComposeSession::new(load_opts(args.config.as_ref())?)?;
    let plan = session
        .detect(&args.frame, args.layout, &CancellationToken::new())
        .await?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
