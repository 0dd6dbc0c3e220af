use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use slidecast::{
    Collaborators, EspeakSpeech, FfmpegRecorder, InMemoryRecorder, Player, PlayerOpts,
    SceneCatalog, SilentSpeech, SpeechProvider, pick_voice, scene_offsets_ms,
};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the catalog's scenes and their start offsets.
    Info(CatalogArgs),
    /// Render the frame at a timeline position as a PNG.
    Frame(FrameArgs),
    /// Record the whole timeline (WebM via `ffmpeg` on PATH, or raw RGBA).
    Export(ExportArgs),
    /// Play the timeline in real time with narration.
    Play(PlayArgs),
    /// List the speech engine's voices and the one narration would pick.
    Voices(VoicesArgs),
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Input catalog JSON. Defaults to the built-in Konark story.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Caption font (TTF/OTF). Captions are not drawn without one.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Timeline position in [0, 1].
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Output file path.
    #[arg(long)]
    out: PathBuf,

    /// Write raw RGBA frames instead of WebM (no `ffmpeg` needed).
    #[arg(long, default_value_t = false)]
    raw: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SpeechEngine {
    Silent,
    Espeak,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Speech engine used for narration.
    #[arg(long, value_enum, default_value_t = SpeechEngine::Silent)]
    speech: SpeechEngine,

    /// Start position in [0, 1].
    #[arg(long, default_value_t = 0.0)]
    from: f64,
}

#[derive(Parser, Debug)]
struct VoicesArgs {
    #[arg(long, value_enum, default_value_t = SpeechEngine::Espeak)]
    speech: SpeechEngine,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Play(args) => cmd_play(args),
        Command::Voices(args) => cmd_voices(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(args: &CatalogArgs) -> anyhow::Result<(SceneCatalog, Option<PathBuf>)> {
    match &args.in_path {
        Some(path) => {
            let catalog = SceneCatalog::from_path(path)?;
            let root = path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();
            Ok((catalog, Some(root)))
        }
        None => Ok((SceneCatalog::konark(), None)),
    }
}

fn player_with(
    args: &CatalogArgs,
    customize: impl FnOnce(&mut Collaborators),
) -> anyhow::Result<Player> {
    let (catalog, root) = load_catalog(args)?;
    let mut opts = PlayerOpts::from_env();
    if let Some(font) = &args.font {
        opts.font_path = Some(font.clone());
    }
    let mut parts = Collaborators::from_opts(&catalog, &opts, root.as_deref())?;
    customize(&mut parts);
    Ok(Player::new(catalog, opts, parts))
}

fn cmd_info(args: CatalogArgs) -> anyhow::Result<()> {
    let (catalog, _) = load_catalog(&args)?;
    println!(
        "{} ({} scenes, {} ms)",
        catalog.title().unwrap_or("untitled"),
        catalog.len(),
        catalog.total_duration_ms()
    );
    let offsets = scene_offsets_ms(catalog.scenes());
    for (i, (scene, start)) in catalog.scenes().iter().zip(offsets).enumerate() {
        println!(
            "{i:>3}  {start:>7} ms  +{:>6} ms  {}",
            scene.duration_ms, scene.image
        );
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut player = player_with(&args.catalog, |_| {})?;
    player.seek(args.at)?;
    let frame = player.present()?;
    let rgba = frame.to_straight_rgba8();

    slidecast::capture::recorder::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let raw = args.raw;
    let mut player = player_with(&args.catalog, |parts| {
        if raw {
            parts.recorder = Box::new(InMemoryRecorder::new());
        } else {
            parts.recorder = Box::new(FfmpegRecorder::default());
        }
    })?;
    let artifact = match player.export_offline() {
        Ok(a) => a,
        Err(e) => anyhow::bail!(e.user_message()),
    };
    artifact.write_to(&args.out)?;

    println!("{}  {}", artifact.sha256_hex(), args.out.display());
    eprintln!(
        "wrote {} ({}, {} frames, {} bytes)",
        args.out.display(),
        artifact.mime,
        artifact.frame_count,
        artifact.bytes.len()
    );
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let speech = make_speech(args.speech)?;
    let mut player = player_with(&args.catalog, |parts| parts.speech = speech)?;
    player.seek(args.from)?;
    player.play();
    player.run_realtime(|p| p.is_quiescent());
    eprintln!("played {} frames", player.frames_presented());
    Ok(())
}

fn cmd_voices(args: VoicesArgs) -> anyhow::Result<()> {
    let mut speech = make_speech(args.speech)?;
    let voices = speech.voices();
    for v in &voices {
        println!("{}\t{}", v.lang, v.name);
    }
    let preferred = PlayerOpts::from_env().narration.preferred_voices;
    match pick_voice(&voices, &preferred) {
        Some(v) => eprintln!("narration voice: {} ({})", v.name, v.lang),
        None => eprintln!("narration voice: engine default"),
    }
    Ok(())
}

fn make_speech(engine: SpeechEngine) -> anyhow::Result<Box<dyn SpeechProvider>> {
    let speech: Box<dyn SpeechProvider> = match engine {
        SpeechEngine::Silent => Box::new(SilentSpeech::new()),
        SpeechEngine::Espeak => {
            if !slidecast::narration::espeak::is_espeak_on_path() {
                anyhow::bail!("espeak-ng not found on PATH");
            }
            Box::new(EspeakSpeech::new())
        }
    };
    Ok(speech)
}
