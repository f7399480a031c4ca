use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use plugframe::{
    AlphaValueAnimation, Color, ControlValueAnimation, CubicBezierTimingFunction, ExchangeStyle,
    ExchangeViewAnimation, Frame, FrameOpts, HeadlessWindow, HorizontalSlider, LinearTimingFunction, OnOffButton,
    PlatformContext, Rect, TextAlign, TextLabel, ViewId,
};

#[derive(Parser, Debug)]
#[command(name = "plugframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the demo editor, run animation ticks headlessly and write a PNG.
    Snapshot(SnapshotArgs),
    /// Print the effective frame options as JSON.
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Number of animator ticks to run before the snapshot.
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Frame options JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window width in pixels.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Window height in pixels.
    #[arg(long, default_value_t = 200)]
    height: u32,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Frame options JSON to merge over the defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Snapshot(args) => cmd_snapshot(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn load_opts(path: Option<&Path>) -> anyhow::Result<FrameOpts> {
    let opts = match path {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).with_context(|| format!("read config '{}'", path.display()))?;
            FrameOpts::from_json(&text).with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => FrameOpts::default(),
    };
    Ok(opts.with_env_overrides())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let opts = load_opts(args.config.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&opts)?);
    Ok(())
}

#[tracing::instrument(skip_all, fields(ticks = args.ticks, width = args.width, height = args.height))]
fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let opts = load_opts(args.config.as_deref())?;
    let interval = opts.animation_interval_ms;
    let platform = PlatformContext::new();
    let size = Rect::new(0.0, 0.0, f64::from(args.width), f64::from(args.height));
    let mut frame = Frame::new(&platform, size, opts);

    let window = HeadlessWindow::new(args.width, args.height).context("create headless window")?;
    let surface = window.surface();
    frame.open(window)?;

    build_demo(&mut frame, size)?;
    frame.paint()?;

    let mut now = 0u64;
    for _ in 0..args.ticks {
        frame.tick(now);
        now += interval;
    }
    frame.paint()?;
    tracing::info!(
        presents = surface.presents(),
        running = frame.animator().animation_count(),
        "snapshot ready"
    );

    let pixels = surface.pixels();
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &pixels.to_straight_rgba8(),
        pixels.width,
        pixels.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Panel with a title, a slider, two buttons and a page that gets exchanged.
fn build_demo(frame: &mut Frame, size: Rect) -> anyhow::Result<()> {
    let w = size.width();
    let h = size.height();
    let tree = frame.tree_mut();

    let panel = tree.create_container(Rect::new(8.0, 8.0, w - 8.0, h - 8.0));
    tree.set_background_color(panel, Color::rgb(40, 44, 52));
    let pw = w - 16.0;
    let ph = h - 16.0;

    let title = tree.create_view(
        Rect::new(8.0, 6.0, pw - 8.0, 26.0),
        TextLabel::new("plugframe").with_align(TextAlign::Left),
    );
    tree.add_view(panel, title);

    let slider = tree.create_view(
        Rect::new(8.0, 34.0, pw - 8.0, 50.0),
        HorizontalSlider::new(0.0, 1.0, 10.0).with_colors(Color::rgb(70, 74, 84), Color::rgb(230, 180, 60)),
    );
    tree.set_tag(slider, 1);
    tree.add_view(panel, slider);

    let mut buttons = Vec::new();
    for (i, tag) in [2, 3].into_iter().enumerate() {
        let x = 8.0 + i as f64 * 40.0;
        let b = tree.create_view(
            Rect::new(x, 58.0, x + 32.0, 74.0),
            OnOffButton::new().with_colors(Color::rgb(90, 200, 120), Color::rgb(90, 90, 90)),
        );
        tree.set_tag(b, tag);
        tree.add_view(panel, b);
        buttons.push(b);
    }
    if let Some(first) = buttons.first() {
        tree.with_control_mut(*first, |c| c.set_value(1.0));
    }

    let page_rect = Rect::new(8.0, 82.0, pw - 8.0, (ph - 8.0).max(90.0));
    let old_page = page(tree, page_rect, "page one", Color::rgb(60, 90, 140));
    tree.add_view(panel, old_page);
    let new_page = page(tree, page_rect, "page two", Color::rgb(140, 70, 90));

    frame.add_view(panel);

    let exchange =
        ExchangeViewAnimation::new(frame.tree(), old_page, new_page, ExchangeStyle::PushInFromRight)?;
    frame.add_animation(
        exchange.container(),
        "exchange",
        exchange,
        CubicBezierTimingFunction::easy_in_out(400),
    )?;

    frame.tree_mut().set_alpha_value(slider, 0.0);
    frame.add_animation(slider, "fade", AlphaValueAnimation::new(1.0, true), LinearTimingFunction::new(250))?;
    frame.add_animation(slider, "value", ControlValueAnimation::new(0.75, true), LinearTimingFunction::new(500))?;
    Ok(())
}

fn page(tree: &mut plugframe::ViewTree, rect: Rect, text: &str, color: Color) -> ViewId {
    tree.create_view(rect, TextLabel::new(text).with_back_color(color))
}
