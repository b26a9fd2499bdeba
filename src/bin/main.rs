//! Renders the decoration of a synthetic window into a PNG file.
//!
//! This drives the full pipeline against a [`DummyHost`]: the registry is
//! initialised, buttons are declared from the command line exactly as a
//! configuration file would declare them, the host positioner is played by
//! hand, and a single render pass is drawn with the software renderer.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt as logger, EnvFilter};

use decobar::config::{no_checks, NinePatchSource};
use decobar::core::{MonitorId, WindowId};
use decobar::platform::{DummyHost, WindowState};
use decobar::render::SoftwareRenderer;
use decobar::types::{Color, Placement, Point, Rectangle, Size};
use decobar::{BarConfig, DecorationRegistry};

/// Space left around the decorated window in the output image.
const MARGIN: f64 = 16.;

#[derive(Debug, Parser)]
#[command(version, about = "Render a decorated window to a PNG file")]
struct Args {
    /// Where to write the image.
    #[arg(short, long, default_value = "decobar-preview.png")]
    output: PathBuf,
    /// The window title.
    #[arg(short, long, default_value = "decobar preview")]
    title: String,
    /// The application id, used to find the app icon.
    #[arg(long, default_value = "")]
    app_id: String,
    /// Width of the window body.
    #[arg(long, default_value_t = 480.)]
    width: f64,
    /// Height of the window body.
    #[arg(long, default_value_t = 240.)]
    height: f64,
    /// Scale of the monitor.
    #[arg(long, default_value_t = 1.)]
    scale: f64,
    /// The edge holding the bar content.
    #[arg(long, default_value_t = Placement::Top)]
    placement: Placement,
    /// Thickness of the content edge.
    #[arg(long, default_value_t = 24)]
    offset: i32,
    /// The bar color, e.g. `rgba(333333ee)`.
    #[arg(long)]
    color: Option<String>,
    /// The title font family or font file.
    #[arg(long, default_value = "Sans")]
    font: String,
    /// A nine-patch skin base name.
    #[arg(long)]
    ninepatch: Option<PathBuf>,
    /// A button declaration: `size, command, active[, inactive[, hover[, pressed]]]`.
    #[arg(short, long)]
    button: Vec<String>,
    /// Draw the window as unfocused.
    #[arg(long)]
    unfocused: bool,
}

impl Args {
    fn config(&self) -> decobar::Result<BarConfig> {
        let mut builder = BarConfig::builder()
            .placement(self.placement)
            .font(self.font.as_str())
            .color_transition(std::time::Duration::ZERO);
        builder = match self.placement {
            Placement::Top => builder.offset_top(self.offset),
            Placement::Bottom => builder.offset_bottom(self.offset),
            Placement::Left => builder.offset_left(self.offset),
            Placement::Right => builder.offset_right(self.offset),
        };
        if let Some(color) = &self.color {
            builder = builder.bar_color(color.parse::<Color>()?);
        }
        if let Some(base) = &self.ninepatch {
            builder = builder.ninepatch(NinePatchSource {
                texture: Some(base.clone()),
                ..NinePatchSource::default()
            });
        }
        builder.finish(no_checks)
    }
}

pub fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    logger::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .try_init()?;

    let args = Args::parse();
    let config = args.config()?;

    let window = WindowId::new(1);
    let monitor = MonitorId::new(0);

    let mut host = DummyHost::new();
    host.add_monitor(monitor, DummyHost::simple_monitor("PREVIEW-1", args.scale));
    host.add_window(window, WindowState {
        position: Point::new(MARGIN, MARGIN),
        size: Size::new(args.width, args.height),
        title: args.title.clone(),
        app_id: args.app_id.clone(),
        monitor: Some(monitor),
        ..WindowState::default()
    });
    if !args.unfocused {
        host.focus(Some(window));
    }

    let mut registry = DecorationRegistry::new(config);
    for line in &args.button {
        registry.declare_button(line);
    }
    registry.init(&mut host);

    let id = registry
        .decoration_for(window)
        .ok_or("the preview window was not decorated")?;

    // the first draw loads the skins, whose padding the positioner needs
    registry.draw(&mut host, id, 1.)?;

    // play the host positioner: the body moves inwards by the reserved extents
    let extents = registry.positioning(id)?.desired;
    if let Some(state) = host.window_mut(window) {
        state.position = Point::new(MARGIN + extents.left, MARGIN + extents.top);
    }
    registry.assign_box(
        id,
        Rectangle::new(
            -extents.left,
            -extents.top,
            args.width + extents.left + extents.right,
            args.height + extents.top + extents.bottom,
        ),
    )?;

    let width = (args.width + extents.left + extents.right + 2. * MARGIN) * args.scale;
    let height = (args.height + extents.top + extents.bottom + 2. * MARGIN) * args.scale;
    let mut renderer = SoftwareRenderer::new(width.ceil() as u32, height.ceil() as u32)
        .ok_or("invalid output size")?;
    renderer.clear(Color::from_hex(0x1e1e2eff));

    registry.render_pass(&mut host, &mut renderer, id, monitor, 1.)?;
    renderer.save_png(&args.output)?;

    info!("wrote {}", args.output.display());
    Ok(())
}
