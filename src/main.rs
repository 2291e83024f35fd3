use std::{
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
    thread,
};

use anyhow::{Context, anyhow};
use clap::Parser;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{Level, error, info, warn};

use mttest::{
    config::Config,
    context::TouchContext,
    event_model::decoder::EventDecoder,
    input_devices::evdev::{EvdevSource, list_devices},
    screen_overlay::{
        backend_drm::{
            DrmScreen,
            drm_util::{device::Card, output::connected_outputs},
        },
        renderer::Renderer,
        shape::create_discs,
    },
};

/// Multipoint touchscreen tester: draws one disc per contact on a KMS output.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// List input devices and connected DRM outputs, then exit
    #[arg(short, long, conflicts_with_all = ["event", "drm"])]
    show: bool,

    /// Input device index, as in /dev/input/event<INDEX>
    #[arg(short, long, value_name = "INDEX", requires = "drm", required_unless_present = "show")]
    event: Option<u32>,

    /// Output index from the --show listing
    #[arg(short, long, value_name = "INDEX", requires = "event", required_unless_present = "show")]
    drm: Option<usize>,

    /// TOML config file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    if cli.show {
        return show(&config);
    }
    let (Some(event_index), Some(drm_index)) = (cli.event, cli.drm) else {
        return Err(anyhow!("both --event and --drm have to be provided together"));
    };

    let shapes = create_discs(config.diameter, &config.colors).context("create discs")?;
    let screen = DrmScreen::open(&config.card_paths, drm_index).context("display init")?;
    let mut source = EvdevSource::open(event_index).context("event init")?;

    let ctx = Arc::new(TouchContext::new());
    spawn_signal_handler(ctx.clone())?;

    let mut renderer = Renderer::new(ctx.clone(), screen, shapes, config.frame_interval())?;
    let render = thread::Builder::new()
        .name("renderer".into())
        .spawn(move || renderer.run())
        .context("spawn renderer")?;

    info!("running, Ctrl-C to quit");
    let decoded = EventDecoder::new(ctx.clone()).run(&mut source);

    // 无论解码线程为何退出, 都要唤醒渲染线程让它看到 stop
    ctx.request_stop();
    let rendered = match render.join() {
        Ok(result) => result.context("render loop"),
        Err(_) => Err(anyhow!("render thread panicked")),
    };

    match (decoded, rendered) {
        (Err(e), rendered) => {
            if let Err(r) = rendered {
                error!("{r:#}");
            }
            Err(e.context("decode loop"))
        }
        (Ok(()), rendered) => rendered,
    }
}

/// SIGINT/SIGTERM raise the stop flag. The decoder only notices it after
/// its blocking read returns, so a second signal exits right away.
fn spawn_signal_handler(ctx: Arc<TouchContext>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build signal runtime")?;
    let (mut interrupt, mut terminate) = {
        let _guard = runtime.enter();
        (
            signal(SignalKind::interrupt()).context("install SIGINT handler")?,
            signal(SignalKind::terminate()).context("install SIGTERM handler")?,
        )
    };

    thread::Builder::new()
        .name("signal".into())
        .spawn(move || {
            runtime.block_on(async {
                tokio::select! {
                    _ = interrupt.recv() => {}
                    _ = terminate.recv() => {}
                }
                info!("caught signal, exiting after the next touch event");
                ctx.request_stop();

                tokio::select! {
                    _ = interrupt.recv() => {}
                    _ = terminate.recv() => {}
                }
                warn!("caught second signal, exiting now");
                std::process::exit(130);
            })
        })
        .context("spawn signal thread")?;
    Ok(())
}

fn show(config: &Config) -> anyhow::Result<()> {
    println!("Input devices:");
    println!("Index\tName\t\t\tDriver\tMultitouch");
    for dev in list_devices() {
        println!(
            "{}\t{}\t\t{}\t{}",
            dev.index,
            dev.name,
            dev.version_string(),
            if dev.multitouch { "yes" } else { "no" }
        );
    }
    println!();

    let (card, path) = Card::open_first(&config.card_paths)?;
    let outputs = connected_outputs(&card)?;
    println!("DRM details ({}):", path.display());
    println!("Index\tConnector\tName\t\tMode\t\tPossible CRTCs");
    for (index, output) in outputs.iter().enumerate() {
        let (w, h) = output.size();
        let crtcs = output
            .possible_crtcs
            .iter()
            .map(|&c| u32::from(c).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{index}\t{}\t\t{}\t{w}x{h}\t\t{crtcs}",
            u32::from(output.connector),
            output.name
        );
    }
    println!();
    Ok(())
}
