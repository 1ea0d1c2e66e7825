mod app;
mod commands;
mod platform;
mod settings;
mod ui;
mod world;

use std::env;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use wwwcraft_core::events::{channel, EventSender};
use wwwcraft_core::jobs::JobSystem;
use wwwcraft_persist::download::DirectoryDownloads;
use wwwcraft_persist::gateway::SaveGateway;
use wwwcraft_persist::remote::{HttpRemote, RemoteSource, SiteRoot};
use wwwcraft_persist::store::FileStore;

use app::{spawn_remote_load, AppEvent, MenuController};
use commands::{parse_command, ConsoleInput, HELP_TEXT};
use platform::HeadlessPlatform;
use settings::{load_or_create_settings, SETTINGS_FILE};
use ui::ConsoleUi;
use world::HeadlessWorld;

const USAGE: &str = "Usage: wwwcraft_client [--data-dir <path>] [--site-root <path> | --remote <host[:port]>] [--fragment <#name>] [--touch]";
const TICK: Duration = Duration::from_millis(50);

struct ClientConfig {
    data_dir: PathBuf,
    remote: Option<Arc<dyn RemoteSource>>,
    fragment: String,
    touch: bool,
}

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let mut config = ClientConfig {
        data_dir: PathBuf::from("wwwcraft-data"),
        remote: None,
        fragment: String::new(),
        touch: false,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let Some(value) = args.next() else {
                    eprintln!("--data-dir expects a path argument");
                    std::process::exit(2);
                };
                config.data_dir = PathBuf::from(value);
            }
            "--site-root" => {
                let Some(value) = args.next() else {
                    eprintln!("--site-root expects a path argument");
                    std::process::exit(2);
                };
                config.remote = Some(Arc::new(SiteRoot::new(Path::new(&value))));
            }
            "--remote" => {
                let Some(value) = args.next() else {
                    eprintln!("--remote expects a host[:port] argument");
                    std::process::exit(2);
                };
                match HttpRemote::parse(&value) {
                    Ok(remote) => config.remote = Some(Arc::new(remote)),
                    Err(err) => {
                        eprintln!("invalid remote '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--fragment" => {
                let Some(value) = args.next() else {
                    eprintln!("--fragment expects an anchor name");
                    std::process::exit(2);
                };
                config.fragment = if value.starts_with('#') {
                    value
                } else {
                    format!("#{value}")
                };
            }
            "--touch" => config.touch = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return;
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    if let Err(err) = run(config) {
        eprintln!("wwwcraft_client failed: {err}");
        std::process::exit(1);
    }
}

fn run(config: ClientConfig) -> io::Result<()> {
    let settings_path = config.data_dir.join(SETTINGS_FILE);
    let settings = load_or_create_settings(&settings_path);
    let store = FileStore::open(&config.data_dir.join("storage"))?;
    let downloads = DirectoryDownloads::new(&config.data_dir.join("downloads"));
    let gateway = SaveGateway::new(Box::new(store), Box::new(downloads));

    let (events_tx, events_rx) = channel();
    let platform = HeadlessPlatform::new(events_tx.clone(), config.touch, config.fragment);
    let mut controller = MenuController::new(
        HeadlessWorld::default(),
        platform,
        ConsoleUi::new(),
        gateway,
        settings,
        Some(settings_path),
    );
    controller.start();

    let jobs = JobSystem::io().map_err(|err| {
        io::Error::new(io::ErrorKind::Other, format!("failed to build job pool: {err}"))
    })?;
    if let Some(remote) = config.remote {
        spawn_remote_load(&jobs, remote, events_tx.clone());
    }

    let shutdown_tx = events_tx.clone();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(AppEvent::Quit);
    })
    .map_err(|err| {
        io::Error::new(io::ErrorKind::Other, format!("failed to set Ctrl+C handler: {err}"))
    })?;

    spawn_console_thread(events_tx);
    info!("Menu ready; type 'help' for commands");

    loop {
        match events_rx.recv_timeout(TICK) {
            Ok(AppEvent::Menu(command)) => controller.handle(command, Instant::now()),
            Ok(AppEvent::RemoteSave(save)) => controller.on_remote_save(save, Instant::now()),
            Ok(AppEvent::Status) => {
                println!("{}", controller.status());
                let platform = controller.platform();
                println!(
                    "audio disabled: {}, joystick ready: {}",
                    platform.audio_disabled, platform.joystick_ready
                );
                println!("{}", controller.ui().describe());
            }
            Ok(AppEvent::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        controller.update(Instant::now());
    }

    info!("Shutting down from {:?}", controller.state());
    Ok(())
}

fn spawn_console_thread(events: EventSender<AppEvent>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line_result in stdin.lock().lines() {
            let line = match line_result {
                Ok(line) => line,
                Err(err) => {
                    warn!("Failed to read console input: {err}");
                    break;
                }
            };

            let event = match parse_command(&line) {
                ConsoleInput::Noop => continue,
                ConsoleInput::Menu(command) => AppEvent::Menu(command),
                ConsoleInput::Status => AppEvent::Status,
                ConsoleInput::Quit => AppEvent::Quit,
                ConsoleInput::Help => {
                    println!("{HELP_TEXT}");
                    continue;
                }
                ConsoleInput::InvalidUsage(usage) => {
                    println!("{usage}");
                    continue;
                }
                ConsoleInput::Unknown(input) => {
                    println!("Unknown command '{input}'; type 'help'");
                    continue;
                }
            };
            if events.send(event).is_err() {
                return;
            }
        }
        let _ = events.send(AppEvent::Quit);
    });
}
