//! Interactive operator CLI.
//!
//! Frames come from image files named on the command line; the webcam is a
//! collaborator outside this binary. Without `--port` (or when the port
//! fails to open) the session runs in simulation mode: every move updates
//! the grid, nothing is written to hardware.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{warn, LevelFilter};

use blocksort::control::{CommandChannel, DwellConfig, Routine, Transport};
use blocksort::core::{init_with_level, BlockColor, ColumnLayout, GridPos};
use blocksort::detect;
use blocksort::vision::VisionParams;
use blocksort::SortSession;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LayoutArg {
    Mirrored,
    Ascending,
}

#[derive(Parser, Debug)]
#[command(name = "blocksort", about = "Camera-guided block sorter")]
struct Args {
    /// Serial device of the motion controller; omit for simulation mode.
    #[arg(long)]
    port: Option<String>,

    /// JSON file with detector parameters (partial files are fine).
    #[arg(long)]
    params: Option<PathBuf>,

    /// Column numbering direction.
    #[arg(long)]
    layout: Option<LayoutArg>,

    /// Calibrate from this reference image at startup.
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[cfg(feature = "serial")]
fn open_transport(device: &str) -> Option<Box<dyn Transport>> {
    match blocksort::control::SerialTransport::open(device) {
        Ok(t) => Some(Box::new(t)),
        Err(err) => {
            warn!("{err}; continuing in simulation mode");
            None
        }
    }
}

#[cfg(not(feature = "serial"))]
fn open_transport(device: &str) -> Option<Box<dyn Transport>> {
    warn!("built without the `serial` feature; ignoring --port {device}");
    None
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = init_with_level(level);

    let mut params = match load_params(args.params.as_deref()) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(layout) = args.layout {
        params.calibrate.layout = match layout {
            LayoutArg::Mirrored => ColumnLayout::MirroredCols,
            LayoutArg::Ascending => ColumnLayout::AscendingCols,
        };
    }

    let transport = args.port.as_deref().and_then(open_transport);
    let channel = CommandChannel::new(transport, DwellConfig::default());
    let mut session = SortSession::new(params, channel);

    if let Some(path) = &args.reference {
        calibrate_from(&mut session, path);
    }

    println!("commands: cal <img> | scan <img> | mv <r2|12>33> | reset | home | routine <name> | state | quit");
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("stdin: {err}");
                break;
            }
        }
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else { continue };
        let arg = words.next();

        match (verb, arg) {
            ("cal", Some(path)) => calibrate_from(&mut session, Path::new(path)),
            ("scan", Some(path)) => scan_from(&mut session, Path::new(path)),
            ("mv", Some(req)) => match req.parse() {
                Ok(request) => match session.execute_blocking(&request) {
                    Ok(planned) => println!(
                        "moved {} {} -> {} (cmd {})",
                        planned.color,
                        planned.source,
                        planned.dest,
                        planned.command.encode()
                    ),
                    Err(err) => println!("move rejected: {err}"),
                },
                Err(err) => println!("bad request: {err}"),
            },
            ("reset", None) => match session.execute_reset_blocking() {
                Ok(moves) => println!("reset complete: {} moves", moves.len()),
                Err(err) => println!("reset failed: {err}"),
            },
            ("home", None) => match session.home_blocking() {
                Ok(()) => println!("homed"),
                Err(err) => println!("home failed: {err}"),
            },
            ("routine", Some(name)) => match Routine::from_name(name) {
                Some(routine) => match session.routine_blocking(routine) {
                    Ok(()) => println!("routine {name} done"),
                    Err(err) => println!("routine failed: {err}"),
                },
                None => println!("unknown routine {name:?}"),
            },
            ("state", None) => print_state(&session),
            ("help", _) => println!(
                "cal <img> | scan <img> | mv <r2|12>33> | reset | home | routine <name> | state | quit"
            ),
            ("quit", _) | ("q", _) => break,
            _ => println!("unrecognized command {:?}", line.trim()),
        }
    }

    ExitCode::SUCCESS
}

fn load_params(path: Option<&Path>) -> Result<VisionParams, String> {
    let Some(path) = path else {
        return Ok(VisionParams::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read params {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("bad params {}: {e}", path.display()))
}

fn calibrate_from<T: Transport>(session: &mut SortSession<T>, path: &Path) {
    let img = match detect::load_rgb(path) {
        Ok(img) => img,
        Err(err) => {
            println!("cannot load {}: {err}", path.display());
            return;
        }
    };
    match session.calibrate(&detect::rgb_view(&img)) {
        Ok(()) => println!("calibrated from {}", path.display()),
        Err(err) => println!("calibration failed: {err}"),
    }
}

fn scan_from<T: Transport>(session: &mut SortSession<T>, path: &Path) {
    let img = match detect::load_rgb(path) {
        Ok(img) => img,
        Err(err) => {
            println!("cannot load {}: {err}", path.display());
            return;
        }
    };
    match session.scan(&detect::rgb_view(&img)) {
        Ok(()) => print_state(session),
        Err(err) => println!("scan failed: {err}"),
    }
}

fn print_state<T: Transport>(session: &SortSession<T>) {
    let grid = session.grid();
    if !grid.is_calibrated() {
        println!("grid: uncalibrated");
        return;
    }
    if session.is_stale() {
        println!("grid: pending rescan after a move");
    }
    for row in 1..=3u8 {
        let mut line = format!("R{row}:");
        for col in 1..=3u8 {
            let Some(cell) = GridPos::new(row, col).and_then(|pos| grid.cell(pos)) else {
                continue;
            };
            let mark = match cell.occupant {
                Some(BlockColor::Red) => 'R',
                Some(BlockColor::Blue) => 'B',
                Some(BlockColor::Green) => 'G',
                None => '.',
            };
            line.push_str(&format!(" C{col}={mark}"));
        }
        println!("{line}");
    }
}
