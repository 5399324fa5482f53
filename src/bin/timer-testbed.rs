//! Terminal test bed: a live clock next to a countdown, refreshed every frame.
//!
//! Logs `START_RECORDING` when the readouts start and `END_RECORDING` when
//! the countdown reaches zero, so an external recorder can trim the capture.

use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use tracing::info;
use tracing_subscriber::EnvFilter;

use responsive_timer::prelude::*;
use responsive_timer::FramePacer;

type Readout = TimerController<FrameQueue, SystemClock, LatestFrame>;

#[derive(Parser, Debug)]
#[command(version, about = "Live clock and countdown readout for screen recordings")]
struct Cli {
    /// Countdown length in seconds
    #[arg(short, long, default_value_t = 30)]
    duration_seconds: i64,

    /// Clock offset from UTC in minutes (local time when omitted)
    #[arg(short, long, allow_hyphen_values = true)]
    timezone_offset: Option<i32>,

    /// Show only the clock and run until interrupted
    #[arg(long)]
    no_countdown: bool,

    /// Refresh interval in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let clock = SystemClock::new();

    let mut clock_config = TimerConfig::clock().class_name("current-time-display");
    if let Some(offset) = cli.timezone_offset {
        clock_config = clock_config.timezone_offset(offset);
    }
    let mut current_time = Readout::new(
        clock_config.build()?,
        FrameQueue::new(),
        clock,
        LatestFrame::new(),
    );

    let mut countdown = if cli.no_countdown {
        None
    } else {
        let options = TimerConfig::countdown(cli.duration_seconds.saturating_mul(1_000))
            .class_name("countdown-display")
            .on_complete(|| info!("END_RECORDING"))
            .build()?;
        Some(Readout::new(
            options,
            FrameQueue::new(),
            clock,
            LatestFrame::new(),
        ))
    };

    info!(
        duration_seconds = cli.duration_seconds,
        countdown = countdown.is_some(),
        "START_RECORDING"
    );
    current_time.start()?;
    if let Some(countdown) = countdown.as_mut() {
        countdown.start()?;
    }

    let mut pacer = FramePacer::new(Duration::from_millis(cli.frame_ms));
    let mut out = io::stdout();
    loop {
        pacer.wait();
        refresh(&mut current_time)?;
        if let Some(countdown) = countdown.as_mut() {
            refresh(countdown)?;
        }
        draw(&mut out, &current_time, countdown.as_ref())?;

        if countdown.as_ref().is_some_and(|c| c.completed()) {
            break;
        }
    }

    current_time.stop();
    writeln!(out)?;
    Ok(())
}

fn refresh(timer: &mut Readout) -> Result<(), TimerError> {
    for handle in timer.scheduler_mut().take_due() {
        timer.tick(handle)?;
    }
    Ok(())
}

fn draw(out: &mut impl Write, current_time: &Readout, countdown: Option<&Readout>) -> io::Result<()> {
    let mut line = format!(
        "Current Time {}",
        current_time.sink().text().unwrap_or_default()
    );
    if let Some(countdown) = countdown {
        line.push_str("   Countdown ");
        line.push_str(countdown.sink().text().unwrap_or_default());
    }

    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(line))?;
    out.flush()
}
