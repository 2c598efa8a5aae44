//! A stopwatch: `Active` holds the accumulated time, `Running` adds to it
//! when it exits, and both leaves answer the elapsed-time query.
//!
//! Run with `RUST_LOG=debug` to see every entry, exit and transition.

use chrono::{DateTime, Utc};
use statechart::core::Capability;
use statechart::machine::{Activity, Ancestors, Machine, Scope};
use statechart::{event_enum, state_enum, ChartBuilder};
use std::thread::sleep;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

state_enum! {
    enum Watch {
        Active,
        Stopped,
        Running,
    }
}

event_enum! {
    enum WatchEvent {
        StartStop,
        Reset,
    }
}

/// Seconds measured so far.
struct ElapsedTime;

impl Capability for ElapsedTime {
    type Output = f64;
}

#[derive(Default)]
struct Accumulated {
    seconds: f64,
}

impl Activity<Watch, ()> for Accumulated {}

struct Timing {
    started: DateTime<Utc>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            started: Utc::now(),
        }
    }
}

impl Timing {
    fn since_start(&self) -> f64 {
        (Utc::now() - self.started)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl Activity<Watch, ()> for Timing {
    fn on_exit(&mut self, scope: &mut Scope<'_, Watch, ()>) {
        let since_start = self.since_start();
        if let Some(active) = scope.ancestor_mut::<Accumulated>() {
            active.seconds += since_start;
        }
    }
}

fn stored(ancestors: &Ancestors<'_, Watch>) -> f64 {
    ancestors
        .ancestor::<Accumulated>()
        .map_or(0.0, |active| active.seconds)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let chart = ChartBuilder::<Watch, WatchEvent>::new("stopwatch", Watch::Active)
        .state(Watch::Active, |s| {
            s.initial(Watch::Stopped)
                .activity::<Accumulated>()
                .on(WatchEvent::Reset, Watch::Active)
        })
        .state(Watch::Stopped, |s| {
            s.parent(Watch::Active)
                .on(WatchEvent::StartStop, Watch::Running)
                .provides::<ElapsedTime, (), _>(|_, ancestors| stored(ancestors))
        })
        .state(Watch::Running, |s| {
            s.parent(Watch::Active)
                .activity::<Timing>()
                .on(WatchEvent::StartStop, Watch::Stopped)
                .provides::<ElapsedTime, Timing, _>(|timing, ancestors| {
                    stored(ancestors) + timing.since_start()
                })
        })
        .build()?;

    print!("{}", chart.outline());

    let mut watch = Machine::new(chart, ());
    watch.initiate()?;
    println!("{:.3}", watch.query::<ElapsedTime>()?);

    let steps = [
        WatchEvent::StartStop,
        WatchEvent::StartStop,
        WatchEvent::StartStop,
        WatchEvent::Reset,
    ];
    for event in &steps {
        sleep(Duration::from_millis(250));
        watch.process_event(event)?;
        println!("{:.3}", watch.query::<ElapsedTime>()?);
    }

    Ok(())
}
