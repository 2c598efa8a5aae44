//! A single-state machine greeting on entry and saying goodbye on exit.
//!
//! Run with `RUST_LOG=debug` to see the engine's own events.

use statechart::machine::Machine;
use statechart::{event_enum, state_enum, ChartBuilder};
use tracing_subscriber::EnvFilter;

state_enum! {
    enum Greeter {
        Greeting,
    }
}

event_enum! {
    enum NoEvent {
        Never,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let chart = ChartBuilder::<Greeter, NoEvent>::new("hello", Greeter::Greeting)
        .state(Greeter::Greeting, |s| {
            s.on_enter(|_| println!("Hello World!"))
                .on_exit(|_| println!("Bye Bye World!"))
        })
        .build()?;

    let mut machine = Machine::new(chart, ());
    machine.initiate()?;
    // dropping the machine exits Greeting
    Ok(())
}
