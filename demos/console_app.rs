//! Console application example
//!
//! Walks through named loggers, level checks, failure chains and
//! nested/mapped diagnostic context, printing everything to the console.
//!
//! Run with: cargo run --example console_app

use rust_diagnostic_logger::prelude::*;
use rust_diagnostic_logger::{debug, error, info, warn};

fn foo() -> std::result::Result<(), Failure> {
    Err(Failure::new("This is an Exception"))
}

fn goo() -> std::result::Result<(), Failure> {
    foo().map_err(|inner| {
        Failure::caused_by("Failed in Goo. Calling Foo. Inner Exception provided", inner)
    })
}

fn bar() -> std::result::Result<(), Failure> {
    goo()
}

fn main() -> Result<()> {
    let config = LevelConfig::new(LogLevel::Info).with_level("ConsoleApp", LogLevel::Debug);
    let registry = LoggerRegistry::builder()
        .config(config)
        .root_sink(ConsoleSink::new())
        .build()?;

    let log = registry.get_logger("ConsoleApp.LoggingExample")?;

    info!(log, "Application [ConsoleApp] Start");

    if log.is_enabled_for(LogLevel::Debug) {
        debug!(log, "This is a debug message");
    }

    if let Err(failure) = bar() {
        error!(log, failure = &failure, "Exception thrown from method Bar");
    }

    error!(log, "Hey this is an error!");

    {
        let _ndc = ndc::push("NDC_Message");
        warn!(log, "This should have an NDC message");

        mdc::set("auth", "auth-none");
        warn!(log, "This should have an MDC message for the key 'auth'");
    }

    warn!(log, "See the NDC has been popped of! The MDC 'auth' key is still with us.");

    info!(log, "Application [ConsoleApp] End");

    registry.flush()?;

    let metrics = registry.metrics();
    println!(
        "\nrecords: {}, deliveries: {}, failures: {}",
        metrics.records_emitted(),
        metrics.deliveries(),
        metrics.delivery_failures()
    );

    Ok(())
}
