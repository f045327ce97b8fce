//! Savepoint callbacks - scenario runner
//!
//! Runs a short scripted session against the in-memory harness and prints
//! which notifications fired for each savepoint operation.

use std::process::ExitCode;

use savepoint_callbacks::emulator::{
    CommittedRollback, EmulationRegistry, EmulatorConfig, EmulatorResult, SavepointEmulator,
};
use savepoint_callbacks::harness::{MemoryAdapter, RecordingCallbacks, RecordingCleanup};
use tracing_subscriber::EnvFilter;

type Session = SavepointEmulator<MemoryAdapter, RecordingCallbacks, RecordingCleanup>;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse simple command line args.
    let mut verbose = false;
    let mut fail_release = false;
    let mut fail_rollback = false;
    let mut physical = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-v" | "--verbose" => verbose = true,
            "--fail-release" => fail_release = true,
            "--fail-rollback" => fail_rollback = true,
            "--physical-rollback" => physical = true,
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("savepoint-callbacks v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    init_logging(verbose);

    let mut config = EmulatorConfig::new("demo");
    if physical {
        config = config.committed_rollback(CommittedRollback::Physical);
    }

    let registry = EmulationRegistry::new();
    let callbacks = RecordingCallbacks::new();
    let cleanup = RecordingCleanup::new();
    let adapter = MemoryAdapter::new();
    let mut session =
        match registry.equip_with_config(adapter, callbacks.clone(), cleanup.clone(), config) {
            Ok(session) => session,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        };

    let mut failed = false;
    for step in Step::script() {
        callbacks.clear();
        let result = run_step(&mut session, step, fail_release, fail_rollback);
        let fired: Vec<_> = callbacks.notifications().iter().map(|n| n.name()).collect();
        match result {
            Ok(summary) => println!("{:<24} {:<18} [{}]", step.label(), summary, fired.join(", ")),
            Err(e) => {
                failed = true;
                println!("{:<24} {:<18} [{}]", step.label(), "error", fired.join(", "));
                println!("  {}", e);
            }
        }
    }

    println!(
        "cleanups: {}, depth: {}, live entries: {}",
        cleanup.count(),
        session.depth(),
        session.tracker().len()
    );

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Release,
    Rollback,
    ReleaseThenRollback,
}

impl Step {
    fn script() -> [Step; 3] {
        [Step::Release, Step::Rollback, Step::ReleaseThenRollback]
    }

    fn label(&self) -> &'static str {
        match self {
            Step::Release => "release",
            Step::Rollback => "rollback",
            Step::ReleaseThenRollback => "release+rollback",
        }
    }
}

fn run_step(
    session: &mut Session,
    step: Step,
    fail_release: bool,
    fail_rollback: bool,
) -> EmulatorResult<String> {
    let key = session.adapter_mut().open_savepoint();
    match step {
        Step::Release => {
            if fail_release {
                session.adapter_mut().fail_next_release("scripted release failure");
            }
            session.release(&key)?;
            Ok("committed".to_string())
        }
        Step::Rollback => {
            if fail_rollback {
                session.adapter_mut().fail_next_rollback("scripted rollback failure");
            }
            let outcome = session.rollback_to(&key)?;
            Ok(format!("{:?}", outcome))
        }
        Step::ReleaseThenRollback => {
            session.release(&key)?;
            let outcome = session.rollback_to(&key)?;
            Ok(format!("{:?}", outcome))
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "savepoint_callbacks=trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!(
        r#"savepoint-callbacks - transaction lifecycle callbacks over savepoints

USAGE:
    savepoint-callbacks [OPTIONS]

OPTIONS:
    -v, --verbose            Log every notification (overridden by RUST_LOG)
        --fail-release       Make the scripted release fail
        --fail-rollback      Make the scripted rollback fail
        --physical-rollback  Still roll back savepoints that were committed
    -h, --help               Print this help message
        --version            Print version information

The runner releases one savepoint, rolls back another, then releases and
rolls back a third, printing the notifications fired at each step."#
    );
}
