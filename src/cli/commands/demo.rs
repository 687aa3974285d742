//! Demo CLI commands.
//!
//! Each demo drives one helper with a synthetic call stream on the live
//! runtime and reports what happened, with timestamps relative to the start.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use parking_lot::Mutex;
use tokio::time::{sleep, Instant};

use crate::cli::output::{output, table, truncate, CommandOutput};
use crate::domain::models::{Config, Snapshot};
use crate::infrastructure::scheduling::{InteractionGate, IntervalFrameClock};
use crate::services::{debounce, throttle, DeferredScheduler, MemoCell, NonBlockingOperation};

#[derive(Args, Debug)]
pub struct DemoArgs {
    #[command(subcommand)]
    pub command: DemoCommands,
}

#[derive(Subcommand, Debug)]
pub enum DemoCommands {
    /// Fire a burst of calls at a debounced function
    Debounce {
        /// Number of calls in the burst
        #[arg(short = 'n', long, default_value_t = 5)]
        calls: usize,
        /// Gap between calls in milliseconds
        #[arg(short, long, default_value_t = 50)]
        gap_ms: u64,
        /// Quiet window in milliseconds (defaults to timing.debounce_wait_ms)
        #[arg(short, long)]
        wait_ms: Option<u64>,
    },
    /// Fire a stream of calls at a throttled function
    Throttle {
        /// Number of calls in the stream
        #[arg(short = 'n', long, default_value_t = 10)]
        calls: usize,
        /// Gap between calls in milliseconds
        #[arg(short, long, default_value_t = 50)]
        gap_ms: u64,
        /// Cooldown in milliseconds (defaults to timing.throttle_limit_ms)
        #[arg(short, long)]
        limit_ms: Option<u64>,
    },
    /// Recompute a memoized value over a sequence of dependency lists
    Memo {
        /// Dependency list per render, as JSON (e.g. '[1, "a"]')
        #[arg(required = true)]
        deps: Vec<String>,
    },
    /// Run a synchronous operation without blocking the caller
    Run {
        /// Sum the integers 1..=N inside the operation
        #[arg(short = 'n', long, default_value_t = 1_000_000)]
        upto: u64,
    },
    /// Defer a task until simulated interactions finish
    Defer {
        /// Number of overlapping interactions
        #[arg(short, long, default_value_t = 3)]
        interactions: u32,
        /// How long each interaction is held, in milliseconds
        #[arg(long, default_value_t = 100)]
        hold_ms: u64,
    },
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DemoEvent {
    pub at_ms: u64,
    pub event: String,
}

#[derive(Debug, serde::Serialize)]
pub struct DemoReport {
    pub helper: &'static str,
    pub calls: usize,
    pub invocations: u64,
    pub events: Vec<DemoEvent>,
}

impl CommandOutput for DemoReport {
    fn to_human(&self) -> String {
        let mut t = table(["AT (ms)", "EVENT"]);
        for event in &self.events {
            t.add_row(vec![event.at_ms.to_string(), truncate(&event.event, 72)]);
        }

        format!(
            "{t}\n\n{}: {} call(s), {} invocation(s)",
            self.helper, self.calls, self.invocations
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Shared, timestamped event log written from the demo and from helper callbacks.
#[derive(Debug, Clone)]
struct EventLog {
    start: Instant,
    events: Arc<Mutex<Vec<DemoEvent>>>,
}

impl EventLog {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, event: impl Into<String>) {
        let at_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.events.lock().push(DemoEvent {
            at_ms,
            event: event.into(),
        });
    }

    fn into_events(self) -> Vec<DemoEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

/// Extra time allowed after the last timer before a demo reads its results.
const SETTLE: Duration = Duration::from_millis(20);

async fn debounce_demo(calls: usize, gap: Duration, wait: Duration) -> DemoReport {
    let log = EventLog::new();
    let sink = log.clone();
    let debounced = debounce(move |call: usize| sink.record(format!("fired with call #{call}")), wait);

    for call in 1..=calls {
        log.record(format!("call #{call}"));
        debounced.call(call);
        sleep(gap).await;
    }
    sleep(wait + SETTLE).await;

    DemoReport {
        helper: "debounce",
        calls,
        invocations: debounced.invocations(),
        events: log.into_events(),
    }
}

async fn throttle_demo(calls: usize, gap: Duration, limit: Duration) -> DemoReport {
    let log = EventLog::new();
    let sink = log.clone();
    let throttled = throttle(move |call: usize| sink.record(format!("ran call #{call}")), limit);

    for call in 1..=calls {
        if throttled.call(call).is_none() {
            log.record(format!("call #{call} dropped (cooling down)"));
        }
        sleep(gap).await;
    }

    DemoReport {
        helper: "throttle",
        calls,
        invocations: throttled.invocations(),
        events: log.into_events(),
    }
}

fn memo_demo(raw_deps: &[String], config: &Config) -> Result<DemoReport> {
    let log = EventLog::new();
    let mut cell = MemoCell::from_config(&config.timing);

    for (render, raw) in raw_deps.iter().enumerate() {
        let render = render + 1;
        let value: serde_json::Value =
            serde_json::from_str(raw).with_context(|| format!("Invalid JSON for render #{render}: {raw}"))?;
        let deps = Snapshot::from(value);
        let shown = deps.to_string();

        let before = cell.recomputations();
        let computed_at = *cell.compute(deps, || render);
        let outcome = if cell.recomputations() > before {
            "recomputed".to_string()
        } else {
            format!("reused value from render #{computed_at}")
        };
        log.record(format!("render #{render} deps={shown}: {outcome}"));
    }

    Ok(DemoReport {
        helper: "memo",
        calls: raw_deps.len(),
        invocations: cell.recomputations(),
        events: log.into_events(),
    })
}

async fn run_demo(upto: u64, config: &Config) -> Result<DemoReport> {
    let log = EventLog::new();
    let operation = NonBlockingOperation::new(move || (1..=upto).fold(0u64, u64::wrapping_add))
        .with_mode(config.timing.dispatch);

    log.record(format!("scheduled sum of 1..={upto} ({:?} dispatch)", operation.mode()));
    let pending = operation.run();
    log.record(format!("caller continued, task {} pending", pending.id()));
    let sum = pending.await.context("Deferred operation failed")?;
    log.record(format!("resolved with {sum}"));

    Ok(DemoReport {
        helper: "run",
        calls: 1,
        invocations: 1,
        events: log.into_events(),
    })
}

async fn defer_demo(interactions: u32, hold: Duration, config: &Config) -> Result<DemoReport> {
    let log = EventLog::new();
    let gate = InteractionGate::new();
    let clock = IntervalFrameClock::from_config(&config.timing)?;
    let scheduler = DeferredScheduler::new(Arc::new(gate.clone()), Arc::new(clock));

    let mut holders = Vec::new();
    for n in 1..=interactions {
        let handle = gate.begin();
        log.record(format!("interaction #{n} started"));
        let sink = log.clone();
        holders.push(tokio::spawn(async move {
            sleep(hold * n).await;
            sink.record(format!("interaction #{n} ended"));
            handle.end();
        }));
    }

    let sink = log.clone();
    let deferred = scheduler.run_after_interactions(move || sink.record("deferred task ran"));
    log.record("deferred task scheduled");
    deferred.await.context("Deferred task failed")?;

    for holder in holders {
        holder.await.context("Interaction task failed")?;
    }

    Ok(DemoReport {
        helper: "defer",
        calls: 1,
        invocations: 1,
        events: log.into_events(),
    })
}

pub async fn execute(args: DemoArgs, config: &Config, json_mode: bool) -> Result<()> {
    let report = match args.command {
        DemoCommands::Debounce { calls, gap_ms, wait_ms } => {
            let wait = wait_ms.map_or_else(|| config.timing.debounce_wait(), Duration::from_millis);
            debounce_demo(calls, Duration::from_millis(gap_ms), wait).await
        }
        DemoCommands::Throttle { calls, gap_ms, limit_ms } => {
            let limit = limit_ms.map_or_else(|| config.timing.throttle_limit(), Duration::from_millis);
            throttle_demo(calls, Duration::from_millis(gap_ms), limit).await
        }
        DemoCommands::Memo { deps } => memo_demo(&deps, config)?,
        DemoCommands::Run { upto } => run_demo(upto, config).await?,
        DemoCommands::Defer { interactions, hold_ms } => {
            defer_demo(interactions, Duration::from_millis(hold_ms), config).await?
        }
    };

    output(&report, json_mode);
    Ok(())
}
