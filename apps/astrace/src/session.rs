use anyhow::{anyhow, Context, Result};
use astrace_lookup::{enrich, LookupService};
use astrace_model::{HopRecord, TraceEvent};
use astrace_render::TableRenderer;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Completed,
    Unreachable,
    InvalidDestination,
    Exhausted,
}

impl Termination {
    fn of(event: &TraceEvent) -> Option<Self> {
        match event {
            TraceEvent::Completed => Some(Self::Completed),
            TraceEvent::Unreachable { .. } => Some(Self::Unreachable),
            TraceEvent::InvalidDestination { .. } => Some(Self::InvalidDestination),
            TraceEvent::Exhausted => Some(Self::Exhausted),
            _ => None,
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::Unreachable => 2,
            Self::InvalidDestination => 3,
            Self::Exhausted => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub termination: Termination,
    pub hops: u32,
}

#[derive(Debug)]
pub struct Reorder {
    next: u32,
    pending: BTreeMap<u32, HopRecord>,
}

impl Default for Reorder {
    fn default() -> Self {
        Self {
            next: 1,
            pending: BTreeMap::new(),
        }
    }
}

impl Reorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: HopRecord) {
        self.pending.insert(record.sequence, record);
    }

    pub fn pop_ready(&mut self) -> Option<HopRecord> {
        let record = self.pending.remove(&self.next)?;
        self.next += 1;
        Some(record)
    }
}

pub struct Session {
    concurrency: usize,
    completion_notice: String,
}

impl Session {
    pub fn new(concurrency: usize, completion_notice: impl Into<String>) -> Self {
        Self {
            concurrency: concurrency.max(1),
            completion_notice: completion_notice.into(),
        }
    }

    pub fn run<I, L, W, C>(
        &self,
        events: I,
        lookup: &L,
        renderer: &mut TableRenderer<W>,
        console: &mut C,
    ) -> Result<SessionOutcome>
    where
        I: IntoIterator<Item = TraceEvent>,
        L: LookupService + ?Sized,
        W: Write + Send,
        C: Write,
    {
        if self.concurrency == 1 {
            self.run_serial(events, lookup, renderer, console)
        } else {
            self.run_pooled(events, lookup, renderer, console)
        }
    }

    fn run_serial<I, L, W, C>(
        &self,
        events: I,
        lookup: &L,
        renderer: &mut TableRenderer<W>,
        console: &mut C,
    ) -> Result<SessionOutcome>
    where
        I: IntoIterator<Item = TraceEvent>,
        L: LookupService + ?Sized,
        W: Write,
        C: Write,
    {
        let mut sequence = 0;
        for event in events {
            if let TraceEvent::HopDiscovered { address } = &event {
                sequence += 1;
                let record = enrich(lookup, sequence, address);
                renderer.print(&record).context("failed to write hop row")?;
                continue;
            }

            if let Some(termination) = self.announce(&event, console)? {
                return Ok(SessionOutcome {
                    termination,
                    hops: renderer.rows_printed(),
                });
            }
        }

        Ok(self.finish_without_terminal(renderer.rows_printed()))
    }

    fn run_pooled<I, L, W, C>(
        &self,
        events: I,
        lookup: &L,
        renderer: &mut TableRenderer<W>,
        console: &mut C,
    ) -> Result<SessionOutcome>
    where
        I: IntoIterator<Item = TraceEvent>,
        L: LookupService + ?Sized,
        W: Write + Send,
        C: Write,
    {
        let (job_tx, job_rx) = mpsc::channel::<(u32, String)>();
        let (done_tx, done_rx) = mpsc::channel::<HopRecord>();
        let job_rx = Mutex::new(job_rx);

        thread::scope(|scope| -> Result<SessionOutcome> {
            for _ in 0..self.concurrency {
                let job_rx = &job_rx;
                let done_tx = done_tx.clone();
                scope.spawn(move || loop {
                    let job = match job_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    let Ok((sequence, address)) = job else {
                        break;
                    };
                    if done_tx.send(enrich(lookup, sequence, &address)).is_err() {
                        break;
                    }
                });
            }
            drop(done_tx);

            // Rows render as soon as their lookup and every earlier one finish,
            // even while the tracer is silent.
            let printer = scope.spawn(move || -> Result<u32> {
                let mut reorder = Reorder::new();
                for record in done_rx {
                    reorder.push(record);
                    render_ready(&mut reorder, renderer)?;
                }
                Ok(renderer.rows_printed())
            });

            let mut dispatched = 0;
            let mut terminal = None;

            for event in events {
                if let TraceEvent::HopDiscovered { address } = event {
                    dispatched += 1;
                    job_tx
                        .send((dispatched, address))
                        .map_err(|_| anyhow!("lookup workers stopped"))?;
                } else if Termination::of(&event).is_some() {
                    terminal = Some(event);
                    break;
                } else {
                    self.announce(&event, console)?;
                }
            }

            // No new lookups after a terminal event; the ones in flight still render.
            drop(job_tx);
            let hops = printer
                .join()
                .map_err(|_| anyhow!("hop printer panicked"))??;
            if hops < dispatched {
                return Err(anyhow!(
                    "lookup workers stopped before finishing ({hops} of {dispatched} hops)"
                ));
            }

            match terminal {
                Some(event) => {
                    let termination = self
                        .announce(&event, console)?
                        .unwrap_or(Termination::Exhausted);
                    Ok(SessionOutcome { termination, hops })
                }
                None => Ok(self.finish_without_terminal(hops)),
            }
        })
    }

    fn announce<C: Write>(&self, event: &TraceEvent, console: &mut C) -> Result<Option<Termination>> {
        match event {
            TraceEvent::Started { destination, banner } => {
                debug!(destination = ?destination, "trace started");
                writeln!(console, "{banner}")?;
            }
            TraceEvent::MaxHopsReached => debug!("hop collection enabled"),
            TraceEvent::HopDiscovered { .. } => {}
            TraceEvent::Unreachable { message } | TraceEvent::InvalidDestination { message } => {
                writeln!(console, "{message}")?;
            }
            TraceEvent::Completed => writeln!(console, "{}", self.completion_notice)?,
            TraceEvent::Exhausted => warn!("tracer output ended without a completion marker"),
        }
        console.flush()?;

        Ok(Termination::of(event))
    }

    fn finish_without_terminal(&self, hops: u32) -> SessionOutcome {
        warn!("event stream ended without a terminal event");
        SessionOutcome {
            termination: Termination::Exhausted,
            hops,
        }
    }
}

fn render_ready<W: Write>(reorder: &mut Reorder, renderer: &mut TableRenderer<W>) -> Result<()> {
    while let Some(record) = reorder.pop_ready() {
        renderer.print(&record).context("failed to write hop row")?;
    }
    Ok(())
}
