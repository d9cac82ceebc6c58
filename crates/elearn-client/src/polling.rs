use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

type PollTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// What to do when a tick fires while the previous run is still going.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Drop the tick; the next one gets another chance.
    #[default]
    SkipIfBusy,
    /// Start another run alongside the one in flight.
    Allow,
}

/// Re-runs a task on a fixed cadence.
///
/// The task sits in a shared cell that every tick reads, so `set_task`
/// takes effect on the very next tick without touching the timer. The
/// timer itself is only rebuilt when the interval or the dependency key
/// passed to `update` changes.
///
/// Tasks handle their own errors; a failed run does not slow the cadence.
/// Must be created inside a Tokio runtime.
pub struct Poller {
    task: Arc<RwLock<PollTask>>,
    busy: Arc<AtomicBool>,
    policy: OverlapPolicy,
    interval: Duration,
    deps: u64,
    /// Bumped on every stop. A timer only starts a run while holding this
    /// lock and seeing its own epoch, so nothing starts after `stop`.
    epoch: Arc<Mutex<u64>>,
    timer: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn start<F, Fut, D>(task: F, interval: Duration, deps: &D) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        D: Hash + ?Sized,
    {
        Self::with_policy(task, interval, deps, OverlapPolicy::default())
    }

    pub fn with_policy<F, Fut, D>(task: F, interval: Duration, deps: &D, policy: OverlapPolicy) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        D: Hash + ?Sized,
    {
        let mut poller = Self {
            task: Arc::new(RwLock::new(boxed(task))),
            busy: Arc::new(AtomicBool::new(false)),
            policy,
            interval: non_zero(interval),
            deps: hash_deps(deps),
            epoch: Arc::new(Mutex::new(0)),
            timer: None,
        };
        poller.spawn_timer();
        poller
    }

    /// Swap in a new task. The next tick runs it.
    pub fn set_task<F, Fut>(&self, task: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.task.write().unwrap_or_else(|p| p.into_inner());
        *slot = boxed(task);
    }

    /// Restart the timer if `interval` or `deps` differ from the current
    /// ones. Returns whether it restarted.
    pub fn update<D: Hash + ?Sized>(&mut self, interval: Duration, deps: &D) -> bool {
        let interval = non_zero(interval);
        let deps = hash_deps(deps);
        if interval == self.interval && deps == self.deps && self.timer.is_some() {
            return false;
        }

        // The old timer must be gone before the new one exists.
        self.stop();
        self.interval = interval;
        self.deps = deps;
        self.spawn_timer();
        true
    }

    /// Cancel the timer. A run that already started is left to finish.
    pub fn stop(&mut self) {
        *self.epoch.lock().unwrap_or_else(|p| p.into_inner()) += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!("Poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn spawn_timer(&mut self) {
        debug!("Polling every {:?}", self.interval);
        let epoch = *self.epoch.lock().unwrap_or_else(|p| p.into_inner());
        self.timer = Some(tokio::spawn(run_timer(
            self.task.clone(),
            self.busy.clone(),
            self.policy,
            self.interval,
            self.epoch.clone(),
            epoch,
        )));
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(
    task: Arc<RwLock<PollTask>>,
    busy: Arc<AtomicBool>,
    policy: OverlapPolicy,
    period: Duration,
    epoch: Arc<Mutex<u64>>,
    started_in: u64,
) {
    // First run one full period after start, like a browser interval.
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !start_run(&task, &busy, policy, &epoch, started_in) {
            trace!("Poller stopped, timer exiting");
            return;
        }
    }
}

/// Start one run unless the tick should be skipped. Returns false once
/// the poller has been stopped.
///
/// Abort cannot reach a timer that is already past its await point on
/// another worker, so the epoch is checked under its lock and held until
/// the run is spawned.
fn start_run(
    task: &RwLock<PollTask>,
    busy: &Arc<AtomicBool>,
    policy: OverlapPolicy,
    epoch: &Mutex<u64>,
    started_in: u64,
) -> bool {
    let current_epoch = epoch.lock().unwrap_or_else(|p| p.into_inner());
    if *current_epoch != started_in {
        return false;
    }

    let guard = match policy {
        OverlapPolicy::SkipIfBusy => {
            if busy.swap(true, Ordering::AcqRel) {
                trace!("Previous poll still running, skipping tick");
                return true;
            }
            Some(BusyGuard(busy.clone()))
        }
        OverlapPolicy::Allow => None,
    };

    let current = task.read().unwrap_or_else(|p| p.into_inner()).clone();
    tokio::spawn(async move {
        current().await;
        drop(guard);
    });
    true
}

/// Clears the busy flag when a run ends, even by panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn boxed<F, Fut>(task: F) -> PollTask
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move || task().boxed())
}

fn hash_deps<D: Hash + ?Sized>(deps: &D) -> u64 {
    let mut hasher = DefaultHasher::new();
    deps.hash(&mut hasher);
    hasher.finish()
}

fn non_zero(interval: Duration) -> Duration {
    interval.max(Duration::from_millis(1))
}
