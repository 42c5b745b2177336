//! The cooperative poll loop that sits above [`Swarm`].
//!
//! One swarm is live at a time. A reset drops it, taking the roster and the
//! socket with it, and a fresh one is built in its place.

use std::future::Future;
use std::time::Duration;

use log::{error, info, warn};
use tokio::time::{self, MissedTickBehavior};

use crate::swarm::{Flow, Swarm};
use crate::types::Millis;

/// Tick the swarm every `poll_interval` until `shutdown` completes, then
/// return the swarm that was live at that point.
pub async fn run<B, F, C, S>(
    mut build: B,
    mut clock: C,
    poll_interval: Duration,
    shutdown: S,
) -> anyhow::Result<Swarm>
where
    B: FnMut(Millis) -> F,
    F: Future<Output = anyhow::Result<Swarm>>,
    C: FnMut() -> Millis,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let mut swarm = match build(clock()).await {
            Ok(swarm) => swarm,
            Err(e) => {
                error!("Failed to start swarm: {}", e);
                return Err(e);
            }
        };
        info!(
            "Device {} disseminating to {}",
            swarm.roster().self_identity(),
            swarm.group()
        );

        let mut ticker = time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => return Ok(swarm),
                _ = ticker.tick() => {
                    if swarm.cycle(clock()).await == Flow::Reset {
                        break;
                    }
                }
            }
        }

        warn!("Restarting with an empty roster");
    }
}
