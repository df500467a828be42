use crate::session::{Session, SessionStatus};
use crate::shutdown::Shutdown;
use log::{debug, info, warn};
use tokio::time::{self, MissedTickBehavior};

/// How the run loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Shutdown requested and the session stopped in time
    Graceful,

    /// The session was stopped through another handle
    StoppedElsewhere,

    /// Shutdown requested but the stop exceeded the configured bound
    TimedOut,

    /// Shutdown escalated before the stop completed
    Forced,
}

impl RunOutcome {
    /// Process exit code for a host reporting this outcome
    ///
    /// `1` is reserved for a failed init, so a late stop still exits with `0`.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Graceful | Self::StoppedElsewhere | Self::TimedOut => 0,
            Self::Forced => 130,
        }
    }
}

/// Keep `session` alive until shutdown is requested, then stop it
pub async fn run(session: &Session, shutdown: &Shutdown) -> RunOutcome {
    let config = session.config();
    let mut ticker = time::interval(config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!(
        "Run loop for session {} polling every {:?}",
        session.id(),
        config.poll_interval()
    );

    loop {
        tokio::select! {
            biased;
            _ = shutdown.requested() => break,
            _ = ticker.tick() => {
                let status = session.status();
                if status != SessionStatus::Running {
                    info!("Session {} is {}, leaving run loop", session.id(), status);
                    return RunOutcome::StoppedElsewhere;
                }
            }
        }
    }

    if shutdown.is_forced() {
        return RunOutcome::Forced;
    }

    info!("Shutdown requested, stopping session {}", session.id());
    tokio::select! {
        biased;
        _ = shutdown.forced() => {
            warn!("Shutdown forced while stopping session {}", session.id());
            RunOutcome::Forced
        }
        res = time::timeout(config.stop_timeout(), session.stop()) => match res {
            Ok(()) => RunOutcome::Graceful,
            Err(_) => {
                warn!(
                    "Session {} did not stop within {:?}",
                    session.id(),
                    config.stop_timeout()
                );
                RunOutcome::TimedOut
            }
        }
    }
}
