//! The game adapter boundary.
//!
//! Mini-games are black boxes to the lifecycle logic: given an
//! enabled/disabled flag they eventually produce one final integer
//! score. How the score came to be (physics, chat transcripts) is none
//! of the controller's business.
//!
//! The one rule a game must not break, reporting at most once per play
//! session, is enforced by construction: [`ScoreReporter::report`]
//! consumes the reporter, so a second call does not compile.

use tokio::sync::oneshot;

/// Creates a connected reporter/future pair for one play session.
pub fn score_channel() -> (ScoreReporter, ScoreFuture) {
    let (tx, rx) = oneshot::channel();
    (ScoreReporter { tx }, ScoreFuture { rx })
}

/// The game's half: call [`report`](Self::report) once when the game is
/// over. Dropping it unreported means the session ended without a score
/// (player quit, adapter torn down).
#[derive(Debug)]
pub struct ScoreReporter {
    tx: oneshot::Sender<u64>,
}

impl ScoreReporter {
    /// Delivers the final score. Consumes the reporter; a play session
    /// reports once or not at all.
    pub fn report(self, score: u64) {
        // Receiver gone means the owning session was torn down; the
        // score is simply discarded.
        let _ = self.tx.send(score);
    }
}

/// The controller's half: resolves when the game reports.
#[derive(Debug)]
pub struct ScoreFuture {
    rx: oneshot::Receiver<u64>,
}

impl ScoreFuture {
    /// Waits for the final score. `None` if the game ended without
    /// reporting one.
    pub async fn score(self) -> Option<u64> {
        self.rx.await.ok()
    }
}

/// A mini-game as the lifecycle controller sees it.
pub trait GameAdapter {
    /// Begins a play session. The game keeps the reporter and calls
    /// `report` exactly once when the run ends. Must not be called
    /// while disabled.
    fn start(&mut self, reporter: ScoreReporter);

    /// Enables or disables input. A disabled game must refuse new play
    /// sessions.
    fn set_disabled(&mut self, disabled: bool);

    /// Current disabled state.
    fn is_disabled(&self) -> bool;
}
