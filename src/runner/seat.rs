//! Player seats: how the runner talks to one bot.
//!
//! Without a time budget the bot is called inline on the match thread.
//! With a budget it lives on its own worker thread and the runner waits for
//! its answer until a deadline. Replies carry the turn they answer, so a
//! late reply to an earlier turn is recognised and discarded.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::debug;

use crate::error::PlayerFault;
use crate::game::{GameView, Order, PlayerId};
use crate::player::Player;

/// A player's answer for one turn.
type Answer = Result<Vec<Order>, PlayerFault>;

/// Call a player, turning errors and panics into a fault.
fn call_player(player: &mut dyn Player, view: &GameView) -> Answer {
    match panic::catch_unwind(AssertUnwindSafe(|| player.play_turn(view))) {
        Ok(Ok(orders)) => Ok(orders),
        Ok(Err(e)) => Err(e.into()),
        Err(payload) => Err(PlayerFault::Raised {
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

fn thread_exited() -> PlayerFault {
    PlayerFault::Raised {
        message: "player thread exited".to_string(),
    }
}

/// How a seat reaches its player.
enum Link {
    /// Called on the match thread.
    Inline(Box<dyn Player>),
    /// Running on a worker thread.
    Threaded {
        /// Views for the worker, tagged with the turn.
        requests: Sender<(u32, GameView)>,
        /// Answers from the worker, tagged with the turn.
        replies: Receiver<(u32, Answer)>,
        /// Per-turn budget.
        budget: Duration,
    },
}

/// State of the current turn's request.
enum Pending {
    /// Nothing asked.
    Idle,
    /// Inline call already answered.
    Answered(Answer),
    /// Worker is thinking about `turn` since `sent`.
    Waiting {
        /// Turn asked for.
        turn: u32,
        /// When the view was handed over.
        sent: Instant,
    },
}

/// One player's seat in a match.
pub(crate) struct Seat {
    /// Seat number (1-based).
    id: PlayerId,
    /// Player name, captured at the start of the match.
    name: String,
    /// Connection to the player.
    link: Link,
    /// Outstanding request.
    pending: Pending,
}

impl std::fmt::Debug for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seat")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Seat {
    /// Seat a player, starting a worker thread when a budget is given.
    pub(crate) fn new(
        id: PlayerId,
        player: Box<dyn Player>,
        budget: Option<Duration>,
    ) -> std::io::Result<Self> {
        let name = player.name().to_string();
        let link = match budget {
            None => Link::Inline(player),
            Some(budget) => spawn_worker(id, player, budget)?,
        };
        Ok(Self {
            id,
            name,
            link,
            pending: Pending::Idle,
        })
    }

    /// Seat number.
    pub(crate) const fn id(&self) -> PlayerId {
        self.id
    }

    /// Player name.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Hand this turn's view to the player.
    ///
    /// Inline seats answer immediately; threaded seats start working right
    /// away so that every player thinks at the same time.
    pub(crate) fn dispatch(&mut self, turn: u32, view: GameView) {
        self.pending = match &mut self.link {
            Link::Inline(player) => Pending::Answered(call_player(player.as_mut(), &view)),
            Link::Threaded { requests, .. } => match requests.send((turn, view)) {
                Ok(()) => Pending::Waiting {
                    turn,
                    sent: Instant::now(),
                },
                Err(_) => Pending::Answered(Err(thread_exited())),
            },
        };
    }

    /// Wait for the answer to the outstanding request.
    pub(crate) fn collect(&mut self) -> Answer {
        let (turn, sent) = match std::mem::replace(&mut self.pending, Pending::Idle) {
            Pending::Idle => return Ok(Vec::new()),
            Pending::Answered(answer) => return answer,
            Pending::Waiting { turn, sent } => (turn, sent),
        };

        let Link::Threaded {
            replies, budget, ..
        } = &self.link
        else {
            return Ok(Vec::new());
        };

        let deadline = sent + *budget;
        loop {
            match replies.recv_deadline(deadline) {
                Ok((answered, answer)) if answered == turn => return answer,
                Ok((answered, _)) => {
                    debug!(seat = self.id, turn, answered, "discarding late reply");
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(PlayerFault::Timeout {
                        budget_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                    });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(thread_exited()),
            }
        }
    }
}

/// Move a player onto its own thread.
///
/// The worker answers requests in order until the seat is dropped. A
/// player stuck in a turn keeps its thread until it returns; the match does
/// not wait for it.
fn spawn_worker(id: PlayerId, mut player: Box<dyn Player>, budget: Duration) -> std::io::Result<Link> {
    let (request_tx, request_rx) = crossbeam_channel::unbounded::<(u32, GameView)>();
    let (reply_tx, reply_rx) = crossbeam_channel::unbounded::<(u32, Answer)>();

    thread::Builder::new()
        .name(format!("player-{id}"))
        .spawn(move || {
            for (turn, view) in request_rx {
                let answer = call_player(player.as_mut(), &view);
                let failed = answer.is_err();
                if reply_tx.send((turn, answer)).is_err() || failed {
                    break;
                }
            }
        })?;

    Ok(Link::Threaded {
        requests: request_tx,
        replies: reply_rx,
        budget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlayerError;
    use crate::game::{GameState, Map};

    struct Scripted {
        delay: Duration,
        fail: bool,
    }

    impl Player for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn play_turn(&mut self, view: &GameView) -> Result<Vec<Order>, PlayerError> {
            thread::sleep(self.delay);
            if self.fail {
                return Err(PlayerError::new("gave up"));
            }
            Ok(vec![Order::new(0, 1, view.turn())])
        }
    }

    struct Panicky;

    impl Player for Panicky {
        fn name(&self) -> &str {
            "panicky"
        }

        fn play_turn(&mut self, _view: &GameView) -> Result<Vec<Order>, PlayerError> {
            panic!("lost the plot");
        }
    }

    fn view(turn: u32) -> GameView {
        let map = Map::parse("m", "P 0 0 1 50 5\nP 4 0 2 50 5\n").unwrap();
        let mut state = GameState::new(&map, 100);
        for _ in 1..turn {
            state.step(&[]);
        }
        GameView::new(&state, 1)
    }

    fn scripted(delay_ms: u64, fail: bool) -> Box<dyn Player> {
        Box::new(Scripted {
            delay: Duration::from_millis(delay_ms),
            fail,
        })
    }

    #[test]
    fn test_inline_seat() {
        let mut seat = Seat::new(1, scripted(0, false), None).unwrap();
        assert_eq!(seat.name(), "scripted");
        assert_eq!(seat.id(), 1);
        seat.dispatch(3, view(3));
        assert_eq!(seat.collect().unwrap(), vec![Order::new(0, 1, 3)]);
        // Nothing outstanding
        assert!(seat.collect().unwrap().is_empty());
    }

    #[test]
    fn test_threaded_seat_answers() {
        let mut seat = Seat::new(2, scripted(0, false), Some(Duration::from_secs(5))).unwrap();
        seat.dispatch(1, view(1));
        assert_eq!(seat.collect().unwrap(), vec![Order::new(0, 1, 1)]);
        seat.dispatch(2, view(2));
        assert_eq!(seat.collect().unwrap(), vec![Order::new(0, 1, 2)]);
    }

    #[test]
    fn test_threaded_seat_times_out_and_discards_late_reply() {
        let mut seat =
            Seat::new(1, scripted(150, false), Some(Duration::from_millis(50))).unwrap();
        seat.dispatch(1, view(1));
        assert_eq!(
            seat.collect(),
            Err(PlayerFault::Timeout { budget_ms: 50 })
        );

        // The turn 1 reply is waiting in the channel by now and must not be
        // taken as the answer for turn 2.
        thread::sleep(Duration::from_millis(200));
        seat.dispatch(2, view(2));
        assert_eq!(
            seat.collect(),
            Err(PlayerFault::Timeout { budget_ms: 50 })
        );
    }

    #[test]
    fn test_error_becomes_raised_fault() {
        let mut seat = Seat::new(1, scripted(0, true), None).unwrap();
        seat.dispatch(1, view(1));
        assert_eq!(
            seat.collect(),
            Err(PlayerFault::Raised {
                message: "gave up".to_string()
            })
        );
    }

    #[test]
    fn test_panic_is_caught() {
        for budget in [None, Some(Duration::from_secs(5))] {
            let mut seat = Seat::new(1, Box::new(Panicky), budget).unwrap();
            seat.dispatch(1, view(1));
            let Err(PlayerFault::Raised { message }) = seat.collect() else {
                panic!("expected a raised fault");
            };
            assert!(message.contains("lost the plot"));
        }
    }
}
