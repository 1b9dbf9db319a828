//! Headless games driven by a greedy player.

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use strictly_2048::{
    Board, Direction, GameConfig, GamePhase, GameStateMachine, InstantAnimation, MoveResolver,
};
use tracing::{debug, info, instrument};

/// Picks the move with the largest immediate merge score.
///
/// Ties are broken at random among the moves that change the board.
pub struct GreedyPlayer {
    rng: StdRng,
}

impl GreedyPlayer {
    /// Creates a player with a seeded tie-breaker.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Chooses a move, or `None` when no move changes the board.
    pub fn choose(&mut self, board: &Board) -> Option<Direction> {
        let mut best_gain = 0;
        let mut candidates = Vec::new();
        for direction in Direction::ALL {
            let Ok(turn) = MoveResolver::preview(board, direction) else {
                continue;
            };
            if turn.is_noop() {
                continue;
            }
            let gain = turn.score_gain();
            if candidates.is_empty() || gain > best_gain {
                best_gain = gain;
                candidates.clear();
                candidates.push(direction);
            } else if gain == best_gain {
                candidates.push(direction);
            }
        }
        candidates.choose(&mut self.rng).copied()
    }
}

/// Result of one simulated game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    /// Final score.
    pub score: u64,
    /// Largest tile on the final board.
    pub max_tile: u32,
    /// Turns played.
    pub rounds: u64,
    /// Whether the win value was reached.
    pub won: bool,
}

/// Aggregate of several simulated games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// Every game's outcome, in order.
    pub outcomes: Vec<GameOutcome>,
}

impl Summary {
    /// Games that reached the win value.
    pub fn wins(&self) -> usize {
        self.outcomes.iter().filter(|o| o.won).count()
    }

    /// Highest final score.
    pub fn best_score(&self) -> u64 {
        self.outcomes.iter().map(|o| o.score).max().unwrap_or(0)
    }

    /// Mean final score.
    pub fn mean_score(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let total: u64 = self.outcomes.iter().map(|o| o.score).sum();
        total as f64 / self.outcomes.len() as f64
    }

    /// Largest tile across all games.
    pub fn max_tile(&self) -> u32 {
        self.outcomes.iter().map(|o| o.max_tile).max().unwrap_or(0)
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:>5} {:>8} {:>8} {:>7} {:>4}", "game", "score", "max", "rounds", "won")?;
        for (i, o) in self.outcomes.iter().enumerate() {
            writeln!(
                f,
                "{:>5} {:>8} {:>8} {:>7} {:>4}",
                i + 1,
                o.score,
                o.max_tile,
                o.rounds,
                if o.won { "yes" } else { "no" }
            )?;
        }
        write!(
            f,
            "games: {}  wins: {}  best: {}  mean: {:.1}  max tile: {}",
            self.outcomes.len(),
            self.wins(),
            self.best_score(),
            self.mean_score(),
            self.max_tile()
        )
    }
}

/// Plays `games` games to completion, continuing past a win.
///
/// Game `n` seeds its spawner with `seed + n`.
#[instrument(skip(config))]
pub async fn run(config: &GameConfig, games: u32, seed: u64, max_rounds: u64) -> Result<Summary> {
    let mut summary = Summary::default();
    for n in 0..u64::from(games) {
        let game_seed = seed.wrapping_add(n);
        let game_config = config.clone().with_seed(Some(game_seed));
        let outcome = play_one(game_config, game_seed, max_rounds).await?;
        debug!(game = n, ?outcome, "Game finished");
        summary.outcomes.push(outcome);
    }
    info!(
        games,
        wins = summary.wins(),
        best = summary.best_score(),
        "Simulation complete"
    );
    Ok(summary)
}

async fn play_one(config: GameConfig, seed: u64, max_rounds: u64) -> Result<GameOutcome> {
    let mut game = GameStateMachine::new(config)?;
    let mut player = GreedyPlayer::new(seed);
    let mut animation = InstantAnimation;
    game.start()?;

    while game.round() < max_rounds {
        match game.phase() {
            GamePhase::Won => {
                game.continue_game()?;
            }
            GamePhase::WaitingInput => {
                let Some(direction) = player.choose(game.board()) else {
                    break;
                };
                game.play(direction, &mut animation).await?;
            }
            _ => break,
        }
    }

    Ok(GameOutcome {
        score: game.score(),
        max_tile: game.board().max_value(),
        rounds: game.round(),
        won: game.has_won(),
    })
}
