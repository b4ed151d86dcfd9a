//! Adaptive controller: plans with heuristic search and replans when the
//! stochastic environment pushes the agent off course.
//!
//! Each decision runs through the same stages:
//!
//! 1. **Drift check.** If the last committed action did not land the agent
//!    where the deterministic move would have, the pending plan is dropped
//!    and the replan counter increases.
//! 2. **Stagnation check.** If the agent has not moved for more than
//!    `stuck_limit` consecutive decisions, the pending plan is dropped.
//! 3. **Planning.** With no pending plan, the board snapshot and agent
//!    position are looked up in the plan cache. On a miss a fresh
//!    [`PressurePlateProblem`] is searched under a node budget scaled by the
//!    board area and the outcome is cached, failures included.
//! 4. **Acting.** The next planned action is popped and remembered for the
//!    next drift check.
//! 5. **Emergency move.** With no plan at all, a random direction towards
//!    open ground is chosen, or any direction when nothing is open.
//!
//! Planning never fails outward: every [`SearchFailure`] ends in the
//! emergency move.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::cell::{Direction, Position};
use crate::config::ControllerConfig;
use crate::environment::{ActionModel, Environment, Observation};
use crate::error::SearchFailure;
use crate::heuristic::PlateHeuristic;
use crate::layout::Layout;
use crate::problem::PressurePlateProblem;
use crate::search::{AStarSearch, SearchAlgorithm};

type PlanKey = (Layout, Position);

pub struct Controller {
    config: ControllerConfig,
    search: Box<dyn SearchAlgorithm<PressurePlateProblem>>,
    action_model: ActionModel,
    plan: VecDeque<Direction>,
    /// Plans per (snapshot, position); empty means no plan was found
    plan_cache: HashMap<PlanKey, Vec<Direction>>,
    last_position: Option<Position>,
    last_intended: Option<Direction>,
    replan_count: u32,
    stuck_counter: u32,
    searches_run: usize,
    rng: StdRng,
}

impl Controller {
    /// Creates a controller searching with A* and [`PlateHeuristic`].
    pub fn new<E: Environment + ?Sized>(env: &E, config: ControllerConfig) -> Self {
        let search = AStarSearch::new(Box::new(PlateHeuristic::new(config.weights)));
        Self::with_search(env, config, Box::new(search))
    }

    /// Creates a controller with a custom search algorithm.
    pub fn with_search<E: Environment + ?Sized>(
        env: &E,
        config: ControllerConfig,
        search: Box<dyn SearchAlgorithm<PressurePlateProblem>>,
    ) -> Self {
        let action_model = env.model().clone();
        for direction in Direction::ALL {
            log::debug!(
                "action {} executes as intended with p={:.3}",
                direction,
                action_model.reliability(direction)
            );
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            config,
            search,
            action_model,
            plan: VecDeque::new(),
            plan_cache: HashMap::new(),
            last_position: None,
            last_intended: None,
            replan_count: 0,
            stuck_counter: 0,
            searches_run: 0,
            rng,
        }
    }

    /// Picks the action to submit for the observed state.
    pub fn choose_next_action(&mut self, observation: &Observation) -> Direction {
        let current = observation.agent;

        if self.has_drifted(current) {
            log::debug!(
                "drifted to {} after {:?} from {:?}",
                current,
                self.last_intended,
                self.last_position
            );
            self.plan.clear();
            self.replan_count += 1;
        }

        if self.last_position == Some(current) {
            self.stuck_counter += 1;
            if self.stuck_counter > self.config.stuck_limit {
                log::debug!("stuck at {}, dropping plan", current);
                self.plan.clear();
                self.stuck_counter = 0;
            }
        } else {
            self.stuck_counter = 0;
        }

        if self.plan.is_empty() {
            self.plan = self.generate_plan(&observation.board, current);
        }

        match self.plan.pop_front() {
            Some(next) => {
                self.last_intended = Some(next);
                self.last_position = Some(current);
                next
            }
            None => self.emergency_move(&observation.board, current),
        }
    }

    /// Whether the agent is somewhere other than where the last committed
    /// action should have taken it.
    pub fn has_drifted(&self, current: Position) -> bool {
        match (self.last_position, self.last_intended) {
            (Some(from), Some(action)) => expected_position(from, action) != current,
            _ => false,
        }
    }

    /// Plan for `board` with the agent at `position`, from cache if possible.
    fn generate_plan(&mut self, board: &Layout, position: Position) -> VecDeque<Direction> {
        let key = (board.clone(), position);
        if let Some(cached) = self.plan_cache.get(&key) {
            log::debug!("plan cache hit at {} ({} actions)", position, cached.len());
            return cached.iter().copied().collect();
        }
        log::debug!("plan cache miss at {}", position);

        let actions = match self.search_plan(board) {
            Ok(actions) => {
                log::info!("planned {} actions from {}", actions.len(), position);
                actions
            }
            Err(SearchFailure::NoSolution) => {
                log::info!("no solution from {}", position);
                Vec::new()
            }
            Err(err @ SearchFailure::BudgetExhausted { .. }) => {
                log::warn!("planning from {} gave up: {}", position, err);
                Vec::new()
            }
            Err(err @ SearchFailure::InternalFault(_)) => {
                log::error!("planning from {} failed: {}", position, err);
                Vec::new()
            }
        };

        let plan = actions.iter().copied().collect();
        self.plan_cache.insert(key, actions);
        plan
    }

    fn search_plan(&mut self, board: &Layout) -> Result<Vec<Direction>, SearchFailure> {
        let mut problem = PressurePlateProblem::new(board)?;
        let budget = self.config.budget_for_area(board.area());
        self.searches_run += 1;
        let solution = self.search.search(&mut problem, budget)?;
        log::debug!("search expanded {} states", solution.expanded());
        Ok(solution.actions())
    }

    fn emergency_move(&mut self, board: &Layout, position: Position) -> Direction {
        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&direction| {
                board
                    .get(position.step(direction))
                    .is_some_and(|cell| cell.is_open_ground())
            })
            .collect();

        let pool: &[Direction] = if open.is_empty() {
            &Direction::ALL
        } else {
            &open
        };
        let choice = pool.choose(&mut self.rng).copied().unwrap_or(Direction::Up);
        log::warn!("no plan from {}, emergency move {}", position, choice);
        choice
    }

    /// Plays `env` until it reports the game over or `max_steps` actions
    /// have been submitted, and returns the final observation.
    pub fn play_episode<E: Environment + ?Sized>(&mut self, env: &mut E, max_steps: u32) -> Observation {
        for _ in 0..max_steps {
            let observation = env.current_state();
            if observation.done {
                break;
            }
            let action = self.choose_next_action(&observation);
            env.submit_next_action(action);
        }

        let last = env.current_state();
        log::info!(
            "episode ended after {} steps, success={}, replans={}",
            last.steps,
            last.success,
            self.replan_count
        );
        last
    }

    pub fn action_model(&self) -> &ActionModel {
        &self.action_model
    }

    pub fn pending_plan(&self) -> &VecDeque<Direction> {
        &self.plan
    }

    pub fn replan_count(&self) -> u32 {
        self.replan_count
    }

    pub fn stuck_counter(&self) -> u32 {
        self.stuck_counter
    }

    pub fn cached_plans(&self) -> usize {
        self.plan_cache.len()
    }

    /// Number of times the search engine has been invoked.
    pub fn searches_run(&self) -> usize {
        self.searches_run
    }
}

/// Where `action` takes an agent at `from` if executed as intended.
pub fn expected_position(from: Position, action: Direction) -> Position {
    from.step(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::environment::SimulatedGame;
    use crate::search::Solution;

    const LEVEL: [[u8; 5]; 4] = [
        [99, 99, 2, 99, 99],
        [99, 99, 40, 99, 99],
        [99, 1, 10, 20, 99],
        [99, 99, 99, 99, 99],
    ];

    const CORRIDOR: [[u8; 5]; 3] = [
        [99, 99, 99, 99, 99],
        [99, 1, 98, 2, 99],
        [99, 99, 99, 99, 99],
    ];

    fn observe(rows: &[[u8; 5]]) -> (SimulatedGame, Observation) {
        let layout = Layout::from_rows(rows).unwrap();
        let game = SimulatedGame::new(&layout, GameConfig::default()).unwrap();
        let observation = game.current_state();
        (game, observation)
    }

    fn controller(game: &SimulatedGame) -> Controller {
        Controller::new(game, ControllerConfig::default().with_seed(1))
    }

    struct FailingSearch(SearchFailure);

    impl SearchAlgorithm<PressurePlateProblem> for FailingSearch {
        fn search(
            &self,
            _problem: &mut PressurePlateProblem,
            _budget: usize,
        ) -> Result<Solution<Direction, crate::state::PuzzleState>, SearchFailure> {
            Err(self.0.clone())
        }
    }

    #[test]
    fn test_drift_detected_when_agent_did_not_move() {
        let (game, _) = observe(&LEVEL);
        let mut controller = controller(&game);
        controller.last_position = Some(Position::new(2, 2));
        controller.last_intended = Some(Direction::Right);

        assert_eq!(
            expected_position(Position::new(2, 2), Direction::Right),
            Position::new(2, 3)
        );
        assert!(controller.has_drifted(Position::new(2, 2)));
        assert!(!controller.has_drifted(Position::new(2, 3)));
    }

    #[test]
    fn test_no_drift_without_history() {
        let (game, _) = observe(&LEVEL);
        let controller = controller(&game);
        assert!(!controller.has_drifted(Position::new(0, 0)));
    }

    #[test]
    fn test_first_decision_follows_plan() {
        let (game, observation) = observe(&LEVEL);
        let mut controller = controller(&game);
        assert_eq!(controller.choose_next_action(&observation), Direction::Right);
        assert_eq!(
            controller.pending_plan().iter().copied().collect::<Vec<_>>(),
            vec![Direction::Up, Direction::Up]
        );
        assert_eq!(controller.searches_run(), 1);
        assert_eq!(controller.cached_plans(), 1);
    }

    #[test]
    fn test_drift_clears_plan_and_counts_replan() {
        let (game, observation) = observe(&LEVEL);
        let mut controller = controller(&game);
        controller.choose_next_action(&observation);
        assert_eq!(controller.pending_plan().len(), 2);

        // The environment reports the agent still at its start position.
        let next = controller.choose_next_action(&observation);
        assert_eq!(controller.replan_count(), 1);
        assert_eq!(controller.stuck_counter(), 1);
        // Replanning from the same configuration reuses the cached plan.
        assert_eq!(next, Direction::Right);
        assert_eq!(controller.searches_run(), 1);
    }

    #[test]
    fn test_stuck_limit_resets_counter() {
        let (game, observation) = observe(&LEVEL);
        let mut controller = controller(&game);
        for _ in 0..4 {
            controller.choose_next_action(&observation);
        }
        assert_eq!(controller.stuck_counter(), 3);
        controller.choose_next_action(&observation);
        assert_eq!(controller.stuck_counter(), 0);
    }

    #[test]
    fn test_cache_idempotence() {
        let (game, observation) = observe(&LEVEL);
        let mut controller = controller(&game);

        let first = controller.generate_plan(&observation.board, observation.agent);
        let second = controller.generate_plan(&observation.board, observation.agent);
        assert_eq!(first, second);
        assert_eq!(controller.searches_run(), 1);
        assert_eq!(controller.cached_plans(), 1);
    }

    #[test]
    fn test_failed_search_is_cached_as_empty() {
        for failure in [
            SearchFailure::NoSolution,
            SearchFailure::BudgetExhausted { expanded: 5 },
            SearchFailure::InternalFault("boom".to_string()),
        ] {
            let (game, observation) = observe(&CORRIDOR);
            let mut controller = Controller::with_search(
                &game,
                ControllerConfig::default().with_seed(9),
                Box::new(FailingSearch(failure)),
            );

            let action = controller.choose_next_action(&observation);
            // Only the cell to the right of the agent is open ground.
            assert_eq!(action, Direction::Right);
            assert_eq!(controller.cached_plans(), 1);
            assert!(controller.pending_plan().is_empty());

            controller.choose_next_action(&observation);
            assert_eq!(controller.searches_run(), 1);
        }
    }

    #[test]
    fn test_malformed_snapshot_falls_back_to_emergency_move() {
        // No goal on the board: the formulation cannot be built.
        let layout = Layout::from_rows(&[[99u8, 1, 98, 99]]).unwrap();
        let observation = Observation {
            board: layout,
            agent: Position::new(0, 1),
            steps: 0,
            done: false,
            success: false,
        };
        let (game, _) = observe(&LEVEL);
        let mut controller = controller(&game);

        assert_eq!(controller.choose_next_action(&observation), Direction::Right);
        assert_eq!(controller.searches_run(), 0);
        assert_eq!(controller.cached_plans(), 1);
    }

    #[test]
    fn test_emergency_move_prefers_open_ground() {
        // Plate above, block to the left, closed door to the right, wall below.
        let layout = Layout::from_rows(&[[99u8, 20, 99], [10, 1, 41], [99, 99, 99]]).unwrap();
        let (game, _) = observe(&LEVEL);
        let mut controller = controller(&game);
        for _ in 0..20 {
            assert_eq!(
                controller.emergency_move(&layout, Position::new(1, 1)),
                Direction::Up
            );
        }
    }

    #[test]
    fn test_emergency_move_without_open_ground_picks_any_direction() {
        let layout = Layout::from_rows(&[[99u8, 99, 99], [99, 1, 40], [2, 99, 99]]).unwrap();
        let (game, _) = observe(&LEVEL);
        let mut controller = controller(&game);
        for _ in 0..10 {
            let choice = controller.emergency_move(&layout, Position::new(1, 1));
            assert!(Direction::ALL.contains(&choice));
        }
    }

    #[test]
    fn test_plays_level_to_the_goal() {
        let (mut game, _) = observe(&LEVEL);
        let mut controller = controller(&game);
        let last = controller.play_episode(&mut game, 20);
        assert!(last.done);
        assert!(last.success);
        assert_eq!(last.steps, 3);
        assert_eq!(controller.replan_count(), 0);
    }
}
