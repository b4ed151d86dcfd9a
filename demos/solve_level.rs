use std::error::Error;

use plate_planner::{
    ActionModel, Controller, ControllerConfig, GameConfig, Layout, SimulatedGame,
};

/// Two plates of type 1 open the door in front of the goal.
const LEVEL: [[u8; 8]; 7] = [
    [99, 99, 99, 99, 99, 99, 99, 99],
    [99, 1, 98, 98, 98, 21, 99, 99],
    [99, 98, 11, 98, 98, 98, 99, 99],
    [99, 98, 98, 98, 11, 98, 41, 2],
    [99, 98, 98, 98, 98, 21, 99, 99],
    [99, 98, 98, 98, 98, 98, 99, 99],
    [99, 99, 99, 99, 99, 99, 99, 99],
];

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let layout = Layout::from_rows(&LEVEL)?;
    println!("{}", layout);

    // Intended moves succeed 85% of the time
    let model = ActionModel::new([
        [0.85, 0.05, 0.05, 0.05],
        [0.05, 0.85, 0.05, 0.05],
        [0.05, 0.05, 0.85, 0.05],
        [0.05, 0.05, 0.05, 0.85],
    ])?;
    let config = GameConfig::default().with_action_model(model).with_seed(7);
    let max_steps = config.max_steps;

    let mut game = SimulatedGame::new(&layout, config)?;
    let mut controller = Controller::new(&game, ControllerConfig::default().with_seed(7));

    let last = controller.play_episode(&mut game, max_steps);

    println!("{}", last.board);
    println!(
        "success: {}, steps: {}, reward: {}, replans: {}, searches: {}",
        last.success,
        last.steps,
        game.reward(),
        controller.replan_count(),
        controller.searches_run()
    );
    Ok(())
}
