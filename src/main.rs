use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fs;
use std::path::PathBuf;

use beer_game::io::presenter::{LogPresenter, Presenter};
use beer_game::io::reporting;
use beer_game::strategy::traits::OrderContext;
use beer_game::{DemandPattern, Engine, GameConfig, GameMode, Role, Strategy};

#[derive(Parser)]
#[command(name = "beer-game")]
#[command(about = "Beer Distribution Game simulation, played headless")]
struct Cli {
    /// JSON configuration file; flags below override its keys
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seat played by the scripted human
    #[arg(long)]
    role: Option<Role>,

    /// Customer demand pattern (constant, step, random, seasonal, volatile)
    #[arg(long)]
    pattern: Option<DemandPattern>,

    #[arg(long)]
    mode: Option<GameMode>,

    /// Number of weeks to play
    #[arg(long)]
    weeks: Option<u32>,

    #[arg(long)]
    initial_inventory: Option<u32>,

    /// Weekly chance of a random event, in [0, 1]
    #[arg(long)]
    event_probability: Option<f64>,

    /// Force one strategy on every AI seat
    #[arg(long)]
    ai_strategy: Option<Strategy>,

    /// Strategy that plays the human seat
    #[arg(long, default_value = "reactive")]
    player_strategy: Strategy,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Write the per-week history to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the event log to this CSV file
    #[arg(long)]
    events_csv: Option<PathBuf>,

    /// Log every week instead of every fifth
    #[arg(short, long)]
    verbose: bool,
}

fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            GameConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    if let Some(role) = cli.role {
        config.human_role = role;
    }
    if let Some(pattern) = cli.pattern {
        config.demand_pattern = pattern;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(weeks) = cli.weeks {
        config.total_weeks = weeks;
    }
    if let Some(inventory) = cli.initial_inventory {
        config.initial_inventory = inventory;
    }
    if let Some(p) = cli.event_probability {
        config.random_event_probability = p;
    }
    if cli.ai_strategy.is_some() {
        config.ai_strategy = cli.ai_strategy;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    println!("=== Beer Distribution Game Simulation in Rust ===");

    // 1. SETUP CONFIGURATION
    let config = build_config(&cli)?;
    let role = config.human_role;
    let lead_time = config.shipping_delay;

    // 2. INITIALIZE SIMULATION
    let (mut engine, mut player_rng) = match cli.seed {
        Some(seed) => (
            Engine::with_seed(seed),
            ChaCha20Rng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (Engine::new(), ChaCha20Rng::from_entropy()),
    };
    engine.initialize(config)?;
    println!(
        "Playing the {} with a {} policy for {} weeks...",
        role,
        cli.player_strategy,
        engine.config().total_weeks
    );

    // 3. RUN SIMULATION
    let player = cli.player_strategy.policy();
    let mut presenter = LogPresenter::new(cli.verbose);
    while !engine.is_completed() {
        let state = engine.snapshot();
        let seat = state
            .entity(role)
            .context("human seat missing from snapshot")?;
        let context = OrderContext {
            role,
            demand: state.incoming_order_for_human,
            inventory: seat.inventory,
            backlog: seat.backlog,
            lead_time,
        };
        let order = player.calculate_order(&context, &mut player_rng);

        engine.place_order(order as i64)?;
        let summary = engine.advance_week()?;
        presenter.present_week(&summary);
    }
    let state = engine.snapshot();
    presenter.present_final(&state);

    // 4. EXPORT RESULTS
    if let Some(path) = &cli.csv {
        reporting::write_simulation_log(path, engine.history())
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &cli.events_csv {
        reporting::write_event_log(path, &state.event_log)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    println!(
        "\nSimulation Complete. Your cost: ${:.2}, bullwhip effect: {:.2}",
        state.total_cost, state.bullwhip_effect
    );
    Ok(())
}
