mod broadcaster;

use clap::Parser;
use tokio::sync::mpsc;

use broadcaster::{ChannelBroadcaster, SessionEvent};
use snake_common::config::{ConfigManager, FileContentConfigProvider};
use snake_common::games::SessionRng;
use snake_common::games::snake::{
    BotController, BotStrategy, GameMode, GameOverSummary, PressedKeys, SessionController, SnakeEngine,
    SnakeSettings,
};
use snake_common::{log, logger};

#[derive(Parser)]
#[command(name = "snake_runner")]
struct Args {
    /// YAML settings file; defaults are used when it does not exist.
    #[arg(long, default_value = "snake_settings.yaml")]
    config: String,

    #[arg(long, default_value = "classic")]
    mode: String,

    #[arg(long, default_value_t = 1)]
    level: u32,

    #[arg(long)]
    seed: Option<u64>,

    /// Stop the session after this many ticks if the game is still running.
    #[arg(long, default_value_t = 1000)]
    max_ticks: u64,

    #[arg(long, default_value = "efficient")]
    bot: String,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Runner".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager: ConfigManager<FileContentConfigProvider, SnakeSettings> =
        ConfigManager::from_yaml_file(&args.config);
    let settings = config_manager.get_config()?;
    let mode: GameMode = args.mode.parse()?;
    let strategy: BotStrategy = args.bot.parse()?;
    let seed = args.seed.unwrap_or_else(rand::random);

    let engine = SnakeEngine::start(mode, args.level, settings, seed)?;
    log!("Running {} with the {:?} bot, seed {}", mode, strategy, seed);

    let (sender, receiver) = mpsc::unbounded_channel();
    let mut controller = SessionController::new(ChannelBroadcaster::new(sender));
    controller.start(engine).await;

    let summary = drive(&mut controller, receiver, strategy, seed, args.max_ticks).await;

    match summary {
        Some(summary) => print_summary(&summary),
        None => log!("Session ended without a summary"),
    }

    Ok(())
}

async fn drive(
    controller: &mut SessionController<ChannelBroadcaster>,
    mut receiver: mpsc::UnboundedReceiver<SessionEvent>,
    strategy: BotStrategy,
    seed: u64,
    max_ticks: u64,
) -> Option<GameOverSummary> {
    let input = controller.input();
    let mut bot_rng = SessionRng::new(seed.wrapping_add(1));

    loop {
        tokio::select! {
            event = receiver.recv() => match event {
                Some(SessionEvent::State(snapshot)) => {
                    let heads: Vec<String> = snapshot
                        .snakes
                        .iter()
                        .filter_map(|snake| snake.cells.first().map(|head| head.to_string()))
                        .collect();
                    log!(
                        "Tick {}: score {}, level {}, heads [{}]",
                        snapshot.tick,
                        snapshot.score,
                        snapshot.level,
                        heads.join(", ")
                    );

                    if snapshot.is_running() && snapshot.tick >= max_ticks {
                        log!("Reached {} ticks, stopping", max_ticks);
                        return controller.stop().await;
                    }

                    for player in 0..snapshot.snakes.len() {
                        if let Some(heading) = BotController::choose_heading(strategy, &snapshot, player, &mut bot_rng) {
                            input.set(player, PressedKeys::from(heading)).await;
                        }
                    }
                }
                Some(SessionEvent::GameOver(summary)) => {
                    return controller.wait().await.or(Some(summary));
                }
                None => return controller.stop().await,
            },
            _ = tokio::signal::ctrl_c() => {
                log!("Interrupted, stopping session");
                return controller.stop().await;
            }
        }
    }
}

fn print_summary(summary: &GameOverSummary) {
    let reason = summary
        .reason
        .map(|reason| reason.to_string())
        .unwrap_or_else(|| "stopped".to_string());
    println!(
        "{}: {} after {} ticks, score {}, level {}",
        summary.mode, reason, summary.ticks, summary.score, summary.level
    );
    for (player, score) in summary.player_scores.iter().enumerate() {
        println!("  player {}: {}", player + 1, score);
    }
}
