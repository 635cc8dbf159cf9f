//! Thin orchestration binary: reads `DB_URL`, `KALAH_PITS`, `KALAH_SEEDS`,
//! and `KALAH_FAST_MODE` from the environment, builds a `SolverConfig`, and
//! drives BFS to completion followed by retrograde to completion. No
//! general-purpose flag or config-file parser — that stays out of scope.

use std::sync::Arc;

use kalah_core::{Cancellation, SolverConfig};
use kalah_engine::{BfsDriver, Governor, RetrogradeDriver};
use kalah_rules::{GameParams, Rules};
use kalah_store::{PgStore, Store};

fn init_logging() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{time}.log")).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

fn install_ctrl_c_handler(cancellation: Cancellation) {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        println!();
        log::warn!("cancellation requested, finishing the current chunk/pass");
        cancellation.request();
    });
}

fn env_u8(key: &str, default: u8) -> u8 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let pits = env_u8("KALAH_PITS", 6);
    let seeds = env_u8("KALAH_SEEDS", 6);
    let fast_mode = std::env::var("KALAH_FAST_MODE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    log::info!("solving Kalah({pits},{seeds}), fast_mode={fast_mode}");

    let rules = Arc::new(Rules::new(GameParams::new(pits, seeds)));
    let mut config = SolverConfig::with_board(pits, seeds);
    config.fast_mode = fast_mode;

    let store = Arc::new(PgStore::connect().await?);
    store.ensure_schema().await?;

    let governor = Arc::new(Governor::new(config.mem_warn_bytes, config.mem_crit_bytes));
    let cancellation = Cancellation::new();
    install_ctrl_c_handler(cancellation.clone());

    let bfs = BfsDriver::new(store.clone(), rules.clone(), config, governor.clone());
    bfs.run(&cancellation).await?;
    log::info!("BFS enumeration complete");

    let retrograde = RetrogradeDriver::new(store.clone(), rules.clone(), config, governor);
    retrograde.run(&cancellation).await?;
    log::info!("retrograde scoring complete");

    let opening_fp = rules.fingerprint(&rules.opening());
    if let Some(record) = store.get(opening_fp).await? {
        log::info!(
            "opening score: {:?}, best move: {:?}",
            record.score,
            record.best_move
        );
    }

    Ok(())
}
