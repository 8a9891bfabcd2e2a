use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use quest_trigger_engine::adapter::{self, NpcInteraction, NpcView};
use quest_trigger_engine::condition::Position;
use quest_trigger_engine::loader::{self, HotReloadEvent};
use quest_trigger_engine::quest::QuestTransition;
use quest_trigger_engine::{EngineConfig, EngineError, QuestEngine, RawEvent, SpecialOrder, SpecialOrderBoard};

// ============================================================================
// Wire format
// ============================================================================

/// One line of input from the host
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Input {
    Control(Control),
    Touch { touch: TouchInput },
    Interact { interact: NpcInteraction },
    Indicator { indicator: NpcView },
    PostOrder { post_order: SpecialOrder },
    Event(RawEvent),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Control {
    Accept(String),
    Complete(String),
    Fail(String),
    Resolve(String),
}

#[derive(Debug, Deserialize)]
struct TouchInput {
    #[serde(default)]
    player: String,
    location: String,
    action: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
enum Reply {
    Transition(QuestTransition),
    GameQuestId { quest: String, id: Option<i64> },
    Indicator { npc: String, draw: bool },
    Posted { quest_key: String },
    Error { message: String },
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let config_path = EngineConfig::path_from_env();
    let config = match EngineConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config {:?}: {}", config_path, e);
            EngineConfig::default()
        }
    };

    // RUST_LOG wins over the configured filter
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(config).await {
        error!("Quest engine stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: EngineConfig) -> Result<(), EngineError> {
    let hot_reload = config.hot_reload;
    let data_dir = config.data_dir.clone();

    let mut engine = QuestEngine::with_default_hooks(config)?;
    if let Err(e) = engine.load_content() {
        error!("Failed to load quest content: {}", e);
    }
    let mut board = SpecialOrderBoard::new();

    let mut reload_rx = if hot_reload {
        match loader::start_file_watcher(&data_dir) {
            Ok(rx) => {
                info!("Content hot-reload enabled for {:?}", data_dir);
                Some(rx)
            }
            Err(e) => {
                warn!("Failed to start content hot-reload: {}", e);
                None
            }
        }
    } else {
        None
    };

    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            segment = lines.next_segment() => {
                let Some(bytes) = segment? else {
                    info!("Input closed, shutting down");
                    break;
                };
                let Some(reply) = handle_bytes(&mut engine, &mut board, &bytes) else {
                    continue;
                };

                stdout.write_all(reply.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Some(event) = recv_reload(&mut reload_rx) => {
                match event {
                    HotReloadEvent::Changed(path) => {
                        info!("Content changed: {:?}", path);
                        if let Err(e) = engine.reload_content() {
                            error!("Content reload failed: {}", e);
                        }
                    }
                    HotReloadEvent::Error(e) => {
                        error!("Content hot-reload error: {}", e);
                    }
                }
            }
        }
    }

    Ok(())
}

async fn recv_reload(rx: &mut Option<tokio::sync::mpsc::Receiver<HotReloadEvent>>) -> Option<HotReloadEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Reply for one raw input line, or `None` for a blank line
fn handle_bytes(engine: &mut QuestEngine, board: &mut SpecialOrderBoard, bytes: &[u8]) -> Option<String> {
    let line = match std::str::from_utf8(bytes) {
        Ok(line) => line.trim(),
        Err(e) => {
            warn!("Ignoring input that is not UTF-8: {}", e);
            return Some(encode(&Reply::Error {
                message: format!("input is not UTF-8: {}", e),
            }));
        }
    };
    if line.is_empty() {
        return None;
    }

    Some(handle_line(engine, board, line))
}

fn handle_line(engine: &mut QuestEngine, board: &mut SpecialOrderBoard, line: &str) -> String {
    let input: Input = match serde_json::from_str(line) {
        Ok(input) => input,
        Err(e) => {
            warn!("Ignoring malformed input: {}", e);
            return encode(&Reply::Error {
                message: format!("malformed input: {}", e),
            });
        }
    };
    debug!("Input: {:?}", input);

    match input {
        Input::Event(event) => encode(&engine.notify(event)),
        Input::Touch { touch } => encode(&adapter::after_touch_action(
            engine,
            &touch.player,
            &touch.location,
            &touch.action,
            Position::new(touch.x, touch.y),
        )),
        Input::Interact { interact } => encode(&adapter::before_check_action(engine, board, &interact)),
        Input::Indicator { indicator } => encode(&Reply::Indicator {
            draw: adapter::should_draw_indicator(engine, board, &indicator),
            npc: indicator.name,
        }),
        Input::PostOrder { post_order } => {
            let quest_key = post_order.quest_key.clone();
            board.post(post_order);
            encode(&Reply::Posted { quest_key })
        }
        Input::Control(control) => handle_control(engine, control),
    }
}

fn handle_control(engine: &mut QuestEngine, control: Control) -> String {
    let result = match control {
        Control::Resolve(quest) => {
            return encode(&Reply::GameQuestId {
                id: engine.resolve_game_quest_id(&quest),
                quest,
            });
        }
        Control::Accept(name) => engine.accept_quest(&name),
        Control::Complete(name) => engine.complete_quest(&name),
        Control::Fail(name) => engine.fail_quest(&name),
    };

    match result {
        Ok(transition) => encode(&Reply::Transition(transition)),
        Err(e) => {
            warn!("{}", e);
            encode(&Reply::Error { message: e.to_string() })
        }
    }
}

fn encode<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        error!("Failed to encode reply: {}", e);
        String::from("{\"reply\":\"error\",\"message\":\"encode failed\"}")
    })
}
