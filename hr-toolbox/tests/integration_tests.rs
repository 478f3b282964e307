// End-to-end tests: drive the application loop the way the TUI does and
// check the library API against a realistic event-day flow.

use std::path::PathBuf;
use std::sync::Arc;

use hr_toolbox::app::{self, AppState};
use hr_toolbox::config::*;
use hr_toolbox::export;
use hr_toolbox::import;
use hr_toolbox::naming::client::{ClaudeClient, NamingClient};
use hr_toolbox::naming::NameSource;
use hr_toolbox::protocol::*;
use hr_toolbox::session::draw::{DrawEngine, DrawError, DrawPhase};
use hr_toolbox::session::grouping::GroupingEngine;
use hr_toolbox::session::roster::Roster;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/participants.csv")
}

fn inline_config(export_dir: Option<PathBuf>) -> Config {
    Config {
        draw: DrawConfig {
            tick_interval_ms: 5,
            tick_count: 4,
            allow_duplicates: false,
        },
        grouping: GroupingConfig {
            default_group_size: 2,
            default_theme: "Professional Teams".into(),
        },
        naming: NamingConfig {
            model: "test-model".into(),
            max_tokens: 100,
            timeout_secs: 5,
        },
        export: ExportConfig {
            directory: export_dir,
        },
        credentials: CredentialsConfig::default(),
    }
}

struct RunningApp {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl RunningApp {
    fn start(config: Config, source: Arc<dyn NameSource>) -> Self {
        let (draw_tx, draw_rx) = mpsc::channel(64);
        let (naming_tx, naming_rx) = mpsc::channel(16);
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (ui_tx, ui_rx) = mpsc::channel(256);

        let mut state = AppState::new(config, source, draw_tx, naming_tx);
        state.draw = DrawEngine::seeded(false, 11);
        state.grouping = GroupingEngine::seeded(11);

        let handle = tokio::spawn(app::run(cmd_rx, draw_rx, naming_rx, ui_tx, state));
        RunningApp { cmd_tx, ui_rx, handle }
    }

    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.unwrap();
    }

    async fn next_snapshot(&mut self) -> AppSnapshot {
        loop {
            if let UiUpdate::StateSnapshot(s) = self.ui_rx.recv().await.unwrap() {
                return *s;
            }
        }
    }

    async fn next_notice(&mut self) -> Notice {
        loop {
            if let UiUpdate::Notice(n) = self.ui_rx.recv().await.unwrap() {
                return n;
            }
        }
    }

    /// Spin and wait for the outcome: the winner, or the rejection notice.
    async fn spin(&mut self) -> Result<String, Notice> {
        self.send(UserCommand::Spin).await;
        loop {
            match self.ui_rx.recv().await.unwrap() {
                UiUpdate::DrawSettled(record) => return Ok(record.participant.name),
                UiUpdate::Notice(n) if n.level != NoticeLevel::Info => return Err(n),
                _ => continue,
            }
        }
    }

    async fn quit(self) {
        self.cmd_tx.send(UserCommand::Quit).await.unwrap();
        assert!(self.handle.await.unwrap().is_ok());
    }
}

// ---------------------------------------------------------------------------
// Event-day flow through the app loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_draw_group_export() {
    let export_dir = std::env::temp_dir().join("hr_toolbox_it_event_day");
    let _ = std::fs::remove_dir_all(&export_dir);

    let mut app = RunningApp::start(
        inline_config(Some(export_dir.clone())),
        Arc::new(NamingClient::Disabled),
    );
    app.next_snapshot().await;

    // Import: BOM stripped, CRLF and blank lines handled, duplicates flagged
    app.send(UserCommand::ImportFile(fixture_path())).await;
    let snap = app.next_snapshot().await;
    let names: Vec<&str> = snap.roster.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["王小明", "Alice Chen", "Bob Lin", "Carol Wu", "Alice Chen", "David Ho"]
    );
    assert_eq!(snap.duplicate_names.len(), 1);
    assert!(snap.duplicate_names.contains("Alice Chen"));

    app.send(UserCommand::DedupeRoster).await;
    let snap = app.next_snapshot().await;
    assert_eq!(snap.roster.len(), 5);

    // Draw everybody once, then the pool is exhausted
    let mut winners = Vec::new();
    for _ in 0..5 {
        winners.push(app.spin().await.expect("spin should settle"));
    }
    winners.sort();
    let mut expected: Vec<String> = snap.roster.iter().map(|p| p.name.clone()).collect();
    expected.sort();
    assert_eq!(winners, expected);

    let rejected = app.spin().await.unwrap_err();
    assert_eq!(rejected.level, NoticeLevel::Warning);
    assert!(rejected.text.contains("already won"));

    // Reset refills the pool and empties the log
    app.send(UserCommand::ResetDraw).await;
    let snap = app.next_snapshot().await;
    assert_eq!(snap.remaining_count, 5);
    assert!(snap.winners.is_empty());
    assert_eq!(snap.draw_phase, DrawPhase::Idle);

    // Group and ask for names; the disabled client falls back to defaults
    app.send(UserCommand::GenerateGroups).await;
    let snap = app.next_snapshot().await;
    let sizes: Vec<usize> = snap.groups.iter().map(|g| g.members.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    app.send(UserCommand::RequestGroupNames).await;
    let notice = app.next_notice().await;
    assert_eq!(notice.level, NoticeLevel::Warning);
    let snap = app.next_snapshot().await;
    let snap = if snap.naming_in_flight { app.next_snapshot().await } else { snap };
    let group_names: Vec<&str> = snap.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(group_names, vec!["Group 1", "Group 2", "Group 3"]);

    // Export
    app.send(UserCommand::ExportGroups).await;
    let notice = app.next_notice().await;
    assert_eq!(notice.level, NoticeLevel::Info, "{}", notice.text);

    let files: Vec<PathBuf> = std::fs::read_dir(&export_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let file_name = files[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("groups_") && file_name.ends_with(".csv"));

    let text = std::fs::read_to_string(&files[0]).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("\u{feff}Group Name,Member Name"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r.starts_with("\"Group ")));

    app.quit().await;
    let _ = std::fs::remove_dir_all(&export_dir);
}

#[tokio::test]
async fn allow_duplicates_keeps_drawing() {
    let mut app = RunningApp::start(inline_config(None), Arc::new(NamingClient::Disabled));
    app.next_snapshot().await;

    app.send(UserCommand::AddNames("Solo".into())).await;
    app.next_snapshot().await;
    app.send(UserCommand::SetAllowDuplicates(true)).await;
    let snap = app.next_snapshot().await;
    assert!(snap.allow_duplicates);

    for _ in 0..3 {
        assert_eq!(app.spin().await.unwrap(), "Solo");
    }
    let snap = app.next_snapshot().await;
    let seqs: Vec<usize> = snap.winners.iter().map(|w| w.sequence_number).collect();
    assert_eq!(seqs, vec![3, 2, 1]);

    app.quit().await;
}

// ---------------------------------------------------------------------------
// Naming over a mock Messages API
// ---------------------------------------------------------------------------

/// Serve one streamed Messages API reply on a local port.
async fn mock_messages_api(reply_text: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let delta = serde_json::json!({
        "type": "content_block_delta",
        "index": 0,
        "delta": { "type": "text_delta", "text": reply_text }
    });
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\n\r\n\
         event: message_start\r\ndata: {{\"type\":\"message_start\"}}\r\n\r\n\
         event: content_block_delta\r\ndata: {delta}\r\n\r\n\
         event: message_stop\r\ndata: {{\"type\":\"message_stop\"}}\r\n\r\n"
    );

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    });

    format!("http://{addr}/v1/messages")
}

#[tokio::test]
async fn groups_are_named_from_streamed_reply() {
    let endpoint = mock_messages_api("Star Gazers, Moon Walkers, Comet Chasers, Extra").await;
    let client = ClaudeClient::with_endpoint(endpoint, "sk-test".into(), "test-model".into(), 100);

    let mut app = RunningApp::start(inline_config(None), Arc::new(client));
    app.next_snapshot().await;

    app.send(UserCommand::AddNames("A,B,C,D,E,F".into())).await;
    app.next_snapshot().await;
    app.send(UserCommand::GenerateGroups).await;
    app.next_snapshot().await;

    app.send(UserCommand::SetTheme("Space".into())).await;
    assert_eq!(app.next_snapshot().await.theme, "Space");

    app.send(UserCommand::RequestGroupNames).await;
    let in_flight = app.next_snapshot().await;
    assert!(in_flight.naming_in_flight);

    let named = app.next_snapshot().await;
    let names: Vec<&str> = named.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Star Gazers", "Moon Walkers", "Comet Chasers"]);
    assert_eq!(
        in_flight.groups.iter().map(|g| g.members.clone()).collect::<Vec<_>>(),
        named.groups.iter().map(|g| g.members.clone()).collect::<Vec<_>>(),
        "naming never changes membership"
    );

    app.quit().await;
}

// ---------------------------------------------------------------------------
// Library API without the event loop
// ---------------------------------------------------------------------------

#[test]
fn two_entrants_then_exhausted() {
    let roster = Roster::from_names(["A", "B"]);
    let mut draw = DrawEngine::seeded(false, 5);
    draw.sync_pool(roster.participants());

    let mut names = vec![
        draw.draw(roster.participants()).unwrap().participant.name,
        draw.draw(roster.participants()).unwrap().participant.name,
    ];
    names.sort();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(draw.draw(roster.participants()), Err(DrawError::PoolExhausted));
    assert_eq!(draw.winners().len(), 2);
}

#[test]
fn imported_file_groups_and_exports_in_memory() {
    let text = import::read_names_file(&fixture_path()).unwrap();
    let mut roster = Roster::new();
    assert_eq!(roster.add_from_text(&text), 6);
    assert_eq!(roster.dedupe(), 1);

    let groups = GroupingEngine::seeded(2).group(roster.participants(), 5).unwrap();
    assert_eq!(groups.len(), 1);

    let mut buf = Vec::new();
    export::write_groups_csv(&mut buf, &groups).unwrap();
    let csv = String::from_utf8(buf).unwrap();
    assert_eq!(csv.lines().count(), 6);
    assert!(csv.contains("\"Group 1\",\"王小明\""));
}
