//! Snapshot to panel text, and panel text to frame.
//!
//! `panel_texts` is a pure function of the snapshot so two renders of the
//! same data always produce the same screen.

use std::collections::BTreeMap;

use ratatui::Frame;
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Block, Paragraph};

use crate::VERSION;
use crate::fmt::{bytes_to_gib, format_elapsed};
use crate::model::{QueryKind, Snapshot};

use super::layout::{PanelId, PanelLayout};
use super::style::Styles;

const BANNER: &str = "MONITORING CONSOLE FOR MARIADB/MYSQL";
const QUIT_HINT: &str = "Press q or Ctrl + C to exit";

/// Text content of every panel for one redraw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelTexts {
    texts: BTreeMap<PanelId, String>,
}

impl PanelTexts {
    /// Text of one panel; empty if the panel has none.
    pub fn get(&self, id: PanelId) -> &str {
        self.texts.get(&id).map(String::as_str).unwrap_or_default()
    }

    fn set(&mut self, id: PanelId, text: String) {
        self.texts.insert(id, text);
    }
}

fn join_lines<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
    items.iter().map(line).collect::<Vec<_>>().join("\n")
}

fn counter_text(snapshot: &Snapshot, kind: QueryKind) -> String {
    format!("  {}  ", snapshot.counter(kind))
}

fn footer_text(snapshot: &Snapshot) -> String {
    match &snapshot.last_cycle {
        Some(cycle) => format!(
            "{}\nLast sample {} (took {}, {}/{} sources failed)",
            QUIT_HINT,
            cycle.finished_at.format("%H:%M:%S"),
            format_elapsed(cycle.duration),
            cycle.failed,
            cycle.sources
        ),
        None => format!("{}\nWaiting for first sample...", QUIT_HINT),
    }
}

/// Maps every snapshot field to the text of its panel.
///
/// Fields never read successfully render as empty text (counters as 0).
pub fn panel_texts(snapshot: &Snapshot) -> PanelTexts {
    let mut texts = PanelTexts::default();

    texts.set(PanelId::Title, format!("{}\nmyglot v{}", BANNER, VERSION));
    texts.set(PanelId::Connections, snapshot.connections.to_string());
    texts.set(PanelId::Replication, snapshot.replication.clone());
    texts.set(PanelId::Hostname, snapshot.hostname.clone());
    texts.set(PanelId::IpAddress, snapshot.ip_address.clone());
    texts.set(PanelId::DbVersion, snapshot.db_version.clone());

    if let Some(memory) = &snapshot.memory {
        texts.set(
            PanelId::Memory,
            format!(
                "{:.2}% used of {:.2} GB",
                memory.used_percent,
                bytes_to_gib(memory.total_bytes)
            ),
        );
    }
    if let Some(cpu) = snapshot.cpu_percent {
        texts.set(PanelId::Cpu, format!("{:.2}%", cpu));
    }
    if let Some(disk) = &snapshot.disk {
        texts.set(
            PanelId::Disk,
            format!(
                "{:.2} GB available\n{:.2}% used",
                bytes_to_gib(disk.free_bytes),
                disk.used_percent
            ),
        );
    }
    if let Some(databases) = &snapshot.databases {
        texts.set(PanelId::TotalDbs, format!("Total DBs: {}", databases.total));
        texts.set(
            PanelId::TablesPerDb,
            join_lines(&databases.top, |db| db.display_line()),
        );
    }

    texts.set(
        PanelId::Binlogs,
        join_lines(&snapshot.binlogs, |log| log.display_line()),
    );
    texts.set(
        PanelId::SlowQueries,
        join_lines(&snapshot.slow_queries, |q| q.display_line()),
    );
    texts.set(
        PanelId::TopOperations,
        join_lines(&snapshot.top_operations, |op| op.display_line()),
    );

    texts.set(PanelId::SelectCount, counter_text(snapshot, QueryKind::Select));
    texts.set(PanelId::InsertCount, counter_text(snapshot, QueryKind::Insert));
    texts.set(PanelId::UpdateCount, counter_text(snapshot, QueryKind::Update));
    texts.set(PanelId::DeleteCount, counter_text(snapshot, QueryKind::Delete));

    texts.set(PanelId::Footer, footer_text(snapshot));

    texts
}

fn panel_style(id: PanelId) -> Style {
    match id {
        PanelId::Title => Styles::banner(),
        PanelId::Footer => Styles::footer(),
        PanelId::Cpu => Styles::cpu(),
        PanelId::Memory => Styles::mem(),
        PanelId::Disk => Styles::disk(),
        PanelId::SelectCount
        | PanelId::InsertCount
        | PanelId::UpdateCount
        | PanelId::DeleteCount => Styles::counter(),
        _ => Styles::default(),
    }
}

/// Draws every panel that fits in the frame.
pub fn render(frame: &mut Frame, layout: &PanelLayout, texts: &PanelTexts) {
    for (id, area) in layout.clip(frame.area()) {
        let mut paragraph = Paragraph::new(texts.get(id)).style(panel_style(id));
        if id.bordered() {
            paragraph = paragraph.block(
                Block::bordered()
                    .border_style(Styles::border())
                    .title(Span::styled(id.title(), Styles::panel_title())),
            );
        }
        frame.render_widget(paragraph, area);
    }
}
