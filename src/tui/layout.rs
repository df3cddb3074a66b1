//! Fixed panel geometry.
//!
//! Every panel has a constant rectangle in terminal cells. Geometry never
//! depends on the data; a small terminal simply clips the panels that do
//! not fit.

use ratatui::layout::Rect;

/// Identifies one panel of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PanelId {
    Title,
    Connections,
    Replication,
    Hostname,
    IpAddress,
    DbVersion,
    Memory,
    Cpu,
    Disk,
    TotalDbs,
    TablesPerDb,
    Binlogs,
    SelectCount,
    InsertCount,
    UpdateCount,
    DeleteCount,
    TopOperations,
    SlowQueries,
    Footer,
}

impl PanelId {
    /// Title drawn in the panel border. Empty for borderless panels.
    pub fn title(self) -> &'static str {
        match self {
            PanelId::Title | PanelId::Footer => "",
            PanelId::Connections => "Connections",
            PanelId::Replication => "Replication",
            PanelId::Hostname => "Hostname",
            PanelId::IpAddress => "IP Address",
            PanelId::DbVersion => "DB Version",
            PanelId::Memory => "Memory Usage",
            PanelId::Cpu => "CPU Usage",
            PanelId::Disk => "Disk Usage",
            PanelId::TotalDbs => "Total DBs",
            PanelId::TablesPerDb => "Tables per DB",
            PanelId::Binlogs => "Top Binlogs",
            PanelId::SelectCount => "Select Count",
            PanelId::InsertCount => "Insert Count",
            PanelId::UpdateCount => "Update Count",
            PanelId::DeleteCount => "Delete Count",
            PanelId::TopOperations => "Top 5 Operations",
            PanelId::SlowQueries => "Slow Queries",
        }
    }

    /// Title and footer are plain text; every other panel has a border.
    pub fn bordered(self) -> bool {
        !matches!(self, PanelId::Title | PanelId::Footer)
    }
}

/// Rectangle from corner coordinates, exclusive on the far edge.
const fn span(x0: u16, y0: u16, x1: u16, y1: u16) -> Rect {
    Rect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    }
}

/// Panel positions, in draw order.
const STANDARD: [(PanelId, Rect); 19] = [
    (PanelId::Title, span(0, 0, 100, 3)),
    (PanelId::Connections, span(0, 3, 25, 6)),
    (PanelId::Replication, span(0, 6, 25, 9)),
    (PanelId::Hostname, span(0, 9, 25, 12)),
    (PanelId::IpAddress, span(0, 12, 25, 15)),
    (PanelId::DbVersion, span(0, 15, 25, 18)),
    (PanelId::Memory, span(0, 18, 25, 21)),
    (PanelId::Cpu, span(0, 21, 25, 24)),
    // Two text lines need four rows with borders.
    (PanelId::Disk, span(0, 24, 25, 28)),
    (PanelId::TotalDbs, span(25, 3, 50, 6)),
    (PanelId::TablesPerDb, span(25, 6, 50, 15)),
    (PanelId::SelectCount, span(50, 3, 66, 6)),
    (PanelId::InsertCount, span(66, 3, 82, 6)),
    (PanelId::UpdateCount, span(50, 6, 66, 9)),
    (PanelId::DeleteCount, span(66, 6, 82, 9)),
    (PanelId::Binlogs, span(25, 15, 75, 24)),
    (PanelId::SlowQueries, span(75, 15, 100, 24)),
    (PanelId::TopOperations, span(25, 24, 75, 33)),
    (PanelId::Footer, span(0, 33, 100, 36)),
];

/// Static mapping from panel to rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    panels: Vec<(PanelId, Rect)>,
}

impl PanelLayout {
    /// The console layout.
    pub fn standard() -> Self {
        Self {
            panels: STANDARD.to_vec(),
        }
    }

    pub fn panels(&self) -> &[(PanelId, Rect)] {
        &self.panels
    }

    pub fn rect(&self, id: PanelId) -> Option<Rect> {
        self.panels
            .iter()
            .find(|(panel, _)| *panel == id)
            .map(|(_, rect)| *rect)
    }

    /// Panels cut to `area`. Panels entirely outside are dropped.
    pub fn clip(&self, area: Rect) -> Vec<(PanelId, Rect)> {
        self.panels
            .iter()
            .map(|(id, rect)| (*id, rect.intersection(area)))
            .filter(|(_, rect)| !rect.is_empty())
            .collect()
    }
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_panel_placed_once() {
        let layout = PanelLayout::standard();
        let ids: HashSet<PanelId> = layout.panels().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), layout.panels().len());
        assert_eq!(ids.len(), 19);
    }

    #[test]
    fn test_original_coordinates() {
        let layout = PanelLayout::standard();
        assert_eq!(layout.rect(PanelId::Connections), Some(Rect::new(0, 3, 25, 3)));
        assert_eq!(layout.rect(PanelId::Binlogs), Some(Rect::new(25, 15, 50, 9)));
        assert_eq!(layout.rect(PanelId::TopOperations), Some(Rect::new(25, 24, 50, 9)));
        assert_eq!(layout.rect(PanelId::Footer), Some(Rect::new(0, 33, 100, 3)));
    }

    #[test]
    fn test_bordered_panels_do_not_overlap() {
        let panels: Vec<Rect> = PanelLayout::standard()
            .panels()
            .iter()
            .filter(|(id, _)| id.bordered())
            .map(|(_, rect)| *rect)
            .collect();

        for (i, a) in panels.iter().enumerate() {
            for b in &panels[i + 1..] {
                assert!(!a.intersects(*b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_clip_to_small_terminal() {
        let layout = PanelLayout::standard();
        let clipped = layout.clip(Rect::new(0, 0, 40, 10));

        let ids: Vec<PanelId> = clipped.iter().map(|(id, _)| *id).collect();
        assert!(ids.contains(&PanelId::Connections));
        assert!(!ids.contains(&PanelId::Footer));
        assert!(!ids.contains(&PanelId::SelectCount));

        let title = clipped.iter().find(|(id, _)| *id == PanelId::Title).unwrap().1;
        assert_eq!(title, Rect::new(0, 0, 40, 3));
        // Layout itself is unchanged.
        assert_eq!(layout, PanelLayout::standard());
    }

    #[test]
    fn test_full_layout_fits_100_by_36() {
        let area = Rect::new(0, 0, 100, 36);
        let layout = PanelLayout::standard();
        assert_eq!(layout.clip(area), layout.panels().to_vec());
    }
}
