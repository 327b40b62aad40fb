use ratatui::style::Color;
use std::collections::HashMap;
use tracing::warn;

/// Fixed palette, cycled by category index. Same input order, same colors.
pub const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Red,
    Color::Magenta,
    Color::Blue,
];

/// Fixed chart placeholder regions of the stats view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    Hourly,
    Daily,
    Weekday,
    Heatmap,
    Rssi,
    Vendors,
    Protocols,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Doughnut,
    Heatmap,
}

/// Input series for a render call: label/value pairs for the category
/// kinds, a 2-D matrix for the heatmap.
#[derive(Debug, Clone)]
pub enum ChartData {
    Series {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Matrix {
        rows: Vec<Vec<f64>>,
        x_labels: Vec<String>,
        y_labels: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    pub value: f64,
    pub color: Color,
}

/// One heatmap cell; `intensity` is `value / max` over the whole matrix,
/// defined as 0 when the matrix is all zero.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub x: usize,
    pub y: usize,
    pub value: f64,
    pub intensity: f64,
}

/// View-ready chart, rebuilt from scratch on every refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub kind: ChartKind,
    pub categories: Vec<Category>,
    pub cells: Vec<HeatCell>,
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
}

impl ChartModel {
    fn build(kind: ChartKind, data: ChartData) -> Self {
        match (kind, data) {
            (ChartKind::Heatmap, ChartData::Matrix { rows, x_labels, y_labels }) => {
                let max = rows
                    .iter()
                    .flatten()
                    .copied()
                    .fold(0.0_f64, f64::max);
                let mut cells = Vec::new();
                for (x, row) in rows.iter().enumerate() {
                    for (y, &value) in row.iter().enumerate() {
                        let intensity = if max > 0.0 { value / max } else { 0.0 };
                        cells.push(HeatCell { x, y, value, intensity });
                    }
                }
                Self {
                    kind,
                    categories: Vec::new(),
                    cells,
                    x_labels,
                    y_labels,
                }
            }
            (ChartKind::Heatmap, ChartData::Series { .. }) | (_, ChartData::Matrix { .. }) => {
                warn!(?kind, "chart data shape does not match chart kind, rendering empty");
                Self {
                    kind,
                    categories: Vec::new(),
                    cells: Vec::new(),
                    x_labels: Vec::new(),
                    y_labels: Vec::new(),
                }
            }
            (_, ChartData::Series { labels, values }) => {
                let categories = labels
                    .into_iter()
                    .zip(values)
                    .enumerate()
                    .map(|(i, (label, value))| Category {
                        label,
                        value,
                        color: PALETTE[i % PALETTE.len()],
                    })
                    .collect();
                Self {
                    kind,
                    categories,
                    cells: Vec::new(),
                    x_labels: Vec::new(),
                    y_labels: Vec::new(),
                }
            }
        }
    }

    pub fn total(&self) -> f64 {
        self.categories.iter().map(|c| c.value).sum()
    }

    pub fn max_value(&self) -> f64 {
        self.categories
            .iter()
            .map(|c| c.value)
            .fold(0.0_f64, f64::max)
    }
}

/// Owns one chart per slot. A render call fully disposes whatever occupied
/// the slot before constructing the replacement, so stale series never
/// accumulate across refreshes.
#[derive(Debug, Default)]
pub struct ChartBoard {
    slots: HashMap<ChartSlot, ChartModel>,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, slot: ChartSlot, kind: ChartKind, data: ChartData) {
        self.slots.insert(slot, ChartModel::build(kind, data));
    }

    pub fn get(&self, slot: ChartSlot) -> Option<&ChartModel> {
        self.slots.get(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(&str, f64)]) -> ChartData {
        ChartData::Series {
            labels: pairs.iter().map(|(l, _)| l.to_string()).collect(),
            values: pairs.iter().map(|(_, v)| *v).collect(),
        }
    }

    #[test]
    fn all_zero_matrix_has_zero_intensity_everywhere() {
        let mut board = ChartBoard::new();
        board.render(
            ChartSlot::Heatmap,
            ChartKind::Heatmap,
            ChartData::Matrix {
                rows: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
                x_labels: vec!["0".into(), "1".into()],
                y_labels: vec!["Mon".into(), "Tue".into()],
            },
        );
        let model = board.get(ChartSlot::Heatmap).unwrap();
        assert_eq!(model.cells.len(), 4);
        for cell in &model.cells {
            assert_eq!(cell.intensity, 0.0);
            assert!(!cell.intensity.is_nan());
        }
    }

    #[test]
    fn heatmap_intensity_is_value_over_max() {
        let mut board = ChartBoard::new();
        board.render(
            ChartSlot::Heatmap,
            ChartKind::Heatmap,
            ChartData::Matrix {
                rows: vec![vec![2.0, 4.0], vec![0.0, 8.0]],
                x_labels: vec![],
                y_labels: vec![],
            },
        );
        let model = board.get(ChartSlot::Heatmap).unwrap();
        let cell = |x, y| {
            model
                .cells
                .iter()
                .find(|c| c.x == x && c.y == y)
                .unwrap()
                .intensity
        };
        assert_eq!(cell(0, 0), 0.25);
        assert_eq!(cell(0, 1), 0.5);
        assert_eq!(cell(1, 0), 0.0);
        assert_eq!(cell(1, 1), 1.0);
    }

    #[test]
    fn palette_assignment_is_deterministic_and_cycles() {
        let build = |board: &mut ChartBoard| {
            board.render(
                ChartSlot::Vendors,
                ChartKind::Doughnut,
                series(&[
                    ("Apple", 45.0),
                    ("Samsung", 32.0),
                    ("Intel", 12.0),
                    ("Microsoft", 8.0),
                    ("IANA", 4.0),
                    ("3Com", 2.0),
                    ("Other", 1.0),
                ]),
            );
        };
        let mut a = ChartBoard::new();
        let mut b = ChartBoard::new();
        build(&mut a);
        build(&mut b);
        let ca = &a.get(ChartSlot::Vendors).unwrap().categories;
        let cb = &b.get(ChartSlot::Vendors).unwrap().categories;
        assert_eq!(ca, cb);
        assert_eq!(ca[0].color, PALETTE[0]);
        // Seventh category wraps back to the first palette entry.
        assert_eq!(ca[6].color, PALETTE[0]);
    }

    #[test]
    fn render_replaces_previous_chart_in_slot() {
        let mut board = ChartBoard::new();
        board.render(ChartSlot::Hourly, ChartKind::Line, series(&[("0:00", 5.0)]));
        board.render(
            ChartSlot::Hourly,
            ChartKind::Line,
            series(&[("0:00", 1.0), ("1:00", 2.0)]),
        );
        let model = board.get(ChartSlot::Hourly).unwrap();
        assert_eq!(model.categories.len(), 2);
        assert_eq!(model.categories[0].value, 1.0);
    }

    #[test]
    fn mismatched_shape_renders_empty_not_panic() {
        let mut board = ChartBoard::new();
        board.render(ChartSlot::Heatmap, ChartKind::Heatmap, series(&[("x", 1.0)]));
        let model = board.get(ChartSlot::Heatmap).unwrap();
        assert!(model.cells.is_empty());
        assert!(model.categories.is_empty());
    }

    #[test]
    fn matrix_data_for_category_chart_renders_empty() {
        let mut board = ChartBoard::new();
        board.render(
            ChartSlot::Daily,
            ChartKind::Bar,
            ChartData::Matrix {
                rows: vec![vec![1.0, 2.0]],
                x_labels: vec![],
                y_labels: vec![],
            },
        );
        let model = board.get(ChartSlot::Daily).unwrap();
        assert!(model.categories.is_empty());
        assert!(model.cells.is_empty());
    }
}
