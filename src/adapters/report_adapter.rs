//! Backtest artefacts on disk: trades CSV, daily equity CSV and an SVG
//! equity chart.

use crate::domain::backtest::{BacktestState, Trade};
use crate::domain::error::SwingscanError;
use crate::domain::metrics::{EquityPoint, equity_curve};
use crate::ports::report_port::ReportPort;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileReportAdapter {
    trades_csv: PathBuf,
    equity_csv: PathBuf,
    equity_svg: PathBuf,
}

impl FileReportAdapter {
    pub fn new(trades_csv: PathBuf, equity_csv: PathBuf, equity_svg: PathBuf) -> Self {
        Self {
            trades_csv,
            equity_csv,
            equity_svg,
        }
    }

    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join("backtest_trades.csv"),
            dir.join("equity_curve.csv"),
            dir.join("equity_curve.svg"),
        )
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T], headers: &[&str]) -> Result<(), SwingscanError> {
    let csv_err = |e: csv::Error| SwingscanError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    };
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    // serialize() emits no header for an empty slice.
    wtr.write_record(headers).map_err(csv_err)?;
    for row in rows {
        wtr.serialize(row).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for FileReportAdapter {
    fn write(
        &self,
        state: &BacktestState,
        initial_capital: f64,
    ) -> Result<(), SwingscanError> {
        write_rows::<Trade>(
            &self.trades_csv,
            &state.trades,
            &[
                "ticker",
                "entry_date",
                "exit_date",
                "entry_price",
                "exit_price",
                "outcome",
                "shares",
                "profit",
                "capital_after",
            ],
        )?;
        info!("trades written to {}", self.trades_csv.display());

        let curve = equity_curve(&state.trades, initial_capital);
        write_rows::<EquityPoint>(&self.equity_csv, &curve, &["date", "capital"])?;
        info!("equity curve written to {}", self.equity_csv.display());

        fs::write(&self.equity_svg, render_equity_svg(&curve, initial_capital))?;
        info!("equity chart written to {}", self.equity_svg.display());
        Ok(())
    }
}

const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

fn axis_label(x: f64, y: f64, anchor: &str, text: &str) -> String {
    format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"{}\" font-size=\"10\" fill=\"#666\">{}</text>\n",
        x, y, anchor, text
    )
}

/// Line chart of `curve` with a dashed line at the starting capital.
/// An empty curve renders a chart with a "No trades" note.
pub fn render_equity_svg(curve: &[EquityPoint], initial_capital: f64) -> String {
    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let mut svg = format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    );
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"15\" text-anchor=\"end\" font-size=\"12\" fill=\"#666\">Equity ($)</text>\n",
        CHART_WIDTH
    ));
    svg.push_str(&format!(
        "  <polyline points=\"{},{} {},{} {},{}\" fill=\"none\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));

    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        svg.push_str(&axis_label(
            MARGIN_LEFT + plot_width / 2.0,
            MARGIN_TOP + plot_height / 2.0,
            "middle",
            "No trades",
        ));
        svg.push_str("</svg>");
        return svg;
    };

    let values = curve.iter().map(|p| p.capital).chain([initial_capital]);
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(1.0);

    let x_at = |i: usize| MARGIN_LEFT + (i as f64 / (curve.len() - 1).max(1) as f64) * plot_width;
    let y_at = |v: f64| MARGIN_TOP + plot_height - ((v - min) / range) * plot_height;

    let path: Vec<String> = curve
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let cmd = if i == 0 { "M" } else { "L" };
            format!("{} {:.1} {:.1}", cmd, x_at(i), y_at(p.capital))
        })
        .collect();

    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{:.1}\" x2=\"{}\" y2=\"{:.1}\" stroke=\"#999\" stroke-dasharray=\"4 3\"/>\n",
        MARGIN_LEFT,
        y_at(initial_capital),
        CHART_WIDTH - MARGIN_RIGHT,
        y_at(initial_capital)
    ));
    svg.push_str(&axis_label(MARGIN_LEFT - 5.0, MARGIN_TOP + 5.0, "end", &format!("{:.2}", max)));
    svg.push_str(&axis_label(
        MARGIN_LEFT - 5.0,
        CHART_HEIGHT - MARGIN_BOTTOM - 5.0,
        "end",
        &format!("{:.2}", min),
    ));
    svg.push_str(&axis_label(MARGIN_LEFT, CHART_HEIGHT - 5.0, "start", &first.date.to_string()));
    svg.push_str(&axis_label(
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - 5.0,
        "end",
        &last.date.to_string(),
    ));
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"#2563eb\" stroke-width=\"2\"/>\n",
        path.join(" ")
    ));
    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::Outcome;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn point(d: u32, capital: f64) -> EquityPoint {
        EquityPoint { date: date(d), capital }
    }

    fn state() -> BacktestState {
        let mut state = BacktestState::new(500.0);
        state.record(Trade {
            ticker: "MSFT".into(),
            entry_date: date(3),
            exit_date: date(5),
            entry_price: 50.0,
            exit_price: 56.0,
            outcome: Outcome::TargetHit,
            shares: 10.0,
            profit: 59.0,
            capital_after: 0.0,
        });
        state
    }

    #[test]
    fn writes_all_artefacts() {
        let dir = TempDir::new().unwrap();
        let adapter = FileReportAdapter::in_dir(dir.path());
        adapter.write(&state(), 500.0).unwrap();

        let trades = fs::read_to_string(dir.path().join("backtest_trades.csv")).unwrap();
        let mut lines = trades.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ticker,entry_date,exit_date,entry_price,exit_price,outcome,shares,profit,capital_after"
        );
        assert_eq!(
            lines.next().unwrap(),
            "MSFT,2024-06-03,2024-06-05,50.0,56.0,TP,10.0,59.0,559.0"
        );

        let equity = fs::read_to_string(dir.path().join("equity_curve.csv")).unwrap();
        assert_eq!(equity, "date,capital\n2024-06-05,559.0\n");

        let svg = fs::read_to_string(dir.path().join("equity_curve.svg")).unwrap();
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn empty_run_still_writes_headers() {
        let dir = TempDir::new().unwrap();
        let adapter = FileReportAdapter::in_dir(dir.path());
        adapter.write(&BacktestState::new(500.0), 500.0).unwrap();

        let equity = fs::read_to_string(dir.path().join("equity_curve.csv")).unwrap();
        assert_eq!(equity, "date,capital\n");
    }

    #[test]
    fn svg_for_empty_curve() {
        let svg = render_equity_svg(&[], 500.0);
        assert!(svg.contains("No trades"));
        assert!(!svg.contains("<path"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn svg_plots_each_point() {
        let curve = vec![point(1, 500.0), point(2, 520.0), point(3, 510.0)];
        let svg = render_equity_svg(&curve, 500.0);
        assert!(svg.contains("stroke=\"#2563eb\""));
        assert_eq!(svg.matches(" L ").count(), 2);
        assert!(svg.contains("520.00"));
        assert!(svg.contains("2024-06-03"));
    }
}
