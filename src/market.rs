//! Quote and candle shapes from the market-data provider, plus the small
//! amount of math the dashboard strip needs (percent change, top movers).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Finnhub `/quote` payload. Missing numbers are treated as absent, not zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quote {
    /// current price
    pub c: Option<f64>,
    pub o: Option<f64>,
    pub h: Option<f64>,
    pub l: Option<f64>,
    pub v: Option<f64>,
    /// previous close
    pub pc: Option<f64>,
}

/// Finnhub `/stock/symbol` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolInfo {
    pub symbol: String,
    pub description: String,
    #[serde(rename = "displaySymbol")]
    pub display_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub symbol: String,
    /// Percent change vs previous close, 2 dp.
    pub change: f64,
    pub price: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
    pub prev_close: Option<f64>,
}

impl Mover {
    pub fn from_quote(symbol: impl Into<String>, q: &Quote) -> Self {
        Self {
            symbol: symbol.into(),
            change: percent_change(q.c, q.pc),
            price: q.c,
            open: q.o,
            high: q.h,
            low: q.l,
            volume: q.v,
            prev_close: q.pc,
        }
    }
}

/// `(c - pc) / pc * 100` rounded to 2 dp; 0 when either side is missing or zero.
pub fn percent_change(current: Option<f64>, prev_close: Option<f64>) -> f64 {
    match (current, prev_close) {
        (Some(c), Some(pc)) if c != 0.0 && pc != 0.0 => round2((c - pc) / pc * 100.0),
        _ => 0.0,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Biggest percent gains first.
pub fn top_gainers(mut movers: Vec<Mover>, n: usize) -> Vec<Mover> {
    movers.sort_by(|a, b| b.change.total_cmp(&a.change));
    movers.truncate(n);
    movers
}

/// Biggest percent losses first.
pub fn top_losers(mut movers: Vec<Mover>, n: usize) -> Vec<Mover> {
    movers.sort_by(|a, b| a.change.total_cmp(&b.change));
    movers.truncate(n);
    movers
}

/// Candle resolution for a lookback window: 5-minute bars for a day,
/// 30-minute for a week, hourly for a month, daily beyond.
pub fn resolution_for_days(days: u32) -> &'static str {
    match days {
        0..=1 => "5",
        2..=7 => "30",
        8..=30 => "60",
        _ => "D",
    }
}

/// `(from, to)` unix seconds for a lookback of `days` ending at `now`.
pub fn candle_window(days: u32, now: DateTime<Utc>) -> (i64, i64) {
    let to = now.timestamp();
    let from = to - i64::from(days.max(1)) * 24 * 60 * 60;
    (from, to)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub time: DateTime<Utc>,
}

/// Finnhub `/stock/candle` payload: parallel arrays plus a status flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandleResponse {
    pub c: Option<Vec<f64>>,
    pub o: Option<Vec<f64>>,
    pub h: Option<Vec<f64>>,
    pub l: Option<Vec<f64>>,
    pub v: Option<Vec<f64>>,
    pub t: Option<Vec<i64>>,
    pub s: Option<String>,
}

impl CandleResponse {
    /// Zip the arrays into candles. Anything but status "ok" with closes yields none;
    /// rows are cut to the shortest array.
    pub fn into_candles(self) -> Vec<Candle> {
        if self.s.as_deref() != Some("ok") {
            return Vec::new();
        }
        let (Some(c), Some(o), Some(h), Some(l), Some(t)) = (self.c, self.o, self.h, self.l, self.t)
        else {
            return Vec::new();
        };
        let v = self.v.unwrap_or_default();

        let n = [c.len(), o.len(), h.len(), l.len(), t.len()]
            .into_iter()
            .min()
            .unwrap_or(0);

        (0..n)
            .filter_map(|i| {
                let time = DateTime::from_timestamp(t[i], 0)?;
                Some(Candle {
                    open: o[i],
                    close: c[i],
                    high: h[i],
                    low: l[i],
                    volume: v.get(i).copied().unwrap_or(0.0),
                    time,
                })
            })
            .collect()
    }
}
