//! Technical indicator vocabulary and the output-handle tables of the
//! indicators that expose more than one value.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Indicator {
    Rsi,
    Sma,
    Ema,
    Atr,
    Vwap,
    Obv,
    Cci,
    Adx,
    Bb,
    Macd,
    Stoch,
    Kdj,
    Ichimoku,
    VolumeProfile,
    MarketStructure,
    Other(String),
}

impl Indicator {
    pub fn as_str(&self) -> &str {
        match self {
            Indicator::Rsi => "RSI",
            Indicator::Sma => "SMA",
            Indicator::Ema => "EMA",
            Indicator::Atr => "ATR",
            Indicator::Vwap => "VWAP",
            Indicator::Obv => "OBV",
            Indicator::Cci => "CCI",
            Indicator::Adx => "ADX",
            Indicator::Bb => "BB",
            Indicator::Macd => "MACD",
            Indicator::Stoch => "STOCH",
            Indicator::Kdj => "KDJ",
            Indicator::Ichimoku => "Ichimoku",
            Indicator::VolumeProfile => "VolumeProfile",
            Indicator::MarketStructure => "MarketStructure",
            Indicator::Other(s) => s,
        }
    }

    /// Named outputs of a multi-output indicator, `None` for single-value indicators.
    pub fn output_handles(&self) -> Option<&'static [&'static str]> {
        let handles: &'static [&'static str] = match self {
            Indicator::Adx => &["adx-output", "plus-di-output", "minus-di-output"],
            Indicator::Bb => &[
                "upper-output",
                "middle-output",
                "lower-output",
                "width-output",
            ],
            Indicator::Macd => &["macd-output", "signal-output", "histogram-output"],
            Indicator::Stoch => &["k-output", "d-output"],
            Indicator::Kdj => &["k-output", "d-output", "j-output"],
            Indicator::Ichimoku => &[
                "tenkan-output",
                "kijun-output",
                "senkou-a-output",
                "senkou-b-output",
                "chikou-output",
            ],
            Indicator::VolumeProfile => &["poc-output", "vah-output", "val-output"],
            Indicator::MarketStructure => {
                &["trend-output", "support-output", "resistance-output"]
            }
            _ => return None,
        };
        Some(handles)
    }

    pub fn is_multi_output(&self) -> bool {
        self.output_handles().is_some()
    }

    /// Number of distinct outputs a fully wired node would use.
    pub fn expected_output_count(&self) -> usize {
        self.output_handles().map_or(1, |handles| handles.len())
    }

    /// Whether `handle` names an output port on this indicator. Generic
    /// positional handles `output-1` through `output-5` are always accepted.
    pub fn accepts_output_handle(&self, handle: &str) -> bool {
        if is_generic_output_handle(handle) {
            return true;
        }
        match self.output_handles() {
            Some(handles) => handles.contains(&handle),
            None => true,
        }
    }
}

fn is_generic_output_handle(handle: &str) -> bool {
    matches!(
        handle,
        "output-1" | "output-2" | "output-3" | "output-4" | "output-5"
    )
}

impl From<String> for Indicator {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "RSI" => Indicator::Rsi,
            "SMA" => Indicator::Sma,
            "EMA" => Indicator::Ema,
            "ATR" => Indicator::Atr,
            "VWAP" => Indicator::Vwap,
            "OBV" => Indicator::Obv,
            "CCI" => Indicator::Cci,
            "ADX" => Indicator::Adx,
            "BB" | "BOLLINGER" | "BOLLINGERBANDS" => Indicator::Bb,
            "MACD" => Indicator::Macd,
            "STOCH" | "STOCHASTIC" => Indicator::Stoch,
            "KDJ" => Indicator::Kdj,
            "ICHIMOKU" => Indicator::Ichimoku,
            "VOLUMEPROFILE" => Indicator::VolumeProfile,
            "MARKETSTRUCTURE" => Indicator::MarketStructure,
            _ => Indicator::Other(s),
        }
    }
}

impl From<Indicator> for String {
    fn from(indicator: Indicator) -> Self {
        match indicator {
            Indicator::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
