use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::AppError;

/// Shown when an alert carries no usable base token symbol.
pub const UNKNOWN_SYMBOL: &str = "???";

/// Shown when an alert carries no usable liquidity figure.
pub const UNKNOWN_LIQUIDITY_USD: f64 = 0.0;

/// Accept any JSON value and keep it only if it has the expected shape.
///
/// Upstream fields are best-effort: a wrong type is treated the same as a
/// missing field instead of failing the whole frame.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(v).ok())
}

/// Numbers pass through, numeric strings are parsed, anything else is absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BaseToken {
    #[serde(default, deserialize_with = "lenient")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Liquidity {
    #[serde(default, deserialize_with = "lenient_number")]
    pub usd: Option<f64>,
}

/// The DEX pair attached to an alert by the upstream detector.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    #[serde(default, deserialize_with = "lenient")]
    pub base_token: Option<BaseToken>,
    #[serde(default, deserialize_with = "lenient")]
    pub liquidity: Option<Liquidity>,
}

/// One decoded alert frame.
///
/// Only the fields the feed displays are modelled. `safety` and the contact
/// fields have no fixed type upstream and are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Alert {
    #[serde(default, deserialize_with = "lenient")]
    pub pair: Option<Pair>,
    #[serde(default)]
    pub safety: Option<Value>,
    #[serde(default)]
    pub twitter: Option<Value>,
    #[serde(default)]
    pub telegram: Option<Value>,
    #[serde(default)]
    pub web: Option<Value>,
}

impl Alert {
    /// Decode one text frame. The top-level value must be a JSON object.
    pub fn decode(text: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(AppError::Shape(json_kind(&other))),
        }
    }

    /// Base token symbol, or [`UNKNOWN_SYMBOL`] when absent or empty.
    pub fn symbol(&self) -> &str {
        self.pair
            .as_ref()
            .and_then(|p| p.base_token.as_ref())
            .and_then(|t| t.symbol.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SYMBOL)
    }

    /// Pair liquidity in USD, or [`UNKNOWN_LIQUIDITY_USD`] when absent,
    /// zero or not a finite number.
    pub fn liquidity_usd(&self) -> f64 {
        self.pair
            .as_ref()
            .and_then(|p| p.liquidity.as_ref())
            .and_then(|l| l.usd)
            .filter(|v| v.is_finite() && *v != 0.0)
            .unwrap_or(UNKNOWN_LIQUIDITY_USD)
    }

    pub fn safety_text(&self) -> String {
        display_value(self.safety.as_ref())
    }

    pub fn twitter_text(&self) -> String {
        display_value(self.twitter.as_ref())
    }

    pub fn telegram_text(&self) -> String {
        display_value(self.telegram.as_ref())
    }

    pub fn web_text(&self) -> String {
        display_value(self.web.as_ref())
    }

    /// Liquidity as shown next to the `$` sign.
    pub fn liquidity_text(&self) -> String {
        format_number(self.liquidity_usd())
    }

    /// `SYMBOL - safety - liquidity$`
    pub fn summary_line(&self) -> String {
        format!(
            "{} - {} - {}$",
            self.symbol(),
            self.safety_text(),
            self.liquidity_text()
        )
    }

    /// Contact links prefixed with bird, speech bubble and globe icons.
    pub fn contacts_line(&self) -> String {
        format!(
            "🐦 {} 💬 {} 🌐 {}",
            self.twitter_text(),
            self.telegram_text(),
            self.web_text()
        )
    }
}

/// An alert together with the local receive time.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedAlert {
    pub alert: Alert,
    pub received_at: DateTime<Utc>,
}

impl ReceivedAlert {
    pub fn new(alert: Alert) -> Self {
        Self {
            alert,
            received_at: Utc::now(),
        }
    }
}

/// Render an untyped field as text.
///
/// Strings are verbatim and numbers use [`format_number`]. Missing, null and
/// boolean values render as nothing. Array elements are rendered the same way
/// and concatenated without a separator. Objects fall back to compact JSON.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(_)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        Some(Value::Array(items)) => items.iter().map(|v| display_value(Some(v))).collect(),
        Some(other @ Value::Object(_)) => other.to_string(),
    }
}

/// Shortest round-trip text for a number. Magnitudes of `1e21` and above, or
/// below `1e-6`, switch to exponent form with an explicit sign (`1e+21`,
/// `1.5e-7`).
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }
    let magnitude = v.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", v);
    }
    let exp = format!("{:e}", v);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
