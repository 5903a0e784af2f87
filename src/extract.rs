//! Extraction of display readings from raw sensor JSON.
//!
//! A [`Profile`] is a fixed table of `(source path, display label)` pairs.
//! [`extract`] looks each pair up in the raw document and collects the
//! present scalar values into an ordered [`Snapshot`]. Absent, null, and
//! non-scalar values are dropped, never represented as null.

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;

/// A single scalar reading extracted from the sensor document.
///
/// Null, arrays, and objects are not representable; a field that holds
/// one is treated as absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    /// Convert a JSON value into a scalar, if it is one.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Scalar::Int(i))
                } else {
                    n.as_f64().map(Scalar::Float)
                }
            }
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => write!(f, "{}", s),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// An ordered label → value mapping of the readings present in one poll.
///
/// Entry order follows the profile's declaration order. The key set varies
/// attempt-to-attempt: a field absent from the raw document simply has no
/// entry here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    entries: Vec<(String, Scalar)>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Labels are not deduplicated; profiles declare each
    /// label once.
    pub fn push(&mut self, label: impl Into<String>, value: Scalar) {
        self.entries.push((label.into(), value));
    }

    /// Look up a value by its display label.
    pub fn get(&self, label: &str) -> Option<&Scalar> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v))
    }
}

impl FromIterator<(String, Scalar)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (String, Scalar)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// One entry in a profile's field table.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Source path in the raw document: a top-level key, or `outer.inner`
    /// for keys nested one level down.
    pub path: &'static str,
    /// Human-readable label shown in the values panel.
    pub label: &'static str,
}

const fn field(path: &'static str, label: &'static str) -> Field {
    Field { path, label }
}

/// Curated live values from the PurpleAir Flex JSON layout, where readings
/// sit under nested `sensor`, `pm`, and `stats` objects.
const CURATED_FIELDS: &[Field] = &[
    field("pm.pm1.0", "PM1.0"),
    field("pm.pm2.5", "PM2.5"),
    field("pm.pm10.0", "PM10.0"),
    field("pm.aqi", "AQI"),
    field("sensor.temperature", "Temp (F)"),
    field("sensor.humidity", "Humidity (%)"),
    field("sensor.pressure", "Pressure (hPa)"),
    field("sensor.voc", "VOC"),
    field("sensor.rssi", "Signal RSSI (dBm)"),
    field("sensor.uptime", "Uptime (s)"),
    field("stats.last_updated", "Last Updated"),
];

/// Everything the classic PurpleAir `/json` document reports as flat
/// top-level keys, both laser counters (channel A and B).
const FULL_FIELDS: &[Field] = &[
    field("SensorId", "Sensor ID"),
    field("DateTime", "Date/Time"),
    field("Geo", "Geo Name"),
    field("place", "Placement"),
    field("lat", "Latitude"),
    field("lon", "Longitude"),
    field("version", "Firmware"),
    field("hardwareversion", "Hardware Version"),
    field("hardwarediscovered", "Hardware Discovered"),
    field("uptime", "Uptime (s)"),
    field("rssi", "Signal RSSI (dBm)"),
    field("ssid", "SSID"),
    field("wlstate", "WiFi State"),
    field("period", "Report Period (s)"),
    field("loggingrate", "Logging Rate"),
    field("httpsuccess", "HTTP Successes"),
    field("httpsends", "HTTP Sends"),
    field("pa_latency", "PA Latency (ms)"),
    field("response", "Server Response"),
    field("response_date", "Server Response Date"),
    field("latency", "Latency (ms)"),
    field("Mem", "Free Heap"),
    field("memfrag", "Heap Fragmentation"),
    field("memfb", "Largest Free Block"),
    field("memcs", "Contiguous Stack"),
    field("Adc", "ADC Voltage"),
    field("current_temp_f", "Temp (F)"),
    field("current_humidity", "Humidity (%)"),
    field("current_dewpoint_f", "Dewpoint (F)"),
    field("pressure", "Pressure (hPa)"),
    field("p25aqic", "AQI Color (A)"),
    field("pm2.5_aqi", "PM2.5 AQI (A)"),
    field("pm1_0_cf_1", "PM1.0 CF=1 (A)"),
    field("pm2_5_cf_1", "PM2.5 CF=1 (A)"),
    field("pm10_0_cf_1", "PM10.0 CF=1 (A)"),
    field("pm1_0_atm", "PM1.0 ATM (A)"),
    field("pm2_5_atm", "PM2.5 ATM (A)"),
    field("pm10_0_atm", "PM10.0 ATM (A)"),
    field("p_0_3_um", "Particles >0.3um (A)"),
    field("p_0_5_um", "Particles >0.5um (A)"),
    field("p_1_0_um", "Particles >1.0um (A)"),
    field("p_2_5_um", "Particles >2.5um (A)"),
    field("p_5_0_um", "Particles >5.0um (A)"),
    field("p_10_0_um", "Particles >10.0um (A)"),
    field("p25aqic_b", "AQI Color (B)"),
    field("pm2.5_aqi_b", "PM2.5 AQI (B)"),
    field("pm1_0_cf_1_b", "PM1.0 CF=1 (B)"),
    field("pm2_5_cf_1_b", "PM2.5 CF=1 (B)"),
    field("pm10_0_cf_1_b", "PM10.0 CF=1 (B)"),
    field("pm1_0_atm_b", "PM1.0 ATM (B)"),
    field("pm2_5_atm_b", "PM2.5 ATM (B)"),
    field("pm10_0_atm_b", "PM10.0 ATM (B)"),
    field("p_0_3_um_b", "Particles >0.3um (B)"),
    field("p_0_5_um_b", "Particles >0.5um (B)"),
    field("p_1_0_um_b", "Particles >1.0um (B)"),
    field("p_2_5_um_b", "Particles >2.5um (B)"),
    field("p_5_0_um_b", "Particles >5.0um (B)"),
    field("p_10_0_um_b", "Particles >10.0um (B)"),
    field("status_0", "Status 0"),
    field("status_1", "Status 1"),
    field("status_2", "Status 2"),
    field("status_3", "Status 3"),
    field("status_4", "Status 4"),
    field("status_5", "Status 5"),
    field("status_6", "Status 6"),
    field("status_7", "Status 7"),
    field("status_8", "Status 8"),
    field("status_9", "Status 9"),
    field("Id", "Station ID"),
];

/// A named extraction profile: which fixed field table to read.
///
/// Two structurally different documents exist in the wild for the same
/// device family, so the table is selected by configuration rather than
/// guessed from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// ~11 curated live values from nested `sensor`/`pm`/`stats` objects.
    Curated,
    /// ~70 flat top-level keys of the classic `/json` document.
    Full,
}

impl Profile {
    /// The field table this profile reads.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Profile::Curated => CURATED_FIELDS,
            Profile::Full => FULL_FIELDS,
        }
    }

    /// Short name for display in the header bar.
    pub fn label(&self) -> &'static str {
        match self {
            Profile::Curated => "curated",
            Profile::Full => "full",
        }
    }
}

/// Flatten one raw sensor document into the profile's readings.
///
/// Pure and infallible: any lookup that misses, hits null, or hits a
/// non-scalar is omitted from the output. Entry order follows the
/// profile's declaration order.
pub fn extract(profile: Profile, raw: &Value) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for f in profile.fields() {
        if let Some(value) = lookup(raw, f.path).and_then(Scalar::from_json) {
            snapshot.push(f.label, value);
        }
    }
    snapshot
}

/// Resolve a field path against the raw document.
///
/// Exact top-level match wins: device keys themselves contain dots
/// (`pm2.5_aqi` is a single flat key, while `pm.pm2.5` means key `pm2.5`
/// inside object `pm`). Only if no top-level key matches is the path split
/// once at the first dot.
fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = raw.get(path) {
        return Some(value);
    }
    let (outer, inner) = path.split_once('.')?;
    raw.get(outer)?.get(inner)
}
