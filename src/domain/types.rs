//! Shared types for scan events

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Timestamp layout used for egress and accepted on ingest
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted ingest layouts, tried in order
const INGEST_FORMATS: [&str; 4] =
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Newtype wrapper for camera (waypoint) IDs to provide type safety
///
/// Camera IDs arrive as strings or integers depending on the export; both are
/// stored in their textual form so that operator-typed canonical routes and
/// scan logs compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CameraId(pub String);

impl CameraId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CameraId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CameraId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for CameraId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct CameraIdVisitor;

        impl<'de> Visitor<'de> for CameraIdVisitor {
            type Value = CameraId;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string or integer camera id")
            }

            fn visit_str<E>(self, value: &str) -> Result<CameraId, E>
            where
                E: de::Error,
            {
                Ok(CameraId(value.trim().to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<CameraId, E>
            where
                E: de::Error,
            {
                Ok(CameraId(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<CameraId, E>
            where
                E: de::Error,
            {
                Ok(CameraId(value.to_string()))
            }

            // Spreadsheet exports write integer ids as `12.0`
            fn visit_f64<E>(self, value: f64) -> Result<CameraId, E>
            where
                E: de::Error,
            {
                if value.is_finite() && value.fract() == 0.0 {
                    Ok(CameraId(format!("{}", value as i64)))
                } else {
                    Err(E::custom(format!("camera id is not a whole number: {}", value)))
                }
            }
        }

        deserializer.deserialize_any(CameraIdVisitor)
    }
}

/// A single camera detection of a plate
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanEvent {
    #[serde(alias = "num_plate")]
    pub plate: String,
    #[serde(alias = "camera_ID", alias = "camera_id")]
    pub camera: CameraId,
    #[serde(alias = "date", deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(default, deserialize_with = "deserialize_direction")]
    pub direction: String,
}

impl ScanEvent {
    pub fn new(
        plate: &str,
        camera: impl Into<String>,
        timestamp: NaiveDateTime,
        direction: &str,
    ) -> Self {
        Self {
            plate: plate.to_string(),
            camera: CameraId(camera.into()),
            timestamp,
            direction: direction.to_string(),
        }
    }

    /// Copy of this event with a different plate
    pub fn with_plate(&self, plate: &str) -> Self {
        Self { plate: plate.to_string(), ..self.clone() }
    }
}

/// Parse a timestamp in any of the accepted ingest layouts
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    INGEST_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Minutes elapsed from `earlier` to `later` (negative if out of order)
#[inline]
pub fn minutes_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = NaiveDateTime;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a datetime string or epoch seconds")
        }

        fn visit_str<E>(self, value: &str) -> Result<NaiveDateTime, E>
        where
            E: de::Error,
        {
            parse_timestamp(value)
                .ok_or_else(|| E::custom(format!("unrecognised timestamp '{}'", value)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<NaiveDateTime, E>
        where
            E: de::Error,
        {
            DateTime::from_timestamp(value, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| E::custom(format!("epoch seconds out of range: {}", value)))
        }

        fn visit_u64<E>(self, value: u64) -> Result<NaiveDateTime, E>
        where
            E: de::Error,
        {
            let secs = i64::try_from(value)
                .map_err(|_| E::custom(format!("epoch seconds out of range: {}", value)))?;
            self.visit_i64(secs)
        }

        fn visit_f64<E>(self, value: f64) -> Result<NaiveDateTime, E>
        where
            E: de::Error,
        {
            let micros = (value * 1_000_000.0).round();
            if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
                return Err(E::custom(format!("epoch seconds out of range: {}", value)));
            }
            DateTime::from_timestamp_micros(micros as i64)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| E::custom(format!("epoch seconds out of range: {}", value)))
        }
    }

    deserializer.deserialize_any(TimestampVisitor)
}

/// Missing and null directions both become the empty string
fn deserialize_direction<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serialize a timestamp in the egress layout
pub fn serialize_timestamp<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
}
