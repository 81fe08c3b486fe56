//! Observation metadata read from FITS headers.
//!
//! Header access goes through the [`CardSource`] trait so that the parsing
//! rules can be exercised without FITS files; [`FitsHeader`] is the
//! `fitsio`-backed implementation used by the pipeline.

use crate::config::HeaderKeys;
use crate::error::HeaderError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use ephemeris::{EquatorialCoord, ObserverSite};
use fitsio::hdu::FitsHdu;
use fitsio::FitsFile;
use log::debug;
use std::collections::HashMap;
use std::path::Path;

/// Read access to header card values
pub trait CardSource {
    /// Card value as text with surrounding quotes and blanks removed
    fn text(&mut self, name: &str) -> Option<String>;

    /// Card value as a number; string cards such as `'-30.16 degrees'` yield their leading number
    fn number(&mut self, name: &str) -> Option<f64> {
        self.text(name).and_then(|v| parse_leading_number(&v))
    }
}

impl CardSource for HashMap<String, String> {
    fn text(&mut self, name: &str) -> Option<String> {
        self.get(name)
            .map(|v| clean_value(v))
            .filter(|v| !v.is_empty())
    }
}

/// One header of an open FITS file
pub struct FitsHeader {
    file: FitsFile,
    hdu: FitsHdu,
}

impl FitsHeader {
    pub fn open(path: &Path, hdu_index: usize) -> Result<Self, HeaderError> {
        let mut file = FitsFile::open(path).map_err(|source| HeaderError::Open {
            hdu: hdu_index,
            source,
        })?;
        let hdu = file.hdu(hdu_index).map_err(|source| HeaderError::Open {
            hdu: hdu_index,
            source,
        })?;
        Ok(Self { file, hdu })
    }
}

impl CardSource for FitsHeader {
    fn text(&mut self, name: &str) -> Option<String> {
        self.hdu
            .read_key::<String>(&mut self.file, name)
            .ok()
            .map(|v| clean_value(&v))
            .filter(|v| !v.is_empty())
    }

    fn number(&mut self, name: &str) -> Option<f64> {
        self.hdu
            .read_key::<f64>(&mut self.file, name)
            .ok()
            .or_else(|| self.text(name).and_then(|v| parse_leading_number(&v)))
    }
}

/// Everything the crossing search needs from one observation header
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub filename: String,
    pub object_name: Option<String>,
    pub filter_name: Option<String>,
    pub header_time: DateTime<Utc>,
    pub target_altitude_deg: f64,
    /// Pointing (RA/Dec, J2000)
    pub target: EquatorialCoord,
    /// Site recorded in the header, when all site cards are present
    pub site: Option<ObserverSite>,
}

impl Observation {
    /// Build an observation from header cards
    pub fn from_cards<S: CardSource>(
        filename: impl Into<String>,
        cards: &mut S,
        keys: &HeaderKeys,
    ) -> Result<Self, HeaderError> {
        let (object_name, filter_name) = identify(cards, keys);

        let date_text = cards
            .text(&keys.date_card)
            .ok_or_else(|| HeaderError::MissingCard(keys.date_card.clone()))?;
        let header_time =
            parse_header_timestamp(&date_text).ok_or_else(|| HeaderError::InvalidTimestamp {
                card: keys.date_card.clone(),
                value: date_text.clone(),
            })?;

        let ra = required_number(cards, &keys.ra_card)?;
        let dec = required_number(cards, &keys.dec_card)?;
        let target = EquatorialCoord::new(ra, dec)?;

        let target_altitude_deg = keys
            .altitude_cards
            .iter()
            .find_map(|card| cards.number(card))
            .ok_or_else(|| HeaderError::MissingAltitude(keys.altitude_cards.join(", ")))?;

        let site = read_site(cards, keys)?;

        Ok(Self {
            filename: filename.into(),
            object_name,
            filter_name,
            header_time,
            target_altitude_deg,
            target,
            site,
        })
    }
}

/// Object and filter names, read independently of the other cards
pub fn identify<S: CardSource>(
    cards: &mut S,
    keys: &HeaderKeys,
) -> (Option<String>, Option<String>) {
    (cards.text(&keys.object_card), cards.text(&keys.filter_card))
}

fn required_number<S: CardSource>(cards: &mut S, card: &str) -> Result<f64, HeaderError> {
    match cards.number(card) {
        Some(v) => Ok(v),
        None => match cards.text(card) {
            Some(value) => Err(HeaderError::InvalidValue {
                card: card.to_string(),
                value,
            }),
            None => Err(HeaderError::MissingCard(card.to_string())),
        },
    }
}

fn read_site<S: CardSource>(
    cards: &mut S,
    keys: &HeaderKeys,
) -> Result<Option<ObserverSite>, HeaderError> {
    let lat = cards.number(&keys.site_latitude_card);
    let lon = cards.number(&keys.site_longitude_card);
    let elev = cards.number(&keys.site_elevation_card);

    match (lat, lon, elev) {
        (Some(lat), Some(lon), Some(elev)) => {
            let site = ObserverSite::new("header", lat, lon, elev)?;
            debug!("using site from header: {site}");
            Ok(Some(site))
        }
        _ => Ok(None),
    }
}

/// Strip blanks and FITS string quotes
fn clean_value(raw: &str) -> String {
    raw.trim().trim_matches('\'').trim().to_string()
}

/// First whitespace-separated token of `value`, parsed as a number
pub fn parse_leading_number(value: &str) -> Option<f64> {
    clean_value(value)
        .split_whitespace()
        .next()
        .and_then(|tok| tok.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse a header timestamp.
///
/// Accepts RFC 3339 values with an offset or `Z`, naive ISO-8601 date-times
/// (UTC assumed) with `T` or space separators and optional fractional
/// seconds, and bare dates (midnight UTC).
pub fn parse_header_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = clean_value(value);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&value, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
