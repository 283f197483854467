use std::net::IpAddr;
use std::path::Path;

use maxminddb::{geoip2, Reader};
use tracing::{debug, info, warn};

use visitlog_core::visit::Location;

/// Address used to check at startup that the database actually resolves.
const PROBE_IP: &str = "8.8.8.8";

/// IP geolocation backed by a MaxMind City database.
///
/// The database is read into memory once at startup and shared read-only by
/// every request. When the file is missing or unreadable the locator is
/// disabled and every lookup yields `None`.
pub struct GeoLocator {
    reader: Option<Reader<Vec<u8>>>,
}

impl GeoLocator {
    /// Load the database at `path`, falling back to a disabled locator.
    pub fn open(path: &str) -> Self {
        if !Path::new(path).exists() {
            warn!(
                geoip_path = %path,
                "GeoIP database not found. Visits stored with empty location. \
                 Download a GeoLite2-City or DB-IP City Lite .mmdb and set VISITLOG_GEOIP_PATH."
            );
            return Self::disabled();
        }

        match Reader::open_readfile(path) {
            Ok(reader) => {
                let locator = Self {
                    reader: Some(reader),
                };
                match locator.lookup(PROBE_IP) {
                    Some(loc) => info!(
                        geoip_path = %path,
                        probe = PROBE_IP,
                        country = ?loc.country,
                        "GeoIP database loaded"
                    ),
                    None => warn!(
                        geoip_path = %path,
                        probe = PROBE_IP,
                        "GeoIP database loaded but probe address did not resolve"
                    ),
                }
                locator
            }
            Err(e) => {
                warn!(
                    geoip_path = %path,
                    error = %e,
                    "GeoIP database unreadable. Visits stored with empty location."
                );
                Self::disabled()
            }
        }
    }

    /// A locator that never resolves anything.
    pub fn disabled() -> Self {
        Self { reader: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.reader.is_some()
    }

    /// Resolve `ip` to a location.
    ///
    /// Malformed addresses, private/reserved ranges with no record, and reader
    /// errors all yield `None`; this never fails the caller.
    pub fn lookup(&self, ip: &str) -> Option<Location> {
        let reader = self.reader.as_ref()?;
        let addr: IpAddr = match ip.trim().parse() {
            Ok(addr) => addr,
            Err(_) => {
                debug!(ip, "GeoIP lookup skipped: not an IP address");
                return None;
            }
        };

        // Proxies often report IPv4 clients as `::ffff:a.b.c.d`.
        let addr = addr.to_canonical();
        let result = match reader.lookup(addr) {
            Ok(result) => result,
            Err(e) => {
                debug!(%addr, error = %e, "GeoIP lookup failed");
                return None;
            }
        };
        let city = match result.decode::<geoip2::City>() {
            Ok(Some(city)) => city,
            Ok(None) => return None,
            Err(e) => {
                debug!(%addr, error = %e, "GeoIP record could not be decoded");
                return None;
            }
        };

        let location = location_from_city(&city);
        (!location.is_empty()).then_some(location)
    }
}

/// Flatten a MaxMind City record into the stored [`Location`] shape.
pub fn location_from_city(city: &geoip2::City<'_>) -> Location {
    let ll = match (city.location.latitude, city.location.longitude) {
        (Some(lat), Some(lon)) => Some([lat, lon]),
        _ => None,
    };

    Location {
        country: city.country.iso_code.map(str::to_string),
        region: city
            .subdivisions
            .first()
            .and_then(|sub| sub.iso_code)
            .map(str::to_string),
        city: city.city.names.english.map(str::to_string),
        timezone: city.location.time_zone.map(str::to_string),
        ll,
        metro: city.location.metro_code,
        area: city.location.accuracy_radius,
        eu: city.country.is_in_european_union,
    }
}
