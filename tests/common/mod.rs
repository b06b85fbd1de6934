#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::VecDeque,
    io,
    path::Path,
    sync::{Arc, Mutex},
};

use geo::{MultiPolygon, polygon};
use shapefile::{
    Point, PolygonRing,
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
};
use tracing_subscriber::fmt::MakeWriter;
use sitefill::{
    ApiError, BoundaryAttributes, BoundaryLayer, GeocodeRequest, GeocodeResponse, GeocodingApi,
};

pub const HEADER: &str = "REGION,COUNTY,SITENAME,SITECOORDINATES,WARD,CONSTITUENCY";

/// Hands out canned replies in order and counts requests.
#[derive(Default)]
pub struct MockApi {
    replies: RefCell<VecDeque<Result<GeocodeResponse, ApiError>>>,
    requests: RefCell<Vec<GeocodeRequest>>,
}

impl MockApi {
    pub fn new(replies: impl IntoIterator<Item = Result<GeocodeResponse, ApiError>>) -> Self {
        Self { replies: RefCell::new(replies.into_iter().collect()), ..Default::default() }
    }

    pub fn calls(&self) -> usize { self.requests.borrow().len() }

    pub fn requests(&self) -> Vec<GeocodeRequest> { self.requests.borrow().clone() }
}

impl GeocodingApi for MockApi {
    fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        self.replies.borrow_mut().pop_front()
            .unwrap_or_else(|| Err(ApiError::Unexpected("mock has no reply left".into())))
    }
}

pub fn located(lat: f64, lng: f64) -> Result<GeocodeResponse, ApiError> {
    GeocodeResponse::from_json(&format!(
        r#"{{"status":"OK","results":[{{"geometry":{{"location":{{"lat":{lat},"lng":{lng}}}}}}}]}}"#
    ))
}

pub fn status_only(code: &str) -> Result<GeocodeResponse, ApiError> {
    GeocodeResponse::from_json(&format!(r#"{{"status":"{code}","results":[]}}"#))
}

pub fn admin_areas(county: &str, ward: &str) -> Result<GeocodeResponse, ApiError> {
    GeocodeResponse::from_json(&format!(r#"{{
        "status": "OK",
        "results": [{{ "address_components": [
            {{ "long_name": "{county}", "types": ["administrative_area_level_2", "political"] }},
            {{ "long_name": "{ward}", "types": ["administrative_area_level_3", "political"] }}
        ]}}]
    }}"#))
}

/// Two Nairobi wards split at lng 36.79: Kibra to the west, Woodley to the east.
pub fn nairobi_wards() -> BoundaryLayer {
    let attrs = |ward: &str| BoundaryAttributes {
        county: Some("Nairobi".into()),
        subcounty: Some("Kibra".into()),
        ward: Some(ward.into()),
    };
    let kibra = MultiPolygon(vec![polygon![
        (x: 36.76, y: -1.33), (x: 36.79, y: -1.33), (x: 36.79, y: -1.30), (x: 36.76, y: -1.30),
    ]]);
    let woodley = MultiPolygon(vec![polygon![
        (x: 36.79, y: -1.33), (x: 36.82, y: -1.33), (x: 36.82, y: -1.30), (x: 36.79, y: -1.30),
    ]]);
    BoundaryLayer::new(
        vec![kibra, woodley],
        vec![attrs("Kibra"), attrs("Woodley/Kenyatta Golf Course")],
    ).unwrap()
}

/// Write a register with the default header.
pub fn write_sites(path: &Path, rows: &[&str]) {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    std::fs::write(path, text).unwrap();
}

/// Write a one-ward shapefile (Kibra, lng 36.76..36.79, lat -1.33..-1.30)
/// with upper-case attribute names, the way the national ward layer ships.
pub fn write_kibra_shapefile(shp_path: &Path) {
    let field = |name: &str| FieldName::try_from(name).unwrap();
    let table = TableWriterBuilder::new()
        .add_character_field(field("COUNTY_NAM"), 50)
        .add_character_field(field("SUBCOUNTY"), 50)
        .add_character_field(field("WARD"), 50);
    let mut writer = shapefile::Writer::from_path(shp_path, table).unwrap();

    // Outer rings are clockwise in shapefiles.
    let ring = vec![
        Point::new(36.76, -1.30),
        Point::new(36.79, -1.30),
        Point::new(36.79, -1.33),
        Point::new(36.76, -1.33),
        Point::new(36.76, -1.30),
    ];
    let shape = shapefile::Polygon::new(PolygonRing::Outer(ring));

    let mut record = Record::default();
    record.insert("COUNTY_NAM".to_string(), FieldValue::Character(Some("Nairobi".to_string())));
    record.insert("SUBCOUNTY".to_string(), FieldValue::Character(Some("Kibra".to_string())));
    record.insert("WARD".to_string(), FieldValue::Character(Some("Kibra".to_string())));

    writer.write_shape_and_record(&shape, &record).unwrap();
    drop(writer);
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer { self.clone() }
}

/// Run `f` with a thread-local subscriber and return its result plus every
/// WARN-or-worse line it logged.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer.contents())
}
