//! Standalone HTML route map (Leaflet) with source/destination markers.

use anyhow::{Context, Result};
use geo::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};
use serde_json::json;
use std::{fs, path::Path};

use crate::model::{Coordinates, Route};

const TEMPLATE: &str = include_str!("../assets/route_map.html");
const ZOOM: f64 = 14.25;

#[derive(Debug, Clone)]
pub struct RouteMap<'a> {
    source: Coordinates,
    destination: Coordinates,
    route: &'a Route,
}

fn properties(value: serde_json::Value) -> Option<JsonObject> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

fn feature(geometry: GeoJsonValue, props: serde_json::Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: properties(props),
        foreign_members: None,
    }
}

fn marker(at: Coordinates, color: &str, tooltip: &str) -> Feature {
    let point = Point::new(at.longitude, at.latitude);
    feature(
        GeoJsonValue::from(&point),
        json!({ "role": tooltip.to_lowercase(), "color": color, "tooltip": tooltip }),
    )
}

impl<'a> RouteMap<'a> {
    pub fn new(source: Coordinates, destination: Coordinates, route: &'a Route) -> Self {
        Self { source, destination, route }
    }

    pub fn center(&self) -> Coordinates {
        self.source.midpoint(&self.destination)
    }

    /// Route line plus the two endpoint markers, GeoJSON order is (lon, lat).
    pub fn to_geojson(&self) -> FeatureCollection {
        let line: LineString<f64> = self
            .route
            .points
            .iter()
            .map(|p| (p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .into();

        let features = vec![
            feature(
                GeoJsonValue::from(&line),
                json!({ "role": "route", "color": "blue", "weight": 2.5, "opacity": 1.0 }),
            ),
            marker(self.source, "green", "Source"),
            marker(self.destination, "red", "Destination"),
        ];

        FeatureCollection { bbox: None, features, foreign_members: None }
    }

    pub fn to_html(&self) -> Result<String> {
        let geojson = serde_json::to_string(&self.to_geojson())
            .context("Failed to serialize route GeoJSON")?;
        let center = self.center();

        Ok(TEMPLATE
            .replace("{{CENTER_LAT}}", &center.latitude.to_string())
            .replace("{{CENTER_LON}}", &center.longitude.to_string())
            .replace("{{ZOOM}}", &ZOOM.to_string())
            .replace("{{GEOJSON}}", &geojson))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let html = self.to_html()?;
        fs::write(path, html)
            .with_context(|| format!("Failed to write route map: {}", path.display()))?;
        tracing::info!(path = %path.display(), "route map written");
        Ok(())
    }
}
