use std::path::Path;

use anyhow::Result;
use fare_core::{FareQuote, RouteMap, ServiceType};

pub const ROUTE_UNAVAILABLE: &str =
    "Failed to retrieve the route. Please check your API key and quota.";

pub fn quote(quote: &FareQuote, map_path: Option<&Path>) -> Result<()> {
    println!("{}", quote.message());
    println!(
        "Weather at pickup: {} ({}), {:.1}°F, feels like {:.1}°F",
        quote.weather.short_summary, quote.weather.long_summary, quote.weather.temperature,
        quote.weather.feels_like,
    );

    let Some(path) = map_path else {
        return Ok(());
    };

    match &quote.route {
        Some(route) => {
            RouteMap::new(quote.source, quote.destination, route).write_to(path)?;
            println!("Route map ({} points) written to {}", route.points.len(), path.display());
        }
        None => eprintln!("{ROUTE_UNAVAILABLE}"),
    }

    Ok(())
}

pub fn cab_catalogue(services: &[ServiceType]) {
    for service in services {
        println!("{service}:");
        for cab in service.cab_types() {
            println!("  {cab}");
        }
    }
}
