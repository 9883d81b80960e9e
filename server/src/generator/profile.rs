use anyhow::{ensure, Context};
use chrono::{Days, NaiveDate};
use firmscore::aggregate::round1;
use firmscore::feature::{ConfidenceClass, Feature, FeatureCollection, Geometry};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// Configuration for generating synthetic FIRMS hotspot layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub count: usize,
    pub seed: u64,
    pub center_lat: f64,
    pub center_lon: f64,
    /// Half-width of the sampling box, in degrees.
    pub spread_deg: f64,
    /// First acquisition date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Acquisition dates are spread over this many days from `start_date`.
    pub days: u64,
    pub satellites: Vec<String>,
    /// Mean of the exponential FRP distribution, in MW.
    pub mean_frp: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 200,
            seed: 0,
            center_lat: 14.75,
            center_lon: -86.2,
            spread_deg: 1.5,
            start_date: "2024-03-14".to_string(),
            days: 3,
            satellites: vec!["N".into(), "1".into(), "Aqua".into(), "Terra".into()],
            mean_frp: 8.0,
        }
    }
}

impl GeneratorConfig {
    pub fn with_overrides(mut self, count: Option<usize>, seed: Option<u64>) -> Self {
        if let Some(count) = count {
            self.count = count;
        }
        if let Some(seed) = seed {
            self.seed = seed;
        }
        self
    }
}

/// High and low confidence are each drawn 20% of the time, nominal 60%.
fn pick_confidence(rng: &mut StdRng) -> ConfidenceClass {
    match rng.gen_range(0..10) {
        0 | 1 => ConfidenceClass::High,
        2 | 3 => ConfidenceClass::Low,
        _ => ConfidenceClass::Nominal,
    }
}

fn exponential(rng: &mut StdRng, mean: f64) -> f64 {
    let u: f64 = rng.gen_range(0.0..1.0);
    -mean * (1.0 - u).ln()
}

pub fn build_hotspots(config: &GeneratorConfig) -> anyhow::Result<FeatureCollection> {
    ensure!(config.days > 0, "generator needs at least one day");
    ensure!(config.spread_deg >= 0.0, "spread must not be negative");
    let start = NaiveDate::parse_from_str(&config.start_date, "%Y-%m-%d")
        .with_context(|| format!("parsing start date {:?}", config.start_date))?;
    let mut dates = Vec::with_capacity(config.days as usize);
    for offset in 0..config.days {
        let date = start
            .checked_add_days(Days::new(offset))
            .context("acquisition date out of range")?;
        dates.push(date.format("%Y-%m-%d").to_string());
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut features = Vec::with_capacity(config.count);

    for _ in 0..config.count {
        let lon = config.center_lon + rng.gen_range(-1.0..=1.0) * config.spread_deg;
        let lat = config.center_lat + rng.gen_range(-1.0..=1.0) * config.spread_deg;
        let confidence = pick_confidence(&mut rng);
        let frp = round1(exponential(&mut rng, config.mean_frp));
        let hour: u32 = rng.gen_range(0..24);
        let minute: u32 = rng.gen_range(0..60);
        let date = &dates[rng.gen_range(0..dates.len())];

        let mut properties = Map::new();
        properties.insert("latitude".into(), json!(round_coord(lat)));
        properties.insert("longitude".into(), json!(round_coord(lon)));
        properties.insert(
            "bright_ti4".into(),
            json!(round1(rng.gen_range(300.0..367.0))),
        );
        properties.insert("acq_date".into(), json!(date));
        properties.insert("acq_time".into(), json!(format!("{hour:02}{minute:02}")));
        if !config.satellites.is_empty() {
            let satellite = &config.satellites[rng.gen_range(0..config.satellites.len())];
            properties.insert("satellite".into(), json!(satellite));
        }
        properties.insert("instrument".into(), json!("VIIRS"));
        properties.insert("confidence".into(), json!(confidence.code()));
        properties.insert("version".into(), json!("2.0NRT"));
        properties.insert("frp".into(), json!(frp));
        properties.insert(
            "daynight".into(),
            Value::from(if (6..18).contains(&hour) { "D" } else { "N" }),
        );

        let position = vec![round_coord(lon), round_coord(lat)];
        features.push(Feature::new(Some(Geometry::Point(position)), properties));
    }

    Ok(FeatureCollection::new(features))
}

fn round_coord(value: f64) -> f64 {
    (value * 1e5).round() / 1e5
}

pub fn write_layer<P: AsRef<Path>>(path: P, collection: &FeatureCollection) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating layer directory {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(collection).context("encoding layer")?;
    fs::write(path, body).with_context(|| format!("writing layer {}", path.display()))?;
    Ok(())
}
