use anyhow::Context;
use firmscore::aggregate::{aggregate, Summary};
use firmscore::feature::FeatureCollection;
use firmscore::render::format_average;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Reads a GeoJSON layer from disk and aggregates it.
pub fn summarize_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Summary> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading layer {}", path.display()))?;
    let collection: FeatureCollection = serde_json::from_str(&contents)
        .with_context(|| format!("decoding layer {}", path.display()))?;
    Ok(aggregate(&collection.features))
}

/// One-line summary, as printed and appended to the report file.
pub fn format_report(label: &str, summary: &Summary) -> String {
    let satellites = summary
        .satellite_counts
        .iter()
        .map(|(name, count)| format!("{name}={count}"))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "layer={label} total={} h={} n={} l={} frp_sum={:.1} frp_avg={} satellites=[{satellites}]",
        summary.total,
        summary.counts.h,
        summary.counts.n,
        summary.counts.l,
        summary.frp_sum,
        format_average(summary.frp_average),
    )
}

pub fn append_report<P: AsRef<Path>>(path: P, line: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening report {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LAYER: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"confidence": "h", "frp": 10, "satellite": "N"}},
            {"type": "Feature", "properties": {"confidence": "l", "frp": 2.5, "satellite": "N"}},
            {"type": "Feature", "properties": {"confidence": "x"}}
        ]
    }"#;

    #[test]
    fn summarizes_layer_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("focos.geojson");
        fs::write(&path, LAYER).unwrap();

        let summary = summarize_file(&path).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.counts.h, 1);
        assert_eq!(summary.counts.l, 1);
        assert_eq!(
            format_report("focos", &summary),
            "layer=focos total=3 h=1 n=0 l=1 frp_sum=12.5 frp_avg=4.2 satellites=[N=2,Desconocido=1]"
        );
    }

    #[test]
    fn broken_layer_reports_its_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.geojson");
        fs::write(&path, "not json").unwrap();
        let err = summarize_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.geojson"));
    }

    #[test]
    fn report_lines_are_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/summary.log");
        append_report(&path, "first").unwrap();
        append_report(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
