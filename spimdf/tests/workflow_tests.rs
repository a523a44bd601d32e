use std::fs;
use std::path::PathBuf;

use approx::assert_abs_diff_eq;

use spimcore::algorithm::verification::CountVerdict;
use spimcore::error::SpimError;
use spimcore::model::entity::{Dimension, Entity};
use spimcore::model::interest_point::{InterestPoint, InterestPointList};
use spimcore::model::sequence::SequenceDescription;
use spimcore::model::view::{ViewId, ViewSetup, VoxelSize};
use spimcore::selection::resolver::resolve;
use spimcore::selection::spec::{SelectionSpec, SelectionSpecs};
use spimdf::data::dataset::{
    DatasetDocument, SpimDataset, ViewInterestPointsEntry, ViewRegistrationEntry,
};
use spimdf::workflow::channels::choose_channel_processes;
use spimdf::workflow::histogram::{channel_histograms, HistogramConfig, NeighborScope};
use spimdf::workflow::verification::{verify_detections, VerificationConfig};

/// 4x4x4 lattice with 2 pixel spacing, offset so views do not coincide.
fn lattice(offset: f64) -> Vec<InterestPoint> {
    let mut points = Vec::new();
    for x in 0..4 {
        for y in 0..4 {
            for z in 0..4 {
                let location = [x as f64 * 2.0 + offset, y as f64 * 2.0, z as f64 * 2.0];
                points.push(InterestPoint::new(points.len() as u64, location));
            }
        }
    }
    points
}

/// Three time points, one channel, two angles; view (2, 1) is missing.
fn document() -> DatasetDocument {
    let setup = |id: u32, angle: u32| ViewSetup {
        id,
        name: format!("setup {}", id),
        channel: 0,
        angle,
        illumination: 0,
        voxel_size: VoxelSize::new("um", [0.5, 0.5, 0.5]),
    };

    let sequence = SequenceDescription::new(
        vec![Entity::new(0, "1"), Entity::new(1, "2"), Entity::new(2, "3")],
        vec![Entity::new(0, "488")],
        vec![Entity::new(0, "0"), Entity::new(1, "90")],
        vec![Entity::new(0, "0")],
        vec![setup(0, 0), setup(1, 1)],
        vec![ViewId::new(2, 1)],
    );

    let mut interest_points = Vec::new();
    let mut registrations = Vec::new();
    for tp in 0..3 {
        for vs in 0..2 {
            let view = ViewId::new(tp, vs);
            if view == ViewId::new(2, 1) {
                continue;
            }
            let list = InterestPointList::new("beads", lattice(tp as f64 * 100.0));
            interest_points.push(ViewInterestPointsEntry { view, lists: vec![list] });
            registrations.push(ViewRegistrationEntry { view, transform_count: 1 + vs as usize });
        }
    }

    DatasetDocument { sequence, interest_points, registrations }
}

fn write_document(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("spimdf-{}-{}.json", name, std::process::id()));
    let text = serde_json::to_string_pretty(&document()).unwrap();
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_load_resolve_and_histogram() {
    let path = write_document("histogram");
    let dataset = SpimDataset::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let spec = SelectionSpec::RangePattern("1-2".to_string());
    let specs = SelectionSpecs::all().with(Dimension::TimePoint, spec);
    let selection = resolve(&dataset.sequence, &specs).unwrap();
    assert_eq!(selection.time_points, vec![0, 1]);
    assert_eq!(selection.len(), 4);

    let processes = choose_channel_processes(&dataset, &selection.views, None, 1).unwrap();
    assert_eq!(processes.len(), 1);
    assert_eq!(processes[0].label, "beads");

    let config = HistogramConfig { bin_count: 10, ..HistogramConfig::default() };
    let histograms =
        channel_histograms(&dataset, &selection.views, &processes, &config, Some(7)).unwrap();
    assert_eq!(histograms.len(), 1);

    let histogram = &histograms[0].histogram;
    assert_eq!(histograms[0].views, 4);
    assert_eq!(histogram.unit, "um");
    assert_eq!(histogram.sample_size(), 4 * 64);
    // lattice spacing 2 px at 0.5 um per px
    assert_abs_diff_eq!(histogram.min.unwrap(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(histogram.max.unwrap(), 1.0, epsilon = 1e-12);
    assert_eq!(histogram.counts[0], 4 * 64);
}

#[test]
fn test_subsampled_histogram_is_reproducible() {
    let dataset = SpimDataset::from_document(document()).unwrap();
    let selection = resolve(&dataset.sequence, &SelectionSpecs::all()).unwrap();
    assert_eq!(selection.len(), 5);
    assert_eq!(selection.diagnostics.dropped_missing_views, 1);

    let processes = choose_channel_processes(&dataset, &selection.views, Some("beads"), 4).unwrap();
    let config = HistogramConfig { scope: NeighborScope::Channel, ..HistogramConfig::default() };

    let a = channel_histograms(&dataset, &selection.views, &processes, &config, Some(3)).unwrap();
    let b = channel_histograms(&dataset, &selection.views, &processes, &config, Some(3)).unwrap();
    assert_eq!(a, b);
    assert!(a[0].histogram.sample_size() < 5 * 64);
}

#[test]
fn test_unresolved_names_are_reported() {
    let dataset = SpimDataset::from_document(document()).unwrap();
    let spec = SelectionSpec::RangePattern("90,45".to_string());
    let specs = SelectionSpecs::all().with(Dimension::Angle, spec);
    let selection = resolve(&dataset.sequence, &specs).unwrap();

    assert_eq!(selection.angles, vec![1]);
    assert!(selection.diagnostics.has_warnings());
    assert_eq!(
        selection.diagnostics.unresolved[0].to_string(),
        "angle 45 not part of the list of angles. Ignoring it."
    );
    // view (2, 1) is missing
    assert_eq!(selection.views, vec![ViewId::new(0, 1), ViewId::new(1, 1)]);
}

#[test]
fn test_selection_of_missing_views_only_fails() {
    let dataset = SpimDataset::from_document(document()).unwrap();
    let specs = SelectionSpecs::all()
        .with(Dimension::TimePoint, SelectionSpec::Single(2))
        .with(Dimension::ViewSetup, SelectionSpec::Single(1));
    let err = resolve(&dataset.sequence, &specs).unwrap_err();
    assert_eq!(err, SpimError::no_present_view());
}

#[test]
fn test_verify_and_registrations() {
    let dataset = SpimDataset::from_document(document()).unwrap();
    let selection = resolve(&dataset.sequence, &SelectionSpecs::all()).unwrap();

    let config = VerificationConfig::default();
    let report = verify_detections(&dataset, &selection.views, &selection.channels, &config)
        .unwrap();
    assert!(report.is_reasonable());
    assert_eq!(report.checked, 5);

    let strict = VerificationConfig { upper_threshold: 10 };
    let report =
        verify_detections(&dataset, &selection.views, &selection.channels, &strict).unwrap();
    assert_eq!(report.flagged.len(), 5);
    assert!(report.flagged.iter().all(|f| f.verdict == CountVerdict::TooMany && f.count == 64));

    assert_eq!(dataset.max_registration_count(&selection.views), 2);
    assert!(dataset.has_more_than_one_registration(&selection.views));
}
