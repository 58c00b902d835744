//! End-to-end tests: load a dataset from disk, audit it, cut it down and
//! write reports.

use std::path::PathBuf;
use std::sync::Arc;

use duty_audit::audit::{audit, run_audit};
use duty_audit::breaks::{BreakKind, IndeterminateReason, infer_breaks};
use duty_audit::config::AuditConfig;
use duty_audit::document::{load_dataset, load_document, write_document};
use duty_audit::domain::{Dataset, DutyId};
use duty_audit::fixture::subset_document;
use duty_audit::index::ReferenceIndex;
use duty_audit::report::{BreakPolicy, OutputFormat, Report, ReportKind};
use duty_audit::validate::{Rule, validate};

fn fixture() -> PathBuf {
    fixture_named("mini_schedule.json")
}

fn fixture_named(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Every fixture; all of them are clean.
fn fixtures() -> [PathBuf; 2] {
    [fixture(), fixture_named("reordered_schedule.json")]
}

async fn mini() -> Dataset {
    load_dataset(fixture()).await.unwrap()
}

#[tokio::test]
async fn fixture_audits_clean() {
    let dataset = Arc::new(mini().await);
    let report = run_audit(dataset.clone(), &AuditConfig::default())
        .await
        .unwrap();

    assert!(report.is_clean(), "{:?}", report.violations);
    assert_eq!(report, audit(&dataset).unwrap());

    let splits: Vec<_> = report
        .breaks
        .iter()
        .filter(|b| b.kind == BreakKind::Split)
        .collect();
    assert_eq!(splits.len(), 1);
    assert_eq!(splits[0].duty_id.as_str(), "D1");
    assert!(
        !report
            .breaks
            .iter()
            .any(|b| b.kind == BreakKind::Indeterminate)
    );
}

#[tokio::test]
async fn audit_is_deterministic() {
    let dataset = Arc::new(mini().await);
    let first = run_audit(dataset.clone(), &AuditConfig::new(true, 1))
        .await
        .unwrap();
    let second = run_audit(dataset, &AuditConfig::sequential()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn breaks_stay_within_their_duty() {
    for path in fixtures() {
        let dataset = load_dataset(&path).await.unwrap();
        let index = ReferenceIndex::build(&dataset).unwrap();
        for inferred in infer_breaks(&dataset, &index) {
            let duty = dataset.duty(&inferred.duty_id).unwrap();
            let events = duty.events();
            assert_eq!(
                events[inferred.from.position].vehicle_key(),
                Some(&inferred.from.event)
            );
            assert_eq!(
                events[inferred.to.position].vehicle_key(),
                Some(&inferred.to.event)
            );

            match inferred.kind {
                BreakKind::Layover => {
                    assert_eq!(inferred.from.event.vehicle_id, inferred.to.event.vehicle_id);
                    assert_eq!(
                        inferred.to.event.sequence,
                        inferred.from.event.sequence.next()
                    );
                    assert!(inferred.gap.as_ref().unwrap().minutes > 0);
                }
                BreakKind::Split => {
                    assert!(inferred.from.position < inferred.to.position);
                    assert!(inferred.gap.as_ref().unwrap().minutes >= 0);
                }
                BreakKind::Indeterminate => panic!("{} is clean", path.display()),
            }
        }
    }
}

#[tokio::test]
async fn reordered_claims_keep_timeline_order() {
    let dataset = load_dataset(fixture_named("reordered_schedule.json"))
        .await
        .unwrap();
    let report = audit(&dataset).unwrap();
    assert!(report.is_clean(), "{:?}", report.violations);

    let summary: Vec<(BreakKind, String, usize, String, usize, i64)> = report
        .breaks
        .iter()
        .map(|b| {
            (
                b.kind,
                b.from.event.to_string(),
                b.from.position,
                b.to.event.to_string(),
                b.to.position,
                b.gap.as_ref().unwrap().minutes,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (BreakKind::Layover, "W1#2".into(), 1, "W1#3".into(), 3, 30),
            (BreakKind::Layover, "W1#1".into(), 2, "W1#2".into(), 1, 30),
            (BreakKind::Split, "W1#3".into(), 3, "W2#1".into(), 4, 30),
        ]
    );
}

#[tokio::test]
async fn gap_in_claims_is_both_violation_and_indeterminate() {
    let mut document = load_document(fixture()).await.unwrap();
    // D1 keeps V1#1 and V1#3 but drops V1#2
    let d1 = &mut document.duties.as_mut().unwrap()[0];
    d1.duty_events.as_mut().unwrap().retain(|e| {
        !(e.vehicle_id.as_deref() == Some("V1")
            && e.vehicle_event_sequence.as_ref().and_then(|s| s.as_u32()) == Some(2))
    });

    let dataset = Dataset::from_document(&document).unwrap();
    let report = audit(&dataset).unwrap();

    let contiguity: Vec<_> = report
        .violations
        .iter()
        .filter(|v| v.rule == Rule::SequenceContiguity)
        .collect();
    assert_eq!(contiguity.len(), 1);
    assert_eq!(
        contiguity[0].detail,
        "duty D1 claims vehicle V1 sequences [1, 3, 4, 5]: missing 2"
    );

    let d1_breaks: Vec<_> = report
        .breaks
        .iter()
        .filter(|b| b.duty_id.as_str() == "D1")
        .collect();
    assert_eq!(d1_breaks.len(), 1);
    assert_eq!(d1_breaks[0].kind, BreakKind::Indeterminate);
    assert_eq!(
        d1_breaks[0].reason,
        Some(IndeterminateReason::NonContiguousClaims)
    );
    assert_eq!(d1_breaks[0].from.event.to_string(), "V1#1");
    assert_eq!(d1_breaks[0].to.event.to_string(), "V1#5");
}

#[tokio::test]
async fn every_duty_subset_reloads_clean() {
    let dir = tempfile::tempdir().unwrap();

    for fixture in fixtures() {
        let document = load_document(&fixture).await.unwrap();
        let dataset = Dataset::from_document(&document).unwrap();
        let full = audit(&dataset).unwrap();

        for duty in &dataset.duties {
            let subset =
                subset_document(&document, std::slice::from_ref(&duty.duty_id)).unwrap();
            let path = dir.path().join(format!("{}.json", duty.duty_id));
            write_document(&path, &subset).await.unwrap();

            let reduced = load_dataset(&path).await.unwrap();
            let report = audit(&reduced).unwrap();
            assert!(
                report.is_clean(),
                "subset {}: {:?}",
                duty.duty_id,
                report.violations
            );

            let expected: Vec<_> = full
                .breaks
                .iter()
                .filter(|b| b.duty_id == duty.duty_id)
                .cloned()
                .collect();
            assert_eq!(report.breaks, expected, "subset {}", duty.duty_id);
        }
    }
}

#[tokio::test]
async fn subset_adds_no_violations_to_a_broken_dataset() {
    let mut document = load_document(fixture()).await.unwrap();
    // V3#1 is a pre_trip event; a trip id on it is a correspondence error only
    let v3 = &mut document.vehicles.as_mut().unwrap()[2];
    v3.vehicle_events.as_mut().unwrap()[0].trip_id = Some("T1".into());

    let dataset = Dataset::from_document(&document).unwrap();
    let index = ReferenceIndex::build(&dataset).unwrap();
    let full = validate(&dataset, &index);
    let details: Vec<&str> = full.iter().map(|v| v.detail.as_str()).collect();
    assert_eq!(details, vec!["pre_trip event V3#1 carries trip_id T1"]);

    let subset = subset_document(&document, &[DutyId::new("D3")]).unwrap();
    let reduced = Dataset::from_document(&subset).unwrap();
    let reduced_index = ReferenceIndex::build(&reduced).unwrap();
    assert_eq!(validate(&reduced, &reduced_index), full);
}

#[tokio::test]
async fn subset_keeps_violations_of_kept_duties() {
    let mut document = load_document(fixture()).await.unwrap();
    // D2 now also claims V1#1, which D1 already works
    let duties = document.duties.as_mut().unwrap();
    let d1_first = duties[0]
        .duty_events
        .as_ref()
        .unwrap()
        .iter()
        .find(|e| e.vehicle_id.is_some())
        .cloned()
        .unwrap();
    duties[1].duty_events.as_mut().unwrap().push(d1_first);

    let dataset = Dataset::from_document(&document).unwrap();
    let index = ReferenceIndex::build(&dataset).unwrap();
    let full = validate(&dataset, &index);
    assert!(!full.is_empty());

    let subset = subset_document(&document, &[DutyId::new("D1"), DutyId::new("D2")]).unwrap();
    let reduced = Dataset::from_document(&subset).unwrap();
    let reduced_index = ReferenceIndex::build(&reduced).unwrap();
    assert_eq!(validate(&reduced, &reduced_index), full);
}

#[tokio::test]
async fn reports_written_to_disk() {
    let dataset = mini().await;
    let index = ReferenceIndex::build(&dataset).unwrap();
    let inferred = infer_breaks(&dataset, &index);
    let policy = BreakPolicy::default();
    let dir = tempfile::tempdir().unwrap();

    for kind in ReportKind::ALL {
        let report = Report::build(kind, &dataset, &index, &inferred, &policy);
        for format in [OutputFormat::Csv, OutputFormat::Txt] {
            let path = report
                .save(dir.path().join(kind.as_str()), format)
                .await
                .unwrap();
            assert_eq!(path.extension().unwrap(), format.extension());

            let written = tokio::fs::read_to_string(&path).await.unwrap();
            let lines: Vec<_> = written.lines().collect();
            assert_eq!(lines.len(), report.len() + 1, "{kind} as {format}");
            assert!(lines[0].starts_with("Duty Id"));
        }

        let path = report
            .save(dir.path().join(kind.as_str()), OutputFormat::Xlsx)
            .await
            .unwrap();
        assert!(tokio::fs::metadata(&path).await.unwrap().len() > 0);
    }
}

#[tokio::test]
async fn break_threshold_filters_report() {
    let dataset = mini().await;
    let index = ReferenceIndex::build(&dataset).unwrap();
    let inferred = infer_breaks(&dataset, &index);

    let every = BreakPolicy::new(0, vec![], vec![]);
    let strict = BreakPolicy::new(21, vec![], vec![]);
    let all = Report::build(ReportKind::DutyBreaks, &dataset, &index, &inferred, &every);
    let long = Report::build(ReportKind::DutyBreaks, &dataset, &index, &inferred, &strict);

    assert!(all.len() > long.len());
    let Report::DutyBreaks(rows) = long else {
        panic!("expected a breaks report");
    };
    assert!(rows.iter().all(|r| r.break_minutes >= 21));
}
