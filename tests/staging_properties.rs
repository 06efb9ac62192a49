//! Staging order and region writes through the public API

mod common;

use adpipeline::plugin::api::{
    parse_region, stage_all, unstage_all, Axis, AxisSpan, PROCESS_PLUGIN, ROI_PLUGIN, STATS_PLUGIN,
};
use adpipeline::point::api::PointValue;
use common::*;

#[tokio::test]
async fn enable_is_staged_first_and_restored_last() {
    let fx = Fixture::new();
    let stats = fx.attach("stats1", "Stats1:", &STATS_PLUGIN, "STATS1", CAM_PORT);
    fx.server.seed_with_readback("XF:DET:Stats1:ComputeCentroid", "No");

    // Enable re-inserted after the other directives still goes first
    stats.remove_stage_directive("XF:DET:Stats1:EnableCallbacks");
    stats.set_stage_directive(stats.signal("ComputeCentroid"), "Yes");
    stats.enable_on_stage();

    fx.server.clear_journal();
    stats.activate().await.unwrap();
    let staged: Vec<String> = fx.server.journal().into_iter().map(|(name, _)| name).collect();
    assert_eq!(staged.first().map(String::as_str), Some("XF:DET:Stats1:EnableCallbacks"));

    fx.server.clear_journal();
    let report = stats.deactivate().await;
    assert!(report.is_clean());
    assert_eq!(
        report.restored.last().map(String::as_str),
        Some("XF:DET:Stats1:EnableCallbacks")
    );
    assert_eq!(
        fx.server.value("XF:DET:Stats1:EnableCallbacks_RBV"),
        Some(PointValue::Int(0))
    );
    assert_eq!(
        fx.server.value("XF:DET:Stats1:ComputeCentroid_RBV"),
        Some(PointValue::from("No"))
    );
}

#[tokio::test]
async fn detector_restores_every_plugin() {
    let fx = Fixture::new();
    fx.attach("proc1", "Proc1:", &PROCESS_PLUGIN, "PROC1", CAM_PORT);
    fx.attach("stats1", "Stats1:", &STATS_PLUGIN, "STATS1", "PROC1");

    stage_all(&fx.detector.plugins()).await.unwrap();
    for plugin in fx.detector.plugins() {
        assert!(plugin.is_staged().await, "{}", plugin.name());
    }
    assert_eq!(
        fx.server.value("XF:DET:cam1:ArrayCallbacks_RBV"),
        Some(PointValue::Int(1))
    );

    let reports = unstage_all(&fx.detector.plugins()).await;
    assert!(reports.iter().all(|report| report.is_clean()));
    assert_eq!(
        fx.server.value("XF:DET:cam1:ArrayCallbacks_RBV"),
        Some(PointValue::Int(0))
    );
    assert_eq!(
        fx.server.value("XF:DET:Proc1:EnableCallbacks_RBV"),
        Some(PointValue::Int(0))
    );
}

fn seed_roi(fx: &Fixture) {
    for axis in ["X", "Y", "Z"] {
        fx.server.seed_with_readback(&format!("XF:DET:ROI1:Min{axis}"), 0);
        fx.server.seed_with_readback(&format!("XF:DET:ROI1:Size{axis}"), 0);
    }
}

#[tokio::test]
async fn region_issues_min_and_size_writes() {
    let fx = Fixture::new();
    seed_roi(&fx);
    let roi = fx.attach("roi1", "ROI1:", &ROI_PLUGIN, "ROI1", CAM_PORT);
    fx.server.clear_journal();

    let status = roi
        .set_region(&parse_region([("x", (10, 100))]).unwrap())
        .await
        .unwrap();
    assert!(status.success());
    assert_eq!(
        fx.server.journal(),
        vec![
            ("XF:DET:ROI1:MinX".to_string(), PointValue::Int(10)),
            ("XF:DET:ROI1:SizeX".to_string(), PointValue::Int(100)),
        ]
    );

    let region = roi.read_region(&[Axis::X]).await.unwrap();
    assert_eq!(region[&Axis::X], AxisSpan { min: 10, size: 100 });
}

#[tokio::test]
async fn region_partial_failure_keeps_earlier_writes() {
    let fx = Fixture::new();
    seed_roi(&fx);
    let roi = fx.attach("roi1", "ROI1:", &ROI_PLUGIN, "ROI1", CAM_PORT);
    fx.server.reject_writes("XF:DET:ROI1:SizeX", "drive limit");

    let status = roi
        .set_region(&parse_region([("x", (10, 100))]).unwrap())
        .await
        .unwrap();
    assert!(!status.success());
    let failed: Vec<&str> = status.failures().map(|write| write.point.as_str()).collect();
    assert_eq!(failed, vec!["XF:DET:ROI1:SizeX"]);
    assert_eq!(
        fx.server.value("XF:DET:ROI1:MinX_RBV"),
        Some(PointValue::Int(10))
    );
}
