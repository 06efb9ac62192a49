//! Type validation, pipeline resolution and discovery through the public API

mod common;

use adpipeline::plugin::api::{
    PipelineNode, Plugin, PluginClass, PluginDiscovery, PluginError, PluginFamily, PluginOptions,
    TypeState, HDF5_PLUGIN, PROCESS_PLUGIN, STATS_PLUGIN,
};
use adpipeline::point::api::MemoryServer;
use common::*;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn names(chain: &[Arc<dyn PipelineNode>]) -> Vec<String> {
    chain.iter().map(|node| node.name().to_string()).collect()
}

#[tokio::test]
async fn versioned_report_confirms_declared_type() {
    let fx = Fixture::new();
    let stats = fx.attach("stats1", "Stats1:", &STATS_PLUGIN, "STATS1", CAM_PORT);

    assert_eq!(
        stats.check_type().await.unwrap(),
        TypeState::ConfirmedOk {
            reported: "NDPluginStats 1.9.1".to_string()
        }
    );
}

#[tokio::test]
async fn foreign_report_confirms_bad_and_blocks_activation() {
    let fx = Fixture::new();
    seed_plugin(&fx.server, "XF:DET:Stats1:", &STATS_PLUGIN, "STATS1", CAM_PORT);
    fx.server.seed("XF:DET:Stats1:PluginType_RBV", "NDPluginROI 1.9.1");
    let stats = fx.detector.add_plugin("stats1", "Stats1:", &STATS_PLUGIN);

    // A report that does not start with the declared type is a mismatch
    let state = stats.check_type().await.unwrap();
    assert!(state.is_misconfigured().unwrap_or(false), "{state}");

    match stats.activate().await {
        Err(PluginError::ConfigurationMismatch {
            prefix,
            expected,
            reported,
            ..
        }) => {
            assert_eq!(prefix, "XF:DET:Stats1:");
            assert_eq!(expected, "NDPluginStats");
            assert_eq!(reported, "NDPluginROI 1.9.1");
        }
        other => panic!("expected a mismatch, got {other:?}"),
    }
    assert!(fx.server.writes_under("XF:DET:Stats1:").is_empty());
}

#[tokio::test]
async fn untyped_class_never_waits_on_type() {
    static UNTYPED: PluginClass = PluginClass {
        name: "GenericPlugin",
        plugin_type: None,
        suffix_pattern: None,
        default_suffix: "",
        html_docs: &[],
        family: PluginFamily::Processing,
        config_attrs: &[],
    };
    let server = MemoryServer::new();
    server.seed_with_readback("XF:DET:Any1:EnableCallbacks", 0);
    server.seed_with_readback("XF:DET:Any1:BlockingCallbacks", "No");
    let mut options = PluginOptions::named("any1");
    options.settings = fast_settings();
    options.settings.connection_secs = 5.0;
    let plugin = Plugin::new(&UNTYPED, "XF:DET:Any1:", Arc::new(server.clone()), options);

    assert_eq!(plugin.type_state(), TypeState::NoExpectation);
    let started = Instant::now();
    plugin.activate().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn chain_lists_root_then_ancestors() {
    let fx = Fixture::new();
    let proc1 = fx.attach("proc1", "Proc1:", &PROCESS_PLUGIN, "PROC1", CAM_PORT);
    let stats = fx.attach("stats1", "Stats1:", &STATS_PLUGIN, "STATS1", "PROC1");

    assert_eq!(names(&proc1.pipeline().await.unwrap()), vec!["det_cam", "det_proc1"]);

    let first = names(&stats.pipeline().await.unwrap());
    assert_eq!(first, vec!["det_cam", "det_proc1", "det_stats1"]);
    assert_eq!(names(&stats.pipeline().await.unwrap()), first);
}

#[tokio::test]
async fn merged_configuration_orders_upstream_first() {
    let fx = Fixture::new();
    fx.attach("proc1", "Proc1:", &PROCESS_PLUGIN, "PROC1", CAM_PORT);
    let stats = fx.attach("stats1", "Stats1:", &STATS_PLUGIN, "STATS1", "PROC1");

    let merged = stats.merged_configuration().await.unwrap();
    let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
    let last_proc = keys.iter().rposition(|k| k.starts_with("det_proc1_")).unwrap();
    let first_stats = keys.iter().position(|k| k.starts_with("det_stats1_")).unwrap();
    assert!(last_proc < first_stats);
    assert_eq!(merged["det_stats1_port_name"]["value"], json!("STATS1"));
}

#[tokio::test]
async fn merged_configuration_downstream_wins() {
    let fx = Fixture::new();
    // Device name shared with the camera, so every common field collides
    let shadow = fx.attach("cam", "Proc1:", &PROCESS_PLUGIN, "PROC1", CAM_PORT);

    let merged = shadow.merged_configuration().await.unwrap();
    assert_eq!(merged["det_cam_port_name"]["value"], json!("PROC1"));
}

#[tokio::test]
async fn pattern_then_query_discovery() {
    let server = MemoryServer::new();
    server.seed("XF:DET:Writer:PluginType_RBV", "NDFileHDF5 2.3");
    let discovery = PluginDiscovery::new(Arc::new(server.clone())).with_settings(fast_settings());

    let stats = discovery.plugin_class_for("XF:DET:Stats7:").unwrap();
    assert_eq!(stats.name, STATS_PLUGIN.name);
    assert!(discovery.plugin_class_for("XF:DET:Writer:").is_none());

    let queried = discovery
        .plugin_class_for_or_query("XF:DET:Writer:", None)
        .await
        .unwrap();
    assert_eq!(queried.name, HDF5_PLUGIN.name);

    assert!(matches!(
        discovery
            .plugin_class_for_or_query("XF:DET:Nothing:", Some(Duration::from_millis(30)))
            .await,
        Err(PluginError::Timeout { .. })
    ));
}
