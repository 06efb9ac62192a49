//! File-writer warmup and write mode

use super::utils::*;
use crate::plugin::builtin::{HDF5_PLUGIN, STATS_PLUGIN, TIFF_PLUGIN};
use crate::plugin::error::PluginError;
use crate::plugin::file::FileWriteMode;
use crate::plugin::types::PluginOptions;
use crate::plugin::base::Plugin;
use crate::point::api::{MemoryServer, PointValue};
use std::sync::Arc;

const HDF_PREFIX: &str = "XF:DET:HDF1:";

fn seed_acquisition(server: &MemoryServer) {
    server.seed_with_readback(&format!("{CAM_PREFIX}ImageMode"), "Continuous");
    server.seed_with_readback(&format!("{CAM_PREFIX}TriggerMode"), "External");
    server.seed_with_readback(&format!("{CAM_PREFIX}AcquireTime"), 0.25);
    server.seed_with_readback(&format!("{CAM_PREFIX}AcquirePeriod"), 0.5);
    server.seed(&format!("{CAM_PREFIX}Acquire"), 0);
}

#[tokio::test]
async fn test_warmup_acquires_and_restores_camera() {
    let (server, det) = detector();
    let hdf = attach(&server, &det, "hdf1", "HDF1:", &HDF5_PLUGIN, "HDF1", CAM_PORT);
    seed_acquisition(&server);
    server.clear_journal();

    hdf.warmup().await.unwrap();

    let journal = server.journal();
    assert_eq!(
        journal[0],
        (format!("{HDF_PREFIX}EnableCallbacks"), PointValue::Int(1))
    );
    assert!(journal.contains(&(format!("{CAM_PREFIX}Acquire"), PointValue::Int(1))));
    assert!(journal.contains(&(format!("{CAM_PREFIX}ImageMode"), PointValue::from("Single"))));

    assert_eq!(
        server.value(&format!("{CAM_PREFIX}ImageMode_RBV")),
        Some(PointValue::from("Continuous"))
    );
    assert_eq!(
        server.value(&format!("{CAM_PREFIX}TriggerMode_RBV")),
        Some(PointValue::from("External"))
    );
    assert_eq!(
        server.value(&format!("{CAM_PREFIX}AcquirePeriod_RBV")),
        Some(PointValue::Float(0.5))
    );
    assert_eq!(
        server.value(&format!("{CAM_PREFIX}Acquire")),
        Some(PointValue::Int(0))
    );
    // The writer itself stays enabled
    assert_eq!(
        server.value(&format!("{HDF_PREFIX}EnableCallbacks_RBV")),
        Some(PointValue::Int(1))
    );
}

#[tokio::test]
async fn test_warmup_restores_in_reverse_order() {
    let (server, det) = detector();
    let hdf = attach(&server, &det, "hdf1", "HDF1:", &HDF5_PLUGIN, "HDF1", CAM_PORT);
    seed_acquisition(&server);

    hdf.warmup().await.unwrap();

    let writes = server.journal();
    let restores: Vec<String> = writes[writes.len() - 6..]
        .iter()
        .map(|(name, _)| name.trim_start_matches(CAM_PREFIX).to_string())
        .collect();
    assert_eq!(
        restores,
        vec![
            "Acquire",
            "AcquirePeriod",
            "AcquireTime",
            "TriggerMode",
            "ImageMode",
            "ArrayCallbacks"
        ]
    );
}

#[tokio::test]
async fn test_warmup_requires_attached_file_plugin() {
    let (server, det) = detector();
    let stats = attach(&server, &det, "stats1", "Stats1:", &STATS_PLUGIN, "STATS1", CAM_PORT);
    assert!(matches!(
        stats.warmup().await,
        Err(PluginError::Unsupported { .. })
    ));

    let loose = Plugin::new(
        &TIFF_PLUGIN,
        "XF:DET:TIFF1:",
        Arc::new(server.clone()),
        PluginOptions::default(),
    );
    assert!(matches!(
        loose.warmup().await,
        Err(PluginError::Detached { .. })
    ));
}

#[tokio::test]
async fn test_file_write_mode() {
    let (server, det) = detector();
    let hdf = attach(&server, &det, "hdf1", "HDF1:", &HDF5_PLUGIN, "HDF1", CAM_PORT);
    server.seed_with_readback(&format!("{HDF_PREFIX}FileWriteMode"), 0);

    assert_eq!(hdf.file_write_mode().await.unwrap(), FileWriteMode::Single);
    hdf.set_file_write_mode(FileWriteMode::Stream).await.unwrap();
    assert_eq!(hdf.file_write_mode().await.unwrap(), FileWriteMode::Stream);

    server.seed(&format!("{HDF_PREFIX}FileWriteMode_RBV"), 9);
    assert!(matches!(
        hdf.file_write_mode().await,
        Err(PluginError::Communication { .. })
    ));
}
