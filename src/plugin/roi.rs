//! Region-of-interest setter
//!
//! Writes the minimum and size of each requested axis as one logical
//! operation. The writes are not atomic: a reported failure can leave some
//! axes already changed on the server.

use crate::plugin::base::Plugin;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::PluginFamily;
use crate::point::api::PointValue;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn point_suffix(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSpan {
    pub min: i64,
    pub size: i64,
}

/// Requested spans keyed by axis; writes are issued in x, y, z order
pub type Region = BTreeMap<Axis, AxisSpan>;

/// Build a region from `(axis label, (min, size))` pairs
pub fn parse_region<'a>(
    pairs: impl IntoIterator<Item = (&'a str, (i64, i64))>,
) -> PluginResult<Region> {
    let mut region = Region::new();
    for (label, (min, size)) in pairs {
        let axis = Axis::from_str(label).map_err(|_| PluginError::InvalidRegion {
            reason: format!("unknown axis {label:?}; expected x, y or z"),
        })?;
        if region.insert(axis, AxisSpan { min, size }).is_some() {
            return Err(PluginError::InvalidRegion {
                reason: format!("axis {axis} given more than once"),
            });
        }
    }
    Ok(region)
}

/// One write issued by `set_region`
#[derive(Debug)]
pub struct PointWrite {
    pub point: String,
    pub value: i64,
    pub result: PluginResult<()>,
}

/// Combined outcome of a region write
#[derive(Debug, Default)]
pub struct RegionStatus {
    /// Every write in issue order
    pub writes: Vec<PointWrite>,
}

impl RegionStatus {
    /// True only if every write succeeded
    pub fn success(&self) -> bool {
        self.writes.iter().all(|write| write.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PointWrite> {
        self.writes.iter().filter(|write| write.result.is_err())
    }
}

impl Plugin {
    /// Write min and size for each axis in `region`, all concurrently, and
    /// wait for every write to finish.
    ///
    /// Per-point failures are reported in the returned status, not as an
    /// error. Errors are only returned for an empty region or a plugin that
    /// is not a region-of-interest plugin.
    pub async fn set_region(&self, region: &Region) -> PluginResult<RegionStatus> {
        if self.class().family != PluginFamily::RegionOfInterest {
            return Err(PluginError::Unsupported {
                class: self.class().name.to_string(),
                operation: "set_region".to_string(),
            });
        }
        if region.is_empty() {
            return Err(PluginError::InvalidRegion {
                reason: "no axes given".to_string(),
            });
        }

        let targets: Vec<(String, i64)> = region
            .iter()
            .flat_map(|(axis, span)| {
                [
                    (format!("Min{}", axis.point_suffix()), span.min),
                    (format!("Size{}", axis.point_suffix()), span.size),
                ]
            })
            .collect();

        let provider = self.provider()?;
        let writes = targets.into_iter().map(|(suffix, value)| async move {
            let point = provider.point(&format!("{}{}", self.prefix(), suffix));
            let result = point
                .put(PointValue::Int(value), true)
                .await
                .map_err(PluginError::from);
            PointWrite {
                point: point.name().to_string(),
                value,
                result,
            }
        });
        let status = RegionStatus {
            writes: join_all(writes).await,
        };

        if !status.success() {
            log::warn!(
                "Region write on {} partially failed: {}",
                self.prefix(),
                status
                    .failures()
                    .map(|w| w.point.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(status)
    }

    /// Current `(min, size)` readbacks for the given axes
    pub async fn read_region(&self, axes: &[Axis]) -> PluginResult<Region> {
        let mut region = Region::new();
        for &axis in axes {
            let min = self.read_int(&format!("Min{}_RBV", axis.point_suffix())).await?;
            let size = self.read_int(&format!("Size{}_RBV", axis.point_suffix())).await?;
            region.insert(axis, AxisSpan { min, size });
        }
        Ok(region)
    }
}
