//! Level options.

use std::collections::HashMap;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

/// Behaviour switches for the visibility walk and geometry submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspOptions {
    /// Also test each PVS-visible leaf's bounds against the camera.
    pub cull_leaves_by_frustum: bool,
    /// Leave sky face groups out of submitted geometry.
    pub skip_sky: bool,
    /// Record the bounds of every processed leaf in the frame batch (debug view).
    pub collect_leaf_bounds: bool,
}

impl Default for BspOptions {
    fn default() -> Self {
        Self {
            cull_leaves_by_frustum: false,
            skip_sky: true,
            collect_leaf_bounds: false,
        }
    }
}

impl BspOptions {
    /// Reads options from name/value creation parameters.
    ///
    /// Recognised keys are `CullLeavesByFrustum`, `SkipSky` and
    /// `ShowNodeBoxes`. Unknown keys are ignored; values that fail to parse
    /// keep the default and log a warning.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut options = Self::default();
        read_param(params, "CullLeavesByFrustum", &mut options.cull_leaves_by_frustum);
        read_param(params, "SkipSky", &mut options.skip_sky);
        read_param(params, "ShowNodeBoxes", &mut options.collect_leaf_bounds);
        options
    }
}

fn read_param<T: FromStr>(params: &HashMap<String, String>, key: &str, target: &mut T) {
    let Some(raw) = params.get(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!("ignoring level parameter {key}={raw:?}: not a valid value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let options = BspOptions::default();
        assert!(!options.cull_leaves_by_frustum);
        assert!(options.skip_sky);
        assert!(!options.collect_leaf_bounds);
    }

    #[test]
    fn from_params_overrides_known_keys() {
        let options = BspOptions::from_params(&params(&[
            ("CullLeavesByFrustum", "true"),
            ("SkipSky", "false"),
            ("Scale", "2.0"),
        ]));
        assert!(options.cull_leaves_by_frustum);
        assert!(!options.skip_sky);
        assert!(!options.collect_leaf_bounds);
    }

    #[test]
    fn from_params_keeps_default_on_bad_value() {
        let options = BspOptions::from_params(&params(&[("SkipSky", "sometimes")]));
        assert!(options.skip_sky);
    }

    #[test]
    fn deserialize_fills_missing_fields() {
        let options: BspOptions =
            serde_json::from_str(r#"{ "collect_leaf_bounds": true }"#).unwrap();
        assert!(options.collect_leaf_bounds);
        assert!(options.skip_sky);
    }
}
