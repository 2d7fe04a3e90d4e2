//! JSON layout of the per-actor lightmap metadata files.
//!
//! Field names and their order are what downstream decoders read, so the
//! structs below spell every name out instead of relying on a rename rule.

use super::LightmapBuildData;
use crate::guid::Guid;
use crate::math::pack_scale_bias;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorLightmapJson {
    #[serde(rename = "ActorName")]
    pub actor_name: String,
    #[serde(rename = "ActorGuid")]
    pub actor_guid: String,
    #[serde(rename = "Components")]
    pub components: Vec<ComponentLightmapJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentLightmapJson {
    #[serde(rename = "ComponentName")]
    pub component_name: String,
    /// The build-data id of LOD 0, not an id of the component itself
    #[serde(rename = "ComponentGuid")]
    pub component_guid: String,
    #[serde(rename = "LightmapSize")]
    pub lightmap_size: i32,
    #[serde(rename = "HQLightmapName")]
    pub hq_lightmap_name: String,
    #[serde(rename = "LQLightmapName")]
    pub lq_lightmap_name: String,
    /// `[scaleX, scaleY, biasX, biasY]`
    #[serde(rename = "CoordScaleBias", with = "float_array")]
    pub coord_scale_bias: [f64; 4],
    #[serde(rename = "HQLightmapScale0", with = "float_array")]
    pub hq_lightmap_scale0: [f32; 4],
    #[serde(rename = "HQLightmapScale1", with = "float_array")]
    pub hq_lightmap_scale1: [f32; 4],
    #[serde(rename = "HQLightmapAdd0", with = "float_array")]
    pub hq_lightmap_add0: [f32; 4],
    #[serde(rename = "HQLightmapAdd1", with = "float_array")]
    pub hq_lightmap_add1: [f32; 4],
    #[serde(rename = "LQLightmapScale0", with = "float_array")]
    pub lq_lightmap_scale0: [f32; 4],
    #[serde(rename = "LQLightmapScale1", with = "float_array")]
    pub lq_lightmap_scale1: [f32; 4],
    #[serde(rename = "LQLightmapAdd0", with = "float_array")]
    pub lq_lightmap_add0: [f32; 4],
    #[serde(rename = "LQLightmapAdd1", with = "float_array")]
    pub lq_lightmap_add1: [f32; 4],
}

impl ComponentLightmapJson {
    pub fn from_build_data(
        component_name: &str,
        build_data_id: &Guid,
        lightmap_size: i32,
        build_data: &LightmapBuildData,
    ) -> Self {
        let encoding = &build_data.encoding;
        let [hq_scale0, hq_scale1] = encoding.hq_scale();
        let [hq_add0, hq_add1] = encoding.hq_add();
        let [lq_scale0, lq_scale1] = encoding.lq_scale();
        let [lq_add0, lq_add1] = encoding.lq_add();
        Self {
            component_name: component_name.to_string(),
            component_guid: build_data_id.to_string(),
            lightmap_size,
            hq_lightmap_name: build_data.hq_texture.clone(),
            lq_lightmap_name: build_data.lq_texture.clone(),
            coord_scale_bias: pack_scale_bias(encoding.coordinate_scale, encoding.coordinate_bias),
            hq_lightmap_scale0: hq_scale0.to_array(),
            hq_lightmap_scale1: hq_scale1.to_array(),
            hq_lightmap_add0: hq_add0.to_array(),
            hq_lightmap_add1: hq_add1.to_array(),
            lq_lightmap_scale0: lq_scale0.to_array(),
            lq_lightmap_scale1: lq_scale1.to_array(),
            lq_lightmap_add0: lq_add0.to_array(),
            lq_lightmap_add1: lq_add1.to_array(),
        }
    }
}

/// Serialize an actor document the way it is written to disk.
pub fn to_json_bytes(document: &ActorLightmapJson) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(document)
}

/// Float arrays where NaN and infinities survive a trip through JSON.
///
/// Plain JSON has no literal for them, serde_json would write `null`.
/// They are written as the strings `"NaN"`, `"Inf"` and `"-Inf"` instead.
mod float_array {
    use serde::ser::SerializeTuple;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub(crate) trait JsonFloat: Copy {
        fn non_finite_name(self) -> Option<&'static str>;
        fn serialize_finite<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error>;
        fn from_f64(value: f64) -> Self;
    }

    impl JsonFloat for f32 {
        fn non_finite_name(self) -> Option<&'static str> {
            non_finite_name(self.is_nan(), self.is_infinite(), self.is_sign_negative())
        }

        fn serialize_finite<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_f32(self)
        }

        fn from_f64(value: f64) -> Self {
            value as f32
        }
    }

    impl JsonFloat for f64 {
        fn non_finite_name(self) -> Option<&'static str> {
            non_finite_name(self.is_nan(), self.is_infinite(), self.is_sign_negative())
        }

        fn serialize_finite<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_f64(self)
        }

        fn from_f64(value: f64) -> Self {
            value
        }
    }

    fn non_finite_name(nan: bool, infinite: bool, negative: bool) -> Option<&'static str> {
        match (nan, infinite, negative) {
            (true, _, _) => Some("NaN"),
            (false, true, false) => Some("Inf"),
            (false, true, true) => Some("-Inf"),
            _ => None,
        }
    }

    struct Element<F>(F);

    impl<F: JsonFloat> serde::Serialize for Element<F> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self.0.non_finite_name() {
                Some(name) => serializer.serialize_str(name),
                None => self.0.serialize_finite(serializer),
            }
        }
    }

    pub(crate) fn serialize<S, F, const N: usize>(
        values: &[F; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        F: JsonFloat,
    {
        let mut tuple = serializer.serialize_tuple(N)?;
        for value in values {
            tuple.serialize_element(&Element(*value))?;
        }
        tuple.end()
    }

    pub(crate) fn deserialize<'de, D, F, const N: usize>(
        deserializer: D,
    ) -> Result<[F; N], D::Error>
    where
        D: Deserializer<'de>,
        F: JsonFloat,
    {
        let values = Vec::<Value>::deserialize(deserializer)?;
        if values.len() != N {
            return Err(serde::de::Error::invalid_length(
                values.len(),
                &format!("an array of {N} numbers").as_str(),
            ));
        }
        let mut result = [F::from_f64(0.0); N];
        for (slot, value) in result.iter_mut().zip(values) {
            *slot = F::from_f64(element_from_value(value).map_err(serde::de::Error::custom)?);
        }
        Ok(result)
    }

    fn element_from_value(value: Value) -> Result<f64, String> {
        match value {
            Value::String(s) => match s.to_lowercase().as_str() {
                "nan" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(format!(r#"expected "NaN", "Inf" or "-Inf", found {other}"#)),
            },
            Value::Number(n) => n.as_f64().ok_or_else(|| "expected f64".to_string()),
            other => Err(format!(
                r#"expected number, "NaN", "Inf" or "-Inf", found {other}"#
            )),
        }
    }
}
