//! CRD document parser
//!
//! Turns decoded YAML/JSON documents into the format-independent [`Crd`]
//! model. `apiextensions.k8s.io/v1` documents are decoded through the
//! typed k8s-openapi definitions; `v1beta1` documents are read field by
//! field and their schemas converted into the v1 schema type, which has
//! the same shape.

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinition, JSONSchemaProps,
};
use serde_json::Value;

use super::model::{Crd, CrdApiVersion, CrdScope, CrdVersion};
use crate::error::{CoreError, Result};

const CRD_KIND: &str = "CustomResourceDefinition";

/// Parser for CRD documents
pub struct CrdParser;

impl CrdParser {
    /// Parse a single YAML document
    ///
    /// Returns `Ok(None)` if the document is empty or not a CRD.
    pub fn parse(yaml: &str) -> Result<Option<Crd>> {
        let value: Value = serde_yaml::from_str(yaml).map_err(|e| CoreError::YamlParse {
            path: "<inline>".into(),
            document: 1,
            source: e,
        })?;

        Self::parse_value(&value)
    }

    /// Parse from a decoded document
    ///
    /// Returns `Ok(None)` if the document is empty or not a CRD.
    pub fn parse_value(value: &Value) -> Result<Option<Crd>> {
        if value.is_null() {
            return Ok(None);
        }

        let kind = value.get("kind").and_then(Value::as_str);
        if kind != Some(CRD_KIND) {
            return Ok(None);
        }

        let api_version = value
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or_default();

        match CrdApiVersion::parse(api_version) {
            Some(CrdApiVersion::V1) => Self::parse_v1(value).map(Some),
            Some(CrdApiVersion::V1beta1) => Self::parse_v1beta1(value).map(Some),
            None => Err(CoreError::UnsupportedApiVersion(api_version.to_string())),
        }
    }

    fn parse_v1(value: &Value) -> Result<Crd> {
        let api_version = CrdApiVersion::V1;

        let crd: CustomResourceDefinition = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::invalid_crd(api_version.as_str(), e))?;

        let scope = CrdScope::parse(&crd.spec.scope).ok_or_else(|| {
            CoreError::invalid_crd(
                api_version.as_str(),
                format!("unknown scope {:?}", crd.spec.scope),
            )
        })?;

        let versions = crd
            .spec
            .versions
            .into_iter()
            .map(|v| {
                let schema = v.schema.and_then(|s| s.open_api_v3_schema);
                CrdVersion::new(v.name, schema)
            })
            .collect();

        Ok(Crd {
            name: crd.metadata.name.unwrap_or_default(),
            group: crd.spec.group,
            kind: crd.spec.names.kind,
            scope,
            api_version,
            versions,
        })
    }

    fn parse_v1beta1(value: &Value) -> Result<Crd> {
        let api_version = CrdApiVersion::V1beta1;
        let invalid = |message: &str| CoreError::invalid_crd(api_version.as_str(), message);

        let name = value
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let spec = value
            .get("spec")
            .ok_or_else(|| invalid("missing 'spec' field"))?;

        let group = spec
            .get("group")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing 'spec.group' field"))?
            .to_string();

        let kind = spec
            .get("names")
            .and_then(|n| n.get("kind"))
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing 'spec.names.kind' field"))?
            .to_string();

        // v1beta1 defaults the scope, v1 requires it
        let scope = match spec.get("scope").and_then(Value::as_str) {
            Some(s) => CrdScope::parse(s)
                .ok_or_else(|| CoreError::invalid_crd(api_version.as_str(), format!("unknown scope {s:?}")))?,
            None => CrdScope::Namespaced,
        };

        // CRD-wide schema, used by versions that do not declare their own
        let shared_schema = spec
            .get("validation")
            .and_then(|v| v.get("openAPIV3Schema"))
            .map(Self::convert_schema)
            .transpose()?;

        let versions = match spec.get("versions").and_then(Value::as_array) {
            Some(versions) => versions
                .iter()
                .map(|v| Self::parse_v1beta1_version(v, shared_schema.as_ref()))
                .collect::<Result<Vec<_>>>()?,
            None => {
                let version = spec
                    .get("version")
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("neither 'spec.versions' nor 'spec.version' is set"))?;
                vec![CrdVersion::new(version, shared_schema)]
            }
        };

        Ok(Crd {
            name,
            group,
            kind,
            scope,
            api_version,
            versions,
        })
    }

    fn parse_v1beta1_version(version: &Value, shared: Option<&JSONSchemaProps>) -> Result<CrdVersion> {
        let name = version.get("name").and_then(Value::as_str).ok_or_else(|| {
            CoreError::invalid_crd(CrdApiVersion::V1BETA1_STR, "version missing 'name' field")
        })?;

        let schema = match version
            .get("schema")
            .and_then(|s| s.get("openAPIV3Schema"))
        {
            Some(schema) => Some(Self::convert_schema(schema)?),
            None => shared.cloned(),
        };

        Ok(CrdVersion::new(name, schema))
    }

    /// Convert a v1beta1 schema into the v1 schema type; both share one JSON shape.
    fn convert_schema(schema: &Value) -> Result<JSONSchemaProps> {
        serde_json::from_value(schema.clone())
            .map_err(|e| CoreError::invalid_crd(CrdApiVersion::V1BETA1_STR, format!("invalid openAPIV3Schema: {e}")))
    }
}
