//! Manifest parsing
//!
//! Reads the parts of a compose manifest the sync engine cares about and
//! ignores everything else. Accepts the compose shorthands `build: ./dir`
//! and labels written as a mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};

use crate::domain::entities::{BuildSpec, Service, DEFAULT_DOCKERFILE};

/// Manifest content after parsing, before the project name is settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedManifest {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub services: BTreeMap<String, Service>,
}

pub fn parse_manifest(content: &str) -> Result<ParsedManifest, serde_yaml_ng::Error> {
    if content.trim().is_empty() {
        return Ok(ParsedManifest {
            name: None,
            domain: None,
            services: BTreeMap::new(),
        });
    }

    let doc: ManifestDocument = serde_yaml_ng::from_str(content)?;
    let services = doc
        .services
        .0
        .into_iter()
        .map(|(name, body)| {
            let service = body.unwrap_or_default().into_service(&name);
            (name, service)
        })
        .collect();

    Ok(ParsedManifest {
        name: doc.name.filter(|n| !n.trim().is_empty()),
        domain: doc.domain.filter(|d| !d.trim().is_empty()),
        services,
    })
}

#[derive(Debug, Deserialize)]
struct ManifestDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "x-graft-domain")]
    domain: Option<String>,
    #[serde(default)]
    services: ServiceMap,
}

/// Service table that rejects duplicate names instead of keeping the last.
#[derive(Debug, Default)]
struct ServiceMap(BTreeMap<String, Option<ServiceDocument>>);

impl<'de> Deserialize<'de> for ServiceMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ServiceMapVisitor;

        impl<'de> Visitor<'de> for ServiceMapVisitor {
            type Value = ServiceMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of service names to service definitions")
            }

            fn visit_unit<E: de::Error>(self) -> Result<ServiceMap, E> {
                Ok(ServiceMap::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ServiceMap, A::Error> {
                let mut services = BTreeMap::new();
                while let Some(name) = map.next_key::<String>()? {
                    if services.contains_key(&name) {
                        return Err(de::Error::custom(format!("duplicate service '{}'", name)));
                    }
                    let body = map.next_value::<Option<ServiceDocument>>()?;
                    services.insert(name, body);
                }
                Ok(ServiceMap(services))
            }
        }

        deserializer.deserialize_any(ServiceMapVisitor)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ServiceDocument {
    #[serde(default)]
    build: Option<BuildDocument>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    labels: LabelsDocument,
}

impl ServiceDocument {
    fn into_service(self, name: &str) -> Service {
        Service {
            name: name.to_string(),
            build: self.build.map(BuildDocument::into_spec),
            image: self.image,
            labels: self.labels.into_labels(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BuildDocument {
    Context(String),
    Full {
        #[serde(default)]
        context: Option<String>,
        #[serde(default)]
        dockerfile: Option<String>,
    },
}

impl BuildDocument {
    fn into_spec(self) -> BuildSpec {
        match self {
            BuildDocument::Context(context) => BuildSpec::new(context),
            BuildDocument::Full {
                context,
                dockerfile,
            } => BuildSpec::new(context.unwrap_or_else(|| ".".to_string())).with_dockerfile(
                dockerfile
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_DOCKERFILE.to_string()),
            ),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum LabelsDocument {
    #[default]
    Empty,
    List(Vec<String>),
    Map(Mapping),
}

impl LabelsDocument {
    fn into_labels(self) -> Vec<String> {
        match self {
            LabelsDocument::Empty => Vec::new(),
            LabelsDocument::List(labels) => labels,
            LabelsDocument::Map(mapping) => mapping
                .into_iter()
                .map(|(key, value)| format!("{}={}", scalar_text(&key), scalar_text(&value)))
                .collect(),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => serde_yaml_ng::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
