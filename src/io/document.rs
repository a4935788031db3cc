//! Typed view of a simulation configuration document.
//!
//! The YAML layout keys most entries by label inside single-entry mappings
//! (`- label: {...}`); [`Labeled`] models that shape. Every section is
//! optional at this layer: which sections are required depends on the
//! document's action and is enforced by the lineage resolver.

use super::error::Error;
use crate::model::sim_box::SimBox;
use crate::model::simulation::Simulation;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::{Read, Write};
use std::marker::PhantomData;

/// Requested relation of a document to earlier runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Run,
    Continue,
    Fork,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<BaseSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particles: Option<Vec<Labeled<ParticleSpec>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rigidbodies: Option<Vec<Labeled<Vec<Labeled<MemberSpec>>>>>,
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub sim_box: Option<SimBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactions: Option<Vec<Labeled<InteractionSpec>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forked_from: Option<BaseSpec>,
}

/// Reference to an ancestor project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSpec {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSpec {
    #[serde(default)]
    pub q: f64,
    #[serde(default = "default_unit")]
    pub m: f64,
    #[serde(default = "default_unit")]
    pub diam: f64,
}

fn default_unit() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSpec {
    pub position: [f64; 3],
    #[serde(default)]
    pub is_center: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSpec {
    pub with: Partners,
    pub epsilon: f64,
    pub sigma: f64,
    pub alpha: f64,
}

/// Interaction partners, written either as one label or a list of labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Partners {
    One(String),
    Many(Vec<String>),
}

impl Partners {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Partners::One(label) => vec![label],
            Partners::Many(labels) => labels,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSpec {
    #[serde(default)]
    pub rigidbodies: Vec<InstanceSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solvent: Option<Vec<Labeled<u64>>>,
    #[serde(rename = "kT", default, skip_serializing_if = "Option::is_none")]
    pub kt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,
    #[serde(
        default,
        deserialize_with = "steps",
        skip_serializing_if = "Option::is_none"
    )]
    pub period: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(
        default,
        deserialize_with = "steps",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<u64>,
}

/// Step counts may be written as floats (`1e6`, `100.0`); they must be integral.
fn steps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Steps {
        Int(u64),
        Float(f64),
    }

    match Option::<Steps>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Steps::Int(n)) => Ok(Some(n)),
        Some(Steps::Float(x)) if x >= 0.0 && x.fract() == 0.0 && x <= u64::MAX as f64 => {
            Ok(Some(x as u64))
        }
        Some(Steps::Float(x)) => Err(de::Error::custom(format!(
            "expected a non-negative whole number of steps, found {x}"
        ))),
    }
}

/// A single-entry mapping `label: value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Labeled<T> {
    pub label: String,
    pub value: T,
}

impl<T> Labeled<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

impl<T: Serialize> Serialize for Labeled<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.label, &self.value)?;
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Labeled<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabeledVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for LabeledVisitor<T> {
            type Value = Labeled<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a single-entry mapping of label to value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let (label, value) = map
                    .next_entry::<String, T>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if map.next_key::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::custom(format!(
                        "entry '{label}' must be a single-entry mapping"
                    )));
                }
                Ok(Labeled { label, value })
            }
        }

        deserializer.deserialize_map(LabeledVisitor(PhantomData))
    }
}

/// One `simulation.rigidbodies` entry: `label: count` plus an optional `fixed_position`.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSpec {
    pub label: String,
    pub count: u64,
    pub fixed_position: Option<[f64; 3]>,
}

const FIXED_POSITION_KEY: &str = "fixed_position";

impl Serialize for InstanceSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.fixed_position.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(&self.label, &self.count)?;
        if let Some(pos) = &self.fixed_position {
            map.serialize_entry(FIXED_POSITION_KEY, pos)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for InstanceSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct InstanceVisitor;

        impl<'de> Visitor<'de> for InstanceVisitor {
            type Value = InstanceSpec;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of rigid body label to instance count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entry: Option<(String, u64)> = None;
                let mut fixed_position = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == FIXED_POSITION_KEY {
                        fixed_position = Some(map.next_value::<[f64; 3]>()?);
                    } else if let Some((label, _)) = &entry {
                        return Err(de::Error::custom(format!(
                            "rigid body entry names both '{label}' and '{key}'"
                        )));
                    } else {
                        entry = Some((key, map.next_value()?));
                    }
                }
                let (label, count) =
                    entry.ok_or_else(|| de::Error::custom("rigid body entry has no label"))?;
                Ok(InstanceSpec {
                    label,
                    count,
                    fixed_position,
                })
            }
        }

        deserializer.deserialize_map(InstanceVisitor)
    }
}

pub fn read_document<R: Read>(reader: R) -> Result<Document, Error> {
    Ok(serde_yaml::from_reader(reader)?)
}

pub fn parse_document(text: &str) -> Result<Document, Error> {
    Ok(serde_yaml::from_str(text)?)
}

pub fn write_document<W: Write>(writer: W, document: &Document) -> Result<(), Error> {
    Ok(serde_yaml::to_writer(writer, document)?)
}

impl Document {
    /// Builds the document that re-creates `sim`.
    ///
    /// Catalog and templates are deduplicated; templates carry member
    /// positions and center flags only, since physical attributes come from
    /// the catalog. The duration written is the total so far, and forks echo
    /// their lineage under `forked_from`.
    pub fn from_simulation(sim: &Simulation) -> Result<Self, crate::Error> {
        let particles = sim
            .unique_particles()?
            .into_iter()
            .map(|p| {
                Labeled::new(
                    p.label.clone(),
                    ParticleSpec {
                        q: p.charge,
                        m: p.mass,
                        diam: p.diameter,
                    },
                )
            })
            .collect();

        let rigidbodies = sim
            .unique_rigid_bodies()?
            .into_iter()
            .map(|rb| {
                let members = rb
                    .members()
                    .iter()
                    .map(|p| {
                        Labeled::new(
                            p.label.clone(),
                            MemberSpec {
                                position: p.position,
                                is_center: p.is_center,
                            },
                        )
                    })
                    .collect();
                Labeled::new(rb.label.clone(), members)
            })
            .collect();

        let interactions = sim
            .interactions()
            .iter()
            .map(|i| {
                Labeled::new(
                    i.p1_label.clone(),
                    InteractionSpec {
                        with: Partners::Many(vec![i.p2_label.clone()]),
                        epsilon: i.epsilon,
                        sigma: i.sigma,
                        alpha: i.alpha,
                    },
                )
            })
            .collect();

        let instances = sim
            .rigid_bodies()?
            .into_iter()
            .map(|(rb, count)| InstanceSpec {
                label: rb.label.clone(),
                count,
                fixed_position: rb.fixed_position.filter(|_| count == 1),
            })
            .collect();

        let solvent = sim.has_solvent().then(|| {
            sim.solvent_counts()
                .iter()
                .map(|c| Labeled::new(c.label.clone(), c.count))
                .collect()
        });

        let simulation = SimulationSpec {
            rigidbodies: instances,
            solvent,
            kt: Some(sim.kt),
            dt: Some(sim.dt),
            period: Some(sim.period),
            seed: Some(sim.seed),
            duration: Some(sim.total_duration()),
        };

        let forked_from = sim.forked_from().map(|simd| BaseSpec {
            file: simd.file.clone(),
            frame: Some(simd.frame),
        });

        Ok(Self {
            project_name: Some(sim.project.clone()),
            action: None,
            base: None,
            particles: Some(particles),
            rigidbodies: Some(rigidbodies),
            sim_box: Some(sim.sim_box),
            interactions: Some(interactions),
            simulation: Some(simulation),
            forked_from,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN_DOC: &str = r#"
project_name: propeller
box: {Lx: 50, Ly: 50, Lz: 50}
particles:
  - C: {q: 0, m: 1, diam: 1}
  - A: {q: -1}
rigidbodies:
  - prop:
      - C: {position: [0, 0, 0], is_center: true}
      - A: {position: [-1.5, 0, 0]}
interactions:
  - A:
      with: [A, C]
      epsilon: 1.0
      sigma: 1.0
      alpha: 0
  - C: {with: C, epsilon: 2, sigma: 1, alpha: 1}
simulation:
  rigidbodies:
    - prop: 1
      fixed_position: [1, 2, 3]
  solvent:
    - A: 4
  kT: 1.0
  dt: 0.005
  period: 100.0
  seed: 7
  duration: 1000
"#;

    #[test]
    fn parses_run_document() {
        let doc = parse_document(RUN_DOC).unwrap();
        assert_eq!(doc.project_name.as_deref(), Some("propeller"));
        assert!(doc.action.is_none());
        assert_eq!(doc.sim_box, Some(SimBox::new(50.0, 50.0, 50.0)));

        let particles = doc.particles.unwrap();
        assert_eq!(particles[1].label, "A");
        assert_eq!(
            particles[1].value,
            ParticleSpec {
                q: -1.0,
                m: 1.0,
                diam: 1.0
            }
        );

        let rbs = doc.rigidbodies.unwrap();
        assert_eq!(rbs[0].label, "prop");
        assert!(rbs[0].value[0].value.is_center);
        assert!(!rbs[0].value[1].value.is_center);

        let interactions = doc.interactions.unwrap();
        assert_eq!(
            interactions[0].value.with.clone().into_vec(),
            vec!["A", "C"]
        );
        assert_eq!(interactions[1].value.with.clone().into_vec(), vec!["C"]);

        let sim = doc.simulation.unwrap();
        assert_eq!(
            sim.rigidbodies[0],
            InstanceSpec {
                label: "prop".into(),
                count: 1,
                fixed_position: Some([1.0, 2.0, 3.0]),
            }
        );
        assert_eq!(sim.solvent.unwrap()[0], Labeled::new("A", 4));
        assert_eq!(sim.period, Some(100));
        assert_eq!(sim.duration, Some(1000));
        assert_eq!(sim.kt, Some(1.0));
    }

    #[test]
    fn parses_action_and_base() {
        let doc = parse_document(
            "action: fork\nproject_name: b\nbase: {file: a_20240101_000000.yaml, frame: 3}\nsimulation: {duration: 200, kT: 2.0}\n",
        )
        .unwrap();
        assert_eq!(doc.action, Some(Action::Fork));
        assert_eq!(
            doc.base,
            Some(BaseSpec {
                file: "a_20240101_000000.yaml".into(),
                frame: Some(3)
            })
        );
        let sim = doc.simulation.unwrap();
        assert!(sim.rigidbodies.is_empty());
        assert_eq!(sim.duration, Some(200));
        assert!(sim.dt.is_none());
    }

    #[test]
    fn rejects_multi_entry_labeled_mapping() {
        let err = parse_document("particles:\n  - {A: {q: 0}, B: {q: 1}}\n").unwrap_err();
        assert!(err.to_string().contains("single-entry"));
    }

    #[test]
    fn rejects_fractional_steps() {
        assert!(parse_document("simulation: {duration: 10.5}\n").is_err());
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(parse_document("action: restart\n").is_err());
    }

    #[test]
    fn written_document_reads_back() {
        let doc = parse_document(RUN_DOC).unwrap();
        let mut out = Vec::new();
        write_document(&mut out, &doc).unwrap();
        let back = read_document(out.as_slice()).unwrap();
        assert_eq!(back.rigidbodies, doc.rigidbodies);
        assert_eq!(back.simulation, doc.simulation);
        assert_eq!(back.sim_box, doc.sim_box);
    }
}
