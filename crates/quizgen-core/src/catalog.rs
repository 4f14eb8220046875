//! Topic catalog: subjects and their ordered sub-topics.
//!
//! A built-in catalog ships with the crate; a TOML file can replace it.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Topic;

/// A subject and the sub-topics a quiz can be scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub sub_topics: Vec<String>,
}

/// Ordered subject → sub-topic mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        Self::embedded(BUILTIN_CATALOG)
    }

    /// Parse catalog TOML compiled into the binary; empty if it is broken.
    fn embedded(content: &str) -> Self {
        parse_catalog_str(content, Path::new("<built-in catalog>")).unwrap_or_else(|e| {
            tracing::error!("built-in catalog is invalid, the subject menu will be empty: {e:#}");
            Catalog {
                subjects: Vec::new(),
            }
        })
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    /// Sub-topics of `subject`, empty when the subject is unknown.
    pub fn sub_topics(&self, subject: &str) -> &[String] {
        self.subject(subject)
            .map(|s| s.sub_topics.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve 1-based menu positions into a topic.
    pub fn pick(&self, subject_no: usize, sub_topic_no: usize) -> Option<Topic> {
        let subject = self.subjects.get(subject_no.checked_sub(1)?)?;
        let sub_topic = subject.sub_topics.get(sub_topic_no.checked_sub(1)?)?;
        Topic::new(&subject.name, sub_topic).ok()
    }

    pub fn contains(&self, topic: &Topic) -> bool {
        self.sub_topics(&topic.subject).contains(&topic.sub_topic)
    }
}

/// Parse a catalog file.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse catalog TOML (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The subject (if applicable).
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a catalog for common issues.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if catalog.subjects.is_empty() {
        warnings.push(ValidationWarning {
            subject: None,
            message: "catalog has no subjects".into(),
        });
    }

    let mut seen = HashSet::new();
    for subject in &catalog.subjects {
        let name = subject.name.trim();
        if name.is_empty() {
            warnings.push(ValidationWarning {
                subject: None,
                message: "subject name is empty".into(),
            });
            continue;
        }
        if !seen.insert(name) {
            warnings.push(ValidationWarning {
                subject: Some(name.to_string()),
                message: format!("duplicate subject: {name}"),
            });
        }
        if subject.sub_topics.is_empty() {
            warnings.push(ValidationWarning {
                subject: Some(name.to_string()),
                message: "no sub-topics; this subject cannot start a quiz".into(),
            });
        }

        let mut seen_topics = HashSet::new();
        for sub_topic in &subject.sub_topics {
            if sub_topic.trim().is_empty() {
                warnings.push(ValidationWarning {
                    subject: Some(name.to_string()),
                    message: "sub-topic name is empty".into(),
                });
            } else if !seen_topics.insert(sub_topic.trim()) {
                warnings.push(ValidationWarning {
                    subject: Some(name.to_string()),
                    message: format!("duplicate sub-topic: {}", sub_topic.trim()),
                });
            }
        }
    }

    warnings
}

const BUILTIN_CATALOG: &str = r#"
[[subjects]]
name = "Anatomy"
sub_topics = ["Upper Limb", "Lower Limb", "Thorax", "Abdomen", "Head and Neck", "Neuroanatomy"]

[[subjects]]
name = "Physiology"
sub_topics = ["Cardiovascular Physiology", "Respiratory Physiology", "Renal Physiology", "Endocrine Physiology", "Neurophysiology"]

[[subjects]]
name = "Biochemistry"
sub_topics = ["Carbohydrate Metabolism", "Lipid Metabolism", "Enzymes", "Vitamins", "Molecular Biology"]

[[subjects]]
name = "Pharmacology"
sub_topics = ["General Pharmacology", "Autonomic Drugs", "Cardiovascular Drugs", "Antimicrobials", "CNS Drugs"]

[[subjects]]
name = "Pathology"
sub_topics = ["Cell Injury", "Inflammation", "Neoplasia", "Hematology", "Immunopathology"]

[[subjects]]
name = "Microbiology"
sub_topics = ["Bacteriology", "Virology", "Mycology", "Parasitology", "Immunology"]

[[subjects]]
name = "Cardiology"
sub_topics = ["Arrhythmias", "Heart Failure", "Ischemic Heart Disease", "Valvular Heart Disease", "Hypertension"]

[[subjects]]
name = "Neurology"
sub_topics = ["Stroke", "Epilepsy", "Movement Disorders", "Headache", "Neuromuscular Disorders"]
"#;
