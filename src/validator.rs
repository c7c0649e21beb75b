//! Project Structure Validator
//!
//! Walks the top-level children of a project file and checks them against
//! a small positional convention:
//!
//! - child 0 is an `ItemGroup` labeled `ProjectConfigurations` whose
//!   `ProjectConfiguration` entries all name a known configuration
//! - child 1 is a `PropertyGroup` labeled `Globals`
//! - anything after that is accepted as is
//!
//! Every failure is returned as a [`ValidationOutcome`] instead of aborting,
//! so the caller decides whether one bad file ends the run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{SchemaViolation, SurveyError};
use crate::namespace::{NamespaceNormalizer, NormalizerStats, is_namespaced};
use crate::project::{Element, ProjectDocument};

/// Configurations a project is allowed to declare
pub const EXPECTED_CONFIGURATIONS: [&str; 4] =
    ["Release|Win32", "Release|x64", "Debug|Win32", "Debug|x64"];

const LABEL: &str = "Label";
const INCLUDE: &str = "Include";

/// Rule applied to a top-level child, selected by its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedPosition {
    /// `<ItemGroup Label="ProjectConfigurations">`
    ConfigurationList,
    /// `<PropertyGroup Label="Globals">`
    Globals,
    /// No contract; absorbs every remaining child
    Tail,
}

impl ExpectedPosition {
    pub fn start() -> Self {
        ExpectedPosition::ConfigurationList
    }

    pub fn next(self) -> Self {
        match self {
            ExpectedPosition::ConfigurationList => ExpectedPosition::Globals,
            ExpectedPosition::Globals | ExpectedPosition::Tail => ExpectedPosition::Tail,
        }
    }

    /// Expected `(tag, label)` pair, if the position carries one
    pub fn contract(self) -> Option<(&'static str, &'static str)> {
        match self {
            ExpectedPosition::ConfigurationList => Some(("ItemGroup", "ProjectConfigurations")),
            ExpectedPosition::Globals => Some(("PropertyGroup", "Globals")),
            ExpectedPosition::Tail => None,
        }
    }
}

/// One inspected element, kept for the audit trail printed per file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 0 for top-level children, 1 for their inspected sub-elements
    pub depth: usize,
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl Diagnostic {
    fn new(depth: usize, tag: &str, element: &Element) -> Self {
        Self {
            depth,
            tag: tag.to_string(),
            attributes: element.attributes().clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:indent$}{} {{", "", self.tag, indent = self.depth * 2)?;
        for (i, (name, value)) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// Outcome of validating one project file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    SchemaViolation(SchemaViolation),
    ParseError(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, ValidationOutcome::ParseError(_))
    }
}

/// Result of validating a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileValidationResult {
    pub path: PathBuf,
    pub outcome: ValidationOutcome,
    /// Elements inspected up to the point validation stopped
    pub diagnostics: Vec<Diagnostic>,
    pub duration: Duration,
}

impl FileValidationResult {
    pub fn parse_error(path: PathBuf, details: String, duration: Duration) -> Self {
        Self {
            path,
            outcome: ValidationOutcome::ParseError(details),
            diagnostics: Vec::new(),
            duration,
        }
    }

    /// Convert a failed outcome into the error the run aborts with
    pub fn to_error(&self) -> Option<SurveyError> {
        match &self.outcome {
            ValidationOutcome::Valid => None,
            ValidationOutcome::SchemaViolation(violation) => Some(SurveyError::Schema {
                file: self.path.clone(),
                violation: violation.clone(),
            }),
            ValidationOutcome::ParseError(details) => Some(SurveyError::Parse {
                file: self.path.clone(),
                details: details.clone(),
            }),
        }
    }
}

/// Validator options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Also reject repeated configurations and an incomplete configuration set
    pub strict_configurations: bool,
}

/// Checks project documents against the positional convention.
///
/// Owns the namespace cache for the whole run; documents are validated one
/// at a time.
#[derive(Debug, Default)]
pub struct ProjectValidator {
    normalizer: NamespaceNormalizer,
    options: ValidatorOptions,
}

impl ProjectValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self {
            normalizer: NamespaceNormalizer::new(),
            options,
        }
    }

    pub fn options(&self) -> ValidatorOptions {
        self.options
    }

    pub fn normalizer_stats(&self) -> NormalizerStats {
        self.normalizer.stats()
    }

    /// Load a project file and validate it
    pub async fn validate_path(&mut self, path: &Path) -> FileValidationResult {
        let start = Instant::now();
        match ProjectDocument::load(path).await {
            Ok(document) => {
                let mut result = self.validate(&document);
                result.duration = start.elapsed();
                result
            }
            Err(SurveyError::Parse { details, .. }) => {
                debug!(path = %path.display(), %details, "failed to parse project");
                FileValidationResult::parse_error(path.to_path_buf(), details, start.elapsed())
            }
            Err(e) => FileValidationResult::parse_error(
                path.to_path_buf(),
                e.to_string(),
                start.elapsed(),
            ),
        }
    }

    /// Validate an already parsed document
    pub fn validate(&mut self, document: &ProjectDocument) -> FileValidationResult {
        let start = Instant::now();
        let mut diagnostics = Vec::new();

        let outcome = match self.check_structure(document.root(), &mut diagnostics) {
            Ok(()) => ValidationOutcome::Valid,
            Err(violation) => {
                debug!(path = %document.path().display(), %violation, "project rejected");
                ValidationOutcome::SchemaViolation(violation)
            }
        };

        FileValidationResult {
            path: document.path().to_path_buf(),
            outcome,
            diagnostics,
            duration: start.elapsed(),
        }
    }

    fn check_structure(
        &mut self,
        root: &Element,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), SchemaViolation> {
        let mut expected = ExpectedPosition::start();

        for (position, child) in root.children().iter().enumerate() {
            if !is_namespaced(child.tag()) {
                return Err(SchemaViolation::NotInNamespace {
                    position,
                    tag: child.tag().to_string(),
                });
            }

            let tag = self.normalizer.normalize(child.tag());
            trace!(position, tag = %tag, ?expected, "inspecting child");
            diagnostics.push(Diagnostic::new(0, &tag, child));

            match expected {
                ExpectedPosition::ConfigurationList => {
                    Self::check_contract(expected, position, &tag, child)?;
                    self.check_configurations(child, diagnostics)?;
                }
                ExpectedPosition::Globals => {
                    Self::check_contract(expected, position, &tag, child)?;
                    self.record_globals(child, diagnostics);
                }
                ExpectedPosition::Tail => {}
            }

            expected = expected.next();
        }

        Ok(())
    }

    fn check_contract(
        expected: ExpectedPosition,
        position: usize,
        tag: &str,
        child: &Element,
    ) -> Result<(), SchemaViolation> {
        let Some((expected_tag, expected_label)) = expected.contract() else {
            return Ok(());
        };

        if tag != expected_tag {
            return Err(SchemaViolation::UnexpectedTag {
                position,
                expected: expected_tag.to_string(),
                found: tag.to_string(),
            });
        }

        match child.attribute(LABEL) {
            None => Err(SchemaViolation::MissingAttribute {
                position,
                tag: tag.to_string(),
                attribute: LABEL.to_string(),
            }),
            Some(label) if label != expected_label => Err(SchemaViolation::UnexpectedLabel {
                position,
                expected: expected_label.to_string(),
                found: label.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn check_configurations(
        &mut self,
        group: &Element,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), SchemaViolation> {
        let mut seen = BTreeSet::new();

        for element in group.descendants() {
            let tag: Arc<str> = self.normalizer.normalize(element.tag());
            if &*tag != "ProjectConfiguration" {
                continue;
            }
            diagnostics.push(Diagnostic::new(1, &tag, element));

            let include = element
                .attribute(INCLUDE)
                .ok_or_else(|| SchemaViolation::MissingAttribute {
                    position: 0,
                    tag: tag.to_string(),
                    attribute: INCLUDE.to_string(),
                })?;

            if !EXPECTED_CONFIGURATIONS.contains(&include) {
                return Err(SchemaViolation::UnknownConfiguration {
                    include: include.to_string(),
                });
            }

            if !seen.insert(include) && self.options.strict_configurations {
                return Err(SchemaViolation::DuplicateConfiguration {
                    include: include.to_string(),
                });
            }
        }

        if self.options.strict_configurations {
            let missing: Vec<String> = EXPECTED_CONFIGURATIONS
                .iter()
                .filter(|config| !seen.contains(*config))
                .map(|config| config.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(SchemaViolation::MissingConfigurations { missing });
            }
        }

        Ok(())
    }

    fn record_globals(&mut self, group: &Element, diagnostics: &mut Vec<Diagnostic>) {
        for property in group.children() {
            let tag = self.normalizer.normalize(property.tag());
            diagnostics.push(Diagnostic::new(1, &tag, property));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::MSBUILD_PREFIX;

    fn ns(local: &str) -> String {
        format!("{}{}", MSBUILD_PREFIX, local)
    }

    fn configuration(include: &str) -> Element {
        Element::new(ns("ProjectConfiguration"))
            .with_attribute("Include", include)
            .with_child(Element::new(ns("Configuration")))
            .with_child(Element::new(ns("Platform")))
    }

    fn configuration_list(includes: &[&str]) -> Element {
        includes.iter().fold(
            Element::new(ns("ItemGroup")).with_attribute("Label", "ProjectConfigurations"),
            |group, include| group.with_child(configuration(include)),
        )
    }

    fn globals() -> Element {
        Element::new(ns("PropertyGroup"))
            .with_attribute("Label", "Globals")
            .with_child(Element::new(ns("ProjectGuid")))
            .with_child(Element::new(ns("Keyword")))
    }

    fn document(children: Vec<Element>) -> ProjectDocument {
        let root = children
            .into_iter()
            .fold(Element::new(ns("Project")), Element::with_child);
        ProjectDocument::from_root("test.vcxproj", root)
    }

    fn well_formed() -> ProjectDocument {
        document(vec![
            configuration_list(&EXPECTED_CONFIGURATIONS),
            globals(),
            Element::new(ns("Import"))
                .with_attribute("Project", "$(VCTargetsPath)\\Microsoft.Cpp.Default.props"),
        ])
    }

    fn violation(result: &FileValidationResult) -> &SchemaViolation {
        match &result.outcome {
            ValidationOutcome::SchemaViolation(v) => v,
            other => panic!("Expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_position_transitions() {
        let start = ExpectedPosition::start();
        assert_eq!(start, ExpectedPosition::ConfigurationList);
        assert_eq!(start.next(), ExpectedPosition::Globals);
        assert_eq!(start.next().next(), ExpectedPosition::Tail);
        assert_eq!(ExpectedPosition::Tail.next(), ExpectedPosition::Tail);
        assert_eq!(ExpectedPosition::Tail.contract(), None);
    }

    #[test]
    fn test_well_formed_project_is_valid() {
        let mut validator = ProjectValidator::default();
        let result = validator.validate(&well_formed());

        assert!(result.outcome.is_valid());
        // 3 top-level children + 4 configurations + 2 globals
        assert_eq!(result.diagnostics.len(), 9);
        assert_eq!(result.diagnostics[0].tag, "ItemGroup");
        assert_eq!(result.diagnostics[1].tag, "ProjectConfiguration");
        assert_eq!(result.diagnostics[1].depth, 1);
    }

    #[test]
    fn test_mislabeled_first_child() {
        let doc = document(vec![
            Element::new(ns("ItemGroup")).with_attribute("Label", "Foo"),
            globals(),
        ]);
        let result = ProjectValidator::default().validate(&doc);

        assert_eq!(
            violation(&result),
            &SchemaViolation::UnexpectedLabel {
                position: 0,
                expected: "ProjectConfigurations".to_string(),
                found: "Foo".to_string(),
            }
        );
    }

    #[test]
    fn test_first_child_without_label() {
        let doc = document(vec![Element::new(ns("ItemGroup")), globals()]);
        let result = ProjectValidator::default().validate(&doc);

        assert!(matches!(
            violation(&result),
            SchemaViolation::MissingAttribute { position: 0, attribute, .. } if attribute == "Label"
        ));
    }

    #[test]
    fn test_unknown_configuration() {
        let doc = document(vec![
            configuration_list(&["Release|Win32", "Release|ARM64"]),
            globals(),
        ]);
        let result = ProjectValidator::default().validate(&doc);

        assert_eq!(
            violation(&result),
            &SchemaViolation::UnknownConfiguration {
                include: "Release|ARM64".to_string()
            }
        );
        // diagnostics stop at the failing configuration
        assert_eq!(result.diagnostics.len(), 3);
    }

    #[test]
    fn test_nested_configuration_is_checked() {
        let group = Element::new(ns("ItemGroup"))
            .with_attribute("Label", "ProjectConfigurations")
            .with_child(Element::new(ns("Wrapper")).with_child(configuration("Debug|ARM")));
        let result = ProjectValidator::default().validate(&document(vec![group, globals()]));

        assert!(matches!(
            violation(&result),
            SchemaViolation::UnknownConfiguration { include } if include == "Debug|ARM"
        ));
    }

    #[test]
    fn test_configuration_without_include() {
        let group = Element::new(ns("ItemGroup"))
            .with_attribute("Label", "ProjectConfigurations")
            .with_child(Element::new(ns("ProjectConfiguration")));
        let result = ProjectValidator::default().validate(&document(vec![group, globals()]));

        assert!(matches!(
            violation(&result),
            SchemaViolation::MissingAttribute { attribute, .. } if attribute == "Include"
        ));
    }

    #[test]
    fn test_second_child_must_be_property_group() {
        let doc = document(vec![
            configuration_list(&EXPECTED_CONFIGURATIONS),
            Element::new(ns("ItemGroup")).with_attribute("Label", "Globals"),
        ]);
        let result = ProjectValidator::default().validate(&doc);

        assert_eq!(
            violation(&result),
            &SchemaViolation::UnexpectedTag {
                position: 1,
                expected: "PropertyGroup".to_string(),
                found: "ItemGroup".to_string(),
            }
        );
    }

    #[test]
    fn test_second_child_mislabeled() {
        let doc = document(vec![
            configuration_list(&EXPECTED_CONFIGURATIONS),
            Element::new(ns("PropertyGroup")).with_attribute("Label", "Configuration"),
        ]);
        let result = ProjectValidator::default().validate(&doc);

        assert_eq!(violation(&result).position(), 1);
    }

    #[test]
    fn test_child_outside_namespace() {
        let doc = document(vec![
            configuration_list(&EXPECTED_CONFIGURATIONS),
            Element::new("PropertyGroup").with_attribute("Label", "Globals"),
        ]);
        let result = ProjectValidator::default().validate(&doc);

        assert_eq!(
            violation(&result),
            &SchemaViolation::NotInNamespace {
                position: 1,
                tag: "PropertyGroup".to_string(),
            }
        );
    }

    #[test]
    fn test_tail_is_permissive() {
        let doc = document(vec![
            configuration_list(&["Debug|x64"]),
            globals(),
            Element::new(ns("ItemGroup")).with_attribute("Label", "Anything"),
            Element::new(ns("Whatever")),
        ]);
        let result = ProjectValidator::default().validate(&doc);
        assert!(result.outcome.is_valid());
    }

    #[test]
    fn test_tail_still_requires_namespace() {
        let doc = document(vec![
            configuration_list(&EXPECTED_CONFIGURATIONS),
            globals(),
            Element::new("{urn:other}Import"),
        ]);
        let result = ProjectValidator::default().validate(&doc);
        assert_eq!(violation(&result).position(), 2);
    }

    #[test]
    fn test_short_documents_are_accepted() {
        let mut validator = ProjectValidator::default();
        assert!(validator.validate(&document(vec![])).outcome.is_valid());
        assert!(
            validator
                .validate(&document(vec![configuration_list(&["Debug|Win32"])]))
                .outcome
                .is_valid()
        );
    }

    #[test]
    fn test_duplicates_and_gaps_allowed_by_default() {
        let doc = document(vec![
            configuration_list(&["Debug|Win32", "Debug|Win32"]),
            globals(),
        ]);
        let result = ProjectValidator::default().validate(&doc);
        assert!(result.outcome.is_valid());
    }

    #[test]
    fn test_strict_mode_rejects_duplicates() {
        let doc = document(vec![
            configuration_list(&["Debug|Win32", "Debug|Win32"]),
            globals(),
        ]);
        let mut validator = ProjectValidator::new(ValidatorOptions {
            strict_configurations: true,
        });
        let result = validator.validate(&doc);

        assert!(matches!(
            violation(&result),
            SchemaViolation::DuplicateConfiguration { include } if include == "Debug|Win32"
        ));
    }

    #[test]
    fn test_strict_mode_rejects_missing() {
        let doc = document(vec![
            configuration_list(&["Debug|Win32", "Release|Win32"]),
            globals(),
        ]);
        let mut validator = ProjectValidator::new(ValidatorOptions {
            strict_configurations: true,
        });
        let result = validator.validate(&doc);

        assert_eq!(
            violation(&result),
            &SchemaViolation::MissingConfigurations {
                missing: vec!["Release|x64".to_string(), "Debug|x64".to_string()],
            }
        );
    }

    #[test]
    fn test_strict_mode_accepts_complete_set() {
        let mut validator = ProjectValidator::new(ValidatorOptions {
            strict_configurations: true,
        });
        assert!(validator.validate(&well_formed()).outcome.is_valid());
    }

    #[test]
    fn test_normalizer_is_shared_across_documents() {
        let mut validator = ProjectValidator::default();
        validator.validate(&well_formed());
        let first = validator.normalizer_stats();
        validator.validate(&well_formed());
        let second = validator.normalizer_stats();

        assert_eq!(first.entries, second.entries);
        assert_eq!(first.misses, second.misses);
        assert!(second.hits > first.hits);
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            depth: 1,
            tag: "ProjectConfiguration".to_string(),
            attributes: BTreeMap::from([("Include".to_string(), "Debug|x64".to_string())]),
        };
        assert_eq!(
            diagnostic.to_string(),
            "  ProjectConfiguration {Include: \"Debug|x64\"}"
        );

        let empty = Diagnostic {
            depth: 0,
            tag: "Import".to_string(),
            attributes: BTreeMap::new(),
        };
        assert_eq!(empty.to_string(), "Import {}");
    }

    #[test]
    fn test_to_error() {
        let mut validator = ProjectValidator::default();
        assert!(validator.validate(&well_formed()).to_error().is_none());

        let result = FileValidationResult::parse_error(
            PathBuf::from("x.vcxproj"),
            "unexpected end".to_string(),
            Duration::ZERO,
        );
        assert!(matches!(result.to_error(), Some(SurveyError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_validate_path_reports_malformed_xml() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.vcxproj");
        tokio::fs::write(&path, "<Project><ItemGroup></Project>")
            .await
            .unwrap();

        let result = ProjectValidator::default().validate_path(&path).await;
        assert!(result.outcome.is_parse_error());
        assert!(result.diagnostics.is_empty());
    }
}
