//! Template loading for prompt assembly.
//!
//! Templates live in a YAML file of named Handlebars templates; the built-in
//! set is compiled into the binary and can be replaced from disk.

use crate::OutError;
use serde::Deserialize;
use std::collections::HashMap;

/// Templates every renderer must provide
pub const REQUIRED_TEMPLATES: &[&str] = &["system_context"];

pub(crate) const BUILTIN_TEMPLATES: &str = include_str!("../templates/prompts.yaml");

/// Top-level templates file structure
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: HashMap<String, Template>,
}

/// A single template definition
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub description: String,
    pub template: String,
}

impl TemplatesFile {
    /// Load templates from a YAML file
    pub fn load(path: &str) -> Result<Self, OutError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OutError::Io(format!("{}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, OutError> {
        let file: TemplatesFile = serde_yaml::from_str(yaml)?;
        file.validate()?;
        Ok(file)
    }

    pub fn builtin() -> Result<Self, OutError> {
        Self::from_yaml(BUILTIN_TEMPLATES)
    }

    fn validate(&self) -> Result<(), OutError> {
        match REQUIRED_TEMPLATES
            .iter()
            .find(|name| !self.templates.contains_key(**name))
        {
            Some(name) => Err(OutError::MissingTemplate(name.to_string())),
            None => Ok(()),
        }
    }

    /// Template names, sorted
    pub fn list_templates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_parse() {
        let file = TemplatesFile::builtin().unwrap();
        assert_eq!(file.version, "1.0");
        assert!(file.list_templates().contains(&"system_context"));
    }

    #[test]
    fn test_missing_required_template() {
        let yaml = "version: \"1.0\"\ntemplates:\n  other:\n    description: x\n    template: y\n";
        let err = TemplatesFile::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, OutError::MissingTemplate(name) if name == "system_context"));
    }
}
