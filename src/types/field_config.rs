use std::fmt;

use super::Value;

/// The UI directives derived for one field by an evaluation cycle.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct FieldConfig {
    pub visible: bool,
    pub required: bool,
    pub disabled: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub classes: Vec<String>,
    pub options: Vec<Value>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            visible: true,
            required: false,
            disabled: false,
            warnings: Vec::new(),
            errors: Vec::new(),
            classes: Vec::new(),
            options: Vec::new(),
        }
    }
}

impl fmt::Display for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visible={} required={} disabled={}",
            self.visible, self.required, self.disabled
        )?;
        if !self.classes.is_empty() {
            write!(f, " classes=[{}]", self.classes.join(" "))?;
        }
        if !self.warnings.is_empty() {
            write!(f, " warnings={}", self.warnings.len())?;
        }
        if !self.errors.is_empty() {
            write!(f, " errors={}", self.errors.len())?;
        }
        if !self.options.is_empty() {
            write!(f, " options={}", self.options.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_visible_optional_enabled() {
        let cfg = FieldConfig::default();
        assert!(cfg.visible);
        assert!(!cfg.required);
        assert!(!cfg.disabled);
        assert!(cfg.warnings.is_empty() && cfg.errors.is_empty());
        assert!(cfg.classes.is_empty() && cfg.options.is_empty());
    }

    #[test]
    fn display() {
        let mut cfg = FieldConfig::default();
        assert_eq!(cfg.to_string(), "visible=true required=false disabled=false");
        cfg.classes = vec!["highlight".into(), "wide".into()];
        cfg.errors = vec!["bad".into()];
        assert_eq!(
            cfg.to_string(),
            "visible=true required=false disabled=false classes=[highlight wide] errors=1"
        );
    }
}
