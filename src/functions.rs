//! Function descriptors for function-calling mode
//!
//! This module describes callable capabilities to the model. A
//! [`FunctionDescriptor`] carries a name, an optional owning plugin group, a
//! description, and an ordered parameter list. The connector only encodes and
//! decodes function metadata; executing the function is the caller's job.
//!
//! The model-facing identifier is the **qualified name**: the plugin name and
//! function name joined with an underscore (`TimePlugin_Date`), or the bare
//! function name when there is no plugin group. This is the exact string the
//! model uses to reference the function, and the string that comes back in a
//! response's `function_call.name`.
//!
//! # Examples
//!
//! ```rust
//! use chat_connector::function;
//!
//! let date = function("Date", "Returns the current date")
//!     .plugin("TimePlugin")
//!     .param("Format", "string", "Date format")
//!     .build();
//!
//! assert_eq!(date.qualified_name(), "TimePlugin_Date");
//! ```

/// A single parameter of a function contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionParameter {
    pub name: String,
    pub description: String,
    /// JSON-schema type tag ("string", "number", "boolean", ...)
    pub type_tag: String,
    /// Whether the model must supply this parameter. Defaults to false.
    pub required: bool,
}

/// Describes a callable capability for function-calling mode.
///
/// Descriptors are metadata only; the connector never invokes the underlying
/// function. Parameter order is preserved all the way to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// Owning plugin group, if any
    pub plugin_name: Option<String>,
    /// Function name within the group
    pub name: String,
    pub description: String,
    /// Parameters in caller-supplied order
    pub parameters: Vec<FunctionParameter>,
}

impl FunctionDescriptor {
    /// The group-prefixed identifier the model-facing API uses to reference
    /// this function: `<plugin>_<name>` when a plugin group is present, else
    /// the name alone.
    pub fn qualified_name(&self) -> String {
        match &self.plugin_name {
            Some(plugin) => format!("{}_{}", plugin, self.name),
            None => self.name.clone(),
        }
    }
}

/// How the encoder advertises functions to the model
#[derive(Debug, Clone, Default)]
pub enum FunctionCallPolicy {
    /// No functions are advertised; the request carries no `functions` key
    #[default]
    None,
    /// The model decides whether and which of the supplied functions to call
    Auto(Vec<FunctionDescriptor>),
    /// The model must call exactly this function
    Require(FunctionDescriptor),
}

/// Create a builder for a function descriptor.
///
/// # Examples
///
/// ```rust
/// use chat_connector::function;
///
/// let now = function("Now", "Returns the current time")
///     .plugin("TimePlugin")
///     .required_param("Format", "string", "Time format")
///     .build();
///
/// assert_eq!(now.qualified_name(), "TimePlugin_Now");
/// assert!(now.parameters[0].required);
/// ```
pub fn function(name: impl Into<String>, description: impl Into<String>) -> FunctionBuilder {
    FunctionBuilder {
        plugin_name: None,
        name: name.into(),
        description: description.into(),
        parameters: Vec::new(),
    }
}

/// Builder for [`FunctionDescriptor`]
#[derive(Debug)]
pub struct FunctionBuilder {
    plugin_name: Option<String>,
    name: String,
    description: String,
    parameters: Vec<FunctionParameter>,
}

impl FunctionBuilder {
    /// Set the owning plugin group
    pub fn plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin_name = Some(plugin.into());
        self
    }

    /// Add an optional parameter
    pub fn param(
        mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.parameters.push(FunctionParameter {
            name: name.into(),
            description: description.into(),
            type_tag: type_tag.into(),
            required: false,
        });
        self
    }

    /// Add a required parameter
    pub fn required_param(
        mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.parameters.push(FunctionParameter {
            name: name.into(),
            description: description.into(),
            type_tag: type_tag.into(),
            required: true,
        });
        self
    }

    pub fn build(self) -> FunctionDescriptor {
        FunctionDescriptor {
            plugin_name: self.plugin_name,
            name: self.name,
            description: self.description,
            parameters: self.parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_with_plugin() {
        let descriptor = function("Date", "TimePlugin.Date")
            .plugin("TimePlugin")
            .build();
        assert_eq!(descriptor.qualified_name(), "TimePlugin_Date");
    }

    #[test]
    fn test_qualified_name_without_plugin() {
        let descriptor = function("Date", "A date function").build();
        assert_eq!(descriptor.qualified_name(), "Date");
    }

    #[test]
    fn test_builder_preserves_parameter_order() {
        let descriptor = function("Convert", "Converts between units")
            .param("value", "number", "The value to convert")
            .param("from", "string", "Source unit")
            .param("to", "string", "Target unit")
            .build();

        let names: Vec<&str> = descriptor
            .parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["value", "from", "to"]);
    }

    #[test]
    fn test_param_required_defaults_to_false() {
        let descriptor = function("Date", "TimePlugin.Date")
            .plugin("TimePlugin")
            .param("Format", "string", "Date format")
            .build();
        assert!(!descriptor.parameters[0].required);
    }

    #[test]
    fn test_required_param() {
        let descriptor = function("Lookup", "Looks something up")
            .required_param("key", "string", "Lookup key")
            .build();
        assert!(descriptor.parameters[0].required);
    }

    #[test]
    fn test_policy_default_is_none() {
        assert!(matches!(
            FunctionCallPolicy::default(),
            FunctionCallPolicy::None
        ));
    }
}
