//! Schema types and builders for tfplug
//!
//! Resources declare their schema once with the builders here. Plan
//! modifiers attached to attributes are run by
//! [`plan_resource_change`](crate::plan_modifier::plan_resource_change).

use crate::plan_modifier::{PlanModifier, RequiresReplaceIfChanged};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Terraform's type system
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>), // Ordered, allows duplicates
    Set(Box<AttributeType>),  // Unordered, no duplicates
    Map(Box<AttributeType>),  // String keys only
    Object(BTreeMap<String, AttributeType>),
}

impl AttributeType {
    pub fn set_of(element: AttributeType) -> Self {
        AttributeType::Set(Box::new(element))
    }

    pub fn list_of(element: AttributeType) -> Self {
        AttributeType::List(Box::new(element))
    }

    pub fn map_of(element: AttributeType) -> Self {
        AttributeType::Map(Box::new(element))
    }

    /// Whether values of this type compare without regard to order
    pub fn is_set(&self) -> bool {
        matches!(self, AttributeType::Set(_))
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64, // Increment when schema changes require migration
    pub block: Block,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attribute(name)
    }

    pub fn nested_block(&self, type_name: &str) -> Option<&NestedBlock> {
        self.block.nested_block(type_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
    pub deprecated: bool,
}

impl Block {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, type_name: &str) -> Option<&NestedBlock> {
        self.block_types.iter().find(|b| b.type_name == type_name)
    }
}

#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
}

impl Attribute {
    /// True when a change to this attribute forces the resource to be
    /// destroyed and recreated.
    pub fn requires_replace(&self) -> bool {
        self.plan_modifiers.iter().any(|m| m.forces_replacement())
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "plan_modifiers",
                &self
                    .plan_modifiers
                    .iter()
                    .map(|m| m.description())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    /// Zero means unbounded
    pub max_items: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingMode {
    Single,
    List,
    Set,
}

/// Fluent builder for attributes. ALWAYS use this instead of constructing
/// `Attribute` directly.
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                plan_modifiers: Vec::new(),
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn plan_modifier(mut self, modifier: impl PlanModifier + 'static) -> Self {
        self.attribute.plan_modifiers.push(Arc::new(modifier));
        self
    }

    /// Shorthand for `.plan_modifier(RequiresReplaceIfChanged)`
    pub fn force_new(self) -> Self {
        self.plan_modifier(RequiresReplaceIfChanged)
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

pub struct NestedBlockBuilder {
    block: NestedBlock,
}

impl NestedBlockBuilder {
    pub fn new(type_name: &str, nesting: NestingMode) -> Self {
        Self {
            block: NestedBlock {
                type_name: type_name.to_string(),
                block: Block::default(),
                nesting,
                min_items: 0,
                max_items: 0,
            },
        }
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.block.block.attributes.push(attr);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.block.block.description = desc.to_string();
        self
    }

    pub fn min_items(mut self, min: i64) -> Self {
        self.block.min_items = min;
        self
    }

    pub fn max_items(mut self, max: i64) -> Self {
        self.block.max_items = max;
        self
    }

    pub fn build(self) -> NestedBlock {
        self.block
    }
}

/// Fluent builder for schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::default(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.schema.block.block_types.push(block);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_builder_creates_required_force_new_string() {
        let attr = AttributeBuilder::new("subnet_id", AttributeType::String)
            .description("Subnet to create the interface in")
            .required()
            .force_new()
            .build();

        assert_eq!(attr.name, "subnet_id");
        assert!(attr.required);
        assert!(!attr.optional);
        assert!(attr.requires_replace());
        assert_eq!(attr.description, "Subnet to create the interface in");
    }

    #[test]
    fn optional_computed_attribute_does_not_force_replacement() {
        let attr = AttributeBuilder::new(
            "security_groups",
            AttributeType::set_of(AttributeType::String),
        )
        .optional()
        .computed()
        .build();

        assert!(attr.optional && attr.computed);
        assert!(attr.r#type.is_set());
        assert!(!attr.requires_replace());
    }

    #[test]
    fn schema_builder_collects_attributes_and_blocks() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Test resource schema")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("attachment", NestingMode::Set)
                    .attribute(
                        AttributeBuilder::new("instance", AttributeType::String)
                            .required()
                            .build(),
                    )
                    .max_items(1)
                    .build(),
            )
            .build();

        assert_eq!(schema.version, 1);
        assert!(schema.attribute("id").unwrap().computed);
        assert!(schema.attribute("missing").is_none());

        let attachment = schema.nested_block("attachment").unwrap();
        assert_eq!(attachment.nesting, NestingMode::Set);
        assert_eq!(attachment.max_items, 1);
        assert!(attachment.block.attribute("instance").unwrap().required);
    }
}
