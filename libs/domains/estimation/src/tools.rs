//! Tool discovery
//!
//! Describes the callable estimation operations and their input schemas for
//! agent clients.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

/// A node of a tool input schema, rendered as JSON Schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object {
        properties: Vec<(String, SchemaNode)>,
        required: Vec<String>,
    },
    Array {
        description: String,
        items: Option<Box<SchemaNode>>,
    },
    String {
        description: String,
        default: Option<String>,
    },
    Integer {
        description: String,
        minimum: Option<i64>,
        default: Option<i64>,
    },
    Enum {
        description: String,
        values: Vec<String>,
        default: Option<String>,
    },
}

impl SchemaNode {
    pub fn object<I, K>(properties: I, required: &[&str]) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        SchemaNode::Object {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            required: required.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn string(description: &str) -> Self {
        SchemaNode::String {
            description: description.to_string(),
            default: None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SchemaNode::Object {
                properties,
                required,
            } => {
                let properties: Map<String, Value> = properties
                    .iter()
                    .map(|(name, node)| (name.clone(), node.to_json()))
                    .collect();
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                })
            }
            SchemaNode::Array { description, items } => {
                let mut node = json!({ "type": "array", "description": description });
                if let Some(items) = items {
                    node["items"] = items.to_json();
                }
                node
            }
            SchemaNode::String {
                description,
                default,
            } => {
                let mut node = json!({ "type": "string", "description": description });
                if let Some(default) = default {
                    node["default"] = json!(default);
                }
                node
            }
            SchemaNode::Integer {
                description,
                minimum,
                default,
            } => {
                let mut node = json!({ "type": "integer", "description": description });
                if let Some(minimum) = minimum {
                    node["minimum"] = json!(minimum);
                }
                if let Some(default) = default {
                    node["default"] = json!(default);
                }
                node
            }
            SchemaNode::Enum {
                description,
                values,
                default,
            } => {
                let mut node = json!({
                    "type": "string",
                    "enum": values,
                    "description": description,
                });
                if let Some(default) = default {
                    node["default"] = json!(default);
                }
                node
            }
        }
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[schema(value_type = Object)]
    pub input_schema: SchemaNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ToolsListResponse {
    pub tools: Vec<ToolDescriptor>,
}

pub const EXTRACT_RESOURCES_TOOL: &str = "extract_azure_resources_from_diagram";
pub const GET_PRICING_TOOL: &str = "get_azure_resource_pricing";
pub const CALCULATE_COST_TOOL: &str = "calculate_total_cost";

fn resource_descriptor_schema() -> SchemaNode {
    SchemaNode::object(
        [
            ("serviceName", SchemaNode::string("Catalog service name, e.g. Virtual Machines")),
            ("skuName", SchemaNode::string("ARM SKU name, e.g. Standard_D2s_v3")),
            (
                "region",
                SchemaNode::String {
                    description: "ARM region code".to_string(),
                    default: Some(crate::models::DEFAULT_REGION.to_string()),
                },
            ),
            (
                "quantity",
                SchemaNode::Integer {
                    description: "Number of instances".to_string(),
                    minimum: Some(1),
                    default: Some(1),
                },
            ),
            ("notes", SchemaNode::string("Optional free-form notes")),
        ],
        &["serviceName"],
    )
}

/// Every operation exposed to agent clients
pub fn available_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: EXTRACT_RESOURCES_TOOL.to_string(),
            description: "Analyzes an architecture diagram image and extracts a list of Azure resources present in the architecture. Returns a structured list of Azure services with their types and suggested quantities/configurations.".to_string(),
            input_schema: SchemaNode::object(
                [
                    (
                        "imageData",
                        SchemaNode::string("Base64-encoded image data or URL of the architecture diagram"),
                    ),
                    (
                        "imageType",
                        SchemaNode::Enum {
                            description: "Type of image input (base64 or url)".to_string(),
                            values: vec!["base64".to_string(), "url".to_string()],
                            default: Some("base64".to_string()),
                        },
                    ),
                ],
                &["imageData"],
            ),
        },
        ToolDescriptor {
            name: GET_PRICING_TOOL.to_string(),
            description: "Gets pricing information for specified Azure resources using the Azure Retail Prices API. Returns detailed pricing for each resource including per-hour, per-month rates, and currency information.".to_string(),
            input_schema: SchemaNode::object(
                [(
                    "resources",
                    SchemaNode::Array {
                        description: "List of Azure resources to get pricing for".to_string(),
                        items: Some(Box::new(resource_descriptor_schema())),
                    },
                )],
                &["resources"],
            ),
        },
        ToolDescriptor {
            name: CALCULATE_COST_TOOL.to_string(),
            description: "Calculates total monthly and yearly costs for a list of Azure resources with pricing. Takes pricing data from get_azure_resource_pricing and computes totals.".to_string(),
            input_schema: SchemaNode::object(
                [(
                    "pricingData",
                    SchemaNode::Array {
                        description: "Array of resources with pricing information".to_string(),
                        items: None,
                    },
                )],
                &["pricingData"],
            ),
        },
    ]
}
