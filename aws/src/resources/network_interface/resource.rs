//! `aws_network_interface` resource implementation

use async_trait::async_trait;
use tfplug::plan_modifier::{plan_resource_change, UseStateForUnknown};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ModifyPlanRequest,
    ModifyPlanResponse, ReadResourceRequest, ReadResourceResponse, Resource,
    ResourceWithConfigure, ResourceWithModifyPlan, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{
    AttributeBuilder, AttributeType, NestedBlockBuilder, NestingMode, Schema, SchemaBuilder,
};
use tfplug::state::merge_committed;
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use super::error::NetworkInterfaceError;
use super::lifecycle::NetworkInterfaceLifecycle;
use super::model::{NetworkInterfaceConfig, NetworkInterfaceState};
use crate::api::Ec2Api;
use crate::AwsProviderData;

pub const TYPE_NAME: &str = "aws_network_interface";

#[derive(Default)]
pub struct NetworkInterfaceResource {
    provider_data: Option<AwsProviderData>,
}

impl NetworkInterfaceResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&dyn Ec2Api, Diagnostic> {
        self.provider_data
            .as_ref()
            .map(|data| &*data.client)
            .ok_or_else(|| {
                Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                )
            })
    }
}

fn error_diagnostic(e: &NetworkInterfaceError) -> Diagnostic {
    Diagnostic::error(e.summary(), e.to_string())
}

fn state_id(state: &DynamicValue) -> Option<String> {
    state
        .get_string(&AttributePath::new("id"))
        .ok()
        .filter(|id| !id.is_empty())
}

/// Keeps the known attachment id in the plan while the attachment itself
/// stays the same.
fn carry_attachment_id(prior: &DynamicValue, planned: &mut DynamicValue) -> tfplug::Result<()> {
    let Some(prior_attachment) = NetworkInterfaceState::from_dynamic(prior)?.attachment else {
        return Ok(());
    };

    let element = AttributePath::new("attachment").index(0);
    let instance = planned
        .get(&element.clone().attribute("instance"))
        .ok()
        .and_then(Dynamic::as_str);
    let device_index = planned
        .get(&element.clone().attribute("device_index"))
        .ok()
        .and_then(Dynamic::as_f64);

    if instance == Some(prior_attachment.instance.as_str())
        && device_index == Some(prior_attachment.device_index as f64)
    {
        planned.set_string(
            &element.attribute("attachment_id"),
            prior_attachment.attachment_id,
        )?;
    }
    Ok(())
}

#[async_trait]
impl Resource for NetworkInterfaceResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an elastic network interface and its attachment to an instance")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The network interface ID")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("subnet_id", AttributeType::String)
                    .description("Subnet to create the interface in")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("private_ips", AttributeType::set_of(AttributeType::String))
                    .description("Private IPv4 addresses; the first one listed is the primary")
                    .optional()
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "security_groups",
                    AttributeType::set_of(AttributeType::String),
                )
                .description("Security group IDs; the subnet's default applies when unset")
                .optional()
                .computed()
                .plan_modifier(UseStateForUnknown)
                .build(),
            )
            .attribute(
                AttributeBuilder::new("tags", AttributeType::map_of(AttributeType::String))
                    .description("Tags to assign to the interface")
                    .optional()
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("attachment", NestingMode::Set)
                    .description("Attachment to an instance")
                    .attribute(
                        AttributeBuilder::new("instance", AttributeType::String)
                            .description("ID of the instance to attach to")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("device_index", AttributeType::Number)
                            .description("Device index on the instance")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("attachment_id", AttributeType::String)
                            .computed()
                            .build(),
                    )
                    .max_items(1)
                    .build(),
            )
            .build()
    }

    async fn validate(
        &self,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: NetworkInterfaceConfig::validate(&request.config),
        }
    }

    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics: vec![diag],
                }
            }
        };
        let config = match NetworkInterfaceConfig::from_dynamic(&request.config) {
            Ok(config) => config,
            Err(diags) => {
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics: diags,
                }
            }
        };

        let outcome = match NetworkInterfaceLifecycle::new(client).create(&config).await {
            Ok(outcome) => outcome,
            Err(e) => {
                diagnostics.push(error_diagnostic(&e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        let committed = outcome.update.committed_names();
        let new_state = match outcome.update.result {
            Ok(Some(state)) => state.to_dynamic(),
            Ok(None) => {
                diagnostics.push(Diagnostic::warning(
                    "ENI disappeared",
                    format!(
                        "ENI {} was not found right after creation and was removed from state",
                        outcome.id
                    ),
                ));
                DynamicValue::null()
            }
            Err(e) => {
                // The interface exists, so its id has to be persisted anyway
                diagnostics.push(error_diagnostic(&e));
                let created = NetworkInterfaceState::created(&outcome.id, &config).to_dynamic();
                merge_committed(&created, &request.planned_state, &committed)
            }
        };

        CreateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        let Some(id) = state_id(&request.current_state) else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            };
        };

        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                }
            }
        };

        match NetworkInterfaceLifecycle::new(client).read(&id).await {
            Ok(state) => ReadResourceResponse {
                new_state: state.map(|s| s.to_dynamic()),
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![error_diagnostic(&e)],
            },
        }
    }

    async fn update(&self, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![diag],
                }
            }
        };
        let current = match NetworkInterfaceState::from_dynamic(&request.prior_state) {
            Ok(current) => current,
            Err(e) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![Diagnostic::error("Invalid prior state", e.to_string())],
                }
            }
        };
        let desired = match NetworkInterfaceConfig::from_dynamic(&request.config) {
            Ok(desired) => desired,
            Err(diagnostics) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        };

        let outcome = NetworkInterfaceLifecycle::new(client)
            .update(&current, &desired)
            .await;
        let committed = outcome.committed_names();

        match outcome.result {
            Ok(Some(state)) => UpdateResourceResponse {
                new_state: state.to_dynamic(),
                diagnostics: vec![],
            },
            // Observed gone: the record becomes absent, same as a refresh
            Ok(None) => UpdateResourceResponse {
                new_state: DynamicValue::null(),
                diagnostics: vec![],
            },
            Err(e) => {
                tracing::warn!(
                    "Update of {} failed after committing {:?}",
                    current.id,
                    committed
                );
                UpdateResourceResponse {
                    new_state: merge_committed(
                        &request.prior_state,
                        &request.planned_state,
                        &committed,
                    ),
                    diagnostics: vec![error_diagnostic(&e)],
                }
            }
        }
    }

    async fn delete(&self, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let Some(id) = state_id(&request.prior_state) else {
            return DeleteResourceResponse {
                diagnostics: vec![],
            };
        };

        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diag],
                }
            }
        };

        let diagnostics = match NetworkInterfaceLifecycle::new(client).delete(&id).await {
            Ok(()) => vec![],
            Err(e) => vec![error_diagnostic(&e)],
        };
        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for NetworkInterfaceResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<AwsProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract AwsProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithModifyPlan for NetworkInterfaceResource {
    async fn modify_plan(&self, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let change = plan_resource_change(&self.schema(), &request.prior_state, &request.config);
        let mut planned_state = change.planned_state;
        let mut diagnostics = change.diagnostics;

        if !request.prior_state.is_null() && !planned_state.is_null() {
            if let Err(e) = carry_attachment_id(&request.prior_state, &mut planned_state) {
                diagnostics.push(
                    Diagnostic::warning("Could not plan attachment_id", e.to_string())
                        .with_attribute(AttributePath::new("attachment")),
                );
            }
        }

        ModifyPlanResponse {
            planned_state,
            requires_replace: change.requires_replace,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::NETWORK_INTERFACE_NOT_FOUND;
    use crate::api::fake::FakeEc2;
    use std::any::Any;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn object(pairs: Vec<(&str, Dynamic)>) -> Dynamic {
        Dynamic::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn config_value(instance: &str, device_index: f64) -> DynamicValue {
        DynamicValue::new(object(vec![
            ("subnet_id", Dynamic::from("subnet-1")),
            ("private_ips", Dynamic::from(vec!["10.0.0.5"])),
            ("security_groups", Dynamic::from(vec!["sg-web"])),
            (
                "attachment",
                Dynamic::List(vec![object(vec![
                    ("instance", Dynamic::from(instance)),
                    ("device_index", Dynamic::Number(device_index)),
                ])]),
            ),
            ("tags", object(vec![("Name", Dynamic::from("web"))])),
        ]))
    }

    async fn configured(fake: Arc<FakeEc2>) -> NetworkInterfaceResource {
        let mut resource = NetworkInterfaceResource::new();
        let data: Arc<dyn Any + Send + Sync> = Arc::new(AwsProviderData { client: fake });
        let response = resource
            .configure(ConfigureResourceRequest {
                provider_data: Some(data),
            })
            .await;
        assert!(response.diagnostics.is_empty());
        resource
    }

    async fn plan(
        resource: &NetworkInterfaceResource,
        prior: &DynamicValue,
        config: &DynamicValue,
    ) -> ModifyPlanResponse {
        resource
            .modify_plan(ModifyPlanRequest {
                type_name: TYPE_NAME.to_string(),
                config: config.clone(),
                prior_state: prior.clone(),
            })
            .await
    }

    async fn create(resource: &NetworkInterfaceResource, config: &DynamicValue) -> DynamicValue {
        let planned = plan(resource, &DynamicValue::null(), config).await;
        let response = resource
            .create(CreateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                planned_state: planned.planned_state,
                config: config.clone(),
            })
            .await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        response.new_state
    }

    #[test]
    fn schema_marks_force_new_attributes() {
        let schema = NetworkInterfaceResource::new().schema();
        assert!(schema.attribute("subnet_id").unwrap().requires_replace());
        assert!(schema.attribute("private_ips").unwrap().requires_replace());
        assert!(!schema.attribute("security_groups").unwrap().requires_replace());
        assert!(schema.attribute("security_groups").unwrap().computed);

        let attachment = schema.nested_block("attachment").unwrap();
        assert_eq!(attachment.max_items, 1);
        assert!(attachment.block.attribute("attachment_id").unwrap().computed);
    }

    #[tokio::test]
    async fn unconfigured_resource_reports_diagnostic() {
        let resource = NetworkInterfaceResource::new();
        let response = resource
            .create(CreateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                planned_state: config_value("i-1", 1.0),
                config: config_value("i-1", 1.0),
            })
            .await;
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
        assert!(response.new_state.is_null());
    }

    #[tokio::test]
    async fn configure_rejects_foreign_provider_data() {
        let mut resource = NetworkInterfaceResource::new();
        let data: Arc<dyn Any + Send + Sync> = Arc::new("not provider data".to_string());
        let response = resource
            .configure(ConfigureResourceRequest {
                provider_data: Some(data),
            })
            .await;
        assert_eq!(response.diagnostics[0].summary, "Invalid provider data");
    }

    #[tokio::test]
    async fn validate_points_at_bad_attributes() {
        let resource = NetworkInterfaceResource::new();
        let response = resource
            .validate(ValidateResourceConfigRequest {
                type_name: TYPE_NAME.to_string(),
                config: config_value("i-1", -1.0),
            })
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].attribute.as_ref().unwrap().to_string(),
            "attachment[0].device_index"
        );
    }

    #[tokio::test]
    async fn create_persists_observed_state() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake.clone()).await;

        let state = create(&resource, &config_value("i-1", 1.0)).await;

        let id = state.get_string(&AttributePath::new("id")).unwrap();
        assert!(fake.interface(&id).is_some());
        assert_eq!(
            state
                .get_string_list(&AttributePath::new("security_groups"))
                .unwrap(),
            vec!["sg-web"]
        );
        assert!(!state
            .get_string(&AttributePath::new("attachment").index(0).attribute("attachment_id"))
            .unwrap()
            .is_empty());
        assert_eq!(
            state.get_string_map(&AttributePath::new("tags")).unwrap(),
            BTreeMap::from([("Name".to_string(), "web".to_string())])
        );
    }

    #[tokio::test]
    async fn read_of_deleted_interface_clears_state() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake.clone()).await;
        let state = create(&resource, &config_value("i-1", 1.0)).await;
        let id = state.get_string(&AttributePath::new("id")).unwrap();

        fake.delete_network_interface(&id).await.unwrap();
        let response = resource
            .read(ReadResourceRequest {
                type_name: TYPE_NAME.to_string(),
                current_state: state,
            })
            .await;

        assert!(response.new_state.is_none());
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn update_of_deleted_interface_clears_state() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake.clone()).await;
        let config = config_value("i-1", 1.0);
        let state = create(&resource, &config).await;
        let id = state.get_string(&AttributePath::new("id")).unwrap();

        fake.delete_network_interface(&id).await.unwrap();
        let planned = plan(&resource, &state, &config).await;
        let response = resource
            .update(UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: state,
                planned_state: planned.planned_state,
                config,
            })
            .await;

        assert!(response.new_state.is_null());
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    }

    #[tokio::test]
    async fn create_of_interface_gone_before_refresh_leaves_no_state() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake.clone()).await;
        fake.fail_on("DescribeNetworkInterfaces", NETWORK_INTERFACE_NOT_FOUND);

        let config = config_value("i-1", 1.0);
        let planned = plan(&resource, &DynamicValue::null(), &config).await;
        let response = resource
            .create(CreateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                planned_state: planned.planned_state,
                config,
            })
            .await;

        assert!(response.new_state.is_null());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(!response.diagnostics[0].is_error());
    }

    #[tokio::test]
    async fn empty_security_groups_leave_groups_alone() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake.clone()).await;
        let state = create(&resource, &config_value("i-1", 1.0)).await;
        fake.clear_calls();

        let mut config = config_value("i-1", 1.0);
        config
            .set_list(&AttributePath::new("security_groups"), vec![])
            .unwrap();
        let planned = plan(&resource, &state, &config).await;
        let response = resource
            .update(UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: state,
                planned_state: planned.planned_state,
                config,
            })
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(fake.calls(), vec!["DescribeNetworkInterfaces"]);
        assert_eq!(
            response
                .new_state
                .get_string_list(&AttributePath::new("security_groups"))
                .unwrap(),
            vec!["sg-web"]
        );
    }

    #[tokio::test]
    async fn read_failure_keeps_current_state() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake.clone()).await;
        let state = create(&resource, &config_value("i-1", 1.0)).await;
        fake.fail_on("DescribeNetworkInterfaces", "InternalError");

        let response = resource
            .read(ReadResourceRequest {
                type_name: TYPE_NAME.to_string(),
                current_state: state.clone(),
            })
            .await;

        assert_eq!(response.new_state, Some(state));
        assert_eq!(response.diagnostics[0].summary, "Error retrieving ENI");
    }

    #[tokio::test]
    async fn plan_keeps_attachment_id_for_unchanged_attachment() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake).await;
        let config = config_value("i-1", 1.0);
        let state = create(&resource, &config).await;
        let attachment_id = AttributePath::new("attachment").index(0).attribute("attachment_id");

        let unchanged = plan(&resource, &state, &config).await;
        assert!(unchanged.requires_replace.is_empty());
        assert_eq!(
            unchanged.planned_state.get_string(&attachment_id).unwrap(),
            state.get_string(&attachment_id).unwrap()
        );
        assert_eq!(unchanged.planned_state, state);

        let moved = plan(&resource, &state, &config_value("i-2", 1.0)).await;
        assert!(moved.requires_replace.is_empty());
        assert!(moved.planned_state.get(&attachment_id).unwrap().is_unknown());
    }

    #[tokio::test]
    async fn changing_subnet_requires_replacement() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake).await;
        let state = create(&resource, &config_value("i-1", 1.0)).await;

        let mut config = config_value("i-1", 1.0);
        config
            .set_string(&AttributePath::new("subnet_id"), "subnet-2".to_string())
            .unwrap();
        let planned = plan(&resource, &state, &config).await;

        assert_eq!(planned.requires_replace, vec![AttributePath::new("subnet_id")]);
    }

    #[tokio::test]
    async fn failed_update_persists_only_committed_attributes() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake.clone()).await;
        let state = create(&resource, &config_value("i-1", 1.0)).await;
        fake.fail_on("ModifyNetworkInterfaceAttribute", "InvalidGroup.NotFound");

        let mut config = config_value("i-2", 0.0);
        config
            .set_list(
                &AttributePath::new("security_groups"),
                vec![Dynamic::from("sg-missing")],
            )
            .unwrap();
        let planned = plan(&resource, &state, &config).await;

        let response = resource
            .update(UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: state.clone(),
                planned_state: planned.planned_state,
                config,
            })
            .await;

        assert_eq!(response.diagnostics[0].summary, "Failure updating ENI");
        let element = AttributePath::new("attachment").index(0);
        assert_eq!(
            response
                .new_state
                .get_string(&element.clone().attribute("instance"))
                .unwrap(),
            "i-2"
        );
        assert!(response
            .new_state
            .get(&element.attribute("attachment_id"))
            .unwrap()
            .is_null());
        assert_eq!(
            response
                .new_state
                .get_string_list(&AttributePath::new("security_groups"))
                .unwrap(),
            vec!["sg-web"]
        );
    }

    #[tokio::test]
    async fn delete_failure_is_reported() {
        let fake = Arc::new(FakeEc2::new());
        let resource = configured(fake.clone()).await;
        let state = create(&resource, &config_value("i-1", 1.0)).await;
        fake.fail_on("DeleteNetworkInterface", "InvalidNetworkInterface.InUse");

        let response = resource
            .delete(DeleteResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: state,
            })
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Error deleting ENI");
    }
}
