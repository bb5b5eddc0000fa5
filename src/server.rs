use std::sync::Arc;

use rmcp::RoleServer;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::service::CareerService;
use crate::types::{AssessmentAnswers, Step};

// Tool argument types

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct TakeAssessmentArgs {
    pub answers: AssessmentAnswers,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct SubmitAssessmentArgs {
    pub answers: AssessmentAnswers,
    pub recommended_career: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct CreateRoadmapArgs {
    pub title: String,
    pub description: String,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct ToggleStepArgs {
    pub roadmap_id: String,
    pub step_id: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct SwitchTemplateArgs {
    /// Career key, e.g. "Data Scientist".
    pub career: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct ListTemplatesArgs {
    #[serde(default)]
    pub search: Option<String>,
    /// Only templates carrying every listed skill are returned.
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct AddGoalArgs {
    pub title: String,
    /// RFC3339 timestamp.
    #[serde(default)]
    pub deadline: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct GoalIdArgs {
    pub goal_id: String,
}

#[derive(Clone)]
pub struct CareerPathServer {
    service: Arc<CareerService>,
    tool_router: ToolRouter<CareerPathServer>,
}

#[tool_router]
impl CareerPathServer {
    pub fn new(service: Arc<CareerService>) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Take the career quiz: recommends a career, records the assessment, and generates the matching roadmap")]
    async fn take_assessment(
        &self,
        Parameters(args): Parameters<TakeAssessmentArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let outcome = self.service.take_assessment(&args.answers).await?;
        Ok(CallToolResult::structured(json!(outcome)))
    }

    #[tool(description = "Record a completed assessment with a precomputed recommendation")]
    async fn submit_assessment(
        &self,
        Parameters(args): Parameters<SubmitAssessmentArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let assessment_id = self
            .service
            .submit_assessment(&args.answers, &args.recommended_career)
            .await?;
        Ok(CallToolResult::structured(
            json!({ "assessment_id": assessment_id }),
        ))
    }

    #[tool(description = "List the caller's past assessments, newest first")]
    async fn get_assessments(&self) -> Result<CallToolResult, ErrorData> {
        let assessments = self.service.get_assessments().await?;
        Ok(CallToolResult::structured(
            json!({ "assessments": assessments }),
        ))
    }

    #[tool(description = "Create a roadmap from explicit steps; any previously active roadmap is archived")]
    async fn create_roadmap(
        &self,
        Parameters(args): Parameters<CreateRoadmapArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let roadmap_id = self
            .service
            .create_roadmap(
                args.title,
                args.description,
                args.steps,
                args.skills.unwrap_or_default(),
            )
            .await?;
        Ok(CallToolResult::structured(json!({ "roadmap_id": roadmap_id })))
    }

    #[tool(description = "Switch to a career template from the catalog; archives the current roadmap")]
    async fn switch_template(
        &self,
        Parameters(args): Parameters<SwitchTemplateArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let roadmap_id = self.service.switch_template(&args.career).await?;
        Ok(CallToolResult::structured(json!({ "roadmap_id": roadmap_id })))
    }

    #[tool(description = "Get the caller's active roadmap with derived step states and progress")]
    async fn get_active_roadmap(&self) -> Result<CallToolResult, ErrorData> {
        let roadmap = self.service.get_active_roadmap().await?;
        Ok(CallToolResult::structured(json!({ "roadmap": roadmap })))
    }

    #[tool(description = "Toggle one roadmap step's completion flag")]
    async fn toggle_step(
        &self,
        Parameters(args): Parameters<ToggleStepArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.service
            .toggle_step(&args.roadmap_id, &args.step_id)
            .await?;
        Ok(CallToolResult::structured(json!({ "ok": true })))
    }

    #[tool(description = "Browse career templates, optionally filtered by search term and skills")]
    async fn list_templates(
        &self,
        Parameters(args): Parameters<ListTemplatesArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let listing = self
            .service
            .list_templates(args.search.as_deref(), &args.skills);
        Ok(CallToolResult::structured(json!(listing)))
    }

    #[tool(description = "Add a personal goal")]
    async fn add_goal(
        &self,
        Parameters(args): Parameters<AddGoalArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let goal = self.service.add_goal(args.title, args.deadline).await?;
        Ok(CallToolResult::structured(json!({ "goal": goal })))
    }

    #[tool(description = "Toggle a goal's completion flag")]
    async fn toggle_goal(
        &self,
        Parameters(args): Parameters<GoalIdArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let goal = self.service.toggle_goal(&args.goal_id).await?;
        Ok(CallToolResult::structured(json!({ "goal": goal })))
    }

    #[tool(description = "Delete a goal")]
    async fn delete_goal(
        &self,
        Parameters(args): Parameters<GoalIdArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        self.service.delete_goal(&args.goal_id).await?;
        Ok(CallToolResult::structured(json!({ "ok": true })))
    }

    #[tool(description = "List the caller's goals")]
    async fn get_goals(&self) -> Result<CallToolResult, ErrorData> {
        let goals = self.service.get_goals().await?;
        Ok(CallToolResult::structured(json!({ "goals": goals })))
    }

    #[tool(description = "Get the caller's career profile")]
    async fn get_profile(&self) -> Result<CallToolResult, ErrorData> {
        let profile = self.service.get_profile().await?;
        Ok(CallToolResult::structured(json!({ "profile": profile })))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for CareerPathServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Career guidance server - take the assessment, then work the roadmap step by step"
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: rmcp::service::RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: vec![
                RawResource::new("careerpath://templates", "Career Templates").no_annotation(),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _ctx: rmcp::service::RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        match uri.as_str() {
            "careerpath://templates" => {
                let listing = self.service.list_templates(None, &[]);
                let text = serde_json::to_string_pretty(&listing)
                    .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(text, uri)],
                })
            }
            _ => Err(ErrorData::resource_not_found(
                "Unknown resource URI",
                Some(json!({ "uri": uri })),
            )),
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: rmcp::service::RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            resource_templates: Vec::new(),
        })
    }
}
