//! The application's logical RPC handlers.
//!
//! Every operation resolves the acting user through the identity provider
//! first. Mutations without an identity fail with `Unauthorized`; queries
//! degrade to empty results instead. Reads and writes of user-owned records
//! check ownership, and a foreign-owned record answers exactly like a
//! missing one.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::catalog::{CareerTemplate, TemplateCatalog};
use crate::error::{ServiceError, ServiceResult};
use crate::identity::IdentityProvider;
use crate::recommend::recommend;
use crate::roadmap::{self, StepState};
use crate::storage::Storage;
use crate::types::{
    Assessment, AssessmentAnswers, Goal, Profile, Roadmap, RoadmapStatus, Step, UserId,
};

/// A step together with its derived state.
#[derive(Clone, Debug, Serialize)]
pub struct StepView {
    #[serde(flatten)]
    pub step: Step,
    pub state: StepState,
}

/// Roadmap as handed to clients: the stored record plus the derived
/// per-step states and progress counts clients need to gate locked steps.
#[derive(Clone, Debug, Serialize)]
pub struct RoadmapView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: RoadmapStatus,
    pub skills: Vec<String>,
    pub steps: Vec<StepView>,
    pub completed_steps: usize,
    pub total_steps: usize,
}

impl From<Roadmap> for RoadmapView {
    fn from(roadmap: Roadmap) -> Self {
        let states = roadmap::step_states(&roadmap.steps);
        let (completed_steps, total_steps) = roadmap::progress(&roadmap.steps);
        Self {
            id: roadmap.id,
            title: roadmap.title,
            description: roadmap.description,
            status: roadmap.status,
            skills: roadmap.skills,
            steps: roadmap
                .steps
                .into_iter()
                .zip(states)
                .map(|(step, state)| StepView { step, state })
                .collect(),
            completed_steps,
            total_steps,
        }
    }
}

/// Result of the full assessment flow.
#[derive(Clone, Debug, Serialize)]
pub struct AssessmentOutcome {
    pub assessment_id: String,
    pub recommended_career: String,
    /// Absent when the recommended key had no template; the audit record is
    /// written regardless.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roadmap_id: Option<String>,
}

/// Catalog slice for template browsing.
#[derive(Clone, Debug, Serialize)]
pub struct TemplateListing {
    pub templates: Vec<CareerTemplate>,
    pub skills: Vec<String>,
}

pub struct CareerService {
    storage: Arc<Mutex<Storage>>,
    identity: Arc<dyn IdentityProvider>,
    catalog: TemplateCatalog,
}

impl CareerService {
    pub fn new(
        storage: Arc<Mutex<Storage>>,
        identity: Arc<dyn IdentityProvider>,
        catalog: TemplateCatalog,
    ) -> Self {
        Self {
            storage,
            identity,
            catalog,
        }
    }

    fn require_user(&self) -> ServiceResult<UserId> {
        self.identity
            .current_user_id()
            .ok_or(ServiceError::Unauthorized)
    }

    async fn persist(&self) -> ServiceResult<()> {
        let (path, data) = self.storage.lock().await.snapshot_for_save();
        Storage::save_snapshot_async(path, data).await?;
        Ok(())
    }

    // assessments

    /// Record a completed quiz as an immutable audit row and, the first time
    /// only, adopt the recommendation as the user's target role.
    pub async fn submit_assessment(
        &self,
        answers: &AssessmentAnswers,
        recommended_career: &str,
    ) -> ServiceResult<String> {
        let user_id = self.require_user()?;
        let answers_json = serde_json::to_string(answers)?;

        let assessment = {
            let mut storage = self.storage.lock().await;
            let assessment =
                storage.insert_assessment(&user_id, answers_json, recommended_career.to_string());
            storage.set_target_role_if_unset(&user_id, recommended_career);
            assessment
        };
        self.persist().await?;

        info!(career = recommended_career, "assessment recorded");
        Ok(assessment.id)
    }

    pub async fn get_assessments(&self) -> ServiceResult<Vec<Assessment>> {
        let Some(user_id) = self.identity.current_user_id() else {
            return Ok(Vec::new());
        };
        Ok(self.storage.lock().await.assessments_by_user(&user_id))
    }

    /// The whole quiz flow: recommend, record the audit row, materialize the
    /// matching roadmap. A recommendation without a template silently skips
    /// the roadmap.
    pub async fn take_assessment(
        &self,
        answers: &AssessmentAnswers,
    ) -> ServiceResult<AssessmentOutcome> {
        let user_id = self.require_user()?;
        let career = recommend(answers);
        let assessment_id = self.submit_assessment(answers, career).await?;

        let roadmap_id = match self.catalog.get(career) {
            Some(template) => Some(self.materialize(&user_id, template).await?),
            None => None,
        };

        Ok(AssessmentOutcome {
            assessment_id,
            recommended_career: career.to_string(),
            roadmap_id,
        })
    }

    // roadmaps

    /// Archive whatever was active, then insert the new roadmap as active.
    /// These are two separate store writes, not a transaction: a concurrent
    /// create for the same user can land between them and leave two active
    /// roadmaps. Known and accepted; see DESIGN.md.
    async fn create_roadmap_for(
        &self,
        user_id: &str,
        title: String,
        description: String,
        steps: Vec<Step>,
        skills: Vec<String>,
    ) -> ServiceResult<String> {
        {
            let mut storage = self.storage.lock().await;
            let active = storage.active_roadmaps_by_user(user_id);
            for existing in &active {
                storage.set_roadmap_status(&existing.id, RoadmapStatus::Archived)?;
            }
            if !active.is_empty() {
                debug!(count = active.len(), "archived active roadmaps");
            }
        }
        self.persist().await?;

        let roadmap = {
            let mut storage = self.storage.lock().await;
            storage.insert_roadmap(user_id, title, description, steps, skills)
        };
        self.persist().await?;

        info!(roadmap_id = %roadmap.id, "roadmap created");
        Ok(roadmap.id)
    }

    async fn materialize(&self, user_id: &str, template: &CareerTemplate) -> ServiceResult<String> {
        let steps = roadmap::expand_steps(template);
        self.create_roadmap_for(
            user_id,
            template.title.clone(),
            template.description.clone(),
            steps,
            template.skills.clone(),
        )
        .await
    }

    pub async fn create_roadmap(
        &self,
        title: String,
        description: String,
        steps: Vec<Step>,
        skills: Vec<String>,
    ) -> ServiceResult<String> {
        let user_id = self.require_user()?;
        self.create_roadmap_for(&user_id, title, description, steps, skills)
            .await
    }

    /// Materialize a roadmap straight from the catalog. Unlike the
    /// assessment flow, an unknown key is an error here.
    pub async fn switch_template(&self, career: &str) -> ServiceResult<String> {
        let user_id = self.require_user()?;
        let template = self
            .catalog
            .get(career)
            .ok_or_else(|| ServiceError::UnknownTemplate(career.to_string()))?;
        self.materialize(&user_id, template).await
    }

    pub async fn get_active_roadmap(&self) -> ServiceResult<Option<RoadmapView>> {
        let Some(user_id) = self.identity.current_user_id() else {
            return Ok(None);
        };
        let roadmap = self.storage.lock().await.active_roadmap_by_user(&user_id);
        Ok(roadmap.map(RoadmapView::from))
    }

    /// Flip one step's completion flag. Ownership-checked; lock state is
    /// not enforced here — a toggle against a locked step succeeds, and
    /// clients gate on the derived states they get from reads.
    pub async fn toggle_step(&self, roadmap_id: &str, step_id: &str) -> ServiceResult<()> {
        let user_id = self.require_user()?;
        {
            let mut storage = self.storage.lock().await;
            let roadmap = storage.get_roadmap(roadmap_id).ok_or(ServiceError::NotFound)?;
            if roadmap.user_id != user_id {
                return Err(ServiceError::NotFound);
            }
            let mut steps = roadmap.steps;
            roadmap::toggle_flag(&mut steps, step_id);
            storage.set_roadmap_steps(roadmap_id, steps)?;
        }
        self.persist().await
    }

    // goals

    pub async fn add_goal(&self, title: String, deadline: Option<String>) -> ServiceResult<Goal> {
        let user_id = self.require_user()?;
        let goal = {
            let mut storage = self.storage.lock().await;
            storage.insert_goal(&user_id, title, deadline)
        };
        self.persist().await?;
        Ok(goal)
    }

    pub async fn toggle_goal(&self, goal_id: &str) -> ServiceResult<Goal> {
        let user_id = self.require_user()?;
        let updated = {
            let mut storage = self.storage.lock().await;
            let goal = storage.get_goal(goal_id).ok_or(ServiceError::NotFound)?;
            if goal.user_id != user_id {
                return Err(ServiceError::NotFound);
            }
            storage.set_goal_completed(goal_id, !goal.is_completed)?
        };
        self.persist().await?;
        Ok(updated)
    }

    pub async fn delete_goal(&self, goal_id: &str) -> ServiceResult<()> {
        let user_id = self.require_user()?;
        {
            let mut storage = self.storage.lock().await;
            let goal = storage.get_goal(goal_id).ok_or(ServiceError::NotFound)?;
            if goal.user_id != user_id {
                return Err(ServiceError::NotFound);
            }
            storage.delete_goal(goal_id)?;
        }
        self.persist().await
    }

    pub async fn get_goals(&self) -> ServiceResult<Vec<Goal>> {
        let Some(user_id) = self.identity.current_user_id() else {
            return Ok(Vec::new());
        };
        Ok(self.storage.lock().await.goals_by_user(&user_id))
    }

    // catalog & profile

    /// Browse the shipped templates. Static configuration, so no identity
    /// required.
    pub fn list_templates(&self, search: Option<&str>, skills: &[String]) -> TemplateListing {
        TemplateListing {
            templates: self
                .catalog
                .filter(search, skills)
                .into_iter()
                .cloned()
                .collect(),
            skills: self.catalog.skills(),
        }
    }

    pub async fn get_profile(&self) -> ServiceResult<Option<Profile>> {
        let Some(user_id) = self.identity.current_user_id() else {
            return Ok(None);
        };
        Ok(self.storage.lock().await.profile(&user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DATA_SCIENTIST, SOFTWARE_ENGINEER, UX_DESIGNER};
    use crate::identity::{Anonymous, FixedIdentity};
    use crate::types::{Interest, Strength, WorkEnvironment};
    use tempfile::tempdir;

    fn shared_storage(dir: &tempfile::TempDir) -> Arc<Mutex<Storage>> {
        let mut storage = Storage::new(dir.path().join("data.json"));
        storage.initialize().unwrap();
        Arc::new(Mutex::new(storage))
    }

    fn service_as(storage: &Arc<Mutex<Storage>>, user: &str) -> CareerService {
        CareerService::new(
            Arc::clone(storage),
            Arc::new(FixedIdentity::new(user)),
            TemplateCatalog::builtin(),
        )
    }

    fn anonymous_service(storage: &Arc<Mutex<Storage>>) -> CareerService {
        CareerService::new(
            Arc::clone(storage),
            Arc::new(Anonymous),
            TemplateCatalog::builtin(),
        )
    }

    fn analyzing_answers() -> AssessmentAnswers {
        AssessmentAnswers {
            interest: Interest::Analyzing,
            environment: WorkEnvironment::Remote,
            strength: Strength::Logic,
        }
    }

    #[tokio::test]
    async fn assessment_flow_materializes_the_recommended_roadmap() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let outcome = service.take_assessment(&analyzing_answers()).await.unwrap();
        assert_eq!(outcome.recommended_career, DATA_SCIENTIST);
        assert!(outcome.roadmap_id.is_some());

        let view = service.get_active_roadmap().await.unwrap().unwrap();
        assert_eq!(view.title, "Data Scientist Path");
        assert_eq!(view.total_steps, 5);
        assert_eq!(view.completed_steps, 0);
        assert_eq!(view.steps[0].step.title, "Learn Python");
        assert!(view.steps.iter().all(|s| !s.step.is_completed));

        assert_eq!(view.steps[0].state, StepState::Unlocked);
        for step in &view.steps[1..] {
            assert_eq!(step.state, StepState::Locked);
        }
    }

    #[tokio::test]
    async fn assessment_flow_writes_the_audit_record_and_target_role() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        service.take_assessment(&analyzing_answers()).await.unwrap();

        let assessments = service.get_assessments().await.unwrap();
        assert_eq!(assessments.len(), 1);
        assert_eq!(assessments[0].recommended_career, DATA_SCIENTIST);
        let recorded: AssessmentAnswers = serde_json::from_str(&assessments[0].answers).unwrap();
        assert_eq!(recorded, analyzing_answers());

        let profile = service.get_profile().await.unwrap().unwrap();
        assert_eq!(profile.target_role.as_deref(), Some(DATA_SCIENTIST));

        // A later assessment never overwrites the target role.
        let creative = AssessmentAnswers {
            interest: Interest::Designing,
            environment: WorkEnvironment::Hybrid,
            strength: Strength::Creativity,
        };
        service.take_assessment(&creative).await.unwrap();
        let profile = service.get_profile().await.unwrap().unwrap();
        assert_eq!(profile.target_role.as_deref(), Some(DATA_SCIENTIST));
    }

    #[tokio::test]
    async fn assessments_list_newest_first() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let first = service
            .submit_assessment(&analyzing_answers(), UX_DESIGNER)
            .await
            .unwrap();
        let second = service
            .submit_assessment(&analyzing_answers(), DATA_SCIENTIST)
            .await
            .unwrap();

        let listed = service.get_assessments().await.unwrap();
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
    }

    #[tokio::test]
    async fn completing_a_step_unlocks_its_successor_and_undoing_relocks_it() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let roadmap_id = service.switch_template(DATA_SCIENTIST).await.unwrap();
        let view = service.get_active_roadmap().await.unwrap().unwrap();
        let step0 = view.steps[0].step.id.clone();

        service.toggle_step(&roadmap_id, &step0).await.unwrap();
        let view = service.get_active_roadmap().await.unwrap().unwrap();
        assert_eq!(view.steps[0].state, StepState::Completed);
        assert_eq!(view.steps[1].state, StepState::Unlocked);
        assert_eq!(view.completed_steps, 1);

        service.toggle_step(&roadmap_id, &step0).await.unwrap();
        let view = service.get_active_roadmap().await.unwrap().unwrap();
        assert_eq!(view.steps[0].state, StepState::Unlocked);
        assert_eq!(view.steps[1].state, StepState::Locked);
        assert_eq!(view.completed_steps, 0);
    }

    #[tokio::test]
    async fn toggling_a_locked_step_is_permitted() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let roadmap_id = service.switch_template(SOFTWARE_ENGINEER).await.unwrap();
        let view = service.get_active_roadmap().await.unwrap().unwrap();
        let locked_step = view.steps[2].step.id.clone();
        assert_eq!(view.steps[2].state, StepState::Locked);

        service.toggle_step(&roadmap_id, &locked_step).await.unwrap();
        let view = service.get_active_roadmap().await.unwrap().unwrap();
        assert!(view.steps[2].step.is_completed);
        // Still reads as locked: its predecessor is incomplete.
        assert_eq!(view.steps[2].state, StepState::Locked);
    }

    #[tokio::test]
    async fn toggle_flips_only_the_named_step() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let roadmap_id = service.switch_template(DATA_SCIENTIST).await.unwrap();
        let view = service.get_active_roadmap().await.unwrap().unwrap();
        let target = view.steps[1].step.id.clone();

        service.toggle_step(&roadmap_id, &target).await.unwrap();
        let after = service.get_active_roadmap().await.unwrap().unwrap();
        for (i, step) in after.steps.iter().enumerate() {
            assert_eq!(step.step.is_completed, i == 1);
        }
    }

    #[tokio::test]
    async fn switching_templates_archives_the_previous_roadmap() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let first = service.switch_template(SOFTWARE_ENGINEER).await.unwrap();
        let second = service.switch_template(DATA_SCIENTIST).await.unwrap();

        let active = service.get_active_roadmap().await.unwrap().unwrap();
        assert_eq!(active.id, second);

        let all = storage.lock().await.roadmaps_by_user("user-a");
        assert_eq!(all.len(), 2);
        let archived: Vec<_> = all
            .iter()
            .filter(|r| r.status == RoadmapStatus::Archived)
            .collect();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, first);
    }

    #[tokio::test]
    async fn each_rematerialization_archives_exactly_one_more() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        for _ in 0..3 {
            service.switch_template(UX_DESIGNER).await.unwrap();
        }

        let all = storage.lock().await.roadmaps_by_user("user-a");
        let active = all
            .iter()
            .filter(|r| r.status == RoadmapStatus::Active)
            .count();
        let archived = all
            .iter()
            .filter(|r| r.status == RoadmapStatus::Archived)
            .count();
        assert_eq!(active, 1);
        assert_eq!(archived, 2);
    }

    #[tokio::test]
    async fn switching_to_an_unknown_template_fails() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let err = service.switch_template("Astronaut").await.unwrap_err();
        assert!(matches!(err, ServiceError::UnknownTemplate(_)));
    }

    #[tokio::test]
    async fn goals_flow() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let goal = service
            .add_goal("Finish the SQL course".to_string(), None)
            .await
            .unwrap();
        assert!(!goal.is_completed);

        let toggled = service.toggle_goal(&goal.id).await.unwrap();
        assert!(toggled.is_completed);
        let toggled = service.toggle_goal(&goal.id).await.unwrap();
        assert!(!toggled.is_completed);

        service.delete_goal(&goal.id).await.unwrap();
        assert!(service.get_goals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_records_answer_exactly_like_missing_ones() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let owner = service_as(&storage, "user-a");
        let intruder = service_as(&storage, "user-b");

        let roadmap_id = owner.switch_template(DATA_SCIENTIST).await.unwrap();
        let step_id = owner.get_active_roadmap().await.unwrap().unwrap().steps[0]
            .step
            .id
            .clone();
        let goal = owner.add_goal("private".to_string(), None).await.unwrap();

        let foreign_toggle = intruder.toggle_step(&roadmap_id, &step_id).await.unwrap_err();
        let missing_toggle = intruder.toggle_step("no-such-id", &step_id).await.unwrap_err();
        assert!(matches!(foreign_toggle, ServiceError::NotFound));
        assert!(matches!(missing_toggle, ServiceError::NotFound));
        assert_eq!(foreign_toggle.to_string(), missing_toggle.to_string());

        let foreign_goal = intruder.toggle_goal(&goal.id).await.unwrap_err();
        let missing_goal = intruder.toggle_goal("no-such-id").await.unwrap_err();
        assert!(matches!(foreign_goal, ServiceError::NotFound));
        assert!(matches!(missing_goal, ServiceError::NotFound));

        let foreign_delete = intruder.delete_goal(&goal.id).await.unwrap_err();
        assert!(matches!(foreign_delete, ServiceError::NotFound));

        // Nothing leaked across users, and nothing was changed.
        assert!(intruder.get_active_roadmap().await.unwrap().is_none());
        assert!(intruder.get_goals().await.unwrap().is_empty());
        assert!(!owner.get_goals().await.unwrap()[0].is_completed);
    }

    #[tokio::test]
    async fn anonymous_mutations_fail_and_queries_degrade() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = anonymous_service(&storage);

        let err = service.add_goal("nope".to_string(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        let err = service.take_assessment(&analyzing_answers()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        let err = service
            .create_roadmap("t".to_string(), "d".to_string(), Vec::new(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        let err = service.toggle_step("r", "s").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));

        assert!(service.get_goals().await.unwrap().is_empty());
        assert!(service.get_assessments().await.unwrap().is_empty());
        assert!(service.get_active_roadmap().await.unwrap().is_none());
        assert!(service.get_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn caller_supplied_steps_survive_create_roadmap() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let steps = vec![
            Step {
                id: "custom-1".to_string(),
                title: "Read the handbook".to_string(),
                description: "Cover to cover.".to_string(),
                is_completed: false,
            },
            Step {
                id: "custom-2".to_string(),
                title: "Shadow a mentor".to_string(),
                description: String::new(),
                is_completed: false,
            },
        ];
        let roadmap_id = service
            .create_roadmap(
                "Custom Path".to_string(),
                "Hand-rolled".to_string(),
                steps,
                vec!["Networking".to_string()],
            )
            .await
            .unwrap();

        let view = service.get_active_roadmap().await.unwrap().unwrap();
        assert_eq!(view.id, roadmap_id);
        assert_eq!(view.steps[0].step.id, "custom-1");
        assert_eq!(view.steps[1].state, StepState::Locked);
    }

    #[tokio::test]
    async fn template_listing_filters_and_reports_skills() {
        let dir = tempdir().unwrap();
        let storage = shared_storage(&dir);
        let service = service_as(&storage, "user-a");

        let listing = service.list_templates(Some("data"), &[]);
        assert_eq!(listing.templates.len(), 1);
        assert_eq!(listing.templates[0].key, DATA_SCIENTIST);
        assert!(listing.skills.contains(&"Figma".to_string()));
    }
}
