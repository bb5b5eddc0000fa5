//! JSON-file document store.
//!
//! Tables live in one serialized [`StorageData`] document. Record tables are
//! append-order `Vec`s, so plain iteration is insertion order and reverse
//! iteration is reverse-chronological — the two orderings the queries need.
//! Mutations edit memory only; callers persist explicitly via `save` or the
//! snapshot/save-async pair.

use chrono::Utc;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;
use thiserror::Error;
use ulid::Ulid;

use crate::types::{Assessment, Goal, Profile, Roadmap, RoadmapStatus, Step, UserId};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Roadmap not found: {0}")]
    RoadmapNotFound(String),
    #[error("Goal not found: {0}")]
    GoalNotFound(String),
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct StorageData {
    pub assessments: Vec<Assessment>,
    pub roadmaps: Vec<Roadmap>,
    pub goals: Vec<Goal>,
    pub profiles: HashMap<UserId, Profile>,
}

pub struct Storage {
    storage_path: PathBuf,
    data: StorageData,
}

impl Storage {
    pub fn new(storage_path: PathBuf) -> Self {
        Self {
            storage_path,
            data: StorageData::default(),
        }
    }

    /// `~/.careerpath/data.json`, the location used when the CLI does not
    /// override it.
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().expect("couldn't find home dir");
        home.join(".careerpath").join("data.json")
    }

    pub fn initialize(&mut self) -> Result<(), StorageError> {
        if let Some(data_dir) = self.storage_path.parent() {
            fs::create_dir_all(data_dir)?;
        }

        if self.storage_path.exists() {
            let mut file = File::open(&self.storage_path)?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            self.data = serde_json::from_str(&contents)?;
        } else {
            self.save()?;
        }

        Ok(())
    }

    /// Persist synchronously via a temp file and atomic rename, so a crash
    /// mid-write never leaves a truncated document behind.
    pub fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = self.storage_path.with_extension("tmp");
        let mut f = File::create(&temp)?;
        let content = serde_json::to_string_pretty(&self.data)?;
        f.write_all(content.as_bytes())?;
        f.sync_all()?;
        fs::rename(temp, &self.storage_path)?;
        Ok(())
    }

    /// Owned copies of path and data for [`Storage::save_snapshot_async`],
    /// taken while the caller still holds its lock.
    pub fn snapshot_for_save(&self) -> (PathBuf, StorageData) {
        (self.storage_path.clone(), self.data.clone())
    }

    /// Persist a snapshot on the blocking pool, off whatever lock guarded
    /// the mutation that produced it.
    pub async fn save_snapshot_async(
        storage_path: PathBuf,
        data: StorageData,
    ) -> Result<(), StorageError> {
        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            let snapshot = Storage { storage_path, data };
            snapshot.save()
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(format!("spawn_blocking failed: {e}"))))?
    }

    // assessments

    pub fn insert_assessment(
        &mut self,
        user_id: &str,
        answers_json: String,
        recommended_career: String,
    ) -> Assessment {
        let assessment = Assessment {
            id: Ulid::new().to_string(),
            user_id: user_id.to_string(),
            answers: answers_json,
            recommended_career,
            created_at: Utc::now().to_rfc3339(),
        };
        self.data.assessments.push(assessment.clone());
        assessment
    }

    /// Caller's assessments, newest first.
    pub fn assessments_by_user(&self, user_id: &str) -> Vec<Assessment> {
        self.data
            .assessments
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    // roadmaps

    pub fn insert_roadmap(
        &mut self,
        user_id: &str,
        title: String,
        description: String,
        steps: Vec<Step>,
        skills: Vec<String>,
    ) -> Roadmap {
        let roadmap = Roadmap {
            id: Ulid::new().to_string(),
            user_id: user_id.to_string(),
            title,
            description,
            steps,
            status: RoadmapStatus::Active,
            skills,
            created_at: Utc::now().to_rfc3339(),
        };
        self.data.roadmaps.push(roadmap.clone());
        roadmap
    }

    pub fn get_roadmap(&self, id: &str) -> Option<Roadmap> {
        self.data.roadmaps.iter().find(|r| r.id == id).cloned()
    }

    pub fn roadmaps_by_user(&self, user_id: &str) -> Vec<Roadmap> {
        self.data
            .roadmaps
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn active_roadmaps_by_user(&self, user_id: &str) -> Vec<Roadmap> {
        self.data
            .roadmaps
            .iter()
            .filter(|r| r.user_id == user_id && r.status == RoadmapStatus::Active)
            .cloned()
            .collect()
    }

    /// First active roadmap in insertion order, the single-active invariant's
    /// representative.
    pub fn active_roadmap_by_user(&self, user_id: &str) -> Option<Roadmap> {
        self.data
            .roadmaps
            .iter()
            .find(|r| r.user_id == user_id && r.status == RoadmapStatus::Active)
            .cloned()
    }

    pub fn set_roadmap_status(
        &mut self,
        id: &str,
        status: RoadmapStatus,
    ) -> Result<(), StorageError> {
        let roadmap = self
            .data
            .roadmaps
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StorageError::RoadmapNotFound(id.to_string()))?;
        roadmap.status = status;
        Ok(())
    }

    pub fn set_roadmap_steps(&mut self, id: &str, steps: Vec<Step>) -> Result<(), StorageError> {
        let roadmap = self
            .data
            .roadmaps
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StorageError::RoadmapNotFound(id.to_string()))?;
        roadmap.steps = steps;
        Ok(())
    }

    // goals

    pub fn insert_goal(&mut self, user_id: &str, title: String, deadline: Option<String>) -> Goal {
        let goal = Goal {
            id: Ulid::new().to_string(),
            user_id: user_id.to_string(),
            title,
            is_completed: false,
            deadline,
            created_at: Utc::now().to_rfc3339(),
        };
        self.data.goals.push(goal.clone());
        goal
    }

    pub fn get_goal(&self, id: &str) -> Option<Goal> {
        self.data.goals.iter().find(|g| g.id == id).cloned()
    }

    pub fn goals_by_user(&self, user_id: &str) -> Vec<Goal> {
        self.data
            .goals
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn set_goal_completed(&mut self, id: &str, is_completed: bool) -> Result<Goal, StorageError> {
        let goal = self
            .data
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| StorageError::GoalNotFound(id.to_string()))?;
        goal.is_completed = is_completed;
        Ok(goal.clone())
    }

    pub fn delete_goal(&mut self, id: &str) -> Result<(), StorageError> {
        let before = self.data.goals.len();
        self.data.goals.retain(|g| g.id != id);
        if self.data.goals.len() == before {
            return Err(StorageError::GoalNotFound(id.to_string()));
        }
        Ok(())
    }

    // profiles

    pub fn profile(&self, user_id: &str) -> Option<Profile> {
        self.data.profiles.get(user_id).cloned()
    }

    /// Record the recommended career as the user's target role, but only the
    /// first time — an existing target role is never overwritten.
    pub fn set_target_role_if_unset(&mut self, user_id: &str, target_role: &str) {
        let profile = self
            .data
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| Profile {
                user_id: user_id.to_string(),
                ..Profile::default()
            });
        if profile.target_role.is_none() {
            profile.target_role = Some(target_role.to_string());
        }
    }
}
