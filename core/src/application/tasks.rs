// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! TaskBoard: curation work items moving through the consensus-gated
//! lifecycle proposed → active → in-progress → completed.
//!
//! Proposal is idempotent: the task id is the content hash of the
//! description, so re-proposing resolves to the existing task. Activation
//! happens in `ConsensusLedger`, not here.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::application::{EventBus, PermissionGate, SagacityEngine};
use crate::domain::{
    AgentId, GovernanceConfig, LedgerError, LedgerEvent, LedgerResult, Task, TaskId, TaskPriority,
    TaskStatus, Tier,
};
use crate::infrastructure::repository::{AgentRepository, TaskRepository};

pub struct TaskBoard {
    tasks: Arc<dyn TaskRepository>,
    agents: Arc<dyn AgentRepository>,
    sagacity: Arc<SagacityEngine>,
    event_bus: Arc<dyn EventBus>,
    config: Arc<GovernanceConfig>,
}

impl TaskBoard {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        agents: Arc<dyn AgentRepository>,
        sagacity: Arc<SagacityEngine>,
        event_bus: Arc<dyn EventBus>,
        config: Arc<GovernanceConfig>,
    ) -> Self {
        Self { tasks, agents, sagacity, event_bus, config }
    }

    /// Propose a curation task. Re-proposing the same description returns
    /// the existing task untouched.
    pub async fn propose(
        &self,
        agent_id: &AgentId,
        description: &str,
        priority: TaskPriority,
    ) -> LedgerResult<Task> {
        self.sagacity.require_tier(agent_id, Tier::Contributor).await?;
        let description = description.trim();
        if description.is_empty() {
            return Err(LedgerError::Validation("task description must not be empty".to_string()));
        }

        let id = TaskId::from_description(description);
        if let Some(existing) = self.tasks.find_by_id(&id).await? {
            return Ok(existing);
        }

        let task = Task::propose(description, priority, Some(agent_id.clone()));
        self.tasks.save(&task).await?;

        if let Some(mut agent) = self.agents.find_by_id(agent_id).await? {
            agent.record_contribution();
            self.agents.save(&agent).await?;
        }
        info!(task = %task.id, agent = %agent_id, "task proposed");
        self.event_bus
            .publish(LedgerEvent::TaskProposed {
                task_id: task.id.clone(),
                agent_id: agent_id.clone(),
                timestamp: task.created_at,
            })
            .await?;
        Ok(task)
    }

    /// Claim an active task for execution.
    pub async fn claim(&self, agent_id: &AgentId, task_id: &TaskId) -> LedgerResult<Task> {
        self.sagacity.require_tier(agent_id, Tier::Contributor).await?;
        let mut task = self.find(task_id).await?;

        match task.status {
            TaskStatus::Active => {}
            TaskStatus::InProgress => {
                return match &task.claimed_by {
                    Some(claimant) if claimant == agent_id => Ok(task),
                    _ => Err(LedgerError::Conflict(format!(
                        "task {task_id} is already claimed"
                    ))),
                };
            }
            other => {
                return Err(LedgerError::Validation(format!(
                    "task must be active to claim (status: {other:?})"
                )));
            }
        }

        task.status = TaskStatus::InProgress;
        task.claimed_by = Some(agent_id.clone());
        self.tasks.save(&task).await?;

        info!(task = %task_id, agent = %agent_id, "task claimed");
        self.event_bus
            .publish(LedgerEvent::TaskClaimed {
                task_id: task_id.clone(),
                agent_id: agent_id.clone(),
                timestamp: Utc::now(),
            })
            .await?;
        Ok(task)
    }

    /// Mark a claimed task completed. Only the claimant or root may
    /// complete.
    pub async fn complete(&self, agent_id: &AgentId, task_id: &TaskId) -> LedgerResult<Task> {
        let mut task = self.find(task_id).await?;

        if task.status != TaskStatus::InProgress {
            return Err(LedgerError::Validation(format!(
                "task must be in progress to complete (status: {:?})",
                task.status
            )));
        }
        let is_claimant = task.claimed_by.as_ref() == Some(agent_id);
        if !is_claimant && !self.config.is_root(agent_id) {
            return Err(LedgerError::Unauthorized(
                "only the claimant or root may complete a task".to_string(),
            ));
        }

        task.status = TaskStatus::Completed;
        self.tasks.save(&task).await?;

        if let Some(mut agent) = self.agents.find_by_id(agent_id).await? {
            agent.record_contribution();
            self.agents.save(&agent).await?;
        }
        info!(task = %task_id, agent = %agent_id, "task completed");
        self.event_bus
            .publish(LedgerEvent::TaskCompleted {
                task_id: task_id.clone(),
                agent_id: agent_id.clone(),
                timestamp: Utc::now(),
            })
            .await?;
        Ok(task)
    }

    /// Reject a task outright. Root only.
    pub async fn reject(&self, agent_id: &AgentId, task_id: &TaskId) -> LedgerResult<Task> {
        if !self.config.is_root(agent_id) {
            return Err(LedgerError::Unauthorized("only root may reject tasks".to_string()));
        }
        let mut task = self.find(task_id).await?;
        if matches!(task.status, TaskStatus::Completed) {
            return Err(LedgerError::Validation(
                "completed tasks cannot be rejected".to_string(),
            ));
        }
        task.status = TaskStatus::Rejected;
        self.tasks.save(&task).await?;
        info!(task = %task_id, "task rejected");
        Ok(task)
    }

    pub async fn list(&self) -> LedgerResult<Vec<Task>> {
        Ok(self.tasks.list_all().await?)
    }

    async fn find(&self, task_id: &TaskId) -> LedgerResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("task", task_id))
    }
}
