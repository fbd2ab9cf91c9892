// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Certification exam types.
//!
//! An exam is a stateful two-phase protocol keyed per agent: `start` issues
//! a paper and parks the answer key in a pending record with explicit
//! expiry; `submit` grades the answers as fraction-correct per domain. A
//! second `start` before `submit` overwrites the pending record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::agent::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamDomain {
    Competence,
    Alignment,
}

/// A bank question, answer key included. Lives in injectable configuration,
/// never shipped to the examinee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub id: String,
    pub domain: ExamDomain,
    pub prompt: String,
    pub answer: String,
}

/// The questions handed to an examinee; answer keys stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamPaper {
    pub competence: Vec<PaperQuestion>,
    pub alignment: Vec<PaperQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperQuestion {
    pub id: String,
    pub prompt: String,
}

/// The question bank an exam is drawn from. Injected configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamBank {
    pub questions: Vec<ExamQuestion>,
}

impl ExamBank {
    pub fn questions_for(&self, domain: ExamDomain) -> Vec<&ExamQuestion> {
        self.questions.iter().filter(|q| q.domain == domain).collect()
    }
}

/// The pending server-side exam record, keyed per agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingExam {
    pub agent_id: AgentId,
    /// Question id → expected answer, per domain.
    pub answer_key: HashMap<String, (ExamDomain, String)>,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingExam {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Grade submitted answers: fraction of bank questions answered
    /// correctly, per domain. Answers are compared case-insensitively after
    /// trimming. Missing answers count as wrong; a domain with no questions
    /// grades as 0.
    pub fn grade(&self, answers: &HashMap<String, String>) -> (f64, f64) {
        let mut competence = (0usize, 0usize);
        let mut alignment = (0usize, 0usize);

        for (question_id, (domain, expected)) in &self.answer_key {
            let (correct, total) = match domain {
                ExamDomain::Competence => &mut competence,
                ExamDomain::Alignment => &mut alignment,
            };
            *total += 1;
            let right = answers
                .get(question_id)
                .is_some_and(|given| given.trim().eq_ignore_ascii_case(expected.trim()));
            if right {
                *correct += 1;
            }
        }

        let fraction = |(correct, total): (usize, usize)| -> f64 {
            if total == 0 {
                0.0
            } else {
                correct as f64 / total as f64
            }
        };
        (fraction(competence), fraction(alignment))
    }
}
