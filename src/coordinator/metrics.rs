use serde::Serialize;
use crate::models::{AgentDecision, DecisionStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentMetrics {
    pub total_tasks: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub retry_count: usize,
    /// Mean of recorded `duration` values in milliseconds; 0 when none were recorded.
    pub avg_duration: f64,
}

pub fn aggregate(decisions: &[AgentDecision]) -> AgentMetrics {
    let mut metrics = AgentMetrics {
        total_tasks: decisions.len(),
        ..Default::default()
    };

    let mut duration_sum = 0.0;
    let mut duration_count = 0usize;
    for decision in decisions {
        match decision.status {
            DecisionStatus::Success => metrics.success_count += 1,
            DecisionStatus::Error => metrics.error_count += 1,
            DecisionStatus::Retry => metrics.retry_count += 1,
        }
        if let Some(d) = decision.duration() {
            duration_sum += d;
            duration_count += 1;
        }
    }

    if duration_count > 0 {
        metrics.avg_duration = duration_sum / duration_count as f64;
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::{json, Value};

    fn decision(status: DecisionStatus, payload: Value) -> AgentDecision {
        AgentDecision {
            id: uuid::Uuid::new_v4().to_string(),
            agent_name: "diagnostic".into(),
            action: "task_completed".into(),
            task_id: None,
            report_id: None,
            status,
            payload,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_log_has_zero_average() {
        let m = aggregate(&[]);
        assert_eq!(m, AgentMetrics::default());
        assert_eq!(m.avg_duration, 0.0);
    }

    #[test]
    fn test_counts_by_status() {
        let mut log = Vec::new();
        log.extend((0..5).map(|_| decision(DecisionStatus::Success, json!({}))));
        log.extend((0..2).map(|_| decision(DecisionStatus::Error, json!({}))));
        log.push(decision(DecisionStatus::Retry, json!({})));

        let m = aggregate(&log);
        assert_eq!(m.total_tasks, 8);
        assert_eq!(m.success_count, 5);
        assert_eq!(m.error_count, 2);
        assert_eq!(m.retry_count, 1);
    }

    #[test]
    fn test_average_ignores_entries_without_duration() {
        let log = vec![
            decision(DecisionStatus::Success, json!({"duration": 100})),
            decision(DecisionStatus::Success, json!({"duration": 300})),
            decision(DecisionStatus::Retry, json!({"delay_ms": 1000})),
        ];
        assert_eq!(aggregate(&log).avg_duration, 200.0);
    }
}
