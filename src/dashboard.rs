//! Dashboard summary over the user's recent runs.

use serde::Serialize;

use crate::store::{DashboardMetrics, SimulationStatus, TechnicalMetrics, TestSimulation};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRow {
    pub id: String,
    pub name: String,
    pub status: SimulationStatus,
    pub start_time: String,
    pub total_conversations: i64,
    pub successful_conversations: i64,
    /// 0..100
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricAggregates {
    pub conversations_measured: usize,
    pub avg_latency_ms: f64,
    pub avg_p95_latency_ms: f64,
    pub avg_token_efficiency: f64,
    pub total_tokens: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub simulations: Vec<SimulationRow>,
    pub aggregates: MetricAggregates,
}

impl DashboardSummary {
    pub fn from_metrics(metrics: &DashboardMetrics) -> Self {
        DashboardSummary {
            simulations: metrics.simulations.iter().map(simulation_row).collect(),
            aggregates: aggregate(&metrics.metrics),
        }
    }
}

fn simulation_row(sim: &TestSimulation) -> SimulationRow {
    let name = sim
        .test_configurations
        .as_ref()
        .map(|c| c.settings.name.clone())
        .unwrap_or_default();
    let success_rate = if sim.total_conversations > 0 {
        sim.successful_conversations as f64 / sim.total_conversations as f64 * 100.0
    } else {
        0.0
    };

    SimulationRow {
        id: sim.id.clone(),
        name,
        status: sim.status,
        start_time: sim.start_time.clone(),
        total_conversations: sim.total_conversations,
        successful_conversations: sim.successful_conversations,
        success_rate,
    }
}

/// Mean over the rows that carry the value; 0 when none do.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn aggregate(metrics: &[TechnicalMetrics]) -> MetricAggregates {
    MetricAggregates {
        conversations_measured: metrics.len(),
        avg_latency_ms: mean(metrics.iter().filter_map(|m| m.data.avg_latency_ms)),
        avg_p95_latency_ms: mean(metrics.iter().filter_map(|m| m.data.p95_latency_ms)),
        avg_token_efficiency: mean(metrics.iter().filter_map(|m| m.data.token_efficiency)),
        total_tokens: metrics.iter().filter_map(|m| m.data.total_tokens).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TechnicalData;

    fn sim(total: i64, ok: i64) -> TestSimulation {
        TestSimulation {
            id: "sim".into(),
            config_id: "cfg".into(),
            user_id: "user".into(),
            status: SimulationStatus::Running,
            start_time: String::new(),
            end_time: None,
            total_conversations: total,
            successful_conversations: ok,
            created_at: String::new(),
            updated_at: String::new(),
            test_configurations: None,
        }
    }

    fn tech(latency: Option<f64>, tokens: Option<f64>) -> TechnicalMetrics {
        TechnicalMetrics {
            id: "t".into(),
            conversation_id: "c".into(),
            data: TechnicalData {
                avg_latency_ms: latency,
                total_tokens: tokens,
                ..Default::default()
            },
            created_at: String::new(),
        }
    }

    #[test]
    fn test_empty_dashboard_is_all_zero() {
        let summary = DashboardSummary::from_metrics(&DashboardMetrics {
            simulations: Vec::new(),
            metrics: Vec::new(),
        });
        assert!(summary.simulations.is_empty());
        assert_eq!(summary.aggregates, MetricAggregates::default());
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(simulation_row(&sim(4, 3)).success_rate, 75.0);
        assert_eq!(simulation_row(&sim(0, 0)).success_rate, 0.0);
        assert_eq!(simulation_row(&sim(4, 3)).name, "");
    }

    #[test]
    fn test_aggregates_skip_missing_values() {
        let agg = aggregate(&[
            tech(Some(100.0), Some(50.0)),
            tech(Some(300.0), None),
            tech(None, Some(25.0)),
        ]);
        assert_eq!(agg.conversations_measured, 3);
        assert_eq!(agg.avg_latency_ms, 200.0);
        assert_eq!(agg.total_tokens, 75.0);
        assert_eq!(agg.avg_token_efficiency, 0.0);
    }
}
