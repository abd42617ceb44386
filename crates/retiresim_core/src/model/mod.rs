mod assets;
mod ids;
mod params;
mod results;

pub use assets::{Asset, AssetClass, Debt, Portfolio};
pub use ids::{AssetClassId, AssetId, DebtId};
pub use params::{
    BehavioralModel, BehavioralRiskParams, OneTimeEvent, PanicPolicy, SimulationParams,
    WithdrawalStrategy,
};
pub use results::{
    DecadeCohort, EnhancedMetrics, Insight, InsightKind, Milestone, Phase, ProjectionResult,
    ProjectionSummary, RecoveryAnalysis, RuinPoint, SafeFloor, SequenceAnalysis,
    SimulationOptions, SimulationProgress, VulnerabilityPeriod, YearProjection,
};
