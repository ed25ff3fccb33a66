// Domain Layer - Pure business logic and entities

pub mod error;
pub mod launch;
pub mod outcome;
pub mod scan_config;
pub mod session;
pub mod settings;

// Re-exports
pub use error::DomainError;
pub use launch::{ExitState, LaunchSpec, OutputCapture, ProcessSignal};
pub use outcome::{StartOutcome, StatusReport, StopOutcome};
pub use scan_config::{
    ActiveScanningEngine, AuditOptimization, CertificateMode, ListenMode, ProxyConfig,
    RequestListener, ScanConfig, ScannerConfig, SpiderConfig,
};
pub use session::SessionRecord;
pub use settings::{OutputMode, StartRequest, SupervisorSettings};
