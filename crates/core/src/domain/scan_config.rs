// Burp Configuration Document
// Fixed-shape document read by Burp at startup via --config-file

use crate::application::constants::{DEFAULT_SCAN_THREADS, MAX_LINK_DEPTH};
use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// TLS certificate strategy of a proxy listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateMode {
    PerHost,
}

/// Interfaces a proxy listener binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenMode {
    AllInterfaces,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestListener {
    pub certificate_mode: CertificateMode,
    pub listen_mode: ListenMode,
    pub listener_port: u16,
    pub running: bool,
    pub support_invisible_proxying: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub request_listeners: Vec<RequestListener>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveScanningEngine {
    pub number_of_threads: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOptimization {
    pub skip_ineffective_checks: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub active_scanning_engine: ActiveScanningEngine,
    pub audit_optimization: AuditOptimization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiderConfig {
    pub max_link_depth: u32,
    pub number_of_threads: u32,
}

/// Complete configuration document
///
/// Only the proxy port and the two thread counts vary; everything else is
/// a fixed default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub proxy: ProxyConfig,
    pub scanner: ScannerConfig,
    pub spider: SpiderConfig,
}

impl ScanConfig {
    /// Build a document, rejecting a zero port or zero thread counts
    pub fn new(proxy_port: u16, spider_threads: u32, scanner_threads: u32) -> Result<Self> {
        if proxy_port == 0 {
            return Err(DomainError::InvalidPort(proxy_port));
        }
        if spider_threads == 0 {
            return Err(DomainError::InvalidThreadCount {
                section: "spider",
                count: spider_threads,
            });
        }
        if scanner_threads == 0 {
            return Err(DomainError::InvalidThreadCount {
                section: "scanner",
                count: scanner_threads,
            });
        }

        Ok(Self {
            proxy: ProxyConfig {
                request_listeners: vec![RequestListener {
                    certificate_mode: CertificateMode::PerHost,
                    listen_mode: ListenMode::AllInterfaces,
                    listener_port: proxy_port,
                    running: true,
                    support_invisible_proxying: true,
                }],
            },
            scanner: ScannerConfig {
                active_scanning_engine: ActiveScanningEngine {
                    number_of_threads: scanner_threads,
                },
                audit_optimization: AuditOptimization {
                    skip_ineffective_checks: true,
                },
            },
            spider: SpiderConfig {
                max_link_depth: MAX_LINK_DEPTH,
                number_of_threads: spider_threads,
            },
        })
    }

    /// Document with default thread counts for the given proxy port
    pub fn for_proxy_port(proxy_port: u16) -> Result<Self> {
        Self::new(proxy_port, DEFAULT_SCAN_THREADS, DEFAULT_SCAN_THREADS)
    }

    /// Port of the first proxy listener, if any
    pub fn listener_port(&self) -> Option<u16> {
        self.proxy
            .request_listeners
            .first()
            .map(|listener| listener.listener_port)
    }
}
