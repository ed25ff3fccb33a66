// Supervisor Settings & Start Request

use crate::application::constants::{
    DEFAULT_HEAP_SIZE_MB, DEFAULT_JAVA_PATH, DEFAULT_PROJECT_NAME, DEFAULT_PROXY_PORT,
    GENERATED_CONFIG_SUFFIX, LOG_FILE_EXTENSION, PROJECT_FILE_EXTENSION, SESSION_FILE_NAME,
};
use crate::domain::error::{DomainError, Result};
use crate::domain::launch::{LaunchSpec, OutputCapture};
use std::path::{Path, PathBuf};

/// Where the child's output goes for every launch of this supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// In-process draining (foreground supervision)
    #[default]
    Piped,
    /// `<project_dir>/<project_name>.log` (detached launches)
    LogFile,
}

/// Static supervisor configuration
///
/// # Example
/// ```text
/// let settings = SupervisorSettings::new("/opt/burp/burpsuite.jar", "./burpsuite")
///     .with_heap_size_mb(4096)
///     .with_output_mode(OutputMode::LogFile);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorSettings {
    pub java_path: PathBuf,
    pub jar_path: PathBuf,
    pub project_dir: PathBuf,
    pub heap_size_mb: u32,
    pub output_mode: OutputMode,
}

impl SupervisorSettings {
    pub fn new(jar_path: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            java_path: PathBuf::from(DEFAULT_JAVA_PATH),
            jar_path: jar_path.into(),
            project_dir: project_dir.into(),
            heap_size_mb: DEFAULT_HEAP_SIZE_MB,
            output_mode: OutputMode::default(),
        }
    }

    pub fn with_java_path(mut self, java_path: impl Into<PathBuf>) -> Self {
        self.java_path = java_path.into();
        self
    }

    pub fn with_heap_size_mb(mut self, heap_size_mb: u32) -> Self {
        self.heap_size_mb = heap_size_mb;
        self
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    pub fn project_file(&self, project_name: &str) -> PathBuf {
        self.project_dir
            .join(format!("{}.{}", project_name, PROJECT_FILE_EXTENSION))
    }

    pub fn log_file(&self, project_name: &str) -> PathBuf {
        self.project_dir
            .join(format!("{}.{}", project_name, LOG_FILE_EXTENSION))
    }

    /// Config file written by `start` when the caller supplies none
    pub fn generated_config_file(&self, project_name: &str) -> PathBuf {
        self.project_dir
            .join(format!("{}{}", project_name, GENERATED_CONFIG_SUFFIX))
    }

    pub fn session_file(&self) -> PathBuf {
        self.project_dir.join(SESSION_FILE_NAME)
    }

    /// Build the argument vector for a headless launch
    ///
    /// Order: heap flag, `-jar <jar>`, project file, headless flag,
    /// optional config file, unpause flag.
    pub fn launch_spec(
        &self,
        project_name: &str,
        config_file: Option<&Path>,
    ) -> Result<LaunchSpec> {
        validate_project_name(project_name)?;

        let mut args = vec![
            format!("-Xmx{}m", self.heap_size_mb),
            "-jar".to_string(),
            self.jar_path.display().to_string(),
            format!("--project-file={}", self.project_file(project_name).display()),
            "--headless".to_string(),
        ];

        if let Some(config_file) = config_file {
            args.push(format!("--config-file={}", config_file.display()));
        }

        args.push("--unpause-spider-and-scanner".to_string());

        let output = match self.output_mode {
            OutputMode::Piped => OutputCapture::Piped,
            OutputMode::LogFile => OutputCapture::LogFile(self.log_file(project_name)),
        };

        Ok(LaunchSpec {
            program: self.java_path.clone(),
            args,
            output,
        })
    }
}

/// Project names become file names; reject anything that escapes the project dir
pub fn validate_project_name(name: &str) -> Result<()> {
    let escapes = name.contains('/') || name.contains('\\') || name == "." || name == "..";
    if name.trim().is_empty() || escapes {
        return Err(DomainError::InvalidProjectName(name.to_string()));
    }
    Ok(())
}

/// Parameters of a single `start` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    /// Proxy listener port (written into the generated config, echoed back)
    pub port: u16,
    pub project_name: String,
    pub config_file: Option<PathBuf>,
}

impl Default for StartRequest {
    fn default() -> Self {
        Self {
            port: DEFAULT_PROXY_PORT,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            config_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SupervisorSettings {
        SupervisorSettings::new("/opt/burp/burpsuite.jar", "/srv/burp")
    }

    #[test]
    fn test_launch_spec_argument_order() {
        let spec = settings().launch_spec("scan1", None).unwrap();

        assert_eq!(spec.program, PathBuf::from("/usr/bin/java"));
        assert_eq!(
            spec.args,
            vec![
                "-Xmx2048m",
                "-jar",
                "/opt/burp/burpsuite.jar",
                "--project-file=/srv/burp/scan1.burp",
                "--headless",
                "--unpause-spider-and-scanner",
            ]
        );
        assert_eq!(spec.output, OutputCapture::Piped);
    }

    #[test]
    fn test_launch_spec_with_config_file_and_log_output() {
        let spec = settings()
            .with_heap_size_mb(512)
            .with_java_path("/opt/jdk/bin/java")
            .with_output_mode(OutputMode::LogFile)
            .launch_spec("default", Some(Path::new("/tmp/burp.json")))
            .unwrap();

        assert_eq!(spec.program, PathBuf::from("/opt/jdk/bin/java"));
        assert_eq!(spec.args[0], "-Xmx512m");
        assert_eq!(spec.args[5], "--config-file=/tmp/burp.json");
        assert_eq!(spec.args.last().unwrap(), "--unpause-spider-and-scanner");
        assert_eq!(
            spec.output,
            OutputCapture::LogFile(PathBuf::from("/srv/burp/default.log"))
        );
    }

    #[test]
    fn test_rejects_project_names_that_escape() {
        for name in ["", "  ", "..", "a/b", "..\\x"] {
            assert!(
                matches!(
                    settings().launch_spec(name, None),
                    Err(DomainError::InvalidProjectName(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_derived_paths() {
        let s = settings();
        assert_eq!(s.generated_config_file("x"), PathBuf::from("/srv/burp/x.config.json"));
        assert_eq!(
            s.session_file(),
            PathBuf::from("/srv/burp/burp-headless.session.json")
        );
    }

    #[test]
    fn test_start_request_defaults() {
        let req = StartRequest::default();
        assert_eq!(req.port, 8080);
        assert_eq!(req.project_name, "default");
        assert!(req.config_file.is_none());
    }
}
