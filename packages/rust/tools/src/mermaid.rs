//! Mermaid CLI backends.
//!
//! `mmdc` can be reached three ways. Availability is detected once, then each
//! diagram is offered to the available backends in preference order until one
//! produces an image.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use docexport_markdown::DiagramRenderer;
use docexport_shared::{DiagramConfig, DocExportError, Result};

use crate::runner::{CommandRunner, ToolCommand, probe, run_checked};

/// Mount point of the working directory inside the container.
const CONTAINER_DATA_DIR: &str = "/data";

const INPUT_FILE: &str = "diagram.mmd";
const CONTAINER_OUTPUT_FILE: &str = "diagram.png";

/// Printed when no backend is available.
pub const MERMAID_INSTALL_HINT: &str =
    "install Docker, Node.js (for npx), or run: npm install -g @mermaid-js/mermaid-cli";

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// One way of invoking the Mermaid CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// `docker run <image>`.
    Docker,
    /// `npx -p <package> mmdc`.
    Npx,
    /// A locally installed `mmdc`.
    Mmdc,
}

impl Backend {
    /// Fixed preference order.
    pub const PREFERENCE: [Backend; 3] = [Backend::Docker, Backend::Npx, Backend::Mmdc];

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Docker => "docker",
            Backend::Npx => "npx",
            Backend::Mmdc => "mmdc",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Probe which backends work on this machine, in preference order.
#[instrument(skip_all)]
pub async fn detect_backends<R: CommandRunner>(runner: &R) -> Vec<Backend> {
    let mut available = Vec::new();

    for backend in Backend::PREFERENCE {
        let usable = match backend {
            // The daemon must be reachable, not just the client installed.
            Backend::Docker => {
                probe(runner, "docker", &["--version"]).await
                    && probe(runner, "docker", &["info"]).await
            }
            Backend::Npx => probe(runner, "npx", &["--version"]).await,
            Backend::Mmdc => probe(runner, "mmdc", &["--version"]).await,
        };
        debug!(backend = %backend, usable, "probed diagram backend");
        if usable {
            available.push(backend);
        }
    }

    if available.is_empty() {
        warn!(hint = MERMAID_INSTALL_HINT, "no mermaid backend available, diagrams will be kept as code");
    } else {
        info!(backends = ?available, "mermaid backends available");
    }
    available
}

// ---------------------------------------------------------------------------
// Command construction
// ---------------------------------------------------------------------------

/// A ready-to-run backend invocation and the file it is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub command: ToolCommand,
    pub produces: PathBuf,
}

/// Build the invocation of `backend` for `workdir/diagram.mmd`.
///
/// Docker writes inside the mounted `workdir`; `user` (`uid:gid`) keeps the
/// produced file owned by the caller.
pub fn render_plan(
    backend: Backend,
    settings: &DiagramConfig,
    workdir: &Path,
    output: &Path,
    user: Option<&str>,
) -> RenderPlan {
    let input = workdir.join(INPUT_FILE);
    let scale = settings.scale.to_string();

    match backend {
        Backend::Docker => {
            let mut command = ToolCommand::new("docker").args(["run", "--rm"]);
            if let Some(user) = user {
                command = command.args(["-u", user]);
            }
            let command = command
                .arg("-v")
                .arg(format!("{}:{CONTAINER_DATA_DIR}", workdir.display()))
                .arg(settings.docker_image.as_str())
                .arg("-i")
                .arg(format!("{CONTAINER_DATA_DIR}/{INPUT_FILE}"))
                .arg("-o")
                .arg(format!("{CONTAINER_DATA_DIR}/{CONTAINER_OUTPUT_FILE}"))
                .args(["-b", settings.background.as_str(), "--scale", scale.as_str()])
                .timeout(settings.timeout());
            RenderPlan {
                command,
                produces: workdir.join(CONTAINER_OUTPUT_FILE),
            }
        }
        Backend::Npx | Backend::Mmdc => {
            let command = match backend {
                Backend::Npx => {
                    ToolCommand::new("npx").args(["-p", settings.npm_package.as_str(), "mmdc"])
                }
                _ => ToolCommand::new("mmdc"),
            };
            let command = command
                .arg("-i")
                .arg(input.display().to_string())
                .arg("-o")
                .arg(output.display().to_string())
                .args(["-b", settings.background.as_str(), "--scale", scale.as_str()])
                .timeout(settings.timeout());
            RenderPlan {
                command,
                produces: output.to_path_buf(),
            }
        }
    }
}

#[cfg(unix)]
fn owner_of(dir: &Path) -> Option<String> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata(dir)
        .ok()
        .map(|meta| format!("{}:{}", meta.uid(), meta.gid()))
}

#[cfg(not(unix))]
fn owner_of(_dir: &Path) -> Option<String> {
    None
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Cross-device: copy instead.
    std::fs::copy(from, to).map_err(|e| DocExportError::io(to, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// MermaidCli
// ---------------------------------------------------------------------------

/// [`DiagramRenderer`] backed by the Mermaid CLI.
pub struct MermaidCli<'r, R> {
    runner: &'r R,
    backends: Vec<Backend>,
    settings: DiagramConfig,
}

impl<'r, R: CommandRunner> MermaidCli<'r, R> {
    pub fn new(runner: &'r R, backends: Vec<Backend>, settings: DiagramConfig) -> Self {
        Self {
            runner,
            backends,
            settings,
        }
    }

    /// Detect the available backends and build a renderer over them.
    pub async fn detect(runner: &'r R, settings: DiagramConfig) -> Self {
        let backends = detect_backends(runner).await;
        Self::new(runner, backends, settings)
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    async fn render_with(&self, backend: Backend, workdir: &Path, output: &Path) -> Result<()> {
        let user = match backend {
            Backend::Docker => owner_of(workdir),
            _ => None,
        };
        let plan = render_plan(backend, &self.settings, workdir, output, user.as_deref());

        run_checked(self.runner, &plan.command).await?;

        if !plan.produces.is_file() {
            return Err(DocExportError::ToolFailed {
                tool: backend.name().to_string(),
                status: Some(0),
                stderr: "no image was produced (likely a diagram syntax error)".to_string(),
            });
        }
        if plan.produces != output {
            move_file(&plan.produces, output)?;
        }
        Ok(())
    }
}

impl<R: CommandRunner> DiagramRenderer for MermaidCli<'_, R> {
    async fn render(&self, code: &str, output: &Path) -> Result<()> {
        if self.backends.is_empty() {
            return Err(DocExportError::ToolNotFound {
                tool: "mermaid-cli".to_string(),
                message: MERMAID_INSTALL_HINT.to_string(),
            });
        }

        let workdir = tempfile::Builder::new()
            .prefix("docexport-mermaid-")
            .tempdir()
            .map_err(|e| DocExportError::io(std::env::temp_dir(), e))?;
        let input = workdir.path().join(INPUT_FILE);
        std::fs::write(&input, code).map_err(|e| DocExportError::io(&input, e))?;

        let mut last_error = None;
        for &backend in &self.backends {
            match self.render_with(backend, workdir.path(), output).await {
                Ok(()) => {
                    debug!(backend = %backend, output = %output.display(), "rendered diagram");
                    return Ok(());
                }
                Err(e) => {
                    warn!(backend = %backend, error = %e, "diagram backend failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DocExportError::validation("no diagram backend succeeded")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeRunner;
    use crate::runner::ToolOutput;

    fn settings() -> DiagramConfig {
        DiagramConfig::default()
    }

    #[test]
    fn mmdc_plan_writes_directly_to_output() {
        let plan = render_plan(
            Backend::Mmdc,
            &settings(),
            Path::new("/tmp/work"),
            Path::new("/out/d.png"),
            None,
        );
        assert_eq!(plan.command.program, "mmdc");
        assert_eq!(
            plan.command.args,
            vec!["-i", "/tmp/work/diagram.mmd", "-o", "/out/d.png", "-b", "white", "--scale", "2"]
        );
        assert_eq!(plan.produces, PathBuf::from("/out/d.png"));
        assert_eq!(plan.command.timeout.as_secs(), 60);
    }

    #[test]
    fn npx_plan_names_the_package() {
        let plan = render_plan(
            Backend::Npx,
            &settings(),
            Path::new("/w"),
            Path::new("/o.png"),
            None,
        );
        assert_eq!(plan.command.program, "npx");
        assert_eq!(&plan.command.args[..3], &["-p", "@mermaid-js/mermaid-cli", "mmdc"]);
    }

    #[test]
    fn docker_plan_mounts_workdir_and_runs_as_user() {
        let plan = render_plan(
            Backend::Docker,
            &settings(),
            Path::new("/tmp/work"),
            Path::new("/out/d.png"),
            Some("1000:1000"),
        );
        assert_eq!(plan.command.program, "docker");
        assert_eq!(
            plan.command.args,
            vec![
                "run", "--rm", "-u", "1000:1000", "-v", "/tmp/work:/data",
                "minlag/mermaid-cli", "-i", "/data/diagram.mmd", "-o", "/data/diagram.png",
                "-b", "white", "--scale", "2",
            ]
        );
        assert_eq!(plan.produces, PathBuf::from("/tmp/work/diagram.png"));
    }

    #[tokio::test]
    async fn docker_requires_a_running_daemon() {
        let runner = FakeRunner::new(|cmd| {
            let ok = !(cmd.program == "docker" && cmd.args == ["info"]) && cmd.program != "npx";
            Ok(ToolOutput {
                status: Some(if ok { 0 } else { 1 }),
                ..Default::default()
            })
        });
        assert_eq!(detect_backends(&runner).await, vec![Backend::Mmdc]);
    }

    #[tokio::test]
    async fn falls_through_to_next_backend() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("d.png");

        // npx exits zero without producing anything; mmdc writes the image.
        let runner = FakeRunner::new(|cmd| {
            if cmd.program == "mmdc" {
                let out = &cmd.args[3];
                std::fs::write(out, b"png").unwrap();
            }
            Ok(ToolOutput {
                status: Some(0),
                ..Default::default()
            })
        });
        let cli = MermaidCli::new(&runner, vec![Backend::Npx, Backend::Mmdc], settings());

        cli.render("graph TD\nA-->B", &output).await.expect("render");

        assert!(output.is_file());
        let programs: Vec<_> = runner.commands().into_iter().map(|c| c.program).collect();
        assert_eq!(programs, vec!["npx", "mmdc"]);
    }

    #[tokio::test]
    async fn docker_output_is_moved_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("d.png");

        let runner = FakeRunner::new(|cmd| {
            let mount = cmd.args.iter().find(|a| a.ends_with(":/data")).unwrap();
            let host_dir = mount.trim_end_matches(":/data");
            let source = std::fs::read_to_string(Path::new(host_dir).join(INPUT_FILE)).unwrap();
            assert_eq!(source, "pie\n\"a\": 1");
            std::fs::write(Path::new(host_dir).join(CONTAINER_OUTPUT_FILE), b"png").unwrap();
            Ok(ToolOutput {
                status: Some(0),
                ..Default::default()
            })
        });
        let cli = MermaidCli::new(&runner, vec![Backend::Docker], settings());

        cli.render("pie\n\"a\": 1", &output).await.expect("render");
        assert_eq!(std::fs::read(&output).unwrap(), b"png");
    }

    #[tokio::test]
    async fn failure_carries_tool_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_| {
            Ok(ToolOutput {
                status: Some(1),
                stderr: "Parse error on line 2".to_string(),
                ..Default::default()
            })
        });
        let cli = MermaidCli::new(&runner, vec![Backend::Mmdc], settings());

        let err = cli.render("graph TD\n-->", &dir.path().join("x.png")).await.unwrap_err();
        assert!(err.to_string().contains("Parse error on line 2"), "{err}");
    }

    #[tokio::test]
    async fn no_backend_is_an_error_without_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_| panic!("must not spawn"));
        let cli = MermaidCli::new(&runner, Vec::new(), settings());

        let err = cli.render("graph TD", &dir.path().join("x.png")).await.unwrap_err();
        assert!(matches!(err, DocExportError::ToolNotFound { .. }));
    }
}
