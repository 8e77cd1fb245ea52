//! `PATH` lookups for required external programs.

use std::path::PathBuf;

use tracing::{debug, info};

use docexport_shared::{DocExportError, Result};

/// Install hint for the npm-distributed tools.
pub const NPM_INSTALL_HINT: &str = "npm install -g @mermaid-js/mermaid-cli mermaid-filter";

/// Where a program resolved on `PATH`, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: String,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

pub fn locate(program: &str) -> ToolStatus {
    let path = which::which(program).ok();
    debug!(program, found = path.is_some(), "looked up program");
    ToolStatus {
        name: program.to_string(),
        path,
    }
}

/// Resolve every program, failing with one error that names all missing ones.
pub fn require(programs: &[&str]) -> Result<Vec<PathBuf>> {
    let statuses: Vec<ToolStatus> = programs.iter().map(|p| locate(p)).collect();

    let missing: Vec<&str> = statuses
        .iter()
        .filter(|s| !s.found())
        .map(|s| s.name.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(DocExportError::config(format!(
            "missing dependencies: {}. Install with: {NPM_INSTALL_HINT}",
            missing.join(", ")
        )));
    }

    Ok(statuses
        .into_iter()
        .filter_map(|s| {
            info!(program = %s.name, path = ?s.path, "found dependency");
            s.path
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_programs_are_all_named() {
        let err = require(&["docexport-missing-a", "docexport-missing-b"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("docexport-missing-a, docexport-missing-b"), "{msg}");
        assert!(msg.contains(NPM_INSTALL_HINT));
    }

    #[test]
    fn empty_requirement_succeeds() {
        assert!(require(&[]).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn finds_a_shell() {
        let status = locate("sh");
        assert!(status.found());
        assert_eq!(require(&["sh"]).unwrap().len(), 1);
    }
}
