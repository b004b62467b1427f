use thiserror::Error;

/// Which host callback failed during a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStage {
    PropertyChanged,
    Render,
}

impl std::fmt::Display for CommitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitStage::PropertyChanged => f.write_str("onPropertyChanged"),
            CommitStage::Render => f.write_str("render"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FieldError {
    /// The host's change or render callback returned an error. Steps that
    /// ran before it are not rolled back.
    #[error("host {stage} callback failed for '{target}': {error:#}")]
    HostCallback {
        stage: CommitStage,
        target: String,
        error: anyhow::Error,
    },

    #[error("property fields must be created inside a Tokio runtime")]
    NoRuntime,
}

impl FieldError {
    pub(crate) fn host(stage: CommitStage, target: &str, error: anyhow::Error) -> Self {
        FieldError::HostCallback {
            stage,
            target: target.to_string(),
            error,
        }
    }
}
